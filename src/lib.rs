#![doc(test(attr(deny(warnings))))]

//! Disk Planner forecasts storage consumption and disk prices from a purchase
//! ledger and recommends the cheapest set of disks that covers next month's
//! projected need.
//!
//! The planning logic lives in the `diskplan-*` workspace crates; this crate
//! wires them into the interactive shell.

pub mod cli;
pub mod errors;
pub mod utils;

pub use errors::{CliError, PlannerError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Disk Planner tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
