//! diskplan-core
//!
//! Capacity, usage, forecasting, pricing and procurement planning for the disk planner.
//! Depends on diskplan-domain. No CLI, no terminal I/O, no direct filesystem access.

pub mod capacity;
pub mod error;
pub mod forecast;
pub mod ledger;
pub mod planner;
pub mod pricing;
pub mod public_api;
pub mod session;
pub mod time;
pub mod usage;

pub use capacity::*;
pub use error::CoreError;
pub use forecast::*;
pub use ledger::*;
pub use planner::{plan_cost, plan_coverage_gb, PlanLine, PricedOption};
pub use pricing::{
    estimate_price, monthly_average_prices, price_history_by_product, price_summary, quote_price,
    round_price, PriceSummary, MIN_PRICE_SAMPLES_FOR_FORECAST,
};
pub use public_api::*;
pub use session::*;
pub use time::*;
pub use usage::*;
