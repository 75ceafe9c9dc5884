//! diskplan-domain
//!
//! Pure domain models (products, purchase records, observation series).
//! No I/O, no CLI, no storage. Only data types, unit conversion and month arithmetic.

pub mod common;
pub mod observation;
pub mod product;
pub mod purchase;

pub use common::*;
pub use observation::*;
pub use product::*;
pub use purchase::*;
