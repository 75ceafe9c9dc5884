//! diskplan-config
//!
//! Persistent planner preferences.
//! Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{default_base_dir, Config, APP_DIR_NAME, LEDGER_FILE_NAME};
