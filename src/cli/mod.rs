mod commands;
mod context;
mod formatters;
mod help;
pub mod output;
mod registry;
mod shell;
mod system_clock;

pub use context::{CliMode, CommandError, ShellContext, HOME_ENV, SCRIPT_ENV, TODAY_ENV};
pub use shell::run_cli;
pub use system_clock::SystemClock;
