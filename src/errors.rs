use std::io;

use diskplan_config::ConfigError;
use diskplan_core::CoreError;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Failures surfaced by the planner outside the shell loop.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid environment: {0}")]
    Environment(String),
}

/// Fatal shell errors; the binary exits with status 1 on these.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Planner(PlannerError::Core(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Planner(PlannerError::Config(err))
    }
}
