use std::{
    env,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use diskplan_config::{default_base_dir, Config, ConfigError, ConfigManager};
use diskplan_core::{
    Clock, CoreError, Evaluation, FixedClock, HoltLinearForecaster, PlannerSettings,
    PurchaseLedger, SimulationState, UsageSimulator,
};
use diskplan_domain::PurchaseRecord;
use strsim::levenshtein;
use thiserror::Error;
use tracing::info;

use crate::cli::commands::all_definitions;
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::cli::system_clock::SystemClock;
use crate::errors::{CliError, PlannerError};

/// Set to run the shell over stdin without a line editor.
pub const SCRIPT_ENV: &str = "DISK_PLANNER_CLI_SCRIPT";
/// Overrides the directory holding `config.json` and the ledger.
pub const HOME_ENV: &str = "DISK_PLANNER_HOME";
/// Pins the session start date (`YYYY-MM-DD`) instead of the system clock.
pub const TODAY_ENV: &str = "DISK_PLANNER_TODAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Per-command failures; reported and the shell keeps running.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

/// Everything a shell command can touch: the planning session, the ledger and
/// the settings it was opened with.
pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    pub(crate) registry: CommandRegistry,
    pub(crate) state: SimulationState,
    pub(crate) ledger: Box<dyn PurchaseLedger>,
    pub(crate) ledger_path: PathBuf,
    pub(crate) settings: PlannerSettings,
    pub(crate) forecaster: HoltLinearForecaster,
    pub(crate) config: Config,
    pub(crate) config_manager: ConfigManager,
    pub(crate) last_evaluation: Option<Evaluation>,
    pub(crate) last_command: Option<String>,
}

impl ShellContext {
    /// Opens a session from the environment: base directory, configuration
    /// and start date.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base_dir = env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_base_dir);
        let clock = session_clock()?;
        Self::open(mode, &base_dir, clock.as_ref())
    }

    pub fn open(mode: CliMode, base_dir: &Path, clock: &dyn Clock) -> Result<Self, CliError> {
        let manager = ConfigManager::with_base_dir(base_dir.to_path_buf())?;
        let config = manager.load()?;
        let (settings, forecaster) = tunables(&config)?;
        let ledger_path = config.resolve_ledger_path(base_dir);
        let ledger = diskplan_storage_json::JsonPurchaseLedger::new(ledger_path.clone())?;
        let state = SimulationState::new(clock.today());

        info!(
            ledger = %ledger_path.display(),
            start = %state.current_date(),
            ?mode,
            "planner session opened"
        );

        Ok(Self {
            mode,
            running: true,
            registry: CommandRegistry::new(all_definitions()),
            state,
            ledger: Box::new(ledger),
            ledger_path,
            settings,
            forecaster,
            config,
            config_manager: manager,
            last_evaluation: None,
            last_command: None,
        })
    }

    pub(crate) fn prompt(&self) -> String {
        format!("disk-planner [{}]> ", self.state.current_date().format("%Y-%m"))
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn records(&self) -> Result<Vec<PurchaseRecord>, CommandError> {
        Ok(self.ledger.read_all()?)
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format!("{:.2} {}", amount, self.config.currency)
    }

    /// The evaluation of the current month, if `evaluate` ran since the last
    /// clock change.
    pub(crate) fn current_evaluation(&self) -> Option<&Evaluation> {
        self.last_evaluation
            .as_ref()
            .filter(|evaluation| evaluation.as_of == self.state.current_date())
    }

    pub(crate) fn show_config(&self) -> CommandResult {
        let config = &self.config;
        output::section("Configuration");
        output::info(format!(
            "  File               : {}",
            self.config_manager.config_path().display()
        ));
        output::info(format!("  currency           : {}", config.currency));
        output::info(format!("  ledger_path        : {}", self.ledger_path.display()));
        output::info(format!("  forecast_horizon   : {}", config.forecast_horizon));
        output::info(format!("  usage_fraction_min : {}", config.usage_fraction_min));
        output::info(format!("  usage_fraction_max : {}", config.usage_fraction_max));
        output::info(format!("  holt_alpha         : {}", config.holt_alpha));
        output::info(format!("  holt_beta          : {}", config.holt_beta));
        Ok(())
    }

    /// Updates one setting, saves the file and applies it to the session.
    pub(crate) fn set_config_value(&mut self, key: &str, value: &str) -> CommandResult {
        let mut config = self.config.clone();
        match key.to_lowercase().as_str() {
            "currency" => config.currency = value.to_uppercase(),
            "forecast_horizon" => config.forecast_horizon = parse_setting(key, value)?,
            "usage_fraction_min" => config.usage_fraction_min = parse_setting(key, value)?,
            "usage_fraction_max" => config.usage_fraction_max = parse_setting(key, value)?,
            "holt_alpha" => config.holt_alpha = parse_setting(key, value)?,
            "holt_beta" => config.holt_beta = parse_setting(key, value)?,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown config key `{}`",
                    other
                )))
            }
        }
        self.config_manager.save(&config)?;
        let (settings, forecaster) = tunables(&config)?;
        self.settings = settings;
        self.forecaster = forecaster;
        self.config = config;
        info!(key, value, "configuration updated");
        output::success("Configuration updated.");
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    /// Asks before a destructive action; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                if let Some(line) = &self.last_command {
                    tracing::debug!(command = %line, error = %other, "command failed");
                }
                output::error(other);
                Ok(())
            }
        }
    }
}

fn tunables(config: &Config) -> Result<(PlannerSettings, HoltLinearForecaster), CoreError> {
    let settings = PlannerSettings {
        forecast_horizon: config.forecast_horizon,
        usage: UsageSimulator::new(config.usage_fraction_min, config.usage_fraction_max)?,
    };
    let forecaster = HoltLinearForecaster::new(config.holt_alpha, config.holt_beta)?;
    Ok((settings, forecaster))
}

fn parse_setting<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not a valid value for {}", value, key))
    })
}

fn session_clock() -> Result<Box<dyn Clock>, PlannerError> {
    match env::var(TODAY_ENV) {
        Ok(value) => {
            let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
                PlannerError::Environment(format!("{TODAY_ENV}=`{value}` is not a date: {err}"))
            })?;
            Ok(Box::new(FixedClock::new(date)))
        }
        Err(_) => Ok(Box::new(SystemClock)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open(dir: &Path) -> ShellContext {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        ShellContext::open(CliMode::Script, dir, &clock).expect("open context")
    }

    #[test]
    fn opens_with_defaults_in_base_dir() {
        let dir = tempdir().unwrap();
        let context = open(dir.path());
        assert_eq!(context.ledger_path, dir.path().join("purchases.json"));
        assert_eq!(context.prompt(), "disk-planner [2024-03]> ");
        assert_eq!(context.money(12.5), "12.50 USD");
        assert!(context.records().unwrap().is_empty());
    }

    #[test]
    fn invalid_config_refuses_to_open() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{ "usage_fraction_min": 0.9, "usage_fraction_max": 0.1 }"#,
        )
        .unwrap();
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!(ShellContext::open(CliMode::Script, dir.path(), &clock).is_err());
    }

    #[test]
    fn config_changes_are_saved_and_applied() {
        let dir = tempdir().unwrap();
        let mut context = open(dir.path());

        context.set_config_value("forecast_horizon", "3").unwrap();
        context.set_config_value("currency", "eur").unwrap();

        assert_eq!(context.settings.forecast_horizon, 3);
        assert_eq!(context.money(1.0), "1.00 EUR");
        let reopened = open(dir.path());
        assert_eq!(reopened.config.forecast_horizon, 3);
        assert_eq!(reopened.config.currency, "EUR");
    }

    #[test]
    fn invalid_config_changes_leave_session_untouched() {
        let dir = tempdir().unwrap();
        let mut context = open(dir.path());

        assert!(matches!(
            context.set_config_value("usage_fraction_min", "0.95"),
            Err(CommandError::Config(ConfigError::Invalid(_)))
        ));
        assert!(matches!(
            context.set_config_value("holt_alpha", "fast"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            context.set_config_value("theme", "dark"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert_eq!(context.config, Config::default());
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn stale_evaluation_is_not_current() {
        let dir = tempdir().unwrap();
        let mut context = open(dir.path());
        context.last_evaluation = Some(
            context
                .state
                .evaluate(&[], &context.settings, &context.forecaster)
                .unwrap(),
        );
        assert!(context.current_evaluation().is_some());
        context.state.advance();
        assert!(context.current_evaluation().is_none());
    }
}
