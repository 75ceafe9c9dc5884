use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::registry::CommandEntry;

const CONFIG_USAGE: &str = "config [show|set <key> <value>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change planner settings",
        CONFIG_USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return context.show_config();
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(
                    "usage: config set <currency|forecast_horizon|usage_fraction_min|usage_fraction_max|holt_alpha|holt_beta> <value>".into(),
                ));
            }
            let value = args[2..].join(" ");
            context.set_config_value(args[1], value.trim())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}`; usage: {}",
            other, CONFIG_USAGE
        ))),
    }
}
