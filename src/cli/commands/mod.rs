pub mod config;
pub mod planning;
pub mod reports;
pub mod system;

use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(planning::definitions());
    commands.extend(reports::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}
