use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::context::{
    CliMode, CommandError, LoopControl, ShellContext, SCRIPT_ENV,
};
use crate::cli::output;
use crate::errors::CliError;

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    if mode == CliMode::Script {
        output::disable_color();
    }
    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output::info("Disk Planner. Type `help` for commands.");

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

/// Tokenizes and runs one shell line. Blank lines and `#` comments are skipped.
pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    if line.trim_start().starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not parse `{}`: {}", line.trim(), err));
            return Ok(LoopControl::Continue);
        }
    };

    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.trim().to_string());

    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_string).collect();
        commands.sort();
        commands.dedup();
        Self { commands }
    }

    /// Command names starting with the word under the cursor. Only the first
    /// word of a line is completed.
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        if !prefix[..start].trim().is_empty() {
            return (start, Vec::new());
        }

        let needle = prefix[start..].to_ascii_lowercase();
        let pairs = self
            .commands
            .iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        (start, pairs)
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use diskplan_core::FixedClock;
    use tempfile::tempdir;

    fn context(dir: &std::path::Path) -> ShellContext {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        ShellContext::open(CliMode::Script, dir, &clock).unwrap()
    }

    #[test]
    fn completes_command_names_only_in_first_word() {
        let helper = CommandHelper::new(vec!["commit", "commit-shortfall", "status"]);
        let (start, pairs) = helper.candidates("com", 3);
        assert_eq!(start, 0);
        assert_eq!(pairs.len(), 2);
        let (_, pairs) = helper.candidates("order st", 8);
        assert!(pairs.is_empty());
    }

    #[test]
    fn order_then_evaluate_updates_session() {
        let dir = tempdir().unwrap();
        let mut context = context(dir.path());

        handle_line(&mut context, "order 512 2").unwrap();
        assert_eq!(context.records().unwrap().len(), 1);
        assert_eq!(
            context.state.current_date(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );

        handle_line(&mut context, "evaluate").unwrap();
        let evaluation = context.current_evaluation().expect("evaluation stored");
        assert!(evaluation.has_data);
        assert_eq!(evaluation.active_capacity_tb, 1.0);
    }

    #[test]
    fn commit_requires_fresh_evaluation() {
        let dir = tempdir().unwrap();
        let mut context = context(dir.path());
        let err = handle_line(&mut context, "commit").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn exit_stops_the_loop_and_comments_are_ignored() {
        let dir = tempdir().unwrap();
        let mut context = context(dir.path());
        assert_eq!(
            handle_line(&mut context, "# a comment").unwrap(),
            LoopControl::Continue
        );
        assert_eq!(
            handle_line(&mut context, "unknown-cmd").unwrap(),
            LoopControl::Continue
        );
        assert_eq!(handle_line(&mut context, "EXIT").unwrap(), LoopControl::Exit);
        assert!(!context.running);
    }
}
