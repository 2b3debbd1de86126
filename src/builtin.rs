use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::io::{Read, Write};

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "exit" or "history".
    fn name() -> &'static str;

    /// Executes the command using the provided IO streams and environment.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for
    /// error.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match T::execute(*self, &mut stdin, &mut stdout, env) {
            Ok(code) => Ok(code),
            Err(e) => {
                stdout.write_all(e.to_string().as_bytes())?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Leave the shell. History is persisted on the way out.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; `exit` always terminates the session.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout)?;
        env.should_exit = true;
        Ok(0)
    }
}

const HISTORY_USAGE: &str = "Error: history expects an integer > 0 (or 'clear')";

#[derive(FromArgs)]
/// Show or clear the command history.
pub struct History {
    #[argh(positional, greedy)]
    /// either `clear`, or the number of most recent entries to show; shows
    /// the whole history when omitted.
    pub args: Vec<String>,
}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match self.args.as_slice() {
            [] => {
                env.history.print_tail(stdout, env.history.len())?;
                Ok(0)
            }
            [arg] if arg == "clear" => {
                // The dispatcher suppresses the history entry for this line.
                env.history.clear();
                Ok(0)
            }
            [arg] if arg.chars().all(|c| c.is_ascii_digit()) => {
                match arg.parse::<usize>() {
                    Ok(count) if count >= 1 => {
                        if count > env.history.len() {
                            // No partial listing for an out-of-range count.
                            writeln!(
                                stdout,
                                "Error: history only has {} entries",
                                env.history.len()
                            )?;
                            Ok(1)
                        } else {
                            env.history.print_tail(stdout, count)?;
                            Ok(0)
                        }
                    }
                    // Zero, or a digit string too large to parse.
                    _ => {
                        writeln!(stdout, "{}", HISTORY_USAGE)?;
                        Ok(1)
                    }
                }
            }
            _ => {
                writeln!(stdout, "{}", HISTORY_USAGE)?;
                Ok(1)
            }
        }
    }
}
