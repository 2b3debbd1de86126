use crate::command::{CommandFactory, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::lexer;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{Read, Write};
use std::process::Stdio;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Whether the line just dispatched should become a history entry.
///
/// Computed once per iteration from the word list, instead of a mutable
/// flag threaded through the dispatch branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recording {
    Record,
    Suppress,
}

impl Recording {
    /// `history clear` is the one line that never records itself.
    fn classify(words: &[String]) -> Self {
        match words {
            [first, second] if first == "history" && second == "clear" => Recording::Suppress,
            _ => Recording::Record,
        }
    }
}

/// The shell's command dispatcher and interactive loop.
///
/// The interpreter maintains an [`Environment`] and an ordered list of
/// [`CommandFactory`] objects that are queried to create commands by name:
/// built-ins first, the external-command launcher last.
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter with a custom set of command factories.
    pub fn new(env: Environment, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { env, commands }
    }

    /// Create an interpreter over `env` with the default command set:
    /// the `exit` and `history` built-ins, then the external launcher.
    pub fn with_default_commands(env: Environment) -> Self {
        use crate::builtin::{Exit, History};
        use crate::external::ExternalCommand;
        Self::new(
            env,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<History>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    /// The session state, e.g. to persist its history after [`repl`](Self::repl) returns.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Tokenize and execute one raw input line, then record it.
    ///
    /// An empty or all-delimiter line executes nothing but still becomes a
    /// history entry; `history clear` executes but is never recorded.
    /// Returns the command's exit code. An `Err` is fatal to the shell.
    pub fn dispatch(&mut self, line: &str) -> Result<ExitCode> {
        self.dispatch_with_output(line, Box::new(std::io::stdout()))
    }

    fn dispatch_with_output(&mut self, line: &str, stdout: Box<dyn Stdout>) -> Result<ExitCode> {
        let words = lexer::split_into_words(line, ' ');
        let recording = Recording::classify(&words);

        let code = match words.split_first() {
            None => 0,
            Some((name, rest)) => {
                let args: Vec<&str> = rest.iter().map(String::as_str).collect();
                self.run_with_output(name, &args, stdout)?
            }
        };

        if recording == Recording::Record {
            // The raw line goes into the ledger, not the rejoined words.
            self.env.history.prepend(line);
        }
        Ok(code)
    }

    /// Run a single command invocation by name with arguments.
    pub fn run(&mut self, name: &str, args: &[&str]) -> Result<ExitCode> {
        self.run_with_output(name, args, Box::new(std::io::stdout()))
    }

    fn run_with_output(
        &mut self,
        name: &str,
        args: &[&str],
        mut stdout: Box<dyn Stdout>,
    ) -> Result<ExitCode> {
        let stdin = InheritedStdin(std::io::stdin().lock());
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(Box::new(stdin), stdout, &mut self.env);
            }
        }
        // A resolution miss is an ordinary outcome, not an error.
        writeln!(stdout, "{}: Error command not found", name)?;
        Ok(127)
    }

    /// The interactive Read-Eval-Print Loop.
    ///
    /// Prompts with `osshell> ` until the `exit` built-in sets the exit
    /// flag, or end-of-input is reached (which behaves like `exit`).
    /// Ctrl-C abandons the current line and prompts again. The returned
    /// error, if any, is fatal: the caller exits without saving history.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        while !self.env.should_exit {
            match rl.readline("osshell> ") {
                Ok(line) => {
                    // Feed rustyline's in-session recall; the persistent
                    // ledger is maintained by dispatch itself.
                    rl.add_history_entry(line.as_str())?;
                    self.dispatch(&line)?;
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!();
                    self.env.should_exit = true;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    /// An interpreter over the current process environment with the default
    /// command set.
    fn default() -> Self {
        Self::with_default_commands(Environment::new())
    }
}

struct InheritedStdin<'a>(std::io::StdinLock<'a>);

impl Read for InheritedStdin<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl Stdin for InheritedStdin<'_> {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}
