use crate::env::Environment;
use anyhow::Result;
use std::io::{Read, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure,
/// mirroring the convention of POSIX shells.
pub type ExitCode = i32;

/// Abstraction over a readable input stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// In the interactive loop this is the shell's own standard input, handed to
/// children as [`Stdio::inherit`]; tests substitute an in-memory reader.
pub trait Stdin: Read {
    /// Convert this input into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Read + Into<Stdio>> Stdin for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// Built-ins write user-facing output through it directly; the external
/// launcher converts it so the child inherits the shell's stream. A blanket
/// implementation exists for any type that implements `Write` and `Into<Stdio>`.
pub trait Stdout: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> Stdout for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Object-safe trait for any command the shell can execute.
///
/// Implemented by built-ins via a blanket impl and by the external-command
/// launcher.
pub trait ExecutableCommand {
    /// Executes the command. Recoverable problems (bad arguments, a child
    /// that fails on its own) are reported through `stdout` or the exit
    /// code; an `Err` is reserved for failures the shell cannot continue
    /// past.
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`; for the
/// external-command factory that includes names the search paths cannot
/// resolve, which is how "command not found" is detected.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
