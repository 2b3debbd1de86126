use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use log::debug;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// True iff `path` names a regular file the current user may execute.
pub(crate) fn is_executable(path: &Path) -> bool {
    match path.metadata() {
        Ok(metadata) => metadata.is_file() && has_execute_bit(&metadata),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn has_execute_bit(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_bit(_metadata: &fs::Metadata) -> bool {
    true
}

/// Resolve a command name against the session's search paths.
///
/// A name containing a path separator (`./tool`, `bin/tool`, `/usr/bin/ls`)
/// is a direct reference: it is tested literally and never scanned against
/// the search list. A bare name is tried in each search directory in
/// declared order, and the first executable match wins.
///
/// `None` is the ordinary "command not found" outcome, not an error.
pub(crate) fn resolve_command(search_paths: &[PathBuf], name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains(std::path::MAIN_SEPARATOR) {
        let candidate = PathBuf::from(name);
        return is_executable(&candidate).then_some(candidate);
    }

    for dir in search_paths {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            debug!("resolved {} to {}", name, candidate.display());
            return Some(candidate);
        }
    }
    None
}

/// Command that is not a builtin: a resolved executable plus its argv.
pub struct ExternalCommand {
    program: PathBuf,
    argv0: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(program: PathBuf, argv0: OsString, args: Vec<OsString>) -> Self {
        Self {
            program,
            argv0,
            args,
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let program = resolve_command(&env.search_paths, name)?;
        Some(Box::new(ExternalCommand::new(
            program,
            name.into(),
            args.iter().map(|a| a.into()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Spawn the program and block until it terminates.
    ///
    /// The child inherits the shell's streams; nothing is captured or
    /// redirected. Only a process-creation resource failure is propagated as
    /// an error. A program the OS refuses to exec (bad image format, a
    /// permission race after the resolver's check) dies on the child's side
    /// of the fence and the shell keeps going.
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        let mut command = std::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(stdin.stdio())
            .stdout(stdout.stdio());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.arg0(&self.argv0);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) if is_resource_exhaustion(&err) => {
                return Err(err).with_context(|| {
                    format!("cannot create process for {}", self.program.display())
                });
            }
            Err(err) => {
                debug!("failed to launch {}: {}", self.program.display(), err);
                return Ok(126);
            }
        };

        let exit_status = child
            .wait()
            .with_context(|| format!("waiting for {}", self.program.display()))?;
        match exit_status.code() {
            Some(code) => Ok(code),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

/// The one unrecoverable launch failure: the process-creation primitive
/// itself ran out of resources (EAGAIN/ENOMEM).
fn is_resource_exhaustion(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::OutOfMemory | io::ErrorKind::WouldBlock
    )
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::fs::File;

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        File::create(path).expect("create file");
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    #[cfg(unix)]
    fn make_plain_file(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        File::create(path).expect("create file");
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).expect("chmod");
    }

    #[cfg(unix)]
    fn temp_base(tag: &str) -> PathBuf {
        let base = std::env::temp_dir().join(format!("osshell_external_{}_{}", std::process::id(), tag));
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).expect("create temp base");
        base
    }

    #[test]
    #[cfg(unix)]
    fn first_search_path_wins() {
        let base = temp_base("order");
        let first = base.join("first");
        let second = base.join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        make_executable(&first.join("tool"));
        make_executable(&second.join("tool"));

        let found = resolve_command(&[first.clone(), second], "tool").unwrap();
        assert_eq!(found, first.join("tool"));

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_files_are_skipped() {
        let base = temp_base("noexec");
        let first = base.join("first");
        let second = base.join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        make_plain_file(&first.join("tool"));
        make_executable(&second.join("tool"));

        let found = resolve_command(&[first, second.clone()], "tool").unwrap();
        assert_eq!(found, second.join("tool"));

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    #[cfg(unix)]
    fn directories_are_not_executables() {
        let base = temp_base("dir");
        let dir = base.join("bin");
        fs::create_dir_all(dir.join("tool")).unwrap();

        assert_eq!(resolve_command(&[dir], "tool"), None);

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    #[cfg(unix)]
    fn dot_slash_bypasses_search_paths() {
        // `./tool` must only be tested literally: a matching executable in a
        // search directory is ignored.
        let base = temp_base("bypass");
        let dir = base.join("bin");
        fs::create_dir_all(&dir).unwrap();
        make_executable(&dir.join("osshell-local-probe"));

        assert_eq!(resolve_command(&[dir], "./osshell-local-probe"), None);

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    #[cfg(unix)]
    fn path_qualified_name_is_tested_literally() {
        let base = temp_base("literal");
        let tool = base.join("tool");
        make_executable(&tool);

        let name = tool.to_string_lossy().into_owned();
        // Search paths are irrelevant for a qualified name.
        let found = resolve_command(&[], &name).unwrap();
        assert_eq!(found, tool);

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn bare_name_with_empty_search_paths_is_not_found() {
        assert_eq!(resolve_command(&[], "doesnotexist123"), None);
    }

    #[test]
    fn empty_name_is_not_found() {
        assert_eq!(resolve_command(&[PathBuf::from("/bin")], ""), None);
    }

    #[test]
    #[cfg(unix)]
    fn sh_resolves_in_bin() {
        let found = resolve_command(&[PathBuf::from("/bin"), PathBuf::from("/usr/bin")], "sh");
        let found = found.expect("expected to find sh");
        assert!(found.ends_with("sh"));
    }
}
