use crate::command::{CommandFactory, ExecutableCommand, ExitCode, InputSource, OutputSink};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Command that is not a builtin: a program resolved to a filesystem path.
pub struct ExternalCommand {
    /// Name as typed on the command line, used in error reports.
    name: String,
    /// Resolved path used as the executable image.
    path: PathBuf,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: String, path: PathBuf, args: Vec<OsString>) -> Self {
        Self { name, path, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let path = resolve(env, name)?;
        Some(Box::new(ExternalCommand::new(
            name.to_string(),
            path,
            args.iter().map(|x| x.into()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn InputSource>,
        stdout: Box<dyn OutputSink>,
        stderr: Box<dyn OutputSink>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let mut command = std::process::Command::new(&self.path);
        command
            .args(&self.args)
            .stdin(stdin.stdio())
            .stdout(stdout.stdio())
            .stderr(stderr.stdio())
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir);

        // The child sees its own base name as argv[0], not the resolved path.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if let Some(base) = self.path.file_name() {
                command.arg0(base);
            }
        }

        // A spawn failure after successful resolution (file removed or
        // permission changed since the PATH scan) is not fatal to the shell.
        let mut child = command
            .spawn()
            .with_context(|| format!("{}: command not found", self.name))?;
        let exit_status = child.wait()?;
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command name to an executable path.
///
/// A name containing a path separator (absolute or relative) is used directly
/// when it names an existing executable file. A bare name is searched through
/// the PATH directories in order.
fn resolve(env: &Environment, name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    if path.components().count() > 1 || name.contains('/') {
        return (path.is_file() && is_executable(path)).then(|| path.to_path_buf());
    }
    let search_paths = env.get_var("PATH")?;
    find_executable(OsStr::new(&search_paths), name)
}

/// First `dir/name` in the search path that exists and is a regular file.
///
/// Used by `type`, which reports matches without requiring the execute bit.
pub(crate) fn find_in_path(search_paths: &OsStr, name: &str) -> Option<PathBuf> {
    scan_path(search_paths, name, |p| p.is_file())
}

/// First `dir/name` in the search path that is a regular, executable file.
pub(crate) fn find_executable(search_paths: &OsStr, name: &str) -> Option<PathBuf> {
    scan_path(search_paths, name, |p| p.is_file() && is_executable(p))
}

fn scan_path(
    search_paths: &OsStr,
    name: &str,
    accept: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| accept(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
