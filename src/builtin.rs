use crate::command::{CommandFactory, ExecutableCommand, ExitCode, InputSource, OutputSink};
use crate::env::Environment;
use crate::external;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Names of the commands implemented directly by the interpreter.
///
/// Membership in this set is decided without touching the filesystem.
pub(crate) const BUILTIN_NAMES: &[&str] = &["echo", "cd", "exit", "type", "pwd"];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process. Output goes to the provided
/// sinks, which are either the inherited streams or pre-opened redirect files.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command using the provided output sinks and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        _stdin: Box<dyn InputSource>,
        mut stdout: Box<dyn OutputSink>,
        mut stderr: Box<dyn OutputSink>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match T::execute(*self, &mut stdout, &mut stderr, env) {
            Ok(code) => Ok(code),
            Err(e) => {
                writeln!(stderr, "{}", e)?;
                Ok(1)
            }
        }
    }
}

/// Produced when argh rejects the arguments (or handles `--help` itself).
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: Box<dyn InputSource>,
        mut stdout: Box<dyn OutputSink>,
        mut stderr: Box<dyn OutputSink>,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        if self.is_error {
            stderr.write_all(self.output.as_bytes())?;
            Ok(1)
        } else {
            stdout.write_all(self.output.as_bytes())?;
            Ok(0)
        }
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
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// With no target, or a literal `~`, changes to the directory in $HOME.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let target = match self.target.as_deref() {
            Some("~") | Some("") | None => env
                .home_dir()
                .context("cd: HOME not set")?
                .to_string_lossy()
                .into_owned(),
            Some(t) => t.to_string(),
        };

        let path = PathBuf::from(&target);
        let new_dir = if path.is_absolute() {
            path
        } else {
            env.current_dir.join(path)
        };

        if !new_dir.is_dir() {
            writeln!(stderr, "cd: {}: No such file or directory", target)?;
            return Ok(1);
        }

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;
        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell with the given code, defaulting to 0 when the code is
/// absent or not an integer.
pub struct Exit {
    #[argh(positional)]
    /// exit code for the shell process.
    pub code: Option<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let code = self
            .code
            .as_deref()
            .and_then(|c| c.parse::<ExitCode>().ok())
            .unwrap_or(0);
        env.should_exit = true;
        env.exit_code = code;
        Ok(code)
    }
}

#[derive(FromArgs)]
/// Write the arguments to standard output, separated by spaces and
/// terminated with a newline.
pub struct Echo {
    #[argh(positional, greedy)]
    /// values to print, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        let joined = self.args.join(" ");
        writeln!(stdout, "{}", strip_outer_quotes(&joined))?;
        Ok(0)
    }
}

/// Strip exactly one outer pair of matching quotes from the joined argument
/// text. Deliberately naive: first and last character only, no escape
/// sequences, no per-argument processing.
fn strip_outer_quotes(text: &str) -> &str {
    let stripped = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')));
    stripped.unwrap_or(text)
}

#[derive(FromArgs)]
/// Report whether a name is a shell builtin or an executable on PATH.
pub struct Type {
    #[argh(positional)]
    /// command name to look up.
    pub name: Option<String>,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let Some(name) = self.name.as_deref() else {
            return Ok(0);
        };

        if is_builtin(name) {
            writeln!(stdout, "{} is a shell builtin", name)?;
            return Ok(0);
        }

        let search_paths = env.get_var("PATH").unwrap_or_default();
        match external::find_in_path(OsStr::new(&search_paths), name) {
            Some(path) => {
                writeln!(stdout, "{} is {}", name, path.display())?;
                Ok(0)
            }
            None => {
                writeln!(stderr, "{}: not found", name)?;
                Ok(1)
            }
        }
    }
}
