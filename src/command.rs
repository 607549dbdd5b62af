use crate::env::Environment;
use anyhow::Result;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// How a redirect target file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`: create the file if needed and discard any prior content.
    Write,
    /// `>>`: create the file if needed and write after any prior content.
    Append,
}

/// Where one output stream of a command should go instead of the inherited
/// destination.
///
/// At most one spec is active for stdout and one for stderr per input line.
/// Specs are built fresh by the parser for every line and consumed by the
/// interpreter when it pre-opens the target; they are never retained across
/// prompt cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectSpec {
    /// Target file path, as written on the command line.
    pub path: PathBuf,
    /// Truncate or append.
    pub mode: RedirectMode,
}

impl RedirectSpec {
    pub fn new(path: impl Into<PathBuf>, mode: RedirectMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    /// Open the target file according to the mode.
    ///
    /// The interpreter calls this exactly once per input line, before the
    /// command runs, so the target is created/truncated even when the command
    /// is a built-in, fails, or is missing entirely.
    pub fn open(&self) -> std::io::Result<File> {
        match self.mode {
            RedirectMode::Write => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path),
            RedirectMode::Append => OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.path),
        }
    }
}

/// Abstraction over a readable input stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// Implementors typically wrap standard input. A blanket implementation
/// exists for any type that implements `Read` and `Into<Stdio>`.
pub trait InputSource: Read {
    /// Convert this input into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Read + Into<Stdio>> InputSource for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// Built-ins write to it directly; the external launcher turns it into the
/// child's stdout or stderr. A blanket implementation exists for any type
/// that implements `Write` and `Into<Stdio>`, which covers pre-opened
/// redirect files.
pub trait OutputSink: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> OutputSink for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command, writing to the provided sinks.
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn InputSource>,
        stdout: Box<dyn OutputSink>,
        stderr: Box<dyn OutputSink>,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the environment to resolve executables (e.g., using PATH).
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
