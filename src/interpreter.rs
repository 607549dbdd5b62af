use crate::command::{CommandFactory, ExitCode, InputSource, OutputSink, RedirectSpec};
use crate::env::Environment;
use crate::parser;
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{Read, Write};
use std::process::Stdio;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate — BuiltinCommand and ExternalCommand.
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

/// A minimal shell interpreter that executes built-in and external commands,
/// one line at a time.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`]
/// objects that are queried in order to create commands by name; built-in
/// factories come before the external launcher, so builtins shadow PATH
/// entries of the same name. See [`Default`] for the factories included out
/// of the box.
///
/// Example
/// ```
/// use minishell::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run_line("echo hello world").unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    /// Read-only view of the interpreter's environment.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Execute one already-read input line: parse it, pre-open any redirect
    /// targets, and dispatch the command.
    ///
    /// Returns the command's exit code, 127 when the name resolves to nothing,
    /// or an error when a redirect target cannot be opened
    /// or the command fails to execute.
    pub fn run_line(&mut self, line: &str) -> Result<ExitCode> {
        let parsed = parser::parse_line(line);

        // Redirect targets are created/truncated exactly once per line,
        // before dispatch, even when the command is a builtin, is missing,
        // or the line held nothing but the redirection itself.
        let stdout_file = self.open_redirect(parsed.stdout_redirect.as_ref())?;
        let stderr_file = self.open_redirect(parsed.stderr_redirect.as_ref())?;

        let Some((name, args)) = parsed.command() else {
            return Ok(0);
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let created = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, name, &args));

        match created {
            Some(cmd) => {
                let stdin = Box::new(InheritedStdin(std::io::stdin().lock()));
                let stdout: Box<dyn OutputSink> = match stdout_file {
                    Some(file) => Box::new(file),
                    None => Box::new(InheritedStdout),
                };
                let stderr: Box<dyn OutputSink> = match stderr_file {
                    Some(file) => Box::new(file),
                    None => Box::new(InheritedStderr),
                };
                cmd.execute(stdin, stdout, stderr, &mut self.env)
            }
            None => {
                // Resolution failure is an outcome, not an error: report it
                // on the stderr sink (honoring a redirect) and keep going.
                let mut sink: Box<dyn Write> = match stderr_file {
                    Some(file) => Box::new(file),
                    None => Box::new(std::io::stderr()),
                };
                writeln!(sink, "{}: command not found", name)?;
                Ok(127)
            }
        }
    }

    fn open_redirect(&self, spec: Option<&RedirectSpec>) -> Result<Option<File>> {
        spec.map(|s| {
            s.open()
                .with_context(|| format!("{}: cannot open redirect target", s.path.display()))
        })
        .transpose()
    }

    /// Run the interactive Read-Eval-Print Loop until `exit` or end of input.
    ///
    /// Returns the exit code the process should terminate with. A command
    /// failure (including a redirect target that cannot be opened) is
    /// reported on the shell's stderr and the loop continues; only `exit`
    /// and end-of-input leave it.
    pub fn repl(&mut self) -> Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("$ ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    if let Err(e) = self.run_line(&line) {
                        eprintln!("{}", e);
                    }
                    if self.env.should_exit {
                        return Ok(self.env.exit_code);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                // Closed input is an implicit `exit 0`.
                Err(ReadlineError::Eof) => return Ok(0),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `pwd`, `cd`, `echo`, `exit`, `type`
    /// - external command launcher (queried last)
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Type>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

struct InheritedStdin<'a>(std::io::StdinLock<'a>);

impl Read for InheritedStdin<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl InputSource for InheritedStdin<'_> {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

struct InheritedStdout;

impl Write for InheritedStdout {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stdout().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}

impl OutputSink for InheritedStdout {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

struct InheritedStderr;

impl Write for InheritedStderr {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stderr().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()
    }
}

impl OutputSink for InheritedStderr {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "minishell_interp_{}_{}_{}",
            tag,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn echo_redirects_stdout_to_file() {
        let path = temp_file("echo");
        let mut sh = Interpreter::default();

        let code = sh.run_line(&format!("echo hello > {}", path.display())).unwrap();
        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn append_preserves_earlier_output() {
        let path = temp_file("append");
        let mut sh = Interpreter::default();

        sh.run_line(&format!("echo hi > {}", path.display())).unwrap();
        sh.run_line(&format!("echo second >> {}", path.display()))
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hi\nsecond\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn write_mode_truncates_earlier_output() {
        let path = temp_file("trunc");
        let mut sh = Interpreter::default();

        sh.run_line(&format!("echo first > {}", path.display())).unwrap();
        sh.run_line(&format!("echo replaced > {}", path.display()))
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "replaced\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn only_the_winning_redirect_target_is_opened() {
        let first = temp_file("overridden");
        let second = temp_file("winner");
        let mut sh = Interpreter::default();

        let code = sh
            .run_line(&format!("echo a > {} > {}", first.display(), second.display()))
            .unwrap();

        assert_eq!(code, 0);
        // The earlier operator was overwritten during parsing, so its target
        // is never created, let alone truncated.
        assert!(!first.exists());
        assert_eq!(fs::read_to_string(&second).unwrap(), "a\n");

        let _ = fs::remove_file(&second);
    }

    #[test]
    fn unknown_command_reports_on_redirected_stderr() {
        let path = temp_file("notfound");
        let mut sh = Interpreter::default();

        let code = sh
            .run_line(&format!("no_such_cmd_xyz 2> {}", path.display()))
            .unwrap();

        assert_eq!(code, 127);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "no_such_cmd_xyz: command not found\n"
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn builtin_error_honors_stderr_redirect() {
        let path = temp_file("cderr");
        let mut sh = Interpreter::default();

        let code = sh
            .run_line(&format!("cd missing_dir_xyz 2> {}", path.display()))
            .unwrap();

        assert_eq!(code, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "cd: missing_dir_xyz: No such file or directory\n"
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn redirect_only_line_creates_the_file() {
        let path = temp_file("bare");
        let mut sh = Interpreter::default();

        let code = sh.run_line(&format!("> {}", path.display())).unwrap();
        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn exit_marks_environment_for_termination() {
        let mut sh = Interpreter::default();
        let code = sh.run_line("exit 3").unwrap();
        assert_eq!(code, 3);
        assert!(sh.env().should_exit);
        assert_eq!(sh.env().exit_code, 3);
    }

    #[test]
    #[cfg(unix)]
    fn external_command_output_lands_in_redirect_file() {
        let path = temp_file("external");
        let mut sh = Interpreter::default();

        // `/bin/echo` bypasses the builtin factory because it carries a
        // path separator and resolves directly.
        let code = sh
            .run_line(&format!("/bin/echo from-child > {}", path.display()))
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "from-child\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    #[cfg(unix)]
    fn external_exit_code_is_propagated() {
        let mut sh = Interpreter::default();
        let code = sh.run_line("false").unwrap();
        assert_eq!(code, 1);
        let code = sh.run_line("true").unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn redirect_open_failure_is_an_error_not_a_panic() {
        let mut sh = Interpreter::default();
        let res = sh.run_line("echo hi > /definitely/not/a/dir/out.txt");
        assert!(res.is_err());
    }
}
