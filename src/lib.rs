//! A tiny interactive command shell.
//!
//! The shell reads one line per prompt, recognizes a small set of built-in
//! commands (`echo`, `cd`, `exit`, `type`, `pwd`) and otherwise resolves the
//! command name against `PATH` and launches it as a child process. Output
//! redirection with `>`, `>>`, `1>`, `1>>`, `2>` and `2>>` is supported for
//! both built-ins and external programs; everything else (pipelines, jobs,
//! expansion, quoting) is intentionally out of scope.
//!
//! The main entry point is [`Interpreter`], which executes one parsed line at
//! a time through a chain of pluggable [`command::CommandFactory`] objects.
//! The public modules [`command`], [`env`] and [`parser`] expose the types
//! needed to implement custom commands or drive the interpreter without the
//! interactive loop.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
mod lexer;
pub mod parser;

/// Convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
