//! Assembles the token stream of one input line into a [`ParsedLine`].
//!
//! Redirection operators and their targets are removed from the line; what
//! remains (`argv`) is the command name and its arguments. When several
//! operators address the same stream, the last occurrence wins. An operator
//! that is not followed by a plain word does not match and is kept in `argv`
//! as literal text.

use crate::command::RedirectSpec;
use crate::lexer::{self, RedirectStream, Token};

/// One fully parsed input line.
///
/// Built fresh for every prompt cycle and never retained: the redirect specs
/// are consumed when the interpreter pre-opens their targets, and `argv` is
/// consumed by dispatch. An empty `argv` means the line held no command
/// (blank, or fully consumed by redirections) and nothing is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Command name followed by its arguments. May be empty.
    pub argv: Vec<String>,
    /// Active stdout redirect, if any.
    pub stdout_redirect: Option<RedirectSpec>,
    /// Active stderr redirect, if any.
    pub stderr_redirect: Option<RedirectSpec>,
}

impl ParsedLine {
    /// The command name and argument slice, or `None` when the line held no
    /// command.
    pub fn command(&self) -> Option<(&str, &[String])> {
        let (name, args) = self.argv.split_first()?;
        Some((name.as_str(), args))
    }
}

/// Parse a raw input line.
pub fn parse_line(line: &str) -> ParsedLine {
    let tokens = lexer::split_into_tokens(line);
    let mut argv = Vec::new();
    let mut stdout_redirect = None;
    let mut stderr_redirect = None;

    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        match token {
            Token::Word(w) => argv.push(w),
            Token::Redirect { stream, mode, text } => {
                match iter.next_if(|t| matches!(t, Token::Word(_))) {
                    Some(Token::Word(target)) => {
                        let spec = RedirectSpec::new(target, mode);
                        match stream {
                            RedirectStream::Stdout => stdout_redirect = Some(spec),
                            RedirectStream::Stderr => stderr_redirect = Some(spec),
                        }
                    }
                    // No target follows: not a redirection, keep the
                    // operator text as a literal word.
                    _ => argv.push(text),
                }
            }
        }
    }

    ParsedLine {
        argv,
        stdout_redirect,
        stderr_redirect,
    }
}
