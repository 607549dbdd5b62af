//! Lexical analysis for a single input line.
//!
//! The line is split on runs of whitespace into fields, and each field is
//! classified in one pass: either a redirection operator (possibly with its
//! target attached, as in `2>>log`) or a plain word. Recognizing operators as
//! whole fields avoids pattern-matching over the raw string and keeps words
//! that merely contain `>` (like `a>b`) untouched.

use crate::command::RedirectMode;

/// Which standard stream a redirection operator applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStream {
    /// `>`, `>>`, `1>`, `1>>`.
    Stdout,
    /// `2>`, `2>>`.
    Stderr,
}

/// A token resulting from scanning one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A plain word: command name, argument, or redirect target.
    Word(String),
    /// A redirection operator. `text` preserves the operator as written so the
    /// parser can keep it as a literal word when no target follows it.
    Redirect {
        stream: RedirectStream,
        mode: RedirectMode,
        text: String,
    },
}

/// Recognized operator spellings, longest first so that `1>>` is not
/// mistaken for `1>` followed by `>`.
const OPERATORS: &[(&str, RedirectStream, RedirectMode)] = &[
    ("1>>", RedirectStream::Stdout, RedirectMode::Append),
    ("2>>", RedirectStream::Stderr, RedirectMode::Append),
    (">>", RedirectStream::Stdout, RedirectMode::Append),
    ("1>", RedirectStream::Stdout, RedirectMode::Write),
    ("2>", RedirectStream::Stderr, RedirectMode::Write),
    (">", RedirectStream::Stdout, RedirectMode::Write),
];

/// Split a raw input line into tokens.
///
/// An operator is only recognized at the start of a whitespace-delimited
/// field. A field like `>file` yields the operator token followed by a word
/// for the attached target; `foo>bar` and `12>x` are plain words.
pub fn split_into_tokens(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for field in line.split_whitespace() {
        match OPERATORS.iter().find(|(op, _, _)| field.starts_with(op)) {
            Some((op, stream, mode)) => {
                tokens.push(Token::Redirect {
                    stream: *stream,
                    mode: *mode,
                    text: op.to_string(),
                });
                let rest = &field[op.len()..];
                if !rest.is_empty() {
                    tokens.push(Token::Word(rest.to_string()));
                }
            }
            None => tokens.push(Token::Word(field.to_string())),
        }
    }
    tokens
}
