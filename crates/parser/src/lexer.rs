//! Logos-based lexer for the textual schedule notation.
//!
//! A schedule is a sequence of operations: `r1(x)` reads `x` in transaction
//! 1, `w1(x)` writes it, `w1^-1(x)` is a compensating write, `c1` commits and
//! `a1` aborts. Schedule files hold one schedule per line and `//` comments.
//!
//! # Example input
//!
//! ```text
//! // lost update
//! r1(x) r2(x) w1(x) w2(x) c1 c2
//! ```
//!
//! The lexer is meant for tokenization and highlighting of whitespace
//! separated input. A commit or abort glued to a following identifier
//! (`c1a2`) lexes as one [`TokenKind::Ident`]; [`parse_schedule`] accepts
//! such input regardless.
//!
//! [`parse_schedule`]: crate::parse_schedule

use core::ops::Range;

/// All token kinds produced by the schedule lexer.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(::logos::Logos, Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A line comment starting with `//` and running to end of line.
    #[regex(r"//[^\n]*", allow_greedy = true)]
    Comment,

    /// Read opcode with its transaction id, e.g. `r1`.
    #[regex(r"r[0-9]+", priority = 5)]
    Read,

    /// Write opcode with its transaction id, e.g. `w1`.
    #[regex(r"w[0-9]+", priority = 5)]
    Write,

    /// Commit of a transaction, e.g. `c1`.
    #[regex(r"c[0-9]+", priority = 5)]
    Commit,

    /// Abort of a transaction, e.g. `a1`.
    #[regex(r"a[0-9]+", priority = 5)]
    Abort,

    /// Compensating-write marker `^-1`.
    #[token("^-1")]
    Inverse,

    /// Opening parenthesis `(`.
    #[token("(")]
    ParenOpen,

    /// Closing parenthesis `)`.
    #[token(")")]
    ParenClose,

    /// A variable name.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// A newline (`\n` or `\r\n`).
    #[regex(r"\r?\n")]
    Newline,

    /// Spaces or tabs.
    #[regex(r"[ \t]+")]
    Whitespace,
}

/// A single token with its kind and the byte-offset span in the source.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range `start..end` into the original input string.
    pub span: Range<usize>,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }

    /// Return the source text for this token given the original input.
    #[must_use]
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.span.clone()]
    }
}

/// Tokenize `input` and return all valid tokens.
///
/// Tokens that the lexer cannot recognise are silently skipped.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    use logos::Logos as _;
    TokenKind::lexer(input)
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|kind| Token { kind, span }))
        .collect()
}

/// Tokenize `input` and return tokens paired with their source text slices.
///
/// Tokens that the lexer cannot recognise are silently skipped.
#[must_use]
pub fn tokenize_with_text(input: &str) -> Vec<(Token, &str)> {
    tokenize(input)
        .into_iter()
        .map(|token| {
            let text = token.text(input);
            (token, text)
        })
        .collect()
}
