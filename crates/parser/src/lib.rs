//! Textual notation for transaction schedules.
//!
//! [`parse_schedule`] reads one schedule such as `w1(x) r2(x) a1 c2` into the
//! operations analysed by `sercop_core`; [`parse_schedules`] reads a file with
//! one schedule per line. [`tokenize`] splits the same notation into tokens
//! for highlighting.

pub mod lexer;
pub mod parser;

pub use lexer::{tokenize, tokenize_with_text, Token, TokenKind};
pub use parser::{parse_schedule, parse_schedules, ParseError};
