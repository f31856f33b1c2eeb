//! Winnow-based parser for the textual schedule notation.
//!
//! Grammar:
//! ```text
//! schedules  = (line NEWLINE)* line?
//! line       = WHITESPACE* (operation WHITESPACE*)* comment?
//! comment    = "//" REST_OF_LINE
//! schedule   = SPACE* (operation SPACE*)*        -- SPACE includes newlines
//! operation  = "r" tid "(" variable ")"          -- read
//!            | "w" tid "^-1"? "(" variable ")"   -- write, compensating with ^-1
//!            | "c" tid                           -- commit
//!            | "a" tid                           -- abort
//! tid        = DIGIT+
//! variable   = (ALPHA | "_") (ALPHANUMERIC | "_")*
//! ```
//!
//! Operations may be separated by whitespace or written back to back, as in
//! `r1(x)w2(x)c1c2`.

use sercop_core::schedule::Schedule;
use sercop_core::{Operation, TransactionId};
use winnow::ascii::{dec_uint, line_ending, multispace0, till_line_ending};
use winnow::combinator::{alt, delimited, eof, opt, preceded, repeat, terminated};
use winnow::prelude::*;
use winnow::token::{literal, one_of, take_while};
use winnow::ModalResult;

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// A parse error with human-readable location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Parse a single schedule, e.g. `r1(x) w2(x) c1 c2`.
///
/// Any whitespace, including newlines, may separate operations.
///
/// # Errors
///
/// Returns a [`ParseError`] pointing at the first character that does not
/// start a valid operation.
pub fn parse_schedule(input: &str) -> Result<Schedule<String>, ParseError> {
    let mut stream: &str = input;
    let schedule = schedule_parser
        .parse_next(&mut stream)
        .map_err(|_| error_at(input, stream))?;
    tracing::debug!(operations = schedule.len(), "parsed schedule");
    Ok(schedule)
}

/// Parse a schedule file: one schedule per line.
///
/// Blank lines and `//` comments, on their own line or after a schedule, are
/// skipped.
///
/// # Errors
///
/// Returns a [`ParseError`] with the line and column of the first invalid
/// operation.
pub fn parse_schedules(input: &str) -> Result<Vec<Schedule<String>>, ParseError> {
    let mut stream: &str = input;
    let schedules = schedules_parser
        .parse_next(&mut stream)
        .map_err(|_| error_at(input, stream))?;
    tracing::debug!(schedules = schedules.len(), "parsed schedule file");
    Ok(schedules)
}

// ---------------------------------------------------------------------------
// Error reporting
// ---------------------------------------------------------------------------

/// Build a [`ParseError`] for the position where `rest` starts in `original`.
fn error_at(original: &str, rest: &str) -> ParseError {
    let consumed = original.len().saturating_sub(rest.len());
    let (line, column) = offset_to_line_col(original, consumed);
    let found: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace())
        .take(16)
        .collect();
    let message = if found.is_empty() {
        "expected an operation".to_string()
    } else {
        format!("expected an operation, found `{found}`")
    };
    ParseError {
        message,
        line,
        column,
    }
}

/// Convert a byte offset into the original input to 1-based (line, column).
fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let safe_offset = offset.min(input.len());
    let prefix = &input[..safe_offset];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
    let last_line = prefix.rfind('\n').map_or(prefix, |pos| &prefix[pos + 1..]);
    let column = last_line.chars().count() + 1;
    (line, column)
}

// ---------------------------------------------------------------------------
// Whitespace helpers
// ---------------------------------------------------------------------------

/// Optional inline whitespace: spaces and tabs only (no newlines).
fn opt_inline_ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c == ' ' || c == '\t')
        .void()
        .parse_next(input)
}

// ---------------------------------------------------------------------------
// Leaf parsers
// ---------------------------------------------------------------------------

fn transaction_id(input: &mut &str) -> ModalResult<TransactionId> {
    dec_uint::<_, u64, _>.map(TransactionId).parse_next(input)
}

/// A variable name: a letter or `_`, then letters, digits or `_`.
fn variable(input: &mut &str) -> ModalResult<String> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(str::to_string)
        .parse_next(input)
}

fn parenthesized_variable(input: &mut &str) -> ModalResult<String> {
    delimited(literal("("), variable, literal(")")).parse_next(input)
}

// ---------------------------------------------------------------------------
// Operation parsers
// ---------------------------------------------------------------------------

/// `"r" tid "(" variable ")"`
fn read(input: &mut &str) -> ModalResult<Operation<String>> {
    literal("r").parse_next(input)?;
    let transaction = transaction_id.parse_next(input)?;
    let variable = parenthesized_variable.parse_next(input)?;
    Ok(Operation::read(transaction, variable))
}

/// `"w" tid "^-1"? "(" variable ")"`
fn write(input: &mut &str) -> ModalResult<Operation<String>> {
    literal("w").parse_next(input)?;
    let transaction = transaction_id.parse_next(input)?;
    let inverse = opt(literal("^-1")).parse_next(input)?;
    let variable = parenthesized_variable.parse_next(input)?;
    if inverse.is_some() {
        Ok(Operation::compensating_write(transaction, variable))
    } else {
        Ok(Operation::write(transaction, variable))
    }
}

/// `"c" tid`
fn commit(input: &mut &str) -> ModalResult<Operation<String>> {
    preceded(literal("c"), transaction_id)
        .map(Operation::commit)
        .parse_next(input)
}

/// `"a" tid`
fn abort(input: &mut &str) -> ModalResult<Operation<String>> {
    preceded(literal("a"), transaction_id)
        .map(Operation::abort)
        .parse_next(input)
}

fn operation(input: &mut &str) -> ModalResult<Operation<String>> {
    alt((read, write, commit, abort)).parse_next(input)
}

// ---------------------------------------------------------------------------
// Schedule parsers
// ---------------------------------------------------------------------------

/// A whole input holding one schedule.
///
/// `repeat` stops in front of the first invalid operation, so a failing `eof`
/// leaves the stream at the offending position.
fn schedule_parser(input: &mut &str) -> ModalResult<Schedule<String>> {
    multispace0.parse_next(input)?;
    let operations = repeat(0.., terminated(operation, multispace0)).parse_next(input)?;
    eof.parse_next(input)?;
    Ok(operations)
}

/// A comment running to the end of the line.
fn comment(input: &mut &str) -> ModalResult<()> {
    (literal("//"), till_line_ending).void().parse_next(input)
}

/// One line of a schedule file; `None` for blank and comment-only lines.
fn schedule_line(input: &mut &str) -> ModalResult<Option<Schedule<String>>> {
    opt_inline_ws.parse_next(input)?;
    let operations: Schedule<String> =
        repeat(0.., terminated(operation, opt_inline_ws)).parse_next(input)?;
    opt(comment).parse_next(input)?;
    alt((line_ending.void(), eof.void())).parse_next(input)?;
    Ok((!operations.is_empty()).then_some(operations))
}

fn schedules_parser(input: &mut &str) -> ModalResult<Vec<Schedule<String>>> {
    let mut schedules = Vec::new();
    while !input.is_empty() {
        if let Some(schedule) = schedule_line.parse_next(input)? {
            schedules.push(schedule);
        }
    }
    Ok(schedules)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use sercop_core::schedule::format_schedule;

    use super::*;

    // Shorthand constructors for tests.
    fn r(t: u64, var: &str) -> Operation<String> {
        Operation::read(TransactionId(t), var.to_string())
    }
    fn w(t: u64, var: &str) -> Operation<String> {
        Operation::write(TransactionId(t), var.to_string())
    }
    fn u(t: u64, var: &str) -> Operation<String> {
        Operation::compensating_write(TransactionId(t), var.to_string())
    }
    fn c(t: u64) -> Operation<String> {
        Operation::commit(TransactionId(t))
    }
    fn a(t: u64) -> Operation<String> {
        Operation::abort(TransactionId(t))
    }

    // -----------------------------------------------------------------------
    // Happy-path tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_space_separated() {
        let result = parse_schedule("r1(x) w2(x) c1 a2").expect("should parse");
        assert_eq!(result, vec![r(1, "x"), w(2, "x"), c(1), a(2)]);
    }

    #[test]
    fn test_concatenated() {
        let result = parse_schedule("w0(x)r1(x)c0a1").expect("should parse");
        assert_eq!(result, vec![w(0, "x"), r(1, "x"), c(0), a(1)]);
    }

    #[test]
    fn test_multi_digit_ids_and_long_names() {
        let result = parse_schedule("r12(balance_1) c12").expect("should parse");
        assert_eq!(result, vec![r(12, "balance_1"), c(12)]);
    }

    #[test]
    fn test_compensating_write() {
        let result = parse_schedule("w1(x) w1^-1(x) c1").expect("should parse");
        assert_eq!(result, vec![w(1, "x"), u(1, "x"), c(1)]);
    }

    #[test]
    fn test_surrounding_whitespace_and_newlines() {
        let result = parse_schedule("\n  w1(x)\n\tc1 \n").expect("should parse");
        assert_eq!(result, vec![w(1, "x"), c(1)]);
        assert_eq!(parse_schedule("   ").expect("should parse"), vec![]);
    }

    #[test]
    fn test_format_round_trip() {
        let input = "w1(x) r2(x) w1^-1(x) c1 c2 a3";
        let parsed = parse_schedule(input).expect("should parse");
        assert_eq!(format_schedule(&parsed), input);
    }

    #[test]
    fn test_schedule_file() {
        let input = "\
// lost update
r1(x) r2(x) w1(x) w2(x) c1 c2

w1(x) a1 w2(x) c2 // abort
   // indented comment
c3";
        let result = parse_schedules(input).expect("should parse file");
        assert_eq!(result.len(), 3);
        assert_eq!(
            result[0],
            vec![r(1, "x"), r(2, "x"), w(1, "x"), w(2, "x"), c(1), c(2)]
        );
        assert_eq!(result[1], vec![w(1, "x"), a(1), w(2, "x"), c(2)]);
        assert_eq!(result[2], vec![c(3)]);
    }

    #[test]
    fn test_schedule_file_with_crlf() {
        let result = parse_schedules("c1\r\nc2\r\n").expect("should parse");
        assert_eq!(result, vec![vec![c(1)], vec![c(2)]]);
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_schedules("").expect("should parse").is_empty());
        assert!(parse_schedules("// nothing\n\n").expect("should parse").is_empty());
    }

    // -----------------------------------------------------------------------
    // Error tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_error_points_at_bad_operation() {
        let err = parse_schedule("r1(x) x1 c1").expect_err("should fail");
        assert_eq!((err.line, err.column), (1, 7));
        assert!(err.message.contains("`x1`"), "{err}");
    }

    #[test]
    fn test_missing_parenthesis() {
        let err = parse_schedule("w1(x c1").expect_err("should fail");
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_missing_transaction_id() {
        let err = parse_schedule("c1 r(x)").expect_err("should fail");
        assert_eq!((err.line, err.column), (1, 4));
    }

    #[test]
    fn test_file_error_has_line_column() {
        let input = "c1\n// ok\nw2(x) @bad\n";
        let err = parse_schedules(input).expect_err("should fail");
        assert_eq!((err.line, err.column), (3, 7));
        let msg = err.to_string();
        assert!(msg.contains("parse error"), "{msg}");
        assert!(msg.contains("line 3"), "{msg}");
    }

    #[test]
    fn test_offset_to_line_col_first_line() {
        assert_eq!(offset_to_line_col("hello\nworld\n", 0), (1, 1));
    }

    #[test]
    fn test_offset_to_line_col_second_line() {
        // "hello\n" is 6 bytes; offset 6 is start of second line.
        assert_eq!(offset_to_line_col("hello\nworld\n", 6), (2, 1));
        assert_eq!(offset_to_line_col("hello\nworld\n", 8), (2, 3));
    }
}
