use thiserror::Error;

use crate::parser::Location;

/// Errors raised while building a grammar, its FIRST/FOLLOW sets or its LL(1)
/// table. All of them abort construction of a [`crate::Parser`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Line {line_number}: expected \"<A> -> symbols...\", found \"{line}\"")]
    Format { line_number: usize, line: String },
    #[error("Line {line_number}: lambda must be the only symbol of a production")]
    MisplacedLambda { line_number: usize },
    #[error("non-terminal {name} is used but has no production")]
    UndefinedNonTerminal { name: String },
    #[error("grammar contains no production")]
    Empty,
    #[error("left recursion detected while computing FIRST({non_terminal})")]
    LeftRecursion { non_terminal: String },
    #[error("FOLLOW sets did not settle after {passes} passes")]
    FollowClosure { passes: usize },
    #[error(
        "LL(1) conflict at [{non_terminal}, {terminal}]: \"{existing}\" and \"{conflicting}\""
    )]
    TableConflict {
        non_terminal: String,
        terminal: String,
        existing: String,
        conflicting: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A terminal on the stack did not match the current token.
    Mismatch,
    /// The table has no production for the non-terminal and the current token.
    NoProduction,
    /// The input ended while symbols were still expected.
    UnexpectedEnd,
    /// Tokens remained after the start symbol was fully derived.
    TrailingInput,
}

/// A syntax error in the token stream. Always recoverable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error{}: {}", near(.found), .message)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub location: Option<Location>,
    /// Text of the offending token, `None` at end of input.
    pub found: Option<String>,
    /// Name of the grammar symbol that was expected, if any.
    pub expected: Option<String>,
    pub message: String,
}

impl SyntaxError {
    /// The error followed by the source line that contains it, with the
    /// offending span underlined:
    ///
    /// ```text
    /// syntax error near word ";": unexpected token, expecting <E>
    ///     | x = ;
    ///     |     ^
    /// ```
    ///
    /// Falls back to the bare message when there is no location or it lies
    /// outside `source`.
    pub fn render(&self, source: &str) -> String {
        match self.location.and_then(|location| excerpt(source, location)) {
            Some(excerpt) => format!("{}\n{}", self, excerpt),
            None => self.to_string(),
        }
    }
}

/// Source line containing `location.start` and a caret row under the span.
/// Columns are counted in chars; the span is cut at the end of the line.
fn excerpt(source: &str, location: Location) -> Option<String> {
    let mut line_start = 0;
    for line in source.split('\n') {
        let line_end = line_start + line.len();
        if location.start <= line_end {
            let start = location.start - line_start;
            let end = location.end.clamp(location.start, line_end) - line_start;
            let line = line.trim_end_matches('\r');
            let indent = line.get(..start)?.chars().count();
            let width = line.get(start..end.min(line.len())).map_or(0, |s| s.chars().count());
            return Some(format!(
                "    | {}\n    | {}{}",
                line,
                " ".repeat(indent),
                "^".repeat(width.max(1))
            ));
        }
        line_start = line_end + 1;
    }
    None
}

fn near(found: &Option<String>) -> String {
    match found {
        Some(text) => format!(" near word \"{}\"", text),
        None => String::new(),
    }
}
