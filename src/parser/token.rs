use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` in the source the tokens came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest location covering both `self` and `other`.
    pub fn merge(&self, other: &Location) -> Location {
        Location {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn includes(&self, other: &Location) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    Punctuation,
    StringLiteral,
    Comment,
}

/// A lexeme produced by an external lexer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub location: Location,
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(location: Location, kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            location,
            kind,
            text: text.into(),
        }
    }

    /// Sub-token covering the characters `start..end` of the text.
    pub fn slice(&self, start: usize, end: usize) -> Token {
        let text: String = self.text.chars().skip(start).take(end - start).collect();
        let offset: usize = self.text.chars().take(start).map(char::len_utf8).sum();
        Token {
            location: Location::new(
                self.location.start + offset,
                self.location.start + offset + text.len(),
            ),
            kind: self.kind,
            text,
        }
    }

    /// Splits the token into one token per character.
    pub fn separate(&self) -> Vec<Token> {
        (0..self.text.chars().count())
            .map(|i| self.slice(i, i + 1))
            .collect()
    }
}
