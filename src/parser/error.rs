//! Error types produced while tokenising and parsing query text.
//!
//! Every error carries the byte offset at which it was detected. Syntax
//! errors additionally report a 1-based line and column and the set of token
//! kinds that would have been accepted at the furthest position the parser
//! reached.

use std::collections::BTreeSet;
use std::fmt;

use chumsky::Error as _;
use chumsky::error::Simple;
use thiserror::Error;

use crate::{Span, SyntaxKind};

/// The input contains a character no token class recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognised character {character:?} at offset {offset}")]
pub struct LexicalError {
    /// Byte offset of the offending character.
    pub offset: usize,
    pub character: char,
}

/// No grammar alternative accepts the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Byte offset of the unexpected token, or the input length at EOF.
    pub offset: usize,
    /// 1-based line of `offset`.
    pub line: usize,
    /// 1-based column of `offset`, counted in characters.
    pub column: usize,
    /// Token kinds that would have been accepted at `offset`.
    pub expected: BTreeSet<SyntaxKind>,
    /// The token found instead; `T_EOF` at end of input.
    pub found: SyntaxKind,
    /// Extra context for errors not explained by `expected` alone.
    pub note: Option<&'static str>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "syntax error at {}:{}: found {}",
            self.line, self.column, self.found
        )?;
        if !self.expected.is_empty() {
            let expected = self
                .expected
                .iter()
                .map(|k| k.describe())
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, ", expected one of {{{expected}}}")?;
        }
        if let Some(note) = &self.note {
            write!(f, " ({note})")?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxError {}

impl SyntaxError {
    pub(crate) fn new(
        src: &str,
        offset: usize,
        expected: BTreeSet<SyntaxKind>,
        found: SyntaxKind,
    ) -> Self {
        let (line, column) = line_column(src, offset);
        Self {
            offset,
            line,
            column,
            expected,
            found,
            note: None,
        }
    }

    #[must_use]
    pub(crate) fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Convert to a `chumsky` diagnostic spanning the offending token.
    #[must_use]
    pub fn to_simple(&self, span: Span) -> Simple<SyntaxKind> {
        let found = (self.found != SyntaxKind::T_EOF).then_some(self.found);
        let simple =
            Simple::expected_input_found(span, self.expected.iter().copied().map(Some), found);
        match self.note {
            Some(note) => simple.with_label(note),
            None => simple,
        }
    }
}

/// A macro call is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {name} macro at offset {offset}: {message}")]
pub struct MacroSyntaxError {
    /// Byte offset of the macro opener.
    pub offset: usize,
    /// Macro name as written, without `@` and `(`.
    pub name: String,
    pub message: String,
}

impl MacroSyntaxError {
    /// Convert to a `chumsky` diagnostic.
    #[must_use]
    pub fn to_simple(&self, span: Span) -> Simple<SyntaxKind> {
        Simple::custom(span, self.to_string())
    }
}

/// Any failure of [`crate::parse`] and friends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Macro(#[from] MacroSyntaxError),
    /// Parentheses, subqueries or expressions nest deeper than allowed.
    #[error("nesting exceeds {limit} levels at offset {offset}")]
    TooDeep { offset: usize, limit: usize },
}

impl ParseError {
    /// Byte offset at which the error was detected.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::Lexical(e) => e.offset,
            Self::Syntax(e) => e.offset,
            Self::Macro(e) => e.offset,
            Self::TooDeep { offset, .. } => *offset,
        }
    }

    /// The syntax error, if this is one.
    #[must_use]
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(e) => Some(e),
            _ => None,
        }
    }

    /// Convert to a `chumsky` diagnostic located at the error offset.
    #[must_use]
    pub fn to_simple(&self) -> Simple<SyntaxKind> {
        let at = self.offset();
        let span = at..at;
        match self {
            Self::Syntax(e) => e.to_simple(span),
            Self::Macro(e) => e.to_simple(span),
            Self::Lexical(_) | Self::TooDeep { .. } => Simple::custom(span, self.to_string()),
        }
    }
}

/// 1-based line and character column of a byte offset.
pub(crate) fn line_column(src: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (idx, ch) in src.char_indices() {
        if idx >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("select from", 11, (1, 12))]
    #[case("select from", 0, (1, 1))]
    #[case("select e\nfrom", 9, (2, 1))]
    #[case("select e\nfrom x", 14, (2, 6))]
    fn line_and_column(#[case] src: &str, #[case] offset: usize, #[case] expected: (usize, usize)) {
        assert_eq!(line_column(src, offset), expected);
    }

    #[test]
    fn syntax_error_display_lists_expected_kinds() {
        let err = SyntaxError::new(
            "select from",
            11,
            BTreeSet::from([SyntaxKind::T_IDENT]),
            SyntaxKind::T_EOF,
        );
        assert_eq!(
            err.to_string(),
            "syntax error at 1:12: found EOF, expected one of {IDENTIFIER}"
        );
    }

    #[test]
    fn simple_conversion_keeps_expected_set() {
        let err = ParseError::from(SyntaxError::new(
            "select from",
            11,
            BTreeSet::from([SyntaxKind::T_IDENT]),
            SyntaxKind::T_EOF,
        ));
        let simple = err.to_simple();
        assert_eq!(simple.found(), None);
        assert!(simple.expected().any(|k| *k == Some(SyntaxKind::T_IDENT)));
    }

    #[test]
    fn lexical_error_message() {
        let err = LexicalError {
            offset: 7,
            character: '#',
        };
        assert_eq!(err.to_string(), "unrecognised character '#' at offset 7");
    }
}
