//! Helpers for parsing fixtures and asserting parser behaviour in tests.
//!
//! These functions reduce boilerplate when checking round trips and when
//! verifying that failures surface precise offsets and expected-token sets.

mod assertions;

pub use assertions::{
    assert_no_parse_errors, assert_parse_error, assert_reparses_identically, assert_round_trip,
    assert_syntax_error,
};

use crate::{Ast, SyntaxKind, parse, tokenize};

/// Parse `src`, panicking with the error on failure.
///
/// # Panics
/// Panics if `src` does not parse.
#[must_use]
#[track_caller]
pub fn parse_ok(src: &str) -> Ast {
    parse(src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"))
}

/// Kinds of the significant tokens of `src`.
///
/// # Examples
///
/// ```rust,no_run
/// # #[cfg(feature = "test-support")]
/// # {
/// use jpqlkit::{SyntaxKind, test_util::kinds};
/// assert_eq!(kinds("e.a")[1], SyntaxKind::T_DOT);
/// # }
/// ```
///
/// # Panics
/// Panics if `src` does not lex.
#[must_use]
#[track_caller]
pub fn kinds(src: &str) -> Vec<SyntaxKind> {
    tokenize(src)
        .unwrap_or_else(|e| panic!("lexing failed for {src:?}: {e}"))
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

/// Collapse whitespace runs to one space and trim both ends.
#[must_use]
pub fn normalize_whitespace(src: &str) -> String {
    src.split_whitespace().collect::<Vec<_>>().join(" ")
}
