//! Assertion helpers for verifying parser results in tests.

use std::collections::BTreeSet;

use chumsky::error::Simple;

use super::{normalize_whitespace, parse_ok};
use crate::{ParseError, SyntaxKind, parse, printer};

/// Assert that a batch of diagnostics is empty.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-support")]
/// # {
/// use jpqlkit::test_util::assert_no_parse_errors;
/// let errors: Vec<chumsky::error::Simple<jpqlkit::SyntaxKind>> = Vec::new();
/// assert_no_parse_errors(&errors);
/// # }
/// ```
///
/// # Panics
/// Panics if `errors` is not empty.
#[track_caller]
pub fn assert_no_parse_errors<E: std::fmt::Debug>(errors: &[E]) {
    assert!(errors.is_empty(), "Parse errors: {errors:?}");
}

/// Assert that parsing `src` fails with a diagnostic whose rendering
/// contains `pattern` and which starts at byte `offset`.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-support")]
/// # {
/// use jpqlkit::test_util::assert_parse_error;
/// assert_parse_error("select e from E e where e.a = ", "syntax error at 1:31", 30);
/// # }
/// ```
///
/// # Panics
/// Panics if `src` parses or the diagnostic does not match.
#[track_caller]
pub fn assert_parse_error(src: &str, pattern: &str, offset: usize) {
    let Err(err) = parse(src) else {
        panic!("expected {src:?} to fail");
    };
    let simple: Simple<SyntaxKind> = err.to_simple();
    let rendered = format!("{simple:?} / {err}");
    assert!(
        rendered.contains(pattern),
        "expected error to contain {pattern:?}, got {rendered}"
    );
    assert_eq!(simple.span().start, offset, "{rendered}");
}

/// Assert that parsing `src` fails with exactly this syntax error.
///
/// # Panics
/// Panics if `src` parses or fails differently.
#[track_caller]
pub fn assert_syntax_error(src: &str, offset: usize, expected: &[SyntaxKind], found: SyntaxKind) {
    let err = match parse(src) {
        Ok(_) => panic!("expected {src:?} to fail"),
        Err(ParseError::Syntax(err)) => err,
        Err(other) => panic!("expected a syntax error for {src:?}, got {other:?}"),
    };
    assert_eq!(err.offset, offset, "offset of {err}");
    assert_eq!(
        err.expected,
        expected.iter().copied().collect::<BTreeSet<_>>(),
        "expected set of {err}"
    );
    assert_eq!(err.found, found, "found token of {err}");
}

/// Assert that an unmodified parse prints as the whitespace-normalised
/// input. `src` must not contain comments.
///
/// # Panics
/// Panics if `src` does not parse or prints differently.
#[track_caller]
pub fn assert_round_trip(src: &str) {
    let ast = parse_ok(src);
    assert_eq!(printer::print(&ast), normalize_whitespace(src));
}

/// Assert that printing `src` and parsing the result gives an equal tree
/// that prints the same way.
///
/// # Panics
/// Panics if either parse fails or the trees or texts differ.
#[track_caller]
pub fn assert_reparses_identically(src: &str) {
    let first = parse_ok(src);
    let printed = printer::print(&first);
    let second = parse_ok(&printed);
    assert_eq!(first.root(), second.root(), "tree changed after printing {printed:?}");
    assert_eq!(printer::print(&second), printed);
}
