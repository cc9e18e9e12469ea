//! Shared helpers for integration tests.
//!
//! They mirror a subset of `jpqlkit::test_util` so the integration tests
//! compile without the `test-support` feature.

#![expect(
    dead_code,
    reason = "helpers are reused across multiple tests so some may be unused"
)]

use chrono::{NaiveDate, NaiveDateTime};
use jpqlkit::{Ast, parse};

/// Parse `src`, panicking with the error on failure.
#[track_caller]
pub fn parse_ok(src: &str) -> Ast {
    parse(src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"))
}

/// Collapse whitespace runs to one space and trim both ends.
pub fn normalize_whitespace(src: &str) -> String {
    src.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A fixed instant for macro expansion.
#[track_caller]
pub fn instant(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .and_then(|date| date.and_hms_opt(h, mi, 0))
        .unwrap_or_else(|| panic!("invalid instant"))
}
