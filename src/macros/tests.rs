use chrono::{NaiveDate, NaiveDateTime};
use rstest::{fixture, rstest};

use super::*;
use crate::parser::ast::Literal;
use crate::parser::parse;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .and_then(|date| date.and_hms_opt(h, mi, 0))
        .unwrap_or_else(|| panic!("invalid test instant"))
}

#[fixture]
fn now() -> NaiveDateTime {
    at(2024, 5, 16, 14, 35)
}

fn expanded(src: &str, expander: &Expander<'_>) -> (String, Expansion) {
    let mut ast = parse(src).unwrap_or_else(|e| panic!("parse failed for {src}: {e}"));
    let expansion = expander
        .expand(&mut ast)
        .unwrap_or_else(|e| panic!("expansion failed for {src}: {e}"));
    (ast.to_string(), expansion)
}

#[rstest]
fn today_becomes_a_day_range(now: NaiveDateTime) {
    let (text, expansion) = expanded(
        "select e from Event e where @TODAY(e.at)",
        &Expander::new(now),
    );
    assert_eq!(
        text,
        "select e from Event e where e.at >= :gen_1 and e.at < :gen_2"
    );
    assert_eq!(
        expansion.params,
        vec![
            ("gen_1".to_string(), at(2024, 5, 16, 0, 0)),
            ("gen_2".to_string(), at(2024, 5, 17, 0, 0)),
        ]
    );
}

#[rstest]
#[case("@dateBefore(e.at, now-2)", "e.at < :gen_1", at(2024, 5, 14, 0, 0))]
#[case("@dateAfter(e.at, now)", "e.at >= :gen_1", at(2024, 5, 17, 0, 0))]
#[case(
    "@dateEquals(e.at, now+1)",
    "e.at >= :gen_1 and e.at < :gen_2",
    at(2024, 5, 17, 0, 0)
)]
fn date_comparisons_against_now(
    now: NaiveDateTime,
    #[case] condition: &str,
    #[case] expected: &str,
    #[case] first_bound: NaiveDateTime,
) {
    let src = format!("select e from Event e where {condition}");
    let (text, expansion) = expanded(&src, &Expander::new(now));
    assert_eq!(text, format!("select e from Event e where {expected}"));
    assert_eq!(expansion.param("gen_1"), Some(first_bound));
}

#[rstest]
#[case("@dateBefore(e.at, :cutoff)", "e.at < :cutoff")]
#[case("@dateAfter(e.at, o.at)", "e.at > o.at")]
#[case("@dateEquals(e.at, ?1)", "e.at = ?1")]
fn date_comparisons_against_references(
    now: NaiveDateTime,
    #[case] condition: &str,
    #[case] expected: &str,
) {
    let src = format!("select e from Event e, Shift o where {condition}");
    let (text, expansion) = expanded(&src, &Expander::new(now));
    assert_eq!(text, format!("select e from Event e, Shift o where {expected}"));
    assert!(expansion.params.is_empty());
}

#[rstest]
#[case("now-1, now+1, week", at(2024, 5, 6, 0, 0), at(2024, 5, 20, 0, 0))]
#[case("now, now, month", at(2024, 5, 1, 0, 0), at(2024, 5, 1, 0, 0))]
#[case("now-1, now, year", at(2023, 1, 1, 0, 0), at(2024, 1, 1, 0, 0))]
#[case("now-30, now, minute", at(2024, 5, 16, 14, 5), at(2024, 5, 16, 14, 35))]
fn between_truncates_then_shifts(
    now: NaiveDateTime,
    #[case] args: &str,
    #[case] low: NaiveDateTime,
    #[case] high: NaiveDateTime,
) {
    let src = format!("select e from Event e where @between(e.at, {args})");
    let (text, expansion) = expanded(&src, &Expander::new(now));
    assert_eq!(
        text,
        "select e from Event e where e.at between :gen_1 and :gen_2"
    );
    assert_eq!(expansion.param("gen_1"), Some(low));
    assert_eq!(expansion.param("gen_2"), Some(high));
}

#[rstest]
fn generated_names_skip_existing_parameters(now: NaiveDateTime) {
    let (text, _) = expanded(
        "select e from Event e where e.owner = :gen_1 and @today(e.at)",
        &Expander::new(now),
    );
    assert_eq!(
        text,
        "select e from Event e where e.owner = :gen_1 and e.at >= :gen_2 and e.at < :gen_3"
    );
}

#[rstest]
fn custom_prefix(now: NaiveDateTime) {
    let (_, expansion) = expanded(
        "select e from Event e where @today(e.at)",
        &Expander::new(now).with_prefix("d"),
    );
    let names: Vec<_> = expansion.params.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["d1", "d2"]);
}

#[rstest]
fn macros_inside_subqueries_are_expanded(now: NaiveDateTime) {
    let (text, _) = expanded(
        "select e from Event e where exists (select x from Log x where @today(x.at))",
        &Expander::new(now),
    );
    assert_eq!(
        text,
        "select e from Event e where exists (select x from Log x where x.at >= :gen_1 and x.at < :gen_2)"
    );
}

#[rstest]
fn negated_expansion_keeps_its_meaning(now: NaiveDateTime) {
    let (text, _) = expanded(
        "select e from Event e where not @today(e.at)",
        &Expander::new(now),
    );
    assert_eq!(
        text,
        "select e from Event e where not (e.at >= :gen_1 and e.at < :gen_2)"
    );
}

#[rstest]
fn resolved_enums_become_literals(now: NaiveDateTime) {
    let resolver = |literal: &str| match literal {
        "Status.ACTIVE" => Some(Literal::string("A")),
        _ => None,
    };
    let (text, expansion) = expanded(
        "select e from Task e where e.status = @enum(Status.ACTIVE) or e.status = @ENUM(Status.NEW)",
        &Expander::new(now).with_enum_resolver(resolver),
    );
    assert_eq!(
        text,
        "select e from Task e where e.status = 'A' or e.status = @ENUM(Status.NEW)"
    );
    assert_eq!(expansion.deferred_enums, vec!["Status.NEW"]);
}

#[rstest]
fn unresolved_enums_are_deferred_not_errors(now: NaiveDateTime) {
    let src = "select e from Task e where e.status = @enum(Status.ACTIVE)";
    let (text, expansion) = expanded(src, &Expander::new(now));
    assert_eq!(text, src);
    assert_eq!(expansion.deferred_enums, vec!["Status.ACTIVE"]);
}

#[rstest]
fn failed_expansion_leaves_the_tree_alone(now: NaiveDateTime) {
    let src = "select e from Event e where @today(e.at) and @between(e.at, now-999999999, now, year)";
    let mut ast = parse(src).unwrap_or_else(|e| panic!("parse failed: {e}"));
    let err = Expander::new(now)
        .expand(&mut ast)
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert!(matches!(err, MacroError::DateOutOfRange { offset: -999_999_999, .. }));
    assert_eq!(ast.to_string(), src);
}

#[rstest]
fn expansion_is_deterministic(now: NaiveDateTime) {
    let src = "select e from Event e where @today(e.at) or @between(e.at, now-1, now, day)";
    let first = expanded(src, &Expander::new(now));
    let second = expanded(src, &Expander::new(now));
    assert_eq!(first, second);
}

#[test]
fn malformed_enum_nodes_are_rejected() {
    let mut ast = parse("select e from Task e where e.status = @enum(Status.ACTIVE)")
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
    ast.root_mut().walk_mut(&mut |node| {
        if let NodeKind::EnumMacro { literal } = &mut node.kind {
            *literal = "ACTIVE".to_string();
        }
    });
    let err = Expander::new(at(2024, 1, 1, 0, 0))
        .expand(&mut ast)
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert_eq!(
        err,
        MacroError::InvalidEnumLiteral {
            literal: "ACTIVE".to_string()
        }
    );
}
