//! Invariants that hold across many inputs.

mod test_util;

use std::collections::HashSet;

use jpqlkit::{Expander, ReferenceKind, ast::NodeKind, parse_predicate};
use rstest::rstest;
use test_util::{instant, parse_ok};

#[rstest]
#[case("select e from A e", "select e from A e")]
#[case("select e from A e, B e_1", "select e from A e join e.c c")]
#[case("select e from A e where exists (select x from X x)", "select x from A x, B e")]
#[case("select a from A a join a.b b", "select b from B b join b.a a where a.n = b.n")]
fn merged_queries_never_share_variables(#[case] target: &str, #[case] other: &str) {
    let mut ast = parse_ok(target);
    let incoming = parse_ok(other);
    let renames = ast
        .merge_subtree_with_fresh_aliases(&incoming)
        .unwrap_or_else(|e| panic!("merge failed: {e}"));

    let declared = ast.query().bound_variables();
    let unique: HashSet<_> = declared.iter().collect();
    assert_eq!(unique.len(), declared.len(), "duplicates in {declared:?}");
    let before = parse_ok(target);
    let mut all_before: HashSet<String> = before
        .list_referenced(ReferenceKind::Variables)
        .into_iter()
        .collect();
    all_before.extend(incoming.list_referenced(ReferenceKind::Variables));
    for (_, fresh) in &renames {
        assert!(!all_before.contains(fresh), "{fresh} was already bound");
    }
    let printed = ast.to_string();
    assert_eq!(parse_ok(&printed).root(), ast.root(), "{printed}");
}

#[rstest]
#[case("select e from E e where e.a = 1 or e.b = 2", "e.c = 3 or e.d = 4")]
#[case("select e from E e where not e.a = 1 or e.b = 2", "e.c = 3")]
#[case("select e from E e where e.a = 1", "e.c = 3 or e.d = 4")]
#[case("delete from E e where e.a = 1 or e.a is null", "e.t = :t")]
fn injected_disjunctions_stay_grouped(#[case] src: &str, #[case] filter: &str) {
    let mut ast = parse_ok(src);
    let predicate =
        parse_predicate(filter).unwrap_or_else(|e| panic!("predicate failed to parse: {e}"));
    ast.add_where_predicate("e", predicate)
        .unwrap_or_else(|e| panic!("injection failed: {e}"));

    let printed = ast.to_string();
    let reparsed = parse_ok(&printed);
    assert_eq!(reparsed.root(), ast.root(), "{printed}");
    let Some(condition) = reparsed.query().where_condition() else {
        panic!("expected a where clause in {printed}");
    };
    let NodeKind::And(operands) = condition.kind() else {
        panic!("expected a conjunction at the top of {printed}");
    };
    assert_eq!(operands.len(), 2);
    for operand in operands {
        assert!(
            !matches!(operand.kind(), NodeKind::Or(_)),
            "bare disjunction under AND in {printed}"
        );
    }
}

#[rstest]
#[case("select e from E e where @today(e.at)")]
#[case("select e from E e where @between(e.at, now-3, now+1, week) and @dateEquals(e.b, now)")]
#[case("select e from E e where e.x in (select y.x from Y y where @dateBefore(y.at, now-1))")]
fn expansion_is_deterministic(#[case] src: &str) {
    let expander = Expander::new(instant(2024, 2, 29, 23, 59));
    let run = || {
        let mut ast = parse_ok(src);
        let expansion = expander
            .expand(&mut ast)
            .unwrap_or_else(|e| panic!("expansion failed: {e}"));
        (ast.to_string(), expansion)
    };
    let (first_text, first) = run();
    let (second_text, second) = run();
    assert_eq!(first_text, second_text);
    assert_eq!(first, second);
    assert!(!first_text.contains('@'), "{first_text}");
    let reparsed = parse_ok(&first_text);
    let mut params = reparsed.list_referenced(ReferenceKind::Parameters);
    params.sort();
    let mut generated: Vec<_> = first.params.iter().map(|(n, _)| format!(":{n}")).collect();
    generated.sort();
    assert_eq!(params, generated);
}
