use rstest::rstest;

use super::*;
use crate::parser::{parse, parse_predicate};

fn parsed(src: &str) -> Ast {
    parse(src).unwrap_or_else(|e| panic!("parse failed for {src}: {e}"))
}

fn predicate(src: &str) -> Node {
    parse_predicate(src)
        .unwrap_or_else(|e| panic!("parse failed for {src}: {e}"))
        .into()
}

#[rstest]
#[case(
    "select e from Employee e",
    "select e from Employee e where e.tenant = :t"
)]
#[case(
    "select e from Employee e where e.a = 1 or e.b = 2",
    "select e from Employee e where (e.a = 1 or e.b = 2) and (e.tenant = :t)"
)]
#[case(
    "update Employee e set e.a = 1 where e.b = 2",
    "update Employee e set e.a = 1 where (e.b = 2) and (e.tenant = :t)"
)]
#[case(
    "select e from Employee e where (e.a = 1)",
    "select e from Employee e where (e.a = 1) and (e.tenant = :t)"
)]
fn predicates_are_anded_into_where(#[case] src: &str, #[case] expected: &str) {
    let mut ast = parsed(src);
    ast.add_where_predicate("e", predicate("e.tenant = :t"))
        .unwrap_or_else(|e| panic!("rewrite failed: {e}"));
    assert_eq!(ast.to_string(), expected);
    let reparsed = parsed(expected);
    assert_eq!(reparsed.root(), ast.root());
}

#[test]
fn predicate_goes_to_the_scope_binding_the_alias() {
    let mut ast = parsed(
        "select e from Employee e where e.id in (select t.owner from Task t where t.open = true)",
    );
    ast.add_where_predicate("t", predicate("t.deleted = false"))
        .unwrap_or_else(|e| panic!("rewrite failed: {e}"));
    assert_eq!(
        ast.to_string(),
        "select e from Employee e where e.id in \
         (select t.owner from Task t where (t.open = true) and (t.deleted = false))"
    );
}

#[test]
fn unknown_alias_leaves_ast_untouched() {
    let src = "select e from Employee e where e.a = 1";
    let mut ast = parsed(src);
    let err = ast.add_where_predicate("x", predicate("x.a = 1"));
    assert_eq!(
        err,
        Err(RewriteError::AliasNotFound {
            alias: "x".to_string()
        })
    );
    assert_eq!(ast.to_string(), src);
    assert!(ast.root().span().is_some());
}

#[test]
fn scalar_is_not_a_predicate() {
    let mut ast = parsed("select e from Employee e");
    let err = ast.add_where_predicate("e", Node::path("e.a"));
    assert_eq!(
        err,
        Err(RewriteError::NodeKindMismatch {
            expected: "condition",
            found: "path"
        })
    );
}

#[test]
fn rename_covers_bindings_and_references() {
    let mut ast = parsed(
        "select e.name from Employee e join e.dept d where e.age > 30 \
         and exists (select x from Task x where x.owner = e) order by e.name",
    );
    ast.rename_identification_variable("e", "emp")
        .unwrap_or_else(|err| panic!("rename failed: {err}"));
    assert_eq!(
        ast.to_string(),
        "select emp.name from Employee emp join emp.dept d where emp.age > 30 \
         and exists (select x from Task x where x.owner = emp) order by emp.name"
    );
}

#[test]
fn rename_respects_shadowing() {
    let mut ast = parsed(
        "select e from Employee e where exists (select e from Manager e where e.x = 1)",
    );
    ast.rename_identification_variable("e", "o")
        .unwrap_or_else(|err| panic!("rename failed: {err}"));
    assert_eq!(
        ast.to_string(),
        "select o from Employee o where exists (select e from Manager e where e.x = 1)"
    );
}

#[rstest]
#[case("e", "d", RewriteError::AliasCollisionUnresolvable { alias: "d".to_string() })]
#[case("z", "y", RewriteError::AliasNotFound { alias: "z".to_string() })]
#[case("e", "select", RewriteError::InvalidIdentifier { name: "select".to_string() })]
#[case("e", "1x", RewriteError::InvalidIdentifier { name: "1x".to_string() })]
fn rename_failures(#[case] old: &str, #[case] new: &str, #[case] expected: RewriteError) {
    let src = "select e from Employee e join e.dept d";
    let mut ast = parsed(src);
    assert_eq!(ast.rename_identification_variable(old, new), Err(expected));
    assert_eq!(ast.to_string(), src);
}

#[test]
fn rename_rejects_names_bound_in_subqueries() {
    let mut ast = parsed("select e from Employee e where exists (select t from Task t where t.o = e)");
    assert_eq!(
        ast.rename_identification_variable("e", "t"),
        Err(RewriteError::AliasCollisionUnresolvable {
            alias: "t".to_string()
        })
    );
}

#[rstest]
#[case("select e from Employee e where exists (select x from Task x where x.owner = e)")]
#[case("select e from Employee e where exists (select x from Task x where x.owner = e.boss)")]
#[case("select e from Employee e where e.id in (select x.id from Task x join x.team t where t = e)")]
fn rename_rejects_capturing_outer_references(#[case] src: &str) {
    let mut ast = parsed(src);
    assert_eq!(
        ast.rename_identification_variable("x", "e"),
        Err(RewriteError::AliasCollisionUnresolvable {
            alias: "e".to_string()
        })
    );
    assert_eq!(ast.to_string(), src);
}

#[test]
fn rename_in_subquery_may_reuse_unreferenced_outer_names() {
    let mut ast = parsed("select e from Employee e, Dept d where exists (select x from Task x)");
    ast.rename_identification_variable("x", "d")
        .unwrap_or_else(|err| panic!("rename failed: {err}"));
    assert_eq!(
        ast.to_string(),
        "select e from Employee e, Dept d where exists (select d from Task d)"
    );
}

#[test]
fn merge_renames_incoming_variables() {
    let mut ast = parsed("select e from Employee e join e.dept d where e.a = 1");
    let other = parsed("select e from Project e join e.lead d_1 where e.open = true and d_1.x = 2");
    let renames = ast
        .merge_subtree_with_fresh_aliases(&other)
        .unwrap_or_else(|err| panic!("merge failed: {err}"));
    assert_eq!(
        renames,
        vec![
            ("e".to_string(), "e_1".to_string()),
            ("d_1".to_string(), "d_1_1".to_string()),
        ]
    );
    assert_eq!(
        ast.to_string(),
        "select e from Employee e join e.dept d, Project e_1 join e_1.lead d_1_1 \
         where (e.a = 1) and (e_1.open = true and d_1_1.x = 2)"
    );
    let vars = ast.query().bound_variables();
    let unique: HashSet<_> = vars.iter().collect();
    assert_eq!(unique.len(), vars.len());
}

#[test]
fn merge_requires_select_queries() {
    let mut ast = parsed("delete from Employee e");
    let other = parsed("select p from Project p");
    assert_eq!(
        ast.merge_subtree_with_fresh_aliases(&other),
        Err(RewriteError::NodeKindMismatch {
            expected: "select query",
            found: "delete query"
        })
    );
}

#[rstest]
#[case(ReferenceKind::Entities, vec!["Employee", "Project", "Task"])]
#[case(ReferenceKind::Variables, vec!["e", "p", "t"])]
#[case(ReferenceKind::Paths, vec!["e.name", "p.lead", "t.owner"])]
#[case(ReferenceKind::Parameters, vec![":name", "?1"])]
fn references_are_listed_once_in_order(
    #[case] kind: ReferenceKind,
    #[case] expected: Vec<&str>,
) {
    let ast = parsed(
        "select e.name from Employee e join Project p on p.lead = e \
         where e.name = :name and e.name <> ?1 and exists (select t from Task t where t.owner = e)",
    );
    assert_eq!(ast.list_referenced(kind), expected);
}

#[test]
fn replace_where_returns_the_old_condition() {
    let mut ast = parsed("select e from Employee e where e.a = 1");
    let old = ast
        .replace_where(None)
        .unwrap_or_else(|err| panic!("replace failed: {err}"));
    assert_eq!(old, Some(predicate("e.a = 1")));
    assert_eq!(ast.to_string(), "select e from Employee e");
    ast.replace_where(Some(predicate("e.b is null")))
        .unwrap_or_else(|err| panic!("replace failed: {err}"));
    assert_eq!(ast.to_string(), "select e from Employee e where e.b is null");
}

#[test]
fn main_alias_is_the_first_declaration() {
    assert_eq!(parsed("select d from Dept d, Employee e").main_alias(), Some("d"));
}
