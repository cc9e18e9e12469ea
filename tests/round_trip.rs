//! Printing an unmodified parse reproduces the input, and printed output
//! parses back to the same tree.

mod test_util;

use jpqlkit::{Printer, print};
use rstest::rstest;
use test_util::{normalize_whitespace, parse_ok};

#[rstest]
#[case("select e from sample$Entity e where e.name = :name")]
#[case("SELECT DISTINCT e.name, COUNT(e) FROM Employee e GROUP BY e.name HAVING COUNT(e) > 1")]
#[case("select e from Employee e\n  left outer join e.dept d\n  where d.name like 'R&D%' escape '!'")]
#[case("select new com.acme.Row(e.id, upper(e.name)) from Employee e order by e.id desc")]
#[case("select e from Employee e where e.salary between :low and :high and e.age not in (1, 2)")]
#[case("select e from Employee e where e.id = all (select max(x.id) from Employee x)")]
#[case("select e from Employee e where e.tasks is not empty and :t member of e.tasks")]
#[case("update Employee e set e.salary = e.salary * 1.1, e.flag = true where e.id = ?1")]
#[case("delete from Employee e where e.deleteTs is not null")]
#[case("select e from Employee e where trim(both ' ' from e.name) = concat(e.a, '-', e.b)")]
#[case("select case when e.a > 1 then 'x' else 'y' end from Employee e")]
#[case("select e from Employee e where e.ts > {ts '2020-01-01 00:00:00'} and e.kind = ${kind}")]
#[case("select e from Employee e where @between(e.ts, now - 1, now, day) and @today(e.created)")]
#[case("select e from Employee e where e.status = @enum(com.acme.Status.ACTIVE)")]
#[case("select e from Employee e, in (e.tasks) t where not (t.done = true or t.open = false)")]
fn unmodified_queries_round_trip(#[case] src: &str) {
    let ast = parse_ok(src);
    assert_eq!(print(&ast), normalize_whitespace(src));
}

#[rstest]
#[case("select e from Employee e /* all of them */ where e.a = 1 -- trailing")]
#[case("select   e\n\tfrom Employee e")]
#[case("select e from Employee e where exists (select x from X x where x.e = e)")]
#[case("update Employee e set e.a = -e.b - (1 - 2) where e.c <> 3")]
fn printed_text_reparses_to_the_same_tree(#[case] src: &str) {
    let first = parse_ok(src);
    let printed = print(&first);
    let second = parse_ok(&printed);
    assert_eq!(first.root(), second.root(), "printed as {printed:?}");
    assert_eq!(print(&second), printed);
}

#[test]
fn comments_are_dropped_from_printed_text() {
    let ast = parse_ok("select e /* pick */ from Employee e -- done");
    assert_eq!(ast.to_string(), "select e from Employee e");
}

#[test]
fn subtrees_print_from_their_own_tokens() {
    let ast = parse_ok("select e from Employee e where (e.a + 1) * 2 >= 10");
    let Some(condition) = ast.query().where_condition() else {
        panic!("expected a where clause");
    };
    assert_eq!(Printer::for_ast(&ast).print(condition), "(e.a + 1) * 2 >= 10");
}

#[test]
fn lossless_tree_keeps_comments() {
    let src = "select e /* pick */ from Employee e -- done";
    assert_eq!(parse_ok(src).syntax().text().to_string(), src);
}
