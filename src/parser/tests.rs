use std::collections::BTreeSet;

use rstest::rstest;

use super::*;
use crate::SyntaxKind;

#[test]
fn missing_entity_reports_identifier_at_eof() {
    let err = parse("select from").err().unwrap_or_else(|| panic!("expected error"));
    let Some(err) = err.as_syntax() else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!(err.offset, 11);
    assert_eq!((err.line, err.column), (1, 12));
    assert_eq!(err.found, SyntaxKind::T_EOF);
    assert_eq!(err.expected, BTreeSet::from([SyntaxKind::T_IDENT]));
}

#[test]
fn unexpected_token_is_reported_with_alternatives() {
    let err = parse("select e frm Employee e")
        .err()
        .unwrap_or_else(|| panic!("expected error"));
    let Some(err) = err.as_syntax() else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!(err.offset, 13);
    assert_eq!(err.found, SyntaxKind::T_IDENT);
    assert!(err.expected.contains(&SyntaxKind::K_FROM));
}

#[test]
fn statement_keyword_is_required() {
    let err = parse("employee e").err().unwrap_or_else(|| panic!("expected error"));
    let Some(err) = err.as_syntax() else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!(
        err.expected,
        BTreeSet::from([SyntaxKind::K_SELECT, SyntaxKind::K_UPDATE, SyntaxKind::K_DELETE])
    );
}

#[test]
fn lexical_errors_abort_parsing() {
    let err = parse("select e from Employee e where e.a # 1")
        .err()
        .unwrap_or_else(|| panic!("expected error"));
    assert!(matches!(err, ParseError::Lexical(LexicalError { offset: 35, character: '#' })));
}

#[test]
fn comparison_operator_must_fit_family() {
    let err = parse("select e from Employee e where e.active > true")
        .err()
        .unwrap_or_else(|| panic!("expected error"));
    let Some(err) = err.as_syntax() else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!(err.found, SyntaxKind::T_GT);
    assert_eq!(err.expected, BTreeSet::from([SyntaxKind::T_EQ, SyntaxKind::T_NEQ]));
    assert_eq!(err.note, Some("operator not allowed for operands"));
}

#[rstest]
#[case(4, false)]
#[case(64, true)]
fn nesting_limit(#[case] limit: usize, #[case] accepted: bool) {
    let src = "select e from Employee e where ((((((e.a = 1))))))";
    let result = parse_with_options(src, ParseOptions::default().with_max_depth(limit));
    if accepted {
        assert!(result.is_ok(), "{result:?}");
    } else {
        assert!(matches!(result, Err(ParseError::TooDeep { limit: 4, .. })));
    }
}

#[test]
fn token_level_entry_point() {
    let tokens = crate::tokenize("select e from Employee e where e.id = ?1")
        .unwrap_or_else(|e| panic!("lexing failed: {e}"));
    let ast = parse_tokens(&tokens).unwrap_or_else(|e| panic!("parse failed: {e}"));
    assert_eq!(ast.src(), "select e from Employee e where e.id = ?1");
    assert_eq!(ast.tokens().len(), tokens.len());
}

#[test]
fn token_level_entry_point_separates_inconsistent_spans() {
    let tokens: Vec<_> = ["delete", "from", "Employee"]
        .iter()
        .map(|text| crate::tokenizer::Token {
            kind: crate::tokenizer::keyword_kind(text).unwrap_or(SyntaxKind::T_IDENT),
            text: (*text).to_string(),
            span: 0..0,
        })
        .collect();
    let ast = parse_tokens(&tokens).unwrap_or_else(|e| panic!("parse failed: {e}"));
    assert_eq!(ast.src(), "delete from Employee");
}

#[test]
fn predicate_nodes_lose_spans_when_detached() {
    let predicate = parse_predicate("e.a = 1 and e.b is null")
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
    assert!(predicate.node().span().is_some());
    let node = Node::from(predicate);
    let mut spanned = 0;
    node.walk(&mut |n| {
        if n.span().is_some() {
            spanned += 1;
        }
    });
    assert_eq!(spanned, 0);
}

#[test]
fn spans_nest() {
    let ast = parse(
        "select e.name from Employee e join e.dept d \
         where e.age > (select avg(x.age) from Employee x) order by e.name",
    )
    .unwrap_or_else(|e| panic!("parse failed: {e}"));
    fn check(node: &Node) {
        let Some(outer) = node.span() else {
            panic!("parsed node without span: {node:?}");
        };
        for child in node.children() {
            let Some(inner) = child.span() else {
                panic!("parsed child without span: {child:?}");
            };
            assert!(outer.contains(inner), "{:?} outside {:?}", inner, outer);
            check(child);
        }
    }
    check(ast.root());
}

#[test]
fn clause_spans_start_at_their_keyword() {
    let ast = parse("select e from Employee e where e.a = 1")
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
    let query = ast.query();
    let first = |node: Option<&Node>| node.and_then(Node::span).map(|s| s.first);
    assert_eq!(first(query.select.as_deref()), Some(0));
    assert_eq!(first(Some(&query.sources)), Some(3));
    assert_eq!(first(query.where_clause.as_deref()), Some(5));
}
