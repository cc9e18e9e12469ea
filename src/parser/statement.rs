//! Statement and clause productions.

use crate::SyntaxKind;

use super::ast::{
    Join, JoinKind, Node, NodeKind, NullsOrder, Query, QueryKind, Select, SortDirection, Source,
};
use super::grammar::Parser;

/// Trailing clauses shared by the three statement kinds.
#[derive(Default)]
struct Clauses {
    where_clause: Option<Box<Node>>,
    group_by: Option<Box<Node>>,
    having: Option<Box<Node>>,
    order_by: Option<Box<Node>>,
}

impl Parser<'_> {
    /// `select_statement | update_statement | delete_statement`.
    pub(crate) fn statement(&mut self) -> Option<Node> {
        match self.ts.peek_kind() {
            Some(SyntaxKind::K_SELECT) => self.select_statement(),
            Some(SyntaxKind::K_UPDATE) => self.update_statement(),
            Some(SyntaxKind::K_DELETE) => self.delete_statement(),
            _ => {
                self.ts.expected_any(&[
                    SyntaxKind::K_SELECT,
                    SyntaxKind::K_UPDATE,
                    SyntaxKind::K_DELETE,
                ]);
                None
            }
        }
    }

    /// `SELECT ... FROM ... [WHERE] [GROUP BY] [HAVING] [ORDER BY]`.
    pub(crate) fn select_statement(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let select = self.select_clause()?;
        let from_idx = self.ts.expect(SyntaxKind::K_FROM)?;
        let sources = self.from_declarations()?;
        if matches!(&select.kind, NodeKind::Select(s) if s.items.is_empty()) {
            return self.fail_at(from_idx, &[SyntaxKind::T_IDENT], "missing select item");
        }
        let clauses = self.scoped(&sources, |p| p.trailing_clauses(true))?;
        Some(self.query(QueryKind::Select, Some(select), sources, None, clauses, first))
    }

    /// `UPDATE Entity [[AS] v] SET path = value {, path = value} [WHERE]`.
    fn update_statement(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::K_UPDATE)?;
        let sources = self.target_entity()?;
        let (set, clauses) = self.scoped(&sources, |p| {
            let set_first = p.ts.expect(SyntaxKind::K_SET)?;
            let items = p.comma_list(Parser::update_item)?;
            let set = p.node(NodeKind::UpdateSet(items), set_first);
            Some((set, p.trailing_clauses(false)?))
        })?;
        Some(self.query(QueryKind::Update, None, sources, Some(set), clauses, first))
    }

    /// `DELETE FROM Entity [[AS] v] [WHERE]`.
    fn delete_statement(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::K_DELETE)?;
        self.ts.expect(SyntaxKind::K_FROM)?;
        let sources = self.target_entity()?;
        let clauses = self.scoped(&sources, |p| p.trailing_clauses(false))?;
        Some(self.query(QueryKind::Delete, None, sources, None, clauses, first))
    }

    fn query(
        &self,
        kind: QueryKind,
        select: Option<Node>,
        sources: Node,
        set: Option<Node>,
        clauses: Clauses,
        first: usize,
    ) -> Node {
        let query = Query {
            kind,
            select: select.map(Box::new),
            sources: Box::new(sources),
            set: set.map(Box::new),
            where_clause: clauses.where_clause,
            group_by: clauses.group_by,
            having: clauses.having,
            order_by: clauses.order_by,
        };
        self.node(NodeKind::Query(query), first)
    }

    /// `SELECT [DISTINCT] item {, item}`.
    ///
    /// An empty list is accepted when `FROM` follows so that the declaration
    /// list is still checked; the statement rejects it afterwards.
    fn select_clause(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::K_SELECT)?;
        let distinct = self.ts.eat(SyntaxKind::K_DISTINCT);
        let items = if self.ts.peek_kind() == Some(SyntaxKind::K_FROM) {
            Vec::new()
        } else {
            self.comma_list(Parser::select_item)?
        };
        Some(self.node(NodeKind::Select(Select { distinct, items }), first))
    }

    fn select_item(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let expr = if self.ts.peek_kind() == Some(SyntaxKind::K_NEW) {
            self.constructor()?
        } else {
            self.scalar()?
        };
        let alias = self.alias(false)?.and_then(|var| match var.kind {
            NodeKind::IdentificationVariable(name) => Some(name),
            _ => None,
        });
        Some(self.node(
            NodeKind::SelectedItem {
                expr: Box::new(expr),
                alias,
            },
            first,
        ))
    }

    /// `NEW pkg.Class(arg {, arg})`.
    fn constructor(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::K_NEW)?;
        let class = self.dotted_name()?;
        self.ts.expect(SyntaxKind::T_LPAREN)?;
        let args = self.comma_list(Parser::scalar)?;
        self.ts.expect(SyntaxKind::T_RPAREN)?;
        Some(self.node(NodeKind::Constructor { class, args }, first))
    }

    /// `ident {. word}` as plain text.
    fn dotted_name(&mut self) -> Option<String> {
        let (_, root) = self.ident()?;
        let mut name = root.to_string();
        while self.ts.eat(SyntaxKind::T_DOT) {
            let (_, segment) = self.word()?;
            name.push('.');
            name.push_str(segment);
        }
        Some(name)
    }

    /// Declarations after `FROM`, without the keyword.
    fn from_declarations(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let decls = self.comma_list(|p| {
            if p.ts.peek_kind() == Some(SyntaxKind::K_IN)
                && p.ts.nth_kind(1) == Some(SyntaxKind::T_LPAREN)
            {
                p.collection_member()
            } else {
                p.range_declaration()
            }
        })?;
        Some(self.node(NodeKind::Sources(decls), first))
    }

    /// `Entity [AS] v {join}`.
    fn range_declaration(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let entity = self.dotted_name()?;
        let variable = self.alias(true)?.map(Box::new);
        let mut joins = Vec::new();
        while matches!(
            self.ts.peek_kind(),
            Some(SyntaxKind::K_JOIN | SyntaxKind::K_LEFT | SyntaxKind::K_INNER)
        ) {
            joins.push(self.join()?);
        }
        Some(self.node(
            NodeKind::Source(Source {
                entity,
                variable,
                joins,
            }),
            first,
        ))
    }

    /// `[LEFT [OUTER] | INNER] JOIN [FETCH] path [[AS] v] [ON cond]`.
    ///
    /// The variable may only be omitted on fetch joins.
    fn join(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let kind = if self.ts.eat(SyntaxKind::K_LEFT) {
            self.ts.eat(SyntaxKind::K_OUTER);
            JoinKind::Left
        } else {
            self.ts.eat(SyntaxKind::K_INNER);
            JoinKind::Inner
        };
        self.ts.expect(SyntaxKind::K_JOIN)?;
        let fetch = self.ts.eat(SyntaxKind::K_FETCH);
        let target = self.path()?;
        let variable = self.alias(!fetch)?.map(Box::new);
        let condition = if self.ts.eat(SyntaxKind::K_ON) {
            Some(Box::new(self.condition()?))
        } else {
            None
        };
        Some(self.node(
            NodeKind::Join(Join {
                kind,
                fetch,
                target: Box::new(target),
                variable,
                condition,
            }),
            first,
        ))
    }

    /// `IN (path) [AS] v`.
    fn collection_member(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::K_IN)?;
        self.ts.expect(SyntaxKind::T_LPAREN)?;
        let path = self.path()?;
        self.ts.expect(SyntaxKind::T_RPAREN)?;
        let variable = self.alias(true)??;
        Some(self.node(
            NodeKind::CollectionMember {
                path: Box::new(path),
                variable: Box::new(variable),
            },
            first,
        ))
    }

    /// The single entity of UPDATE and DELETE, wrapped like a FROM list.
    fn target_entity(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let entity = self.dotted_name()?;
        let variable = self.alias(false)?.map(Box::new);
        let source = self.node(
            NodeKind::Source(Source {
                entity,
                variable,
                joins: Vec::new(),
            }),
            first,
        );
        Some(self.node(NodeKind::Sources(vec![source]), first))
    }

    fn update_item(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let path = self.path()?;
        self.ts.expect(SyntaxKind::T_EQ)?;
        let value = self.scalar()?;
        Some(self.node(
            NodeKind::UpdateItem {
                path: Box::new(path),
                value: Box::new(value),
            },
            first,
        ))
    }

    /// `[WHERE cond]`, then for SELECT `[GROUP BY ..] [HAVING ..] [ORDER BY ..]`.
    fn trailing_clauses(&mut self, select: bool) -> Option<Clauses> {
        let mut clauses = Clauses::default();
        if self.ts.at(SyntaxKind::K_WHERE) {
            let first = self.ts.cursor();
            self.ts.advance();
            let condition = self.condition()?;
            let node = self.node(NodeKind::Where(Box::new(condition)), first);
            clauses.where_clause = Some(Box::new(node));
        }
        if !select {
            return Some(clauses);
        }
        if self.at_pair(SyntaxKind::K_GROUP) {
            let first = self.ts.cursor();
            self.ts.advance();
            self.ts.advance();
            let items = self.comma_list(Parser::scalar)?;
            clauses.group_by = Some(Box::new(self.node(NodeKind::GroupBy(items), first)));
        }
        if self.ts.at(SyntaxKind::K_HAVING) {
            let first = self.ts.cursor();
            self.ts.advance();
            let condition = self.condition()?;
            let node = self.node(NodeKind::Having(Box::new(condition)), first);
            clauses.having = Some(Box::new(node));
        }
        if self.at_pair(SyntaxKind::K_ORDER) {
            let first = self.ts.cursor();
            self.ts.advance();
            self.ts.advance();
            let items = self.comma_list(Parser::order_item)?;
            clauses.order_by = Some(Box::new(self.node(NodeKind::OrderBy(items), first)));
        }
        Some(clauses)
    }

    /// Whether `keyword BY` follows.
    fn at_pair(&mut self, keyword: SyntaxKind) -> bool {
        self.ts.at(keyword) && self.ts.nth_kind(1) == Some(SyntaxKind::K_BY)
    }

    /// `scalar [ASC|DESC] [NULLS FIRST|LAST]`.
    fn order_item(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let expr = self.scalar()?;
        let direction = if self.ts.eat(SyntaxKind::K_ASC) {
            Some(SortDirection::Asc)
        } else if self.ts.eat(SyntaxKind::K_DESC) {
            Some(SortDirection::Desc)
        } else {
            None
        };
        let nulls = if self.ts.eat(SyntaxKind::K_NULLS) {
            if self.ts.eat(SyntaxKind::K_FIRST) {
                Some(NullsOrder::First)
            } else {
                self.ts.expect(SyntaxKind::K_LAST)?;
                Some(NullsOrder::Last)
            }
        } else {
            None
        };
        Some(self.node(
            NodeKind::OrderByField {
                expr: Box::new(expr),
                direction,
                nulls,
            },
            first,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::parser::ast::{JoinKind, NodeKind, NullsOrder, Query, QueryKind, SortDirection};
    use crate::parser::{ParseError, parse};

    fn query(src: &str) -> Query {
        let ast = parse(src).unwrap_or_else(|e| panic!("parse failed for {src}: {e}"));
        ast.query().clone()
    }

    #[test]
    fn select_with_every_clause() {
        let q = query(
            "select distinct e.dept, count(e) from Employee e \
             where e.age > 30 group by e.dept having count(e) > 2 \
             order by e.dept desc nulls last",
        );
        assert_eq!(q.kind, QueryKind::Select);
        assert!(q.where_clause.is_some());
        assert!(q.group_by.is_some());
        assert!(q.having.is_some());
        let Some(NodeKind::OrderBy(items)) = q.order_by.as_deref().map(|n| &n.kind) else {
            panic!("expected order by");
        };
        assert!(matches!(
            items.first().map(|n| &n.kind),
            Some(NodeKind::OrderByField {
                direction: Some(SortDirection::Desc),
                nulls: Some(NullsOrder::Last),
                ..
            })
        ));
    }

    #[test]
    fn joins_are_attached_to_their_source() {
        let q = query(
            "select e from Employee e left outer join e.dept d \
             join fetch e.address inner join e.projects p on p.active = true",
        );
        let [decl] = q.source_nodes() else {
            panic!("expected one declaration");
        };
        let NodeKind::Source(source) = &decl.kind else {
            panic!("expected source");
        };
        assert_eq!(source.entity, "Employee");
        assert_eq!(source.joins.len(), 3);
        let kinds: Vec<_> = source
            .joins
            .iter()
            .filter_map(|j| match &j.kind {
                NodeKind::Join(join) => Some((join.kind, join.fetch, join.variable_name())),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (JoinKind::Left, false, Some("d")),
                (JoinKind::Inner, true, None),
                (JoinKind::Inner, false, Some("p")),
            ]
        );
    }

    #[test]
    fn collection_member_declaration() {
        let q = query("select i from Order o, in(o.items) i where i.qty > 1");
        assert_eq!(q.bound_variables(), vec!["o", "i"]);
    }

    #[test]
    fn constructor_and_result_variables() {
        let q = query("select new com.acme.Dto(e.id, e.name) as dto, e.age a from Employee e");
        let Some(NodeKind::Select(select)) = q.select.as_deref().map(|n| &n.kind) else {
            panic!("expected select");
        };
        let aliases: Vec<_> = select
            .items
            .iter()
            .filter_map(|item| match &item.kind {
                NodeKind::SelectedItem { alias, .. } => Some(alias.as_deref()),
                _ => None,
            })
            .collect();
        assert_eq!(aliases, vec![Some("dto"), Some("a")]);
    }

    #[rstest]
    #[case(
        "update Employee e set e.salary = e.salary * 2, e.bonus = null where e.id = :id",
        QueryKind::Update
    )]
    #[case("update Employee set salary = 1", QueryKind::Update)]
    #[case("update Employee set salary = 1 where salary > 5", QueryKind::Update)]
    #[case("delete from Employee where active = false", QueryKind::Delete)]
    #[case("delete from Employee e where e.active = false", QueryKind::Delete)]
    #[case("DELETE FROM Employee", QueryKind::Delete)]
    fn update_and_delete(#[case] src: &str, #[case] kind: QueryKind) {
        assert_eq!(query(src).kind, kind);
    }

    #[test]
    fn group_and_order_remain_identifiers_without_by() {
        let q = query("select g from Group g where g.order = 1 order by g.group");
        assert_eq!(q.bound_variables(), vec!["g"]);
        assert!(q.order_by.is_some());
    }

    #[test]
    fn select_list_cannot_be_empty() {
        let Err(ParseError::Syntax(err)) = parse("select from Employee e") else {
            panic!("expected syntax error");
        };
        assert_eq!(err.offset, 7);
        assert_eq!(err.note, Some("missing select item"));
    }

    #[rstest]
    #[case("select e from Employee")]
    #[case("select e from Employee e where")]
    #[case("select e from Employee e join e.dept")]
    #[case("select e from Employee e order e.name")]
    #[case("from Employee e")]
    fn incomplete_statements_fail(#[case] src: &str) {
        assert!(parse(src).is_err(), "{src} should not parse");
    }
}
