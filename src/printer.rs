//! Render an AST back to JPQL text.
//!
//! Nodes that still carry a span are copied from the original tokens, with a
//! single space wherever the source had whitespace or a comment between two
//! tokens. Nodes without a span were built or edited after parsing; they are
//! rendered from a lowercase template and their children are printed the
//! same way, so an untouched subtree under an edited parent keeps its
//! original spelling. Templates add parentheses where operator precedence
//! would otherwise change the meaning on re-parse.

use std::fmt;

use log::warn;

use crate::parser::ast::{
    JoinKind, Node, NodeKind, NullsOrder, Query, QueryKind, SortDirection, TokenSpan,
};
use crate::parser::{Ast, binding_power};
use crate::tokenizer::Token;

/// Renders [`Node`]s against the token list they were parsed from.
#[derive(Debug, Clone, Copy)]
pub struct Printer<'a> {
    tokens: &'a [Token],
}

impl<'a> Printer<'a> {
    /// A printer resolving spans against `tokens`.
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens }
    }

    /// A printer for nodes of `ast`.
    #[must_use]
    pub fn for_ast(ast: &'a Ast) -> Self {
        Self::new(ast.tokens())
    }

    /// Render `node` and its subtree.
    #[must_use]
    pub fn print(&self, node: &Node) -> String {
        let mut out = String::new();
        self.write(node, &mut out);
        out
    }

    fn write(&self, node: &Node, out: &mut String) {
        if let Some(span) = node.span() {
            if self.copy_tokens(span, out) {
                return;
            }
            warn!(
                "{} span {}..={} is outside the {} available tokens; rendering from template",
                node.name(),
                span.first,
                span.last,
                self.tokens.len()
            );
        }
        self.template(node, out);
    }

    fn copy_tokens(&self, span: TokenSpan, out: &mut String) -> bool {
        if span.first > span.last {
            return false;
        }
        let Some(tokens) = self.tokens.get(span.first..=span.last) else {
            return false;
        };
        let mut prev_end = None;
        for token in tokens {
            if prev_end.is_some_and(|end| end < token.start()) {
                out.push(' ');
            }
            out.push_str(&token.text);
            prev_end = Some(token.end());
        }
        true
    }

    fn list(&self, items: &[Node], sep: &str, out: &mut String) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            self.write(item, out);
        }
    }

    /// Write `node`, in parentheses when `wrap` holds.
    fn operand(&self, node: &Node, wrap: bool, out: &mut String) {
        if wrap {
            out.push('(');
            self.write(node, out);
            out.push(')');
        } else {
            self.write(node, out);
        }
    }

    fn call(&self, name: &str, args: &[Node], out: &mut String) {
        out.push_str(name);
        out.push('(');
        self.list(args, ", ", out);
        out.push(')');
    }

    #[expect(
        clippy::too_many_lines,
        reason = "one arm per node kind reads best as a single match"
    )]
    fn template(&self, node: &Node, out: &mut String) {
        match node.kind() {
            NodeKind::Query(query) => self.query(query, out),
            NodeKind::Select(select) => {
                out.push_str("select ");
                if select.distinct {
                    out.push_str("distinct ");
                }
                self.list(&select.items, ", ", out);
            }
            NodeKind::SelectedItem { expr, alias } => {
                self.write(expr, out);
                if let Some(alias) = alias {
                    out.push_str(" as ");
                    out.push_str(alias);
                }
            }
            NodeKind::Constructor { class, args } => {
                out.push_str("new ");
                self.call(class, args, out);
            }
            NodeKind::Sources(items) => self.list(items, ", ", out),
            NodeKind::Source(source) => {
                out.push_str(&source.entity);
                if let Some(variable) = &source.variable {
                    out.push(' ');
                    self.write(variable, out);
                }
                for join in &source.joins {
                    out.push(' ');
                    self.write(join, out);
                }
            }
            NodeKind::IdentificationVariable(name) => out.push_str(name),
            NodeKind::Join(join) => {
                out.push_str(match join.kind {
                    JoinKind::Inner => "join ",
                    JoinKind::Left => "left join ",
                });
                if join.fetch {
                    out.push_str("fetch ");
                }
                self.write(&join.target, out);
                if let Some(variable) = &join.variable {
                    out.push(' ');
                    self.write(variable, out);
                }
                if let Some(condition) = &join.condition {
                    out.push_str(" on ");
                    self.write(condition, out);
                }
            }
            NodeKind::CollectionMember { path, variable } => {
                out.push_str("in (");
                self.write(path, out);
                out.push_str(") ");
                self.write(variable, out);
            }
            NodeKind::UpdateSet(items) => {
                out.push_str("set ");
                self.list(items, ", ", out);
            }
            NodeKind::UpdateItem { path, value } => {
                self.write(path, out);
                out.push_str(" = ");
                self.write(value, out);
            }
            NodeKind::Where(condition) => {
                out.push_str("where ");
                self.write(condition, out);
            }
            NodeKind::GroupBy(items) => {
                out.push_str("group by ");
                self.list(items, ", ", out);
            }
            NodeKind::Having(condition) => {
                out.push_str("having ");
                self.write(condition, out);
            }
            NodeKind::OrderBy(items) => {
                out.push_str("order by ");
                self.list(items, ", ", out);
            }
            NodeKind::OrderByField {
                expr,
                direction,
                nulls,
            } => {
                self.write(expr, out);
                match direction {
                    Some(SortDirection::Asc) => out.push_str(" asc"),
                    Some(SortDirection::Desc) => out.push_str(" desc"),
                    None => {}
                }
                match nulls {
                    Some(NullsOrder::First) => out.push_str(" nulls first"),
                    Some(NullsOrder::Last) => out.push_str(" nulls last"),
                    None => {}
                }
            }
            NodeKind::Or(items) => self.list(items, " or ", out),
            NodeKind::And(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" and ");
                    }
                    self.operand(item, matches!(item.kind(), NodeKind::Or(_)), out);
                }
            }
            NodeKind::Not(inner) => {
                out.push_str("not ");
                let wrap = matches!(inner.kind(), NodeKind::Or(_) | NodeKind::And(_));
                self.operand(inner, wrap, out);
            }
            NodeKind::Group(inner) => self.operand(inner, true, out),
            NodeKind::Comparison { op, lhs, rhs, .. } => {
                self.write(lhs, out);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                self.write(rhs, out);
            }
            NodeKind::Quantified {
                quantifier,
                subquery,
            } => {
                out.push_str(quantifier.as_str());
                out.push(' ');
                self.write(subquery, out);
            }
            NodeKind::Between {
                negated,
                expr,
                low,
                high,
            } => {
                self.write(expr, out);
                out.push_str(not(*negated, " not between ", " between "));
                self.write(low, out);
                out.push_str(" and ");
                self.write(high, out);
            }
            NodeKind::In { negated, expr, rhs } => {
                self.write(expr, out);
                out.push_str(not(*negated, " not in ", " in "));
                self.write(rhs, out);
            }
            NodeKind::InList(items) => self.call("", items, out),
            NodeKind::Like {
                negated,
                expr,
                pattern,
                escape,
            } => {
                self.write(expr, out);
                out.push_str(not(*negated, " not like ", " like "));
                self.write(pattern, out);
                if let Some(escape) = escape {
                    out.push_str(" escape ");
                    self.write(escape, out);
                }
            }
            NodeKind::IsNull { negated, expr } => {
                self.write(expr, out);
                out.push_str(not(*negated, " is not null", " is null"));
            }
            NodeKind::IsEmpty { negated, expr } => {
                self.write(expr, out);
                out.push_str(not(*negated, " is not empty", " is empty"));
            }
            NodeKind::MemberOf {
                negated,
                expr,
                collection,
            } => {
                self.write(expr, out);
                out.push_str(not(*negated, " not member of ", " member of "));
                self.write(collection, out);
            }
            NodeKind::Exists { negated, subquery } => {
                out.push_str(not(*negated, "not exists ", "exists "));
                self.write(subquery, out);
            }
            NodeKind::Path(path) => out.push_str(&path.dotted()),
            NodeKind::Parameter(param) => out.push_str(&param.text()),
            NodeKind::Literal(literal) => out.push_str(&literal.text),
            NodeKind::Arithmetic { op, lhs, rhs } => {
                let (l_bp, _) = binding_power(*op);
                self.operand(lhs, binds_looser(lhs, l_bp, false), out);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                self.operand(rhs, binds_looser(rhs, l_bp, true), out);
            }
            NodeKind::Unary { sign, operand } => {
                out.push_str(sign.as_str());
                match operand.kind() {
                    NodeKind::Arithmetic { .. } => self.operand(operand, true, out),
                    // `--` would start a comment.
                    NodeKind::Unary { .. } => {
                        out.push(' ');
                        self.write(operand, out);
                    }
                    _ => self.write(operand, out),
                }
            }
            NodeKind::Aggregate {
                function,
                distinct,
                arg,
            } => {
                out.push_str(function.as_str());
                out.push('(');
                if *distinct {
                    out.push_str("distinct ");
                }
                self.write(arg, out);
                out.push(')');
            }
            NodeKind::Function { function, args } => {
                if function.is_niladic() {
                    out.push_str(function.as_str());
                } else {
                    self.call(function.as_str(), args, out);
                }
            }
            NodeKind::Trim {
                side,
                character,
                operand,
            } => {
                out.push_str("trim(");
                if let Some(side) = side {
                    out.push_str(side.as_str());
                    out.push(' ');
                }
                if let Some(character) = character {
                    self.write(character, out);
                    out.push(' ');
                }
                if side.is_some() || character.is_some() {
                    out.push_str("from ");
                }
                self.write(operand, out);
                out.push(')');
            }
            NodeKind::Case {
                operand,
                whens,
                otherwise,
            } => {
                out.push_str("case");
                if let Some(operand) = operand {
                    out.push(' ');
                    self.write(operand, out);
                }
                for when in whens {
                    out.push(' ');
                    self.write(when, out);
                }
                out.push_str(" else ");
                self.write(otherwise, out);
                out.push_str(" end");
            }
            NodeKind::When { condition, result } => {
                out.push_str("when ");
                self.write(condition, out);
                out.push_str(" then ");
                self.write(result, out);
            }
            NodeKind::Coalesce(args) => self.call("coalesce", args, out),
            NodeKind::NullIf { lhs, rhs } => {
                out.push_str("nullif(");
                self.write(lhs, out);
                out.push_str(", ");
                self.write(rhs, out);
                out.push(')');
            }
            NodeKind::Cast { operand, target } => {
                out.push_str("cast(");
                self.write(operand, out);
                out.push_str(" as ");
                out.push_str(target);
                out.push(')');
            }
            NodeKind::Extract { unit, operand } => {
                out.push_str("extract(");
                out.push_str(unit);
                out.push_str(" from ");
                self.write(operand, out);
                out.push(')');
            }
            NodeKind::TypeOf(arg) => {
                out.push_str("type(");
                self.write(arg, out);
                out.push(')');
            }
            NodeKind::Subquery(query) => self.operand(query, true, out),
            NodeKind::EnumMacro { literal } => {
                out.push_str("@enum(");
                out.push_str(literal);
                out.push(')');
            }
            NodeKind::TodayMacro { path } => {
                out.push_str("@today(");
                self.write(path, out);
                out.push(')');
            }
            NodeKind::DateCompareMacro {
                op,
                path,
                reference,
            } => {
                out.push_str(op.opener());
                self.write(path, out);
                out.push_str(", ");
                self.write(reference, out);
                out.push(')');
            }
            NodeKind::DateRangeMacro {
                path,
                from,
                to,
                unit,
            } => {
                out.push_str("@between(");
                self.write(path, out);
                for part in [from.text().as_str(), to.text().as_str(), unit.as_str()] {
                    out.push_str(", ");
                    out.push_str(part);
                }
                out.push(')');
            }
            NodeKind::Now(offset) => out.push_str(&offset.text()),
        }
    }

    fn query(&self, query: &Query, out: &mut String) {
        match query.kind {
            QueryKind::Select => {
                if let Some(select) = &query.select {
                    self.write(select, out);
                    out.push(' ');
                }
                out.push_str("from ");
            }
            QueryKind::Update => out.push_str("update "),
            QueryKind::Delete => out.push_str("delete from "),
        }
        self.write(&query.sources, out);
        let clauses = [
            query.set.as_deref(),
            query.where_clause.as_deref(),
            query.group_by.as_deref(),
            query.having.as_deref(),
            query.order_by.as_deref(),
        ];
        for clause in clauses.into_iter().flatten() {
            out.push(' ');
            self.write(clause, out);
        }
    }
}

fn not(negated: bool, yes: &'static str, no: &'static str) -> &'static str {
    if negated { yes } else { no }
}

/// Whether an arithmetic operand needs parentheses under an operator of
/// left binding power `bp`. Operators are left-associative, so an equal
/// power only needs them on the right.
fn binds_looser(node: &Node, bp: u8, right: bool) -> bool {
    let NodeKind::Arithmetic { op, .. } = node.kind() else {
        return false;
    };
    let (inner, _) = binding_power(*op);
    if right { inner <= bp } else { inner < bp }
}

/// Render a whole statement.
#[must_use]
pub fn print(ast: &Ast) -> String {
    Printer::for_ast(ast).print(ast.root())
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print(self))
    }
}
