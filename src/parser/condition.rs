//! Conditional expressions: `OR`/`AND`/`NOT`, grouping and the predicates.
//!
//! A conditional primary is either a simple condition or a parenthesised
//! conditional expression. The two overlap on a leading `(`:
//! `(e.a + 1) > 2` is a comparison whose left operand is grouped, while
//! `(e.a > 1 or e.b > 2)` is a grouped condition. The simple condition is
//! tried first, inside a memoised [`Parser::attempt_memo`].

use crate::SyntaxKind;

use super::ast::{
    AggregateFunction, ComparisonFamily, ComparisonOp, Function, LiteralKind, Node, NodeKind,
    Quantifier,
};
use super::grammar::Parser;

/// Operators that may follow the left operand of a simple condition.
const PREDICATE_OPERATORS: &[SyntaxKind] = &[
    SyntaxKind::T_EQ,
    SyntaxKind::T_NEQ,
    SyntaxKind::T_LT,
    SyntaxKind::T_LTE,
    SyntaxKind::T_GT,
    SyntaxKind::T_GTE,
    SyntaxKind::K_BETWEEN,
    SyntaxKind::K_IN,
    SyntaxKind::K_IS,
    SyntaxKind::K_LIKE,
    SyntaxKind::K_MEMBER,
    SyntaxKind::K_NOT,
];

impl Parser<'_> {
    /// `and_term {OR and_term}`.
    pub(crate) fn condition(&mut self) -> Option<Node> {
        self.nested(|p| {
            let first = p.ts.cursor();
            let mut terms = vec![p.and_term()?];
            while p.ts.eat(SyntaxKind::K_OR) {
                terms.push(p.and_term()?);
            }
            Some(collapse(p, terms, first, NodeKind::Or))
        })
    }

    fn and_term(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let mut factors = vec![self.factor()?];
        while self.ts.eat(SyntaxKind::K_AND) {
            factors.push(self.factor()?);
        }
        Some(collapse(self, factors, first, NodeKind::And))
    }

    fn factor(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        if self.ts.peek_kind() == Some(SyntaxKind::K_NOT)
            && self.ts.nth_kind(1) != Some(SyntaxKind::K_EXISTS)
        {
            self.ts.advance();
            let inner = self.factor()?;
            return Some(self.node(NodeKind::Not(Box::new(inner)), first));
        }
        self.conditional_primary()
    }

    fn conditional_primary(&mut self) -> Option<Node> {
        if let Some(simple) = self.attempt_memo(Parser::simple_condition) {
            return Some(simple);
        }
        let first = self.ts.expect(SyntaxKind::T_LPAREN)?;
        let inner = self.condition()?;
        self.ts.expect(SyntaxKind::T_RPAREN)?;
        Some(self.node(NodeKind::Group(Box::new(inner)), first))
    }

    fn simple_condition(&mut self) -> Option<Node> {
        match self.ts.peek_kind() {
            Some(SyntaxKind::K_EXISTS) => return self.exists(),
            Some(SyntaxKind::K_NOT) if self.ts.nth_kind(1) == Some(SyntaxKind::K_EXISTS) => {
                return self.exists();
            }
            Some(
                SyntaxKind::T_MACRO_TODAY
                | SyntaxKind::T_MACRO_DATE_BEFORE
                | SyntaxKind::T_MACRO_DATE_AFTER
                | SyntaxKind::T_MACRO_DATE_EQUALS
                | SyntaxKind::T_MACRO_BETWEEN,
            ) if self.options.macros => return self.date_macro(),
            _ => {}
        }
        let lhs = self.scalar()?;
        self.predicate_tail(lhs)
    }

    fn predicate_tail(&mut self, lhs: Node) -> Option<Node> {
        let first = lhs.span().map_or(self.ts.cursor(), |s| s.first);
        let negated = self.ts.peek_kind() == Some(SyntaxKind::K_NOT)
            && matches!(
                self.ts.nth_kind(1),
                Some(
                    SyntaxKind::K_BETWEEN
                        | SyntaxKind::K_IN
                        | SyntaxKind::K_LIKE
                        | SyntaxKind::K_MEMBER
                )
            );
        if negated {
            self.ts.advance();
        }
        let expr = Box::new(lhs);
        let kind = match self.ts.peek_kind() {
            Some(k) if !negated && ComparisonOp::from_kind(k).is_some() => {
                return self.comparison(*expr, first);
            }
            Some(SyntaxKind::K_BETWEEN) => {
                self.ts.advance();
                let low = self.scalar()?;
                self.ts.expect(SyntaxKind::K_AND)?;
                let high = self.scalar()?;
                NodeKind::Between {
                    negated,
                    expr,
                    low: Box::new(low),
                    high: Box::new(high),
                }
            }
            Some(SyntaxKind::K_IN) => {
                self.ts.advance();
                let rhs = self.in_operand()?;
                NodeKind::In {
                    negated,
                    expr,
                    rhs: Box::new(rhs),
                }
            }
            Some(SyntaxKind::K_LIKE) => {
                self.ts.advance();
                let pattern = self.scalar()?;
                let escape = if self.ts.eat(SyntaxKind::K_ESCAPE) {
                    Some(Box::new(self.scalar()?))
                } else {
                    None
                };
                NodeKind::Like {
                    negated,
                    expr,
                    pattern: Box::new(pattern),
                    escape,
                }
            }
            Some(SyntaxKind::K_MEMBER) => {
                self.ts.advance();
                self.ts.eat(SyntaxKind::K_OF);
                let collection = self.path()?;
                NodeKind::MemberOf {
                    negated,
                    expr,
                    collection: Box::new(collection),
                }
            }
            Some(SyntaxKind::K_IS) if !negated => {
                self.ts.advance();
                let negated = self.ts.eat(SyntaxKind::K_NOT);
                if self.ts.eat(SyntaxKind::K_NULL) {
                    NodeKind::IsNull { negated, expr }
                } else if self.ts.eat(SyntaxKind::K_EMPTY) {
                    NodeKind::IsEmpty { negated, expr }
                } else {
                    return None;
                }
            }
            _ => {
                self.ts.expected_any(PREDICATE_OPERATORS);
                return None;
            }
        };
        Some(self.node(kind, first))
    }

    fn comparison(&mut self, lhs: Node, first: usize) -> Option<Node> {
        let op_idx = self.ts.cursor();
        let op = self
            .ts
            .advance()
            .and_then(|t| ComparisonOp::from_kind(t.kind))?;
        let rhs = match self.ts.peek_kind().and_then(Quantifier::from_kind) {
            Some(quantifier) if self.ts.nth_kind(1) == Some(SyntaxKind::T_LPAREN) => {
                let q_first = self.ts.cursor();
                self.ts.advance();
                let subquery = self.subquery()?;
                self.node(
                    NodeKind::Quantified {
                        quantifier,
                        subquery: Box::new(subquery),
                    },
                    q_first,
                )
            }
            _ => self.scalar()?,
        };
        let is_variable = |name: &str| self.may_be_variable(name);
        let family = match comparison_family(&lhs, &rhs, op, is_variable) {
            Ok(family) => family,
            Err(FamilyMismatch::Operator) => {
                return self.fail_at(
                    op_idx,
                    &[SyntaxKind::T_EQ, SyntaxKind::T_NEQ],
                    "operator not allowed for operands",
                );
            }
            Err(FamilyMismatch::Operands) => {
                return self.fail_at(op_idx, &[], "incompatible comparison operands");
            }
        };
        Some(self.node(
            NodeKind::Comparison {
                family,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            first,
        ))
    }

    /// Right-hand side of `IN`: a list, a subquery, a parameter or a path.
    fn in_operand(&mut self) -> Option<Node> {
        match self.ts.peek_kind() {
            Some(SyntaxKind::T_LPAREN) if self.ts.nth_kind(1) == Some(SyntaxKind::K_SELECT) => {
                self.subquery()
            }
            Some(SyntaxKind::T_LPAREN) => {
                let first = self.ts.cursor();
                self.ts.advance();
                let items = self.comma_list(Parser::scalar)?;
                self.ts.expect(SyntaxKind::T_RPAREN)?;
                Some(self.node(NodeKind::InList(items), first))
            }
            Some(
                SyntaxKind::T_NAMED_PARAM
                | SyntaxKind::T_POSITIONAL_PARAM
                | SyntaxKind::T_CONFIG_PARAM,
            ) => self.scalar_bp(u8::MAX),
            _ => {
                self.ts.expected_here(SyntaxKind::T_LPAREN);
                self.path()
            }
        }
    }

    /// `[NOT] EXISTS (subquery)`.
    fn exists(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let negated = self.ts.eat(SyntaxKind::K_NOT);
        self.ts.expect(SyntaxKind::K_EXISTS)?;
        let subquery = self.subquery()?;
        Some(self.node(
            NodeKind::Exists {
                negated,
                subquery: Box::new(subquery),
            },
            first,
        ))
    }
}

fn collapse(
    p: &Parser<'_>,
    mut items: Vec<Node>,
    first: usize,
    wrap: fn(Vec<Node>) -> NodeKind,
) -> Node {
    if items.len() == 1 {
        if let Some(only) = items.pop() {
            return only;
        }
    }
    p.node(wrap(items), first)
}

/// Static type class of a comparison operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandClass {
    Str,
    Bool,
    Enum,
    Temporal,
    Numeric,
    /// A bare name that can denote an identification variable.
    Variable,
    EntityType,
    /// Anything whose type is only known from the model: navigation paths,
    /// parameters, subqueries, `NULL`, `CASE`...
    Untyped,
}

fn operand_class(node: &Node, is_variable: &impl Fn(&str) -> bool) -> OperandClass {
    match node.kind() {
        NodeKind::Literal(lit) => match lit.kind {
            LiteralKind::String => OperandClass::Str,
            LiteralKind::Boolean => OperandClass::Bool,
            LiteralKind::Temporal => OperandClass::Temporal,
            LiteralKind::Integer | LiteralKind::Decimal => OperandClass::Numeric,
            LiteralKind::Null => OperandClass::Untyped,
        },
        NodeKind::Function { function, .. } => match function {
            Function::Concat | Function::Substring | Function::Lower | Function::Upper => {
                OperandClass::Str
            }
            Function::CurrentDate | Function::CurrentTime | Function::CurrentTimestamp => {
                OperandClass::Temporal
            }
            Function::Object => OperandClass::Variable,
            Function::Locate
            | Function::Length
            | Function::Abs
            | Function::Sqrt
            | Function::Mod
            | Function::Size
            | Function::Index => OperandClass::Numeric,
        },
        NodeKind::Trim { .. } => OperandClass::Str,
        NodeKind::Aggregate { function, .. } => match function {
            AggregateFunction::Count | AggregateFunction::Avg | AggregateFunction::Sum => {
                OperandClass::Numeric
            }
            AggregateFunction::Min | AggregateFunction::Max => OperandClass::Untyped,
        },
        NodeKind::Arithmetic { .. } | NodeKind::Unary { .. } | NodeKind::Extract { .. } => {
            OperandClass::Numeric
        }
        NodeKind::Path(path) if path.is_bare() && is_variable(&path.root) => {
            OperandClass::Variable
        }
        NodeKind::EnumMacro { .. } => OperandClass::Enum,
        NodeKind::TypeOf(_) => OperandClass::EntityType,
        NodeKind::Group(inner) => operand_class(inner, is_variable),
        _ => OperandClass::Untyped,
    }
}

impl ComparisonFamily {
    fn accepts(self, lhs: OperandClass, rhs: OperandClass) -> bool {
        use OperandClass as C;
        let own = |c: C| match self {
            Self::String => matches!(c, C::Str | C::Untyped),
            Self::Boolean => matches!(c, C::Bool | C::Untyped),
            Self::Enum => matches!(c, C::Enum | C::Untyped),
            Self::Datetime => matches!(c, C::Temporal | C::Untyped),
            Self::Entity => matches!(c, C::Variable | C::Untyped),
            Self::EntityType => matches!(c, C::EntityType | C::Variable | C::Untyped),
            Self::Arithmetic => matches!(c, C::Numeric | C::Untyped),
        };
        let anchored = self != Self::EntityType || lhs == C::EntityType || rhs == C::EntityType;
        anchored && own(lhs) && own(rhs)
    }
}

enum FamilyMismatch {
    /// Some family accepts the operands but not the operator.
    Operator,
    /// No family accepts the operands.
    Operands,
}

/// First family, in grammar order, accepting both operands and `op`.
fn comparison_family(
    lhs: &Node,
    rhs: &Node,
    op: ComparisonOp,
    is_variable: impl Fn(&str) -> bool,
) -> Result<ComparisonFamily, FamilyMismatch> {
    let (l, r) = (
        operand_class(lhs, &is_variable),
        operand_class(rhs, &is_variable),
    );
    let mut operands_fit = false;
    for family in ComparisonFamily::ORDERED {
        if family.accepts(l, r) {
            if family.allows(op) {
                return Ok(family);
            }
            operands_fit = true;
        }
    }
    Err(if operands_fit {
        FamilyMismatch::Operator
    } else {
        FamilyMismatch::Operands
    })
}
