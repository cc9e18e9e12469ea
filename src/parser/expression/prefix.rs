//! Parsing of prefix expressions and primaries for the Pratt parser.

use crate::SyntaxKind;
use crate::parser::ast::{
    Function, Literal, LiteralKind, Node, NodeKind, Parameter, ParameterKind, PathExpr, Sign,
};
use crate::parser::grammar::Parser;

use super::functions::opener_for_name;
use super::infix::PREFIX_BP;

/// Token kinds that can start a scalar primary, reported on failure.
const SCALAR_START: &[SyntaxKind] = &[
    SyntaxKind::T_IDENT,
    SyntaxKind::T_STRING,
    SyntaxKind::T_INTEGER,
    SyntaxKind::T_DECIMAL,
    SyntaxKind::T_NAMED_PARAM,
    SyntaxKind::T_POSITIONAL_PARAM,
    SyntaxKind::T_LPAREN,
    SyntaxKind::K_CASE,
];

impl Parser<'_> {
    pub(super) fn prefix(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let sign = match self.ts.peek_kind() {
            Some(SyntaxKind::T_PLUS) => Sign::Plus,
            Some(SyntaxKind::T_MINUS) => Sign::Minus,
            _ => return self.primary(),
        };
        self.ts.advance();
        let operand = self.scalar_bp(PREFIX_BP)?;
        Some(self.node(
            NodeKind::Unary {
                sign,
                operand: Box::new(operand),
            },
            first,
        ))
    }

    fn primary(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let Some(kind) = self.ts.peek_kind() else {
            self.ts.expected_any(SCALAR_START);
            return None;
        };
        if let Some(lit) = literal_kind(kind) {
            self.ts.advance();
            let text = self.text(first).to_string();
            return Some(self.node(NodeKind::Literal(Literal { kind: lit, text }), first));
        }
        if let Some(param) = parameter(kind, self.text(first)) {
            self.ts.advance();
            return Some(self.node(NodeKind::Parameter(param), first));
        }
        match kind {
            SyntaxKind::T_LPAREN if self.ts.nth_kind(1) == Some(SyntaxKind::K_SELECT) => {
                self.subquery()
            }
            SyntaxKind::T_LPAREN => self.parenthesized_scalar(),
            SyntaxKind::K_CASE => self.case_expression(),
            SyntaxKind::K_CURRENT_DATE
            | SyntaxKind::K_CURRENT_TIME
            | SyntaxKind::K_CURRENT_TIMESTAMP => {
                self.ts.advance();
                let function = match kind {
                    SyntaxKind::K_CURRENT_DATE => Function::CurrentDate,
                    SyntaxKind::K_CURRENT_TIME => Function::CurrentTime,
                    _ => Function::CurrentTimestamp,
                };
                Some(self.node(
                    NodeKind::Function {
                        function,
                        args: Vec::new(),
                    },
                    first,
                ))
            }
            SyntaxKind::T_MACRO_ENUM if self.options.macros => self.enum_macro(),
            k if k.is_call_opener() && !k.is_macro_opener() => {
                self.ts.advance();
                self.call(k, first)
            }
            SyntaxKind::T_IDENT if self.ts.nth_kind(1) == Some(SyntaxKind::T_LPAREN) => {
                match opener_for_name(self.text(first)) {
                    Some(opener) => {
                        self.ts.advance();
                        self.ts.advance();
                        self.call(opener, first)
                    }
                    None => self.path(),
                }
            }
            _ if self.at_ident() => self.path(),
            _ => {
                self.ts.expected_any(SCALAR_START);
                None
            }
        }
    }

    /// `ident {. word}`: a variable reference or navigation path.
    pub(crate) fn path(&mut self) -> Option<Node> {
        let (first, root) = self.ident()?;
        let mut fields = Vec::new();
        while self.ts.eat(SyntaxKind::T_DOT) {
            let (_, field) = self.word()?;
            fields.push(field.to_string());
        }
        Some(self.node(
            NodeKind::Path(PathExpr {
                root: root.to_string(),
                fields,
            }),
            first,
        ))
    }

    /// `( SELECT ... )`.
    pub(crate) fn subquery(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::T_LPAREN)?;
        let query = self.nested(|p| p.select_statement())?;
        self.ts.expect(SyntaxKind::T_RPAREN)?;
        Some(self.node(NodeKind::Subquery(Box::new(query)), first))
    }

    fn parenthesized_scalar(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::T_LPAREN)?;
        let inner = self.scalar()?;
        self.ts.expect(SyntaxKind::T_RPAREN)?;
        Some(self.node(NodeKind::Group(Box::new(inner)), first))
    }

    /// `CASE [operand] WHEN .. THEN .. {WHEN .. THEN ..} ELSE .. END`.
    ///
    /// Without an operand each `WHEN` takes a condition; with one it takes a
    /// scalar compared against the operand.
    fn case_expression(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::K_CASE)?;
        let operand = if self.ts.at(SyntaxKind::K_WHEN) {
            None
        } else {
            Some(Box::new(self.scalar()?))
        };
        let mut whens = Vec::new();
        while self.ts.at(SyntaxKind::K_WHEN) {
            let when_first = self.ts.cursor();
            self.ts.advance();
            let condition = if operand.is_some() {
                self.scalar()?
            } else {
                self.condition()?
            };
            self.ts.expect(SyntaxKind::K_THEN)?;
            let result = self.scalar()?;
            whens.push(self.node(
                NodeKind::When {
                    condition: Box::new(condition),
                    result: Box::new(result),
                },
                when_first,
            ));
        }
        if whens.is_empty() {
            return None;
        }
        self.ts.expect(SyntaxKind::K_ELSE)?;
        let otherwise = self.scalar()?;
        self.ts.expect(SyntaxKind::K_END)?;
        Some(self.node(
            NodeKind::Case {
                operand,
                whens,
                otherwise: Box::new(otherwise),
            },
            first,
        ))
    }
}

fn literal_kind(kind: SyntaxKind) -> Option<LiteralKind> {
    Some(match kind {
        SyntaxKind::T_STRING => LiteralKind::String,
        SyntaxKind::T_INTEGER => LiteralKind::Integer,
        SyntaxKind::T_DECIMAL => LiteralKind::Decimal,
        SyntaxKind::T_DATE_LITERAL => LiteralKind::Temporal,
        SyntaxKind::K_TRUE | SyntaxKind::K_FALSE => LiteralKind::Boolean,
        SyntaxKind::K_NULL => LiteralKind::Null,
        _ => return None,
    })
}

fn parameter(kind: SyntaxKind, text: &str) -> Option<Parameter> {
    let (kind, name) = match kind {
        SyntaxKind::T_NAMED_PARAM => (ParameterKind::Named, text.strip_prefix(':')?),
        SyntaxKind::T_POSITIONAL_PARAM => (ParameterKind::Positional, text.strip_prefix('?')?),
        SyntaxKind::T_CONFIG_PARAM => (
            ParameterKind::Config,
            text.strip_prefix("${")?.strip_suffix('}')?,
        ),
        _ => return None,
    };
    Some(Parameter {
        kind,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::parser::ast::{Function, LiteralKind, NodeKind, ParameterKind};
    use crate::parser::{ParseOptions, parse_scalar_with};

    fn scalar(src: &str) -> NodeKind {
        parse_scalar_with(src, ParseOptions::default())
            .unwrap_or_else(|e| panic!("parse failed for {src}: {e}"))
            .kind
    }

    #[rstest]
    #[case("'abc'", LiteralKind::String)]
    #[case("42", LiteralKind::Integer)]
    #[case("4.5", LiteralKind::Decimal)]
    #[case("TRUE", LiteralKind::Boolean)]
    #[case("null", LiteralKind::Null)]
    #[case("{ts '2020-01-01 10:00:00'}", LiteralKind::Temporal)]
    fn literals(#[case] src: &str, #[case] expected: LiteralKind) {
        let NodeKind::Literal(lit) = scalar(src) else {
            panic!("expected literal for {src}");
        };
        assert_eq!(lit.kind, expected);
        assert_eq!(lit.text, src);
    }

    #[rstest]
    #[case(":name", ParameterKind::Named, "name")]
    #[case(":session.userId", ParameterKind::Named, "session.userId")]
    #[case("?3", ParameterKind::Positional, "3")]
    #[case("${tenant}", ParameterKind::Config, "tenant")]
    fn parameters(#[case] src: &str, #[case] kind: ParameterKind, #[case] name: &str) {
        let NodeKind::Parameter(param) = scalar(src) else {
            panic!("expected parameter for {src}");
        };
        assert_eq!(param.kind, kind);
        assert_eq!(param.name, name);
        assert_eq!(param.text(), src);
    }

    #[test]
    fn paths_accept_keywords_after_dot() {
        let NodeKind::Path(path) = scalar("e.order.group") else {
            panic!("expected path");
        };
        assert_eq!(path.root, "e");
        assert_eq!(path.fields, vec!["order", "group"]);
    }

    #[test]
    fn niladic_functions() {
        assert!(matches!(
            scalar("current_timestamp"),
            NodeKind::Function {
                function: Function::CurrentTimestamp,
                ..
            }
        ));
    }

    #[test]
    fn searched_case_requires_else() {
        assert!(matches!(
            scalar("case when e.a > 1 then 'big' else 'small' end"),
            NodeKind::Case { operand: None, .. }
        ));
        assert!(parse_scalar_with("case when e.a > 1 then 1 end", ParseOptions::default()).is_err());
    }

    #[test]
    fn simple_case_compares_operand() {
        let NodeKind::Case { operand, whens, .. } =
            scalar("case e.kind when 1 then 'one' when 2 then 'two' else 'many' end")
        else {
            panic!("expected case");
        };
        assert!(operand.is_some());
        assert_eq!(whens.len(), 2);
    }

    #[test]
    fn parenthesised_subquery_is_recognised() {
        assert!(matches!(
            scalar("(select max(x.a) from X x)"),
            NodeKind::Subquery(_)
        ));
        assert!(matches!(scalar("(e.a)"), NodeKind::Group(_)));
    }
}
