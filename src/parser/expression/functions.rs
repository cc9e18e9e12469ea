//! Built-in function calls.
//!
//! A call starts with a fused `name(` token, or with a known function name
//! followed by a separate `(`. Aggregates, `TRIM`, `CAST`, `EXTRACT`,
//! `COALESCE`, `NULLIF` and `TYPE` have bespoke argument syntax; every other
//! function takes a plain comma-separated argument list.

use phf::phf_map;

use crate::SyntaxKind;
use crate::parser::ast::{AggregateFunction, Function, Node, NodeKind, TrimSide};
use crate::parser::grammar::Parser;

/// Lower-cased function names mapped to their fused opener kind.
static FUNCTION_NAMES: phf::Map<&'static str, SyntaxKind> = phf_map! {
    "abs" => SyntaxKind::T_ABS_OPEN,
    "avg" => SyntaxKind::T_AVG_OPEN,
    "cast" => SyntaxKind::T_CAST_OPEN,
    "coalesce" => SyntaxKind::T_COALESCE_OPEN,
    "concat" => SyntaxKind::T_CONCAT_OPEN,
    "count" => SyntaxKind::T_COUNT_OPEN,
    "extract" => SyntaxKind::T_EXTRACT_OPEN,
    "index" => SyntaxKind::T_INDEX_OPEN,
    "length" => SyntaxKind::T_LENGTH_OPEN,
    "locate" => SyntaxKind::T_LOCATE_OPEN,
    "lower" => SyntaxKind::T_LOWER_OPEN,
    "max" => SyntaxKind::T_MAX_OPEN,
    "min" => SyntaxKind::T_MIN_OPEN,
    "mod" => SyntaxKind::T_MOD_OPEN,
    "nullif" => SyntaxKind::T_NULLIF_OPEN,
    "object" => SyntaxKind::T_OBJECT_OPEN,
    "size" => SyntaxKind::T_SIZE_OPEN,
    "sqrt" => SyntaxKind::T_SQRT_OPEN,
    "substring" => SyntaxKind::T_SUBSTRING_OPEN,
    "sum" => SyntaxKind::T_SUM_OPEN,
    "trim" => SyntaxKind::T_TRIM_OPEN,
    "type" => SyntaxKind::T_TYPE_OPEN,
    "upper" => SyntaxKind::T_UPPER_OPEN,
};

/// Opener kind for a function name written apart from its `(`.
pub(crate) fn opener_for_name(name: &str) -> Option<SyntaxKind> {
    FUNCTION_NAMES
        .get(name.to_ascii_lowercase().as_str())
        .copied()
}

fn aggregate(opener: SyntaxKind) -> Option<AggregateFunction> {
    Some(match opener {
        SyntaxKind::T_COUNT_OPEN => AggregateFunction::Count,
        SyntaxKind::T_AVG_OPEN => AggregateFunction::Avg,
        SyntaxKind::T_SUM_OPEN => AggregateFunction::Sum,
        SyntaxKind::T_MIN_OPEN => AggregateFunction::Min,
        SyntaxKind::T_MAX_OPEN => AggregateFunction::Max,
        _ => return None,
    })
}

fn scalar_function(opener: SyntaxKind) -> Option<Function> {
    Some(match opener {
        SyntaxKind::T_LOCATE_OPEN => Function::Locate,
        SyntaxKind::T_SUBSTRING_OPEN => Function::Substring,
        SyntaxKind::T_CONCAT_OPEN => Function::Concat,
        SyntaxKind::T_LOWER_OPEN => Function::Lower,
        SyntaxKind::T_UPPER_OPEN => Function::Upper,
        SyntaxKind::T_LENGTH_OPEN => Function::Length,
        SyntaxKind::T_ABS_OPEN => Function::Abs,
        SyntaxKind::T_SQRT_OPEN => Function::Sqrt,
        SyntaxKind::T_MOD_OPEN => Function::Mod,
        SyntaxKind::T_SIZE_OPEN => Function::Size,
        SyntaxKind::T_INDEX_OPEN => Function::Index,
        SyntaxKind::T_OBJECT_OPEN => Function::Object,
        _ => return None,
    })
}

impl Parser<'_> {
    /// Parse the arguments of a call whose opener has been consumed.
    ///
    /// `first` is the index of the opener's first token.
    pub(super) fn call(&mut self, opener: SyntaxKind, first: usize) -> Option<Node> {
        if let Some(function) = aggregate(opener) {
            let distinct = self.ts.eat(SyntaxKind::K_DISTINCT);
            let arg = self.scalar()?;
            self.ts.expect(SyntaxKind::T_RPAREN)?;
            return Some(self.node(
                NodeKind::Aggregate {
                    function,
                    distinct,
                    arg: Box::new(arg),
                },
                first,
            ));
        }
        if let Some(function) = scalar_function(opener) {
            let args = self.arguments(function.arity())?;
            return Some(self.node(NodeKind::Function { function, args }, first));
        }
        let kind = match opener {
            SyntaxKind::T_TRIM_OPEN => return self.trim_call(first),
            SyntaxKind::T_COALESCE_OPEN => NodeKind::Coalesce(self.arguments((2, usize::MAX))?),
            SyntaxKind::T_NULLIF_OPEN => {
                let mut args = self.arguments((2, 2))?.into_iter();
                let (Some(lhs), Some(rhs)) = (args.next(), args.next()) else {
                    return None;
                };
                NodeKind::NullIf {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }
            SyntaxKind::T_CAST_OPEN => {
                let operand = self.scalar()?;
                self.ts.expect(SyntaxKind::K_AS)?;
                let (_, target) = self.word()?;
                self.ts.expect(SyntaxKind::T_RPAREN)?;
                NodeKind::Cast {
                    operand: Box::new(operand),
                    target: target.to_string(),
                }
            }
            SyntaxKind::T_EXTRACT_OPEN => {
                let (_, unit) = self.word()?;
                self.ts.expect(SyntaxKind::K_FROM)?;
                let operand = self.scalar()?;
                self.ts.expect(SyntaxKind::T_RPAREN)?;
                NodeKind::Extract {
                    unit: unit.to_string(),
                    operand: Box::new(operand),
                }
            }
            SyntaxKind::T_TYPE_OPEN => {
                let arg = self.scalar()?;
                self.ts.expect(SyntaxKind::T_RPAREN)?;
                NodeKind::TypeOf(Box::new(arg))
            }
            _ => return None,
        };
        Some(self.node(kind, first))
    }

    /// `arg {, arg} )` with an inclusive bound on the argument count.
    fn arguments(&mut self, (min, max): (usize, usize)) -> Option<Vec<Node>> {
        let mut args = vec![self.scalar()?];
        while args.len() < max && self.ts.eat(SyntaxKind::T_COMMA) {
            args.push(self.scalar()?);
        }
        if args.len() < min {
            self.ts.expected_here(SyntaxKind::T_COMMA);
            return None;
        }
        self.ts.expect(SyntaxKind::T_RPAREN)?;
        Some(args)
    }

    /// `TRIM([LEADING|TRAILING|BOTH] [char] FROM s)` or `TRIM(s)`.
    fn trim_call(&mut self, first: usize) -> Option<Node> {
        let side = self.ts.peek_kind().and_then(TrimSide::from_kind);
        if side.is_some() {
            self.ts.advance();
        }
        let character = if self.ts.eat(SyntaxKind::K_FROM) {
            None
        } else if side.is_some() {
            let c = self.scalar()?;
            self.ts.expect(SyntaxKind::K_FROM)?;
            Some(Box::new(c))
        } else {
            self.attempt(|p| {
                let c = p.scalar()?;
                p.ts.expect(SyntaxKind::K_FROM)?;
                Some(Box::new(c))
            })
        };
        let operand = self.scalar()?;
        self.ts.expect(SyntaxKind::T_RPAREN)?;
        Some(self.node(
            NodeKind::Trim {
                side,
                character,
                operand: Box::new(operand),
            },
            first,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::parser::ast::{AggregateFunction, Function, NodeKind, TrimSide};
    use crate::parser::{ParseOptions, parse_scalar_with};

    fn scalar(src: &str) -> NodeKind {
        parse_scalar_with(src, ParseOptions::default())
            .unwrap_or_else(|e| panic!("parse failed for {src}: {e}"))
            .kind
    }

    #[rstest]
    #[case("count(e)", AggregateFunction::Count, false)]
    #[case("COUNT(DISTINCT e.name)", AggregateFunction::Count, true)]
    #[case("avg(e.age)", AggregateFunction::Avg, false)]
    #[case("sum (e.total)", AggregateFunction::Sum, false)]
    #[case("max(e.ts)", AggregateFunction::Max, false)]
    fn aggregates(
        #[case] src: &str,
        #[case] expected: AggregateFunction,
        #[case] expected_distinct: bool,
    ) {
        let NodeKind::Aggregate {
            function, distinct, ..
        } = scalar(src)
        else {
            panic!("expected aggregate for {src}");
        };
        assert_eq!(function, expected);
        assert_eq!(distinct, expected_distinct);
    }

    #[rstest]
    #[case("locate('a', e.name)", Function::Locate, 2)]
    #[case("locate('a', e.name, 3)", Function::Locate, 3)]
    #[case("substring(e.name, 1, 2)", Function::Substring, 3)]
    #[case("concat(e.a, ' ', e.b)", Function::Concat, 3)]
    #[case("lower(e.name)", Function::Lower, 1)]
    #[case("mod(e.n, 2)", Function::Mod, 2)]
    #[case("size(e.items)", Function::Size, 1)]
    #[case("upper (e.name)", Function::Upper, 1)]
    fn scalar_functions(#[case] src: &str, #[case] expected: Function, #[case] arity: usize) {
        let NodeKind::Function { function, args } = scalar(src) else {
            panic!("expected function for {src}");
        };
        assert_eq!(function, expected);
        assert_eq!(args.len(), arity);
    }

    #[rstest]
    #[case("lower(e.a, e.b)")]
    #[case("mod(e.a)")]
    #[case("concat(e.a)")]
    #[case("nullif(e.a)")]
    fn wrong_arity_is_rejected(#[case] src: &str) {
        assert!(parse_scalar_with(src, ParseOptions::default()).is_err());
    }

    #[rstest]
    #[case("trim(e.name)", None, false)]
    #[case("trim(leading from e.name)", Some(TrimSide::Leading), false)]
    #[case("trim(both 'x' from e.name)", Some(TrimSide::Both), true)]
    #[case("trim('x' from e.name)", None, true)]
    fn trim_forms(
        #[case] src: &str,
        #[case] expected_side: Option<TrimSide>,
        #[case] has_character: bool,
    ) {
        let NodeKind::Trim {
            side, character, ..
        } = scalar(src)
        else {
            panic!("expected trim for {src}");
        };
        assert_eq!(side, expected_side);
        assert_eq!(character.is_some(), has_character);
    }

    #[test]
    fn cast_and_extract_keep_their_words() {
        let NodeKind::Cast { target, .. } = scalar("cast(e.n as string)") else {
            panic!("expected cast");
        };
        assert_eq!(target, "string");
        let NodeKind::Extract { unit, .. } = scalar("extract(year from e.ts)") else {
            panic!("expected extract");
        };
        assert_eq!(unit, "year");
    }

    #[test]
    fn coalesce_and_type() {
        assert!(matches!(
            scalar("coalesce(e.a, e.b, 'x')"),
            NodeKind::Coalesce(args) if args.len() == 3
        ));
        assert!(matches!(scalar("type(e)"), NodeKind::TypeOf(_)));
    }
}
