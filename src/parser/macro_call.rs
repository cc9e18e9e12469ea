//! Macro calls: `@ENUM`, `@TODAY`, `@DATEBEFORE`, `@DATEAFTER`,
//! `@DATEEQUALS` and `@BETWEEN`.
//!
//! Macros are recognised by their fused `@name(` opener. Once an opener has
//! been seen the argument list is committed: anything malformed inside it is a
//! fatal [`MacroSyntaxError`] rather than a reason to backtrack. The fixed
//! argument shapes (`NOW[+/-n]` bounds, date units, dotted enum literals) are
//! matched by small `chumsky` parsers run over the token kinds, with token
//! indices as spans.

use chumsky::Error as _;
use chumsky::Parser as _;
use chumsky::Stream;
use chumsky::error::Simple;
use chumsky::prelude::{filter_map, just};
use log::debug;

use crate::tokenizer::Token;
use crate::{Span, SyntaxKind};

use super::ast::{DateComparison, DateUnit, Node, NodeKind, NowOffset};
use super::error::MacroSyntaxError;
use super::grammar::Parser;

type MacroError = Simple<SyntaxKind>;

fn token_text<'a>(tokens: &'a [Token], span: &Span) -> &'a str {
    tokens.get(span.start).map_or("", |t| t.text.as_str())
}

/// `word {. word}` followed by `)`; at least two segments.
fn enum_literal(
    tokens: &[Token],
) -> impl chumsky::Parser<SyntaxKind, Vec<String>, Error = MacroError> + '_ {
    let word = filter_map(move |span: Span, kind: SyntaxKind| {
        if kind.is_word() {
            Ok(token_text(tokens, &span).to_string())
        } else {
            Err(Simple::expected_input_found(
                span,
                [Some(SyntaxKind::T_IDENT)],
                Some(kind),
            ))
        }
    });
    word.separated_by(just(SyntaxKind::T_DOT))
        .at_least(2)
        .then_ignore(just(SyntaxKind::T_RPAREN))
}

/// `NOW [(+|-) integer]`.
fn now_offset(
    tokens: &[Token],
) -> impl chumsky::Parser<SyntaxKind, NowOffset, Error = MacroError> + '_ {
    let amount = filter_map(move |span: Span, kind: SyntaxKind| match kind {
        SyntaxKind::T_INTEGER => token_text(tokens, &span)
            .parse::<i64>()
            .map_err(|_| Simple::custom(span, "offset is not a plain integer")),
        _ => Err(Simple::expected_input_found(
            span,
            [Some(SyntaxKind::T_INTEGER)],
            Some(kind),
        )),
    });
    let sign = just(SyntaxKind::T_PLUS)
        .to(false)
        .or(just(SyntaxKind::T_MINUS).to(true));
    just(SyntaxKind::K_NOW)
        .ignore_then(sign.then(amount).or_not())
        .map(|shift| match shift {
            Some((true, n)) => NowOffset(-n),
            Some((false, n)) => NowOffset(n),
            None => NowOffset::default(),
        })
}

/// `now, now, unit )` of `@BETWEEN`.
fn between_bounds(
    tokens: &[Token],
) -> impl chumsky::Parser<SyntaxKind, (NowOffset, NowOffset, DateUnit), Error = MacroError> + '_
{
    let unit = filter_map(move |span: Span, kind: SyntaxKind| {
        let text = token_text(tokens, &span);
        match DateUnit::from_name(&text.to_ascii_lowercase()) {
            Some(unit) if kind.is_word() => Ok(unit),
            _ => Err(Simple::custom(span, format!("unknown date unit {text:?}"))),
        }
    });
    now_offset(tokens)
        .then_ignore(just(SyntaxKind::T_COMMA))
        .then(now_offset(tokens))
        .then_ignore(just(SyntaxKind::T_COMMA))
        .then(unit)
        .then_ignore(just(SyntaxKind::T_RPAREN))
        .map(|((from, to), unit)| (from, to, unit))
}

fn date_comparison(kind: SyntaxKind) -> Option<DateComparison> {
    Some(match kind {
        SyntaxKind::T_MACRO_DATE_BEFORE => DateComparison::Before,
        SyntaxKind::T_MACRO_DATE_AFTER => DateComparison::After,
        SyntaxKind::T_MACRO_DATE_EQUALS => DateComparison::Equals,
        _ => return None,
    })
}

impl Parser<'_> {
    /// `@ENUM(dotted.Literal)`.
    pub(crate) fn enum_macro(&mut self) -> Option<Node> {
        let first = self.ts.expect(SyntaxKind::T_MACRO_ENUM)?;
        let tokens = self.ts.tokens();
        let segments = self.run_tail(first, enum_literal(tokens))?;
        Some(self.node(
            NodeKind::EnumMacro {
                literal: segments.join("."),
            },
            first,
        ))
    }

    /// `@TODAY`, the `@DATE*` family and `@BETWEEN`, all used as conditions.
    pub(crate) fn date_macro(&mut self) -> Option<Node> {
        let first = self.ts.cursor();
        let opener = self.ts.advance()?.kind;
        let Some(path) = self.path() else {
            return self.macro_error(first, "first argument must be a path".to_string());
        };
        let path = Box::new(path);
        let kind = if opener == SyntaxKind::T_MACRO_TODAY {
            self.macro_close(first)?;
            NodeKind::TodayMacro { path }
        } else {
            if !self.ts.eat(SyntaxKind::T_COMMA) {
                return self.macro_error(first, "expected ',' after the path".to_string());
            }
            if let Some(op) = date_comparison(opener) {
                let reference = self.date_reference(first)?;
                self.macro_close(first)?;
                NodeKind::DateCompareMacro {
                    op,
                    path,
                    reference: Box::new(reference),
                }
            } else {
                let tokens = self.ts.tokens();
                let (from, to, unit) = self.run_tail(first, between_bounds(tokens))?;
                NodeKind::DateRangeMacro {
                    path,
                    from,
                    to,
                    unit,
                }
            }
        };
        debug!("parsed {} at token {first}", kind.name());
        Some(self.node(kind, first))
    }

    /// `NOW[+/-n]`, a parameter or a path.
    fn date_reference(&mut self, opener: usize) -> Option<Node> {
        let first = self.ts.cursor();
        if self.ts.peek_kind() == Some(SyntaxKind::K_NOW) {
            let tokens = self.ts.tokens();
            let offset = self.run_tail(opener, now_offset(tokens))?;
            return Some(self.node(NodeKind::Now(offset), first));
        }
        match self.scalar_bp(u8::MAX) {
            Some(node) if matches!(node.kind, NodeKind::Path(_) | NodeKind::Parameter(_)) => {
                Some(node)
            }
            _ => self.macro_error(
                opener,
                "second argument must be NOW[+/-n], a parameter or a path".to_string(),
            ),
        }
    }

    fn macro_close(&mut self, opener: usize) -> Option<()> {
        if self.ts.eat(SyntaxKind::T_RPAREN) {
            Some(())
        } else {
            self.macro_error(opener, "expected ')'".to_string())
        }
    }

    /// Run `tail` from the cursor and move past what it matched.
    fn run_tail<O>(
        &mut self,
        opener: usize,
        tail: impl chumsky::Parser<SyntaxKind, O, Error = MacroError>,
    ) -> Option<O> {
        let tokens = self.ts.tokens();
        let start = self.ts.cursor();
        let iter = tokens
            .iter()
            .enumerate()
            .skip(start)
            .map(|(idx, t)| (t.kind, idx..idx + 1));
        let eoi = tokens.len()..tokens.len() + 1;
        let parsed = tail
            .map_with_span(|out, span: Span| (out, span.end))
            .parse(Stream::from_iter(eoi, iter));
        match parsed {
            Ok((out, end)) => {
                self.ts.skip_to(end);
                Some(out)
            }
            Err(errors) => {
                let message = errors
                    .first()
                    .map_or_else(|| "malformed arguments".to_string(), ToString::to_string);
                self.macro_error(opener, message)
            }
        }
    }

    fn macro_error<T>(&mut self, opener: usize, message: String) -> Option<T> {
        let name = self
            .text(opener)
            .trim_start_matches('@')
            .trim_end_matches('(')
            .to_string();
        let offset = self.ts.offset_of(opener);
        self.fail(MacroSyntaxError {
            offset,
            name,
            message,
        })
    }
}
