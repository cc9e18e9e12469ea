//! Recursive-descent driver shared by every production.
//!
//! Productions return `Option<T>`: `None` means the production did not match
//! and the failure has been recorded in the token stream. Structurally
//! ambiguous alternatives are wrapped in [`Parser::attempt`], which rewinds the
//! cursor when the alternative fails. Errors that no other alternative could
//! repair (a malformed macro call, an operator not allowed for its operands,
//! runaway nesting) are stored as *fatal* and stop all further attempts.

use std::collections::HashSet;

use log::{debug, trace};

use crate::SyntaxKind;

use super::ParseOptions;
use super::ast::{Node, NodeKind, TokenSpan, declared_variables};
use super::error::{ParseError, SyntaxError};
use super::token_stream::TokenStream;

pub(crate) struct Parser<'a> {
    pub(crate) ts: TokenStream<'a>,
    pub(crate) options: ParseOptions,
    depth: usize,
    failed_conditions: HashSet<usize>,
    fatal: Option<ParseError>,
    /// Variables declared by each enclosing statement, innermost last.
    scopes: Vec<Vec<String>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(ts: TokenStream<'a>, options: ParseOptions) -> Self {
        Self {
            ts,
            options,
            depth: 0,
            failed_conditions: HashSet::new(),
            fatal: None,
            scopes: Vec::new(),
        }
    }

    /// Run `rule` to completion over the whole stream.
    ///
    /// Leftover tokens are reported as a syntax error at the furthest
    /// position reached.
    pub(crate) fn run<T>(
        mut self,
        rule: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Result<T, ParseError> {
        let out = rule(&mut self);
        if let Some(fatal) = self.fatal {
            return Err(fatal);
        }
        match out {
            Some(value) if self.ts.at_end() => Ok(value),
            _ => Err(ParseError::Syntax(self.ts.furthest_error())),
        }
    }

    /// Try `rule`; on failure restore the cursor as if nothing was consumed.
    pub(crate) fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.fatal.is_some() {
            return None;
        }
        let mark = self.ts.mark();
        let out = rule(self);
        if out.is_none() && self.fatal.is_none() {
            debug!("rewinding trial parse to token {}", mark.index());
            self.ts.rewind(mark);
        }
        out
    }

    /// Like [`Parser::attempt`], remembering failures by start position.
    ///
    /// Only for context-free rules: a rule that failed at a position fails
    /// there again, so the second try is skipped.
    pub(crate) fn attempt_memo<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let start = self.ts.cursor();
        if self.failed_conditions.contains(&start) {
            trace!("memoised failure at token {start}");
            return None;
        }
        let out = self.attempt(rule);
        if out.is_none() {
            self.failed_conditions.insert(start);
        }
        out
    }

    /// Run `rule` one nesting level deeper, enforcing `max_depth`.
    pub(crate) fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= self.options.max_depth {
            let offset = self.ts.offset_of(self.ts.cursor());
            return self.fail(ParseError::TooDeep {
                offset,
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let out = rule(self);
        self.depth -= 1;
        out
    }

    /// Run `rule` with the variables declared by `sources` in scope.
    pub(crate) fn scoped<T>(
        &mut self,
        sources: &Node,
        rule: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let declared = match &sources.kind {
            NodeKind::Sources(items) => declared_variables(items)
                .into_iter()
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        self.scopes.push(declared);
        let out = rule(self);
        self.scopes.pop();
        out
    }

    /// Whether a bare name can refer to an identification variable.
    ///
    /// Outside any statement (a standalone predicate) every bare name can.
    pub(crate) fn may_be_variable(&self, name: &str) -> bool {
        self.scopes.is_empty() || self.scopes.iter().flatten().any(|v| v == name)
    }

    /// Record a fatal error. The first one wins.
    pub(crate) fn fail<T>(&mut self, err: impl Into<ParseError>) -> Option<T> {
        if self.fatal.is_none() {
            let err = err.into();
            debug!("fatal parse error: {err}");
            self.fatal = Some(err);
        }
        None
    }

    /// Fatal syntax error at token `idx`.
    pub(crate) fn fail_at<T>(
        &mut self,
        idx: usize,
        expected: &[SyntaxKind],
        note: &'static str,
    ) -> Option<T> {
        let err: SyntaxError = self.ts.error_at(idx, expected).with_note(note);
        self.fail(err)
    }

    /// Span from token `first` to the last consumed token.
    pub(crate) fn span_from(&self, first: usize) -> TokenSpan {
        TokenSpan {
            first,
            last: self.ts.last_index().max(first),
        }
    }

    /// Wrap `kind` in a node spanning `first` to the last consumed token.
    pub(crate) fn node(&self, kind: NodeKind, first: usize) -> Node {
        Node::parsed(kind, self.span_from(first))
    }

    /// Text of the token at `idx`.
    pub(crate) fn text(&self, idx: usize) -> &'a str {
        self.ts.tokens().get(idx).map_or("", |t| t.text.as_str())
    }

    /// Consume an identifier, accepting non-reserved keywords.
    ///
    /// `GROUP` and `ORDER` only count as identifiers when not followed by
    /// `BY`.
    pub(crate) fn ident(&mut self) -> Option<(usize, &'a str)> {
        if self.at_ident() {
            let idx = self.ts.cursor();
            self.ts.advance();
            Some((idx, self.text(idx)))
        } else {
            self.ts.expected_here(SyntaxKind::T_IDENT);
            None
        }
    }

    /// Whether the next token can be read as an identifier.
    pub(crate) fn at_ident(&self) -> bool {
        match self.ts.peek_kind() {
            Some(SyntaxKind::T_IDENT) => true,
            Some(SyntaxKind::K_GROUP | SyntaxKind::K_ORDER) => {
                self.ts.nth_kind(1) != Some(SyntaxKind::K_BY)
            }
            Some(kind) => is_soft_keyword(kind),
            None => false,
        }
    }

    /// Consume any word: identifiers and keywords alike.
    pub(crate) fn word(&mut self) -> Option<(usize, &'a str)> {
        match self.ts.peek_kind() {
            Some(kind) if kind.is_word() => {
                let idx = self.ts.cursor();
                self.ts.advance();
                Some((idx, self.text(idx)))
            }
            _ => {
                self.ts.expected_here(SyntaxKind::T_IDENT);
                None
            }
        }
    }

    /// `[AS] ident`, with `AS` only optional when `required` is false.
    pub(crate) fn alias(&mut self, required: bool) -> Option<Option<Node>> {
        if self.ts.eat(SyntaxKind::K_AS) || self.at_ident() {
            let (idx, name) = self.ident()?;
            return Some(Some(self.node(
                NodeKind::IdentificationVariable(name.to_string()),
                idx,
            )));
        }
        self.ts.expected_here(SyntaxKind::T_IDENT);
        if required { None } else { Some(None) }
    }

    /// Parse `item {, item}`.
    pub(crate) fn comma_list<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut out = vec![item(self)?];
        while self.ts.eat(SyntaxKind::T_COMMA) {
            out.push(item(self)?);
        }
        Some(out)
    }
}

/// Keywords that may still be used as identifiers.
fn is_soft_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::K_BOTH
            | SyntaxKind::K_DAY
            | SyntaxKind::K_FIRST
            | SyntaxKind::K_HOUR
            | SyntaxKind::K_LAST
            | SyntaxKind::K_LEADING
            | SyntaxKind::K_MINUTE
            | SyntaxKind::K_MONTH
            | SyntaxKind::K_NOW
            | SyntaxKind::K_SECOND
            | SyntaxKind::K_TRAILING
            | SyntaxKind::K_WEEK
            | SyntaxKind::K_YEAR
    )
}
