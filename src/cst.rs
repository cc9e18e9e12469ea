//! Lossless `rowan` syntax tree over a parsed statement.
//!
//! The tree covers every byte of the input, whitespace and comments included,
//! so `syntax.text()` always equals the original query. Top-level clauses of
//! the statement become nodes (`N_SELECT_CLAUSE`, `N_FROM_CLAUSE`,
//! `N_WHERE_CLAUSE`...) wrapping their tokens; everything else is a flat token
//! sequence under the `N_QUERY` root. Clauses edited after parsing no longer
//! carry a span and are left as plain tokens.
//!
//! # Examples
//!
//! ```
//! use jpqlkit::{parse, SyntaxKind};
//!
//! let src = "select e /* all */ from Employee e where e.a = 1";
//! let ast = parse(src).expect("valid query");
//! let syntax = ast.syntax();
//! assert_eq!(syntax.text().to_string(), src);
//! let kinds: Vec<_> = syntax.children().map(|n| n.kind()).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         SyntaxKind::N_SELECT_CLAUSE,
//!         SyntaxKind::N_FROM_CLAUSE,
//!         SyntaxKind::N_WHERE_CLAUSE,
//!     ]
//! );
//! ```

use log::warn;
use rowan::{GreenNode, GreenNodeBuilder, Language};

use crate::parser::Ast;
use crate::parser::ast::{Node, QueryKind, TokenSpan};
use crate::{JpqlLanguage, Span, SyntaxKind, SyntaxNode, tokenize_with_trivia};

/// Walks clause byte ranges in source order, opening and closing nodes as
/// the token loop passes their boundaries.
struct SpanCursor {
    spans: std::iter::Peekable<std::vec::IntoIter<(Span, SyntaxKind)>>,
    open: bool,
}

impl SpanCursor {
    fn new(mut spans: Vec<(Span, SyntaxKind)>) -> Self {
        spans.sort_by_key(|(span, _)| span.start);
        Self {
            spans: spans.into_iter().peekable(),
            open: false,
        }
    }

    fn advance_to(&mut self, pos: usize) {
        if self.open {
            return;
        }
        while matches!(self.spans.peek(), Some((s, _)) if pos >= s.end) {
            self.spans.next();
        }
    }

    fn start_if(&mut self, builder: &mut GreenNodeBuilder, pos: usize) {
        if let Some((s, kind)) = self.spans.peek()
            && !self.open
            && pos == s.start
        {
            builder.start_node(JpqlLanguage::kind_to_raw(*kind));
            self.open = true;
        }
    }

    fn finish_if(&mut self, builder: &mut GreenNodeBuilder, pos: usize) {
        if self.open && matches!(self.spans.peek(), Some((s, _)) if pos >= s.end) {
            builder.finish_node();
            self.spans.next();
            self.open = false;
        }
    }
}

impl Ast {
    /// Lossless syntax tree of the original query text.
    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(build_green_tree(self.src(), &self.clause_spans()))
    }

    /// Byte ranges of the top-level clauses that still carry a span.
    fn clause_spans(&self) -> Vec<(Span, SyntaxKind)> {
        let query = self.query();
        let mut out = Vec::new();
        let mut push = |node: Option<&Node>, kind: SyntaxKind, keyword_tokens: usize| {
            let Some(span) = node.and_then(Node::span) else {
                return;
            };
            let span = TokenSpan {
                first: span.first.saturating_sub(keyword_tokens),
                last: span.last,
            };
            if let Some(bytes) = self.byte_range(span) {
                out.push((bytes, kind));
            }
        };
        push(query.select.as_deref(), SyntaxKind::N_SELECT_CLAUSE, 0);
        match query.kind {
            QueryKind::Select => push(Some(&query.sources), SyntaxKind::N_FROM_CLAUSE, 1),
            QueryKind::Update => push(Some(&query.sources), SyntaxKind::N_UPDATE_CLAUSE, 1),
            QueryKind::Delete => push(Some(&query.sources), SyntaxKind::N_FROM_CLAUSE, 1),
        }
        push(query.set.as_deref(), SyntaxKind::N_SET_CLAUSE, 0);
        push(query.where_clause.as_deref(), SyntaxKind::N_WHERE_CLAUSE, 0);
        push(query.group_by.as_deref(), SyntaxKind::N_GROUP_BY_CLAUSE, 0);
        push(query.having.as_deref(), SyntaxKind::N_HAVING_CLAUSE, 0);
        push(query.order_by.as_deref(), SyntaxKind::N_ORDER_BY_CLAUSE, 0);
        out
    }

    /// Byte range covered by an inclusive token span.
    pub(crate) fn byte_range(&self, span: TokenSpan) -> Option<Span> {
        let first = self.tokens().get(span.first)?;
        let last = self.tokens().get(span.last)?;
        Some(first.start()..last.end())
    }
}

/// Build the green tree of `src`, wrapping each clause range in a node.
fn build_green_tree(src: &str, clauses: &[(Span, SyntaxKind)]) -> GreenNode {
    let mut builder = GreenNodeBuilder::new();
    builder.start_node(JpqlLanguage::kind_to_raw(SyntaxKind::N_QUERY));

    let mut cursor = SpanCursor::new(clauses.to_vec());
    for (kind, span) in tokenize_with_trivia(src) {
        cursor.advance_to(span.start);
        cursor.start_if(&mut builder, span.start);
        push_token(&mut builder, kind, &span, src);
        cursor.finish_if(&mut builder, span.end);
    }

    builder.finish_node();
    builder.finish()
}

fn push_token(builder: &mut GreenNodeBuilder, kind: SyntaxKind, span: &Span, src: &str) {
    let text = src.get(span.clone()).unwrap_or_else(|| {
        warn!(
            "token span {span:?} out of bounds for source of length {}",
            src.len()
        );
        ""
    });
    builder.token(JpqlLanguage::kind_to_raw(kind), text);
}
