//! Token stream utilities.
//!
//! Provides a cursor over the significant tokens of a query with mark/rewind
//! support for trial parses. Every failed expectation is recorded against the
//! position where it happened; only the furthest position is kept, so after
//! all alternatives are exhausted the stream can describe what would have been
//! accepted where the parser got stuck.

use std::collections::BTreeSet;

use crate::SyntaxKind;
use crate::tokenizer::Token;

use super::error::SyntaxError;

/// Saved cursor position returned by [`TokenStream::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mark(usize);

impl Mark {
    /// Token index the mark points at.
    #[must_use]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub(crate) struct TokenStream<'a> {
    tokens: &'a [Token],
    src: &'a str,
    cursor: usize,
    furthest: usize,
    expected: BTreeSet<SyntaxKind>,
}

impl<'a> TokenStream<'a> {
    /// Constructs a stream positioned at the first token.
    #[must_use]
    pub(crate) fn new(tokens: &'a [Token], src: &'a str) -> Self {
        Self {
            tokens,
            src,
            cursor: 0,
            furthest: 0,
            expected: BTreeSet::new(),
        }
    }

    /// Index of the next token to be consumed.
    #[must_use]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub(crate) fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    #[must_use]
    pub(crate) fn src(&self) -> &'a str {
        self.src
    }

    /// The token at the cursor, if any.
    #[must_use]
    pub(crate) fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.cursor)
    }

    /// Kind of the token `n` positions ahead of the cursor.
    #[must_use]
    pub(crate) fn nth_kind(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.cursor + n).map(|t| t.kind)
    }

    #[must_use]
    pub(crate) fn peek_kind(&self) -> Option<SyntaxKind> {
        self.nth_kind(0)
    }

    /// Whether the next token has kind `kind`. Records `kind` as expected when
    /// it does not.
    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        if self.peek_kind() == Some(kind) {
            true
        } else {
            self.expected_here(kind);
            false
        }
    }

    /// Whether the stream is exhausted.
    #[must_use]
    pub(crate) fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Consume and return the next token.
    pub(crate) fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token)
    }

    /// Consume the next token if it has kind `kind`.
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Consume a token of kind `kind`, returning its index.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> Option<usize> {
        let idx = self.cursor;
        self.eat(kind).then_some(idx)
    }

    /// Index of the most recently consumed token.
    #[must_use]
    pub(crate) fn last_index(&self) -> usize {
        self.cursor.saturating_sub(1)
    }

    #[must_use]
    pub(crate) fn mark(&self) -> Mark {
        Mark(self.cursor)
    }

    /// Move the cursor back to `mark`. Expectations recorded since are kept.
    pub(crate) fn rewind(&mut self, mark: Mark) {
        self.cursor = mark.0;
    }

    /// Move the cursor forward to token `idx`.
    pub(crate) fn skip_to(&mut self, idx: usize) {
        self.cursor = idx.clamp(self.cursor, self.tokens.len());
    }

    /// Record that `kind` would have been accepted at the cursor.
    pub(crate) fn expected_here(&mut self, kind: SyntaxKind) {
        if self.cursor > self.furthest {
            self.furthest = self.cursor;
            self.expected.clear();
        }
        if self.cursor == self.furthest {
            self.expected.insert(kind);
        }
    }

    /// Record several acceptable kinds at once.
    pub(crate) fn expected_any(&mut self, kinds: &[SyntaxKind]) {
        for &kind in kinds {
            self.expected_here(kind);
        }
    }

    /// Byte offset of the token at `idx`, or the source length past the end.
    #[must_use]
    pub(crate) fn offset_of(&self, idx: usize) -> usize {
        self.tokens.get(idx).map_or(self.src.len(), Token::start)
    }

    fn kind_at(&self, idx: usize) -> SyntaxKind {
        self.tokens.get(idx).map_or(SyntaxKind::T_EOF, |t| t.kind)
    }

    /// Error describing the furthest failure recorded so far.
    #[must_use]
    pub(crate) fn furthest_error(&self) -> SyntaxError {
        let pos = self.furthest.max(self.cursor);
        let expected = if pos == self.furthest {
            self.expected.clone()
        } else {
            BTreeSet::new()
        };
        SyntaxError::new(self.src, self.offset_of(pos), expected, self.kind_at(pos))
    }

    /// Error located at token `idx` with an explicit expected set.
    #[must_use]
    pub(crate) fn error_at(&self, idx: usize, expected: &[SyntaxKind]) -> SyntaxError {
        SyntaxError::new(
            self.src,
            self.offset_of(idx),
            expected.iter().copied().collect(),
            self.kind_at(idx),
        )
    }
}
