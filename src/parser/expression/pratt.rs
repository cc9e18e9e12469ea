//! Core Pratt loop over the shared [`Parser`].

use crate::parser::ast::Node;
use crate::parser::grammar::Parser;

impl Parser<'_> {
    /// Parse a full scalar (arithmetic, string, datetime...) expression.
    pub(crate) fn scalar(&mut self) -> Option<Node> {
        self.scalar_bp(0)
    }

    /// Parse a scalar expression whose infix operators bind at least as
    /// tightly as `min_bp`.
    pub(crate) fn scalar_bp(&mut self, min_bp: u8) -> Option<Node> {
        self.nested(|p| {
            let lhs = p.prefix()?;
            p.infix(lhs, min_bp)
        })
    }
}
