//! Hook for resolving `@ENUM` literals against an external registry.

use crate::parser::ast::Literal;

/// Outcome of looking up an enum literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumResolution {
    /// The stored value the literal maps to.
    Resolved(Literal),
    /// The registry does not know the literal yet; the macro is kept and the
    /// literal reported in [`Expansion::deferred_enums`](super::Expansion).
    Deferred,
}

/// Resolves dotted enum literals such as `com.acme.Status.ACTIVE`.
///
/// Implemented for closures returning `Option<Literal>`, where `None` defers
/// the literal.
pub trait EnumResolver {
    fn resolve(&self, literal: &str) -> EnumResolution;
}

impl<F> EnumResolver for F
where
    F: Fn(&str) -> Option<Literal>,
{
    fn resolve(&self, literal: &str) -> EnumResolution {
        self(literal).map_or(EnumResolution::Deferred, EnumResolution::Resolved)
    }
}

/// Whether `literal` is at least two identifier segments joined by dots.
pub(crate) fn is_valid_literal(literal: &str) -> bool {
    let mut segments = 0;
    for segment in literal.split('.') {
        let mut chars = segment.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
        if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return false;
        }
        segments += 1;
    }
    segments >= 2
}
