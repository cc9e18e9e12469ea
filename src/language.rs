//! `rowan` integration and JPQL syntax kinds.
//!
//! This module defines the `SyntaxKind` enum covering all tokens and the
//! clause-level nodes of the lossless syntax tree. The enumeration doubles as
//! the token-kind vocabulary of the parser and of its error reports. The
//! `JpqlLanguage` newtype implements `rowan::Language` using conversions
//! provided by `num_derive`.

use std::fmt;

use num_derive::{FromPrimitive as FromPrimitiveDerive, ToPrimitive as ToPrimitiveDerive};
use num_traits::{FromPrimitive, ToPrimitive};
use rowan::Language as RowanLanguage;
use rowan::SyntaxKind as RowanSyntaxKind;

/// Every possible token or node in the JPQL syntax tree.
///
/// Keywords (`K_*`) form one contiguous block, as do the fused
/// keyword-plus-parenthesis openers (`T_*_OPEN`, `T_MACRO_*`). The range
/// checks in [`SyntaxKind::is_keyword`] and [`SyntaxKind::is_call_opener`]
/// rely on that ordering.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitiveDerive, ToPrimitiveDerive,
)]
#[repr(u16)]
#[expect(non_camel_case_types, reason = "token naming follows the kind prefixes")]
pub enum SyntaxKind {
    // Trivia
    T_WHITESPACE,
    T_COMMENT,
    // Tokens
    T_IDENT,
    T_STRING,
    T_INTEGER,
    T_DECIMAL,
    T_DATE_LITERAL,
    T_NAMED_PARAM,
    T_POSITIONAL_PARAM,
    T_CONFIG_PARAM,
    T_LPAREN,
    T_RPAREN,
    T_COMMA,
    T_DOT,
    T_EQ,
    T_NEQ,
    T_LT,
    T_LTE,
    T_GT,
    T_GTE,
    T_PLUS,
    T_MINUS,
    T_STAR,
    T_SLASH,
    // Keywords
    K_ALL,
    K_AND,
    K_ANY,
    K_AS,
    K_ASC,
    K_BETWEEN,
    K_BOTH,
    K_BY,
    K_CASE,
    K_CURRENT_DATE,
    K_CURRENT_TIME,
    K_CURRENT_TIMESTAMP,
    K_DAY,
    K_DELETE,
    K_DESC,
    K_DISTINCT,
    K_ELSE,
    K_EMPTY,
    K_END,
    K_ESCAPE,
    K_EXISTS,
    K_FALSE,
    K_FETCH,
    K_FIRST,
    K_FROM,
    K_GROUP,
    K_HAVING,
    K_HOUR,
    K_IN,
    K_INNER,
    K_IS,
    K_JOIN,
    K_LAST,
    K_LEADING,
    K_LEFT,
    K_LIKE,
    K_MEMBER,
    K_MINUTE,
    K_MONTH,
    K_NEW,
    K_NOT,
    K_NOW,
    K_NULL,
    K_NULLS,
    K_OF,
    K_ON,
    K_OR,
    K_ORDER,
    K_OUTER,
    K_SECOND,
    K_SELECT,
    K_SET,
    K_SOME,
    K_THEN,
    K_TRAILING,
    K_TRUE,
    K_UPDATE,
    K_WEEK,
    K_WHEN,
    K_WHERE,
    K_YEAR,
    // Fused call openers: a function keyword immediately followed by `(`.
    T_ABS_OPEN,
    T_AVG_OPEN,
    T_CAST_OPEN,
    T_COALESCE_OPEN,
    T_CONCAT_OPEN,
    T_COUNT_OPEN,
    T_EXTRACT_OPEN,
    T_INDEX_OPEN,
    T_LENGTH_OPEN,
    T_LOCATE_OPEN,
    T_LOWER_OPEN,
    T_MAX_OPEN,
    T_MIN_OPEN,
    T_MOD_OPEN,
    T_NULLIF_OPEN,
    T_OBJECT_OPEN,
    T_SIZE_OPEN,
    T_SQRT_OPEN,
    T_SUBSTRING_OPEN,
    T_SUM_OPEN,
    T_TRIM_OPEN,
    T_TYPE_OPEN,
    T_UPPER_OPEN,
    // Macro openers.
    T_MACRO_BETWEEN,
    T_MACRO_DATE_AFTER,
    T_MACRO_DATE_BEFORE,
    T_MACRO_DATE_EQUALS,
    T_MACRO_ENUM,
    T_MACRO_TODAY,
    // End of input, used in diagnostics only.
    T_EOF,
    // Nodes
    N_SELECT_CLAUSE,
    N_FROM_CLAUSE,
    N_UPDATE_CLAUSE,
    N_SET_CLAUSE,
    N_WHERE_CLAUSE,
    N_GROUP_BY_CLAUSE,
    N_HAVING_CLAUSE,
    N_ORDER_BY_CLAUSE,
    N_QUERY,
    // Special
    N_ERROR,
}

impl SyntaxKind {
    /// Whether this kind is whitespace or a comment.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::T_WHITESPACE | Self::T_COMMENT)
    }

    /// Whether this kind is one of the reserved or contextual keywords.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        (Self::K_ALL..=Self::K_YEAR).contains(&self)
    }

    /// Whether this kind is a fused `name(` opener, macros included.
    #[must_use]
    pub fn is_call_opener(self) -> bool {
        (Self::T_ABS_OPEN..=Self::T_MACRO_TODAY).contains(&self)
    }

    /// Whether this kind is one of the macro openers.
    #[must_use]
    pub fn is_macro_opener(self) -> bool {
        (Self::T_MACRO_BETWEEN..=Self::T_MACRO_TODAY).contains(&self)
    }

    /// Whether this kind can appear as a path segment after a `.`.
    ///
    /// Any identifier-like word is accepted there, reserved or not.
    #[must_use]
    pub fn is_word(self) -> bool {
        self == Self::T_IDENT || self.is_keyword()
    }

    /// Human readable name used by diagnostics.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::T_WHITESPACE => "WHITESPACE",
            Self::T_COMMENT => "COMMENT",
            Self::T_IDENT => "IDENTIFIER",
            Self::T_STRING => "STRING",
            Self::T_INTEGER => "INTEGER",
            Self::T_DECIMAL => "DECIMAL",
            Self::T_DATE_LITERAL => "DATE_LITERAL",
            Self::T_NAMED_PARAM => "NAMED_PARAMETER",
            Self::T_POSITIONAL_PARAM => "POSITIONAL_PARAMETER",
            Self::T_CONFIG_PARAM => "CONFIG_PARAMETER",
            Self::T_LPAREN => "'('",
            Self::T_RPAREN => "')'",
            Self::T_COMMA => "','",
            Self::T_DOT => "'.'",
            Self::T_EQ => "'='",
            Self::T_NEQ => "'<>'",
            Self::T_LT => "'<'",
            Self::T_LTE => "'<='",
            Self::T_GT => "'>'",
            Self::T_GTE => "'>='",
            Self::T_PLUS => "'+'",
            Self::T_MINUS => "'-'",
            Self::T_STAR => "'*'",
            Self::T_SLASH => "'/'",
            Self::T_EOF => "EOF",
            Self::N_ERROR => "ERROR",
            other => crate::tokenizer::fixed_text(other).unwrap_or("NODE"),
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Newtype wrapper allowing `rowan` to store `SyntaxKind` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JpqlLanguage;

impl RowanLanguage for JpqlLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: RowanSyntaxKind) -> Self::Kind {
        SyntaxKind::from_u16(raw.0).unwrap_or(SyntaxKind::N_ERROR)
    }

    fn kind_to_raw(kind: Self::Kind) -> RowanSyntaxKind {
        RowanSyntaxKind(
            kind.to_u16()
                .unwrap_or_else(|| unreachable!("all SyntaxKind variants map to u16")),
        )
    }
}

/// Lossless syntax node over the original query text.
pub type SyntaxNode = rowan::SyntaxNode<JpqlLanguage>;
