//! Lexical analysis for JPQL query text.
//!
//! This module exposes `tokenize` and `tokenize_with_trivia`, which convert raw
//! query text into positioned tokens. It uses the `logos` crate to recognise
//! tokens so that the lossless syntax tree can mirror the input exactly.
//! Keywords are matched case-insensitively through a static `phf` map, and
//! built-in function names fused with an immediately following `(` are lexed as
//! single atoms so the parser never has to reason about the whitespace between
//! a function name and its argument list.

use logos::Logos;
use phf::phf_map;

use crate::SyntaxKind;
use crate::parser::LexicalError;

/// Byte range for a token within the source.
pub type Span = std::ops::Range<usize>;

/// A significant token with its text and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token class.
    pub kind: SyntaxKind,
    /// Source text exactly as written.
    pub text: String,
    /// Byte range within the source.
    pub span: Span,
}

impl Token {
    /// Byte offset of the first character.
    #[must_use]
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// Byte offset one past the last character.
    #[must_use]
    pub fn end(&self) -> usize {
        self.span.end
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", priority = 3)]
    #[regex(r"--[^\n]*", priority = 3)]
    Comment,
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
    #[regex(r"0[xX][0-9a-fA-F]+[lL]?")]
    #[regex(r"[0-9]+[lL]?")]
    Integer,
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?[dDfF]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[dDfF]?")]
    #[regex(r"[0-9]+[dDfF]")]
    Decimal,
    #[regex(r"'([^']|'')*'")]
    String,
    #[regex(r"\{(d|t|ts)[ \t]*'[^']*'[ \t]*\}")]
    DateLiteral,
    #[regex(r":[A-Za-z_$][A-Za-z0-9_$.]*")]
    NamedParam,
    #[regex(r"\?[0-9]+")]
    PositionalParam,
    #[regex(r"\$\{[A-Za-z_$][A-Za-z0-9_$.]*\}")]
    ConfigParam,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("<>")]
    #[token("!=")]
    Neq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Lte,
    #[token(">")]
    Gt,
    #[token(">=")]
    Gte,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("abs(", ignore(ascii_case))]
    AbsOpen,
    #[token("avg(", ignore(ascii_case))]
    AvgOpen,
    #[token("cast(", ignore(ascii_case))]
    CastOpen,
    #[token("coalesce(", ignore(ascii_case))]
    CoalesceOpen,
    #[token("concat(", ignore(ascii_case))]
    ConcatOpen,
    #[token("count(", ignore(ascii_case))]
    CountOpen,
    #[token("extract(", ignore(ascii_case))]
    ExtractOpen,
    #[token("index(", ignore(ascii_case))]
    IndexOpen,
    #[token("length(", ignore(ascii_case))]
    LengthOpen,
    #[token("locate(", ignore(ascii_case))]
    LocateOpen,
    #[token("lower(", ignore(ascii_case))]
    LowerOpen,
    #[token("max(", ignore(ascii_case))]
    MaxOpen,
    #[token("min(", ignore(ascii_case))]
    MinOpen,
    #[token("mod(", ignore(ascii_case))]
    ModOpen,
    #[token("nullif(", ignore(ascii_case))]
    NullifOpen,
    #[token("object(", ignore(ascii_case))]
    ObjectOpen,
    #[token("size(", ignore(ascii_case))]
    SizeOpen,
    #[token("sqrt(", ignore(ascii_case))]
    SqrtOpen,
    #[token("substring(", ignore(ascii_case))]
    SubstringOpen,
    #[token("sum(", ignore(ascii_case))]
    SumOpen,
    #[token("trim(", ignore(ascii_case))]
    TrimOpen,
    #[token("type(", ignore(ascii_case))]
    TypeOpen,
    #[token("upper(", ignore(ascii_case))]
    UpperOpen,
    #[token("@between(", ignore(ascii_case))]
    MacroBetween,
    #[token("@dateafter(", ignore(ascii_case))]
    MacroDateAfter,
    #[token("@datebefore(", ignore(ascii_case))]
    MacroDateBefore,
    #[token("@dateequals(", ignore(ascii_case))]
    MacroDateEquals,
    #[token("@enum(", ignore(ascii_case))]
    MacroEnum,
    #[token("@today(", ignore(ascii_case))]
    MacroToday,
}

/// Maps upper-cased identifier strings to their keyword `SyntaxKind`.
///
/// A static map avoids a long match statement and allows O(1) lookups.
static KEYWORDS: phf::Map<&'static str, SyntaxKind> = phf_map! {
    "ALL" => SyntaxKind::K_ALL,
    "AND" => SyntaxKind::K_AND,
    "ANY" => SyntaxKind::K_ANY,
    "AS" => SyntaxKind::K_AS,
    "ASC" => SyntaxKind::K_ASC,
    "BETWEEN" => SyntaxKind::K_BETWEEN,
    "BOTH" => SyntaxKind::K_BOTH,
    "BY" => SyntaxKind::K_BY,
    "CASE" => SyntaxKind::K_CASE,
    "CURRENT_DATE" => SyntaxKind::K_CURRENT_DATE,
    "CURRENT_TIME" => SyntaxKind::K_CURRENT_TIME,
    "CURRENT_TIMESTAMP" => SyntaxKind::K_CURRENT_TIMESTAMP,
    "DAY" => SyntaxKind::K_DAY,
    "DELETE" => SyntaxKind::K_DELETE,
    "DESC" => SyntaxKind::K_DESC,
    "DISTINCT" => SyntaxKind::K_DISTINCT,
    "ELSE" => SyntaxKind::K_ELSE,
    "EMPTY" => SyntaxKind::K_EMPTY,
    "END" => SyntaxKind::K_END,
    "ESCAPE" => SyntaxKind::K_ESCAPE,
    "EXISTS" => SyntaxKind::K_EXISTS,
    "FALSE" => SyntaxKind::K_FALSE,
    "FETCH" => SyntaxKind::K_FETCH,
    "FIRST" => SyntaxKind::K_FIRST,
    "FROM" => SyntaxKind::K_FROM,
    "GROUP" => SyntaxKind::K_GROUP,
    "HAVING" => SyntaxKind::K_HAVING,
    "HOUR" => SyntaxKind::K_HOUR,
    "IN" => SyntaxKind::K_IN,
    "INNER" => SyntaxKind::K_INNER,
    "IS" => SyntaxKind::K_IS,
    "JOIN" => SyntaxKind::K_JOIN,
    "LAST" => SyntaxKind::K_LAST,
    "LEADING" => SyntaxKind::K_LEADING,
    "LEFT" => SyntaxKind::K_LEFT,
    "LIKE" => SyntaxKind::K_LIKE,
    "MEMBER" => SyntaxKind::K_MEMBER,
    "MINUTE" => SyntaxKind::K_MINUTE,
    "MONTH" => SyntaxKind::K_MONTH,
    "NEW" => SyntaxKind::K_NEW,
    "NOT" => SyntaxKind::K_NOT,
    "NOW" => SyntaxKind::K_NOW,
    "NULL" => SyntaxKind::K_NULL,
    "NULLS" => SyntaxKind::K_NULLS,
    "OF" => SyntaxKind::K_OF,
    "ON" => SyntaxKind::K_ON,
    "OR" => SyntaxKind::K_OR,
    "ORDER" => SyntaxKind::K_ORDER,
    "OUTER" => SyntaxKind::K_OUTER,
    "SECOND" => SyntaxKind::K_SECOND,
    "SELECT" => SyntaxKind::K_SELECT,
    "SET" => SyntaxKind::K_SET,
    "SOME" => SyntaxKind::K_SOME,
    "THEN" => SyntaxKind::K_THEN,
    "TRAILING" => SyntaxKind::K_TRAILING,
    "TRUE" => SyntaxKind::K_TRUE,
    "UPDATE" => SyntaxKind::K_UPDATE,
    "WEEK" => SyntaxKind::K_WEEK,
    "WHEN" => SyntaxKind::K_WHEN,
    "WHERE" => SyntaxKind::K_WHERE,
    "YEAR" => SyntaxKind::K_YEAR,
};

/// Canonical spelling of the fused openers, used by diagnostics.
const OPENER_TEXT: &[(SyntaxKind, &str)] = &[
    (SyntaxKind::T_ABS_OPEN, "ABS("),
    (SyntaxKind::T_AVG_OPEN, "AVG("),
    (SyntaxKind::T_CAST_OPEN, "CAST("),
    (SyntaxKind::T_COALESCE_OPEN, "COALESCE("),
    (SyntaxKind::T_CONCAT_OPEN, "CONCAT("),
    (SyntaxKind::T_COUNT_OPEN, "COUNT("),
    (SyntaxKind::T_EXTRACT_OPEN, "EXTRACT("),
    (SyntaxKind::T_INDEX_OPEN, "INDEX("),
    (SyntaxKind::T_LENGTH_OPEN, "LENGTH("),
    (SyntaxKind::T_LOCATE_OPEN, "LOCATE("),
    (SyntaxKind::T_LOWER_OPEN, "LOWER("),
    (SyntaxKind::T_MAX_OPEN, "MAX("),
    (SyntaxKind::T_MIN_OPEN, "MIN("),
    (SyntaxKind::T_MOD_OPEN, "MOD("),
    (SyntaxKind::T_NULLIF_OPEN, "NULLIF("),
    (SyntaxKind::T_OBJECT_OPEN, "OBJECT("),
    (SyntaxKind::T_SIZE_OPEN, "SIZE("),
    (SyntaxKind::T_SQRT_OPEN, "SQRT("),
    (SyntaxKind::T_SUBSTRING_OPEN, "SUBSTRING("),
    (SyntaxKind::T_SUM_OPEN, "SUM("),
    (SyntaxKind::T_TRIM_OPEN, "TRIM("),
    (SyntaxKind::T_TYPE_OPEN, "TYPE("),
    (SyntaxKind::T_UPPER_OPEN, "UPPER("),
    (SyntaxKind::T_MACRO_BETWEEN, "@BETWEEN("),
    (SyntaxKind::T_MACRO_DATE_AFTER, "@DATEAFTER("),
    (SyntaxKind::T_MACRO_DATE_BEFORE, "@DATEBEFORE("),
    (SyntaxKind::T_MACRO_DATE_EQUALS, "@DATEEQUALS("),
    (SyntaxKind::T_MACRO_ENUM, "@ENUM("),
    (SyntaxKind::T_MACRO_TODAY, "@TODAY("),
];

/// Returns the keyword kind for `ident`, ignoring ASCII case.
#[must_use]
pub fn keyword_kind(ident: &str) -> Option<SyntaxKind> {
    KEYWORDS.get(ident.to_ascii_uppercase().as_str()).copied()
}

/// Upper-case spelling of a keyword or fused opener.
pub(crate) fn fixed_text(kind: SyntaxKind) -> Option<&'static str> {
    if kind.is_keyword() {
        return KEYWORDS
            .entries()
            .find_map(|(text, k)| (*k == kind).then_some(*text));
    }
    OPENER_TEXT
        .iter()
        .find_map(|(k, text)| (*k == kind).then_some(*text))
}

fn classify(token: RawToken, text: &str) -> SyntaxKind {
    match token {
        RawToken::Whitespace => SyntaxKind::T_WHITESPACE,
        RawToken::Comment => SyntaxKind::T_COMMENT,
        RawToken::Ident => keyword_kind(text).unwrap_or(SyntaxKind::T_IDENT),
        RawToken::Integer => SyntaxKind::T_INTEGER,
        RawToken::Decimal => SyntaxKind::T_DECIMAL,
        RawToken::String => SyntaxKind::T_STRING,
        RawToken::DateLiteral => SyntaxKind::T_DATE_LITERAL,
        RawToken::NamedParam => SyntaxKind::T_NAMED_PARAM,
        RawToken::PositionalParam => SyntaxKind::T_POSITIONAL_PARAM,
        RawToken::ConfigParam => SyntaxKind::T_CONFIG_PARAM,
        RawToken::LParen => SyntaxKind::T_LPAREN,
        RawToken::RParen => SyntaxKind::T_RPAREN,
        RawToken::Comma => SyntaxKind::T_COMMA,
        RawToken::Dot => SyntaxKind::T_DOT,
        RawToken::Eq => SyntaxKind::T_EQ,
        RawToken::Neq => SyntaxKind::T_NEQ,
        RawToken::Lt => SyntaxKind::T_LT,
        RawToken::Lte => SyntaxKind::T_LTE,
        RawToken::Gt => SyntaxKind::T_GT,
        RawToken::Gte => SyntaxKind::T_GTE,
        RawToken::Plus => SyntaxKind::T_PLUS,
        RawToken::Minus => SyntaxKind::T_MINUS,
        RawToken::Star => SyntaxKind::T_STAR,
        RawToken::Slash => SyntaxKind::T_SLASH,
        RawToken::AbsOpen => SyntaxKind::T_ABS_OPEN,
        RawToken::AvgOpen => SyntaxKind::T_AVG_OPEN,
        RawToken::CastOpen => SyntaxKind::T_CAST_OPEN,
        RawToken::CoalesceOpen => SyntaxKind::T_COALESCE_OPEN,
        RawToken::ConcatOpen => SyntaxKind::T_CONCAT_OPEN,
        RawToken::CountOpen => SyntaxKind::T_COUNT_OPEN,
        RawToken::ExtractOpen => SyntaxKind::T_EXTRACT_OPEN,
        RawToken::IndexOpen => SyntaxKind::T_INDEX_OPEN,
        RawToken::LengthOpen => SyntaxKind::T_LENGTH_OPEN,
        RawToken::LocateOpen => SyntaxKind::T_LOCATE_OPEN,
        RawToken::LowerOpen => SyntaxKind::T_LOWER_OPEN,
        RawToken::MaxOpen => SyntaxKind::T_MAX_OPEN,
        RawToken::MinOpen => SyntaxKind::T_MIN_OPEN,
        RawToken::ModOpen => SyntaxKind::T_MOD_OPEN,
        RawToken::NullifOpen => SyntaxKind::T_NULLIF_OPEN,
        RawToken::ObjectOpen => SyntaxKind::T_OBJECT_OPEN,
        RawToken::SizeOpen => SyntaxKind::T_SIZE_OPEN,
        RawToken::SqrtOpen => SyntaxKind::T_SQRT_OPEN,
        RawToken::SubstringOpen => SyntaxKind::T_SUBSTRING_OPEN,
        RawToken::SumOpen => SyntaxKind::T_SUM_OPEN,
        RawToken::TrimOpen => SyntaxKind::T_TRIM_OPEN,
        RawToken::TypeOpen => SyntaxKind::T_TYPE_OPEN,
        RawToken::UpperOpen => SyntaxKind::T_UPPER_OPEN,
        RawToken::MacroBetween => SyntaxKind::T_MACRO_BETWEEN,
        RawToken::MacroDateAfter => SyntaxKind::T_MACRO_DATE_AFTER,
        RawToken::MacroDateBefore => SyntaxKind::T_MACRO_DATE_BEFORE,
        RawToken::MacroDateEquals => SyntaxKind::T_MACRO_DATE_EQUALS,
        RawToken::MacroEnum => SyntaxKind::T_MACRO_ENUM,
        RawToken::MacroToday => SyntaxKind::T_MACRO_TODAY,
    }
}

#[must_use]
fn tokenize_impl(src: &str) -> Vec<(SyntaxKind, Span)> {
    let mut lexer = RawToken::lexer(src);
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "rough capacity estimate"
    )]
    let estimated_tokens = src.len() / 4; // roughly four chars per token
    let mut out = Vec::with_capacity(estimated_tokens);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let Ok(token) = result else {
            out.push((SyntaxKind::N_ERROR, span));
            continue;
        };
        let text = lexer.slice();
        out.push((classify(token, text), span));
    }
    out
}

/// Tokenise the provided query text, retaining whitespace and comments.
///
/// Unrecognised input is reported in-band as `N_ERROR` tokens so the lossless
/// syntax tree can still cover every byte.
///
/// # Examples
///
/// ```rust
/// use jpqlkit::{tokenize_with_trivia, SyntaxKind};
///
/// let tokens = tokenize_with_trivia("select e from Foo e");
/// assert_eq!(tokens.len(), 9);
/// assert_eq!(tokens[0].0, SyntaxKind::K_SELECT);
/// ```
#[must_use]
pub fn tokenize_with_trivia(src: &str) -> Vec<(SyntaxKind, Span)> {
    tokenize_impl(src)
}

/// Tokenise the query text into significant tokens.
///
/// Whitespace and comments are dropped. Lexing is total or it fails: the first
/// unrecognised character aborts the call.
///
/// # Errors
/// Returns [`LexicalError`] carrying the byte offset and the offending
/// character when the input contains text no token class recognises.
///
/// # Examples
///
/// ```rust
/// use jpqlkit::{tokenize, SyntaxKind};
///
/// let tokens = tokenize("where locate('a', e.name) > 0").unwrap();
/// assert_eq!(tokens[1].kind, SyntaxKind::T_LOCATE_OPEN);
/// assert!(tokenize("select # from").is_err());
/// ```
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexicalError> {
    let mut out = Vec::new();
    for (kind, span) in tokenize_impl(src) {
        if kind.is_trivia() {
            continue;
        }
        let text = src.get(span.clone()).unwrap_or_default();
        if kind == SyntaxKind::N_ERROR {
            return Err(LexicalError {
                offset: span.start,
                character: text.chars().next().unwrap_or('\0'),
            });
        }
        out.push(Token {
            kind,
            text: text.to_string(),
            span,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(src: &str) -> Vec<SyntaxKind> {
        tokenize(src)
            .unwrap_or_else(|e| panic!("lexing failed: {e}"))
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[rstest]
    #[case("SELECT", SyntaxKind::K_SELECT)]
    #[case("select", SyntaxKind::K_SELECT)]
    #[case("SeLeCt", SyntaxKind::K_SELECT)]
    #[case("sample$Entity", SyntaxKind::T_IDENT)]
    #[case("'it''s'", SyntaxKind::T_STRING)]
    #[case("42", SyntaxKind::T_INTEGER)]
    #[case("0x1F", SyntaxKind::T_INTEGER)]
    #[case("10L", SyntaxKind::T_INTEGER)]
    #[case("3.25", SyntaxKind::T_DECIMAL)]
    #[case("1e10", SyntaxKind::T_DECIMAL)]
    #[case(":name", SyntaxKind::T_NAMED_PARAM)]
    #[case(":session.userId", SyntaxKind::T_NAMED_PARAM)]
    #[case("?1", SyntaxKind::T_POSITIONAL_PARAM)]
    #[case("${tenant.id}", SyntaxKind::T_CONFIG_PARAM)]
    #[case("{d '2020-01-31'}", SyntaxKind::T_DATE_LITERAL)]
    #[case("<>", SyntaxKind::T_NEQ)]
    #[case("!=", SyntaxKind::T_NEQ)]
    #[case("<=", SyntaxKind::T_LTE)]
    #[case(">=", SyntaxKind::T_GTE)]
    fn single_tokens(#[case] source: &str, #[case] expected: SyntaxKind) {
        assert_eq!(kinds(source), vec![expected]);
    }

    #[rstest]
    #[case("count(", SyntaxKind::T_COUNT_OPEN)]
    #[case("COUNT(", SyntaxKind::T_COUNT_OPEN)]
    #[case("Locate(", SyntaxKind::T_LOCATE_OPEN)]
    #[case("@enum(", SyntaxKind::T_MACRO_ENUM)]
    #[case("@TODAY(", SyntaxKind::T_MACRO_TODAY)]
    #[case("@dateBefore(", SyntaxKind::T_MACRO_DATE_BEFORE)]
    fn fused_openers(#[case] source: &str, #[case] expected: SyntaxKind) {
        assert_eq!(kinds(source), vec![expected]);
    }

    #[test]
    fn separated_function_name_is_an_identifier() {
        assert_eq!(
            kinds("count (e)"),
            vec![
                SyntaxKind::T_IDENT,
                SyntaxKind::T_LPAREN,
                SyntaxKind::T_IDENT,
                SyntaxKind::T_RPAREN
            ]
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(
            kinds("select /* all */ e -- trailing\nfrom"),
            vec![SyntaxKind::K_SELECT, SyntaxKind::T_IDENT, SyntaxKind::K_FROM]
        );
    }

    #[test]
    fn trivia_is_kept_on_request() {
        let tokens = tokenize_with_trivia("a /* b */ c");
        assert_eq!(tokens.len(), 5);
        assert!(tokens.iter().any(|(k, _)| *k == SyntaxKind::T_COMMENT));
    }

    #[test]
    fn spans_cover_token_text() {
        let src = "select e.name from Foo e";
        let Ok(tokens) = tokenize(src) else {
            panic!("lexing failed");
        };
        for token in tokens {
            assert_eq!(src.get(token.span.clone()), Some(token.text.as_str()));
        }
    }

    #[rstest]
    #[case("select # from", 7, '#')]
    #[case("where e.a = ~1", 12, '~')]
    #[case("@unknown(x)", 0, '@')]
    fn unrecognised_character_fails(
        #[case] source: &str,
        #[case] offset: usize,
        #[case] character: char,
    ) {
        let Err(err) = tokenize(source) else {
            panic!("expected a lexical error");
        };
        assert_eq!(err, LexicalError { offset, character });
    }

    #[test]
    fn keyword_lookup_ignores_case() {
        assert_eq!(keyword_kind("Where"), Some(SyntaxKind::K_WHERE));
        assert_eq!(keyword_kind("entity"), None);
    }
}
