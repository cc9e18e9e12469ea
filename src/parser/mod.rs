//! Backtracking JPQL parser producing a typed AST.
//!
//! This module contains the entry points for parsing query text. Input is
//! tokenised, trivia is dropped and the significant tokens are handed to a
//! recursive-descent [`grammar::Parser`] with one method per production.
//! Ambiguous alternatives are tried in grammar order with mark/rewind; when
//! every alternative fails the furthest failure is reported together with the
//! token kinds that would have been accepted there.

pub mod ast;
mod condition;
mod error;
mod expression;
mod grammar;
mod macro_call;
mod statement;
mod token_stream;

use std::cmp::Ordering;
use std::iter;

pub use error::{LexicalError, MacroSyntaxError, ParseError, SyntaxError};
pub(crate) use expression::binding_power;

use ast::{Node, NodeKind, Query};
use grammar::Parser;
use token_stream::TokenStream;

use crate::tokenizer::{Token, tokenize};

/// Default limit for [`ParseOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Knobs accepted by [`parse_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    macros: bool,
    max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            macros: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Accept or reject the `@ENUM`, `@TODAY`, `@DATE*` and `@BETWEEN`
    /// macros. With macros disabled an opener is a syntax error.
    #[must_use]
    pub fn with_macros(mut self, enabled: bool) -> Self {
        self.macros = enabled;
        self
    }

    /// Limit how deeply expressions, conditions and subqueries may nest.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn macros(&self) -> bool {
        self.macros
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// A parsed statement together with the text and tokens it was built from.
///
/// The root is always a [`NodeKind::Query`]. Node spans index into
/// [`Ast::tokens`].
#[derive(Debug, Clone)]
pub struct Ast {
    src: String,
    tokens: Vec<Token>,
    root: Node,
}

impl Ast {
    /// The original query text.
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Significant tokens of the original text.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The root `Query` node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// The statement payload of the root node.
    #[must_use]
    pub fn query(&self) -> &Query {
        match &self.root.kind {
            NodeKind::Query(query) => query,
            _ => unreachable!("ast root is always a query"),
        }
    }

    pub(crate) fn query_mut(&mut self) -> &mut Query {
        match &mut self.root.kind {
            NodeKind::Query(query) => query,
            _ => unreachable!("ast root is always a query"),
        }
    }
}

/// A standalone conditional expression, as accepted after `WHERE`.
///
/// Produced by [`parse_predicate`] and consumed by the rewriting API, which
/// grafts it into a query.
#[derive(Debug, Clone)]
pub struct Predicate {
    src: String,
    root: Node,
}

impl Predicate {
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// The condition node; its spans index the predicate's own tokens.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.root
    }
}

impl From<Predicate> for Node {
    /// Detach the condition from its source text.
    fn from(predicate: Predicate) -> Self {
        let mut root = predicate.root;
        root.forget_spans();
        root
    }
}

/// Parse a SELECT, UPDATE or DELETE statement.
///
/// # Errors
/// Returns a [`ParseError`] when the text does not lex or no grammar
/// alternative accepts it.
///
/// # Examples
///
/// ```
/// use jpqlkit::parse;
///
/// let ast = parse("select e from Employee e where e.name = :name").expect("valid query");
/// assert_eq!(ast.query().bound_variables(), vec!["e"]);
/// ```
pub fn parse(src: &str) -> Result<Ast, ParseError> {
    parse_with_options(src, ParseOptions::default())
}

/// [`parse`] with explicit [`ParseOptions`].
///
/// # Errors
/// See [`parse`].
pub fn parse_with_options(src: &str, options: ParseOptions) -> Result<Ast, ParseError> {
    let tokens = tokenize(src)?;
    build(src.to_string(), tokens, options)
}

/// Parse an already tokenised statement.
///
/// Trivia tokens are ignored. The query text is reassembled from the token
/// texts, keeping their offsets where they are consistent and separating
/// tokens with one space otherwise.
///
/// # Errors
/// Returns [`ParseError::Syntax`] when no grammar alternative accepts the
/// tokens.
pub fn parse_tokens(tokens: &[Token]) -> Result<Ast, ParseError> {
    let (src, tokens) = reassemble(tokens);
    build(src, tokens, ParseOptions::default())
}

/// Parse a standalone conditional expression.
///
/// # Errors
/// See [`parse`].
///
/// # Examples
///
/// ```
/// use jpqlkit::parse_predicate;
///
/// let predicate = parse_predicate("e.active = true and e.age > 18").expect("valid predicate");
/// assert!(predicate.node().is_condition());
/// ```
pub fn parse_predicate(src: &str) -> Result<Predicate, ParseError> {
    let root = parse_condition_with(src, ParseOptions::default())?;
    Ok(Predicate {
        src: src.to_string(),
        root,
    })
}

fn build(src: String, tokens: Vec<Token>, options: ParseOptions) -> Result<Ast, ParseError> {
    let root = Parser::new(TokenStream::new(&tokens, &src), options).run(Parser::statement)?;
    Ok(Ast { src, tokens, root })
}

fn reassemble(tokens: &[Token]) -> (String, Vec<Token>) {
    let mut src = String::new();
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens.iter().filter(|t| !t.kind.is_trivia()) {
        match token.start().cmp(&src.len()) {
            Ordering::Greater => src.extend(iter::repeat_n(' ', token.start() - src.len())),
            Ordering::Less => src.push(' '),
            Ordering::Equal => {}
        }
        let start = src.len();
        src.push_str(&token.text);
        out.push(Token {
            kind: token.kind,
            text: token.text.clone(),
            span: start..src.len(),
        });
    }
    (src, out)
}

pub(crate) fn parse_condition_with(src: &str, options: ParseOptions) -> Result<Node, ParseError> {
    let tokens = tokenize(src)?;
    Parser::new(TokenStream::new(&tokens, src), options).run(Parser::condition)
}

#[cfg(test)]
pub(crate) fn parse_scalar_with(src: &str, options: ParseOptions) -> Result<Node, ParseError> {
    let tokens = tokenize(src)?;
    Parser::new(TokenStream::new(&tokens, src), options).run(Parser::scalar)
}

#[cfg(test)]
mod tests;
