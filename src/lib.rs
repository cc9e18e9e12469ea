//! Library crate for jpqlkit.
//!
//! A lossless front-end for JPQL with `@`-macro extensions: tokenizer,
//! backtracking parser, typed AST, macro expansion, structural rewriting and
//! a printer that keeps untouched source text.

#![forbid(unsafe_code)]

pub mod cst;
pub mod language;
pub mod macros;
pub mod parser;
pub mod printer;
pub mod rewrite;
pub mod tokenizer;

// Only expose test utilities to tests and opt-in consumers.
#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_util;

pub use language::{JpqlLanguage, SyntaxKind, SyntaxNode};
pub use macros::{EnumResolution, EnumResolver, Expander, Expansion, MacroError};
pub use parser::{
    Ast, ParseError, ParseOptions, Predicate, ast, parse, parse_predicate, parse_tokens,
    parse_with_options,
};
pub use printer::{Printer, print};
pub use rewrite::{ReferenceKind, RewriteError};
pub use tokenizer::{Span, Token, tokenize, tokenize_with_trivia};
