//! Pratt parser for JPQL scalar expressions.
//!
//! The implementation is split across submodules: [`pratt`] hosts the entry
//! points, [`prefix`] handles literals, paths, parameters and other primaries,
//! [`infix`] folds arithmetic operators, and [`functions`] parses the built-in
//! function calls introduced by fused `name(` tokens.

mod functions;
mod infix;
mod pratt;
mod prefix;

pub(crate) use infix::binding_power;
