//! Expansion of the `@`-macros into plain JPQL.
//!
//! The parser keeps macros as dedicated nodes. [`Expander::expand`] replaces
//! them with ordinary comparisons against generated named parameters and
//! reports the instants those parameters must be bound to:
//!
//! | macro                         | expansion                                  |
//! |-------------------------------|--------------------------------------------|
//! | `@TODAY(p)`                   | `p >= :gen_1 and p < :gen_2`               |
//! | `@DATEBEFORE(p, NOW+n)`       | `p < :gen_1` (start of day `n`)            |
//! | `@DATEAFTER(p, NOW+n)`        | `p >= :gen_1` (start of day `n + 1`)       |
//! | `@DATEEQUALS(p, NOW+n)`       | `p >= :gen_1 and p < :gen_2`               |
//! | `@DATE*(p, ref)`              | `p < ref`, `p > ref`, `p = ref`            |
//! | `@BETWEEN(p, NOW+a, NOW+b, u)`| `p between :gen_1 and :gen_2`              |
//! | `@ENUM(x.Y)`                  | the resolver's literal, or left in place   |
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use jpqlkit::macros::Expander;
//! use jpqlkit::parse;
//!
//! let now = NaiveDate::from_ymd_opt(2024, 5, 16)
//!     .and_then(|d| d.and_hms_opt(12, 0, 0))
//!     .expect("valid instant");
//! let mut ast = parse("select e from Event e where @today(e.at)").expect("valid query");
//! let expansion = Expander::new(now).expand(&mut ast).expect("expands");
//! assert_eq!(
//!     ast.to_string(),
//!     "select e from Event e where e.at >= :gen_1 and e.at < :gen_2"
//! );
//! assert_eq!(expansion.params.len(), 2);
//! ```

mod dates;
mod enums;

use std::collections::HashSet;

use chrono::NaiveDateTime;
use log::debug;
use thiserror::Error;

pub use enums::{EnumResolution, EnumResolver};

use crate::parser::Ast;
use crate::parser::ast::{
    ComparisonFamily, ComparisonOp, DateComparison, DateUnit, Node, NodeKind, NowOffset,
    ParameterKind,
};

/// Prefix of generated parameter names unless overridden.
pub const DEFAULT_PREFIX: &str = "gen_";

/// Errors raised while expanding macros. The tree is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    #[error("{name} shifted by {offset} leaves the representable date range")]
    DateOutOfRange { name: &'static str, offset: i64 },
    #[error("invalid enum literal {literal:?}")]
    InvalidEnumLiteral { literal: String },
    #[error("{name} expects NOW[+/-n], a parameter or a path, found {found}")]
    InvalidReference {
        name: &'static str,
        found: &'static str,
    },
    #[error("{name} expects a path as its first argument, found {found}")]
    InvalidTarget {
        name: &'static str,
        found: &'static str,
    },
}

/// What an expansion produced besides the rewritten tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Generated parameter names with the instant each must be bound to, in
    /// the order they appear in the query.
    pub params: Vec<(String, NaiveDateTime)>,
    /// `@ENUM` literals the resolver deferred, in query order.
    pub deferred_enums: Vec<String>,
}

impl Expansion {
    /// Instant bound to the generated parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<NaiveDateTime> {
        self.params
            .iter()
            .find_map(|(n, at)| (n == name).then_some(*at))
    }
}

/// Rewrites macro nodes relative to a fixed instant.
pub struct Expander<'r> {
    now: NaiveDateTime,
    prefix: String,
    resolver: Option<Box<dyn EnumResolver + 'r>>,
}

impl<'r> Expander<'r> {
    /// An expander evaluating `NOW` as `now`, without an enum resolver.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            prefix: DEFAULT_PREFIX.to_string(),
            resolver: None,
        }
    }

    /// Use `prefix` instead of [`DEFAULT_PREFIX`] for generated parameters.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Resolve `@ENUM` literals through `resolver`. Without one every enum
    /// literal is deferred.
    #[must_use]
    pub fn with_enum_resolver(mut self, resolver: impl EnumResolver + 'r) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Expand every macro in `ast`, subqueries included.
    ///
    /// # Errors
    /// Returns a [`MacroError`] when a macro argument is malformed or a date
    /// leaves chrono's range. On error `ast` is unchanged.
    pub fn expand(&self, ast: &mut Ast) -> Result<Expansion, MacroError> {
        let mut root = ast.root().clone();
        let mut pass = Pass {
            expander: self,
            names: NameGen::new(&self.prefix, &root),
            expansion: Expansion::default(),
        };
        pass.visit(&mut root)?;
        root.propagate_edits();
        *ast.root_mut() = root;
        Ok(pass.expansion)
    }
}

/// Fresh parameter names that do not clash with the query's own.
struct NameGen {
    prefix: String,
    next: usize,
    used: HashSet<String>,
}

impl NameGen {
    fn new(prefix: &str, root: &Node) -> Self {
        let mut used = HashSet::new();
        root.walk(&mut |node| {
            if let NodeKind::Parameter(param) = node.kind()
                && param.kind == ParameterKind::Named
            {
                used.insert(param.name.clone());
            }
        });
        Self {
            prefix: prefix.to_string(),
            next: 0,
            used,
        }
    }

    fn fresh(&mut self) -> String {
        loop {
            self.next += 1;
            let name = format!("{}{}", self.prefix, self.next);
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }
}

struct Pass<'e, 'r> {
    expander: &'e Expander<'r>,
    names: NameGen,
    expansion: Expansion,
}

impl Pass<'_, '_> {
    fn visit(&mut self, node: &mut Node) -> Result<(), MacroError> {
        for child in node.children_mut() {
            self.visit(child)?;
        }
        let name = node.name();
        let replacement = match node.kind() {
            NodeKind::EnumMacro { literal } => self.enum_literal(literal)?,
            NodeKind::TodayMacro { path } => {
                let target = target(name, path)?;
                let start = self.day_start(name, 0)?;
                let end = self.day_start(name, 1)?;
                Some(self.day_range(target, start, end))
            }
            NodeKind::DateCompareMacro {
                op,
                path,
                reference,
            } => Some(self.date_comparison(name, *op, target(name, path)?, reference)?),
            NodeKind::DateRangeMacro {
                path,
                from,
                to,
                unit,
            } => {
                let target = target(name, path)?;
                let low = self.bound(name, *from, *unit)?;
                let high = self.bound(name, *to, *unit)?;
                Some(Node::new(NodeKind::Between {
                    negated: false,
                    expr: Box::new(target.clone()),
                    low: Box::new(self.bind(low)),
                    high: Box::new(self.bind(high)),
                }))
            }
            _ => None,
        };
        if let Some(replacement) = replacement {
            debug!("expanded {name} into {}", replacement.name());
            *node = replacement;
        }
        Ok(())
    }

    fn enum_literal(&mut self, literal: &str) -> Result<Option<Node>, MacroError> {
        if !enums::is_valid_literal(literal) {
            return Err(MacroError::InvalidEnumLiteral {
                literal: literal.to_string(),
            });
        }
        let resolution = self
            .expander
            .resolver
            .as_ref()
            .map_or(EnumResolution::Deferred, |r| r.resolve(literal));
        Ok(match resolution {
            EnumResolution::Resolved(value) => Some(Node::new(NodeKind::Literal(value))),
            EnumResolution::Deferred => {
                debug!("enum literal {literal} deferred");
                self.expansion.deferred_enums.push(literal.to_string());
                None
            }
        })
    }

    fn date_comparison(
        &mut self,
        name: &'static str,
        op: DateComparison,
        target: &Node,
        reference: &Node,
    ) -> Result<Node, MacroError> {
        match reference.kind() {
            NodeKind::Now(NowOffset(days)) => {
                let day = self.day_start(name, *days)?;
                let next = self.day_start(name, days.saturating_add(1))?;
                Ok(match op {
                    DateComparison::Before => {
                        let param = self.bind(day);
                        comparison(target.clone(), ComparisonOp::Lt, param)
                    }
                    // Later than day n at day granularity.
                    DateComparison::After => {
                        let param = self.bind(next);
                        comparison(target.clone(), ComparisonOp::Gte, param)
                    }
                    DateComparison::Equals => self.day_range(target, day, next),
                })
            }
            NodeKind::Path(_) | NodeKind::Parameter(_) => Ok(comparison(
                target.clone(),
                op.operator(),
                reference.clone(),
            )),
            other => Err(MacroError::InvalidReference {
                name,
                found: other.name(),
            }),
        }
    }

    /// `target >= start and target < end`.
    fn day_range(&mut self, target: &Node, start: NaiveDateTime, end: NaiveDateTime) -> Node {
        let low = self.bind(start);
        let high = self.bind(end);
        Node::new(NodeKind::And(vec![
            comparison(target.clone(), ComparisonOp::Gte, low),
            comparison(target.clone(), ComparisonOp::Lt, high),
        ]))
    }

    fn day_start(&self, name: &'static str, days: i64) -> Result<NaiveDateTime, MacroError> {
        dates::shift(dates::start_of_day(self.expander.now.date()), DateUnit::Day, days)
            .ok_or(MacroError::DateOutOfRange { name, offset: days })
    }

    fn bound(
        &self,
        name: &'static str,
        NowOffset(amount): NowOffset,
        unit: DateUnit,
    ) -> Result<NaiveDateTime, MacroError> {
        dates::truncate(self.expander.now, unit)
            .and_then(|start| dates::shift(start, unit, amount))
            .ok_or(MacroError::DateOutOfRange {
                name,
                offset: amount,
            })
    }

    /// A fresh named parameter bound to `at`.
    fn bind(&mut self, at: NaiveDateTime) -> Node {
        let name = self.names.fresh();
        let node = Node::named_parameter(&name);
        self.expansion.params.push((name, at));
        node
    }
}

fn target<'a>(name: &'static str, path: &'a Node) -> Result<&'a Node, MacroError> {
    match path.kind() {
        NodeKind::Path(_) => Ok(path),
        other => Err(MacroError::InvalidTarget {
            name,
            found: other.name(),
        }),
    }
}

fn comparison(lhs: Node, op: ComparisonOp, rhs: Node) -> Node {
    Node::new(NodeKind::Comparison {
        family: ComparisonFamily::Datetime,
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

#[cfg(test)]
mod tests;
