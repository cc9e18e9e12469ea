//! Structural edits on a parsed statement.
//!
//! Each operation validates its inputs before touching the tree, so a call
//! that returns an error leaves the [`Ast`] exactly as it was. Edited nodes
//! lose their spans and the printer renders them from templates; every
//! untouched subtree keeps its original spelling.

use std::collections::HashSet;

use log::debug;
use thiserror::Error;

use crate::parser::Ast;
use crate::parser::ast::{Node, NodeKind, Query, QueryKind};
use crate::tokenizer::keyword_kind;

/// Failures of the rewriting API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("no query scope binds identification variable `{alias}`")]
    AliasNotFound { alias: String },
    #[error("identification variable `{alias}` is already bound")]
    AliasCollisionUnresolvable { alias: String },
    #[error("expected {expected}, found {found}")]
    NodeKindMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("`{name}` cannot be used as an identification variable")]
    InvalidIdentifier { name: String },
}

/// What [`Ast::list_referenced`] collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Entity names in range declarations and entity joins.
    Entities,
    /// Bound identification variables.
    Variables,
    /// Navigation paths such as `e.dept.name`.
    Paths,
    /// Parameters in their source spelling (`:name`, `?1`, `${key}`).
    Parameters,
}

impl Ast {
    /// AND `predicate` into the WHERE clause of the query scope that binds
    /// `alias`, creating the clause if needed.
    ///
    /// The outer query is searched first, then subqueries in source order.
    /// An existing condition `c` becomes `(c) and (predicate)`.
    ///
    /// # Errors
    /// [`RewriteError::AliasNotFound`] when no scope binds `alias`,
    /// [`RewriteError::NodeKindMismatch`] when `predicate` is not a
    /// condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use jpqlkit::{parse, parse_predicate};
    ///
    /// let mut ast = parse("select e from Employee e where e.a = 1 or e.b = 2").expect("valid query");
    /// let filter = parse_predicate("e.tenant = :tenant").expect("valid predicate");
    /// ast.add_where_predicate("e", filter).expect("alias is bound");
    /// assert_eq!(
    ///     ast.to_string(),
    ///     "select e from Employee e where (e.a = 1 or e.b = 2) and (e.tenant = :tenant)"
    /// );
    /// ```
    pub fn add_where_predicate(
        &mut self,
        alias: &str,
        predicate: impl Into<Node>,
    ) -> Result<(), RewriteError> {
        let predicate = as_condition(predicate.into())?;
        let Some(NodeKind::Query(query)) =
            scope_mut(self.root_mut(), alias).map(|node| &mut node.kind)
        else {
            return Err(RewriteError::AliasNotFound {
                alias: alias.to_string(),
            });
        };
        and_into_where(query, predicate);
        self.root_mut().propagate_edits();
        debug!("added predicate for `{alias}`");
        Ok(())
    }

    /// Replace the outer WHERE condition, or drop the clause with `None`.
    /// Returns the previous condition.
    ///
    /// # Errors
    /// [`RewriteError::NodeKindMismatch`] when the new node is not a
    /// condition.
    pub fn replace_where(&mut self, condition: Option<Node>) -> Result<Option<Node>, RewriteError> {
        let clause = condition
            .map(as_condition)
            .transpose()?
            .map(|c| Box::new(Node::new(NodeKind::Where(Box::new(c)))));
        let query = self.query_mut();
        let previous = std::mem::replace(&mut query.where_clause, clause);
        self.root_mut().touch();
        self.root_mut().propagate_edits();
        Ok(previous.and_then(|clause| match clause.kind {
            NodeKind::Where(cond) => Some(*cond),
            _ => None,
        }))
    }

    /// Rename the identification variable `old` and every reference to it.
    ///
    /// References in subqueries are renamed too, unless the subquery declares
    /// its own `old`.
    ///
    /// # Errors
    /// [`RewriteError::AliasNotFound`] when `old` is unbound,
    /// [`RewriteError::AliasCollisionUnresolvable`] when `new` is already
    /// bound in the affected scope or one of its subqueries, or when the
    /// scope refers to an enclosing variable named `new`,
    /// [`RewriteError::InvalidIdentifier`] when `new` is not an identifier.
    pub fn rename_identification_variable(
        &mut self,
        old: &str,
        new: &str,
    ) -> Result<(), RewriteError> {
        if !is_identifier(new) {
            return Err(RewriteError::InvalidIdentifier {
                name: new.to_string(),
            });
        }
        let Some(scope) = scope(self.root(), old) else {
            return Err(RewriteError::AliasNotFound {
                alias: old.to_string(),
            });
        };
        if old == new {
            return Ok(());
        }
        if bound_in(scope).contains(new) || free_in(scope).contains(new) {
            return Err(RewriteError::AliasCollisionUnresolvable {
                alias: new.to_string(),
            });
        }
        if let Some(scope) = scope_mut(self.root_mut(), old) {
            rename_in(scope, old, new, true);
        }
        self.root_mut().propagate_edits();
        debug!("renamed `{old}` to `{new}`");
        Ok(())
    }

    /// Append the sources of `other` to this query's FROM list and AND its
    /// WHERE condition into this one, renaming each variable `other` binds
    /// to a fresh `name_N`.
    ///
    /// Returns the `(old, new)` names in declaration order.
    ///
    /// # Errors
    /// [`RewriteError::NodeKindMismatch`] unless both statements are SELECT
    /// queries.
    pub fn merge_subtree_with_fresh_aliases(
        &mut self,
        other: &Self,
    ) -> Result<Vec<(String, String)>, RewriteError> {
        for ast in [&*self, other] {
            if ast.query().kind != QueryKind::Select {
                return Err(RewriteError::NodeKindMismatch {
                    expected: "select query",
                    found: ast.root().name(),
                });
            }
        }
        let mut used = bound_in(self.root());
        used.extend(bound_in(other.root()));

        let mut incoming = other.root().clone();
        incoming.forget_spans();
        let mut renames = Vec::new();
        for var in other.query().bound_variables() {
            let fresh = fresh_alias(var, &mut used);
            rename_in(&mut incoming, var, &fresh, true);
            renames.push((var.to_string(), fresh));
        }
        let NodeKind::Query(incoming) = incoming.kind else {
            unreachable!("ast root is always a query")
        };
        let sources = match incoming.sources.kind {
            NodeKind::Sources(items) => items,
            _ => Vec::new(),
        };
        let condition = incoming.where_clause.and_then(|clause| match clause.kind {
            NodeKind::Where(cond) => Some(*cond),
            _ => None,
        });

        let query = self.query_mut();
        if let Some(items) = query.source_nodes_mut() {
            items.extend(sources);
        }
        query.sources.touch();
        if let Some(condition) = condition {
            and_into_where(query, condition);
        }
        self.root_mut().propagate_edits();
        debug!("merged {} sources with renames {renames:?}", renames.len());
        Ok(renames)
    }

    /// Distinct references of one kind, in source order, subqueries
    /// included.
    #[must_use]
    pub fn list_referenced(&self, kind: ReferenceKind) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |value: String| {
            if seen.insert(value.clone()) {
                out.push(value);
            }
        };
        self.root().walk(&mut |node| match (kind, node.kind()) {
            (ReferenceKind::Entities, NodeKind::Source(source)) => push(source.entity.clone()),
            (ReferenceKind::Entities, NodeKind::Join(join)) => {
                if let Some(entity) = join.entity() {
                    push(entity.to_string());
                }
            }
            (ReferenceKind::Variables, NodeKind::Query(query)) => {
                for var in query.bound_variables() {
                    push(var.to_string());
                }
            }
            (ReferenceKind::Paths, NodeKind::Path(path)) if !path.is_bare() => {
                push(path.dotted());
            }
            (ReferenceKind::Parameters, NodeKind::Parameter(param)) => push(param.text()),
            _ => {}
        });
        out
    }

    /// The first variable declared by the outer query.
    #[must_use]
    pub fn main_alias(&self) -> Option<&str> {
        self.query().bound_variables().first().copied()
    }
}

fn as_condition(node: Node) -> Result<Node, RewriteError> {
    if !node.is_condition() {
        return Err(RewriteError::NodeKindMismatch {
            expected: "condition",
            found: node.name(),
        });
    }
    let mut node = node;
    node.forget_spans();
    Ok(node)
}

fn and_into_where(query: &mut Query, condition: Node) {
    let existing = query
        .where_clause
        .take()
        .and_then(|clause| match clause.kind {
            NodeKind::Where(cond) => Some(*cond),
            _ => None,
        });
    let condition = match existing {
        Some(existing) => Node::new(NodeKind::And(vec![
            existing.parenthesized(),
            condition.parenthesized(),
        ])),
        None => condition,
    };
    query.where_clause = Some(Box::new(Node::new(NodeKind::Where(Box::new(condition)))));
}

fn binds(node: &Node, alias: &str) -> bool {
    matches!(node.kind(), NodeKind::Query(query) if query.bound_variables().contains(&alias))
}

/// The outermost query node binding `alias`.
fn scope<'a>(node: &'a Node, alias: &str) -> Option<&'a Node> {
    if binds(node, alias) {
        return Some(node);
    }
    node.children().into_iter().find_map(|child| scope(child, alias))
}

fn scope_mut<'a>(node: &'a mut Node, alias: &str) -> Option<&'a mut Node> {
    if binds(node, alias) {
        return Some(node);
    }
    node.children_mut()
        .into_iter()
        .find_map(|child| scope_mut(child, alias))
}

/// Every variable bound anywhere in `node`, subqueries included.
fn bound_in(node: &Node) -> HashSet<String> {
    let mut out = HashSet::new();
    node.walk(&mut |n| {
        if let NodeKind::Query(query) = n.kind() {
            out.extend(query.bound_variables().into_iter().map(str::to_string));
        }
    });
    out
}

/// Names referenced below `node` that no query inside `node` binds, that is
/// references to variables of enclosing queries.
fn free_in(node: &Node) -> HashSet<String> {
    fn visit(node: &Node, bound: &mut Vec<String>, out: &mut HashSet<String>) {
        let declared = match node.kind() {
            NodeKind::Query(query) => query.bound_variables(),
            _ => Vec::new(),
        };
        let outer = bound.len();
        bound.extend(declared.into_iter().map(str::to_string));
        let name = match node.kind() {
            NodeKind::IdentificationVariable(name) => Some(name),
            NodeKind::Path(path) => Some(&path.root),
            _ => None,
        };
        if let Some(name) = name
            && !bound.contains(name)
        {
            out.insert(name.clone());
        }
        for child in node.children() {
            visit(child, bound, out);
        }
        bound.truncate(outer);
    }
    let mut out = HashSet::new();
    visit(node, &mut Vec::new(), &mut out);
    out
}

/// Rename bindings of and references to `old` below `node`, stopping at
/// subqueries that declare their own `old`.
fn rename_in(node: &mut Node, old: &str, new: &str, scope_root: bool) {
    if !scope_root && binds(node, old) {
        return;
    }
    let renamed = match &mut node.kind {
        NodeKind::IdentificationVariable(name) if *name == old => {
            new.clone_into(name);
            true
        }
        NodeKind::Path(path) if path.root == old => {
            new.clone_into(&mut path.root);
            true
        }
        _ => false,
    };
    if renamed {
        node.touch();
    }
    for child in node.children_mut() {
        rename_in(child, old, new, false);
    }
}

fn fresh_alias(base: &str, used: &mut HashSet<String>) -> String {
    let mut n = 0_usize;
    loop {
        n += 1;
        let candidate = format!("{base}_{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && keyword_kind(name).is_none()
}

#[cfg(test)]
mod tests;
