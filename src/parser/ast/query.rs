//! Statement-level payloads: queries, select lists, sources and joins.

use super::{Node, NodeKind, PathExpr};
use super::operators::JoinKind;

/// The three statement shapes sharing `Sources`/`Where` children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Update,
    Delete,
}

/// A statement or subquery body.
///
/// `sources` always holds a `Sources` node. For UPDATE and DELETE it lists the
/// single target entity; `select` is only present for SELECT and `set` only
/// for UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: QueryKind,
    pub select: Option<Box<Node>>,
    pub sources: Box<Node>,
    pub set: Option<Box<Node>>,
    pub where_clause: Option<Box<Node>>,
    pub group_by: Option<Box<Node>>,
    pub having: Option<Box<Node>>,
    pub order_by: Option<Box<Node>>,
}

/// Variables declared by a FROM list, in declaration order.
pub(crate) fn declared_variables(declarations: &[Node]) -> Vec<&str> {
    let mut out = Vec::new();
    for decl in declarations {
        match &decl.kind {
            NodeKind::Source(source) => {
                if let Some(name) = source.variable_name() {
                    out.push(name);
                }
                for join in &source.joins {
                    if let NodeKind::Join(j) = &join.kind
                        && let Some(name) = j.variable_name()
                    {
                        out.push(name);
                    }
                }
            }
            NodeKind::CollectionMember { variable, .. } => {
                if let NodeKind::IdentificationVariable(name) = &variable.kind {
                    out.push(name);
                }
            }
            _ => {}
        }
    }
    out
}

impl Query {
    /// Declarations in this query's FROM list (or UPDATE/DELETE target).
    #[must_use]
    pub fn source_nodes(&self) -> &[Node] {
        match &self.sources.kind {
            NodeKind::Sources(items) => items,
            _ => &[],
        }
    }

    pub(crate) fn source_nodes_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.sources.kind {
            NodeKind::Sources(items) => Some(items),
            _ => None,
        }
    }

    /// Names of the identification variables bound directly by this query,
    /// in declaration order. Subqueries are not included.
    #[must_use]
    pub fn bound_variables(&self) -> Vec<&str> {
        declared_variables(self.source_nodes())
    }

    /// Condition of the WHERE clause, if any.
    #[must_use]
    pub fn where_condition(&self) -> Option<&Node> {
        match &self.where_clause.as_deref()?.kind {
            NodeKind::Where(cond) => Some(cond),
            _ => None,
        }
    }
}

/// `SELECT [DISTINCT] items`.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub items: Vec<Node>,
}

/// A range variable declaration: `Entity [AS] var` followed by its joins.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub entity: String,
    /// An `IdentificationVariable` node; optional only for UPDATE/DELETE.
    pub variable: Option<Box<Node>>,
    pub joins: Vec<Node>,
}

impl Source {
    /// Name of the declared variable.
    #[must_use]
    pub fn variable_name(&self) -> Option<&str> {
        match &self.variable.as_deref()?.kind {
            NodeKind::IdentificationVariable(name) => Some(name),
            _ => None,
        }
    }
}

/// `[LEFT [OUTER] | INNER] JOIN [FETCH] target [[AS] var] [ON cond]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub fetch: bool,
    /// A `Path` node. A bare path names an entity (`JOIN Entity e ON ...`).
    pub target: Box<Node>,
    pub variable: Option<Box<Node>>,
    pub condition: Option<Box<Node>>,
}

impl Join {
    /// Name of the declared variable.
    #[must_use]
    pub fn variable_name(&self) -> Option<&str> {
        match &self.variable.as_deref()?.kind {
            NodeKind::IdentificationVariable(name) => Some(name),
            _ => None,
        }
    }

    /// Entity name when the join targets an entity rather than a path.
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        match &self.target.kind {
            NodeKind::Path(PathExpr { root, fields }) if fields.is_empty() => Some(root),
            _ => None,
        }
    }
}
