//! Child enumeration and preorder traversal over [`Node`] trees.

use super::{Node, NodeKind};

fn push_opt<'a>(out: &mut Vec<&'a Node>, node: Option<&'a Node>) {
    if let Some(node) = node {
        out.push(node);
    }
}

fn push_opt_mut<'a>(out: &mut Vec<&'a mut Node>, node: Option<&'a mut Node>) {
    if let Some(node) = node {
        out.push(node);
    }
}

impl Node {
    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        match &self.kind {
            NodeKind::Query(q) => {
                push_opt(&mut out, q.select.as_deref());
                out.push(&q.sources);
                push_opt(&mut out, q.set.as_deref());
                push_opt(&mut out, q.where_clause.as_deref());
                push_opt(&mut out, q.group_by.as_deref());
                push_opt(&mut out, q.having.as_deref());
                push_opt(&mut out, q.order_by.as_deref());
            }
            NodeKind::Select(s) => out.extend(s.items.iter()),
            NodeKind::Source(s) => {
                push_opt(&mut out, s.variable.as_deref());
                out.extend(s.joins.iter());
            }
            NodeKind::Join(j) => {
                out.push(&j.target);
                push_opt(&mut out, j.variable.as_deref());
                push_opt(&mut out, j.condition.as_deref());
            }
            NodeKind::Sources(items)
            | NodeKind::Constructor { args: items, .. }
            | NodeKind::UpdateSet(items)
            | NodeKind::GroupBy(items)
            | NodeKind::OrderBy(items)
            | NodeKind::Or(items)
            | NodeKind::And(items)
            | NodeKind::InList(items)
            | NodeKind::Function { args: items, .. }
            | NodeKind::Coalesce(items) => out.extend(items.iter()),
            NodeKind::SelectedItem { expr: a, .. }
            | NodeKind::Where(a)
            | NodeKind::Having(a)
            | NodeKind::OrderByField { expr: a, .. }
            | NodeKind::Not(a)
            | NodeKind::Group(a)
            | NodeKind::Quantified { subquery: a, .. }
            | NodeKind::IsNull { expr: a, .. }
            | NodeKind::IsEmpty { expr: a, .. }
            | NodeKind::Exists { subquery: a, .. }
            | NodeKind::Unary { operand: a, .. }
            | NodeKind::Aggregate { arg: a, .. }
            | NodeKind::Cast { operand: a, .. }
            | NodeKind::Extract { operand: a, .. }
            | NodeKind::TypeOf(a)
            | NodeKind::Subquery(a)
            | NodeKind::TodayMacro { path: a }
            | NodeKind::DateRangeMacro { path: a, .. } => out.push(a),
            NodeKind::CollectionMember { path: a, variable: b }
            | NodeKind::UpdateItem { path: a, value: b }
            | NodeKind::Comparison { lhs: a, rhs: b, .. }
            | NodeKind::In { expr: a, rhs: b, .. }
            | NodeKind::MemberOf {
                expr: a,
                collection: b,
                ..
            }
            | NodeKind::Arithmetic { lhs: a, rhs: b, .. }
            | NodeKind::When {
                condition: a,
                result: b,
            }
            | NodeKind::NullIf { lhs: a, rhs: b }
            | NodeKind::DateCompareMacro {
                path: a,
                reference: b,
                ..
            } => {
                out.push(a);
                out.push(b);
            }
            NodeKind::Between {
                expr, low, high, ..
            } => {
                out.push(expr);
                out.push(low);
                out.push(high);
            }
            NodeKind::Like {
                expr,
                pattern,
                escape,
                ..
            } => {
                out.push(expr);
                out.push(pattern);
                push_opt(&mut out, escape.as_deref());
            }
            NodeKind::Trim {
                character, operand, ..
            } => {
                push_opt(&mut out, character.as_deref());
                out.push(operand);
            }
            NodeKind::Case {
                operand,
                whens,
                otherwise,
            } => {
                push_opt(&mut out, operand.as_deref());
                out.extend(whens.iter());
                out.push(otherwise);
            }
            NodeKind::IdentificationVariable(_)
            | NodeKind::Path(_)
            | NodeKind::Parameter(_)
            | NodeKind::Literal(_)
            | NodeKind::EnumMacro { .. }
            | NodeKind::Now(_) => {}
        }
        out
    }

    /// Direct children in source order, mutably.
    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        let mut out = Vec::new();
        match &mut self.kind {
            NodeKind::Query(q) => {
                push_opt_mut(&mut out, q.select.as_deref_mut());
                out.push(&mut q.sources);
                push_opt_mut(&mut out, q.set.as_deref_mut());
                push_opt_mut(&mut out, q.where_clause.as_deref_mut());
                push_opt_mut(&mut out, q.group_by.as_deref_mut());
                push_opt_mut(&mut out, q.having.as_deref_mut());
                push_opt_mut(&mut out, q.order_by.as_deref_mut());
            }
            NodeKind::Select(s) => out.extend(s.items.iter_mut()),
            NodeKind::Source(s) => {
                push_opt_mut(&mut out, s.variable.as_deref_mut());
                out.extend(s.joins.iter_mut());
            }
            NodeKind::Join(j) => {
                out.push(&mut j.target);
                push_opt_mut(&mut out, j.variable.as_deref_mut());
                push_opt_mut(&mut out, j.condition.as_deref_mut());
            }
            NodeKind::Sources(items)
            | NodeKind::Constructor { args: items, .. }
            | NodeKind::UpdateSet(items)
            | NodeKind::GroupBy(items)
            | NodeKind::OrderBy(items)
            | NodeKind::Or(items)
            | NodeKind::And(items)
            | NodeKind::InList(items)
            | NodeKind::Function { args: items, .. }
            | NodeKind::Coalesce(items) => out.extend(items.iter_mut()),
            NodeKind::SelectedItem { expr: a, .. }
            | NodeKind::Where(a)
            | NodeKind::Having(a)
            | NodeKind::OrderByField { expr: a, .. }
            | NodeKind::Not(a)
            | NodeKind::Group(a)
            | NodeKind::Quantified { subquery: a, .. }
            | NodeKind::IsNull { expr: a, .. }
            | NodeKind::IsEmpty { expr: a, .. }
            | NodeKind::Exists { subquery: a, .. }
            | NodeKind::Unary { operand: a, .. }
            | NodeKind::Aggregate { arg: a, .. }
            | NodeKind::Cast { operand: a, .. }
            | NodeKind::Extract { operand: a, .. }
            | NodeKind::TypeOf(a)
            | NodeKind::Subquery(a)
            | NodeKind::TodayMacro { path: a }
            | NodeKind::DateRangeMacro { path: a, .. } => out.push(a),
            NodeKind::CollectionMember { path: a, variable: b }
            | NodeKind::UpdateItem { path: a, value: b }
            | NodeKind::Comparison { lhs: a, rhs: b, .. }
            | NodeKind::In { expr: a, rhs: b, .. }
            | NodeKind::MemberOf {
                expr: a,
                collection: b,
                ..
            }
            | NodeKind::Arithmetic { lhs: a, rhs: b, .. }
            | NodeKind::When {
                condition: a,
                result: b,
            }
            | NodeKind::NullIf { lhs: a, rhs: b }
            | NodeKind::DateCompareMacro {
                path: a,
                reference: b,
                ..
            } => {
                out.push(a);
                out.push(b);
            }
            NodeKind::Between {
                expr, low, high, ..
            } => {
                out.push(expr);
                out.push(low);
                out.push(high);
            }
            NodeKind::Like {
                expr,
                pattern,
                escape,
                ..
            } => {
                out.push(expr);
                out.push(pattern);
                push_opt_mut(&mut out, escape.as_deref_mut());
            }
            NodeKind::Trim {
                character, operand, ..
            } => {
                push_opt_mut(&mut out, character.as_deref_mut());
                out.push(operand);
            }
            NodeKind::Case {
                operand,
                whens,
                otherwise,
            } => {
                push_opt_mut(&mut out, operand.as_deref_mut());
                out.extend(whens.iter_mut());
                out.push(otherwise);
            }
            NodeKind::IdentificationVariable(_)
            | NodeKind::Path(_)
            | NodeKind::Parameter(_)
            | NodeKind::Literal(_)
            | NodeKind::EnumMacro { .. }
            | NodeKind::Now(_) => {}
        }
        out
    }

    /// Visit this node and all descendants in preorder.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Preorder walk that does not descend into subqueries.
    ///
    /// The callback still sees each `Subquery` node itself.
    pub fn walk_scope<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        if matches!(self.kind, NodeKind::Subquery(_)) {
            return;
        }
        for child in self.children() {
            child.walk_scope(f);
        }
    }

    /// Apply `f` to every node of the subtree, children before parents.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        for child in self.children_mut() {
            child.walk_mut(f);
        }
        f(self);
    }

    /// Clear the span of every node above an edited (span-less) node.
    ///
    /// Returns whether the subtree contained an edit. Call this after
    /// mutating a parsed tree so the printer does not copy stale tokens for
    /// an ancestor of the change.
    pub fn propagate_edits(&mut self) -> bool {
        let mut edited = self.span.is_none();
        for child in self.children_mut() {
            edited |= child.propagate_edits();
        }
        if edited {
            self.span = None;
        }
        edited
    }
}
