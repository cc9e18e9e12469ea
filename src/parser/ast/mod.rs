//! Typed AST for JPQL statements.
//!
//! Every construct is a variant of the closed [`NodeKind`] union, wrapped in a
//! [`Node`] that records the inclusive token range it was parsed from. Nodes
//! created or edited after parsing carry no span; the printer renders those
//! from their payload and copies everything else from the original tokens.

mod operators;
mod query;
mod visit;


pub use operators::{
    AggregateFunction, ArithmeticOp, ComparisonFamily, ComparisonOp, DateComparison, DateUnit,
    Function, JoinKind, LiteralKind, NowOffset, NullsOrder, ParameterKind, Quantifier, Sign,
    SortDirection, TrimSide,
};
pub use query::{Join, Query, QueryKind, Select, Source};
pub(crate) use query::declared_variables;

/// Inclusive range of significant-token indices a node was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenSpan {
    /// Index of the first token.
    pub first: usize,
    /// Index of the last token.
    pub last: usize,
}

impl TokenSpan {
    /// Whether `other` lies within this span.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.first <= other.first && other.last <= self.last
    }
}

/// A dotted navigation chain rooted at an identification variable.
///
/// A chain without fields is a bare variable (or entity name) reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    pub root: String,
    pub fields: Vec<String>,
}

impl PathExpr {
    /// Build a path from its dotted text.
    #[must_use]
    pub fn parse_dotted(text: &str) -> Self {
        let mut parts = text.split('.').map(str::to_string);
        let root = parts.next().unwrap_or_default();
        Self {
            root,
            fields: parts.collect(),
        }
    }

    /// Whether this is a bare identifier without navigation.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.fields.is_empty()
    }

    /// The dotted text of the path.
    #[must_use]
    pub fn dotted(&self) -> String {
        let mut out = self.root.clone();
        for field in &self.fields {
            out.push('.');
            out.push_str(field);
        }
        out
    }
}

/// A query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub kind: ParameterKind,
    /// Name without its sigil (`:`, `?`, `${ }`).
    pub name: String,
}

impl Parameter {
    /// Build a named (`:name`) parameter.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: ParameterKind::Named,
            name: name.into(),
        }
    }

    /// Source spelling of the parameter.
    #[must_use]
    pub fn text(&self) -> String {
        match self.kind {
            ParameterKind::Named => format!(":{}", self.name),
            ParameterKind::Positional => format!("?{}", self.name),
            ParameterKind::Config => format!("${{{}}}", self.name),
        }
    }
}

/// A literal, stored as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
}

impl Literal {
    /// A single-quoted string literal with `'` escaped.
    #[must_use]
    pub fn string(value: &str) -> Self {
        Self {
            kind: LiteralKind::String,
            text: format!("'{}'", value.replace('\'', "''")),
        }
    }

    /// An integer literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self {
            kind: LiteralKind::Integer,
            text: value.to_string(),
        }
    }
}

/// One node of the AST: a kind-tagged payload plus its source span.
///
/// Equality is structural and ignores spans, so a re-parsed tree compares
/// equal to the tree it was printed from.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Option<TokenSpan>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Closed set of AST node shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A SELECT, UPDATE or DELETE statement, or a subquery body.
    Query(Query),
    /// `SELECT [DISTINCT] items`.
    Select(Select),
    /// One selected item with its optional result variable.
    SelectedItem {
        expr: Box<Node>,
        alias: Option<String>,
    },
    /// `NEW pkg.Class(args)`.
    Constructor { class: String, args: Vec<Node> },
    /// The declaration list of FROM, or the target of UPDATE/DELETE.
    Sources(Vec<Node>),
    /// A range variable declaration with its joins.
    Source(Source),
    /// A binding occurrence of an identification variable.
    IdentificationVariable(String),
    Join(Join),
    /// `IN (path) [AS] var`.
    CollectionMember {
        path: Box<Node>,
        variable: Box<Node>,
    },
    /// `SET item, ...`.
    UpdateSet(Vec<Node>),
    UpdateItem { path: Box<Node>, value: Box<Node> },
    Where(Box<Node>),
    GroupBy(Vec<Node>),
    Having(Box<Node>),
    OrderBy(Vec<Node>),
    OrderByField {
        expr: Box<Node>,
        direction: Option<SortDirection>,
        nulls: Option<NullsOrder>,
    },
    Or(Vec<Node>),
    And(Vec<Node>),
    Not(Box<Node>),
    /// A parenthesised condition or scalar expression.
    Group(Box<Node>),
    Comparison {
        family: ComparisonFamily,
        op: ComparisonOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    /// `ALL|ANY|SOME (subquery)` on the right of a comparison.
    Quantified {
        quantifier: Quantifier,
        subquery: Box<Node>,
    },
    Between {
        negated: bool,
        expr: Box<Node>,
        low: Box<Node>,
        high: Box<Node>,
    },
    /// `expr [NOT] IN rhs`; `rhs` is an `InList`, `Subquery`, `Parameter` or `Path`.
    In {
        negated: bool,
        expr: Box<Node>,
        rhs: Box<Node>,
    },
    InList(Vec<Node>),
    Like {
        negated: bool,
        expr: Box<Node>,
        pattern: Box<Node>,
        escape: Option<Box<Node>>,
    },
    IsNull { negated: bool, expr: Box<Node> },
    IsEmpty { negated: bool, expr: Box<Node> },
    MemberOf {
        negated: bool,
        expr: Box<Node>,
        collection: Box<Node>,
    },
    Exists { negated: bool, subquery: Box<Node> },
    Path(PathExpr),
    Parameter(Parameter),
    Literal(Literal),
    Arithmetic {
        op: ArithmeticOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Unary { sign: Sign, operand: Box<Node> },
    /// `COUNT`, `AVG`, `SUM`, `MIN` and `MAX`, whatever their spelling.
    Aggregate {
        function: AggregateFunction,
        distinct: bool,
        arg: Box<Node>,
    },
    /// Built-in scalar functions, including the niladic `CURRENT_*` ones.
    Function { function: Function, args: Vec<Node> },
    Trim {
        side: Option<TrimSide>,
        character: Option<Box<Node>>,
        operand: Box<Node>,
    },
    Case {
        operand: Option<Box<Node>>,
        whens: Vec<Node>,
        otherwise: Box<Node>,
    },
    When {
        condition: Box<Node>,
        result: Box<Node>,
    },
    Coalesce(Vec<Node>),
    NullIf { lhs: Box<Node>, rhs: Box<Node> },
    Cast { operand: Box<Node>, target: String },
    Extract { unit: String, operand: Box<Node> },
    /// `TYPE(var)`.
    TypeOf(Box<Node>),
    /// A parenthesised subquery; the child is a `Query`.
    Subquery(Box<Node>),
    /// `@ENUM(dotted.Literal)`, pending resolution by an enum registry.
    EnumMacro { literal: String },
    /// `@TODAY(path)`.
    TodayMacro { path: Box<Node> },
    /// `@DATEBEFORE`, `@DATEAFTER` and `@DATEEQUALS`.
    DateCompareMacro {
        op: DateComparison,
        path: Box<Node>,
        reference: Box<Node>,
    },
    /// `@BETWEEN(path, NOW[+/-n], NOW[+/-n], unit)`.
    DateRangeMacro {
        path: Box<Node>,
        from: NowOffset,
        to: NowOffset,
        unit: DateUnit,
    },
    /// `NOW[+/-n]` as a date macro reference.
    Now(NowOffset),
}

impl Node {
    /// Create a node that has no source span.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, span: None }
    }

    pub(crate) fn parsed(kind: NodeKind, span: TokenSpan) -> Self {
        Self {
            kind,
            span: Some(span),
        }
    }

    /// Payload of this node.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Token span this node was parsed from, if it is unmodified.
    #[must_use]
    pub fn span(&self) -> Option<TokenSpan> {
        self.span
    }

    /// Whether the node was created or changed after parsing.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.span.is_none()
    }

    /// Mark this node as modified so the printer re-renders it.
    pub fn touch(&mut self) {
        self.span = None;
    }

    /// Drop every span in this subtree.
    ///
    /// Required before moving a subtree into a tree built from another
    /// token stream.
    pub fn forget_spans(&mut self) {
        self.span = None;
        for child in self.children_mut() {
            child.forget_spans();
        }
    }

    /// Short name of the variant, used in error reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Convenience constructor for a path node.
    #[must_use]
    pub fn path(dotted: &str) -> Self {
        Self::new(NodeKind::Path(PathExpr::parse_dotted(dotted)))
    }

    /// Convenience constructor for a named parameter node.
    #[must_use]
    pub fn named_parameter(name: &str) -> Self {
        Self::new(NodeKind::Parameter(Parameter::named(name)))
    }

    /// Wrap in a `Group` unless the node already is one.
    #[must_use]
    pub fn parenthesized(self) -> Self {
        if matches!(self.kind, NodeKind::Group(_)) {
            self
        } else {
            Self::new(NodeKind::Group(Box::new(self)))
        }
    }

    /// Whether this node is a condition combinator or predicate.
    #[must_use]
    pub fn is_condition(&self) -> bool {
        match &self.kind {
            NodeKind::Or(_)
            | NodeKind::And(_)
            | NodeKind::Not(_)
            | NodeKind::Comparison { .. }
            | NodeKind::Between { .. }
            | NodeKind::In { .. }
            | NodeKind::Like { .. }
            | NodeKind::IsNull { .. }
            | NodeKind::IsEmpty { .. }
            | NodeKind::MemberOf { .. }
            | NodeKind::Exists { .. }
            | NodeKind::TodayMacro { .. }
            | NodeKind::DateCompareMacro { .. }
            | NodeKind::DateRangeMacro { .. } => true,
            NodeKind::Group(inner) => inner.is_condition(),
            _ => false,
        }
    }
}

impl NodeKind {
    /// Short name of the variant.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Query(q) => match q.kind {
                QueryKind::Select => "select query",
                QueryKind::Update => "update query",
                QueryKind::Delete => "delete query",
            },
            Self::Select(_) => "select clause",
            Self::SelectedItem { .. } => "selected item",
            Self::Constructor { .. } => "constructor",
            Self::Sources(_) => "sources",
            Self::Source(_) => "source",
            Self::IdentificationVariable(_) => "identification variable",
            Self::Join(_) => "join",
            Self::CollectionMember { .. } => "collection member",
            Self::UpdateSet(_) => "update set",
            Self::UpdateItem { .. } => "update item",
            Self::Where(_) => "where",
            Self::GroupBy(_) => "group by",
            Self::Having(_) => "having",
            Self::OrderBy(_) => "order by",
            Self::OrderByField { .. } => "order by field",
            Self::Or(_) => "or",
            Self::And(_) => "and",
            Self::Not(_) => "not",
            Self::Group(_) => "group",
            Self::Comparison { .. } => "comparison",
            Self::Quantified { .. } => "quantified subquery",
            Self::Between { .. } => "between",
            Self::In { .. } => "in",
            Self::InList(_) => "in list",
            Self::Like { .. } => "like",
            Self::IsNull { .. } => "is null",
            Self::IsEmpty { .. } => "is empty",
            Self::MemberOf { .. } => "member of",
            Self::Exists { .. } => "exists",
            Self::Path(_) => "path",
            Self::Parameter(_) => "parameter",
            Self::Literal(_) => "literal",
            Self::Arithmetic { .. } => "arithmetic",
            Self::Unary { .. } => "unary",
            Self::Aggregate { .. } => "aggregate",
            Self::Function { .. } => "function",
            Self::Trim { .. } => "trim",
            Self::Case { .. } => "case",
            Self::When { .. } => "when",
            Self::Coalesce(_) => "coalesce",
            Self::NullIf { .. } => "nullif",
            Self::Cast { .. } => "cast",
            Self::Extract { .. } => "extract",
            Self::TypeOf(_) => "type",
            Self::Subquery(_) => "subquery",
            Self::EnumMacro { .. } => "@enum macro",
            Self::TodayMacro { .. } => "@today macro",
            Self::DateCompareMacro { .. } => "date comparison macro",
            Self::DateRangeMacro { .. } => "@between macro",
            Self::Now(_) => "now",
        }
    }
}
