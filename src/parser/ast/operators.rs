//! Small closed enums used as node payloads, with their canonical spelling.
//!
//! The spellings here are the ones the printer emits for synthesised nodes;
//! parsed nodes keep their original text.

use crate::SyntaxKind;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    pub(crate) fn from_kind(kind: SyntaxKind) -> Option<Self> {
        Some(match kind {
            SyntaxKind::T_EQ => Self::Eq,
            SyntaxKind::T_NEQ => Self::Neq,
            SyntaxKind::T_LT => Self::Lt,
            SyntaxKind::T_LTE => Self::Lte,
            SyntaxKind::T_GT => Self::Gt,
            SyntaxKind::T_GTE => Self::Gte,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }

    /// Whether the operator only tests (in)equality.
    #[must_use]
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Neq)
    }
}

/// The comparison-expression families of the grammar, in declared order.
///
/// The parser assigns the first family whose operand rules accept both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonFamily {
    String,
    Boolean,
    Enum,
    Datetime,
    Entity,
    EntityType,
    Arithmetic,
}

impl ComparisonFamily {
    /// All families in grammar order.
    pub const ORDERED: [Self; 7] = [
        Self::String,
        Self::Boolean,
        Self::Enum,
        Self::Datetime,
        Self::Entity,
        Self::EntityType,
        Self::Arithmetic,
    ];

    /// Whether `op` is permitted for this family.
    #[must_use]
    pub fn allows(self, op: ComparisonOp) -> bool {
        match self {
            Self::String | Self::Datetime | Self::Arithmetic => true,
            Self::Boolean | Self::Enum | Self::Entity | Self::EntityType => op.is_equality(),
        }
    }
}

/// `ALL`, `ANY` or `SOME`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    All,
    Any,
    Some,
}

impl Quantifier {
    pub(crate) fn from_kind(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::K_ALL => Some(Self::All),
            SyntaxKind::K_ANY => Some(Self::Any),
            SyntaxKind::K_SOME => Some(Self::Some),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
            Self::Some => "some",
        }
    }
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// Unary sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Avg,
    Sum,
    Min,
    Max,
}

impl AggregateFunction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Avg => "avg",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Built-in scalar functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Locate,
    Substring,
    Concat,
    Lower,
    Upper,
    Length,
    Abs,
    Sqrt,
    Mod,
    Size,
    Index,
    Object,
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
}

impl Function {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locate => "locate",
            Self::Substring => "substring",
            Self::Concat => "concat",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Length => "length",
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Mod => "mod",
            Self::Size => "size",
            Self::Index => "index",
            Self::Object => "object",
            Self::CurrentDate => "current_date",
            Self::CurrentTime => "current_time",
            Self::CurrentTimestamp => "current_timestamp",
        }
    }

    /// Functions written without an argument list.
    #[must_use]
    pub fn is_niladic(self) -> bool {
        matches!(
            self,
            Self::CurrentDate | Self::CurrentTime | Self::CurrentTimestamp
        )
    }

    /// Inclusive bounds on the number of arguments.
    #[must_use]
    pub fn arity(self) -> (usize, usize) {
        match self {
            Self::CurrentDate | Self::CurrentTime | Self::CurrentTimestamp => (0, 0),
            Self::Lower
            | Self::Upper
            | Self::Length
            | Self::Abs
            | Self::Sqrt
            | Self::Size
            | Self::Index
            | Self::Object => (1, 1),
            Self::Mod => (2, 2),
            Self::Locate | Self::Substring => (2, 3),
            Self::Concat => (2, usize::MAX),
        }
    }
}

/// `TRIM` side specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrimSide {
    Leading,
    Trailing,
    Both,
}

impl TrimSide {
    pub(crate) fn from_kind(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::K_LEADING => Some(Self::Leading),
            SyntaxKind::K_TRAILING => Some(Self::Trailing),
            SyntaxKind::K_BOTH => Some(Self::Both),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leading => "leading",
            Self::Trailing => "trailing",
            Self::Both => "both",
        }
    }
}

/// Join flavour. `INNER JOIN` and plain `JOIN` are the same join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// ORDER BY null placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullsOrder {
    First,
    Last,
}

/// Parameter flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// `:name`
    Named,
    /// `?1`
    Positional,
    /// `${name}`, resolved from configuration.
    Config,
}

/// Literal flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Integer,
    Decimal,
    Boolean,
    Null,
    /// JDBC escape literal such as `{d '2020-01-01'}`.
    Temporal,
}

/// The three date comparison macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateComparison {
    /// `@DATEBEFORE`; against `NOW+n` it becomes `< start of day n`.
    Before,
    /// `@DATEAFTER`; against `NOW+n` it becomes `>= start of day n+1`, the
    /// day-granularity form of `> day n`.
    After,
    /// `@DATEEQUALS`; against `NOW+n` it becomes a range over day `n`.
    Equals,
}

impl DateComparison {
    /// Macro spelling including the opening parenthesis.
    #[must_use]
    pub fn opener(self) -> &'static str {
        match self {
            Self::Before => "@dateBefore(",
            Self::After => "@dateAfter(",
            Self::Equals => "@dateEquals(",
        }
    }

    /// Comparison operator the macro expands to.
    #[must_use]
    pub fn operator(self) -> ComparisonOp {
        match self {
            Self::Before => ComparisonOp::Lt,
            Self::After => ComparisonOp::Gt,
            Self::Equals => ComparisonOp::Eq,
        }
    }
}

/// Calendar units accepted by `@BETWEEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl DateUnit {
    /// Parse a unit name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "year" => Self::Year,
            "month" => Self::Month,
            "week" => Self::Week,
            "day" => Self::Day,
            "hour" => Self::Hour,
            "minute" => Self::Minute,
            "second" => Self::Second,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }
}

/// `NOW` shifted by a signed number of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NowOffset(pub i64);

impl NowOffset {
    /// Source spelling, e.g. `now`, `now+1`, `now-7`.
    #[must_use]
    pub fn text(self) -> String {
        match self.0 {
            0 => "now".to_string(),
            n if n > 0 => format!("now+{n}"),
            n => format!("now-{}", n.unsigned_abs()),
        }
    }
}
