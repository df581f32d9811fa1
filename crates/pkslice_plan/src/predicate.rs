//! Structured AND-only predicates over key columns.
//!
//! Predicates stay as lists of comparisons until they are rendered, so the
//! partitioners can be checked against key tuples without parsing SQL text.

use std::cmp::Ordering;
use std::fmt;

use crate::literal::Literal;
use crate::value::{KeySchema, KeyValue};

/// Comparison operator allowed in a slice predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }

    /// Whether a column/literal ordering satisfies this operator.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Lt => ordering.is_lt(),
            Self::LtEq => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::GtEq => ordering.is_ge(),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<column> <op> <literal>` term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparison {
    pub column: String,
    pub op: CompareOp,
    pub value: KeyValue,
}

impl Comparison {
    pub fn new(column: impl Into<String>, op: CompareOp, value: KeyValue) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    /// Evaluates the term against a column value with SQL semantics: a
    /// comparison without an ordering (for example against `NULL`) is false.
    pub fn matches(&self, column_value: &KeyValue) -> bool {
        column_value
            .compare(&self.value)
            .is_some_and(|ordering| self.op.accepts(ordering))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, Literal(&self.value))
    }
}

/// Conjunction of comparisons. Never contains `OR`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Predicate {
    terms: Vec<Comparison>,
}

impl Predicate {
    pub fn new(terms: Vec<Comparison>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Comparison] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns a copy with `term` placed in front of the existing terms.
    pub fn prefixed(mut self, term: Comparison) -> Self {
        self.terms.insert(0, term);
        self
    }

    /// Evaluates the conjunction for one key row.
    ///
    /// Terms on columns outside `schema` never match.
    pub fn matches(&self, schema: &KeySchema, row: &[KeyValue]) -> bool {
        self.terms.iter().all(|term| {
            schema
                .position(&term.column)
                .and_then(|idx| row.get(idx))
                .is_some_and(|value| term.matches(value))
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}
