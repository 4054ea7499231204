use crate::error::CheckError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Expected effect of a reordering action on a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// `after` is non-decreasing.
    Ascending,
    /// `after` is non-increasing.
    Descending,
    /// `after` differs from `before` as a sequence.
    AnyChange,
    /// Only the first item has to differ.
    LeadChanged,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Relation::Ascending => "ascending",
            Relation::Descending => "descending",
            Relation::AnyChange => "any-change",
            Relation::LeadChanged => "lead-changed",
        };
        f.write_str(name)
    }
}

/// How list values are ordered against each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collation {
    /// Plain string ordering.
    Text,
    /// String ordering after lowercasing.
    TextIgnoreCase,
    /// Numbers, after removing the listed symbols and whitespace.
    Numeric { strip: Vec<char> },
}

impl Collation {
    pub fn currency(symbols: &str) -> Self {
        Collation::Numeric {
            strip: symbols.chars().collect(),
        }
    }

    fn number(&self, value: &str) -> Result<f64, CheckError> {
        let Collation::Numeric { strip } = self else {
            return Err(CheckError::Unparseable {
                value: value.to_string(),
            });
        };
        let cleaned: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && !strip.contains(c))
            .collect();
        match cleaned.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(CheckError::Unparseable {
                value: value.to_string(),
            }),
        }
    }

    /// Whether every adjacent pair of `values` is in `wanted` order or equal.
    pub fn is_monotonic(&self, values: &[String], wanted: Ordering) -> Result<bool, CheckError> {
        let ok = |ord: Ordering| ord == wanted || ord == Ordering::Equal;
        match self {
            Collation::Text => Ok(values.windows(2).all(|w| ok(w[0].cmp(&w[1])))),
            Collation::TextIgnoreCase => Ok(values
                .windows(2)
                .all(|w| ok(w[0].to_lowercase().cmp(&w[1].to_lowercase())))),
            Collation::Numeric { .. } => {
                let numbers = values
                    .iter()
                    .map(|v| self.number(v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(numbers
                    .windows(2)
                    .all(|w| w[0].partial_cmp(&w[1]).is_some_and(ok)))
            }
        }
    }
}

/// Whether `before → after` satisfies `relation`.
pub fn holds(
    relation: Relation,
    collation: &Collation,
    before: &[String],
    after: &[String],
) -> Result<bool, CheckError> {
    match relation {
        Relation::Ascending => collation.is_monotonic(after, Ordering::Less),
        Relation::Descending => collation.is_monotonic(after, Ordering::Greater),
        Relation::AnyChange => Ok(before.is_empty() || before != after),
        Relation::LeadChanged => Ok(before.is_empty() || before.first() != after.first()),
    }
}
