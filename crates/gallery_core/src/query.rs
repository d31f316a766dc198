//! Tab predicates built from simple `field=value` / `field~value` clauses.

use std::{fmt, str::FromStr, sync::Arc};

use shared::Record;
use thiserror::Error;

use crate::controller::RecordPredicate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParseError {
    #[error("clause '{0}' has no '=' or '~' operator")]
    MissingOperator(String),
    #[error("clause '{0}' has an empty field name")]
    EmptyField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Column text equals the value exactly.
    Exact,
    /// Column text contains the value, ignoring case.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
    pub mode: MatchMode,
}

impl FieldFilter {
    pub fn exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            mode: MatchMode::Exact,
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into().to_lowercase(),
            mode: MatchMode::Contains,
        }
    }

    /// An absent column only matches an empty exact value.
    pub fn matches(&self, record: &Record) -> bool {
        let text = record.text(&self.field).unwrap_or_default();
        match self.mode {
            MatchMode::Exact => text == self.value,
            MatchMode::Contains => text.to_lowercase().contains(&self.value),
        }
    }
}

impl FromStr for FieldFilter {
    type Err = QueryParseError;

    fn from_str(clause: &str) -> Result<Self, Self::Err> {
        let (at, op) = clause
            .char_indices()
            .find(|(_, c)| *c == '=' || *c == '~')
            .ok_or_else(|| QueryParseError::MissingOperator(clause.to_string()))?;
        let field = clause[..at].trim();
        let value = clause[at + op.len_utf8()..].trim();
        if field.is_empty() {
            return Err(QueryParseError::EmptyField(clause.to_string()));
        }
        Ok(match op {
            '~' => Self::contains(field, value),
            _ => Self::exact(field, value),
        })
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.mode {
            MatchMode::Exact => '=',
            MatchMode::Contains => '~',
        };
        write!(f, "{}{}{}", self.field, op, self.value)
    }
}

/// All clauses must hold; an empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    clauses: Vec<FieldFilter>,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with(mut self, clause: FieldFilter) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[FieldFilter] {
        &self.clauses
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }

    pub fn parse_all<I, S>(clauses: I) -> Result<Self, QueryParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        clauses
            .into_iter()
            .map(|clause| clause.as_ref().parse::<FieldFilter>())
            .collect::<Result<Vec<_>, _>>()
            .map(|clauses| Self { clauses })
    }

    pub fn into_predicate(self) -> RecordPredicate {
        Arc::new(move |record: &Record| self.matches(record))
    }
}

impl Extend<FieldFilter> for RecordQuery {
    fn extend<T: IntoIterator<Item = FieldFilter>>(&mut self, iter: T) {
        self.clauses.extend(iter);
    }
}

impl fmt::Display for RecordQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("*");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
