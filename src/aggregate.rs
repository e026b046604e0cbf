/// Derived statistics over a row set
///
/// Aggregates are computed over whatever rows the caller passes: the rows
/// of a `ViewResult` for statistics that follow the current search and
/// filters, or the whole collection for population badges such as the
/// roster size.

use crate::filter::FilterPredicate;
use crate::record::Record;
use crate::value::FieldValue;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// A named reducer
#[derive(Debug, Clone)]
pub enum AggregateSpec {
    /// Rows where the predicate holds
    Count { name: String, predicate: FilterPredicate },
    /// Share of rows where the predicate holds, 0..=100, unrounded
    Percentage { name: String, predicate: FilterPredicate },
    /// Sum of the numeric values of a field
    Sum { name: String, field: String },
    /// Mean of the numeric values of a field
    Average { name: String, field: String },
    /// Row count per distinct value of a field, first-seen order
    GroupBy { name: String, field: String },
}

impl AggregateSpec {
    pub fn count(name: impl Into<String>, predicate: FilterPredicate) -> Self {
        AggregateSpec::Count { name: name.into(), predicate }
    }

    pub fn percentage(name: impl Into<String>, predicate: FilterPredicate) -> Self {
        AggregateSpec::Percentage { name: name.into(), predicate }
    }

    pub fn sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        AggregateSpec::Sum { name: name.into(), field: field.into() }
    }

    pub fn average(name: impl Into<String>, field: impl Into<String>) -> Self {
        AggregateSpec::Average { name: name.into(), field: field.into() }
    }

    pub fn group_by(name: impl Into<String>, field: impl Into<String>) -> Self {
        AggregateSpec::GroupBy { name: name.into(), field: field.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            AggregateSpec::Count { name, .. }
            | AggregateSpec::Percentage { name, .. }
            | AggregateSpec::Sum { name, .. }
            | AggregateSpec::Average { name, .. }
            | AggregateSpec::GroupBy { name, .. } => name,
        }
    }

    fn evaluate(&self, rows: &[Record]) -> AggregateValue {
        match self {
            AggregateSpec::Count { predicate, .. } => {
                AggregateValue::Count(rows.iter().filter(|r| predicate.matches(r)).count())
            }
            AggregateSpec::Percentage { predicate, .. } => {
                let matching = rows.iter().filter(|r| predicate.matches(r)).count();
                AggregateValue::Number(matching as f64 / rows.len().max(1) as f64 * 100.0)
            }
            AggregateSpec::Sum { field, .. } => {
                AggregateValue::Number(numeric(rows, field).sum())
            }
            AggregateSpec::Average { field, .. } => {
                let (total, n) = numeric(rows, field).fold((0.0, 0usize), |(t, n), v| (t + v, n + 1));
                AggregateValue::Number(if n == 0 { 0.0 } else { total / n as f64 })
            }
            AggregateSpec::GroupBy { field, .. } => {
                let mut groups: Vec<(FieldValue, usize)> = Vec::new();
                for row in rows {
                    let key = row.get(field).cloned().unwrap_or(FieldValue::Null);
                    match groups.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, count)) => *count += 1,
                        None => groups.push((key, 1)),
                    }
                }
                AggregateValue::Groups(groups)
            }
        }
    }
}

fn numeric<'a>(rows: &'a [Record], field: &'a str) -> impl Iterator<Item = f64> + 'a {
    rows.iter()
        .filter_map(move |r| r.get(field).and_then(FieldValue::as_f64))
        .filter(|v| v.is_finite())
}

/// Value produced by one aggregate
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    Count(usize),
    Number(f64),
    /// Category value and row count. Rows without the field count under Null.
    Groups(Vec<(FieldValue, usize)>),
}

impl AggregateValue {
    pub fn as_count(&self) -> Option<usize> {
        match self {
            AggregateValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AggregateValue::Count(n) => Some(*n as f64),
            AggregateValue::Number(v) => Some(*v),
            AggregateValue::Groups(_) => None,
        }
    }

    pub fn as_groups(&self) -> Option<&[(FieldValue, usize)]> {
        match self {
            AggregateValue::Groups(g) => Some(g),
            _ => None,
        }
    }
}

impl Serialize for AggregateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AggregateValue::Count(n) => serializer.serialize_u64(*n as u64),
            AggregateValue::Number(v) => serializer.serialize_f64(*v),
            AggregateValue::Groups(groups) => {
                #[derive(Serialize)]
                struct Group<'a> {
                    value: &'a FieldValue,
                    count: usize,
                }
                let mut seq = serializer.serialize_seq(Some(groups.len()))?;
                for (value, count) in groups {
                    seq.serialize_element(&Group { value, count: *count })?;
                }
                seq.end()
            }
        }
    }
}

/// Aggregate results in spec order, addressable by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    entries: Vec<(String, AggregateValue)>,
}

impl Aggregates {
    pub fn get(&self, name: &str) -> Option<&AggregateValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Aggregates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Evaluate every spec over `rows`. A later spec with a repeated name
/// replaces the earlier result.
pub fn compute_aggregates(rows: &[Record], specs: &[AggregateSpec]) -> Aggregates {
    let mut out = Aggregates::default();
    for spec in specs {
        let value = spec.evaluate(rows);
        match out.entries.iter_mut().find(|(n, _)| n == spec.name()) {
            Some((_, slot)) => *slot = value,
            None => out.entries.push((spec.name().to_string(), value)),
        }
    }
    out
}
