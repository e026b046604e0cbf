/// Tabular views
///
/// The TabularViewEngine turns a record collection plus the caller's current
/// search/filter/sort state into the visible, ordered row set. The engine is
/// stateless: it only remembers which fields the free-text query searches,
/// and every call is a pure function of its arguments.
///
/// # Examples
///
/// ```
/// use attendview::{FilterPredicate, Record, SortSpec, TabularViewEngine};
///
/// let records = vec![
///     Record::new().with("id", "S1").with("name", "John Doe").with("rate", 92),
///     Record::new().with("id", "S2").with("name", "Jane Smith").with("rate", 68),
///     Record::new().with("id", "S3").with("name", "Aman Kumar").with("rate", 85),
/// ];
///
/// let engine = TabularViewEngine::new(["id", "name"]);
/// let view = engine.apply_view(
///     &records,
///     "",
///     &[FilterPredicate::at_least("rate", 75.0)],
///     Some(&SortSpec::descending("rate")),
/// );
///
/// assert_eq!(view.total_count, 3);
/// assert_eq!(view.filtered_count, 2);
/// assert_eq!(view.rows[0].id(), Some("S1"));
/// assert_eq!(view.rows[1].id(), Some("S3"));
/// ```

use crate::filter::FilterPredicate;
use crate::record::Record;
use crate::value::FieldValue;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

/// A sort field and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
    /// Place records without a value for `field` before the others instead
    /// of after them. Applies in both directions.
    #[serde(default)]
    pub missing_first: bool,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        SortSpec::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        SortSpec::new(field, SortDirection::Descending)
    }

    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec {
            field: field.into(),
            direction,
            missing_first: false,
        }
    }

    /// Column-header click: a second click on the field currently sorted
    /// ascending flips it to descending, anything else starts ascending.
    pub fn toggle(current: Option<&SortSpec>, field: &str) -> SortSpec {
        match current {
            Some(spec) if spec.field == field && spec.direction == SortDirection::Ascending => {
                SortSpec {
                    direction: SortDirection::Descending,
                    ..spec.clone()
                }
            }
            _ => SortSpec::ascending(field),
        }
    }

    /// The value a record sorts by. Null and NaN count as missing.
    fn key<'a>(&self, record: &'a Record) -> Option<&'a FieldValue> {
        record.get(&self.field).filter(|v| !v.is_null() && !v.is_nan())
    }

    /// Compare two records under this spec.
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let val_a = self.key(a);
        let val_b = self.key(b);

        match (val_a, val_b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => {
                if self.missing_first {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Some(_), None) => {
                if self.missing_first {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Some(x), Some(y)) => {
                let base = x.natural_cmp(y);
                match self.direction {
                    SortDirection::Ascending => base,
                    SortDirection::Descending => base.reverse(),
                }
            }
        }
    }
}

/// Result of applying a view to a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResult {
    /// Visible rows in display order
    pub rows: Vec<Record>,
    /// Size of the source collection
    pub total_count: usize,
    /// Rows that passed search and filters
    pub filtered_count: usize,
}

/// Computes filtered, sorted projections of record collections.
#[derive(Debug, Clone, Default)]
pub struct TabularViewEngine {
    searchable_fields: Vec<String>,
}

impl TabularViewEngine {
    pub fn new<I, S>(searchable_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TabularViewEngine {
            searchable_fields: searchable_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    /// True when `query` (already lower-cased) occurs in any searchable field.
    fn matches_query(&self, record: &Record, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.searchable_fields.iter().any(|field| {
            record
                .get(field)
                .and_then(FieldValue::search_text)
                .map_or(false, |text| text.contains(needle))
        })
    }

    /// Search, filter and sort `records`.
    ///
    /// The source slice is never modified; `rows` holds copies. A sort on a
    /// field that no surviving record carries keeps input order.
    pub fn apply_view(
        &self,
        records: &[Record],
        query: &str,
        predicates: &[FilterPredicate],
        sort: Option<&SortSpec>,
    ) -> ViewResult {
        let needle = query.to_lowercase();

        let mut rows: Vec<Record> = records
            .iter()
            .filter(|record| self.matches_query(record, &needle))
            .filter(|record| predicates.iter().all(|p| p.matches(record)))
            .cloned()
            .collect();
        let filtered_count = rows.len();

        if let Some(spec) = sort {
            if rows.iter().any(|r| spec.key(r).is_some()) {
                // slice::sort_by is stable, so ties keep input order in
                // both directions
                rows.sort_by(|a, b| spec.compare(a, b));
            } else if !rows.is_empty() {
                warn!("sort field '{}' not present in view; keeping input order", spec.field);
            }
        }

        debug!(
            "view: query={:?} predicates={} total={} filtered={}",
            query,
            predicates.len(),
            records.len(),
            filtered_count
        );

        ViewResult {
            rows,
            total_count: records.len(),
            filtered_count,
        }
    }
}

/// Distinct values of `field`, in first-seen order. Null and empty text are
/// skipped.
pub fn distinct_values(records: &[Record], field: &str) -> Vec<FieldValue> {
    let mut seen: Vec<FieldValue> = Vec::new();
    for value in records.iter().filter_map(|r| r.get(field)) {
        if value.is_null() || value.as_str() == Some("") {
            continue;
        }
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}
