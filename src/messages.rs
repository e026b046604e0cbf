/// HTTP request and response bodies
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateSpec, Aggregates};
use crate::filter::FilterPredicate;
use crate::record::Record;
use crate::view::SortSpec;

/// Body of `POST /api/collections/{kind}/view`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub query: String,
    /// Overrides the kind's default searchable fields
    #[serde(default)]
    pub searchable_fields: Option<Vec<String>>,
    /// Filter expressions, ANDed together
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub aggregates: Vec<AggregateRequest>,
}

impl ViewRequest {
    pub fn predicates(&self) -> Result<Vec<FilterPredicate>, String> {
        self.filters
            .iter()
            .map(|expr| {
                FilterPredicate::parse(expr.clone(), expr)
                    .map_err(|e| format!("filter '{}': {}", expr, e))
            })
            .collect()
    }

    pub fn aggregate_specs(&self) -> Result<Vec<AggregateSpec>, String> {
        self.aggregates.iter().map(AggregateRequest::to_spec).collect()
    }
}

/// Aggregate as sent over the wire; predicates are filter expressions.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateRequest {
    Count { name: String, filter: String },
    Percentage { name: String, filter: String },
    Sum { name: String, field: String },
    Average { name: String, field: String },
    GroupBy { name: String, field: String },
}

impl AggregateRequest {
    pub fn to_spec(&self) -> Result<AggregateSpec, String> {
        fn compile(name: &str, filter: &str) -> Result<FilterPredicate, String> {
            FilterPredicate::parse(name, filter).map_err(|e| format!("aggregate '{}': {}", name, e))
        }

        Ok(match self {
            AggregateRequest::Count { name, filter } => {
                AggregateSpec::count(name.clone(), compile(name, filter)?)
            }
            AggregateRequest::Percentage { name, filter } => {
                AggregateSpec::percentage(name.clone(), compile(name, filter)?)
            }
            AggregateRequest::Sum { name, field } => AggregateSpec::sum(name.clone(), field.clone()),
            AggregateRequest::Average { name, field } => {
                AggregateSpec::average(name.clone(), field.clone())
            }
            AggregateRequest::GroupBy { name, field } => {
                AggregateSpec::group_by(name.clone(), field.clone())
            }
        })
    }
}

/// Response of a view request
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub rows: Vec<Record>,
    pub total_count: usize,
    pub filtered_count: usize,
    /// Aggregates over the filtered rows
    pub aggregates: Aggregates,
    /// The same aggregates over the whole collection
    pub population: Aggregates,
}

/// Full collection
#[derive(Debug, Serialize)]
pub struct CollectionBody {
    pub name: String,
    pub fields: Vec<String>,
    pub rows: Vec<Record>,
}

/// Acknowledgement of a stored attendance submission
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SubmissionReceipt {
    pub course: String,
    pub date: String,
    pub present: usize,
    pub absent: usize,
    pub percentage: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody { error: error.into() }
    }
}
