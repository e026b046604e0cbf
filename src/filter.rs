/// Named filter predicates
///
/// A FilterPredicate is a named boolean test over a record. Predicates
/// passed to the view engine combine with logical AND. Any predicate that
/// reads a field the record does not carry evaluates false.

use crate::expr::{eval_expr, parse_expr, Expr};
use crate::record::Record;
use crate::value::FieldValue;
use std::fmt;
use std::sync::Arc;

type Test = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct FilterPredicate {
    name: String,
    test: Test,
}

impl FilterPredicate {
    pub fn new<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        FilterPredicate {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// `field == value`, using the natural ordering so 90 and 90.0 match.
    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let field = field.into();
        let value = value.into();
        let name = format!("{} == {}", field, value);
        FilterPredicate::new(name, move |record| {
            record
                .get(&field)
                .map_or(false, |v| !v.is_null() && v.natural_cmp(&value).is_eq())
        })
    }

    /// `field < bound` for numeric fields
    pub fn less_than(field: impl Into<String>, bound: f64) -> Self {
        let field = field.into();
        let name = format!("{} < {}", field, bound);
        FilterPredicate::new(name, move |record| {
            record
                .get(&field)
                .and_then(FieldValue::as_f64)
                .map_or(false, |v| v < bound)
        })
    }

    /// `field >= bound` for numeric fields
    pub fn at_least(field: impl Into<String>, bound: f64) -> Self {
        let field = field.into();
        let name = format!("{} >= {}", field, bound);
        FilterPredicate::new(name, move |record| {
            record
                .get(&field)
                .and_then(FieldValue::as_f64)
                .map_or(false, |v| v >= bound)
        })
    }

    /// Compile a textual expression such as `attendanceRate < 75`.
    pub fn parse(name: impl Into<String>, expression: &str) -> Result<Self, String> {
        let expr = parse_expr(expression)?;
        Ok(FilterPredicate::from_expr(name, expr))
    }

    pub fn from_expr(name: impl Into<String>, expr: Expr) -> Self {
        FilterPredicate::new(name, move |record| eval_expr(&expr, record))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, record: &Record) -> bool {
        (self.test)(record)
    }
}

impl fmt::Debug for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPredicate").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals() {
        let p = FilterPredicate::equals("department", "Computer Science");
        assert_eq!(p.name(), "department == Computer Science");
        assert!(p.matches(&Record::new().with("department", "Computer Science")));
        assert!(!p.matches(&Record::new().with("department", "Electronics")));
        assert!(!p.matches(&Record::new().with("name", "No Department")));

        let rate = FilterPredicate::equals("rate", 90);
        assert!(rate.matches(&Record::new().with("rate", 90.0)));
    }

    #[test]
    fn test_numeric_bounds() {
        let low = FilterPredicate::less_than("attendanceRate", 75.0);
        let ok = FilterPredicate::at_least("attendanceRate", 75.0);
        let r = Record::new().with("attendanceRate", 68);
        assert!(low.matches(&r));
        assert!(!ok.matches(&r));
        let text = Record::new().with("attendanceRate", "68");
        assert!(!low.matches(&text));
        assert!(!ok.matches(&Record::new()));
    }

    #[test]
    fn test_parse() {
        let p = FilterPredicate::parse("critical", "attendanceRate < 75 AND present == false").unwrap();
        assert_eq!(p.name(), "critical");
        assert!(p.matches(&Record::new().with("attendanceRate", 70).with("present", false)));
        assert!(FilterPredicate::parse("bad", "attendanceRate <").is_err());
    }
}
