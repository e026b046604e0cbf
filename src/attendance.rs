/// Attendance helpers built on the view engine
///
/// Covers the pieces every attendance page shared: the Good/Warning/Critical
/// banding of attendance rates, present/absent summaries, and the
/// take-attendance sheet a faculty member edits before submitting.

use crate::aggregate::{compute_aggregates, AggregateSpec, AggregateValue};
use crate::filter::FilterPredicate;
use crate::record::{Collection, Record};
use crate::value::FieldValue;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Boolean presence flag on take-attendance rows
pub const PRESENT_FIELD: &str = "present";
/// Categorical status on attendance-log rows
pub const STATUS_FIELD: &str = "status";

const GOOD_THRESHOLD: f64 = 85.0;
const WARNING_THRESHOLD: f64 = 75.0;

/// Attendance band for a rate in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Good,
    Warning,
    Critical,
}

impl Standing {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= GOOD_THRESHOLD {
            Standing::Good
        } else if rate >= WARNING_THRESHOLD {
            Standing::Warning
        } else {
            Standing::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Standing::Good => "Good",
            Standing::Warning => "Warning",
            Standing::Critical => "Critical",
        }
    }
}

/// Present/absent totals for a row set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    /// 0..=100, unrounded; 0 for an empty row set
    pub percentage: f64,
}

impl AttendanceSummary {
    /// Summary for rows that carry a boolean `present` flag.
    pub fn from_flags(rows: &[Record]) -> Self {
        Self::summarize(rows, FilterPredicate::equals(PRESENT_FIELD, true))
    }

    /// Summary for attendance-log rows with a `status` category; only
    /// "Present" counts as present.
    pub fn from_status(rows: &[Record]) -> Self {
        Self::summarize(rows, FilterPredicate::equals(STATUS_FIELD, "Present"))
    }

    fn summarize(rows: &[Record], present: FilterPredicate) -> Self {
        let aggs = compute_aggregates(
            rows,
            &[
                AggregateSpec::count("present", present.clone()),
                AggregateSpec::percentage("percentage", present),
            ],
        );
        let present = aggs.get("present").and_then(AggregateValue::as_count).unwrap_or(0);
        let percentage = aggs.get("percentage").and_then(AggregateValue::as_number).unwrap_or(0.0);
        AttendanceSummary {
            total: rows.len(),
            present,
            absent: rows.len() - present,
            percentage,
        }
    }
}

/// The take-attendance sheet: a student collection whose `present` flags
/// are edited in place before submission.
#[derive(Debug, Clone)]
pub struct Roster {
    students: Collection,
}

impl Roster {
    /// Wraps a student collection. Students without a boolean `present`
    /// flag start absent.
    pub fn new(mut students: Collection) -> Self {
        for record in students.records_mut() {
            if record.get(PRESENT_FIELD).and_then(FieldValue::as_bool).is_none() {
                record.set(PRESENT_FIELD, false);
            }
        }
        Roster { students }
    }

    pub fn students(&self) -> &Collection {
        &self.students
    }

    pub fn is_present(&self, id: &str) -> Option<bool> {
        self.students
            .get_by_id(id)
            .and_then(|r| r.get(PRESENT_FIELD))
            .and_then(FieldValue::as_bool)
    }

    /// Flip one student's flag, returning the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool, String> {
        let record = self
            .students
            .get_by_id_mut(id)
            .ok_or_else(|| format!("Unknown student '{}'", id))?;
        let now = !record.get(PRESENT_FIELD).and_then(FieldValue::as_bool).unwrap_or(false);
        record.set(PRESENT_FIELD, now);
        debug!("roster: {} -> present={}", id, now);
        Ok(now)
    }

    pub fn mark_all(&mut self, present: bool) {
        for record in self.students.records_mut() {
            record.set(PRESENT_FIELD, present);
        }
        debug!("roster: marked all {} students present={}", self.students.len(), present);
    }

    pub fn present_ids(&self) -> Vec<String> {
        self.ids_where(true)
    }

    pub fn absent_ids(&self) -> Vec<String> {
        self.ids_where(false)
    }

    fn ids_where(&self, present: bool) -> Vec<String> {
        self.students
            .records()
            .iter()
            .filter(|r| r.get(PRESENT_FIELD).and_then(FieldValue::as_bool) == Some(present))
            .filter_map(|r| r.id().map(str::to_string))
            .collect()
    }

    pub fn summary(&self) -> AttendanceSummary {
        AttendanceSummary::from_flags(self.students.records())
    }

    /// Snapshot the sheet for submission.
    pub fn submission(&self, course: impl Into<String>, date: impl Into<String>) -> AttendanceSubmission {
        AttendanceSubmission {
            course: course.into(),
            date: date.into(),
            present: self.present_ids(),
            absent: self.absent_ids(),
        }
    }
}

/// Attendance for one class session, as sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSubmission {
    pub course: String,
    pub date: String,
    pub present: Vec<String>,
    pub absent: Vec<String>,
}

impl AttendanceSubmission {
    /// Checks the submission against the student collection: every student
    /// listed exactly once, no unknown ids, course and date filled in.
    pub fn validate(&self, students: &Collection) -> Result<(), String> {
        if self.course.trim().is_empty() {
            return Err("Course is required".to_string());
        }
        if self.date.trim().is_empty() {
            return Err("Date is required".to_string());
        }

        let mut seen = HashSet::new();
        for id in self.present.iter().chain(&self.absent) {
            if students.get_by_id(id).is_none() {
                return Err(format!("Unknown student '{}'", id));
            }
            if !seen.insert(id.as_str()) {
                return Err(format!("Student '{}' listed more than once", id));
            }
        }

        if seen.len() != students.len() {
            return Err(format!(
                "Submission covers {} of {} students",
                seen.len(),
                students.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn students() -> Collection {
        Collection::from_records(
            "students",
            vec![
                Record::new().with("id", "IEC2022061").with("name", "John Doe"),
                Record::new().with("id", "IEC2022062").with("name", "Jane Smith").with("present", true),
                Record::new().with("id", "IEC2022063").with("name", "Aman Kumar"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_standing_bands() {
        assert_eq!(Standing::from_rate(92.0), Standing::Good);
        assert_eq!(Standing::from_rate(85.0), Standing::Good);
        assert_eq!(Standing::from_rate(84.9), Standing::Warning);
        assert_eq!(Standing::from_rate(75.0), Standing::Warning);
        assert_eq!(Standing::from_rate(68.0), Standing::Critical);
        assert_eq!(Standing::Critical.label(), "Critical");
    }

    #[test]
    fn test_summary_from_status() {
        let rows: Vec<Record> = ["Present", "Absent", "Late", "Present"]
            .iter()
            .enumerate()
            .map(|(i, s)| Record::new().with("id", i.to_string()).with("status", *s))
            .collect();
        let s = AttendanceSummary::from_status(&rows);
        assert_eq!(s.total, 4);
        assert_eq!(s.present, 2);
        assert_eq!(s.absent, 2);
        assert_eq!(s.percentage, 50.0);

        let empty = AttendanceSummary::from_status(&[]);
        assert_eq!(empty.percentage, 0.0);
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn test_roster_defaults_and_toggle() {
        let mut roster = Roster::new(students());
        assert_eq!(roster.is_present("IEC2022061"), Some(false));
        assert_eq!(roster.is_present("IEC2022062"), Some(true));

        assert_eq!(roster.toggle("IEC2022061"), Ok(true));
        assert_eq!(roster.toggle("IEC2022062"), Ok(false));
        assert!(roster.toggle("nobody").is_err());
        assert_eq!(roster.present_ids(), ["IEC2022061"]);
        assert_eq!(roster.absent_ids(), ["IEC2022062", "IEC2022063"]);
    }

    #[test]
    fn test_mark_all_and_summary() {
        let mut roster = Roster::new(students());
        roster.mark_all(true);
        let s = roster.summary();
        assert_eq!((s.total, s.present, s.absent), (3, 3, 0));
        assert_eq!(s.percentage, 100.0);

        roster.mark_all(false);
        assert_eq!(roster.summary().present, 0);
        assert!(roster.present_ids().is_empty());
    }

    #[test]
    fn test_submission_validation() {
        let mut roster = Roster::new(students());
        roster.toggle("IEC2022063").unwrap();
        let submission = roster.submission("CS301", "2025-03-14");
        assert_eq!(submission.present, ["IEC2022062", "IEC2022063"]);
        assert!(submission.validate(roster.students()).is_ok());

        let mut missing = submission.clone();
        missing.absent.clear();
        assert!(missing.validate(roster.students()).unwrap_err().contains("covers 2 of 3"));

        let mut twice = submission.clone();
        twice.absent.push("IEC2022062".to_string());
        assert!(twice.validate(roster.students()).unwrap_err().contains("more than once"));

        let mut unknown = submission.clone();
        unknown.present.push("X".to_string());
        assert!(unknown.validate(roster.students()).unwrap_err().contains("Unknown student"));

        let mut no_course = submission;
        no_course.course = " ".to_string();
        assert!(no_course.validate(roster.students()).is_err());
    }
}
