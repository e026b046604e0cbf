//! attendview - tabular views over attendance records
//!
//! Search, filter, sort and aggregate in-memory record collections the way
//! the attendance dashboards and roster pages need them. The view engine is
//! pure and synchronous; data arrives through a `DataSource`, and an
//! optional actix-web server exposes views and attendance submission over
//! HTTP.

pub mod value;
pub mod record;
pub mod expr;
pub mod filter;
pub mod view;
pub mod aggregate;
pub mod attendance;
pub mod source;
pub mod preferences;
pub mod config;

pub use value::FieldValue;
pub use record::{Collection, Record, Schema};
pub use filter::FilterPredicate;
pub use view::{distinct_values, SortDirection, SortSpec, TabularViewEngine, ViewResult};
pub use aggregate::{compute_aggregates, AggregateSpec, AggregateValue, Aggregates};
pub use attendance::{AttendanceSubmission, AttendanceSummary, Roster, Standing};
pub use source::{CollectionKind, DataSource, InMemorySource, JsonDirSource, SourceError};
pub use preferences::{Preferences, Theme};

// HTTP server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_take_attendance_workflow() {
        let source = InMemorySource::demo().unwrap();
        let students = source.fetch(CollectionKind::Students).unwrap();
        let mut roster = Roster::new(students);

        // Faculty searches, filters to one department and marks the visible rows
        let engine = TabularViewEngine::new(CollectionKind::Students.searchable_fields().iter().copied());
        let department = FilterPredicate::equals("department", "Computer Science");
        let view = engine.apply_view(
            roster.students().records(),
            "",
            &[department],
            Some(&SortSpec::ascending("name")),
        );
        assert_eq!(view.total_count, 5);
        assert_eq!(view.filtered_count, 2);
        for row in &view.rows {
            roster.toggle(row.id().unwrap()).unwrap();
        }

        let summary = roster.summary();
        assert_eq!(summary.present, 2);
        assert_eq!(summary.absent, 3);
        assert_eq!(summary.percentage, 40.0);

        let submission = roster.submission("CS301", "2025-03-14");
        assert!(submission.validate(roster.students()).is_ok());
        assert_eq!(submission.present, ["IEC2022061", "IEC2022064"]);
    }

    #[test]
    fn test_student_dashboard_workflow() {
        let source = InMemorySource::demo().unwrap();
        let log = source.fetch(CollectionKind::AttendanceLog).unwrap();
        let courses = source.fetch(CollectionKind::Courses).unwrap();

        // Course dropdown
        let course_names = distinct_values(courses.records(), "courseName");
        assert_eq!(course_names.len(), 5);

        // Search box plus course selection
        let engine = TabularViewEngine::new(CollectionKind::AttendanceLog.searchable_fields().iter().copied());
        let view = engine.apply_view(
            log.records(),
            "2025-03-11",
            &[],
            Some(&SortSpec::descending("status")),
        );
        let statuses: Vec<_> = view
            .rows
            .iter()
            .filter_map(|r| r.get("status").and_then(FieldValue::as_str))
            .collect();
        assert_eq!(statuses, ["Late", "Absent"]);

        // Badges: the filtered breakdown next to the full-log summary
        let specs = [AggregateSpec::group_by("byStatus", "status")];
        let filtered = compute_aggregates(&view.rows, &specs);
        let everything = compute_aggregates(log.records(), &specs);
        let groups = filtered.get("byStatus").and_then(AggregateValue::as_groups).unwrap();
        assert_eq!(groups.iter().map(|(_, n)| n).sum::<usize>(), view.filtered_count);
        assert_eq!(
            everything.get("byStatus").and_then(AggregateValue::as_groups).unwrap()[0],
            (FieldValue::text("Present"), 3)
        );
        assert_eq!(AttendanceSummary::from_status(log.records()).present, 3);

        // Course standings
        let critical: Vec<_> = courses
            .records()
            .iter()
            .filter(|c| {
                c.get("attendanceRate")
                    .and_then(FieldValue::as_f64)
                    .map(Standing::from_rate)
                    == Some(Standing::Critical)
            })
            .filter_map(Record::id)
            .collect();
        assert_eq!(critical, ["CS304"]);
    }

    #[test]
    fn test_faculty_dashboard_low_attendance_filter() {
        let source = InMemorySource::demo().unwrap();
        let students = source.fetch(CollectionKind::Students).unwrap();
        let engine = TabularViewEngine::new(["id", "name"]);
        let low = FilterPredicate::parse("low", "attendanceRate < 75").unwrap();
        let view = engine.apply_view(students.records(), "", &[low], None);
        assert_eq!(view.filtered_count, 1);
        assert_eq!(view.rows[0].get("name").and_then(FieldValue::as_str), Some("Priya Sharma"));
    }
}
