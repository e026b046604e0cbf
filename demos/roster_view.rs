/// Roster View Example
///
/// This example demonstrates:
/// - Loading the demo student collection from a DataSource
/// - Searching, filtering and sorting with TabularViewEngine
/// - Computing filtered and whole-roster aggregates
/// - Taking attendance with a Roster

use attendview::{
    compute_aggregates, distinct_values, AggregateSpec, AggregateValue, CollectionKind,
    DataSource, FieldValue, FilterPredicate, InMemorySource, Roster, SortSpec, Standing,
    TabularViewEngine,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== attendview Roster Example ===\n");

    // 1. Load students
    let source = InMemorySource::demo()?;
    let students = source.fetch(CollectionKind::Students)?;
    println!("1. Loaded {} students\n", students.len());

    // 2. Department dropdown
    println!("2. Departments:");
    for dept in distinct_values(students.records(), "department") {
        println!("      - {}", dept);
    }
    println!();

    // 3. Search + filter + sort
    let engine = TabularViewEngine::new(CollectionKind::Students.searchable_fields().iter().copied());
    let filters = [FilterPredicate::parse("eligible", "attendanceRate >= 75")?];
    let sort = SortSpec::descending("attendanceRate");
    let view = engine.apply_view(students.records(), "", &filters, Some(&sort));

    println!(
        "3. Showing {} of {} students (attendanceRate >= 75, highest first)",
        view.filtered_count, view.total_count
    );
    for row in &view.rows {
        let rate = row.get("attendanceRate").and_then(FieldValue::as_f64).unwrap_or(0.0);
        println!(
            "      {:<14} {:<14} {:>5.1}%  {}",
            row.id().unwrap_or("?"),
            row.get("name").map(|v| v.to_string()).unwrap_or_default(),
            rate,
            Standing::from_rate(rate).label()
        );
    }
    println!();

    // 4. Aggregates over the view and over the whole roster
    let specs = [
        AggregateSpec::average("meanRate", "attendanceRate"),
        AggregateSpec::group_by("byDepartment", "department"),
    ];
    let filtered = compute_aggregates(&view.rows, &specs);
    let population = compute_aggregates(students.records(), &specs);
    println!("4. Mean attendance:");
    println!(
        "      filtered: {:.2}%",
        filtered.get("meanRate").and_then(AggregateValue::as_number).unwrap_or(0.0)
    );
    println!(
        "      roster:   {:.2}%",
        population.get("meanRate").and_then(AggregateValue::as_number).unwrap_or(0.0)
    );
    if let Some(groups) = population.get("byDepartment").and_then(AggregateValue::as_groups) {
        for (dept, count) in groups {
            println!("      {}: {}", dept, count);
        }
    }
    println!();

    // 5. Take attendance
    let mut roster = Roster::new(students);
    roster.mark_all(true);
    roster.toggle("IEC2022064")?;
    let summary = roster.summary();
    println!(
        "5. Attendance: {} present, {} absent ({:.1}%)",
        summary.present, summary.absent, summary.percentage
    );

    let submission = roster.submission("CS301", "2025-03-14");
    submission.validate(roster.students())?;
    println!("   Submission: {}", serde_json::to_string(&submission)?);

    println!("\n=== Example Complete ===");
    Ok(())
}
