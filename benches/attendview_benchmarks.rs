use attendview::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const DEPARTMENTS: [&str; 4] = [
    "Computer Science",
    "Information Technology",
    "Electronics",
    "Mechanical",
];

fn roster(size: usize) -> Vec<Record> {
    (0..size)
        .map(|i| {
            Record::new()
                .with("id", format!("IEC{:07}", i))
                .with("name", format!("Student {}", i))
                .with("department", DEPARTMENTS[i % DEPARTMENTS.len()])
                .with("attendanceRate", ((i * 37) % 100) as i64)
                .with("present", i % 3 != 0)
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_view_search");
    let engine = TabularViewEngine::new(["id", "name", "department"]);

    for size in [100, 1000, 10000].iter() {
        let records = roster(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| engine.apply_view(black_box(&records), black_box("science"), &[], None));
        });
    }
    group.finish();
}

fn bench_filter_and_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_view_filter_sort");
    let engine = TabularViewEngine::new(["name"]);
    let predicates = [
        FilterPredicate::less_than("attendanceRate", 75.0),
        FilterPredicate::equals("present", true),
    ];
    let sort = SortSpec::descending("attendanceRate");

    for size in [100, 1000, 10000].iter() {
        let records = roster(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| engine.apply_view(black_box(&records), "", &predicates, Some(&sort)));
        });
    }
    group.finish();
}

fn bench_expression_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_view_expression");
    let engine = TabularViewEngine::default();
    let predicate = FilterPredicate::parse(
        "critical",
        "attendanceRate < 75 AND (department == 'Electronics' OR department == 'Mechanical')",
    )
    .unwrap();
    let predicates = [predicate];

    for size in [100, 1000, 10000].iter() {
        let records = roster(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| engine.apply_view(black_box(&records), "", &predicates, None));
        });
    }
    group.finish();
}

fn bench_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_aggregates");
    let specs = [
        AggregateSpec::count("present", FilterPredicate::equals("present", true)),
        AggregateSpec::percentage("low", FilterPredicate::less_than("attendanceRate", 75.0)),
        AggregateSpec::average("meanRate", "attendanceRate"),
        AggregateSpec::group_by("byDepartment", "department"),
    ];

    for size in [100, 1000, 10000].iter() {
        let records = roster(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| compute_aggregates(black_box(&records), &specs));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_search,
    bench_filter_and_sort,
    bench_expression_filter,
    bench_aggregates
);
criterion_main!(benches);
