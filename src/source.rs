/// Data access
///
/// Pages never hold record literals; they ask a DataSource for a collection
/// by kind. `JsonDirSource` reads `<dir>/<kind>.json`, a JSON array of flat
/// objects. `InMemorySource` serves collections registered up front and
/// ships the demo fixtures.

use crate::record::{Collection, Record};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The collections the application pages read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Students,
    AttendanceLog,
    Assignments,
    Courses,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Students,
        CollectionKind::AttendanceLog,
        CollectionKind::Assignments,
        CollectionKind::Courses,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Students => "students",
            CollectionKind::AttendanceLog => "attendance_log",
            CollectionKind::Assignments => "assignments",
            CollectionKind::Courses => "courses",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        CollectionKind::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Fields the free-text search box looks at for this kind
    pub fn searchable_fields(self) -> &'static [&'static str] {
        match self {
            CollectionKind::Students => &["id", "name", "email", "department"],
            CollectionKind::AttendanceLog => &["courseName", "date", "status"],
            CollectionKind::Assignments => &["courseName", "title", "status"],
            CollectionKind::Courses => &["courseId", "courseName", "professorName"],
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum SourceError {
    NotFound(CollectionKind),
    Io { path: PathBuf, source: std::io::Error },
    Parse { kind: CollectionKind, source: serde_json::Error },
    Invalid { kind: CollectionKind, message: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NotFound(kind) => write!(f, "collection '{}' not found", kind),
            SourceError::Io { path, source } => write!(f, "reading {}: {}", path.display(), source),
            SourceError::Parse { kind, source } => write!(f, "parsing '{}': {}", kind, source),
            SourceError::Invalid { kind, message } => write!(f, "invalid '{}': {}", kind, message),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io { source, .. } => Some(source),
            SourceError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Supplies record collections by kind.
pub trait DataSource: Send + Sync {
    fn fetch(&self, kind: CollectionKind) -> Result<Collection, SourceError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    collections: HashMap<CollectionKind, Collection>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: CollectionKind, collection: Collection) {
        self.collections.insert(kind, collection);
    }

    pub fn with(mut self, kind: CollectionKind, collection: Collection) -> Self {
        self.insert(kind, collection);
        self
    }

    /// Small demo data set covering every collection kind.
    pub fn demo() -> Result<Self, SourceError> {
        let mut source = InMemorySource::new();
        for kind in CollectionKind::ALL {
            source.insert(kind, parse_collection(kind, demo_json(kind))?);
        }
        Ok(source)
    }
}

impl DataSource for InMemorySource {
    fn fetch(&self, kind: CollectionKind) -> Result<Collection, SourceError> {
        self.collections
            .get(&kind)
            .cloned()
            .ok_or(SourceError::NotFound(kind))
    }
}

/// Reads `<dir>/<kind>.json` on every fetch.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonDirSource { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, kind: CollectionKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.as_str()))
    }
}

impl DataSource for JsonDirSource {
    fn fetch(&self, kind: CollectionKind) -> Result<Collection, SourceError> {
        let path = self.path_for(kind);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(kind))
            }
            Err(source) => return Err(SourceError::Io { path, source }),
        };
        debug!("loaded {} bytes from {}", text.len(), path.display());
        parse_collection(kind, &text)
    }
}

/// Decode a JSON array of records into a collection of the given kind.
pub fn parse_collection(kind: CollectionKind, json: &str) -> Result<Collection, SourceError> {
    let records: Vec<Record> =
        serde_json::from_str(json).map_err(|source| SourceError::Parse { kind, source })?;
    Collection::from_records(kind.as_str(), records)
        .map_err(|message| SourceError::Invalid { kind, message })
}

fn demo_json(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Students => {
            r#"[
  {"id": "IEC2022061", "name": "John Doe", "present": false, "department": "Computer Science", "rollNumber": "CS-001", "email": "john.doe@example.com", "attendanceRate": 92},
  {"id": "IEC2022062", "name": "Jane Smith", "present": false, "department": "Information Technology", "rollNumber": "IT-045", "email": "jane.smith@example.com", "attendanceRate": 85},
  {"id": "IEC2022063", "name": "Aman Kumar", "present": false, "department": "Electronics", "rollNumber": "EC-012", "email": "aman.kumar@example.com", "attendanceRate": 76},
  {"id": "IEC2022064", "name": "Priya Sharma", "present": false, "department": "Computer Science", "rollNumber": "CS-017", "email": "priya.sharma@example.com", "attendanceRate": 68},
  {"id": "IEC2022065", "name": "Rahul Verma", "present": false, "department": "Mechanical", "rollNumber": "ME-008", "attendanceRate": 88}
]"#
        }
        CollectionKind::AttendanceLog => {
            r#"[
  {"id": "ATT001", "date": "2025-03-10", "courseId": "CS301", "courseName": "Data Structures", "status": "Present", "time": "09:30 AM"},
  {"id": "ATT002", "date": "2025-03-10", "courseId": "CS302", "courseName": "Algorithms", "status": "Present", "time": "11:00 AM"},
  {"id": "ATT003", "date": "2025-03-11", "courseId": "CS303", "courseName": "Database Systems", "status": "Absent", "time": "02:15 PM"},
  {"id": "ATT004", "date": "2025-03-11", "courseId": "CS304", "courseName": "Web Development", "status": "Late", "time": "04:30 PM"},
  {"id": "ATT005", "date": "2025-03-12", "courseId": "CS305", "courseName": "Computer Networks", "status": "Present", "time": "10:00 AM"}
]"#
        }
        CollectionKind::Assignments => {
            r#"[
  {"id": "ASG001", "courseId": "CS301", "courseName": "Data Structures", "title": "Binary Trees", "dueDate": "2025-03-20", "status": "Upcoming"},
  {"id": "ASG002", "courseId": "CS302", "courseName": "Algorithms", "title": "Dynamic Programming", "dueDate": "2025-03-05", "status": "Submitted", "score": 92},
  {"id": "ASG003", "courseId": "CS303", "courseName": "Database Systems", "title": "Normalization", "dueDate": "2025-03-01", "status": "Late", "score": 70},
  {"id": "ASG004", "courseId": "CS304", "courseName": "Web Development", "title": "REST API", "dueDate": "2025-02-25", "status": "Missed"}
]"#
        }
        CollectionKind::Courses => {
            r#"[
  {"id": "CS301", "courseId": "CS301", "courseName": "Data Structures", "attendanceRate": 92, "attendedClasses": 23, "totalClasses": 25, "status": "Good", "professorName": "Dr. Emily Wilson"},
  {"id": "CS302", "courseId": "CS302", "courseName": "Algorithms", "attendanceRate": 88, "attendedClasses": 22, "totalClasses": 25, "status": "Good", "professorName": "Dr. James Peterson"},
  {"id": "CS303", "courseId": "CS303", "courseName": "Database Systems", "attendanceRate": 76, "attendedClasses": 19, "totalClasses": 25, "status": "Warning", "professorName": "Dr. Sarah Johnson"},
  {"id": "CS304", "courseId": "CS304", "courseName": "Web Development", "attendanceRate": 68, "attendedClasses": 17, "totalClasses": 25, "status": "Critical", "professorName": "Prof. Michael Brown"},
  {"id": "CS305", "courseId": "CS305", "courseName": "Computer Networks", "attendanceRate": 84, "attendedClasses": 21, "totalClasses": 25, "status": "Good", "professorName": "Dr. Robert Clark"}
]"#
        }
    }
}
