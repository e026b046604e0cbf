/// Records and collections
///
/// A Record is an ordered mapping from field name to value. A Collection is
/// a named sequence of records sharing one schema, keyed by the text `id`
/// field.
///
/// # Examples
///
/// ```
/// use attendview::{Collection, Record};
///
/// let mut students = Collection::new("students");
/// students.push(
///     Record::new()
///         .with("id", "IEC2022061")
///         .with("name", "John Doe")
///         .with("attendanceRate", 92),
/// ).unwrap();
///
/// assert_eq!(students.len(), 1);
/// assert_eq!(students.schema().field_names(), ["id", "name", "attendanceRate"]);
/// assert_eq!(students.get_by_id("IEC2022061").unwrap().get("name").unwrap().as_str(), Some("John Doe"));
/// ```

use crate::value::FieldValue;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Name of the identity field
pub const ID_FIELD: &str = "id";

/// One row of domain data. Field order is insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    /// Builder form of `set`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The `id` field, when it holds text.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD).and_then(FieldValue::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of scalar fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut record = Record::new();
        while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
            record.set(name, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Field names shared by the records of a collection, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|s| s.as_str()).collect()
    }

    pub fn get_field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    fn absorb(&mut self, record: &Record) {
        for (name, _) in record.fields() {
            if self.get_field_index(name).is_none() {
                self.fields.push(name.to_string());
            }
        }
    }
}

/// A named collection of records with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    name: String,
    schema: Schema,
    records: Vec<Record>,
    ids: HashSet<String>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            name: name.into(),
            schema: Schema::default(),
            records: Vec::new(),
            ids: HashSet::new(),
        }
    }

    pub fn from_records(name: impl Into<String>, records: Vec<Record>) -> Result<Self, String> {
        let mut collection = Collection::new(name);
        for record in records {
            collection.push(record)?;
        }
        Ok(collection)
    }

    /// Appends a record. Fails when the record has no text `id` or the id
    /// is already taken.
    pub fn push(&mut self, record: Record) -> Result<(), String> {
        let id = match record.id() {
            Some(id) => id.to_string(),
            None => {
                return Err(format!(
                    "Record in '{}' has no text '{}' field",
                    self.name, ID_FIELD
                ))
            }
        };
        if !self.ids.insert(id.clone()) {
            return Err(format!("Duplicate id '{}' in '{}'", id, self.name));
        }
        self.schema.absorb(&record);
        self.records.push(record);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    /// Mutable access by id. The `id` field itself must not be rewritten
    /// through this handle.
    pub fn get_by_id_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id() == Some(id))
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.records.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut record = Record::new().with("id", "S1").with("present", false);
        record.set("present", true);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("present"), Some(&FieldValue::Bool(true)));
        let names: Vec<&str> = record.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["id", "present"]);
    }

    #[test]
    fn test_collection_rejects_missing_and_duplicate_ids() {
        let mut c = Collection::new("students");
        assert!(c.push(Record::new().with("name", "Nobody")).is_err());
        assert!(c.push(Record::new().with("id", 7)).is_err());
        c.push(Record::new().with("id", "S1")).unwrap();
        let err = c.push(Record::new().with("id", "S1")).unwrap_err();
        assert!(err.contains("Duplicate id 'S1'"));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_schema_is_union_in_first_seen_order() {
        let c = Collection::from_records(
            "students",
            vec![
                Record::new().with("id", "S1").with("name", "A"),
                Record::new().with("id", "S2").with("department", "ECE").with("name", "B"),
            ],
        )
        .unwrap();
        assert_eq!(c.schema().field_names(), ["id", "name", "department"]);
        assert_eq!(c.schema().get_field_index("department"), Some(2));
    }

    #[test]
    fn test_record_json_keeps_field_order() {
        let record: Record =
            serde_json::from_str(r#"{"id":"CS301","courseName":"Data Structures","attendanceRate":92}"#)
                .unwrap();
        let names: Vec<&str> = record.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["id", "courseName", "attendanceRate"]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":"CS301","courseName":"Data Structures","attendanceRate":92}"#
        );
    }

    #[test]
    fn test_record_json_rejects_nested_values() {
        assert!(serde_json::from_str::<Record>(r#"{"id":"S1","tags":["a"]}"#).is_err());
    }
}
