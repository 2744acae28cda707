//! Generic records.

use indexmap::IndexMap;

use crate::object_id::ObjectId;
use crate::value::Value;

/// Pseudo-field holding the record's object id.
pub const OBJECT_ID_FIELD: &str = "ObjectId";

/// Pseudo-field holding the record's collection name.
pub const COLLECTION_NAME_FIELD: &str = "CollectionName";

/// Pseudo-field holding the record's concrete type name.
pub const TYPE_NAME_FIELD: &str = "TypeName";

/// Returns true for the three reserved pseudo-field names.
pub fn is_pseudo_field(name: &str) -> bool {
    matches!(
        name,
        OBJECT_ID_FIELD | COLLECTION_NAME_FIELD | TYPE_NAME_FIELD
    )
}

/// An ordered mapping from field name to value.
///
/// Insertion order is preserved, but equality ignores it. The pseudo-fields
/// `ObjectId`, `CollectionName` and `TypeName` live in the same map; their
/// accessors treat a missing or wrongly typed entry as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with room for `capacity` fields.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    /// Adds a field and returns the record, for building literals.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Looks up a field. Missing fields yield `None`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Looks up a field for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Sets a field, returning the previous value.
    ///
    /// Replacing an existing field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    /// Returns true if the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields, pseudo-fields included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over all fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the fields that are not pseudo-fields.
    pub fn data_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().filter(|(name, _)| !is_pseudo_field(name))
    }

    /// The record's object id, or [`ObjectId::EMPTY`].
    pub fn object_id(&self) -> ObjectId {
        match self.fields.get(OBJECT_ID_FIELD) {
            Some(Value::Guid(g)) => ObjectId::from_uuid(*g),
            _ => ObjectId::EMPTY,
        }
    }

    /// Returns true if the record carries a non-empty object id.
    pub fn has_object_id(&self) -> bool {
        !self.object_id().is_empty()
    }

    /// Assigns the object id.
    pub fn set_object_id(&mut self, id: ObjectId) {
        self.insert(OBJECT_ID_FIELD, id);
    }

    /// The record's collection name, if present and non-empty.
    pub fn collection_name(&self) -> Option<&str> {
        self.string_field(COLLECTION_NAME_FIELD)
    }

    /// Sets the collection name.
    pub fn set_collection_name(&mut self, name: impl Into<String>) {
        self.insert(COLLECTION_NAME_FIELD, Value::String(name.into()));
    }

    /// The record's type name, if present and non-empty.
    pub fn type_name(&self) -> Option<&str> {
        self.string_field(TYPE_NAME_FIELD)
    }

    /// Sets the type name.
    pub fn set_type_name(&mut self, name: impl Into<String>) {
        self.insert(TYPE_NAME_FIELD, Value::String(name.into()));
    }

    fn string_field(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn insertion_order_is_preserved() {
        let record = Record::new().with("b", 1i32).with("a", 2i32).with("c", 3i32);
        let names: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn equality_ignores_order() {
        let r1 = Record::new().with("a", 1i32).with("b", "x");
        let r2 = Record::new().with("b", "x").with("a", 1i32);
        assert_eq!(r1, r2);
        assert_ne!(r1, Record::new().with("a", 1i32));
    }

    #[test]
    fn remove_keeps_order() {
        let mut record = Record::new().with("a", 1i32).with("b", 2i32).with("c", 3i32);
        assert_eq!(record.remove("b"), Some(Value::Int32(2)));
        let names: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(record.remove("missing"), None);
    }

    #[test]
    fn pseudo_fields_default_to_empty() {
        let record = Record::new()
            .with(OBJECT_ID_FIELD, "not a guid")
            .with(COLLECTION_NAME_FIELD, 5i32)
            .with(TYPE_NAME_FIELD, "");
        assert_eq!(record.object_id(), ObjectId::EMPTY);
        assert!(!record.has_object_id());
        assert_eq!(record.collection_name(), None);
        assert_eq!(record.type_name(), None);
    }

    #[test]
    fn pseudo_field_accessors() {
        let id = ObjectId::from_uuid(Uuid::new_v4());
        let mut record = Record::new().with("Name", "Alice");
        record.set_object_id(id);
        record.set_collection_name("People");
        record.set_type_name("Person");
        assert_eq!(record.object_id(), id);
        assert!(record.has_object_id());
        assert_eq!(record.collection_name(), Some("People"));
        assert_eq!(record.type_name(), Some("Person"));
        let data: Vec<&str> = record.data_fields().map(|(k, _)| k).collect();
        assert_eq!(data, ["Name"]);
    }

    #[test]
    fn get_missing_field() {
        let record = Record::new().with("a", 1i32);
        assert_eq!(record.get("a"), Some(&Value::Int32(1)));
        assert_eq!(record.get("b"), None);
        assert!(record.contains("a"));
    }

    #[test]
    fn collect_from_pairs() {
        let record: Record = vec![("x", 1i32), ("y", 2i32)].into_iter().collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("y"), Some(&Value::Int32(2)));
    }
}
