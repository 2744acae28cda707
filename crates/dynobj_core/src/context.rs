//! Serializer context: the services the codec needs from its host.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::generic::to_bytes;
use crate::object_id::ObjectId;
use crate::record::Record;
use crate::registry::FieldNameRegistry;
use crate::resolver::TypeRegistry;
use crate::serializer::{ObjectSerializer, RecordMapped, RecordMappedSerializer};
use crate::value::Value;

/// Services the codec calls during encode and decode.
///
/// Field and type names are scoped by collection; collection names use the
/// global scope (`None`).
pub trait SerializerContext: Send + Sync {
    /// Codec configuration.
    fn config(&self) -> &CodecConfig;

    /// Returns the code for a name, allocating one if absent.
    fn field_code(&self, scope: Option<&str>, name: &str) -> CodecResult<u64>;

    /// Resolves a code back to a name.
    fn field_name(&self, scope: Option<&str>, code: u64) -> CodecResult<String>;

    /// Looks up the serializer registered for a type name.
    fn object_serializer(&self, type_name: &str) -> Option<Arc<dyn ObjectSerializer>>;

    /// Creates a fresh object id.
    fn create_guid(&self) -> ObjectId {
        ObjectId::new_random()
    }

    /// Persists a record that has no id yet and returns the id it was
    /// stored under.
    fn save_new_object(&self, record: &Record) -> CodecResult<ObjectId>;
}

/// An in-memory [`SerializerContext`].
///
/// Holds a field name registry, a type registry and a store of saved
/// objects, keyed by id, in their top-level encoded form.
#[derive(Debug, Default)]
pub struct MemoryContext {
    config: CodecConfig,
    names: FieldNameRegistry,
    types: TypeRegistry,
    objects: RwLock<IndexMap<ObjectId, Bytes>>,
    saves: AtomicU64,
}

impl MemoryContext {
    /// Creates a context with the given configuration.
    #[must_use]
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Registers the serializer for a record-mapped type.
    pub fn register<T: RecordMapped>(&self) {
        self.types
            .register(Arc::new(RecordMappedSerializer::<T>::new()));
    }

    /// Registers an arbitrary serializer under its type name.
    pub fn register_serializer(&self, serializer: Arc<dyn ObjectSerializer>) {
        self.types.register(serializer);
    }

    /// The field name registry.
    pub fn names(&self) -> &FieldNameRegistry {
        &self.names
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Encoded bytes of a saved object.
    pub fn load(&self, id: ObjectId) -> Option<Bytes> {
        self.objects.read().get(&id).cloned()
    }

    /// Number of objects currently stored.
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Number of times [`SerializerContext::save_new_object`] was called.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }
}

impl SerializerContext for MemoryContext {
    fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn field_code(&self, scope: Option<&str>, name: &str) -> CodecResult<u64> {
        Ok(self.names.code(scope, name))
    }

    fn field_name(&self, scope: Option<&str>, code: u64) -> CodecResult<String> {
        self.names
            .name(scope, code)
            .ok_or_else(|| CodecError::UnknownFieldCode {
                scope: scope.map(str::to_string),
                code,
            })
    }

    fn object_serializer(&self, type_name: &str) -> Option<Arc<dyn ObjectSerializer>> {
        self.types.resolve(type_name)
    }

    fn save_new_object(&self, record: &Record) -> CodecResult<ObjectId> {
        self.saves.fetch_add(1, Ordering::Relaxed);

        let id = self.create_guid();
        let mut record = record.clone();
        record.set_object_id(id);
        let bytes = to_bytes(self, &Value::Object(record))?;

        debug!(object_id = %id, size = bytes.len(), "saved new object");
        self.objects.write().insert(id, bytes);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::from_bytes;

    #[test]
    fn unknown_code_is_an_error() {
        let ctx = MemoryContext::default();
        let err = ctx.field_name(Some("People"), 7).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownFieldCode {
                scope: Some("People".into()),
                code: 7
            }
        );
    }

    #[test]
    fn field_codes_roundtrip() {
        let ctx = MemoryContext::default();
        let code = ctx.field_code(Some("People"), "Name").unwrap();
        assert_eq!(ctx.field_name(Some("People"), code).unwrap(), "Name");
        assert_eq!(ctx.names().len(), 1);
    }

    #[test]
    fn save_stores_encoded_object() {
        let ctx = MemoryContext::default();
        let record = Record::new().with("Name", "Alice");

        let id = ctx.save_new_object(&record).unwrap();
        assert!(!id.is_empty());
        assert_eq!(ctx.save_count(), 1);
        assert_eq!(ctx.object_count(), 1);

        let bytes = ctx.load(id).unwrap();
        let decoded = from_bytes(&ctx, &bytes).unwrap();
        let decoded = decoded.as_record().unwrap();
        assert_eq!(decoded.object_id(), id);
        assert_eq!(decoded.get("Name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn save_does_not_touch_the_input() {
        let ctx = MemoryContext::default();
        let record = Record::new().with("n", 1i32);
        ctx.save_new_object(&record).unwrap();
        assert!(!record.has_object_id());
    }
}
