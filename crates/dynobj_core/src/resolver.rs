//! Type resolver: maps type names to concrete serializers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::serializer::ObjectSerializer;

/// A registry of concrete object serializers, keyed by type name.
#[derive(Default)]
pub struct TypeRegistry {
    serializers: RwLock<HashMap<String, Arc<dyn ObjectSerializer>>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a serializer under its own type name.
    ///
    /// Returns the serializer previously registered under that name.
    pub fn register(&self, serializer: Arc<dyn ObjectSerializer>) -> Option<Arc<dyn ObjectSerializer>> {
        let name = serializer.type_name().to_string();
        self.register_as(name, serializer)
    }

    /// Registers a serializer under an explicit type name.
    pub fn register_as(
        &self,
        type_name: impl Into<String>,
        serializer: Arc<dyn ObjectSerializer>,
    ) -> Option<Arc<dyn ObjectSerializer>> {
        self.serializers.write().insert(type_name.into(), serializer)
    }

    /// Looks up the serializer for a type name.
    pub fn resolve(&self, type_name: &str) -> Option<Arc<dyn ObjectSerializer>> {
        self.serializers.read().get(type_name).cloned()
    }

    /// Returns true if a serializer is registered for the name.
    pub fn contains(&self, type_name: &str) -> bool {
        self.serializers.read().contains_key(type_name)
    }

    /// Number of registered type names.
    pub fn len(&self) -> usize {
        self.serializers.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let serializers = self.serializers.read();
        let mut names: Vec<&str> = serializers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::{GenericRecordCodec, GENERIC_TYPE_NAME};

    #[test]
    fn register_and_resolve() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register(Arc::new(GenericRecordCodec)).is_none());
        assert!(registry.contains(GENERIC_TYPE_NAME));
        assert!(registry.resolve(GENERIC_TYPE_NAME).unwrap().is_generic());
        assert!(registry.resolve("Missing").is_none());
    }

    #[test]
    fn register_as_alias() {
        let registry = TypeRegistry::new();
        registry.register_as("Bag", Arc::new(GenericRecordCodec));
        assert_eq!(registry.len(), 1);
        assert!(registry.register_as("Bag", Arc::new(GenericRecordCodec)).is_some());
        assert_eq!(format!("{registry:?}"), "TypeRegistry { types: [\"Bag\"] }");
    }
}
