//! Field name registry.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Bidirectional mapping between names and small integer codes.
///
/// Entries are keyed by `(scope, name)`, where a `None` scope is global
/// (type and collection names) and `Some(collection)` scopes field names.
/// Codes are allocated lazily, start at 1 and are never changed or
/// reused; `0` stays reserved as the field-list terminator.
///
/// # Thread Safety
///
/// Concurrent requests for the same unknown name converge on one code.
#[derive(Debug, Default)]
pub struct FieldNameRegistry {
    state: RwLock<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    codes: HashMap<(Option<String>, String), u64>,
    names: HashMap<(Option<String>, u64), String>,
    last_code: u64,
}

impl FieldNameRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for a name, allocating one if absent.
    pub fn code(&self, scope: Option<&str>, name: &str) -> u64 {
        let key = (scope.map(str::to_string), name.to_string());
        if let Some(code) = self.state.read().codes.get(&key) {
            return *code;
        }

        let mut state = self.state.write();
        // Another writer may have allocated while we waited for the lock.
        if let Some(code) = state.codes.get(&key) {
            return *code;
        }
        state.last_code += 1;
        let code = state.last_code;
        state.names.insert((key.0.clone(), code), key.1.clone());
        state.codes.insert(key, code);
        code
    }

    /// Resolves a code back to its name.
    pub fn name(&self, scope: Option<&str>, code: u64) -> Option<String> {
        self.state
            .read()
            .names
            .get(&(scope.map(str::to_string), code))
            .cloned()
    }

    /// Number of registered names across all scopes.
    pub fn len(&self) -> usize {
        self.state.read().codes.len()
    }

    /// Returns true if no names have been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn codes_start_at_one() {
        let registry = FieldNameRegistry::new();
        assert_eq!(registry.code(None, "Things"), 1);
        assert_eq!(registry.code(Some("Things"), "Name"), 2);
    }

    #[test]
    fn codes_are_stable() {
        let registry = FieldNameRegistry::new();
        let a = registry.code(Some("C"), "a");
        let b = registry.code(Some("C"), "b");
        assert_ne!(a, b);
        assert_eq!(registry.code(Some("C"), "a"), a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn scopes_are_separate() {
        let registry = FieldNameRegistry::new();
        let global = registry.code(None, "Name");
        let scoped = registry.code(Some("People"), "Name");
        assert_ne!(global, scoped);
        assert_eq!(registry.name(None, global).as_deref(), Some("Name"));
        assert_eq!(registry.name(Some("People"), scoped).as_deref(), Some("Name"));
        assert_eq!(registry.name(Some("Other"), scoped), None);
    }

    #[test]
    fn unknown_code() {
        let registry = FieldNameRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.name(None, 0), None);
        assert_eq!(registry.name(None, 99), None);
    }

    #[test]
    fn concurrent_allocation_converges() {
        let registry = Arc::new(FieldNameRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    (0..50)
                        .map(|i| registry.code(Some("C"), &format!("f{i}")))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let results: Vec<Vec<u64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results[1..] {
            assert_eq!(r, &results[0]);
        }
        let unique: HashSet<u64> = results[0].iter().copied().collect();
        assert_eq!(unique.len(), 50);
        assert!(!unique.contains(&0));
    }
}
