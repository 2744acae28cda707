//! Stress tests for the object codec.
//!
//! These helpers exercise a shared context from many threads, where field
//! code allocation and object saving race with each other.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dynobj_core::{
    from_bytes_in, to_bytes, GenericRecordCodec, MemoryContext, ObjectId, ObjectSerializer,
    Record, Value, COLLECTION_NAME_FIELD,
};

use crate::fixtures::{Person, PEOPLE};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct field names each record draws from.
    pub field_names: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            field_names: 32,
        }
    }
}

/// Encodes and decodes typed records from several threads sharing one
/// context. An operation succeeds only if the decoded value equals the
/// encoded one.
pub fn stress_concurrent_roundtrips(ctx: Arc<MemoryContext>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;
            let field_names = config.field_names.max(1);

            thread::spawn(move || {
                for i in 0..operations {
                    let mut person = Person::new(format!("t{t}-{i}"), i as i32);
                    person.id = ObjectId::new_random();
                    let mut value = Value::typed(person);
                    if i % 2 == 1 {
                        // untyped records with names shared across threads
                        value = Value::Object(
                            Record::new()
                                .with(COLLECTION_NAME_FIELD, PEOPLE)
                                .with(format!("f{}", i % field_names), i as i64),
                        );
                    }

                    let ok = to_bytes(ctx.as_ref(), &value)
                        .and_then(|bytes| from_bytes_in(ctx.as_ref(), &bytes, PEOPLE))
                        .map(|decoded| same_data(&value, &decoded))
                        .unwrap_or(false);
                    if ok {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Requests ids for the same unsaved records from several threads.
///
/// Each thread owns its value, so every record is saved exactly once.
/// Returns the ids handed out.
pub fn stress_concurrent_saves(ctx: Arc<MemoryContext>, config: &StressConfig) -> Vec<ObjectId> {
    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            let operations = config.operations;
            thread::spawn(move || {
                let codec = GenericRecordCodec;
                let mut ids = Vec::with_capacity(operations);
                for i in 0..operations {
                    let mut value = Value::typed(Person::new(format!("s{t}-{i}"), 0));
                    if let (Ok(first), Ok(second)) = (
                        codec.get_object_id(&mut value, true, ctx.as_ref()),
                        codec.get_object_id(&mut value, true, ctx.as_ref()),
                    ) {
                        if first == second {
                            ids.push(first);
                        }
                    }
                }
                ids
            })
        })
        .collect();

    handles
        .into_iter()
        .filter_map(|handle| handle.join().ok())
        .flatten()
        .collect()
}

/// Decoded record fields ignoring pseudo-fields a decoder adds.
fn same_data(original: &Value, decoded: &Value) -> bool {
    match (original, decoded) {
        (Value::Object(a), Value::Object(b)) => {
            a.data_fields().count() == b.data_fields().count()
                && a.data_fields().all(|(name, value)| b.get(name) == Some(value))
        }
        _ => original == decoded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::normalized_context;
    use std::collections::HashSet;

    fn small() -> StressConfig {
        StressConfig {
            operations: 100,
            threads: 4,
            field_names: 8,
        }
    }

    #[test]
    fn concurrent_roundtrips_all_succeed() {
        let ctx = Arc::new(normalized_context());
        let result = stress_concurrent_roundtrips(Arc::clone(&ctx), &small());
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 400);
    }

    #[test]
    fn concurrent_saves_are_unique() {
        let ctx = Arc::new(normalized_context());
        let ids = stress_concurrent_saves(Arc::clone(&ctx), &small());
        assert_eq!(ids.len(), 400);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 400);
        assert_eq!(ctx.save_count(), 400);
        assert_eq!(ctx.object_count(), 400);
    }
}
