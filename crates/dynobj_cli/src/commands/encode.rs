//! Encode command implementation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use dynobj_core::{to_bytes, CodecConfig, MemoryContext, Value};
use tracing::info;

use super::json::record_from_json;

/// Runs the encode command.
///
/// Reads one JSON object, encodes it as a framed top-level record with
/// literal names and appends it to `output`. Returns the record's id.
pub fn run(
    input: &Path,
    output: &Path,
    collection: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    let mut record = record_from_json(&json)?;
    if let Some(collection) = collection {
        record.set_collection_name(collection);
    }

    let ctx = MemoryContext::new(CodecConfig::literal());
    let bytes = to_bytes(&ctx, &Value::Object(record))?;
    // the frame starts with the record's id
    let id = uuid::Uuid::from_slice(&bytes[..16])?;

    let mut file = OpenOptions::new().create(true).append(true).open(output)?;
    file.write_all(&bytes)?;

    info!("Encoded {:?} into {:?} ({} bytes)", input, output, bytes.len());
    println!("{id}");
    Ok(id.to_string())
}
