//! Inspect command implementation.

use std::path::Path;

use dynobj_core::{decode_all, CodecConfig, MemoryContext};
use serde::Serialize;
use tracing::info;

use super::json::to_json;

/// File inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// File path.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    /// Number of top-level values.
    pub record_count: usize,
    /// Decoded values.
    pub records: Vec<serde_json::Value>,
}

/// Decodes every framed value in a file.
///
/// With `normalized`, names are registry codes from a registry this tool
/// does not have, so they are shown as `collection.code`.
pub fn decode_file(
    path: &Path,
    collection: Option<&str>,
    normalized: bool,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let data = std::fs::read(path)?;
    let config = if normalized {
        CodecConfig::new().check_field_names(false)
    } else {
        CodecConfig::literal()
    };
    let ctx = MemoryContext::new(config);
    let values = decode_all(&ctx, &data, collection)?;
    info!("Decoded {} values from {:?}", values.len(), path);

    Ok(InspectResult {
        path: path.display().to_string(),
        size: data.len() as u64,
        record_count: values.len(),
        records: values.iter().map(to_json).collect(),
    })
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    collection: Option<&str>,
    normalized: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No file found at {:?}", path).into());
    }

    let result = decode_file(path, collection, normalized)?;

    // Output
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("dynobj File Inspection");
    println!("======================");
    println!();
    println!("Path:    {}", result.path);
    println!("Size:    {} bytes", result.size);
    println!("Records: {}", result.record_count);

    for (i, record) in result.records.iter().enumerate() {
        println!();
        println!("[{}]", i);
        print_json(record, 1);
    }
}

fn print_json(json: &serde_json::Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match json {
        serde_json::Value::Object(map) => {
            for (name, value) in map {
                if value.is_object() || value.is_array() {
                    println!("{indent}{name}:");
                    print_json(value, depth + 1);
                } else {
                    println!("{indent}{name}: {value}");
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                if item.is_object() || item.is_array() {
                    println!("{indent}-");
                    print_json(item, depth + 1);
                } else {
                    println!("{indent}- {item}");
                }
            }
        }
        other => println!("{indent}{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynobj_core::{to_bytes, Record, Value};

    #[test]
    fn normalized_names_are_synthesized() {
        let writer = MemoryContext::new(CodecConfig::new());
        let mut data = Vec::new();
        data.extend_from_slice(&to_bytes(&writer, &Value::Object(Record::new().with("Name", "Bob"))).unwrap());
        data.extend_from_slice(&to_bytes(&writer, &Value::Int32(7)).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.bin");
        std::fs::write(&path, &data).unwrap();

        let result = decode_file(&path, None, true).unwrap();
        assert_eq!(result.record_count, 2);
        let code = writer.names().code(Some("Default"), "Name");
        assert_eq!(result.records[0][format!("Default.{code}")], "Bob");
        assert_eq!(result.records[1], 7);
    }

    #[test]
    fn missing_file() {
        assert!(run(Path::new("/nonexistent/file.bin"), None, false, "text").is_err());
    }
}
