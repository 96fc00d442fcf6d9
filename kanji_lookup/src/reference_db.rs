//! The reference database: labelled reference patterns, loaded once and
//! never modified.
//!
//! Two on-disk forms are supported. The JSON dataset is an array of
//! `[label, stroke_count, pattern]` triples with the pattern in nested-array
//! form; reference patterns are stored already normalized and resampled.
//! The bincode form is what `refpat_convert` produces from it.

use log::info;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};
use std::sync::OnceLock;

use super::entities::*;
use super::error::{LookupError, Result};

/// One labelled reference sample.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub label: String,
    // Declared stroke count; drives the stroke-count window
    pub stroke_count: usize,
    pub pattern: Pattern,
}

impl ReferenceEntry {
    pub fn new(label: &str, stroke_count: usize, pattern: Pattern) -> ReferenceEntry {
        ReferenceEntry {
            label: label.to_string(),
            stroke_count: stroke_count,
            pattern: pattern,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ReferenceDatabase {
    entries: Vec<ReferenceEntry>,
}

static GLOBAL_DATABASE: OnceLock<ReferenceDatabase> = OnceLock::new();

fn malformed(index: usize, reason: &str) -> LookupError {
    LookupError::MalformedEntry {
        index: index,
        reason: reason.to_string(),
    }
}

// Parses one ["label", count, pattern] triple
fn parse_entry(index: usize, value: &Value) -> Result<ReferenceEntry> {
    let fields = match value {
        Value::Array(fields) if fields.len() == 3 => fields,
        _ => return Err(malformed(index, "expected a [label, stroke_count, pattern] triple")),
    };
    let label = match &fields[0] {
        Value::String(label) => label.clone(),
        _ => return Err(malformed(index, "label must be a string")),
    };
    let stroke_count = match fields[1].as_u64() {
        Some(count) => count as usize,
        None => return Err(malformed(index, "stroke count must be a non-negative integer")),
    };
    let nested: Vec<Vec<Vec<f64>>> = serde_json::from_value(fields[2].clone())
        .map_err(|e| malformed(index, &format!("pattern is not an array of strokes of points: {}", e)))?;
    let pattern = Pattern::from_nested(&nested).map_err(|e| malformed(index, &e.to_string()))?;
    Ok(ReferenceEntry {
        label: label,
        stroke_count: stroke_count,
        pattern: pattern,
    })
}

impl ReferenceDatabase {
    pub fn new(entries: Vec<ReferenceEntry>) -> ReferenceDatabase {
        ReferenceDatabase { entries: entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReferenceEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceEntry> {
        self.entries.iter()
    }

    pub fn from_json_str(json: &str) -> Result<ReferenceDatabase> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<ReferenceDatabase> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(&value)
    }

    fn from_json_value(value: &Value) -> Result<ReferenceDatabase> {
        let items = match value {
            Value::Array(items) => items,
            _ => return Err(malformed(0, "dataset must be a JSON array of entries")),
        };
        let mut entries: Vec<ReferenceEntry> = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            entries.push(parse_entry(index, item)?);
        }
        info!("Loaded {} reference patterns from JSON", entries.len());
        Ok(ReferenceDatabase::new(entries))
    }

    pub fn from_bincode_reader<R: Read>(reader: R) -> Result<ReferenceDatabase> {
        let db: ReferenceDatabase = bincode::deserialize_from(reader)?;
        info!("Loaded {} reference patterns from bincode", db.len());
        Ok(db)
    }

    pub fn write_bincode<W: Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Installs `db` as the process-wide database. Succeeds only once.
    pub fn install_global(db: ReferenceDatabase) -> Result<&'static ReferenceDatabase> {
        let count = db.len();
        GLOBAL_DATABASE
            .set(db)
            .map_err(|_| LookupError::DatabaseAlreadyInstalled)?;
        info!("Installed process-wide reference database with {} entries", count);
        GLOBAL_DATABASE.get().ok_or(LookupError::DatabaseNotInstalled)
    }

    /// The process-wide database, if one has been installed.
    pub fn global() -> Option<&'static ReferenceDatabase> {
        GLOBAL_DATABASE.get()
    }
}
