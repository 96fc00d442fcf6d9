//! Hand-drawn kanji recognition by template matching.
//!
//! Raw ink is moment-normalized into a 256x256 frame, resampled at regular
//! arc-length intervals, and compared stroke by stroke against a fixed
//! database of reference patterns: first coarsely by stroke endpoints, then
//! finely by whole stroke shape over the best coarse candidates.

extern crate serde_derive;
extern crate wasm_bindgen;

pub mod capture;
pub mod config;
pub mod distance;
pub mod entities;
pub mod error;
pub mod feature_extractor;
mod match_collector;
pub mod matcher;
pub mod moment_normalizer;
pub mod reference_db;
pub mod stroke_map;

use serde_derive::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub use capture::{CaptureEvent, InkCapture};
pub use config::RecognizerConfig;
pub use entities::{Pattern, Point, Stroke};
pub use error::{LookupError, Result};
pub use feature_extractor::extract_features;
pub use matcher::Matcher;
pub use moment_normalizer::moment_normalize;
pub use reference_db::{ReferenceDatabase, ReferenceEntry};
pub use stroke_map::{align, StrokeMap};

/// A recognized label and its fine-pass distance (lower is better).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Match {
    pub label: String,
    pub score: f64,
}

/// Position of a reference in the database and its distance to the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub index: usize,
    pub score: f64,
}

/// Recognizes `pattern` against `db` with default parameters. Labels best
/// first, at most 10; empty for empty ink or when nothing is in the
/// stroke-count window.
pub fn recognize(pattern: &Pattern, db: &ReferenceDatabase) -> Vec<String> {
    Matcher::new(db).recognize(pattern)
}

/// Recognizes `pattern` against the process-wide database.
pub fn lookup(pattern: &Pattern) -> Result<Vec<String>> {
    let db = ReferenceDatabase::global().ok_or(LookupError::DatabaseNotInstalled)?;
    Ok(recognize(pattern, db))
}

fn to_js_error(e: LookupError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Installs the process-wide database from dataset JSON. Returns the number
/// of reference patterns loaded.
#[wasm_bindgen]
pub fn load_reference_patterns(json: &str) -> std::result::Result<usize, JsValue> {
    let db = ReferenceDatabase::from_json_str(json).map_err(to_js_error)?;
    let db = ReferenceDatabase::install_global(db).map_err(to_js_error)?;
    Ok(db.len())
}

/// Recognizes ink given as strokes of `[x, y]` points; returns the labels as
/// a JSON array.
#[wasm_bindgen]
#[allow(deprecated)]
pub fn lookup_strokes(input: &JsValue) -> std::result::Result<String, JsValue> {
    // Input is vector of vector of vector of numbers - how strokes and their points are represented in JS
    let input: Vec<Vec<Vec<f64>>> = input
        .into_serde()
        .map_err(|e| to_js_error(LookupError::Json(e)))?;
    let pattern = Pattern::from_nested(&input).map_err(to_js_error)?;
    let labels = lookup(&pattern).map_err(to_js_error)?;
    serde_json::to_string(&labels).map_err(|e| to_js_error(LookupError::Json(e)))
}
