//! Recognizer tuning parameters

use super::error::{LookupError, Result};
use super::feature_extractor::DEFAULT_INTERVAL;
use super::stroke_map::DEFAULT_REFINEMENT_PASSES;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the coarse/fine classifier.
///
/// The defaults reproduce the reference recognizer; all fields are optional
/// in TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Spacing of resampled points in canonical units (default: 20.0)
    #[serde(default = "default_interval")]
    pub interval: f64,

    /// Local improvement passes of the stroke aligner (default: 3)
    #[serde(default = "default_refinement_passes")]
    pub refinement_passes: usize,

    /// Coarse candidates handed to the fine pass (default: 100)
    #[serde(default = "default_coarse_candidates")]
    pub coarse_candidates: usize,

    /// Labels returned by a recognition (default: 10)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Input may have fewer strokes than a reference, by less than this (default: 3)
    #[serde(default = "default_window_below")]
    pub window_below: usize,

    /// Input may have more strokes than a reference, by less than this (default: 2)
    #[serde(default = "default_window_above")]
    pub window_above: usize,
}

fn default_interval() -> f64 {
    DEFAULT_INTERVAL
}
fn default_refinement_passes() -> usize {
    DEFAULT_REFINEMENT_PASSES
}
fn default_coarse_candidates() -> usize {
    100
}
fn default_max_results() -> usize {
    10
}
fn default_window_below() -> usize {
    3
}
fn default_window_above() -> usize {
    2
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            refinement_passes: default_refinement_passes(),
            coarse_candidates: default_coarse_candidates(),
            max_results: default_max_results(),
            window_below: default_window_below(),
            window_above: default_window_above(),
        }
    }
}

impl RecognizerConfig {
    /// Parse from TOML text and validate.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RecognizerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.interval > 0.0) || !self.interval.is_finite() {
            return Err(LookupError::Config(format!(
                "interval must be a positive number, got {}",
                self.interval
            )));
        }
        if self.max_results == 0 {
            return Err(LookupError::Config("max_results must be at least 1".to_string()));
        }
        if self.coarse_candidates == 0 {
            return Err(LookupError::Config("coarse_candidates must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Whether an input with `input_strokes` strokes may be compared with a
    /// reference declaring `reference_strokes` strokes.
    pub fn admits(&self, input_strokes: usize, reference_strokes: usize) -> bool {
        // input < reference + above && input > reference - below, without overflow
        let below_upper = reference_strokes
            .checked_add(self.window_above)
            .map_or(true, |upper| input_strokes < upper);
        let above_lower = input_strokes
            .checked_add(self.window_below)
            .map_or(true, |shifted| shifted > reference_strokes);
        below_upper && above_lower
    }
}
