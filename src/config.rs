use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Cut-offs used to classify students and subjects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A grade at or above this counts as a success.
    pub pass_mark: f64,
    /// Students averaging below this need support.
    pub improvement_below: f64,
    /// Subjects averaging at or above this are strong.
    pub strong_from: f64,
    /// Subjects below this success rate need attention.
    pub min_success_rate: f64,
    pub top_k: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pass_mark: 10.0,
            improvement_below: 12.0,
            strong_from: 14.0,
            min_success_rate: 0.7,
            top_k: 3,
        }
    }
}

impl Thresholds {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read thresholds from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid thresholds file {}", path.display()))
    }
}
