//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use territory_geo::{Category, ScoringPolicy};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Composite score weights
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Input validation
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Output defaults
    #[serde(default)]
    pub output: OutputConfig,
}

impl ConfigSchema {
    /// Builds the engine's scoring policy from the `[scoring]` table.
    pub fn scoring_policy(&self) -> ScoringPolicy {
        let weights = self
            .scoring
            .weights
            .iter()
            .map(|(tag, weight)| (Category::from(tag.as_str()), *weight))
            .collect();

        ScoringPolicy::new(weights).with_default_weight(self.scoring.default_weight)
    }

    /// Rejects weights the score cannot use.
    pub fn validate(&self) -> Result<()> {
        check_weight("scoring.default_weight", self.scoring.default_weight)?;
        for (tag, weight) in &self.scoring.weights {
            check_weight(&format!("scoring.weights.{tag}"), *weight)?;
        }
        Ok(())
    }
}

fn check_weight(key: &str, weight: f64) -> Result<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config_value(key, format!("weight must be a non-negative number, got {weight}")))
    }
}

/// Score weights per category tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight for categories not listed in `weights`
    #[serde(default = "default_weight")]
    pub default_weight: f64,

    /// Category tag to weight, e.g. `job = 2.0`
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_weight: default_weight(),
            weights: BTreeMap::new(),
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Input validation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationConfig {
    /// Range-check every latitude/longitude before computing
    #[serde(default)]
    pub strict_coordinates: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Include the contained points in membership output
    #[serde(default)]
    pub include_points: bool,

    /// Category for point records without a `type` field
    #[serde(default = "default_point_category")]
    pub default_category: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_points: false,
            default_category: default_point_category(),
        }
    }
}

fn default_point_category() -> String {
    "post".to_string()
}
