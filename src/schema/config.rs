//! Configuration types for the viewer core.

use serde::{Deserialize, Serialize};

use crate::decode::DelimiterSet;
use crate::shading::GradientScheme;

fn default_center_geometry() -> bool {
    true
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Delimiter classes shared by both text formats.
    #[serde(default)]
    pub delimiters: DelimiterConfig,
    /// Gradient used until the host picks another one.
    #[serde(default)]
    pub gradient: GradientScheme,
    /// Re-center decoded geometry on its bounding-box center.
    #[serde(default = "default_center_geometry")]
    pub center_geometry: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            delimiters: DelimiterConfig::default(),
            gradient: GradientScheme::default(),
            center_geometry: true,
        }
    }
}

/// Field and point delimiter classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelimiterConfig {
    /// Separate readings (or coordinates) within a row.
    pub field: Vec<char>,
    /// Separate points.
    pub point: Vec<char>,
}

impl Default for DelimiterConfig {
    fn default() -> Self {
        Self {
            field: vec![','],
            point: vec!['\n'],
        }
    }
}

impl DelimiterConfig {
    /// Validate and build the scanner lookup table.
    pub fn to_set(&self) -> Result<DelimiterSet, ConfigError> {
        if self.field.is_empty() {
            return Err(ConfigError::NoFieldDelimiter);
        }
        if self.point.is_empty() {
            return Err(ConfigError::NoPointDelimiter);
        }
        for &c in self.field.iter().chain(&self.point) {
            if !c.is_ascii() {
                return Err(ConfigError::NonAsciiDelimiter(c));
            }
        }
        if let Some(&c) = self.field.iter().find(|c| self.point.contains(c)) {
            return Err(ConfigError::OverlappingDelimiter(c));
        }

        let field: Vec<u8> = self.field.iter().map(|&c| c as u8).collect();
        let point: Vec<u8> = self.point.iter().map(|&c| c as u8).collect();
        Ok(DelimiterSet::new(&field, &point))
    }
}

impl ViewerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.delimiters.to_set().map(|_| ())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("At least one field delimiter is required")]
    NoFieldDelimiter,
    #[error("At least one point delimiter is required")]
    NoPointDelimiter,
    #[error("Delimiter {0:?} is not a single-byte ASCII character")]
    NonAsciiDelimiter(char),
    #[error("Delimiter {0:?} is both a field and a point delimiter")]
    OverlappingDelimiter(char),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
