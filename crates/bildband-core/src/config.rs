// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BildbandError, Result};
use crate::types::SortOrder;

/// JPEG quality used when re-encoding every page.
pub const DEFAULT_QUALITY: u8 = 75;

/// Millimetres per pixel for a 96 DPI raster.
pub const DEFAULT_MM_PER_PIXEL: f64 = 0.264583;

/// File name suffixes (without the dot) that are picked up as page images.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Settings for one assembly run.
///
/// Every field has a default, so a JSON config file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// JPEG re-encode quality, 1-100.
    pub quality: u8,
    /// Physical page length in millimetres per image pixel.
    pub mm_per_pixel: f64,
    /// Recognised image extensions, with or without a leading dot.
    pub extensions: Vec<String>,
    /// Match extensions exactly instead of ignoring ASCII case.
    pub case_sensitive_extensions: bool,
    /// Page ordering of the source files.
    pub ordering: SortOrder,
    /// Log one line per processed file.
    pub verbose_logging: bool,
    /// /Title metadata. Defaults to the directory base name.
    pub title: Option<String>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            mm_per_pixel: DEFAULT_MM_PER_PIXEL,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            case_sensitive_extensions: false,
            ordering: SortOrder::Natural,
            verbose_logging: true,
            title: None,
        }
    }
}

impl AssemblyConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |detail: String| BildbandError::ConfigLoad {
            path: path.to_path_buf(),
            detail,
        };
        let text = std::fs::read_to_string(path).map_err(|err| load_error(err.to_string()))?;
        let config: Self =
            serde_json::from_str(&text).map_err(|err| load_error(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the pixel scale from a resolution in dots per inch.
    pub fn set_dpi(&mut self, dpi: f64) {
        self.mm_per_pixel = 25.4 / dpi;
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(BildbandError::InvalidConfig(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        if !self.mm_per_pixel.is_finite() || self.mm_per_pixel <= 0.0 {
            return Err(BildbandError::InvalidConfig(format!(
                "mm_per_pixel must be a positive number, got {}",
                self.mm_per_pixel
            )));
        }
        if self.extensions.is_empty() {
            return Err(BildbandError::InvalidConfig(
                "at least one image extension is required".into(),
            ));
        }
        for ext in &self.extensions {
            let bare = ext.trim_start_matches('.');
            if bare.is_empty() || bare.contains(|c: char| c == '/' || c == '\\') {
                return Err(BildbandError::InvalidConfig(format!(
                    "invalid image extension {ext:?}"
                )));
            }
        }
        Ok(())
    }

    /// Whether `file_name` ends in `.<ext>` for one of the configured extensions.
    pub fn is_recognized(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            let ext = ext.trim_start_matches('.');
            let Some(start) = file_name.len().checked_sub(ext.len() + 1) else {
                return false;
            };
            let Some(rest) = file_name.get(start..).and_then(|s| s.strip_prefix('.')) else {
                return false;
            };
            if self.case_sensitive_extensions {
                rest == ext
            } else {
                rest.eq_ignore_ascii_case(ext)
            }
        })
    }
}
