// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Bildband.

use serde::{Deserialize, Serialize};

/// Millimetres per PDF point (1pt = 1/72 inch).
const MM_PER_POINT: f64 = 25.4 / 72.0;

/// How candidate file names are sequenced before pages are appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Digit runs compare by numeric value (`page9` before `page10`).
    #[default]
    Natural,
    /// Plain byte-wise string order (`page10` before `page9`).
    Lexical,
}

/// Which decoder the normalizer should use for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatHint {
    /// The file is declared as WebP and goes to the dedicated WebP decoder.
    WebP,
    /// Any other format: detected from the stream's magic bytes.
    Detect,
}

impl FormatHint {
    /// Derive the hint from a file name. The `.webp` check ignores ASCII case.
    pub fn from_file_name(name: &str) -> Self {
        let is_webp = name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("webp"));
        if is_webp { Self::WebP } else { Self::Detect }
    }
}

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    /// Page size for a raster of `width` x `height` pixels, at `mm_per_pixel`.
    ///
    /// Both axes use the same factor, so the page aspect ratio is exactly the
    /// pixel aspect ratio.
    pub fn from_pixels(width: u32, height: u32, mm_per_pixel: f64) -> Self {
        Self {
            width_mm: f64::from(width) * mm_per_pixel,
            height_mm: f64::from(height) * mm_per_pixel,
        }
    }

    /// Dimensions in PDF points (width, height).
    pub fn dimensions_pt(&self) -> (f64, f64) {
        (self.width_mm / MM_PER_POINT, self.height_mm / MM_PER_POINT)
    }

    /// Build a size from PDF point dimensions (e.g. a MediaBox).
    pub fn from_points(width_pt: f64, height_pt: f64) -> Self {
        Self {
            width_mm: width_pt * MM_PER_POINT,
            height_mm: height_pt * MM_PER_POINT,
        }
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}x{:.2}mm", self.width_mm, self.height_mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webp_hint_ignores_case() {
        assert_eq!(FormatHint::from_file_name("cover.webp"), FormatHint::WebP);
        assert_eq!(FormatHint::from_file_name("cover.WebP"), FormatHint::WebP);
        assert_eq!(FormatHint::from_file_name("cover.png"), FormatHint::Detect);
        assert_eq!(FormatHint::from_file_name("webp"), FormatHint::Detect);
    }

    #[test]
    fn page_size_follows_pixel_aspect() {
        let size = PageSize::from_pixels(800, 600, 0.264583);
        assert!((size.width_mm - 211.6664).abs() < 1e-9);
        assert!((size.height_mm - 158.7498).abs() < 1e-9);
        assert!((size.width_mm / size.height_mm - 800.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn points_round_trip_through_millimetres() {
        let size = PageSize::from_pixels(96, 96, 25.4 / 96.0);
        let (w_pt, h_pt) = size.dimensions_pt();
        // One inch square.
        assert!((w_pt - 72.0).abs() < 1e-9);
        assert!((h_pt - 72.0).abs() < 1e-9);
        let back = PageSize::from_points(w_pt, h_pt);
        assert!((back.width_mm - 25.4).abs() < 1e-9);
    }
}
