// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildband.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Bildband operations.
///
/// Per-file variants (`Decode`, `Encode`) are caught by the assembler and
/// turned into skip records; everything else ends the run.
#[derive(Debug, Error)]
pub enum BildbandError {
    // -- Run-fatal errors --
    #[error("cannot read source directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no page could be produced from {}", path.display())]
    NoPages { path: PathBuf },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot load settings from {}: {detail}", path.display())]
    ConfigLoad { path: PathBuf, detail: String },

    // -- Per-file errors --
    #[error("failed to decode {name}: {detail}")]
    Decode { name: String, detail: String },

    #[error("failed to encode {name}: {detail}")]
    Encode { name: String, detail: String },

    // -- Document --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
}

impl BildbandError {
    /// Whether this error ends the run, as opposed to skipping a single file.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Decode { .. } | Self::Encode { .. })
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildbandError>;
