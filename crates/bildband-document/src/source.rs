// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source images — listing a directory and opening candidate files.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::{Path, PathBuf};

use bildband_core::FormatHint;
use bildband_core::config::AssemblyConfig;
use bildband_core::error::BildbandError;
use tracing::{debug, instrument, warn};

/// A readable, seekable byte stream.
pub trait ReadSeek: BufRead + Seek {}

impl<T: BufRead + Seek> ReadSeek for T {}

/// Where a candidate's bytes come from.
#[derive(Debug, Clone)]
enum Content {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// A file that may become a page: its name plus a way to open its bytes.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    name: String,
    content: Content,
}

impl CandidateFile {
    /// A candidate backed by a file on disk.
    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            content: Content::File(path.into()),
        }
    }

    /// A candidate whose bytes are already in memory.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: Content::Memory(data),
        }
    }

    /// File name, used for ordering and in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoder choice derived from the name.
    pub fn format_hint(&self) -> FormatHint {
        FormatHint::from_file_name(&self.name)
    }

    /// Open the content for reading. The handle is released when dropped.
    pub fn open(&self) -> std::io::Result<Box<dyn ReadSeek + '_>> {
        match &self.content {
            Content::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Content::Memory(data) => Ok(Box::new(Cursor::new(data.as_slice()))),
        }
    }
}

/// List the page image candidates directly inside `dir`.
///
/// Subdirectories are not entered. Entries that are not regular files (or
/// symlinks to one), have a non-UTF-8 name, or lack a recognised extension
/// are left out. The result is in directory order; sorting is up to the
/// caller.
#[instrument(skip(config), fields(dir = %dir.display()))]
pub fn scan_directory(
    dir: &Path,
    config: &AssemblyConfig,
) -> Result<Vec<CandidateFile>, BildbandError> {
    let read_error = |source| BildbandError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            warn!(path = %path.display(), "Ignoring file with non-UTF-8 name");
            continue;
        };
        if !config.is_recognized(&name) {
            debug!(file = %name, "Not an image, ignored");
            continue;
        }
        candidates.push(CandidateFile::from_path(name, path));
    }

    debug!(candidates = candidates.len(), "Directory scanned");
    Ok(candidates)
}
