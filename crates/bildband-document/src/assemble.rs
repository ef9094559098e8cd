// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembler — list, order, normalise, and bind source images into one PDF.
//
// Per-file failures never abort a run: the file is logged, recorded as
// skipped, and the next one is processed. Only an unreadable directory, an
// empty result, or a failed write are fatal.

use std::io::Write;
use std::path::{Path, PathBuf};

use bildband_core::PageSize;
use bildband_core::config::AssemblyConfig;
use bildband_core::error::{BildbandError, Result};
use bildband_core::human_errors::humanize_error;
use bildband_core::integrity::hash_bytes;
use tracing::{info, instrument, warn};

use crate::image::ImageNormalizer;
use crate::order::sort_by_name;
use crate::pdf::PdfWriter;
use crate::source::{CandidateFile, scan_directory};

/// Name used for the output when the directory has no base name (e.g. `/`).
const FALLBACK_STEM: &str = "bildband";

/// One page of the assembled document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    /// Source file name.
    pub source: String,
    pub width_px: u32,
    pub height_px: u32,
    pub size: PageSize,
}

/// A candidate that did not make it into the document.
#[derive(Debug)]
pub struct SkippedFile {
    pub name: String,
    pub error: BildbandError,
}

/// An assembled, not yet serialised document.
///
/// Pages are held in append order. [`ImageDocument::finish`] consumes the
/// document, so no page can be added after it has been finalised.
pub struct ImageDocument {
    writer: PdfWriter,
    pages: Vec<PageRecord>,
    skipped: Vec<SkippedFile>,
}

impl ImageDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Finalise and serialise to PDF bytes.
    pub fn finish(self) -> Result<(Vec<u8>, Vec<PageRecord>, Vec<SkippedFile>)> {
        let bytes = self.writer.finish()?;
        Ok((bytes, self.pages, self.skipped))
    }
}

/// Outcome of [`Assembler::assemble_directory`].
#[derive(Debug)]
pub struct AssemblyReport {
    /// Where the PDF was written.
    pub output: PathBuf,
    pub pages: Vec<PageRecord>,
    pub skipped: Vec<SkippedFile>,
    /// Size of the written PDF.
    pub bytes: usize,
    /// SHA-256 of the written PDF, lowercase hex.
    pub sha256: String,
}

/// Drives one run: ordering, normalisation, and page assembly.
#[derive(Debug, Clone)]
pub struct Assembler {
    config: AssemblyConfig,
    normalizer: ImageNormalizer,
}

impl Assembler {
    /// Create an assembler. The configuration is validated here, before any
    /// file is touched.
    pub fn new(config: AssemblyConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = ImageNormalizer::from_config(&config);
        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Order `candidates` and turn every decodable one into a page.
    ///
    /// Never fails: candidates that cannot be opened, decoded or encoded are
    /// recorded in [`ImageDocument::skipped`] and leave no gap in the page
    /// sequence. The page order depends only on the names, not on the order
    /// of `candidates`.
    #[instrument(skip_all, fields(candidates = candidates.len(), ordering = ?self.config.ordering))]
    pub fn assemble(
        &self,
        mut candidates: Vec<CandidateFile>,
        title: Option<&str>,
    ) -> ImageDocument {
        sort_by_name(&mut candidates, self.config.ordering, CandidateFile::name);

        let mut writer = PdfWriter::new();
        if let Some(title) = self.config.title.as_deref().or(title) {
            writer.set_title(title);
        }

        let mut pages = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();

        for candidate in candidates {
            let name = candidate.name();
            if self.config.verbose_logging {
                info!(file = %name, "Adding image");
            }
            match self.add_candidate(&mut writer, &candidate) {
                Ok(record) => pages.push(record),
                Err(error) => {
                    let human = humanize_error(&error);
                    warn!(file = %name, %error, "{} {}", human.message, human.suggestion);
                    skipped.push(SkippedFile {
                        name: name.to_owned(),
                        error,
                    });
                }
            }
        }

        ImageDocument {
            writer,
            pages,
            skipped,
        }
    }

    /// Assemble every recognised image directly inside `dir` and write the
    /// PDF to `output`, or to `<dir>/<dir name>.pdf` when `output` is `None`.
    ///
    /// The PDF is written to a temporary file next to the target and renamed
    /// into place, so an existing file is either fully replaced or untouched.
    #[instrument(skip(self, output), fields(dir = %dir.display()))]
    pub fn assemble_directory(&self, dir: &Path, output: Option<&Path>) -> Result<AssemblyReport> {
        let dir = dir
            .canonicalize()
            .map_err(|source| BildbandError::DirectoryRead {
                path: dir.to_path_buf(),
                source,
            })?;
        let stem = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_STEM.to_owned());
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => dir.join(format!("{stem}.pdf")),
        };

        let candidates = scan_directory(&dir, &self.config)?;
        info!(candidates = candidates.len(), "Found images");

        let document = self.assemble(candidates, Some(&stem));
        if document.page_count() == 0 {
            return Err(BildbandError::NoPages { path: dir });
        }
        let (bytes, pages, skipped) = document.finish()?;

        write_atomically(&output, &bytes)?;
        let sha256 = hash_bytes(&bytes);

        info!(
            output = %output.display(),
            pages = pages.len(),
            skipped = skipped.len(),
            bytes = bytes.len(),
            sha256 = %sha256,
            "PDF written"
        );

        Ok(AssemblyReport {
            output,
            pages,
            skipped,
            bytes: bytes.len(),
            sha256,
        })
    }

    /// Normalise one candidate and append it as a page.
    fn add_candidate(
        &self,
        writer: &mut PdfWriter,
        candidate: &CandidateFile,
    ) -> Result<PageRecord> {
        let name = candidate.name();
        let page = {
            let reader = candidate.open().map_err(|err| BildbandError::Decode {
                name: name.to_owned(),
                detail: format!("cannot open: {err}"),
            })?;
            self.normalizer.normalize(name, reader, candidate.format_hint())?
        };
        let record = PageRecord {
            source: name.to_owned(),
            width_px: page.width_px,
            height_px: page.height_px,
            size: page.size,
        };
        writer.add_page(page)?;
        Ok(record)
    }
}

/// Write `bytes` to `path` via a temporary file in the same directory.
///
/// The result has the permissions of the file it replaces, or the usual
/// umask-derived ones for a new file.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_error = |source| BildbandError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Masked by the process umask on creation, like File::create.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder.tempfile_in(parent).map_err(write_error)?;
    if let Ok(existing) = std::fs::metadata(path) {
        temp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_error)?;
    }
    temp.write_all(bytes).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([1, 2, 3])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode fixture");
        bytes
    }

    fn sources(doc: &ImageDocument) -> Vec<&str> {
        doc.pages().iter().map(|p| p.source.as_str()).collect()
    }

    #[test]
    fn invalid_config_is_refused_up_front() {
        let config = AssemblyConfig {
            quality: 0,
            ..Default::default()
        };
        assert!(matches!(
            Assembler::new(config),
            Err(BildbandError::InvalidConfig(_))
        ));
    }

    #[test]
    fn pages_follow_natural_order_regardless_of_input_order() {
        let assembler = Assembler::new(AssemblyConfig::default()).unwrap();
        let names = ["p10.png", "p2.png", "p1.png"];

        let forward: Vec<_> = names
            .iter()
            .map(|n| CandidateFile::from_bytes(*n, png(2, 2)))
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        let a = assembler.assemble(forward, None);
        let b = assembler.assemble(backward, None);
        assert_eq!(sources(&a), ["p1.png", "p2.png", "p10.png"]);
        assert_eq!(sources(&a), sources(&b));
    }

    #[test]
    fn lexical_ordering_is_available() {
        let config = AssemblyConfig {
            ordering: bildband_core::SortOrder::Lexical,
            ..Default::default()
        };
        let assembler = Assembler::new(config).unwrap();
        let candidates = ["p2.png", "p10.png", "p1.png"]
            .iter()
            .map(|n| CandidateFile::from_bytes(*n, png(2, 2)))
            .collect();

        let doc = assembler.assemble(candidates, None);
        assert_eq!(sources(&doc), ["p1.png", "p10.png", "p2.png"]);
    }

    #[test]
    fn corrupt_files_are_skipped_without_gaps() {
        let assembler = Assembler::new(AssemblyConfig::default()).unwrap();
        let mut truncated = png(8, 8);
        truncated.truncate(truncated.len() / 2);
        let candidates = vec![
            CandidateFile::from_bytes("a1.png", png(3, 4)),
            CandidateFile::from_bytes("a2.png", truncated),
            CandidateFile::from_bytes("a3.jpg", b"text pretending to be a jpeg".to_vec()),
            CandidateFile::from_bytes("a4.png", png(5, 6)),
        ];

        let doc = assembler.assemble(candidates, None);
        assert_eq!(sources(&doc), ["a1.png", "a4.png"]);
        let skipped: Vec<&str> = doc.skipped().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, ["a2.png", "a3.jpg"]);
        assert!(doc.skipped().iter().all(|s| !s.error.is_fatal()));

        let (bytes, pages, _) = doc.finish().unwrap();
        assert_eq!(pages.len(), 2);
        let reader = crate::pdf::PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 2);
    }

    /// Run `f` with a plain-text subscriber and return everything it logged.
    fn capture_logs(f: impl FnOnce()) -> String {
        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl Write for Buffer {
            fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(bytes);
                Ok(bytes.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn each_skipped_file_is_warned_about_once() {
        let assembler = Assembler::new(AssemblyConfig::default()).unwrap();
        let candidates = vec![
            CandidateFile::from_bytes("b1.png", png(2, 2)),
            CandidateFile::from_bytes("b2.jpg", b"not an image".to_vec()),
        ];

        let logs = capture_logs(|| {
            let doc = assembler.assemble(candidates, None);
            assert_eq!(doc.skipped().len(), 1);
        });

        let warnings: Vec<&str> = logs.lines().filter(|line| line.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1, "{logs}");
        assert!(warnings[0].contains("b2.jpg"));
        assert!(warnings[0].contains("left out"));
    }

    #[test]
    fn configured_title_wins_over_directory_name() {
        let config = AssemblyConfig {
            title: Some("Volume 1".into()),
            ..Default::default()
        };
        let assembler = Assembler::new(config).unwrap();
        let doc = assembler.assemble(
            vec![CandidateFile::from_bytes("1.png", png(2, 2))],
            Some("scans"),
        );
        let (bytes, _, _) = doc.finish().unwrap();
        let reader = crate::pdf::PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.title().as_deref(), Some("Volume 1"));
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"old").unwrap();

        write_atomically(&path, b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        // No temporary files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_keeps_permissions_of_replaced_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        for wanted in [0o644, 0o640] {
            let path = dir.path().join(format!("out-{wanted:o}.pdf"));
            std::fs::write(&path, b"old").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(wanted)).unwrap();

            write_atomically(&path, b"new").unwrap();
            assert_eq!(mode(&path), wanted);
        }
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_of_new_file_uses_umask_default() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference");
        std::fs::File::create(&reference).unwrap();
        let path = dir.path().join("fresh.pdf");

        write_atomically(&path, b"new").unwrap();
        assert_eq!(mode(&path), mode(&reference));
    }

    #[test]
    fn atomic_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.pdf");
        let err = write_atomically(&path, b"data").unwrap_err();
        assert!(matches!(err, BildbandError::OutputWrite { .. }));
    }
}
