// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildband-document — Turning a folder of page images into one PDF.
//
// Provides natural filename ordering, image normalisation (decode, re-encode
// as JPEG, page sizing), a full-bleed PDF writer and reader, and the
// assembler that drives them over a directory.

pub mod assemble;
pub mod image;
pub mod order;
pub mod pdf;
pub mod source;

// Re-export the primary structs so callers can use `bildband_document::Assembler` etc.
pub use assemble::{AssemblyReport, Assembler, ImageDocument, PageRecord, SkippedFile};
pub use crate::image::normalizer::{ImageNormalizer, NormalizedPage};
pub use order::{FileToken, compare, compare_natural, tokenize};
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
pub use source::{CandidateFile, scan_directory};
