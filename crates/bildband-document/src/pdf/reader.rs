// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a written PDF with `lopdf` and report what is in it:
// page count, page sizes, embedded page images, title.

use std::path::Path;

use bildband_core::PageSize;
use bildband_core::error::BildbandError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument};

/// An image XObject found on a page.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub width_px: u32,
    pub height_px: u32,
    /// Value of /Filter, if it is a single name.
    pub filter: Option<String>,
    /// Raw (still encoded) stream bytes.
    pub data: Vec<u8>,
}

/// Reads an existing PDF file.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BildbandError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            BildbandError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, BildbandError> {
        let document = Document::load_mem(data).map_err(|err| {
            BildbandError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// MediaBox of every page, in page order.
    pub fn page_sizes(&self) -> Result<Vec<PageSize>, BildbandError> {
        self.ordered_pages()
            .map(|page_id| {
                let page = self.dictionary(page_id)?;
                let media_box = page
                    .get(b"MediaBox")
                    .and_then(Object::as_array)
                    .map_err(|err| pdf_error(page_id, "MediaBox", err))?;
                let [x0, y0, x1, y1] = media_box.as_slice() else {
                    return Err(BildbandError::PdfError(format!(
                        "page {page_id:?}: MediaBox has {} entries",
                        media_box.len()
                    )));
                };
                let width = number(x1)? - number(x0)?;
                let height = number(y1)? - number(y0)?;
                Ok(PageSize::from_points(width, height))
            })
            .collect()
    }

    /// Image XObjects referenced from each page's resources, in page order.
    pub fn page_images(&self) -> Result<Vec<PageImage>, BildbandError> {
        let mut images = Vec::new();
        for page_id in self.ordered_pages() {
            let page = self.dictionary(page_id)?;
            let resources = self.resolve_dictionary(
                page.get(b"Resources")
                    .map_err(|err| pdf_error(page_id, "Resources", err))?,
            )?;
            let Ok(xobjects) = resources.get(b"XObject") else {
                continue;
            };
            for (_, reference) in self.resolve_dictionary(xobjects)?.iter() {
                let id = reference
                    .as_reference()
                    .map_err(|err| pdf_error(page_id, "XObject", err))?;
                let stream = self
                    .document
                    .get_object(id)
                    .and_then(Object::as_stream)
                    .map_err(|err| pdf_error(id, "image stream", err))?;
                let dimension = |key: &[u8]| -> Result<u32, BildbandError> {
                    let value = stream
                        .dict
                        .get(key)
                        .and_then(Object::as_i64)
                        .map_err(|err| pdf_error(id, "image size", err))?;
                    u32::try_from(value).map_err(|_| {
                        BildbandError::PdfError(format!("image {id:?}: bad dimension {value}"))
                    })
                };
                let filter = match stream.dict.get(b"Filter") {
                    Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
                    _ => None,
                };
                images.push(PageImage {
                    width_px: dimension(&b"Width"[..])?,
                    height_px: dimension(&b"Height"[..])?,
                    filter,
                    data: stream.content.clone(),
                });
            }
        }
        Ok(images)
    }

    /// /Title from the document information dictionary.
    pub fn title(&self) -> Option<String> {
        let info = self.document.trailer.get(b"Info").ok()?;
        let info = self.resolve_dictionary(info).ok()?;
        match info.get(b"Title").ok()? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn ordered_pages(&self) -> impl Iterator<Item = ObjectId> + '_ {
        // get_pages() is keyed by 1-based page number, so values come out in order.
        self.document.get_pages().into_values()
    }

    fn dictionary(&self, id: ObjectId) -> Result<&Dictionary, BildbandError> {
        self.document
            .get_dictionary(id)
            .map_err(|err| pdf_error(id, "page", err))
    }

    /// Follow a reference if needed and return the dictionary behind it.
    fn resolve_dictionary<'a>(
        &'a self,
        object: &'a Object,
    ) -> Result<&'a Dictionary, BildbandError> {
        match object {
            Object::Reference(id) => self.dictionary(*id),
            Object::Dictionary(dict) => Ok(dict),
            other => Err(BildbandError::PdfError(format!(
                "expected a dictionary, found {other:?}"
            ))),
        }
    }
}

fn pdf_error(id: ObjectId, what: &str, err: lopdf::Error) -> BildbandError {
    BildbandError::PdfError(format!("object {id:?}: cannot read {what}: {err}"))
}

fn number(object: &Object) -> Result<f64, BildbandError> {
    match object {
        Object::Integer(value) => Ok(*value as f64),
        Object::Real(value) => Ok(f64::from(*value)),
        other => Err(BildbandError::PdfError(format!(
            "expected a number, found {other:?}"
        ))),
    }
}

/// Decode a PDF text string: UTF-16BE when it carries a BOM, else byte-wise.
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
