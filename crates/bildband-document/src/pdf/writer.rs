// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — one page per normalised image, built directly with `lopdf`.
//
// Each page is exactly the size of its image. The JPEG bytes are embedded
// unchanged as a DCTDecode image XObject and drawn over the whole MediaBox,
// so nothing is decoded or recompressed a second time.

use bildband_core::error::BildbandError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, instrument};

use crate::image::NormalizedPage;

/// Resource name of the single image on every page.
const IMAGE_RESOURCE: &str = "Im0";

/// Builds a PDF page by page. Pages can only be appended; [`PdfWriter::finish`]
/// consumes the writer, so a finished document cannot grow.
pub struct PdfWriter {
    document: Document,
    /// Reserved id of the /Pages node, written in `finish`.
    pages_id: ObjectId,
    /// Page object ids in append order.
    kids: Vec<ObjectId>,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.4");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page sized to `page` with its JPEG as the only content.
    /// The JPEG buffer moves into the document as is.
    #[instrument(skip_all, fields(page = self.kids.len() + 1, jpeg_bytes = page.jpeg.len()))]
    pub fn add_page(&mut self, page: NormalizedPage) -> Result<(), BildbandError> {
        let NormalizedPage {
            jpeg,
            width_px,
            height_px,
            size,
        } = page;
        let (width_pt, height_pt) = size.dimensions_pt();
        let (width_pt, height_pt) = (width_pt as f32, height_pt as f32);

        let image_id = self.document.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width_px),
                "Height" => i64::from(height_px),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        // Scale the unit square to the full MediaBox. The image's top-left
        // corner lands on the page's top-left corner.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width_pt.into(),
                        0.into(),
                        0.into(),
                        height_pt.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|err| {
            BildbandError::PdfError(format!("failed to encode page content: {err}"))
        })?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_RESOURCE => image_id,
                },
            },
        });
        self.kids.push(page_id);

        debug!(width_pt, height_pt, "Page appended");
        Ok(())
    }

    /// Close the page tree and serialise the document.
    ///
    /// A PDF without pages is refused.
    #[instrument(skip(self), fields(pages = self.kids.len()))]
    pub fn finish(mut self) -> Result<Vec<u8>, BildbandError> {
        if self.kids.is_empty() {
            return Err(BildbandError::PdfError("document has no pages".into()));
        }

        let count = self.kids.len() as i64;
        let kids: Vec<Object> = self.kids.iter().copied().map(Object::Reference).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => text_string(concat!("Bildband ", env!("CARGO_PKG_VERSION"))),
        };
        if let Some(title) = &self.title {
            info.set("Title", text_string(title));
        }
        let info_id = self.document.add_object(info);
        self.document.trailer.set("Info", info_id);

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            BildbandError::PdfError(format!("failed to serialise PDF: {err}"))
        })?;

        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

// -- Tests --------------------------------------------------------------------
