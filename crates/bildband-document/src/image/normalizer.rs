// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image normalizer — decode a JPEG, PNG or WebP stream, re-encode it as a
// baseline JPEG at a fixed quality, and work out the physical page size.
//
// Every page of the output shares the one JPEG encoding, so the PDF writer
// only ever embeds DCT streams.

use std::io::{BufRead, Cursor, Seek};

use bildband_core::config::AssemblyConfig;
use bildband_core::error::BildbandError;
use bildband_core::{FormatHint, PageSize};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPDecoder;
use image::{DynamicImage, ImageReader};
use tracing::{debug, instrument};

/// One image, ready to become one PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPage {
    /// Baseline JPEG, 8-bit RGB.
    pub jpeg: Vec<u8>,
    /// Pixel width of the encoded JPEG.
    pub width_px: u32,
    /// Pixel height of the encoded JPEG.
    pub height_px: u32,
    /// Physical page size derived from the pixel size.
    pub size: PageSize,
}

/// Decodes source images and re-encodes them into the canonical page format.
#[derive(Debug, Clone, Copy)]
pub struct ImageNormalizer {
    /// JPEG quality, 1-100.
    quality: u8,
    /// Millimetres of page per pixel of image.
    mm_per_pixel: f64,
}

impl ImageNormalizer {
    pub fn new(quality: u8, mm_per_pixel: f64) -> Self {
        Self {
            quality,
            mm_per_pixel,
        }
    }

    pub fn from_config(config: &AssemblyConfig) -> Self {
        Self::new(config.quality, config.mm_per_pixel)
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn mm_per_pixel(&self) -> f64 {
        self.mm_per_pixel
    }

    /// Normalise one image read from `reader`.
    ///
    /// `name` is only used for diagnostics. The reader is consumed and
    /// dropped before this returns, on success and on failure alike.
    #[instrument(skip(self, reader), fields(quality = self.quality))]
    pub fn normalize<R: BufRead + Seek>(
        &self,
        name: &str,
        reader: R,
        hint: FormatHint,
    ) -> Result<NormalizedPage, BildbandError> {
        let image = decode(name, reader, hint)?;
        let (width_px, height_px) = (image.width(), image.height());
        let jpeg = encode_jpeg(name, &image, self.quality)?;
        let size = PageSize::from_pixels(width_px, height_px, self.mm_per_pixel);

        debug!(
            width_px,
            height_px,
            jpeg_bytes = jpeg.len(),
            %size,
            "Image normalised"
        );

        Ok(NormalizedPage {
            jpeg,
            width_px,
            height_px,
            size,
        })
    }

    /// Normalise an image already held in memory.
    pub fn normalize_bytes(
        &self,
        name: &str,
        data: &[u8],
        hint: FormatHint,
    ) -> Result<NormalizedPage, BildbandError> {
        self.normalize(name, Cursor::new(data), hint)
    }
}

/// Decode with the dedicated WebP decoder, or sniff the format from the
/// stream's magic bytes for everything else.
fn decode<R: BufRead + Seek>(
    name: &str,
    reader: R,
    hint: FormatHint,
) -> Result<DynamicImage, BildbandError> {
    let decode_error = |detail: String| BildbandError::Decode {
        name: name.to_owned(),
        detail,
    };

    match hint {
        FormatHint::WebP => {
            let decoder = WebPDecoder::new(reader).map_err(|err| decode_error(err.to_string()))?;
            DynamicImage::from_decoder(decoder).map_err(|err| decode_error(err.to_string()))
        }
        FormatHint::Detect => ImageReader::new(reader)
            .with_guessed_format()
            .map_err(|err| decode_error(err.to_string()))?
            .decode()
            .map_err(|err| decode_error(err.to_string())),
    }
}

/// Encode `image` as 8-bit RGB JPEG. Alpha is discarded.
fn encode_jpeg(name: &str, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, BildbandError> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| BildbandError::Encode {
            name: name.to_owned(),
            detail: format!("JPEG encoding failed: {err}"),
        })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn encoded(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), format)
            .expect("encode fixture");
        buffer
    }

    #[test]
    fn png_becomes_jpeg_with_page_size() {
        let png = encoded(&gradient(40, 30), ImageFormat::Png);
        let normalizer = ImageNormalizer::new(75, 0.264583);

        let page = normalizer
            .normalize_bytes("a.png", &png, FormatHint::Detect)
            .unwrap();

        assert_eq!((page.width_px, page.height_px), (40, 30));
        assert_eq!(&page.jpeg[..2], &[0xFF, 0xD8], "JPEG SOI marker");
        assert!((page.size.width_mm - 40.0 * 0.264583).abs() < 1e-9);
        assert!((page.size.height_mm - 30.0 * 0.264583).abs() < 1e-9);
    }

    #[test]
    fn format_is_sniffed_not_taken_from_name() {
        // PNG bytes behind a .jpg name still decode.
        let png = encoded(&gradient(8, 8), ImageFormat::Png);
        let page = ImageNormalizer::new(75, 1.0)
            .normalize_bytes("mislabelled.jpg", &png, FormatHint::Detect)
            .unwrap();
        assert_eq!((page.width_px, page.height_px), (8, 8));
    }

    #[test]
    fn webp_goes_through_dedicated_decoder() {
        let webp = encoded(&gradient(16, 12), ImageFormat::WebP);
        let page = ImageNormalizer::new(75, 0.5)
            .normalize_bytes("cover.webp", &webp, FormatHint::WebP)
            .unwrap();
        assert_eq!((page.width_px, page.height_px), (16, 12));
        assert!((page.size.width_mm - 8.0).abs() < 1e-9);
        assert!((page.size.height_mm - 6.0).abs() < 1e-9);
    }

    #[test]
    fn non_webp_bytes_fail_the_webp_decoder() {
        let png = encoded(&gradient(8, 8), ImageFormat::Png);
        let err = ImageNormalizer::new(75, 1.0)
            .normalize_bytes("fake.webp", &png, FormatHint::WebP)
            .unwrap_err();
        assert!(matches!(err, BildbandError::Decode { ref name, .. } if name == "fake.webp"));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = ImageNormalizer::new(75, 1.0)
            .normalize_bytes("notes.png", b"not an image at all", FormatHint::Detect)
            .unwrap_err();
        assert!(matches!(err, BildbandError::Decode { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn truncated_png_is_a_decode_error() {
        let png = encoded(&gradient(32, 32), ImageFormat::Png);
        let truncated = &png[..png.len() / 2];
        let err = ImageNormalizer::new(75, 1.0)
            .normalize_bytes("half.png", truncated, FormatHint::Detect)
            .unwrap_err();
        assert!(matches!(err, BildbandError::Decode { .. }));
    }

    #[test]
    fn normalisation_is_deterministic() {
        let png = encoded(&gradient(50, 20), ImageFormat::Png);
        let normalizer = ImageNormalizer::new(75, 0.264583);
        let first = normalizer
            .normalize_bytes("p.png", &png, FormatHint::Detect)
            .unwrap();
        let second = normalizer
            .normalize_bytes("p.png", &png, FormatHint::Detect)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn higher_quality_produces_larger_output() {
        let png = encoded(&gradient(64, 64), ImageFormat::Png);
        let low = ImageNormalizer::new(10, 1.0)
            .normalize_bytes("p.png", &png, FormatHint::Detect)
            .unwrap();
        let high = ImageNormalizer::new(95, 1.0)
            .normalize_bytes("p.png", &png, FormatHint::Detect)
            .unwrap();
        assert!(high.jpeg.len() > low.jpeg.len());
    }

    #[test]
    fn alpha_is_dropped() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0])));
        let png = encoded(&rgba, ImageFormat::Png);
        let page = ImageNormalizer::new(90, 1.0)
            .normalize_bytes("clear.png", &png, FormatHint::Detect)
            .unwrap();
        let back = image::load_from_memory(&page.jpeg).unwrap();
        assert_eq!(back.color(), image::ColorType::Rgb8);
    }
}
