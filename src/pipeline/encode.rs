//! Image encoding: `DynamicImage` → base64 JPEG wrapped in [`PageImage`].
//!
//! The service accepts images as base64 data URIs embedded in the JSON
//! request body. JPEG keeps the combined multi-page payload small — a resume
//! is mostly text on a white background and compresses well, and the fixed
//! 2x render scale preserves enough pixel density for the model to read it.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::{debug, warn};

/// One rasterised page, encoded and ready for the request body.
///
/// Owned transiently by the pipeline; discarded after the request is built.
/// Never written to disk.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 0-based index in document page order.
    pub page_index: usize,
    /// Base64-encoded JPEG bytes.
    pub data: String,
    /// Always `image/jpeg`.
    pub mime_type: &'static str,
}

impl PageImage {
    /// Render as an inline data URI: `data:image/jpeg;base64,<payload>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Encode a rasterised page as a base64 JPEG.
///
/// pdfium bitmaps carry an alpha channel; JPEG does not, so the image is
/// flattened to RGB first.
pub fn encode_page(
    page_index: usize,
    img: &DynamicImage,
) -> Result<PageImage, image::ImageError> {
    let mut buf = Vec::new();
    img.to_rgb8()
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)?;

    let data = STANDARD.encode(&buf);
    debug!("Encoded page {} → {} bytes base64", page_index + 1, data.len());

    Ok(PageImage {
        page_index,
        data,
        mime_type: "image/jpeg",
    })
}

/// Encode a sequence of rasterised pages, dropping any page that fails.
///
/// A page whose encode fails (or yields an empty payload) is dropped with a
/// warning; the survivors keep their original page indices and relative
/// order, so the request still presents the document front to back.
pub fn encode_pages(rendered: &[(usize, DynamicImage)]) -> Vec<PageImage> {
    rendered
        .iter()
        .filter_map(|(idx, img)| match encode_page(*idx, img) {
            Ok(page) if !page.data.is_empty() => Some(page),
            Ok(_) => {
                warn!("Dropping page {}: encoded to an empty payload", idx + 1);
                None
            }
            Err(e) => {
                warn!("Dropping page {}: encoding failed: {}", idx + 1, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let page = encode_page(0, &img).expect("encode should succeed");
        assert_eq!(page.mime_type, "image/jpeg");
        assert!(!page.data.is_empty());

        // Valid base64 decoding to a JPEG buffer (SOI marker FF D8).
        let decoded = STANDARD.decode(&page.data).expect("valid base64");
        assert!(decoded.len() > 2);
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn unencodable_page_is_dropped_and_order_is_kept() {
        let ok = |px| DynamicImage::ImageRgba8(RgbaImage::from_pixel(px, px, Rgba([0, 0, 0, 255])));
        // JPEG dimensions are 16-bit; a 65536-wide image cannot be encoded.
        let too_wide = DynamicImage::ImageRgba8(RgbaImage::new(65_536, 1));

        let rendered = vec![(0, ok(4)), (1, too_wide), (2, ok(4))];
        let pages = encode_pages(&rendered);

        let indices: Vec<usize> = pages.iter().map(|p| p.page_index).collect();
        assert_eq!(indices, vec![0, 2], "survivors keep document order");
        assert!(pages.iter().all(|p| !p.data.is_empty()));
    }

    #[test]
    fn data_uri_has_jpeg_prefix() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        let page = encode_page(3, &img).unwrap();
        let uri = page.data_uri();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert!(uri.len() > "data:image/jpeg;base64,".len());
        assert_eq!(page.page_index, 3);
    }
}
