//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread so the Tokio workers never stall during CPU-heavy rendering.
//!
//! ## Per-page failure policy
//!
//! A page whose render fails is dropped from the sequence with a warning
//! rather than aborting the run: the remaining pages usually carry enough of
//! the resume for the model to work with. Document-level failures (corrupt
//! file, wrong password) are fatal. The caller sees dropped pages in
//! [`crate::output::ExtractionStats::skipped_pages`].
//!
//! Rendering happens entirely in memory; no intermediate image files are
//! ever written to disk.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rasterise all pages of a PDF into images.
///
/// # Returns
/// The document page count and a vector of `(page_index_0based, DynamicImage)`
/// tuples in page order. The vector is shorter than the page count when
/// pages failed to render.
pub async fn render_pages(
    pdf_path: &Path,
    config: &ExtractionConfig,
) -> Result<(usize, Vec<(usize, DynamicImage)>), ExtractError> {
    let path = pdf_path.to_path_buf();
    let scale = config.scale;
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();

    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&path, scale, max_pixels, password.as_deref())
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Render task panicked: {}", e)))?
}

/// Bind to a pdfium library.
///
/// When `lib_path` is set (from `PDFIUM_LIB_PATH`) it is used exclusively, so
/// a misconfigured path fails loudly instead of silently falling back to a
/// different library version. Otherwise the system library is tried first,
/// then a bundled copy next to the executable.
fn bind_pdfium(lib_path: Option<&str>) -> Result<Pdfium, ExtractError> {
    let bindings = match lib_path {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library().or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        }),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

/// Fail the whole run when a non-empty document produced no images at all:
/// per-page tolerance is for the odd broken page, not for a rasteriser that
/// cannot handle the document.
fn ensure_some_pages_rendered(total_pages: usize, rendered: usize) -> Result<(), ExtractError> {
    if total_pages > 0 && rendered == 0 {
        return Err(ExtractError::RasterisationFailed {
            detail: format!("all {total_pages} pages failed to render"),
        });
    }
    Ok(())
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf_path: &Path,
    scale: f32,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<(usize, Vec<(usize, DynamicImage)>), ExtractError> {
    let lib_path = std::env::var("PDFIUM_LIB_PATH").ok();
    let pdfium = bind_pdfium(lib_path.as_deref())?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ExtractError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ExtractError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(scale)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        let page = match pages.get(idx as u16) {
            Ok(page) => page,
            Err(e) => {
                warn!("Dropping page {}: load failed: {:?}", idx + 1, e);
                continue;
            }
        };

        let bitmap = match page.render_with_config(&render_config) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                warn!("Dropping page {}: render failed: {:?}", idx + 1, e);
                continue;
            }
        };

        let image = bitmap.as_image();
        if image.width() == 0 || image.height() == 0 {
            warn!("Dropping page {}: rendered to an empty bitmap", idx + 1);
            continue;
        }

        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push((idx, image));
    }

    ensure_some_pages_rendered(total_pages, results.len())?;
    Ok((total_pages, results))
}
