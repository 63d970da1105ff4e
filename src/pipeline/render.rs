//! Format conversion: PDF page 1 and JPEG images → PNG bytes.
//!
//! ## Why spawn_blocking?
//!
//! Rasterising a PDF through pdfium and decoding a large JPEG are both
//! CPU-bound, and pdfium keeps thread-local state that must not be touched
//! from async worker threads. Each conversion runs on tokio's blocking pool.
//!
//! ## Only the first page
//!
//! A PDF is reduced to a single PNG of its first page. Later pages are
//! dropped without notice.
//!
//! ## Locating pdfium
//!
//! The library is looked up in order: the configured path (file or
//! directory), `PDFIUM_LIB_PATH`, `<cache_dir>/attachment-relay/`, the
//! current directory, then the system library search path. When none can be
//! bound the PDF fails to convert, but every other file is unaffected.

use crate::attachment::SupportedType;
use crate::config::RelayConfig;
use crate::pipeline::encode;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory under the user cache dir searched for the pdfium library.
const CACHE_SUBDIR: &str = "attachment-relay";

/// Convert `bytes` of the given format to PNG.
///
/// PNG input is returned untouched. Errors are human-readable details that
/// the caller wraps into a conversion error for the file.
pub async fn to_png(
    format: SupportedType,
    bytes: Vec<u8>,
    config: &RelayConfig,
) -> Result<Vec<u8>, String> {
    match format {
        SupportedType::Png => Ok(bytes),
        SupportedType::Jpeg => {
            tokio::task::spawn_blocking(move || transcode_jpeg(&bytes))
                .await
                .map_err(|e| format!("JPEG conversion task panicked: {e}"))?
        }
        SupportedType::Pdf => {
            let max_pixels = config.pdf_max_pixels;
            let lib_path = config.pdfium_lib_path.clone();
            tokio::task::spawn_blocking(move || {
                render_first_page(&bytes, max_pixels, lib_path.as_deref())
            })
            .await
            .map_err(|e| format!("PDF render task panicked: {e}"))?
        }
    }
}

/// Decode a JPEG and re-encode it losslessly as PNG.
fn transcode_jpeg(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| e.to_string())?;
    encode::png_bytes(&img).map_err(|e| e.to_string())
}

/// Rasterise page 1 of an in-memory PDF to PNG.
fn render_first_page(
    bytes: &[u8],
    max_pixels: u32,
    lib_path: Option<&Path>,
) -> Result<Vec<u8>, String> {
    let pdfium = bind_pdfium(lib_path)?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| format!("could not open PDF: {e:?}"))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err("No images generated from PDF.".to_string());
    }
    info!("PDF loaded: {} pages, rendering page 1", total_pages);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let page = pages
        .get(0)
        .map_err(|e| format!("could not load page 1: {e:?}"))?;
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| format!("could not render page 1: {e:?}"))?;

    let image = bitmap.as_image();
    debug!("Rendered page 1 → {}x{} px", image.width(), image.height());

    encode::png_bytes(&image).map_err(|e| e.to_string())
}

/// Bind to the first pdfium library that loads.
fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, String> {
    let mut failures = Vec::new();

    for candidate in library_candidates(explicit) {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => failures.push(format!("{}: {e:?}", candidate.display())),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => Ok(Pdfium::new(bindings)),
        Err(e) => {
            failures.push(format!("system library: {e:?}"));
            Err(format!(
                "PDF rendering engine (pdfium) is unavailable; set PDFIUM_LIB_PATH. Tried {}",
                failures.join("; ")
            ))
        }
    }
}

/// Library files to try before the system search path, most specific first.
fn library_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(p) = explicit {
        candidates.push(library_file(p));
    }
    if let Ok(p) = std::env::var("PDFIUM_LIB_PATH") {
        if !p.is_empty() {
            candidates.push(library_file(Path::new(&p)));
        }
    }

    let fallbacks = dirs::cache_dir()
        .map(|d| d.join(CACHE_SUBDIR))
        .into_iter()
        .chain(std::env::current_dir().ok())
        .map(|d| d.join(Pdfium::pdfium_platform_library_name()))
        .filter(|p| p.exists());
    candidates.extend(fallbacks);

    candidates
}

/// Accept either the library file itself or the directory holding it.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(Pdfium::pdfium_platform_library_name())
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;

    fn jpeg_fixture() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([10, 200, 30])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    #[test]
    fn jpeg_becomes_png_with_same_dimensions() {
        let png = transcode_jpeg(&jpeg_fixture()).expect("transcode");
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn garbage_jpeg_fails() {
        assert!(transcode_jpeg(b"definitely not a jpeg").is_err());
        assert!(transcode_jpeg(&[]).is_err());
    }

    #[tokio::test]
    async fn png_passes_through_untouched() {
        let config = RelayConfig::builder("http://localhost/hook").build().unwrap();
        let bytes = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        let out = to_png(SupportedType::Png, bytes.clone(), &config)
            .await
            .unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn directory_resolves_to_platform_library_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = library_file(dir.path());
        assert_eq!(file.parent(), Some(dir.path()));
        assert_eq!(
            file.file_name().unwrap(),
            Pdfium::pdfium_platform_library_name().as_os_str()
        );

        let explicit = Path::new("/opt/pdfium/lib/libpdfium.so");
        assert_eq!(library_file(explicit), explicit.to_path_buf());
    }

    #[test]
    fn explicit_candidate_comes_first() {
        let candidates = library_candidates(Some(Path::new("/opt/custom/libpdfium.so")));
        assert_eq!(candidates[0], PathBuf::from("/opt/custom/libpdfium.so"));
    }
}
