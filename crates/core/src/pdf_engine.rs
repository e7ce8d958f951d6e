//! Binding to the pdfium shared library and PDF loading.

use crate::error::{ConversionError, Result};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a directory that holds the pdfium library.
pub const PDFIUM_PATH_ENV: &str = "PDFIUM_DYNAMIC_LIB_PATH";

/// A bound pdfium library, shared by every PDF-reading converter.
pub struct PdfEngine {
    pdfium: Pdfium,
}

impl std::fmt::Debug for PdfEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfEngine").finish_non_exhaustive()
    }
}

impl PdfEngine {
    /// Bind pdfium, trying `library_dir` first, then the environment,
    /// common install locations and finally the system library.
    pub fn bind(library_dir: Option<&Path>) -> Result<Self> {
        let mut errors = Vec::new();

        for dir in Self::candidate_dirs(library_dir) {
            match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)) {
                Ok(bindings) => {
                    info!("Bound pdfium from {:?}", dir);
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                    });
                }
                Err(e) => {
                    debug!("pdfium not usable at {:?}: {}", dir, e);
                    errors.push(format!("{}: {}", dir.display(), e));
                }
            }
        }

        match Pdfium::bind_to_system_library() {
            Ok(bindings) => {
                info!("Bound system pdfium library");
                Ok(Self {
                    pdfium: Pdfium::new(bindings),
                })
            }
            Err(e) => {
                errors.push(format!("system library: {}", e));
                Err(ConversionError::PdfEngineUnavailable(format!(
                    "failed to load pdfium library ({})",
                    errors.join("; ")
                )))
            }
        }
    }

    fn candidate_dirs(library_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(dir) = library_dir {
            dirs.push(dir.to_path_buf());
        }
        if let Ok(dir) = std::env::var(PDFIUM_PATH_ENV) {
            dirs.push(PathBuf::from(dir));
        }
        dirs.extend(["./", "/usr/lib", "/usr/local/lib"].map(PathBuf::from));
        dirs
    }

    /// Load a PDF from memory.
    pub fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<PdfDocument<'a>> {
        check_pdf_header(bytes)?;
        self.pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(map_load_error)
    }
}

/// Reject input that does not even start like a PDF.
pub fn check_pdf_header(bytes: &[u8]) -> Result<()> {
    if bytes.len() < 5 || &bytes[0..5] != b"%PDF-" {
        return Err(ConversionError::Render("Not a valid PDF file".to_string()));
    }
    Ok(())
}

/// Map pdfium load failures onto the render taxonomy.
pub(crate) fn map_load_error(err: PdfiumError) -> ConversionError {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            ConversionError::Encrypted
        }
        _ => ConversionError::Render(format!("Failed to load PDF: {}", err)),
    }
}
