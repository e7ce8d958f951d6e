//! Per-request temporary storage for converters that need file paths.
//!
//! Every request gets its own uniquely named directory. Staged inputs, derived
//! outputs and office-suite output directories all live inside it, so removing
//! the directory releases every artifact the request created.

use crate::error::{ConversionError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Name stem of staged input files.
const INPUT_STEM: &str = "input";

/// Scoped temporary directory owned by a single conversion.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a staging directory under `base`, or the system temp dir.
    pub fn new(base: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docshift-");
        let dir = match base {
            Some(base) => {
                std::fs::create_dir_all(base)?;
                builder.tempdir_in(base)?
            }
            None => builder.tempdir()?,
        };
        debug!("Created staging area {:?}", dir.path());
        Ok(Self { dir })
    }

    /// Root of the staging directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `bytes` to `input.<extension>` and return its path.
    pub fn stage(&self, bytes: &[u8], extension: &str) -> Result<PathBuf> {
        let path = self.path().join(format!("{}.{}", INPUT_STEM, extension));
        std::fs::write(&path, bytes)?;
        debug!("Staged {} bytes at {:?}", bytes.len(), path);
        Ok(path)
    }

    /// Create (once) and return a subdirectory for converter output.
    pub fn output_dir(&self) -> Result<PathBuf> {
        let dir = self.path().join("out");
        std::fs::create_dir_all(&dir).map_err(|e| {
            ConversionError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create output directory {:?}: {}", dir, e),
            ))
        })?;
        Ok(dir)
    }

    /// Read a converter's output back into memory.
    pub fn read_back(&self, path: &Path) -> Result<Vec<u8>> {
        let bytes = std::fs::read(path)?;
        debug!("Read back {} bytes from {:?}", bytes.len(), path);
        Ok(bytes)
    }

    /// Remove the directory now, logging instead of failing if that does not work.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove staging area {:?}: {}", path, e);
        }
    }
}

/// Swap the extension of `path`, e.g. `input.pdf` -> `input.docx`.
pub fn substitute_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}
