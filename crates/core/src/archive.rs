//! Packaging rendered pages into a zip archive.

use crate::config::PngPage;
use crate::error::{ConversionError, Result};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Archive entry name for a 1-based page number.
pub fn page_entry_name(page_number: usize) -> String {
    format!("page_{}.png", page_number)
}

/// Zip `pages` in page order as `page_1.png`, `page_2.png`, ...
///
/// PNG data is already compressed, so entries are stored. Timestamps are fixed
/// to the zip epoch so identical pages give identical archives.
pub fn pack_pages(pages: &[PngPage]) -> Result<Vec<u8>> {
    let mut ordered: Vec<&PngPage> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page_number);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for page in ordered {
        writer
            .start_file(page_entry_name(page.page_number), options)
            .map_err(|e| ConversionError::encode("ZIP", e))?;
        writer.write_all(&page.data)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| ConversionError::encode("ZIP", e))?;
    Ok(cursor.into_inner())
}
