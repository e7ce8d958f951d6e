//! PDF to Word (.docx).
//!
//! Text is rebuilt as paragraphs from positioned glyph lines; raster images
//! on a page are appended after its text. Pages are separated by page breaks
//! and the document page size follows the first PDF page.

use crate::config::ExtractionConfig;
use crate::error::{ConversionError, Result};
use crate::pdf_engine::PdfEngine;
use crate::pdf_text::{group_into_lines, page_glyphs, printable_char, TextLine};
use docx_rs::{BreakType, Docx, Paragraph, Pic, Run};
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// EMUs per point (and per pixel, since images are placed at 72 DPI).
const EMU_PER_POINT: u32 = 12_700;

/// Twentieths of a point, the unit of docx page sizes.
const TWIPS_PER_POINT: f32 = 20.0;

/// Font size used when a paragraph carries no measurable glyphs, in half-points.
const DEFAULT_HALF_POINTS: usize = 22;

/// A paragraph of running text with its font size in points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub font_size: f32,
}

impl TextBlock {
    /// docx run size, in half-points.
    pub fn half_points(&self) -> usize {
        if self.font_size > 0.0 {
            ((self.font_size * 2.0).round() as usize).max(2)
        } else {
            DEFAULT_HALF_POINTS
        }
    }
}

/// A raster image found on a page, re-encoded as PNG.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Everything carried over from one PDF page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub width: f32,
    pub height: f32,
    pub paragraphs: Vec<TextBlock>,
    pub images: Vec<PageImage>,
}

/// Rebuilds PDFs as Word documents.
pub struct PdfDocxConverter {
    engine: Arc<PdfEngine>,
    config: ExtractionConfig,
}

impl PdfDocxConverter {
    pub fn new(engine: Arc<PdfEngine>, config: ExtractionConfig) -> Self {
        Self { engine, config }
    }

    /// Convert the PDF at `pdf_path` into a .docx at `docx_path`.
    pub fn convert_file(&self, pdf_path: &Path, docx_path: &Path) -> Result<()> {
        let pdf_bytes = std::fs::read(pdf_path)?;
        let pages = self.extract(&pdf_bytes)?;

        let file = std::fs::File::create(docx_path)?;
        write_docx(&pages, file)?;
        debug!("Wrote {} pages to {:?}", pages.len(), docx_path);
        Ok(())
    }

    /// Read text and images of every page.
    pub fn extract(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>> {
        let document = self.engine.open(pdf_bytes)?;

        let mut pages = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let lines = group_into_lines(page_glyphs(&page), self.config.line_tolerance);
            let paragraphs = layout_paragraphs(&lines, &self.config);
            let images = if self.config.embed_images {
                page_images(&document, &page, index)
            } else {
                Vec::new()
            };
            pages.push(PageContent {
                width: page.width().value,
                height: page.height().value,
                paragraphs,
                images,
            });
        }
        Ok(pages)
    }
}

fn page_images(document: &PdfDocument, page: &PdfPage, page_index: usize) -> Vec<PageImage> {
    let mut images = Vec::new();
    for object in page.objects().iter() {
        let Some(image_object) = object.as_image_object() else {
            continue;
        };
        let dynamic_image = match image_object.get_processed_image(document) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping unreadable image on page {}: {}", page_index + 1, e);
                continue;
            }
        };

        let mut png = Vec::new();
        if let Err(e) = dynamic_image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
            warn!("Skipping image on page {}: {}", page_index + 1, e);
            continue;
        }
        images.push(PageImage {
            png,
            width: dynamic_image.width(),
            height: dynamic_image.height(),
        });
    }
    images
}

/// Merge consecutive lines into paragraphs.
///
/// A line starts a new paragraph when the blank space above it is larger than
/// `paragraph_gap` times the height of the line before.
pub fn layout_paragraphs(lines: &[TextLine], config: &ExtractionConfig) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut text = String::new();
    let mut sizes: Vec<f32> = Vec::new();
    let mut previous: Option<&TextLine> = None;

    for line in lines {
        let line_text = line.text(config.word_gap);
        if line_text.is_empty() {
            continue;
        }

        if let Some(prev) = previous {
            let line_height = (prev.top() - prev.bottom()).max(f32::EPSILON);
            let gap = prev.bottom() - line.top();
            if gap > config.paragraph_gap * line_height {
                blocks.push(finish_block(&mut text, &mut sizes));
            }
        }

        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&line_text);
        sizes.push(line.font_size());
        previous = Some(line);
    }

    if !text.is_empty() {
        blocks.push(finish_block(&mut text, &mut sizes));
    }
    blocks
}

fn finish_block(text: &mut String, sizes: &mut Vec<f32>) -> TextBlock {
    let measured: Vec<f32> = sizes.drain(..).filter(|s| *s > 0.0).collect();
    let font_size = if measured.is_empty() {
        0.0
    } else {
        measured.iter().sum::<f32>() / measured.len() as f32
    };
    TextBlock {
        text: std::mem::take(text),
        font_size,
    }
}

/// Serialize `pages` as a .docx package into `writer`.
pub fn write_docx<W: Write + Seek>(pages: &[PageContent], writer: W) -> Result<()> {
    let mut docx = Docx::new();

    if let Some(first) = pages.first() {
        let width = (first.width * TWIPS_PER_POINT).round() as u32;
        let height = (first.height * TWIPS_PER_POINT).round() as u32;
        if width > 0 && height > 0 {
            docx = docx.page_size(width, height);
        }
    }

    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            docx = docx
                .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
        }

        for block in &page.paragraphs {
            let text: String = block.text.chars().filter_map(printable_char).collect();
            docx = docx.add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(text).size(block.half_points())),
            );
        }

        for image in &page.images {
            let (width, height) = fit_to_page(image, page.width);
            let pic = Pic::new(&image.png).size(width * EMU_PER_POINT, height * EMU_PER_POINT);
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)));
        }
    }

    docx.build()
        .pack(writer)
        .map_err(|e| ConversionError::encode("DOCX", e))
}

/// Image size in points, shrunk proportionally to the page width.
fn fit_to_page(image: &PageImage, page_width: f32) -> (u32, u32) {
    let (width, height) = (image.width.max(1), image.height.max(1));
    let limit = page_width.floor() as u32;
    if limit == 0 || width <= limit {
        return (width, height);
    }
    let scaled_height = (height as f32 * limit as f32 / width as f32).round() as u32;
    (limit, scaled_height.max(1))
}
