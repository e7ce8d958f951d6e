//! PDF to PNG rendering using pdfium (Google's PDF engine).
//!
//! This module provides PDF page rendering with:
//! - Configurable DPI output
//! - Transparency flattened onto a background color
//! - Parallel PNG encoding via rayon

use crate::config::{PngPage, RenderConfig};
use crate::error::{ConversionError, Result};
use crate::pdf_engine::PdfEngine;
use image::RgbaImage;
use pdfium_render::prelude::*;
use rayon::prelude::*;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// PDF to PNG renderer using pdfium.
pub struct PdfRenderer {
    /// Render configuration.
    config: RenderConfig,
    /// Bound pdfium library.
    engine: Arc<PdfEngine>,
    /// Rayon thread pool for parallel encoding.
    thread_pool: rayon::ThreadPool,
}

impl PdfRenderer {
    /// Create a new PDF renderer.
    pub fn new(engine: Arc<PdfEngine>, config: RenderConfig) -> Result<Self> {
        config.validate()?;

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.render_threads)
            .build()
            .map_err(|e| {
                ConversionError::InvalidConfig(format!("Failed to create thread pool: {}", e))
            })?;

        info!(
            "PDF renderer initialized with {} threads, {} DPI",
            config.render_threads, config.dpi
        );

        Ok(Self {
            config,
            engine,
            thread_pool,
        })
    }

    /// Get the configured DPI.
    pub fn dpi(&self) -> u32 {
        self.config.dpi
    }

    /// Render all pages of an in-memory PDF to PNG images, in page order.
    ///
    /// Note: pdfium's PdfDocument is not thread-safe, so pages are rendered sequentially.
    /// PNG encoding is parallelized using rayon.
    pub fn render_all_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PngPage>> {
        let start = Instant::now();

        let document = self.engine.open(pdf_bytes)?;
        let page_count = document.pages().len() as usize;
        debug!("Rendering {} pages", page_count);

        if page_count == 0 {
            return Ok(vec![]);
        }

        // Render pages sequentially, collect raw images, then encode in parallel
        let mut raw_images: Vec<(usize, RgbaImage)> = Vec::with_capacity(page_count);

        for (page_idx, page) in document.pages().iter().enumerate() {
            let rgba_image = self.render_page(&page, page_idx)?;

            let final_image = if !self.config.use_alpha {
                self.apply_background(rgba_image)
            } else {
                rgba_image
            };

            raw_images.push((page_idx, final_image));
        }

        let compression = compression_for_level(self.config.png_compression);
        let rendered_pages: Vec<Result<PngPage>> = self.thread_pool.install(|| {
            raw_images
                .into_par_iter()
                .map(|(page_idx, image)| {
                    let png_data = encode_png_standalone(&image, compression)?;
                    Ok(PngPage {
                        page_number: page_idx + 1,
                        data: png_data,
                        width: image.width(),
                        height: image.height(),
                    })
                })
                .collect()
        });

        let mut pages = Vec::with_capacity(page_count);
        for result in rendered_pages {
            match result {
                Ok(page) => pages.push(page),
                Err(e) => {
                    error!("Failed to encode page: {:?}", e);
                    return Err(e);
                }
            }
        }

        pages.sort_by_key(|p| p.page_number);

        debug!("Rendered {} pages in {:?}", page_count, start.elapsed());

        Ok(pages)
    }

    /// Rasterize one page at the configured DPI.
    fn render_page(&self, page: &PdfPage, page_idx: usize) -> Result<RgbaImage> {
        let (width, height) =
            pixel_size(page.width().value, page.height().value, self.config.dpi);

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ConversionError::Render(format!("Failed to render page {}: {}", page_idx + 1, e))
        })?;

        Ok(bitmap.as_image().into_rgba8())
    }

    /// Apply background color to transparent areas.
    fn apply_background(&self, image: RgbaImage) -> RgbaImage {
        flatten_onto(image, self.config.background_color)
    }
}

/// Pixel size of a page of `width` x `height` points at `dpi`, never below 1.
pub fn pixel_size(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / 72.0;
    let width = (width_points * scale).round().max(1.0) as u32;
    let height = (height_points * scale).round().max(1.0) as u32;
    (width, height)
}

/// Blend every translucent pixel with `background` and make it opaque.
fn flatten_onto(mut image: RgbaImage, background: (u8, u8, u8)) -> RgbaImage {
    let (r, g, b) = background;

    for pixel in image.pixels_mut() {
        let alpha = pixel[3] as f32 / 255.0;
        if alpha < 1.0 {
            let inv_alpha = 1.0 - alpha;
            pixel[0] = ((pixel[0] as f32 * alpha) + (r as f32 * inv_alpha)).round() as u8;
            pixel[1] = ((pixel[1] as f32 * alpha) + (g as f32 * inv_alpha)).round() as u8;
            pixel[2] = ((pixel[2] as f32 * alpha) + (b as f32 * inv_alpha)).round() as u8;
            pixel[3] = 255;
        }
    }

    image
}

fn compression_for_level(level: u8) -> png::Compression {
    match level {
        0..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

/// Standalone PNG encoding function (Send + Sync safe for parallel execution).
fn encode_png_standalone(image: &RgbaImage, compression: png::Compression) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression);

    let mut writer = encoder
        .write_header()
        .map_err(|e| ConversionError::encode("PNG", format!("header: {}", e)))?;

    writer
        .write_image_data(image.as_raw())
        .map_err(|e| ConversionError::encode("PNG", format!("data: {}", e)))?;

    drop(writer);

    Ok(buffer.into_inner())
}
