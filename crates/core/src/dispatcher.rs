//! Conversion dispatcher that routes each request to its converter.
//!
//! Every request runs the same linear pipeline: validate the input, stage it
//! on disk when the converter needs a path, convert, read the result back and
//! remove the staging area. The first failure aborts the request; the
//! dispatcher itself keeps no per-request state and stays usable.

use crate::archive::pack_pages;
use crate::config::{
    BatchResult, ConversionKind, ConversionRequest, ConversionResult, DispatcherConfig,
    FailedConversion, SheetLayout,
};
use crate::error::{ConversionError, Result};
use crate::image_pdf::image_to_pdf;
use crate::office::{ExternalConverter, OfficeSuite};
use crate::pdf_docx::PdfDocxConverter;
use crate::pdf_engine::PdfEngine;
use crate::pdf_renderer::PdfRenderer;
use crate::pdf_tables::PdfTableExtractor;
use crate::staging::{substitute_extension, StagingArea};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Converters that read PDFs through pdfium.
struct PdfConverters {
    renderer: PdfRenderer,
    tables: PdfTableExtractor,
    docx: PdfDocxConverter,
}

/// Whether a conversion kind can run on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindAvailability {
    pub kind: ConversionKind,
    pub available: bool,
    /// Why the kind is unavailable.
    pub reason: Option<String>,
}

/// Routes conversion requests to the matching converter.
///
/// Generic over the office-suite capability so tests can substitute it.
pub struct Dispatcher<E: ExternalConverter = OfficeSuite> {
    office: E,
    pdf: std::result::Result<PdfConverters, String>,
    config: DispatcherConfig,
}

impl Dispatcher<OfficeSuite> {
    /// Create a dispatcher backed by LibreOffice.
    pub fn new(config: DispatcherConfig) -> Result<Self> {
        config.validate()?;
        let office = OfficeSuite::new(&config.office);
        Self::with_converter(config, office)
    }
}

impl<E: ExternalConverter> Dispatcher<E> {
    /// Create a dispatcher that uses `office` for Word and Excel input.
    ///
    /// A missing pdfium library does not fail construction; PDF kinds are
    /// reported unavailable instead.
    pub fn with_converter(config: DispatcherConfig, office: E) -> Result<Self> {
        config.validate()?;

        let pdf = match PdfEngine::bind(config.render.pdfium_library_path.as_deref()) {
            Ok(engine) => {
                let engine = Arc::new(engine);
                Ok(PdfConverters {
                    renderer: PdfRenderer::new(Arc::clone(&engine), config.render.clone())?,
                    tables: PdfTableExtractor::new(Arc::clone(&engine), config.extraction.clone()),
                    docx: PdfDocxConverter::new(engine, config.extraction.clone()),
                })
            }
            Err(e) => {
                warn!("PDF conversions disabled: {}", e);
                Err(e.to_string())
            }
        };

        info!(
            "Dispatcher ready (office suite: {}, pdf engine: {}, dpi={})",
            if office.is_available() { "yes" } else { "no" },
            if pdf.is_ok() { "yes" } else { "no" },
            config.render.dpi
        );

        Ok(Self {
            office,
            pdf,
            config,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// The office-suite capability.
    pub fn office(&self) -> &E {
        &self.office
    }

    /// Availability of every kind, in menu order.
    pub fn availability(&self) -> Vec<KindAvailability> {
        ConversionKind::ALL
            .into_iter()
            .map(|kind| {
                let reason = self.unavailable_reason(kind);
                KindAvailability {
                    kind,
                    available: reason.is_none(),
                    reason,
                }
            })
            .collect()
    }

    /// Whether `kind` can run on this host.
    pub fn is_available(&self, kind: ConversionKind) -> bool {
        self.unavailable_reason(kind).is_none()
    }

    fn unavailable_reason(&self, kind: ConversionKind) -> Option<String> {
        if kind.requires_pdf_engine() {
            if let Err(reason) = &self.pdf {
                return Some(reason.clone());
            }
        }
        if kind.requires_office_suite() && !self.office.is_available() {
            return Some(format!("{} not found", self.office.name()));
        }
        None
    }

    /// Convert one request.
    pub async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        let request_id = Uuid::new_v4();
        let span = info_span!("convert", %request_id, kind = request.kind().slug());

        async move {
            let start = Instant::now();
            info!(
                "Converting {:?} ({} bytes)",
                request.input_name(),
                request.input_bytes().len()
            );

            match self.run(request).await {
                Ok(bytes) => {
                    let result = ConversionResult::new(request.kind(), bytes, start.elapsed());
                    info!(
                        "Produced {} ({} bytes) in {:?}",
                        result.suggested_filename(),
                        result.output_bytes().len(),
                        result.duration()
                    );
                    Ok(result)
                }
                Err(e) => {
                    error!("Conversion failed ({}): {}", e.kind(), e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &ConversionRequest) -> Result<Vec<u8>> {
        validate_input(request)?;
        let kind = request.kind();
        let bytes = request.input_bytes();

        match kind {
            ConversionKind::ImageToPdf => image_to_pdf(bytes),
            ConversionKind::PdfToImages => {
                let pages = self.pdf_converters()?.renderer.render_all_pages(bytes)?;
                debug!("Packing {} pages", pages.len());
                pack_pages(&pages)
            }
            ConversionKind::PdfToExcel => self.pdf_converters()?.tables.convert(bytes),
            ConversionKind::PdfToWord => {
                let converters = self.pdf_converters()?;
                let staging = self.staging_area()?;
                let pdf_path = staging.stage(bytes, "pdf")?;
                let docx_path = substitute_extension(&pdf_path, "docx");
                converters.docx.convert_file(&pdf_path, &docx_path)?;
                let output = staging.read_back(&docx_path)?;
                staging.close();
                Ok(output)
            }
            ConversionKind::WordToPdf | ConversionKind::ExcelToPdf => {
                if !self.office.is_available() {
                    return Err(ConversionError::ToolNotFound {
                        tool: self.office.name().to_string(),
                    });
                }
                let staging = self.staging_area()?;
                let input_path = staging.stage(bytes, &request.staging_extension())?;
                let out_dir = staging.output_dir()?;
                let pdf_path = self.office.convert_to_pdf(&input_path, &out_dir).await?;
                let output = staging.read_back(&pdf_path)?;
                staging.close();
                Ok(output)
            }
        }
    }

    fn pdf_converters(&self) -> Result<&PdfConverters> {
        self.pdf
            .as_ref()
            .map_err(|reason| ConversionError::PdfEngineUnavailable(reason.clone()))
    }

    fn staging_area(&self) -> Result<StagingArea> {
        StagingArea::new(self.config.office.temp_dir.as_deref())
    }

    /// Convert several requests one after another. A failure never stops the batch.
    pub async fn convert_batch(&self, requests: Vec<ConversionRequest>) -> BatchResult {
        let start = Instant::now();
        let mut successful = Vec::new();
        let mut failed = Vec::new();

        for request in requests {
            match self.convert(&request).await {
                Ok(result) => successful.push((request.input_name().to_string(), result)),
                Err(error) => failed.push(FailedConversion {
                    input_name: request.input_name().to_string(),
                    error,
                }),
            }
        }

        BatchResult {
            successful,
            failed,
            total_duration: start.elapsed(),
        }
    }
}

/// Reject inputs whose extension belongs to a different kind.
fn validate_input(request: &ConversionRequest) -> Result<()> {
    let kind = request.kind();
    match request.extension() {
        Some(extension) if !kind.accepts_extension(&extension) => {
            Err(ConversionError::UnsupportedInput {
                kind: kind.label().to_string(),
                extension,
            })
        }
        _ => Ok(()),
    }
}

/// Builder for creating a Dispatcher with custom settings.
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: DispatcherConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the DPI for rendering.
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.render.dpi = dpi;
        self
    }

    /// Set the number of render threads.
    pub fn render_threads(mut self, threads: usize) -> Self {
        self.config.render.render_threads = threads;
        self
    }

    /// Set the office-suite timeout.
    pub fn conversion_timeout(mut self, timeout: Duration) -> Self {
        self.config.office.conversion_timeout = timeout;
        self
    }

    /// Set the path to soffice binary.
    pub fn soffice_path(mut self, path: PathBuf) -> Self {
        self.config.office.soffice_path = Some(path);
        self
    }

    /// Set the directory holding the pdfium library.
    pub fn pdfium_library_path(mut self, path: PathBuf) -> Self {
        self.config.render.pdfium_library_path = Some(path);
        self
    }

    /// Set the temporary directory.
    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.config.office.temp_dir = Some(dir);
        self
    }

    /// Set the workbook layout for PDF to Excel.
    pub fn sheet_layout(mut self, layout: SheetLayout) -> Self {
        self.config.extraction.sheet_layout = layout;
        self
    }

    /// Enable or disable page images in PDF to Word.
    pub fn embed_images(mut self, enabled: bool) -> Self {
        self.config.extraction.embed_images = enabled;
        self
    }

    /// Build a dispatcher backed by LibreOffice.
    pub fn build(self) -> Result<Dispatcher> {
        Dispatcher::new(self.config)
    }

    /// Build a dispatcher with a custom office-suite capability.
    pub fn build_with<E: ExternalConverter>(self, office: E) -> Result<Dispatcher<E>> {
        Dispatcher::with_converter(self.config, office)
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
