//! # docshift-core
//!
//! Conversion dispatcher for everyday document formats.
//!
//! A [`Dispatcher`] takes one input file and a [`ConversionKind`] and returns
//! the converted bytes with a suggested filename and MIME type:
//!
//! - **Image to PDF** with `image` and `lopdf`
//! - **PDF to images**, **PDF to Excel** and **PDF to Word** with **pdfium**
//!   (Google's PDF engine)
//! - **Word to PDF** and **Excel to PDF** with headless **LibreOffice**
//!
//! Inputs that a converter can only read from disk are staged in a per-request
//! temporary directory that is removed when the request finishes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docshift_core::{ConversionKind, ConversionRequest, Dispatcher, DispatcherConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = Dispatcher::new(DispatcherConfig::default())?;
//!
//!     let request = ConversionRequest::from_path(ConversionKind::PdfToImages, "report.pdf")?;
//!     let result = dispatcher.convert(&request).await?;
//!
//!     std::fs::write(result.suggested_filename(), result.output_bytes())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Checking what this host can do
//!
//! ```rust,no_run
//! use docshift_core::DispatcherBuilder;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dispatcher = DispatcherBuilder::new().dpi(150).build()?;
//! for entry in dispatcher.availability() {
//!     println!("{}: {}", entry.kind, if entry.available { "ok" } else { "unavailable" });
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod image_pdf;
pub mod office;
pub mod pdf_docx;
pub mod pdf_engine;
pub mod pdf_renderer;
pub mod pdf_tables;
pub mod pdf_text;
pub mod staging;

// Re-export main types for convenience
pub use config::{
    BatchResult, ConversionKind, ConversionRequest, ConversionResult, DispatcherConfig,
    ExtractionConfig, FailedConversion, OfficeConfig, PngPage, RenderConfig, SheetLayout,
};
pub use dispatcher::{Dispatcher, DispatcherBuilder, KindAvailability};
pub use error::{ConversionError, ErrorKind, Result};
pub use office::{ExternalConverter, OfficeSuite};
pub use pdf_engine::PdfEngine;

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}
