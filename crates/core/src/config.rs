//! Configuration and request/result types for docshift conversions.

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the headless office suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Path to soffice binary. If None, well-known locations and PATH are searched.
    pub soffice_path: Option<PathBuf>,

    /// Timeout for a single office-suite conversion.
    /// Default: 120 seconds.
    pub conversion_timeout: Duration,

    /// Directory under which per-request staging directories are created.
    /// Default: system temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            soffice_path: None,
            conversion_timeout: Duration::from_secs(120),
            temp_dir: None,
        }
    }
}

impl OfficeConfig {
    /// Set the soffice binary path.
    pub fn soffice_path(mut self, path: PathBuf) -> Self {
        self.soffice_path = Some(path);
        self
    }

    /// Set the conversion timeout.
    pub fn conversion_timeout(mut self, timeout: Duration) -> Self {
        self.conversion_timeout = timeout;
        self
    }

    /// Set the temporary directory.
    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = Some(dir);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.conversion_timeout.is_zero() {
            return Err(ConversionError::InvalidConfig(
                "conversion_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for PDF to PNG rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output DPI (dots per inch). At 72 a page of W x H points renders to
    /// W x H pixels.
    /// Default: 72.
    pub dpi: u32,

    /// Number of threads for parallel PNG encoding.
    /// Default: number of CPU cores.
    pub render_threads: usize,

    /// PNG compression level (0-9, higher = smaller file, slower).
    /// Default: 6.
    pub png_compression: u8,

    /// Whether to keep the alpha channel (transparency).
    /// Default: false.
    pub use_alpha: bool,

    /// Background color for pages (if not using alpha).
    /// Default: white (255, 255, 255).
    pub background_color: (u8, u8, u8),

    /// Directory containing the pdfium shared library.
    /// Default: search `PDFIUM_DYNAMIC_LIB_PATH`, common locations, then the system library.
    pub pdfium_library_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 72,
            render_threads: num_cpus::get(),
            png_compression: 6,
            use_alpha: false,
            background_color: (255, 255, 255),
            pdfium_library_path: None,
        }
    }
}

impl RenderConfig {
    /// Create a render config with specified DPI.
    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    /// Set the number of render threads.
    pub fn render_threads(mut self, threads: usize) -> Self {
        self.render_threads = threads;
        self
    }

    /// Set PNG compression level.
    pub fn png_compression(mut self, level: u8) -> Self {
        self.png_compression = level.min(9);
        self
    }

    /// Enable alpha channel.
    pub fn use_alpha(mut self, enabled: bool) -> Self {
        self.use_alpha = enabled;
        self
    }

    /// Set the directory holding the pdfium library.
    pub fn pdfium_library_path(mut self, path: PathBuf) -> Self {
        self.pdfium_library_path = Some(path);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 || self.dpi > 1200 {
            return Err(ConversionError::InvalidConfig(
                "dpi must be between 1 and 1200".to_string(),
            ));
        }
        if self.render_threads == 0 {
            return Err(ConversionError::InvalidConfig(
                "render_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How extracted PDF tables are laid out in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SheetLayout {
    /// Rows of every page on one sheet, pages separated by an empty row.
    #[default]
    SingleSheet,
    /// One sheet per PDF page.
    SheetPerPage,
}

/// Thresholds for turning positioned glyphs into lines, cells and paragraphs.
/// Distances are in PDF points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum vertical distance between glyph tops on the same line.
    pub line_tolerance: f32,

    /// Horizontal gap that separates two words when the PDF has no space glyph.
    pub word_gap: f32,

    /// Horizontal gap that separates two table cells.
    pub cell_gap: f32,

    /// Maximum distance between cell left edges that share a column.
    pub column_tolerance: f32,

    /// Vertical gap, as a multiple of line height, that starts a new paragraph.
    pub paragraph_gap: f32,

    /// Workbook layout for PDF to Excel.
    pub sheet_layout: SheetLayout,

    /// Whether PDF to Word embeds page images.
    pub embed_images: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 5.0,
            word_gap: 1.5,
            cell_gap: 12.0,
            column_tolerance: 6.0,
            paragraph_gap: 1.5,
            sheet_layout: SheetLayout::SingleSheet,
            embed_images: true,
        }
    }
}

impl ExtractionConfig {
    /// Set the workbook layout.
    pub fn sheet_layout(mut self, layout: SheetLayout) -> Self {
        self.sheet_layout = layout;
        self
    }

    /// Set the cell gap.
    pub fn cell_gap(mut self, gap: f32) -> Self {
        self.cell_gap = gap;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("line_tolerance", self.line_tolerance),
            ("word_gap", self.word_gap),
            ("cell_gap", self.cell_gap),
            ("column_tolerance", self.column_tolerance),
            ("paragraph_gap", self.paragraph_gap),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConversionError::InvalidConfig(format!(
                    "{} must be a positive number",
                    name
                )));
            }
        }
        if self.cell_gap <= self.word_gap {
            return Err(ConversionError::InvalidConfig(
                "cell_gap must be larger than word_gap".to_string(),
            ));
        }
        Ok(())
    }
}

/// Combined configuration for the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Office suite configuration.
    pub office: OfficeConfig,

    /// Render configuration.
    pub render: RenderConfig,

    /// Text and table extraction configuration.
    pub extraction: ExtractionConfig,
}

impl DispatcherConfig {
    /// Load a configuration from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConversionError::InvalidConfig(format!("malformed JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.office.validate()?;
        self.render.validate()?;
        self.extraction.validate()?;
        Ok(())
    }
}

/// The six supported conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionKind {
    ImageToPdf,
    PdfToImages,
    PdfToExcel,
    PdfToWord,
    WordToPdf,
    ExcelToPdf,
}

impl ConversionKind {
    /// Every kind, in menu order.
    pub const ALL: [ConversionKind; 6] = [
        ConversionKind::ImageToPdf,
        ConversionKind::PdfToImages,
        ConversionKind::PdfToExcel,
        ConversionKind::PdfToWord,
        ConversionKind::WordToPdf,
        ConversionKind::ExcelToPdf,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            ConversionKind::ImageToPdf => "Image to PDF",
            ConversionKind::PdfToImages => "PDF to images",
            ConversionKind::PdfToExcel => "PDF to Excel",
            ConversionKind::PdfToWord => "PDF to Word",
            ConversionKind::WordToPdf => "Word to PDF",
            ConversionKind::ExcelToPdf => "Excel to PDF",
        }
    }

    /// Machine-friendly label, e.g. `pdf-to-images`.
    pub fn slug(self) -> &'static str {
        match self {
            ConversionKind::ImageToPdf => "image-to-pdf",
            ConversionKind::PdfToImages => "pdf-to-images",
            ConversionKind::PdfToExcel => "pdf-to-excel",
            ConversionKind::PdfToWord => "pdf-to-word",
            ConversionKind::WordToPdf => "word-to-pdf",
            ConversionKind::ExcelToPdf => "excel-to-pdf",
        }
    }

    /// Filename offered for the converted artifact.
    pub fn output_filename(self) -> &'static str {
        match self {
            ConversionKind::ImageToPdf
            | ConversionKind::WordToPdf
            | ConversionKind::ExcelToPdf => "converted.pdf",
            ConversionKind::PdfToImages => "images.zip",
            ConversionKind::PdfToExcel => "converted.xlsx",
            ConversionKind::PdfToWord => "converted.docx",
        }
    }

    /// MIME type of the converted artifact.
    pub fn mime_type(self) -> &'static str {
        match self {
            ConversionKind::ImageToPdf
            | ConversionKind::WordToPdf
            | ConversionKind::ExcelToPdf => "application/pdf",
            ConversionKind::PdfToImages => "application/zip",
            ConversionKind::PdfToExcel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ConversionKind::PdfToWord => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Input file extensions this kind accepts (lowercase, no dot).
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            ConversionKind::ImageToPdf => {
                &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"]
            }
            ConversionKind::PdfToImages | ConversionKind::PdfToExcel | ConversionKind::PdfToWord => {
                &["pdf"]
            }
            ConversionKind::WordToPdf => &["docx", "doc"],
            ConversionKind::ExcelToPdf => &["xlsx", "xls"],
        }
    }

    /// Extension used when the input name carries none.
    pub fn default_extension(self) -> &'static str {
        self.accepted_extensions()[0]
    }

    /// Check if this kind accepts an extension.
    pub fn accepts_extension(self, ext: &str) -> bool {
        self.accepted_extensions()
            .iter()
            .any(|&e| e.eq_ignore_ascii_case(ext))
    }

    /// Whether this kind reads PDFs through pdfium.
    pub fn requires_pdf_engine(self) -> bool {
        matches!(
            self,
            ConversionKind::PdfToImages | ConversionKind::PdfToExcel | ConversionKind::PdfToWord
        )
    }

    /// Whether this kind shells out to the office suite.
    pub fn requires_office_suite(self) -> bool {
        matches!(self, ConversionKind::WordToPdf | ConversionKind::ExcelToPdf)
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConversionKind {
    type Err = ConversionError;

    /// Accepts slugs (`pdf-to-word`), labels (`PDF to Word`) and variant
    /// names (`PdfToWord`), ignoring case and separators.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        ConversionKind::ALL
            .into_iter()
            .find(|kind| kind.slug().replace('-', "") == wanted)
            .ok_or_else(|| ConversionError::UnknownKind(s.to_string()))
    }
}

/// A single conversion request. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    kind: ConversionKind,
    input_bytes: Vec<u8>,
    input_name: String,
}

impl ConversionRequest {
    /// Create a new conversion request.
    pub fn new(kind: ConversionKind, input_bytes: Vec<u8>, input_name: impl Into<String>) -> Self {
        Self {
            kind,
            input_bytes,
            input_name: input_name.into(),
        }
    }

    /// Read the input from disk, keeping its file name.
    pub fn from_path(kind: ConversionKind, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input_bytes = std::fs::read(path)?;
        let input_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(kind, input_bytes, input_name))
    }

    pub fn kind(&self) -> ConversionKind {
        self.kind
    }

    pub fn input_bytes(&self) -> &[u8] {
        &self.input_bytes
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Lowercase extension of the input name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.input_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_ascii_lowercase())
    }

    /// Extension to give the staged input file.
    pub fn staging_extension(&self) -> String {
        self.extension()
            .filter(|ext| self.kind.accepts_extension(ext))
            .unwrap_or_else(|| self.kind.default_extension().to_string())
    }
}

/// The outcome of one successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    kind: ConversionKind,
    output_bytes: Vec<u8>,
    suggested_filename: String,
    mime_type: String,
    duration: Duration,
}

impl ConversionResult {
    /// Wrap converted bytes with the filename and MIME type for `kind`.
    pub fn new(kind: ConversionKind, output_bytes: Vec<u8>, duration: Duration) -> Self {
        Self {
            kind,
            output_bytes,
            suggested_filename: kind.output_filename().to_string(),
            mime_type: kind.mime_type().to_string(),
            duration,
        }
    }

    pub fn kind(&self) -> ConversionKind {
        self.kind
    }

    pub fn output_bytes(&self) -> &[u8] {
        &self.output_bytes
    }

    pub fn suggested_filename(&self) -> &str {
        &self.suggested_filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Processing time for this conversion.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Consume the result, keeping only the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.output_bytes
    }
}

/// A single rendered page.
#[derive(Debug, Clone)]
pub struct PngPage {
    /// Page number (1-indexed).
    pub page_number: usize,

    /// PNG image data.
    pub data: Vec<u8>,

    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,
}

/// Result of a sequential batch of conversions.
#[derive(Debug)]
pub struct BatchResult {
    /// Successful conversions, with the input name they came from.
    pub successful: Vec<(String, ConversionResult)>,

    /// Failed conversions.
    pub failed: Vec<FailedConversion>,

    /// Total processing time.
    pub total_duration: Duration,
}

/// Information about a failed conversion.
#[derive(Debug)]
pub struct FailedConversion {
    /// Input name of the request.
    pub input_name: String,

    /// The error that aborted it.
    pub error: ConversionError,
}

#[cfg(test)]
mod tests {
    use super::*;

    // OfficeConfig tests
    #[test]
    fn test_office_config_defaults() {
        let config = OfficeConfig::default();
        assert_eq!(config.conversion_timeout.as_secs(), 120);
        assert!(config.temp_dir.is_none());
        assert!(config.soffice_path.is_none());
    }

    #[test]
    fn test_office_config_builder_pattern() {
        let config = OfficeConfig::default()
            .conversion_timeout(Duration::from_secs(60))
            .soffice_path(PathBuf::from("/opt/lo/soffice"))
            .temp_dir(PathBuf::from("/scratch"));

        assert_eq!(config.conversion_timeout.as_secs(), 60);
        assert_eq!(config.soffice_path, Some(PathBuf::from("/opt/lo/soffice")));
        assert_eq!(config.temp_dir, Some(PathBuf::from("/scratch")));
    }

    #[test]
    fn test_office_config_validation_zero_timeout() {
        let config = OfficeConfig::default().conversion_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = OfficeConfig::default().conversion_timeout(Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    // RenderConfig tests
    #[test]
    fn test_render_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.dpi, 72);
        assert!(config.render_threads > 0);
        assert_eq!(config.png_compression, 6);
        assert!(!config.use_alpha);
        assert_eq!(config.background_color, (255, 255, 255));
        assert!(config.pdfium_library_path.is_none());
    }

    #[test]
    fn test_render_config_builder_pattern() {
        let config = RenderConfig::with_dpi(150)
            .render_threads(2)
            .png_compression(9)
            .use_alpha(true);

        assert_eq!(config.dpi, 150);
        assert_eq!(config.render_threads, 2);
        assert_eq!(config.png_compression, 9);
        assert!(config.use_alpha);
    }

    #[test]
    fn test_render_config_png_compression_clamped() {
        let config = RenderConfig::default().png_compression(15);
        assert_eq!(config.png_compression, 9);
    }

    #[test]
    fn test_render_config_validation() {
        assert!(RenderConfig::with_dpi(300).validate().is_ok());
        assert!(RenderConfig::with_dpi(0).validate().is_err());
        assert!(RenderConfig::with_dpi(1201).validate().is_err());
        assert!(RenderConfig::default().render_threads(0).validate().is_err());
    }

    // ExtractionConfig tests
    #[test]
    fn test_extraction_config_defaults_are_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sheet_layout, SheetLayout::SingleSheet);
        assert!(config.embed_images);
    }

    #[test]
    fn test_extraction_config_rejects_bad_thresholds() {
        let mut config = ExtractionConfig::default();
        config.line_tolerance = 0.0;
        assert!(config.validate().is_err());

        let config = ExtractionConfig::default().cell_gap(1.0);
        assert!(config.validate().is_err(), "cell_gap below word_gap");

        let mut config = ExtractionConfig::default();
        config.paragraph_gap = f32::NAN;
        assert!(config.validate().is_err());
    }

    // DispatcherConfig tests
    #[test]
    fn test_dispatcher_config_validate_propagates() {
        let mut config = DispatcherConfig::default();
        config.render.dpi = 0;
        assert!(config.validate().is_err());

        let mut config = DispatcherConfig::default();
        config.office.conversion_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dispatcher_config_from_partial_json() {
        let config = DispatcherConfig::from_json_str(
            r#"{
                "render": { "dpi": 150 },
                "extraction": { "sheet_layout": "sheet-per-page" },
                "office": { "soffice_path": "/usr/bin/soffice" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.render.dpi, 150);
        assert_eq!(config.render.background_color, (255, 255, 255));
        assert_eq!(config.extraction.sheet_layout, SheetLayout::SheetPerPage);
        assert_eq!(config.office.soffice_path, Some(PathBuf::from("/usr/bin/soffice")));
        assert_eq!(config.office.conversion_timeout.as_secs(), 120);
    }

    #[test]
    fn test_dispatcher_config_from_json_rejects_invalid() {
        assert!(DispatcherConfig::from_json_str("{ not json").is_err());
        assert!(DispatcherConfig::from_json_str(r#"{"render": {"dpi": 0}}"#).is_err());
    }

    #[test]
    fn test_dispatcher_config_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docshift.json");
        let mut config = DispatcherConfig::default();
        config.render.dpi = 96;
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = DispatcherConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded.render.dpi, 96);
    }

    // ConversionKind tests
    #[test]
    fn test_kind_output_table() {
        use ConversionKind::*;
        let expected = [
            (ImageToPdf, "converted.pdf", "application/pdf"),
            (PdfToImages, "images.zip", "application/zip"),
            (
                PdfToExcel,
                "converted.xlsx",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                PdfToWord,
                "converted.docx",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ),
            (WordToPdf, "converted.pdf", "application/pdf"),
            (ExcelToPdf, "converted.pdf", "application/pdf"),
        ];
        for (kind, filename, mime) in expected {
            assert_eq!(kind.output_filename(), filename);
            assert_eq!(kind.mime_type(), mime);
        }
    }

    #[test]
    fn test_kind_parse_accepts_labels_and_slugs() {
        for kind in ConversionKind::ALL {
            assert_eq!(kind.slug().parse::<ConversionKind>().unwrap(), kind);
            assert_eq!(kind.label().parse::<ConversionKind>().unwrap(), kind);
            assert_eq!(format!("{:?}", kind).parse::<ConversionKind>().unwrap(), kind);
        }
        assert_eq!(
            "PDF_TO_WORD".parse::<ConversionKind>().unwrap(),
            ConversionKind::PdfToWord
        );
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        let err = "pdf-to-mp3".parse::<ConversionKind>().unwrap_err();
        assert!(matches!(err, ConversionError::UnknownKind(_)));
        assert!("".parse::<ConversionKind>().is_err());
    }

    #[test]
    fn test_kind_serde_uses_slug() {
        let json = serde_json::to_string(&ConversionKind::PdfToImages).unwrap();
        assert_eq!(json, "\"pdf-to-images\"");
        let kind: ConversionKind = serde_json::from_str("\"excel-to-pdf\"").unwrap();
        assert_eq!(kind, ConversionKind::ExcelToPdf);
    }

    #[test]
    fn test_kind_extensions() {
        assert!(ConversionKind::ImageToPdf.accepts_extension("JPG"));
        assert!(ConversionKind::PdfToWord.accepts_extension("pdf"));
        assert!(!ConversionKind::WordToPdf.accepts_extension("xlsx"));
        assert_eq!(ConversionKind::ExcelToPdf.default_extension(), "xlsx");
        assert_eq!(ConversionKind::WordToPdf.default_extension(), "docx");
    }

    #[test]
    fn test_kind_dependencies() {
        let pdf: Vec<_> = ConversionKind::ALL
            .into_iter()
            .filter(|k| k.requires_pdf_engine())
            .collect();
        assert_eq!(pdf.len(), 3);
        assert!(!ConversionKind::ImageToPdf.requires_pdf_engine());
        assert!(!ConversionKind::ImageToPdf.requires_office_suite());
        assert!(ConversionKind::ExcelToPdf.requires_office_suite());
    }

    // ConversionRequest tests
    #[test]
    fn test_conversion_request_new() {
        let request = ConversionRequest::new(ConversionKind::WordToPdf, vec![1, 2, 3], "Report.DOCX");
        assert_eq!(request.kind(), ConversionKind::WordToPdf);
        assert_eq!(request.input_bytes(), &[1, 2, 3]);
        assert_eq!(request.input_name(), "Report.DOCX");
        assert_eq!(request.extension().as_deref(), Some("docx"));
        assert_eq!(request.staging_extension(), "docx");
    }

    #[test]
    fn test_conversion_request_staging_extension_defaults() {
        let request = ConversionRequest::new(ConversionKind::ExcelToPdf, vec![], "upload");
        assert_eq!(request.extension(), None);
        assert_eq!(request.staging_extension(), "xlsx");

        let request = ConversionRequest::new(ConversionKind::ExcelToPdf, vec![], "book.xls");
        assert_eq!(request.staging_extension(), "xls");
    }

    #[test]
    fn test_conversion_request_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let request = ConversionRequest::from_path(ConversionKind::ImageToPdf, &path).unwrap();
        assert_eq!(request.input_name(), "scan.png");
        assert_eq!(request.input_bytes(), b"not really a png");
    }

    #[test]
    fn test_conversion_request_from_missing_path() {
        let result = ConversionRequest::from_path(ConversionKind::ImageToPdf, "/nonexistent/x.png");
        assert!(matches!(result, Err(ConversionError::Io(_))));
    }

    // ConversionResult tests
    #[test]
    fn test_conversion_result_uses_kind_table() {
        let result = ConversionResult::new(
            ConversionKind::PdfToImages,
            vec![b'P', b'K'],
            Duration::from_millis(5),
        );
        assert_eq!(result.suggested_filename(), "images.zip");
        assert_eq!(result.mime_type(), "application/zip");
        assert_eq!(result.duration(), Duration::from_millis(5));
        assert_eq!(result.into_bytes(), vec![b'P', b'K']);
    }
}
