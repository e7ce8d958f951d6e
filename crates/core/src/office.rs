//! Headless office-suite conversions (Word and Excel to PDF).
//!
//! Each call starts a fresh `soffice` process with its own user profile
//! directory, so concurrent conversions never share LibreOffice state. The
//! process is bounded by a timeout and killed if the caller gives up.

use crate::config::OfficeConfig;
use crate::error::{ConversionError, Result};
use crate::staging::substitute_extension;
use async_process::{Command, Stdio};
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Display name of the office suite in errors and logs.
pub const TOOL_NAME: &str = "LibreOffice";

/// A tool that turns a document on disk into a PDF on disk.
pub trait ExternalConverter: Send + Sync {
    /// Tool name for messages.
    fn name(&self) -> &str;

    /// Whether the tool can run on this host.
    fn is_available(&self) -> bool;

    /// Convert `input` and return the path of the PDF written inside `out_dir`.
    fn convert_to_pdf(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// LibreOffice running in headless batch mode.
#[derive(Debug, Clone)]
pub struct OfficeSuite {
    soffice_path: Option<PathBuf>,
    conversion_timeout: Duration,
}

impl OfficeSuite {
    /// Locate `soffice` according to `config`. A missing binary is not an
    /// error here; conversions report it when attempted.
    pub fn new(config: &OfficeConfig) -> Self {
        let soffice_path = match find_soffice(config) {
            Ok(path) => {
                info!("Using {} at {:?}", TOOL_NAME, path);
                Some(path)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        Self {
            soffice_path,
            conversion_timeout: config.conversion_timeout,
        }
    }

    /// Path of the resolved `soffice` binary.
    pub fn soffice_path(&self) -> Option<&Path> {
        self.soffice_path.as_deref()
    }

    pub fn conversion_timeout(&self) -> Duration {
        self.conversion_timeout
    }

    async fn run(&self, soffice: &Path, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        let start = Instant::now();

        // Sibling of the output directory so it never shows up in the output scan.
        let profile_base = out_dir.parent().unwrap_or(out_dir);
        let profile_dir = tempfile::Builder::new()
            .prefix("lo-profile-")
            .tempdir_in(profile_base)?;

        let mut cmd = Command::new(soffice);
        cmd.args(["--headless", "--norestore", "--nologo", "--nofirststartwizard"]);
        cmd.arg(format!(
            "-env:UserInstallation=file://{}",
            profile_dir.path().display()
        ));
        cmd.args(["--convert-to", "pdf", "--outdir"]);
        cmd.arg(out_dir);
        cmd.arg(input);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {:?} on {:?}", soffice, input);

        let output = timeout(self.conversion_timeout, cmd.output())
            .await
            .map_err(|_| {
                error!(
                    "{} timed out after {:?} on {:?}",
                    TOOL_NAME, self.conversion_timeout, input
                );
                ConversionError::Timeout {
                    tool: TOOL_NAME.to_string(),
                    path: input.to_path_buf(),
                    timeout_secs: self.conversion_timeout.as_secs(),
                }
            })?
            .map_err(|e| self.failure(input, format!("failed to start {:?}: {}", soffice, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                text => text.to_string(),
            };
            error!("{} conversion failed for {:?}: {}", TOOL_NAME, input, message);
            return Err(self.failure(input, message));
        }

        let pdf_path = locate_output(input, out_dir)
            .ok_or_else(|| self.failure(input, "PDF output file not found".to_string()))?;
        check_pdf_output(&pdf_path).map_err(|message| self.failure(input, message))?;

        debug!("Converted {:?} in {:?}", input.file_name(), start.elapsed());
        Ok(pdf_path)
    }

    fn failure(&self, input: &Path, message: String) -> ConversionError {
        ConversionError::ExternalTool {
            tool: TOOL_NAME.to_string(),
            path: input.to_path_buf(),
            message,
        }
    }
}

impl ExternalConverter for OfficeSuite {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn is_available(&self) -> bool {
        self.soffice_path.is_some()
    }

    fn convert_to_pdf(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> impl Future<Output = Result<PathBuf>> + Send {
        async move {
            let soffice = self
                .soffice_path
                .as_deref()
                .ok_or_else(|| ConversionError::ToolNotFound {
                    tool: TOOL_NAME.to_string(),
                })?;
            self.run(soffice, input, out_dir).await
        }
    }
}

/// Find the soffice binary.
pub fn find_soffice(config: &OfficeConfig) -> Result<PathBuf> {
    let not_found = || ConversionError::ToolNotFound {
        tool: TOOL_NAME.to_string(),
    };

    if let Some(ref path) = config.soffice_path {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(not_found());
    }

    let candidates = [
        // macOS
        "/Applications/LibreOffice.app/Contents/MacOS/soffice",
        // Linux
        "/usr/bin/soffice",
        "/usr/lib/libreoffice/program/soffice",
        "/opt/libreoffice/program/soffice",
        // Snap (Ubuntu)
        "/snap/bin/libreoffice.soffice",
    ];

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    which::which("soffice")
        .or_else(|_| which::which("libreoffice"))
        .map_err(|_| not_found())
}

/// `<out_dir>/<input stem>.pdf`, or any PDF in `out_dir` when the suite
/// chose a different name.
pub fn locate_output(input: &Path, out_dir: &Path) -> Option<PathBuf> {
    let file_name = input.file_name()?;
    let expected = substitute_extension(&out_dir.join(file_name), "pdf");
    if expected.is_file() {
        return Some(expected);
    }

    std::fs::read_dir(out_dir).ok().and_then(|entries| {
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
    })
}

/// Reject empty files and files that do not start with `%PDF`.
fn check_pdf_output(path: &Path) -> std::result::Result<(), String> {
    let file = std::fs::File::open(path).map_err(|e| format!("cannot open {:?}: {}", path, e))?;
    let mut header = Vec::with_capacity(4);
    file.take(4)
        .read_to_end(&mut header)
        .map_err(|e| format!("cannot read {:?}: {}", path, e))?;
    match header.as_slice() {
        [] => Err("produced an empty PDF".to_string()),
        b"%PDF" => Ok(()),
        _ => Err("produced a file that is not a PDF".to_string()),
    }
}
