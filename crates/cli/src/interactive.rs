//! Prompt-driven conversion loop.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use docshift_core::{ConversionKind, Dispatcher};
use std::path::{Path, PathBuf};

use crate::{convert_file, report_failure, resolve_output, Cli};

/// Keep converting files until the user declines. Values given on the
/// command line are used for the first round only.
pub async fn session(dispatcher: &Dispatcher, cli: &Cli) -> Result<()> {
    println!("=== docshift ===");
    let mut preset_kind = cli.kind;
    let mut preset_input = cli.input.clone();
    let mut preset_output = cli.output.clone();

    loop {
        let kind = match preset_kind.take() {
            Some(kind) => kind,
            None => choose_kind(dispatcher)?,
        };
        let input = match preset_input.take() {
            Some(path) => path,
            None => ask_input_path(kind)?,
        };
        let output = match preset_output.take() {
            Some(path) => resolve_output(Some(&path), kind.output_filename()),
            None => ask_output_path(&input, kind)?,
        };

        if let Err(e) = convert_file(dispatcher, kind, &input, Some(&output)).await {
            report_failure(&e);
        }

        let again = Confirm::new()
            .with_prompt("Convert another file?")
            .default(false)
            .interact()
            .context("prompt failed")?;
        if !again {
            return Ok(());
        }
    }
}

fn choose_kind(dispatcher: &Dispatcher) -> Result<ConversionKind> {
    let availability = dispatcher.availability();
    let items: Vec<String> = availability
        .iter()
        .map(|entry| match &entry.reason {
            None => entry.kind.label().to_string(),
            Some(reason) => format!("{} (unavailable: {})", entry.kind.label(), reason),
        })
        .collect();

    let selected = Select::new()
        .with_prompt("Choose a conversion (arrow keys, Enter to confirm)")
        .items(&items)
        .default(0)
        .interact()
        .context("conversion selection failed")?;

    Ok(availability[selected].kind)
}

fn ask_input_path(kind: ConversionKind) -> Result<PathBuf> {
    let extensions = kind.accepted_extensions().join(", ");
    let path: String = Input::new()
        .with_prompt(format!("Input file ({})", extensions))
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            if Path::new(input.trim()).is_file() {
                Ok(())
            } else {
                Err(format!("'{}' is not a file", input))
            }
        })
        .interact_text()
        .context("input path prompt failed")?;

    Ok(PathBuf::from(path.trim()))
}

fn ask_output_path(input: &Path, kind: ConversionKind) -> Result<PathBuf> {
    let default = default_output(input, kind);
    let path: String = Input::new()
        .with_prompt("Save as")
        .default(default.display().to_string())
        .interact_text()
        .context("output path prompt failed")?;

    Ok(resolve_output(Some(Path::new(path.trim())), kind.output_filename()))
}

/// The kind's output filename next to the input file.
fn default_output(input: &Path, kind: ConversionKind) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(kind.output_filename()),
        _ => PathBuf::from(kind.output_filename()),
    }
}
