//! CLI command implementations.

pub mod analyze;
pub mod apply;
pub mod convert;
pub mod suggest;

use std::path::{Path, PathBuf};

use wrangler::{ExportFormat, Wrangler};

use crate::cli::OutputFormat;

/// Import `file` into a fresh session.
pub(crate) fn open(file: &Path) -> Result<Wrangler, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    let mut wrangler = Wrangler::new();
    wrangler.import_file(file)?;
    Ok(wrangler)
}

/// Explicit flag first, then the output extension, then CSV.
pub(crate) fn resolve_format(output: Option<&Path>, format: Option<OutputFormat>) -> ExportFormat {
    match (format, output) {
        (Some(f), _) => f.export_format(),
        (None, Some(path)) => ExportFormat::from_path(path).unwrap_or_default(),
        (None, None) => ExportFormat::default(),
    }
}

/// `<dir>/<stem>_wrangled.<ext>` next to the input.
pub(crate) fn default_output(file: &Path, format: ExportFormat) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}_wrangled.{}", stem, format.extension()))
}
