//! Convert command - re-export a data file as CSV or JSON.

use std::path::PathBuf;

use colored::Colorize;

use super::{open, resolve_format};
use crate::cli::OutputFormat;

pub fn run(
    file: PathBuf,
    output: PathBuf,
    format: Option<OutputFormat>,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let wrangler = open(&file)?;
    let export_format = resolve_format(Some(&output), format);
    wrangler.export_to_path(&output, Some(export_format))?;

    println!(
        "{} {} rows as {} to {}",
        "Converted".green().bold(),
        wrangler.data().len().to_string().white().bold(),
        export_format,
        output.display().to_string().white()
    );

    Ok(())
}
