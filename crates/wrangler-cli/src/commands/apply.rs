//! Apply command - run a JSON recipe of operations and export the result.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;

use super::{default_output, open, resolve_format};
use crate::cli::OutputFormat;

pub fn run(
    file: PathBuf,
    recipe: PathBuf,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let recipe_text = fs::read_to_string(&recipe)
        .map_err(|e| format!("Cannot read recipe {}: {}", recipe.display(), e))?;

    let mut wrangler = open(&file)?;
    let rows_before = wrangler.data().len();

    let applied = wrangler.apply_recipe(&recipe_text)?;

    println!(
        "{} {} operations to {}",
        "Applied".cyan().bold(),
        applied.to_string().white().bold(),
        file.display().to_string().white()
    );
    if verbose {
        for record in wrangler.engine().operation_history() {
            println!("  {} {} {}", record.id.dimmed(), record.kind.label(), record.name);
        }
    }
    println!(
        "Rows: {} -> {}",
        rows_before,
        wrangler.data().len().to_string().white().bold()
    );

    let export_format = resolve_format(output.as_deref(), format);
    let output_path = output.unwrap_or_else(|| default_output(&file, export_format));
    wrangler.export_to_path(&output_path, Some(export_format))?;

    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}
