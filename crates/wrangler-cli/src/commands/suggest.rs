//! Suggest command - list proposed operations for a data file.

use std::path::PathBuf;

use colored::Colorize;

use super::open;

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut wrangler = open(&file)?;
    let suggestions = wrangler.suggestions();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("{}", "No suggestions - data looks clean!".green());
        return Ok(());
    }

    println!(
        "{} {} suggestions for {}",
        "Found".cyan().bold(),
        suggestions.len().to_string().white().bold(),
        file.display().to_string().white()
    );
    println!();

    for (i, suggestion) in suggestions.iter().enumerate() {
        let confidence = format!("{:>3}%", suggestion.confidence);
        let confidence = if suggestion.confidence >= 85 {
            confidence.green()
        } else if suggestion.confidence >= 70 {
            confidence.yellow()
        } else {
            confidence.normal()
        };
        println!(
            "{:>3}. {} [{}] {}",
            i + 1,
            confidence,
            suggestion.suggestion_type.label().blue(),
            suggestion.title.white().bold()
        );
        println!("       {}", suggestion.description);
        if verbose {
            println!(
                "       {} {} {}",
                suggestion.id.dimmed(),
                suggestion.operation.name.cyan(),
                suggestion.operation.params.to_string().dimmed()
            );
        }
    }

    println!();
    println!(
        "Use {} for machine-readable output",
        format!("wrangler suggest {} --json", file.display()).cyan()
    );

    Ok(())
}
