//! Analyze command - infer column types and report quality issues.

use std::path::PathBuf;

use colored::Colorize;

use super::open;

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut wrangler = open(&file)?;
    let result = wrangler.analyze();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Analyzing".cyan().bold(),
        file.display().to_string().white()
    );
    println!(
        "{} rows, {} columns",
        result.row_count.to_string().white().bold(),
        result.columns.len().to_string().white().bold()
    );

    println!();
    println!("{}", "Columns:".yellow().bold());
    for col in &result.columns {
        println!("  {:24} {}", col.name, col.inferred_type.label());
    }

    let issues = &result.issues;
    println!();
    if issues.is_clean() {
        println!("{}", "No issues found - data looks clean!".green());
    } else {
        println!("{}", "Issues:".yellow().bold());
        if issues.duplicate_rows > 0 {
            println!(
                "  {} duplicate rows",
                issues.duplicate_rows.to_string().red()
            );
        }
        for (column, count) in &issues.null_values {
            println!("  {:24} {} missing values", column, count.to_string().yellow());
        }
        for column in &issues.inconsistent_types {
            println!("  {:24} {}", column, "mixed value types".yellow());
        }
        for (column, values) in &issues.outliers {
            println!("  {:24} {} outliers", column, values.len().to_string().yellow());
            if verbose {
                let shown: Vec<String> = values.iter().take(10).map(|v| v.to_string()).collect();
                println!("  {:24} {}", "", shown.join(", ").dimmed());
            }
        }
    }

    let quality = &result.quality;
    let score = format!("{:.0}", quality.score);
    let score = if quality.score >= 90.0 {
        score.green()
    } else if quality.score >= 70.0 {
        score.yellow()
    } else {
        score.red()
    };
    println!();
    println!("Data quality score: {}/100", score.bold());
    println!("{}", quality.recommendation.dimmed());

    if !result.suggestions.is_empty() {
        println!();
        println!(
            "{} suggestions available. Run {} to list them",
            result.suggestions.len().to_string().white().bold(),
            format!("wrangler suggest {}", file.display()).cyan().bold()
        );
    }

    Ok(())
}
