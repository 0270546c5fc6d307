//! Batch processing command for multiple bill files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use billscan_core::{ExtractionResult, PureOcrEngine};

use super::config::load_config;
use super::process::{extract_file, format_result, input_kind, load_engine, InputKind, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of processing a single file.
struct FileOutcome {
    path: PathBuf,
    result: Result<ExtractionResult, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<(PathBuf, InputKind)> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter_map(|p| input_kind(&p).ok().map(|kind| (p, kind)))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // Models are loaded once, and only when there is an image to read.
    let engine: Option<PureOcrEngine> = if files.iter().any(|(_, kind)| *kind == InputKind::Image) {
        Some(load_engine(&config, args.model_dir.as_deref())?)
    } else {
        None
    };

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut outcomes = Vec::with_capacity(files.len());

    for (path, kind) in files {
        let file_start = Instant::now();
        let result = extract_file(&path, kind, engine.as_ref());
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        let result = match result {
            Ok(extraction) => Ok(extraction),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    Err(error_msg)
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        };

        outcomes.push(FileOutcome {
            path,
            result,
            processing_time_ms,
        });
        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for outcome in &outcomes {
            if let Ok(extraction) = &outcome.result {
                let output_path = output_path_for(output_dir, &outcome.path, args.format);
                fs::write(&output_path, format_result(extraction, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        let file = fs::File::create(&summary_path)?;
        write_summary(file, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = outcomes.iter().filter(|o| o.result.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(outcomes.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            if let Err(msg) = &outcome.result {
                println!("  - {}: {}", outcome.path.display(), msg);
            }
        }
    }

    Ok(())
}

fn output_path_for(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bill");

    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn write_summary<W: std::io::Write>(writer: W, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "filename",
        "status",
        "date",
        "total_amount",
        "item_count",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in outcomes {
        let filename = outcome
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = outcome.processing_time_ms.to_string();

        match &outcome.result {
            Ok(extraction) => wtr.write_record([
                filename,
                "success",
                &extraction.date.format("%Y-%m-%d").to_string(),
                &extraction
                    .total_amount
                    .map(|a| a.to_string())
                    .unwrap_or_default(),
                &extraction.items.len().to_string(),
                &time,
                "",
            ])?,
            Err(msg) => wtr.write_record([filename, "error", "", "", "", &time, msg])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscan_core::{BillParser, RuleBasedBillParser};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path_for() {
        let path = output_path_for(Path::new("out"), Path::new("scans/receipt.jpg"), OutputFormat::Text);
        assert_eq!(path, PathBuf::from("out/receipt.txt"));
    }

    #[test]
    fn test_write_summary() {
        let ok = RuleBasedBillParser::new().parse("Date: 03/04/2024\nRed Widget\nTotal: 4.20");
        let outcomes = vec![
            FileOutcome {
                path: PathBuf::from("scans/a.txt"),
                result: Ok(ok),
                processing_time_ms: 5,
            },
            FileOutcome {
                path: PathBuf::from("scans/b.png"),
                result: Err("no text detected in image".to_string()),
                processing_time_ms: 7,
            },
        ];

        let mut buf = Vec::new();
        write_summary(&mut buf, &outcomes).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "filename,status,date,total_amount,item_count,processing_time_ms,error\n\
             a.txt,success,2024-03-04,4.20,1,5,\n\
             b.png,error,,,,7,no text detected in image\n"
        );
    }
}
