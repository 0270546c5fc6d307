//! Process command - extract bill fields from a single image or text file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use billscan_core::{
    is_supported_image, BillParser, BillPipeline, BillscanConfig, ExtractionResult,
    PureOcrEngine, RuleBasedBillParser,
};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (image, or .txt with OCR text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// What kind of input a file is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Bill image, goes through OCR.
    Image,
    /// Already-extracted text, parsed directly.
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let kind = input_kind(&args.input)?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    let result = match kind {
        InputKind::Image => {
            pb.set_message("Loading OCR models...");
            pb.set_position(10);
            let engine = load_engine(&config, args.model_dir.as_deref())?;

            pb.set_message("Running OCR...");
            pb.set_position(40);
            extract_file(&args.input, kind, Some(&engine))?
        }
        InputKind::Text => {
            pb.set_message("Parsing text...");
            pb.set_position(40);
            extract_file(&args.input, kind, None)?
        }
    };

    pb.finish_and_clear();

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Classify an input file by extension; unsupported files are an error.
pub fn input_kind(path: &Path) -> anyhow::Result<InputKind> {
    if is_supported_image(path) {
        return Ok(InputKind::Image);
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "txt" => Ok(InputKind::Text),
        _ => anyhow::bail!(
            "Unsupported file format: {:?}. Please use an image (png, jpg, jpeg, tiff, bmp) or a .txt file.",
            extension
        ),
    }
}

/// Load the OCR engine, optionally from a model directory other than the configured one.
pub fn load_engine(config: &BillscanConfig, model_dir: Option<&Path>) -> anyhow::Result<PureOcrEngine> {
    let mut models = config.models.clone();
    if let Some(dir) = model_dir {
        models.model_dir = dir.to_path_buf();
    }

    PureOcrEngine::from_config(&models, config.ocr.clone()).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load OCR models: {}\n\n\
             Place {}, {} and {} in {} or pass --model-dir.",
            e,
            models.detection_model,
            models.recognition_model,
            models.dictionary,
            models.model_dir.display()
        )
    })
}

/// Extract bill fields from one file.
///
/// `engine` must be present for image inputs.
pub fn extract_file(
    path: &Path,
    kind: InputKind,
    engine: Option<&PureOcrEngine>,
) -> anyhow::Result<ExtractionResult> {
    match kind {
        InputKind::Text => {
            let text = fs::read_to_string(path)?;
            Ok(RuleBasedBillParser::new().parse(&text))
        }
        InputKind::Image => {
            let engine = engine.ok_or_else(|| anyhow::anyhow!("OCR engine not loaded"))?;
            let data = fs::read(path)?;

            BillPipeline::new(engine).process_image(&data).map_err(|e| {
                if e.is_acquisition_failure() {
                    anyhow::anyhow!(
                        "Could not read text from {}: {}. Try a clearer photo.",
                        path.display(),
                        e
                    )
                } else {
                    e.into()
                }
            })
        }
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "date_is_default", "total_amount", "item_count", "items"])?;
    wtr.write_record([
        &result.date.format("%Y-%m-%d").to_string(),
        &result.date_is_default.to_string(),
        &result.total_amount.map(|a| a.to_string()).unwrap_or_default(),
        &result.items.len().to_string(),
        &result.items_summary(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Date: {}", result.date.format("%Y-%m-%d")));
    if result.date_is_default {
        output.push_str(" (not found, defaulted to today)");
    }
    output.push('\n');

    match result.total_amount {
        Some(total) => output.push_str(&format!("Total: {}\n", total)),
        None => output.push_str("Total: not found\n"),
    }

    output.push_str(&format!("\nItems ({}):\n", result.items.len()));
    for item in &result.items {
        output.push_str(&format!("  - {}\n", item.description));
    }

    output
}
