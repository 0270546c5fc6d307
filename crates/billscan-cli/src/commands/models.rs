//! Models command - check the OCR model files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use billscan_core::models::config::ModelConfig;

use super::config::load_config;

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Check which model files are present
    Status {
        /// Model directory (default: from config)
        #[arg(short, long)]
        model_dir: Option<PathBuf>,
    },

    /// Print the configured model directory
    Path,
}

/// State of one model file on disk.
#[derive(Debug, PartialEq, Eq)]
enum FileState {
    Present(u64),
    Empty,
    Missing,
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        ModelsCommand::Status { model_dir } => {
            let mut models = config.models;
            if let Some(dir) = model_dir {
                models.model_dir = dir;
            }
            check_status(&models)
        }
        ModelsCommand::Path => {
            println!("{}", config.models.model_dir.display());
            Ok(())
        }
    }
}

fn check_status(models: &ModelConfig) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("Directory: {}", models.model_dir.display());
    println!();

    let mut all_present = true;
    let mut total_size: u64 = 0;

    for filename in [
        &models.detection_model,
        &models.recognition_model,
        &models.dictionary,
    ] {
        let (status, size_str) = match file_state(&models.model_path(filename))? {
            FileState::Present(size) => {
                total_size += size;
                (style("✓").green(), format_size(size))
            }
            FileState::Empty => {
                all_present = false;
                (style("⚠").yellow(), "empty".to_string())
            }
            FileState::Missing => {
                all_present = false;
                (style("✗").red(), "missing".to_string())
            }
        };

        println!("    {} {:<25} {:>10}", status, filename, size_str);
    }

    println!();
    if all_present {
        println!(
            "{} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "{} Image processing needs all three files. Text inputs (.txt) work without them.",
            style("⚠").yellow()
        );
    }

    Ok(())
}

fn file_state(path: &Path) -> anyhow::Result<FileState> {
    if !path.exists() {
        return Ok(FileState::Missing);
    }

    let size = fs::metadata(path)?.len();
    Ok(if size == 0 {
        FileState::Empty
    } else {
        FileState::Present(size)
    })
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}
