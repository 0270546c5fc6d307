//! CLI application for bill OCR processing.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{batch, bills, chat, config, models, process};

/// Bill scanner - Extract totals, dates and line items from bill photos
#[derive(Parser)]
#[command(name = "billscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single bill image or text file
    Process(process::ProcessArgs),

    /// Process multiple bill files
    Batch(batch::BatchArgs),

    /// Save, list and export reviewed bills
    Bills(bills::BillsArgs),

    /// Ask the chat assistant a question
    Chat(chat::ChatArgs),

    /// Check OCR models
    Models(models::ModelsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Bills(args) => bills::run(args, config_path).await,
        Commands::Chat(args) => chat::run(args, config_path).await,
        Commands::Models(args) => models::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
