//! Bills command - save reviewed extractions, list them, export a report.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use console::style;
use rust_decimal::Decimal;
use tracing::info;

use billscan_core::{BillDraft, BillRecord, BillStore, ExtractionResult, JsonBillStore};

use super::config::load_config;

/// Arguments for the bills command.
#[derive(Args)]
pub struct BillsArgs {
    #[command(subcommand)]
    command: BillsCommand,
}

#[derive(Subcommand)]
enum BillsCommand {
    /// Save a processed bill, with optional corrections
    Save(SaveArgs),

    /// List saved bills, newest first
    List,

    /// Export saved bills as a CSV report
    Export {
        /// Output file (default: bills_report_<YYYYMMDD>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SaveArgs {
    /// JSON output of `billscan process`
    #[arg(required = true)]
    input: PathBuf,

    /// Customer name
    #[arg(long)]
    customer: Option<String>,

    /// Corrected bill date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Corrected total amount
    #[arg(long)]
    total: Option<Decimal>,
}

pub async fn run(args: BillsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut store = JsonBillStore::open(&config.store.path);

    match args.command {
        BillsCommand::Save(save_args) => save_bill(&mut store, save_args),
        BillsCommand::List => list_bills(&store),
        BillsCommand::Export { output } => export_bills(&store, output),
    }
}

fn save_bill(store: &mut impl BillStore, args: SaveArgs) -> anyhow::Result<()> {
    let content = fs::read_to_string(&args.input)?;
    let extraction: ExtractionResult = serde_json::from_str(&content).map_err(|e| {
        anyhow::anyhow!(
            "{} is not a processed bill ({}). Run 'billscan process' first.",
            args.input.display(),
            e
        )
    })?;

    let draft = apply_corrections(BillDraft::from_extraction(&extraction), &args);
    let record = store.insert(draft)?;

    info!("Saved bill {}", record.id);
    println!(
        "{} Saved bill #{} ({}, {} on {})",
        style("✓").green(),
        record.id,
        display_customer(&record),
        record.total_amount,
        record.date
    );

    Ok(())
}

fn apply_corrections(mut draft: BillDraft, args: &SaveArgs) -> BillDraft {
    if let Some(customer) = &args.customer {
        draft = draft.with_customer_name(customer.trim());
    }
    if let Some(date) = args.date {
        draft = draft.with_date(Some(date));
    }
    if let Some(total) = args.total {
        draft = draft.with_total_amount(total);
    }
    draft
}

fn list_bills(store: &impl BillStore) -> anyhow::Result<()> {
    let records = store.list()?;

    if records.is_empty() {
        println!("No bills saved yet.");
        return Ok(());
    }

    println!("{}", style("Saved bills:").bold());
    for record in &records {
        println!(
            "  #{:<4} {}  {:<24} {:>10}  {}",
            record.id,
            record.date.format("%Y-%m-%d"),
            display_customer(record),
            record.total_amount,
            style(record.items_summary()).dim()
        );
    }

    Ok(())
}

fn export_bills(store: &impl BillStore, output: Option<PathBuf>) -> anyhow::Result<()> {
    let records = store.list()?;
    let path = output.unwrap_or_else(|| PathBuf::from(default_report_name(Local::now().date_naive())));

    let file = fs::File::create(&path)?;
    write_report(file, &records)?;

    println!(
        "{} Exported {} bills to {}",
        style("✓").green(),
        records.len(),
        path.display()
    );

    Ok(())
}

fn display_customer(record: &BillRecord) -> &str {
    if record.customer_name.is_empty() {
        "(no customer)"
    } else {
        &record.customer_name
    }
}

/// Report file name for the given day.
pub fn default_report_name(day: NaiveDate) -> String {
    format!("bills_report_{}.csv", day.format("%Y%m%d"))
}

/// Write the bills report, one row per record in the given order.
pub fn write_report<W: Write>(writer: W, records: &[BillRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["Date", "Customer Name", "Total Amount", "Items"])?;

    for record in records {
        wtr.write_record([
            &record.date.format("%Y-%m-%d").to_string(),
            &record.customer_name,
            &record.total_amount.to_string(),
            &record.items_summary(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscan_core::Item;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record(id: u64, customer: &str, items: &[&str]) -> BillRecord {
        BillRecord {
            id,
            customer_name: customer.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, id as u32).unwrap(),
            total_amount: Decimal::new(1050, 2),
            items: items.iter().map(|d| Item::new(*d)).collect(),
            raw_text: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, id as u32).unwrap(),
        }
    }

    #[test]
    fn test_write_report() {
        let records = vec![
            record(2, "Globex", &["Red Widget", "Blue Gadget"]),
            record(1, "", &[]),
        ];

        let mut buf = Vec::new();
        write_report(&mut buf, &records).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Date,Customer Name,Total Amount,Items\n\
             2024-03-02,Globex,10.50,\"Red Widget, Blue Gadget\"\n\
             2024-03-01,,10.50,\n"
        );
    }

    #[test]
    fn test_default_report_name() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(default_report_name(day), "bills_report_20240109.csv");
    }

    #[test]
    fn test_apply_corrections() {
        let draft = BillDraft {
            customer_name: String::new(),
            date: None,
            total_amount: Decimal::ZERO,
            items: vec![],
            raw_text: String::new(),
        };
        let args = SaveArgs {
            input: PathBuf::from("bill.json"),
            customer: Some("  Acme ".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 5, 6),
            total: None,
        };

        let corrected = apply_corrections(draft, &args);
        assert_eq!(corrected.customer_name, "Acme");
        assert_eq!(corrected.date, NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(corrected.total_amount, Decimal::ZERO);
    }
}
