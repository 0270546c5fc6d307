use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

const BILL_TEXT: &str = "ACME HARDWARE\n\
                         Invoice #55\n\
                         Date: 03/04/2024\n\
                         Red Widget\n\
                         Qty 3 Blue Gadget\n\
                         Total: $42.50\n";

/// Config file keeping the store and models inside the temp dir.
fn write_config(dir: &TempDir) -> PathBuf {
    let config = json!({
        "models": { "model_dir": dir.path().join("models") },
        "store": { "path": dir.path().join("bills.json") },
        "chat": { "api_key_env": "BILLSCAN_CLI_TEST_KEY_NEVER_SET" }
    });

    let path = dir.path().join("config.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

fn billscan(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("billscan").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn process_text_file_prints_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let input = dir.path().join("bill.txt");
    fs::write(&input, BILL_TEXT).unwrap();

    let output = billscan(&config)
        .arg("process")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["totalAmount"], json!(42.5));
    assert_eq!(result["date"], json!("2024-03-04T00:00:00"));
    assert_eq!(result["dateIsDefault"], json!(false));
    assert_eq!(
        result["items"],
        json!([
            {"description": "ACME HARDWARE"},
            {"description": "Red Widget"},
            {"description": "Qty 3 Blue Gadget"}
        ])
    );
}

#[test]
fn process_rejects_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let input = dir.path().join("bill.pdf");
    fs::write(&input, b"%PDF-1.4").unwrap();

    billscan(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn process_image_without_models_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let input = dir.path().join("bill.png");
    fs::write(&input, b"not really a png").unwrap();

    billscan(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load OCR models"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let inputs = dir.path().join("inputs");
    let out = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.txt"), BILL_TEXT).unwrap();
    fs::write(inputs.join("b.txt"), "nothing useful").unwrap();

    let pattern = format!("{}/*.txt", inputs.display());
    billscan(&config)
        .args(["batch", &pattern, "--summary", "-f", "text"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 files"));

    let a = fs::read_to_string(out.join("a.txt")).unwrap();
    assert!(a.contains("Total: 42.50"));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,date,total_amount,item_count,processing_time_ms,error\n"));
    assert!(summary.contains("a.txt,success,2024-03-04,42.50,3,"));
    assert!(summary.contains("b.txt,success,"));
}

#[test]
fn bills_save_list_export() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let input = dir.path().join("bill.txt");
    let processed = dir.path().join("bill.json");
    fs::write(&input, BILL_TEXT).unwrap();

    billscan(&config)
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&processed)
        .assert()
        .success();

    billscan(&config)
        .args(["bills", "save"])
        .arg(&processed)
        .args(["--customer", "Acme", "--total", "40.00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved bill #1"));

    billscan(&config)
        .args(["bills", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme").and(predicate::str::contains("40.00")));

    let report = dir.path().join("report.csv");
    billscan(&config)
        .args(["bills", "export", "--output"])
        .arg(&report)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&report).unwrap(),
        "Date,Customer Name,Total Amount,Items\n\
         2024-03-04,Acme,40.00,\"ACME HARDWARE, Red Widget, Qty 3 Blue Gadget\"\n"
    );
}

#[test]
fn bills_save_rejects_non_extraction_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let input = dir.path().join("other.json");
    fs::write(&input, r#"{"hello": "world"}"#).unwrap();

    billscan(&config)
        .args(["bills", "save"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a processed bill"));
}

#[test]
fn chat_without_key_prints_apology() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    billscan(&config)
        .args(["chat", "how", "much", "did", "I", "spend?"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "I apologize, but I encountered an error. Please try again later.",
        ));
}

#[test]
fn config_get_reads_nested_key() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    billscan(&config)
        .args(["config", "get", "chat.api_key_env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BILLSCAN_CLI_TEST_KEY_NEVER_SET"));

    billscan(&config)
        .args(["config", "get", "chat.nope"])
        .assert()
        .failure();
}

#[test]
fn models_status_reports_missing_files() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    billscan(&config)
        .args(["models", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("det.onnx").and(predicate::str::contains("missing")));
}
