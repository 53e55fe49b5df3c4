//! End-to-end tests for the tripbill binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Delivery report: a credit order, two combinable cash orders and a
/// failed delivery that never produced a bill.
const SAMPLE_ROWS: &str = r#"[
  {
    "invoice_id": "ord-1",
    "invoice_number": "INV-001",
    "customer_name": "Ram Traders",
    "date": "2026-08-15",
    "status": "delivered",
    "payment_method": "credit",
    "collected_amount": "1130",
    "net_amount": "1130",
    "order": {
      "items": [{"product_name": "Milk 500ml", "quantity": "10", "rate": "113"}],
      "customer_pan": "601234567"
    }
  },
  {
    "invoice_id": "ord-2",
    "invoice_number": "INV-002",
    "status": "delivered",
    "payment_method": "cash",
    "collected_amount": "565",
    "net_amount": "565",
    "order": {
      "items": [{"product_name": "Milk 500ml", "quantity": "5", "rate": "113"}]
    }
  },
  {
    "invoice_id": "ord-3",
    "invoice_number": "INV-003",
    "status": "delivered",
    "payment_method": "cash",
    "collected_amount": "226",
    "net_amount": "226",
    "order": {
      "items": [{"product_name": "Curd 200g", "quantity": "4", "rate": "56.50"}]
    }
  },
  {
    "invoice_id": "ord-4",
    "invoice_number": "INV-004",
    "status": "failed",
    "payment_method": "cash",
    "collected_amount": "0",
    "net_amount": "339",
    "order": {
      "items": [{"product_name": "Milk 500ml", "quantity": "3", "rate": "113"}]
    }
  }
]"#;

const SAMPLE_BANDS: &str = r#"[
  {"name": "Base", "min_amount": "0", "max_amount": "10000", "rate_pct": "5"},
  {"name": "Growth", "min_amount": "10000", "max_amount": "50000", "rate_pct": "7"},
  {"name": "Premium", "min_amount": "50000", "rate_pct": "10"}
]"#;

fn tripbill() -> Command {
    Command::cargo_bin("tripbill").expect("Binary not found")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

#[test]
fn bills_generates_individual_and_combined() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rows = write_file(&dir, "rows.json", SAMPLE_ROWS);

    let assert = tripbill()
        .args(["bills", rows.to_str().unwrap(), "-f", "json", "--date", "2026-08-15"])
        .arg("--validate")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Generated 2 bills (1 individual, 1 combined)",
        ))
        .stderr(predicate::str::contains(
            "All 2 bills consistent with source orders",
        ));

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let bills: serde_json::Value = serde_json::from_str(stdout.trim()).expect("Invalid JSON");
    let bills = bills.as_array().expect("Expected an array");

    assert_eq!(bills.len(), 2);
    assert_eq!(bills[0]["id"], "VAT-CREDIT-INV-001");
    assert_eq!(bills[0]["bill_type"], "individual");
    assert_eq!(bills[0]["customer_pan"], "601234567");
    assert_eq!(bills[0]["total_amount"], "1130");
    assert_eq!(bills[0]["date"], "2026-08-15");

    assert_eq!(bills[1]["id"], "VAT-CASH-COMB-2");
    assert_eq!(bills[1]["bill_type"], "combined");
    assert_eq!(bills[1]["invoice_numbers"], serde_json::json!(["INV-002", "INV-003"]));
    assert!(bills[1].get("customer_pan").is_none());
}

#[test]
fn bills_writes_output_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rows = write_file(&dir, "rows.json", SAMPLE_ROWS);
    let out = dir.path().join("bills.json");

    tripbill()
        .args(["bills", rows.to_str().unwrap(), "-f", "json"])
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let content = fs::read_to_string(&out).expect("Output file missing");
    let bills: serde_json::Value = serde_json::from_str(&content).expect("Invalid JSON");
    assert_eq!(bills.as_array().map(Vec::len), Some(2));
}

#[test]
fn bills_missing_input_fails() {
    tripbill()
        .args(["bills", "no-such-report.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn bills_combine_threshold_from_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rows = write_file(&dir, "rows.json", SAMPLE_ROWS);
    let config = write_file(
        &dir,
        "config.json",
        r#"{"billing": {"combine_threshold": "600"}}"#,
    );

    // 565 + 226 would exceed 600, so the cash orders split into two bills.
    tripbill()
        .args(["bills", rows.to_str().unwrap(), "-f", "json"])
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Generated 3 bills (1 individual, 2 combined)",
        ));
}

#[test]
fn bills_threshold_flag_overrides_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rows = write_file(&dir, "rows.json", SAMPLE_ROWS);

    tripbill()
        .args(["bills", rows.to_str().unwrap(), "-f", "json", "--threshold", "600"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Generated 3 bills (1 individual, 2 combined)",
        ));
}

#[test]
fn bills_lists_split_payments() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rows = write_file(
        &dir,
        "rows.json",
        r#"[{
          "invoice_id": "ord-1",
          "invoice_number": "INV-001",
          "status": "delivered",
          "payment_method": "cash",
          "collected_amount": "452",
          "net_amount": "452",
          "order": {
            "items": [{"product_name": "Milk 500ml", "quantity": "4", "rate": "113"}],
            "remarks": "Payments: cash: ₹300, qr: ₹152"
          }
        }]"#,
    );

    tripbill()
        .args(["bills", rows.to_str().unwrap(), "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Split payments noted on remarks:"))
        .stdout(predicate::str::contains("cash: ₹300.00"))
        .stdout(predicate::str::contains("qr: ₹152.00"));
}

#[test]
fn validate_passes_on_consistent_rows() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rows = write_file(&dir, "rows.json", SAMPLE_ROWS);

    tripbill()
        .args(["validate", rows.to_str().unwrap(), "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 bills checked: 2 valid, 0 with errors"));
}

#[test]
fn validate_flags_collection_shortfall() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    // Collected 1000 against 10 x 113 = 1130 worth of delivered goods.
    let rows = write_file(
        &dir,
        "rows.json",
        r#"[{
          "invoice_id": "ord-1",
          "invoice_number": "INV-001",
          "status": "delivered",
          "payment_method": "credit",
          "collected_amount": "1000",
          "net_amount": "1130",
          "order": {
            "items": [{"product_name": "Milk 500ml", "quantity": "10", "rate": "113"}]
          }
        }]"#,
    );

    tripbill()
        .args(["validate", rows.to_str().unwrap(), "-f", "text"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Total amount mismatch"))
        .stderr(predicate::str::contains("1 of 1 bills failed validation"));
}

#[test]
fn tally_explains_failed_deliveries() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rows = write_file(&dir, "rows.json", SAMPLE_ROWS);

    tripbill()
        .args(["tally", rows.to_str().unwrap(), "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 units on Failed/Pending orders (No Billing)"))
        .stdout(predicate::str::contains("2 products: 2 match, 0 mismatch"))
        .stdout(predicate::str::contains("Loaded 22 units, expected 22 net, billed 19, unload 3"));
}

#[test]
fn tally_flags_unexplained_gap() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    // Delivered with nothing collected: no bill is generated, nothing
    // accounts for the shortfall.
    let rows = write_file(
        &dir,
        "rows.json",
        r#"[{
          "invoice_id": "ord-1",
          "invoice_number": "INV-001",
          "status": "delivered",
          "payment_method": "cash",
          "collected_amount": "0",
          "net_amount": "226",
          "order": {
            "items": [{"product_name": "Curd 200g", "quantity": "2", "rate": "113"}]
          }
        }]"#,
    );

    tripbill()
        .args(["tally", rows.to_str().unwrap(), "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MISMATCH"))
        .stdout(predicate::str::contains("Unexplained gap of 2 units"))
        .stderr(predicate::str::contains("1 products have unexplained gaps"));
}

#[test]
fn tally_lists_damage_reasons() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let rows = write_file(
        &dir,
        "rows.json",
        r#"[{
          "invoice_id": "ord-1",
          "invoice_number": "INV-001",
          "status": "delivered",
          "payment_method": "cash",
          "collected_amount": "452",
          "net_amount": "452",
          "order": {
            "items": [{"product_name": "Milk 500ml", "quantity": "5", "rate": "113"}],
            "remarks": "Damages: Milk 500ml(1) - crushed"
          }
        }]"#,
    );

    tripbill()
        .args(["tally", rows.to_str().unwrap(), "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 units marked as Damages (Excluded)"))
        .stdout(predicate::str::contains("Damage reasons:"))
        .stdout(predicate::str::contains("Milk 500ml: crushed"));
}

#[test]
fn commission_slab_total() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bands = write_file(&dir, "bands.json", SAMPLE_BANDS);

    tripbill()
        .args(["commission", "45000", "--bands", bands.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Commission (slab mode)"))
        .stdout(predicate::str::contains("₹10000.00 @ 5% = ₹500.00 + ₹35000.00 @ 7% = ₹2450.00"))
        .stdout(predicate::str::contains("Total commission: ₹2950.00"));
}

#[test]
fn commission_level_mode() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bands = write_file(&dir, "bands.json", SAMPLE_BANDS);

    tripbill()
        .args(["commission", "45000", "--mode", "level"])
        .args(["--bands", bands.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("7% on ₹45000.00 = ₹3150.00"))
        .stdout(predicate::str::contains("Total commission: ₹3150.00"));
}

#[test]
fn commission_deducts_returns() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bands = write_file(&dir, "bands.json", SAMPLE_BANDS);

    tripbill()
        .args(["commission", "50000", "--returns", "5000"])
        .args(["--bands", bands.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Net sales:   ₹45000.00"))
        .stdout(predicate::str::contains("Total commission: ₹2950.00"));
}

#[test]
fn commission_preview_table() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bands = write_file(&dir, "bands.json", SAMPLE_BANDS);

    tripbill()
        .args(["commission", "--preview", "--bands", bands.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Commission preview (slab mode)"))
        .stdout(predicate::str::contains("₹10000.00"))
        .stdout(predicate::str::contains("5.00%"));
}

#[test]
fn commission_rejects_overlapping_bands() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bands = write_file(
        &dir,
        "bands.json",
        r#"[
          {"name": "A", "min_amount": "0", "max_amount": "20000", "rate_pct": "5"},
          {"name": "B", "min_amount": "10000", "max_amount": "50000", "rate_pct": "7"}
        ]"#,
    );

    tripbill()
        .args(["commission", "45000", "--bands", bands.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bands overlap"))
        .stderr(predicate::str::contains("Band table is not valid for slab mode"));
}

#[test]
fn commission_check_bands_reports_validity() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bands = write_file(&dir, "bands.json", SAMPLE_BANDS);

    tripbill()
        .args(["commission", "--check-bands", "--bands", bands.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Band table is valid for slab mode (3 bands)"));
}

#[test]
fn commission_requires_sales_or_preview() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bands = write_file(&dir, "bands.json", SAMPLE_BANDS);

    tripbill()
        .args(["commission", "--bands", bands.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Provide a sales amount"));
}

#[test]
fn config_init_creates_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = dir.path().join("config.json");

    tripbill()
        .args(["config", "init", "--output", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    assert!(config.exists());

    // A second init without --force refuses to overwrite.
    tripbill()
        .args(["config", "init", "--output", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    tripbill()
        .args(["config", "init", "--force", "--output", config.to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn config_path_prints_location() {
    tripbill()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}
