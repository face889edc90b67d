use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const SAMPLE: &str = "Date,Merchant,Amt\n\
                      2024-03-05,ACME STORE,100.00\n\
                      2024-03-05,WIDGET CO,50.00\n\
                      2024-03-06,GADGETS LLC,25.00\n";

fn setup(csv: &str, pdfs: &[(&str, &[u8])]) -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("disputed.csv");
    std::fs::write(&source, csv).unwrap();
    let pdf_dir = dir.path().join("data");
    std::fs::create_dir(&pdf_dir).unwrap();
    for (name, bytes) in pdfs {
        std::fs::write(pdf_dir.join(name), bytes).unwrap();
    }
    (dir, source, pdf_dir)
}

fn disputes() -> Command {
    Command::cargo_bin("disputes").unwrap()
}

fn report_cmd(source: &Path, pdf_dir: &Path) -> Command {
    let mut cmd = disputes();
    cmd.arg("report")
        .arg("--source")
        .arg(source)
        .arg("--attachments")
        .arg(pdf_dir);
    cmd
}

#[test]
fn report_renders_cards_and_day_sections() {
    let (_dir, source, pdf_dir) = setup(SAMPLE, &[("5 Mar.pdf", b"%PDF-1.4 demo")]);
    report_cmd(&source, &pdf_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Disputed Transactions Report"))
        .stdout(predicate::str::contains("$175.00"))
        .stdout(predicate::str::contains("5 Mar 2024 \u{2192} 6 Mar 2024"))
        .stdout(predicate::str::contains("5 Mar 2024 \u{2014} $150.00 | 2 txns"))
        .stdout(predicate::str::contains("Attachment: 5 Mar.pdf"));
}

#[test]
fn report_degrades_per_day_when_pdf_missing() {
    let (_dir, source, pdf_dir) = setup(SAMPLE, &[("5 Mar.pdf", b"%PDF-1.4 demo")]);
    report_cmd(&source, &pdf_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No PDF found for this date."))
        .stdout(predicate::str::contains("GADGETS LLC"));
}

#[test]
fn report_missing_source_is_fatal() {
    let (_dir, _source, pdf_dir) = setup(SAMPLE, &[]);
    let mut cmd = disputes();
    cmd.arg("report")
        .arg("--source")
        .arg("/nonexistent/disputed.xlsx")
        .arg("--attachments")
        .arg(&pdf_dir);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"))
        .stdout(predicate::str::contains("Summary").not());
}

#[test]
fn report_empty_table_is_fatal() {
    let (_dir, source, pdf_dir) = setup("Date,Amt\n", &[]);
    report_cmd(&source, &pdf_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No transactions to summarize"))
        .stdout(predicate::str::contains("Summary").not());
}

#[test]
fn report_corrupt_source_is_fatal() {
    let (_dir, source, pdf_dir) = setup("Merchant,Amt\nACME,1.00\n", &[]);
    report_cmd(&source, &pdf_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing Date column"));
}

#[test]
fn report_output_writes_text_file() {
    let (dir, source, pdf_dir) = setup(SAMPLE, &[]);
    let out = dir.path().join("report.txt");
    report_cmd(&source, &pdf_dir)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.contains("Total Disputed Amount"));
}

#[test]
fn attachments_save_writes_exact_bytes() {
    let bytes: &[u8] = b"%PDF-1.4 exact content";
    let (dir, _source, pdf_dir) = setup(SAMPLE, &[("5 Mar.pdf", bytes)]);
    let out = dir.path().join("saved.pdf");
    disputes()
        .arg("attachments")
        .arg("save")
        .arg("2024-03-05")
        .arg("--output")
        .arg(&out)
        .arg("--attachments")
        .arg(&pdf_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 5 Mar.pdf"));
    assert_eq!(std::fs::read(&out).unwrap(), bytes);
}

#[test]
fn attachments_save_without_match_is_an_error() {
    let (_dir, _source, pdf_dir) = setup(SAMPLE, &[("5 Mar.pdf", b"%PDF-1.4")]);
    disputes()
        .arg("attachments")
        .arg("save")
        .arg("2024-03-06")
        .arg("--attachments")
        .arg(&pdf_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No attachment found for 6 Mar 2024"));
}

#[test]
fn attachments_save_rejects_bad_date() {
    let (_dir, _source, pdf_dir) = setup(SAMPLE, &[]);
    disputes()
        .arg("attachments")
        .arg("save")
        .arg("March 5th")
        .arg("--attachments")
        .arg(&pdf_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected YYYY-MM-DD"));
}

#[test]
fn attachments_list_reports_collisions() {
    let (_dir, _source, pdf_dir) = setup(
        SAMPLE,
        &[("2024-03-05.pdf", b"%PDF a"), ("5 Mar 2024.pdf", b"%PDF b")],
    );
    disputes()
        .arg("attachments")
        .arg("list")
        .arg("--attachments")
        .arg(&pdf_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-05.pdf"))
        .stdout(predicate::str::contains("Warning:"));
}
