#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn row(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|s| s.to_string()).collect()
}

// ── parse_decimal ─────────────────────────────────────────────

#[test]
fn test_parse_decimal_basic() {
    assert_eq!(parse_decimal("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_decimal("-42.99").unwrap(), dec!(-42.99));
}

#[test]
fn test_parse_decimal_with_currency() {
    assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
    assert_eq!(parse_decimal("-$99.99").unwrap(), dec!(-99.99));
}

#[test]
fn test_parse_decimal_parentheses_negative() {
    assert_eq!(parse_decimal("(500.00)").unwrap(), dec!(-500.00));
}

#[test]
fn test_parse_decimal_empty() {
    assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
    assert_eq!(parse_decimal("  ").unwrap(), Decimal::ZERO);
}

#[test]
fn test_parse_decimal_quoted() {
    assert_eq!(parse_decimal("\"100.00\"").unwrap(), dec!(100.00));
}

#[test]
fn test_parse_decimal_invalid() {
    assert!(parse_decimal("not_a_number").is_err());
}

// ── parse_date ────────────────────────────────────────────────

#[test]
fn test_parse_date_us_format() {
    let d = parse_date("01/15/2024", "%m/%d/%Y").unwrap();
    assert_eq!(d, chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_parse_date_fallback() {
    let d = parse_date("2024-01-15", "%m/%d/%Y").unwrap();
    assert_eq!(d, chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_parse_date_two_digit_year() {
    let d = parse_date("01/15/24", "%m/%d/%y").unwrap();
    assert_eq!(d, chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_parse_date_invalid() {
    assert!(parse_date("not-a-date", "%m/%d/%Y").is_err());
    assert!(parse_date("", "%m/%d/%Y").is_err());
}

// ── parse_amount ──────────────────────────────────────────────

#[test]
fn test_parse_amount_single_column() {
    let profile = CsvProfile::default();
    let r = row(&["01/15/2024", "Coffee", "-4.50"]);
    assert_eq!(parse_amount(&r, &profile).unwrap(), dec!(-4.50));
}

#[test]
fn test_parse_amount_debit_credit_columns() {
    let profile = CsvProfile {
        amount_column: None,
        debit_column: Some(2),
        credit_column: Some(3),
        ..CsvProfile::default()
    };
    let debit_row = row(&["01/15/2024", "Coffee", "4.50", ""]);
    assert_eq!(parse_amount(&debit_row, &profile).unwrap(), dec!(-4.50));

    let credit_row = row(&["01/15/2024", "Deposit", "", "1000.00"]);
    assert_eq!(parse_amount(&credit_row, &profile).unwrap(), dec!(1000.00));
}

#[test]
fn test_parse_amount_negate() {
    let profile = CsvProfile {
        negate_amounts: true,
        ..CsvProfile::default()
    };
    let r = row(&["01/15/2024", "Coffee", "4.50"]);
    assert_eq!(parse_amount(&r, &profile).unwrap(), dec!(-4.50));
}

// ── CsvProfile::from_headers ──────────────────────────────────

#[test]
fn test_profile_from_headers_with_category() {
    let headers = row(&["Transaction Date", "Category", "Merchant", "Amount"]);
    let profile = CsvProfile::from_headers(&headers);
    assert_eq!(profile.date_column, 0);
    assert_eq!(profile.category_column, Some(1));
    assert_eq!(profile.description_column, 2);
    assert_eq!(profile.amount_column, Some(3));
}

#[test]
fn test_profile_from_headers_debit_credit() {
    let headers = row(&["Date", "Description", "Debit", "Credit"]);
    let profile = CsvProfile::from_headers(&headers);
    assert_eq!(profile.amount_column, None);
    assert_eq!(profile.debit_column, Some(2));
    assert_eq!(profile.credit_column, Some(3));
}

#[test]
fn test_profile_from_generic_headers_uses_defaults() {
    let headers = row(&["Column 1", "Column 2", "Column 3"]);
    let profile = CsvProfile::from_headers(&headers);
    assert_eq!(profile.date_column, 0);
    assert_eq!(profile.description_column, 1);
    assert_eq!(profile.amount_column, Some(2));
    assert_eq!(profile.category_column, None);
}

// ── CsvImporter::preview ──────────────────────────────────────

#[test]
fn test_preview_with_headers() {
    let csv = "Date,Description,Amount\n01/15/2024,Coffee,-4.50\n01/16/2024,Lunch,-12.00\n";
    let file = make_csv_file(csv);
    let (headers, rows) = CsvImporter::preview(file.path()).unwrap();
    assert_eq!(headers, vec!["Date", "Description", "Amount"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1], "Coffee");
}

#[test]
fn test_preview_without_headers() {
    let csv = "01/15/2024,COFFEE SHOP,-4.50\n01/16/2024,RESTAURANT,-12.00\n";
    let file = make_csv_file(csv);
    let (headers, rows) = CsvImporter::preview(file.path()).unwrap();
    assert!(headers[0].starts_with("Column"));
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_preview_empty_file() {
    let file = make_csv_file("");
    assert!(CsvImporter::preview(file.path()).is_err());
}

#[test]
fn test_preview_quoted_fields() {
    let csv = "Date,Description,Amount\n01/15/2024,\"Coffee, Shop\",-4.50\n";
    let file = make_csv_file(csv);
    let (_, rows) = CsvImporter::preview(file.path()).unwrap();
    assert_eq!(rows[0][1], "Coffee, Shop");
}

// ── CsvImporter::parse ────────────────────────────────────────

#[test]
fn test_parse_expense_rows() {
    let profile = CsvProfile::default();
    let rows = vec![
        row(&["01/15/2024", "Coffee", "-4.50"]),
        row(&["01/16/2024", "Lunch", "-12.00"]),
    ];
    let expenses = CsvImporter::parse(&rows, &profile).unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].date, "2024-01-15");
    assert_eq!(expenses[0].description, "Coffee");
    // Stored as the positive size of the outflow
    assert_eq!(expenses[0].amount, dec!(4.50));
    assert!(!expenses[0].is_categorized());
}

#[test]
fn test_parse_skips_income_and_zero_rows() {
    let profile = CsvProfile::default();
    let rows = vec![
        row(&["01/15/2024", "Coffee", "-4.50"]),
        row(&["01/16/2024", "Paycheck", "2500.00"]),
        row(&["01/17/2024", "Adjustment", "0"]),
    ];
    let expenses = CsvImporter::parse(&rows, &profile).unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].description, "Coffee");
}

#[test]
fn test_parse_skips_empty_dates() {
    let profile = CsvProfile::default();
    let rows = vec![
        row(&["01/15/2024", "Coffee", "-4.50"]),
        row(&["", "", ""]),
        row(&["01/16/2024", "Lunch", "-12.00"]),
    ];
    assert_eq!(CsvImporter::parse(&rows, &profile).unwrap().len(), 2);
}

#[test]
fn test_parse_reads_category_column() {
    let profile = CsvProfile {
        category_column: Some(3),
        ..CsvProfile::default()
    };
    let rows = vec![row(&["01/15/2024", "Kroger", "-60.00", " Food "])];
    let expenses = CsvImporter::parse(&rows, &profile).unwrap();
    assert_eq!(expenses[0].category, "Food");
}

#[test]
fn test_parse_bad_amount_names_row() {
    let profile = CsvProfile::default();
    let rows = vec![
        row(&["01/15/2024", "Coffee", "-4.50"]),
        row(&["01/16/2024", "Lunch", "twelve"]),
    ];
    let err = CsvImporter::parse(&rows, &profile).unwrap_err();
    assert!(err.to_string().contains("Row 2"));
}

#[test]
fn test_parse_generates_distinct_hashes_for_identical_rows() {
    let profile = CsvProfile::default();
    let rows = vec![
        row(&["01/15/2024", "Coffee", "-4.50"]),
        row(&["01/15/2024", "Coffee", "-4.50"]),
    ];
    let expenses = CsvImporter::parse(&rows, &profile).unwrap();
    assert!(!expenses[0].import_hash.is_empty());
    assert_ne!(expenses[0].import_hash, expenses[1].import_hash);
}

#[test]
fn test_parse_hash_ignores_row_position() {
    let profile = CsvProfile::default();
    let older = vec![
        row(&["01/15/2024", "Coffee", "-4.50"]),
        row(&["01/15/2024", "Coffee", "-4.50"]),
    ];
    let newer = vec![
        row(&["01/16/2024", "Lunch", "-12.00"]),
        row(&["01/15/2024", "Coffee", "-4.50"]),
        row(&["01/15/2024", "Coffee", "-4.50"]),
    ];
    let first = CsvImporter::parse(&older, &profile).unwrap();
    let second = CsvImporter::parse(&newer, &profile).unwrap();
    assert_eq!(first[0].import_hash, second[1].import_hash);
    assert_eq!(first[1].import_hash, second[2].import_hash);
}

// ── compute_hash ──────────────────────────────────────────────

#[test]
fn test_hash_deterministic() {
    let h1 = compute_hash("2024-01-15", "Coffee", &dec!(-4.50), 0);
    let h2 = compute_hash("2024-01-15", "Coffee", &dec!(-4.50), 0);
    assert_eq!(h1, h2);
}

#[test]
fn test_hash_different_inputs() {
    let h1 = compute_hash("2024-01-15", "Coffee", &dec!(-4.50), 0);
    assert_ne!(h1, compute_hash("2024-01-15", "Tea", &dec!(-4.50), 0));
    assert_ne!(h1, compute_hash("2024-01-16", "Coffee", &dec!(-4.50), 0));
    assert_ne!(h1, compute_hash("2024-01-15", "Coffee", &dec!(-5.00), 0));
    assert_ne!(h1, compute_hash("2024-01-15", "Coffee", &dec!(-4.50), 1));
}

#[test]
fn test_hash_format() {
    let h = compute_hash("2024-01-15", "Coffee", &dec!(-4.50), 0);
    let hex = h.strip_prefix("csv:").unwrap();
    assert_eq!(hex.len(), 16);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
}

// ── fnv1a ─────────────────────────────────────────────────────

#[test]
fn test_fnv1a_empty() {
    assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
}

#[test]
fn test_fnv1a_single_byte_changes() {
    assert_ne!(fnv1a(b"a"), fnv1a(b"b"));
    assert_ne!(fnv1a(b"aa"), fnv1a(b"ab"));
}
