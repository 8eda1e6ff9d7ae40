#![allow(clippy::unwrap_used)]

use super::*;
use crate::ledger::{starter_categories, LedgerMode};
use rust_decimal_macros::dec;

fn write(content: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), content).unwrap();
    file
}

#[test]
fn test_read_ledger_file() {
    let file = write(r#"[{"name":"Food","spent":200,"budget":300},{"name":"Rent","spent":0,"budget":1500.5}]"#);
    let ledger = read_ledger_file(file.path()).unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.categories()[0].name, "Food");
    assert_eq!(ledger.category("Rent").unwrap().budget, dec!(1500.5));
    assert_eq!(ledger.total_spent(), dec!(200));
}

#[test]
fn test_read_ledger_file_rejects_duplicates() {
    let file = write(r#"[{"name":"Food","spent":0,"budget":1},{"name":"Food","spent":0,"budget":2}]"#);
    let err = read_ledger_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Duplicate category: Food"));
}

#[test]
fn test_read_ledger_file_invalid_json() {
    let file = write("{not json");
    assert!(read_ledger_file(file.path()).is_err());
}

#[test]
fn test_write_then_read_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let ledger = BudgetLedger::new(starter_categories()).unwrap();
    write_ledger_file(&path, &ledger).unwrap();

    let back = read_ledger_file(&path).unwrap();
    let names: Vec<&str> = back.categories().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names[0], "Food");
    assert_eq!(names[9], "Miscellaneous");
    assert_eq!(back.total_budget(), dec!(5950));
}

#[test]
fn test_merge_ledger_overlays_and_appends() {
    let current = BudgetLedger::new(vec![
        BudgetCategory::new("Food", dec!(10), dec!(300)),
        BudgetCategory::new("Housing", dec!(0), dec!(2100)),
    ])
    .unwrap()
    .with_mode(LedgerMode::Strict);
    let incoming = BudgetLedger::new(vec![
        BudgetCategory::new("Pets", dec!(5), dec!(50)),
        BudgetCategory::new("Food", dec!(120), dec!(350)),
    ])
    .unwrap();

    let merged = merge_ledger(&current, &incoming);
    let names: Vec<&str> = merged.categories().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Food", "Housing", "Pets"]);
    assert_eq!(merged.category("Food").unwrap().spent, dec!(120));
    assert_eq!(merged.category("Food").unwrap().budget, dec!(350));
    assert_eq!(merged.category("Housing").unwrap().budget, dec!(2100));
    assert_eq!(merged.mode(), LedgerMode::Strict);
}
