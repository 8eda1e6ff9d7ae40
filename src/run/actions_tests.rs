#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::ImportRule;
use rust_decimal_macros::dec;
use std::io::Write;

fn csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const BANK_CSV: &str = "Date,Description,Amount,Category\n\
01/05/2024,KROGER #123,-60.00,\n\
01/06/2024,PAYROLL,2500.00,\n\
01/07/2024,CITY ELECTRIC,-95.10,utilities\n\
01/08/2024,MYSTERY SHOP 42,-12.00,\n";

#[test]
fn test_import_csv_records_matched_expenses() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_import_rule(&ImportRule::new_contains("kroger".into(), "Food".into()))
        .unwrap();
    let file = csv_file(BANK_CSV);

    let report = import_csv(&mut db, file.path()).unwrap();
    assert_eq!(report.parsed, 3);
    assert_eq!(report.recorded, 2);
    assert_eq!(report.unmatched.len(), 1);
    assert_eq!(report.unmatched[0].description, "MYSTERY SHOP 42");

    let ledger = db.load_ledger().unwrap();
    assert_eq!(ledger.category("Food").unwrap().spent, dec!(60));
    assert_eq!(ledger.category("Utilities").unwrap().spent, dec!(95.10));
}

#[test]
fn test_import_csv_twice_skips_duplicates() {
    let mut db = Database::open_in_memory().unwrap();
    db.insert_import_rule(&ImportRule::new_contains("kroger".into(), "Food".into()))
        .unwrap();
    let file = csv_file(BANK_CSV);

    import_csv(&mut db, file.path()).unwrap();
    let again = import_csv(&mut db, file.path()).unwrap();
    assert_eq!(again.recorded, 0);
    assert_eq!(again.duplicates, 2);
    assert_eq!(db.load_ledger().unwrap().total_spent(), dec!(155.10));
}

#[test]
fn test_import_csv_newer_export_skips_rows_already_recorded() {
    let mut db = Database::open_in_memory().unwrap();
    let first = csv_file("Date,Description,Amount,Category\n01/05/2024,KROGER,-60.00,Food\n");
    let report = import_csv(&mut db, first.path()).unwrap();
    assert_eq!(report.recorded, 1);

    // The bank puts newer rows on top, shifting the old ones down
    let second = csv_file(
        "Date,Description,Amount,Category\n\
         01/06/2024,CAFE,-5.00,Food\n\
         01/05/2024,KROGER,-60.00,Food\n",
    );
    let report = import_csv(&mut db, second.path()).unwrap();
    assert_eq!(report.recorded, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(db.load_ledger().unwrap().category("Food").unwrap().spent, dec!(65));
    assert_eq!(db.get_expense_count().unwrap(), 2);
}

#[test]
fn test_import_csv_missing_file() {
    let mut db = Database::open_in_memory().unwrap();
    let err = import_csv(&mut db, Path::new("/nonexistent/file.csv")).unwrap_err();
    assert!(err.to_string().contains("File not found"));
}

#[test]
fn test_report_suggestions_are_distinct() {
    let report = ImportReport {
        unmatched: vec![
            Expense::new(String::new(), "2024-01-01".into(), "STARBUCKS 123".into(), dec!(5)),
            Expense::new(String::new(), "2024-01-02".into(), "STARBUCKS 123".into(), dec!(6)),
        ],
        ..ImportReport::default()
    };
    assert_eq!(
        report.suggestions(),
        vec![("STARBUCKS 123".to_string(), "starbucks".to_string())]
    );
    assert_eq!(
        report.to_string(),
        "Recorded 0 of 0 expenses (0 duplicates, 2 unmatched)"
    );
}

#[test]
fn test_sync_snapshot_records_and_dedupes() {
    let mut db = Database::open_in_memory().unwrap();
    let snapshot = Snapshot::parse(
        r#"{"items":[{"institution":{"id":"i","name":"Bank"},"accounts":[],
            "transactions":[
              {"id":"t1","date":"2024-02-01","name":"Grocer","amount":40.5,"category":["food"]},
              {"id":"t2","date":"2024-02-02","name":"Refund","amount":-10,"category":["Food"]},
              {"id":"t3","date":"2024-02-03","name":"Gadget","amount":99,"category":["Electronics"]}
            ]}]}"#,
    )
    .unwrap();

    let first = sync_snapshot(&mut db, &snapshot).unwrap();
    assert_eq!(first.parsed, 2);
    assert_eq!(first.recorded, 1);
    assert_eq!(first.unmatched.len(), 1);

    let second = sync_snapshot(&mut db, &snapshot).unwrap();
    assert_eq!(second.recorded, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(db.load_ledger().unwrap().category("Food").unwrap().spent, dec!(40.5));
}
