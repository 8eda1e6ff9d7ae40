#![allow(clippy::unwrap_used)]

use super::*;
use crate::ledger::starter_categories;
use crate::models::ImportRule;
use rust_decimal_macros::dec;

const SNAPSHOT: &str = r#"{
  "items": [
    {
      "institution": { "id": "ins_1", "name": "First Bank" },
      "accounts": [
        { "id": "a1", "name": "Checking", "type": "depository", "subtype": "checking",
          "balances": [{ "current": 2500.75, "available": 2400 }] },
        { "id": "a2", "name": "Visa", "type": "credit",
          "balances": [{ "current": 640.25, "available": 4359.75 }] },
        { "id": "a3", "name": "Savings", "type": "depository", "subtype": "savings",
          "balances": [{ "current": 10000 }] }
      ],
      "transactions": [
        { "id": "t1", "date": "2024-03-02", "merchant_name": "Kroger", "name": "KROGER #123",
          "amount": 54.2, "category": ["Shops", "Food"] },
        { "id": "t2", "date": "2024-03-03", "name": "Payroll", "amount": -2000, "category": ["Transfer"] },
        { "id": "t3", "date": "2024-03-04", "name": "SHELL OIL 5732", "amount": 40, "category": ["Travel"] },
        { "id": "t4", "date": "2024-03-05", "name": "Airline", "amount": 310, "category": ["Travel", "Airlines"] }
      ]
    },
    {
      "accounts": [
        { "id": "b1", "name": "Car Loan", "type": "loan", "balances": [{ "current": 8000 }] },
        { "id": "b2", "name": "Brokerage", "type": "investment", "balances": [] }
      ]
    }
  ]
}"#;

fn ledger() -> BudgetLedger {
    BudgetLedger::new(starter_categories()).unwrap()
}

#[test]
fn test_parse_institutions() {
    let snap = Snapshot::parse(SNAPSHOT).unwrap();
    assert_eq!(snap.institutions.len(), 2);
    assert_eq!(snap.institutions[0].name, "First Bank");
    assert_eq!(snap.institutions[0].accounts.len(), 3);
    assert_eq!(snap.institutions[1].name, "Unknown Institution");
    assert_eq!(snap.institutions[1].id, "");
}

#[test]
fn test_parse_balances() {
    let snap = Snapshot::parse(SNAPSHOT).unwrap();
    let visa = &snap.institutions[0].accounts[1];
    assert_eq!(visa.kind, AccountKind::Credit);
    assert_eq!(visa.balance, dec!(640.25));
    assert_eq!(visa.available, Some(dec!(4359.75)));

    // Missing balance entry reads as zero
    let brokerage = &snap.institutions[1].accounts[1];
    assert_eq!(brokerage.balance, dec!(0));
    assert_eq!(brokerage.available, None);
}

#[test]
fn test_grouping_by_kind_keeps_first_seen_order() {
    let snap = Snapshot::parse(SNAPSHOT).unwrap();
    let groups = snap.institutions[0].accounts_by_kind();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, AccountKind::Depository);
    assert_eq!(groups[0].1.len(), 2);
    assert_eq!(groups[1].0, AccountKind::Credit);
}

#[test]
fn test_net_worth() {
    let snap = Snapshot::parse(SNAPSHOT).unwrap();
    assert_eq!(snap.total_assets(), dec!(12500.75));
    assert_eq!(snap.total_liabilities(), dec!(8640.25));
    assert_eq!(snap.net_worth(), dec!(3860.50));
    assert_eq!(snap.credit_cards().len(), 1);
}

#[test]
fn test_empty_snapshot() {
    let snap = Snapshot::parse("{}").unwrap();
    assert!(snap.institutions.is_empty());
    assert_eq!(snap.net_worth(), dec!(0));
}

#[test]
fn test_invalid_snapshot() {
    assert!(Snapshot::parse("[1, 2").is_err());
}

#[test]
fn test_transaction_description_prefers_merchant() {
    let snap = Snapshot::parse(SNAPSHOT).unwrap();
    assert_eq!(snap.transactions[0].description, "Kroger");
    assert_eq!(snap.transactions[1].description, "Payroll");
    assert!(!snap.transactions[1].is_expense());
    assert_eq!(snap.transactions[0].import_hash(), "txn:t1");
}

#[test]
fn test_expenses_from_aggregator_categories() {
    let snap = Snapshot::parse(SNAPSHOT).unwrap();
    let (categorizer, _) = Categorizer::new(&[]);
    let feed = snap.expenses(&categorizer, &ledger());

    assert_eq!(feed.matched.len(), 1);
    assert_eq!(feed.matched[0].category, "Food");
    assert_eq!(feed.matched[0].amount, dec!(54.2));
    assert_eq!(feed.matched[0].import_hash, "txn:t1");
    // Income is never an expense; Shell and Airline match nothing
    assert_eq!(feed.unmatched.len(), 2);
}

#[test]
fn test_expenses_rules_win_over_aggregator_categories() {
    let snap = Snapshot::parse(SNAPSHOT).unwrap();
    let rules = vec![
        ImportRule::new_contains("shell".into(), "Transportation".into()),
        ImportRule::new_contains("kroger".into(), "Personal".into()),
    ];
    let (categorizer, _) = Categorizer::new(&rules);
    let feed = snap.expenses(&categorizer, &ledger());

    let categories: Vec<&str> = feed.matched.iter().map(|e| e.category.as_str()).collect();
    assert_eq!(categories, vec!["Personal", "Transportation"]);
    assert_eq!(feed.unmatched.len(), 1);
    assert_eq!(feed.unmatched[0].description, "Airline");
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, SNAPSHOT).unwrap();
    let snap = Snapshot::load(&path).unwrap();
    assert_eq!(snap.transactions.len(), 4);
    assert!(Snapshot::load(&dir.path().join("missing.json")).is_err());
}
