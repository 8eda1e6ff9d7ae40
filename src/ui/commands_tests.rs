#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn setup() -> (App, Database) {
    let db = Database::open_in_memory().unwrap();
    let mut app = App::new();
    app.refresh_all(&db).unwrap();
    (app, db)
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("", ""), 0);
    assert_eq!(levenshtein("spend", "spend"), 0);
    assert_eq!(levenshtein("spnd", "spend"), 1);
    assert_eq!(levenshtein("kitten", "sitting"), 3);
}

#[test]
fn test_unknown_command_suggests_closest() {
    let (mut app, mut db) = setup();
    handle_command("revse 1 2", &mut app, &mut db).unwrap();
    assert!(app.status_message.contains("Did you mean :revise?"));
}

#[test]
fn test_split_category_prefix_prefers_longest_name() {
    let (app, _db) = setup();
    let (name, rest) = split_category_prefix(&app.ledger, "debt payment 50 car loan").unwrap();
    assert_eq!(name, "Debt Payment");
    assert_eq!(rest, "50 car loan");

    let (name, rest) = split_category_prefix(&app.ledger, "Food 12.50").unwrap();
    assert_eq!(name, "Food");
    assert_eq!(rest, "12.50");

    assert!(split_category_prefix(&app.ledger, "Groceries 10").is_none());
}

#[test]
fn test_split_category_suffix() {
    let (app, _db) = setup();
    let (pattern, name) = split_category_suffix(&app.ledger, "bank of x Debt Payment").unwrap();
    assert_eq!(pattern, "bank of x");
    assert_eq!(name, "Debt Payment");

    assert!(split_category_suffix(&app.ledger, "Food").is_none());
    assert!(split_category_suffix(&app.ledger, "kroger Groceries").is_none());
}

#[test]
fn test_budget_command_sets_one_category() {
    let (mut app, mut db) = setup();
    handle_command("budget food 425.50", &mut app, &mut db).unwrap();

    assert_eq!(app.ledger.category("Food").unwrap().budget, dec!(425.50));
    assert_eq!(db.load_ledger().unwrap().category("Food").unwrap().budget, dec!(425.50));
    assert_eq!(app.status_message, "Budget set: Food = 425.50");
}

#[test]
fn test_budget_command_rejects_bad_input() {
    let (mut app, mut db) = setup();
    handle_command("budget Food -5", &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "Invalid amount: -5");

    handle_command("budget Groceries 5", &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "Category 'Groceries' not found");
    assert_eq!(app.ledger.category("Food").unwrap().budget, dec!(300));
}

#[test]
fn test_spend_command_records_expense() {
    let (mut app, mut db) = setup();
    handle_command("spend Debt Payment 50 car loan", &mut app, &mut db).unwrap();

    assert_eq!(app.ledger.category("Debt Payment").unwrap().spent, dec!(50));
    assert_eq!(app.expenses.len(), 1);
    assert_eq!(app.expenses[0].description, "car loan");
    assert_eq!(app.expense_count, 1);
}

#[test]
fn test_spend_command_requires_positive_amount() {
    let (mut app, mut db) = setup();
    handle_command("spend Food 0", &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "Invalid amount: 0");
    assert!(app.expenses.is_empty());
    assert_eq!(app.ledger.total_spent(), Decimal::ZERO);
}

#[test]
fn test_revise_asks_for_confirmation() {
    let (mut app, mut db) = setup();
    handle_command("revise 1 2 3", &mut app, &mut db).unwrap();

    assert_eq!(app.input_mode, InputMode::Confirm);
    assert!(app.confirm_message.contains("3 amounts for 10 categories"));
    assert!(matches!(
        app.pending_action,
        Some(PendingAction::ReviseAll { ref amounts }) if amounts.len() == 3
    ));
    // Nothing changes until the prompt is accepted
    assert_eq!(app.ledger.category("Food").unwrap().budget, dec!(300));
}

#[test]
fn test_apply_revision_legacy_is_positional() {
    let (mut app, mut db) = setup();
    apply_revision(&[dec!(400), dec!(2200)], &mut app, &mut db).unwrap();

    let cats = app.ledger.categories();
    assert_eq!(cats[0].budget, dec!(400));
    assert_eq!(cats[1].budget, dec!(2200));
    assert_eq!(cats[2].budget, dec!(500));
    assert_eq!(app.status_message, "Revised 2 budgets");
}

#[test]
fn test_apply_revision_strict_rejects_misaligned() {
    let (mut app, mut db) = setup();
    handle_command("mode strict", &mut app, &mut db).unwrap();
    assert_eq!(app.ledger.mode(), LedgerMode::Strict);

    apply_revision(&[dec!(400)], &mut app, &mut db).unwrap();
    assert!(app.status_message.starts_with("Revision rejected"));
    assert_eq!(app.ledger.category("Food").unwrap().budget, dec!(300));
}

#[test]
fn test_category_command_adds_and_rejects_duplicates() {
    let (mut app, mut db) = setup();
    handle_command("category Pet Care 60", &mut app, &mut db).unwrap();
    assert_eq!(app.ledger.len(), 11);
    assert_eq!(app.ledger.category("Pet Care").unwrap().budget, dec!(60));

    handle_command("category Food 10", &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "Duplicate category: Food");
    assert_eq!(app.ledger.len(), 11);
}

#[test]
fn test_rule_commands() {
    let (mut app, mut db) = setup();
    handle_command("rule Whole Foods Food", &mut app, &mut db).unwrap();
    assert_eq!(app.import_rules.len(), 1);
    assert_eq!(app.import_rules[0].pattern, "whole foods");
    assert_eq!(app.import_rules[0].category, "Food");
    assert!(!app.import_rules[0].is_regex);

    handle_command("regex-rule ^SQ \\* Entertainment", &mut app, &mut db).unwrap();
    assert_eq!(app.import_rules.len(), 2);

    handle_command("regex-rule [unclosed Food", &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "Invalid regex: [unclosed");
    assert_eq!(app.import_rules.len(), 2);
}

#[test]
fn test_delete_rule_needs_confirmation() {
    let (mut app, mut db) = setup();
    handle_command("delete-rule", &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "No rules to delete");

    handle_command("rule kroger Food", &mut app, &mut db).unwrap();
    handle_command("delete-rule", &mut app, &mut db).unwrap();
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert_eq!(app.confirm_message, "Delete rule 'kroger'?");
}

#[test]
fn test_mode_command() {
    let (mut app, mut db) = setup();
    handle_command("mode", &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "Ledger mode: legacy");

    handle_command("mode loose", &mut app, &mut db).unwrap();
    assert_eq!(app.status_message, "Usage: :mode [legacy|strict]");

    handle_command("mode strict", &mut app, &mut db).unwrap();
    assert_eq!(db.ledger_mode().unwrap(), LedgerMode::Strict);
}

#[test]
fn test_filter_and_month_commands() {
    let (mut app, mut db) = setup();
    handle_command("spend Food 10 lunch", &mut app, &mut db).unwrap();
    handle_command("spend Housing 900 rent", &mut app, &mut db).unwrap();

    handle_command("filter housing", &mut app, &mut db).unwrap();
    assert_eq!(app.screen, Screen::Expenses);
    assert_eq!(app.expense_filter_category.as_deref(), Some("Housing"));
    assert_eq!(app.expenses.len(), 1);

    handle_command("filter", &mut app, &mut db).unwrap();
    assert_eq!(app.expenses.len(), 2);

    handle_command("month 1999-01", &mut app, &mut db).unwrap();
    assert_eq!(app.current_month.as_deref(), Some("1999-01"));
    assert!(app.expenses.is_empty());

    handle_command("month 2024-13", &mut app, &mut db).unwrap();
    assert!(app.status_message.starts_with("Invalid month format"));
}

#[test]
fn test_export_then_import_json() {
    let (mut app, mut db) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let path_str = path.to_str().unwrap();

    handle_command("budget Food 999", &mut app, &mut db).unwrap();
    handle_command(&format!("export {path_str}"), &mut app, &mut db).unwrap();
    assert!(path.exists());

    handle_command("budget Food 1", &mut app, &mut db).unwrap();
    handle_command(&format!("import-json {path_str}"), &mut app, &mut db).unwrap();
    assert_eq!(app.ledger.category("Food").unwrap().budget, dec!(999));
}

#[test]
fn test_sync_without_snapshot() {
    let (mut app, mut db) = setup();
    handle_command("sync", &mut app, &mut db).unwrap();
    assert!(app.status_message.starts_with("No snapshot loaded"));
}
