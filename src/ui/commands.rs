use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use rust_decimal::Decimal;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::db::Database;
use crate::import::{merge_ledger, parse_decimal, read_ledger_file, write_ledger_file};
use crate::ledger::{BudgetLedger, BudgetUpdate, LedgerMode};
use crate::models::{BudgetCategory, Expense, ImportRule};
use crate::run::{actions, shellexpand};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit BudgetPlanner", cmd_quit, r);
    register_command!("quit", "Quit BudgetPlanner", cmd_quit, r);
    register_command!("p", "Go to Planner", cmd_planner, r);
    register_command!("planner", "Go to Planner", cmd_planner, r);
    register_command!("e", "Go to Expenses", cmd_expenses, r);
    register_command!("expenses", "Go to Expenses", cmd_expenses, r);
    register_command!("a", "Go to Accounts", cmd_accounts, r);
    register_command!("accounts", "Go to Accounts", cmd_accounts, r);
    register_command!("r", "Go to Rules", cmd_rules, r);
    register_command!("rules", "Go to Rules", cmd_rules, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "budget",
        "Set a category budget (e.g. :budget Food 350)",
        cmd_budget,
        r
    );
    register_command!("b", "Set a category budget (e.g. :b Food 350)", cmd_budget, r);
    register_command!(
        "revise",
        "Set every budget in order (e.g. :revise 400 2200 600)",
        cmd_revise,
        r
    );
    register_command!(
        "spend",
        "Record an expense (e.g. :spend Food 12.50 lunch)",
        cmd_spend,
        r
    );
    register_command!("s", "Record an expense (e.g. :s Food 12.50)", cmd_spend, r);
    register_command!(
        "category",
        "Add a category (e.g. :category Pets 60)",
        cmd_category,
        r
    );
    register_command!(
        "rule",
        "Add categorization rule (e.g. :rule kroger Food)",
        cmd_rule,
        r
    );
    register_command!(
        "regex-rule",
        "Add regex rule (e.g. :regex-rule ^SQ \\* Food)",
        cmd_regex_rule,
        r
    );
    register_command!(
        "delete-rule",
        "Delete selected import rule",
        cmd_delete_rule,
        r
    );
    register_command!(
        "search",
        "Search expenses (e.g. :search coffee)",
        cmd_search,
        r
    );
    register_command!(
        "filter",
        "Show one category's expenses (e.g. :filter Food)",
        cmd_filter,
        r
    );
    register_command!("month", "Set month filter (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month filter (e.g. :m 2024-01)", cmd_month, r);
    register_command!(
        "mode",
        "Show or set ledger mode (e.g. :mode strict)",
        cmd_mode,
        r
    );
    register_command!(
        "import",
        "Import a bank CSV (e.g. :import ~/bank.csv)",
        cmd_import,
        r
    );
    register_command!(
        "snapshot",
        "Load an aggregator snapshot (e.g. :snapshot ~/accounts.json)",
        cmd_snapshot,
        r
    );
    register_command!(
        "sync",
        "Record expenses from the loaded snapshot",
        cmd_sync,
        r
    );
    register_command!(
        "export",
        "Export the ledger as JSON (e.g. :export ~/budget.json)",
        cmd_export,
        r
    );
    register_command!(
        "import-json",
        "Merge a ledger JSON file (e.g. :import-json ~/budget.json)",
        cmd_import_json,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Split `args` into a leading category name and the words after it.
/// Category names may contain spaces, so the longest prefix naming a
/// category wins.
pub(crate) fn split_category_prefix(ledger: &BudgetLedger, args: &str) -> Option<(String, String)> {
    let words: Vec<&str> = args.split_whitespace().collect();
    (1..=words.len()).rev().find_map(|n| {
        let name = ledger.resolve_name(&words[..n].join(" "))?;
        Some((name.to_string(), words[n..].join(" ")))
    })
}

/// Split `args` into the leading words and a trailing category name.
pub(crate) fn split_category_suffix(ledger: &BudgetLedger, args: &str) -> Option<(String, String)> {
    let words: Vec<&str> = args.split_whitespace().collect();
    (1..words.len()).find_map(|n| {
        let name = ledger.resolve_name(&words[n..].join(" "))?;
        Some((words[..n].join(" "), name.to_string()))
    })
}

/// Expenses must be positive; budgets may be zero.
fn parse_amount_arg(app: &mut App, raw: &str, allow_zero: bool) -> Option<Decimal> {
    match parse_decimal(raw) {
        Ok(amount) if amount > Decimal::ZERO || (allow_zero && amount.is_zero()) => Some(amount),
        Ok(_) => {
            app.set_status(format!("Invalid amount: {raw}"));
            None
        }
        Err(_) => {
            app.set_status(format!("Invalid amount: {raw}"));
            None
        }
    }
}

fn save_and_refresh(app: &mut App, db: &mut Database, ledger: &BudgetLedger) -> anyhow::Result<()> {
    db.save_ledger(ledger)?;
    app.refresh_ledger(db)?;
    Ok(())
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_planner(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Planner;
    app.refresh_ledger(db)?;
    Ok(())
}

fn cmd_expenses(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    app.refresh_expenses(db)?;
    Ok(())
}

fn cmd_accounts(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Accounts;
    Ok(())
}

fn cmd_rules(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Rules;
    app.refresh_rules(db)?;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    // Last token is the amount, everything before is the category name
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    if parts.len() < 2 {
        app.set_status("Usage: :budget <category> <amount>");
        return Ok(());
    }

    let (amount_str, category_name) = (parts[0], parts[1]);
    let Some(amount) = parse_amount_arg(app, amount_str, true) else {
        return Ok(());
    };
    let Some(name) = app.ledger.resolve_name(category_name).map(str::to_string) else {
        app.set_status(format!("Category '{category_name}' not found"));
        return Ok(());
    };

    let ledger = app
        .ledger
        .revise_budgets_by_name(&[BudgetUpdate::new(name.clone(), amount)])?;
    save_and_refresh(app, db, &ledger)?;
    app.screen = Screen::Planner;
    app.set_status(format!("Budget set: {name} = {amount}"));
    Ok(())
}

fn cmd_revise(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :revise <amount> <amount> ... (one per category, in order)");
        return Ok(());
    }

    let mut amounts = Vec::new();
    for raw in args.split_whitespace() {
        let Some(amount) = parse_amount_arg(app, raw, true) else {
            return Ok(());
        };
        amounts.push(amount);
    }

    let count = app.ledger.len();
    app.confirm_message = if amounts.len() == count {
        format!("Replace all {count} budgets in order?")
    } else {
        format!(
            "{} amounts for {count} categories. Apply by position anyway?",
            amounts.len()
        )
    };
    app.pending_action = Some(PendingAction::ReviseAll { amounts });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

/// Apply a confirmed positional revision.
pub(crate) fn apply_revision(
    amounts: &[Decimal],
    app: &mut App,
    db: &mut Database,
) -> anyhow::Result<()> {
    // Positional updates carry the name at that position so strict mode lines up
    let updates: Vec<BudgetUpdate> = amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| {
            let name = app
                .ledger
                .categories()
                .get(i)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            BudgetUpdate::new(name, amount)
        })
        .collect();

    match app.ledger.revise_budgets(&updates) {
        Ok(ledger) => {
            save_and_refresh(app, db, &ledger)?;
            app.set_status(format!("Revised {} budgets", amounts.len()));
        }
        Err(e) => app.set_status(format!("Revision rejected: {e}")),
    }
    Ok(())
}

fn cmd_spend(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some((name, rest)) = split_category_prefix(&app.ledger, args) else {
        app.set_status("Usage: :spend <category> <amount> [description]");
        return Ok(());
    };
    let (amount_str, description) = rest.split_once(' ').unwrap_or((rest.as_str(), ""));
    let Some(amount) = parse_amount_arg(app, amount_str, false) else {
        return Ok(());
    };

    let expense = Expense::manual(name.clone(), description.trim().to_string(), amount);
    let commit = db.commit_expenses(&app.ledger, &[expense])?;
    app.ledger = commit.ledger;
    app.refresh_expenses(db)?;
    app.set_status(format!("Spent {amount} on {name}"));
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    if parts.len() < 2 {
        app.set_status("Usage: :category <name> <budget>");
        return Ok(());
    }

    let (amount_str, name) = (parts[0], parts[1].trim());
    let Some(budget) = parse_amount_arg(app, amount_str, true) else {
        return Ok(());
    };

    match app
        .ledger
        .add_category(BudgetCategory::new(name, Decimal::ZERO, budget))
    {
        Ok(ledger) => {
            save_and_refresh(app, db, &ledger)?;
            app.set_status(format!("Added category: {name}"));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_rule(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    add_rule(args, false, app, db)
}

fn cmd_regex_rule(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    add_rule(args, true, app, db)
}

fn add_rule(args: &str, is_regex: bool, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let usage = if is_regex {
        "Usage: :regex-rule <pattern> <category>"
    } else {
        "Usage: :rule <pattern> <category>"
    };
    let Some((pattern, category)) = split_category_suffix(&app.ledger, args) else {
        app.set_status(usage);
        return Ok(());
    };

    let rule = if is_regex {
        if regex::Regex::new(&pattern).is_err() {
            app.set_status(format!("Invalid regex: {pattern}"));
            return Ok(());
        }
        ImportRule::new_regex(pattern, category.clone())
    } else {
        ImportRule::new_contains(pattern.to_lowercase(), category.clone())
    };

    db.insert_import_rule(&rule)?;
    app.refresh_rules(db)?;
    app.set_status(format!("Added rule: '{}' -> {category}", rule.pattern));
    Ok(())
}

fn cmd_delete_rule(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.import_rules.is_empty() {
        app.set_status("No rules to delete");
        return Ok(());
    }

    if let Some(rule) = app.import_rules.get(app.rule_index) {
        if let Some(id) = rule.id {
            let pattern = rule.pattern.clone();
            app.confirm_message = format!("Delete rule '{pattern}'?");
            app.pending_action = Some(PendingAction::DeleteRule { id, pattern });
            app.input_mode = InputMode::Confirm;
        }
    }

    Ok(())
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Expenses;
    app.refresh_expenses(db)?;

    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args}"));
    }

    Ok(())
}

fn cmd_filter(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    if args.is_empty() {
        app.expense_filter_category = None;
        app.refresh_expenses(db)?;
        app.set_status("Category filter cleared");
        return Ok(());
    }

    match app.ledger.resolve_name(args).map(str::to_string) {
        Some(name) => {
            app.set_status(format!("Showing expenses for {name}"));
            app.expense_filter_category = Some(name);
            app.expense_index = 0;
            app.expense_scroll = 0;
            app.refresh_expenses(db)?;
        }
        None => app.set_status(format!("Category '{args}' not found")),
    }
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.current_month = None;
        app.refresh_expenses(db)?;
        app.set_status("Showing all time");
        return Ok(());
    }

    // Accept "2024-01", "2024-1", "01" and "1"
    let month = if args.len() <= 2 {
        let year = chrono::Local::now().format("%Y").to_string();
        format!("{year}-{args:0>2}")
    } else {
        args.to_string()
    };

    match chrono::NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d") {
        Ok(date) => {
            let m = date.format("%Y-%m").to_string();
            app.set_status(format!("Switched to month: {m}"));
            app.current_month = Some(m);
            app.refresh_expenses(db)?;
        }
        Err(_) => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)"),
    }

    Ok(())
}

fn cmd_mode(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status(format!("Ledger mode: {}", app.ledger.mode()));
        return Ok(());
    }

    match LedgerMode::parse(args) {
        Some(mode) => {
            db.set_ledger_mode(mode)?;
            app.refresh_ledger(db)?;
            app.set_status(format!("Ledger mode set to {mode}"));
        }
        None => app.set_status("Usage: :mode [legacy|strict]"),
    }
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <file.csv>");
        return Ok(());
    }

    let path = shellexpand(args);
    match actions::import_csv(db, Path::new(&path)) {
        Ok(report) => {
            app.refresh_all(db)?;
            app.set_status(report_status(&report));
        }
        Err(e) => app.set_status(format!("Import failed: {e:#}")),
    }
    Ok(())
}

fn cmd_snapshot(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        match db.snapshot_path()? {
            Some(p) => p,
            None => {
                app.set_status("Usage: :snapshot <file.json>");
                return Ok(());
            }
        }
    } else {
        shellexpand(args)
    };

    match app.load_snapshot(&path) {
        Ok(()) => {
            db.set_snapshot_path(&path)?;
            app.screen = Screen::Accounts;
            app.set_status(format!("Loaded snapshot: {path}"));
        }
        Err(e) => app.set_status(format!("Could not load snapshot: {e:#}")),
    }
    Ok(())
}

fn cmd_sync(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(snapshot) = app.snapshot.as_ref() else {
        app.set_status("No snapshot loaded. Use :snapshot <file.json> first");
        return Ok(());
    };

    let report = actions::sync_snapshot(db, snapshot)?;
    app.refresh_all(db)?;
    app.set_status(report_status(&report));
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/budgetplanner-ledger.json")
    } else {
        shellexpand(args)
    };

    write_ledger_file(Path::new(&path), &app.ledger)?;
    app.set_status(format!("Exported {} categories to {path}", app.ledger.len()));
    Ok(())
}

fn cmd_import_json(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import-json <file.json>");
        return Ok(());
    }

    let path = shellexpand(args);
    match read_ledger_file(Path::new(&path)) {
        Ok(incoming) => {
            let merged = merge_ledger(&app.ledger, &incoming);
            save_and_refresh(app, db, &merged)?;
            app.set_status(format!("Merged {} categories from {path}", incoming.len()));
        }
        Err(e) => app.set_status(format!("Could not read ledger: {e:#}")),
    }
    Ok(())
}

fn report_status(report: &actions::ImportReport) -> String {
    let mut msg = report.to_string();
    if let Some((desc, pattern)) = report.suggestions().first() {
        msg.push_str(&format!(". Try :rule {pattern} <category> for '{desc}'"));
    }
    if !report.bad_patterns.is_empty() {
        msg.push_str(&format!(". Invalid regex: {}", report.bad_patterns.join(", ")));
    }
    msg
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
