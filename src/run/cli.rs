use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;

use super::actions::{self, ImportReport};
use super::shellexpand;
use crate::db::Database;
use crate::feed::Snapshot;
use crate::import::{merge_ledger, parse_decimal, read_ledger_file, write_ledger_file};
use crate::ledger::{BudgetLedger, BudgetUpdate, LedgerMode};
use crate::models::{BudgetCategory, Expense};
use crate::ui::util::{create_progress_bar, format_amount};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "summary" | "s" => cli_summary(&args[2..], db),
        "spend" => cli_spend(&args[2..], db),
        "budget" => cli_budget(&args[2..], db),
        "revise" => cli_revise(&args[2..], db),
        "add-category" => cli_add_category(&args[2..], db),
        "import" => cli_import(&args[2..], db),
        "export-json" => cli_export_json(&args[2..], db),
        "import-json" => cli_import_json(&args[2..], db),
        "accounts" => cli_accounts(&args[2..], db),
        "sync" => cli_sync(&args[2..], db),
        "mode" => cli_mode(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgetplanner {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("BudgetPlanner: category budgets and spending progress");
    println!();
    println!("Usage: budgetplanner [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  summary [YYYY-MM]             Print totals, per-category progress and");
    println!("                                optionally one month's spending");
    println!("  spend <category> <amount> [description]");
    println!("                                Record an expense");
    println!("  budget <category> <amount>    Set one category's budget");
    println!("  revise <amount>...            Set budgets in category order");
    println!("  add-category <name> <budget>  Add a category");
    println!("  import <file.csv>             Import expenses from a bank CSV");
    println!("  export-json [path]            Write the ledger as JSON");
    println!("  import-json <path>            Merge budgets and spend from JSON");
    println!("  accounts [snapshot.json]      Show balances and net worth");
    println!("  sync [snapshot.json]          Record expenses from a snapshot");
    println!("  mode [legacy|strict]          Show or set the ledger mode");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    let amount = parse_decimal(raw)?;
    if amount < Decimal::ZERO {
        anyhow::bail!("Amount must not be negative: {raw}");
    }
    Ok(amount)
}

fn resolve(ledger: &BudgetLedger, name: &str) -> Result<String> {
    ledger
        .resolve_name(name)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Category '{name}' not found"))
}

fn cli_summary(args: &[String], db: &mut Database) -> Result<()> {
    let ledger = db.load_ledger()?;
    let summary = ledger.summary();

    println!("BudgetPlanner ({} mode)", ledger.mode());
    println!("{}", "─".repeat(60));
    println!("  Total Budget:    {}", format_amount(summary.total_budget));
    println!("  Total Expenses:  {}", format_amount(summary.total_spent));
    println!("  Remaining:       {}", format_amount(summary.total_remaining));
    println!();

    for (cat, progress) in ledger.progress_by_category() {
        println!(
            "  {:<16} {:>12} / {:<12} {} {:>3}% {:<8} {:>12} left",
            cat.name,
            format_amount(cat.spent),
            format_amount(cat.budget),
            create_progress_bar(progress.progress, 20),
            progress.percent(),
            progress.band,
            format_amount(cat.remaining()),
        );
    }

    if let Some(month) = args.first() {
        chrono::NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{month}', use YYYY-MM"))?;
        println!();
        println!("Spent in {month}:");
        let spending = db.get_spending_by_category(month)?;
        if spending.is_empty() {
            println!("  (nothing recorded)");
        }
        for (name, amount) in spending {
            println!("  {name:<16} {:>12}", format_amount(amount));
        }
    }
    Ok(())
}

fn cli_spend(args: &[String], db: &mut Database) -> Result<()> {
    if args.len() < 2 {
        anyhow::bail!("Usage: budgetplanner spend <category> <amount> [description]");
    }
    let ledger = db.load_ledger()?;
    let name = resolve(&ledger, &args[0])?;
    let amount = parse_amount(&args[1])?;
    if amount.is_zero() {
        anyhow::bail!("Amount must be positive: {}", args[1]);
    }
    let description = args[2..].join(" ");

    let commit = db.commit_expenses(&ledger, &[Expense::manual(name.clone(), description, amount)])?;
    let cat = commit
        .ledger
        .category(&name)
        .context("Category disappeared after recording")?;
    println!(
        "Recorded {} on {name}: {} of {} spent",
        format_amount(amount),
        format_amount(cat.spent),
        format_amount(cat.budget)
    );
    Ok(())
}

fn cli_budget(args: &[String], db: &mut Database) -> Result<()> {
    if args.len() != 2 {
        anyhow::bail!("Usage: budgetplanner budget <category> <amount>");
    }
    let ledger = db.load_ledger()?;
    let name = resolve(&ledger, &args[0])?;
    let amount = parse_amount(&args[1])?;

    let revised = ledger.revise_budgets_by_name(&[BudgetUpdate::new(name.clone(), amount)])?;
    db.save_ledger(&revised)?;
    println!("Budget set: {name} = {}", format_amount(amount));
    Ok(())
}

fn cli_revise(args: &[String], db: &mut Database) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: budgetplanner revise <amount>...");
    }
    let ledger = db.load_ledger()?;
    let amounts = args
        .iter()
        .map(|a| parse_amount(a))
        .collect::<Result<Vec<_>>>()?;

    let updates: Vec<BudgetUpdate> = amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| {
            let name = ledger
                .categories()
                .get(i)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            BudgetUpdate::new(name, amount)
        })
        .collect();

    if updates.len() != ledger.len() {
        eprintln!(
            "Warning: {} amounts for {} categories, applying by position",
            updates.len(),
            ledger.len()
        );
    }

    let revised = ledger.revise_budgets(&updates)?;
    db.save_ledger(&revised)?;
    for cat in revised.categories() {
        println!("  {:<16} {}", cat.name, format_amount(cat.budget));
    }
    Ok(())
}

fn cli_add_category(args: &[String], db: &mut Database) -> Result<()> {
    if args.len() != 2 {
        anyhow::bail!("Usage: budgetplanner add-category <name> <budget>");
    }
    let ledger = db.load_ledger()?;
    let budget = parse_amount(&args[1])?;
    let name = args[0].trim();
    let added = ledger.add_category(BudgetCategory::new(name, Decimal::ZERO, budget))?;
    db.save_ledger(&added)?;
    println!("Added category: {name} ({})", format_amount(budget));
    Ok(())
}

fn print_report(report: &ImportReport) {
    if !report.bad_patterns.is_empty() {
        eprintln!(
            "Warning: invalid regex rule(s): {}",
            report.bad_patterns.join(", ")
        );
    }
    println!("{report}");

    let suggestions = report.suggestions();
    if !suggestions.is_empty() {
        println!();
        println!("Unmatched expenses (add a rule to categorize them):");
        for (description, pattern) in &suggestions {
            println!("  {description:<32} rule: {pattern}");
        }
    }
}

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    let Some(file_path) = args.first() else {
        anyhow::bail!("Usage: budgetplanner import <file.csv>");
    };
    let report = actions::import_csv(db, Path::new(&shellexpand(file_path)))?;
    print_report(&report);
    Ok(())
}

fn cli_export_json(args: &[String], db: &mut Database) -> Result<()> {
    let output_path = args
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/budgetplanner-ledger.json")
        });

    let ledger = db.load_ledger()?;
    write_ledger_file(Path::new(&output_path), &ledger)?;
    println!("Exported {} categories to {output_path}", ledger.len());
    Ok(())
}

fn cli_import_json(args: &[String], db: &mut Database) -> Result<()> {
    let Some(path) = args.first() else {
        anyhow::bail!("Usage: budgetplanner import-json <path>");
    };
    let incoming = read_ledger_file(Path::new(&shellexpand(path)))?;
    let merged = merge_ledger(&db.load_ledger()?, &incoming);
    db.save_ledger(&merged)?;
    println!("Merged {} categories from {path}", incoming.len());
    Ok(())
}

/// Snapshot from the argument, else the last one used. Remembers the choice.
fn snapshot_from_args(args: &[String], db: &Database) -> Result<Snapshot> {
    let path = match args.first() {
        Some(p) => shellexpand(p),
        None => db
            .snapshot_path()?
            .ok_or_else(|| anyhow::anyhow!("No snapshot given and none used before"))?,
    };
    let snapshot = Snapshot::load(Path::new(&path))?;
    db.set_snapshot_path(&path)?;
    Ok(snapshot)
}

fn cli_accounts(args: &[String], db: &mut Database) -> Result<()> {
    let snapshot = snapshot_from_args(args, db)?;

    for institution in &snapshot.institutions {
        println!("{}", institution.name);
        for (kind, accounts) in institution.accounts_by_kind() {
            println!("  {kind}");
            for acct in accounts {
                let available = acct
                    .available
                    .map(|a| format!("  (available {})", format_amount(a)))
                    .unwrap_or_default();
                println!(
                    "    {:<24} {:>14}{available}",
                    acct.name,
                    format_amount(acct.balance)
                );
            }
        }
    }

    let cards = snapshot.credit_cards();
    if !cards.is_empty() {
        println!();
        println!("Credit cards");
        for card in cards {
            let available = card
                .available
                .map(format_amount)
                .unwrap_or_else(|| "-".into());
            println!(
                "  {:<26} owed {:>12}  available {:>12}",
                card.name,
                format_amount(card.balance),
                available
            );
        }
    }

    println!("{}", "─".repeat(44));
    println!("  Assets:      {}", format_amount(snapshot.total_assets()));
    println!("  Liabilities: {}", format_amount(snapshot.total_liabilities()));
    println!("  Net Worth:   {}", format_amount(snapshot.net_worth()));
    Ok(())
}

fn cli_sync(args: &[String], db: &mut Database) -> Result<()> {
    let snapshot = snapshot_from_args(args, db)?;
    let report = actions::sync_snapshot(db, &snapshot)?;
    print_report(&report);
    Ok(())
}

fn cli_mode(args: &[String], db: &mut Database) -> Result<()> {
    match args.first() {
        None => println!("Ledger mode: {}", db.ledger_mode()?),
        Some(raw) => {
            let mode = LedgerMode::parse(raw)
                .ok_or_else(|| anyhow::anyhow!("Unknown mode '{raw}', use legacy or strict"))?;
            db.set_ledger_mode(mode)?;
            println!("Ledger mode set to {mode}");
        }
    }
    Ok(())
}
