use anyhow::Result;
use std::path::Path;

use crate::categorize::{suggest_rule, Categorizer};
use crate::db::Database;
use crate::feed::Snapshot;
use crate::import::{CsvImporter, CsvProfile};
use crate::models::Expense;

/// What happened when a batch of expenses was brought in from outside.
#[derive(Debug, Default)]
pub(crate) struct ImportReport {
    pub(crate) parsed: usize,
    pub(crate) recorded: usize,
    pub(crate) duplicates: usize,
    /// Expenses no ledger category could be found for. Not recorded.
    pub(crate) unmatched: Vec<Expense>,
    pub(crate) bad_patterns: Vec<String>,
}

impl ImportReport {
    /// One suggested rule pattern per distinct unmatched description.
    pub(crate) fn suggestions(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = Vec::new();
        for expense in &self.unmatched {
            if !out.iter().any(|(desc, _)| *desc == expense.description) {
                out.push((expense.description.clone(), suggest_rule(&expense.description)));
            }
        }
        out
    }
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Recorded {} of {} expenses ({} duplicates, {} unmatched)",
            self.recorded,
            self.parsed,
            self.duplicates,
            self.unmatched.len()
        )
    }
}

fn load_categorizer(db: &Database) -> Result<(Categorizer, Vec<String>)> {
    let rules = db.get_import_rules()?;
    Ok(Categorizer::new(&rules))
}

/// Parse a bank CSV, categorize it with the stored rules and record it.
pub(crate) fn import_csv(db: &mut Database, path: &Path) -> Result<ImportReport> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let (headers, rows) = CsvImporter::preview(path)?;
    let profile = CsvProfile::from_headers(&headers);
    let mut expenses = CsvImporter::parse(&rows, &profile)?;

    let (categorizer, bad_patterns) = load_categorizer(db)?;
    categorizer.categorize_batch(&mut expenses);

    let ledger = db.load_ledger()?;
    // Names from the file or rules are matched to ledger names ignoring case
    for expense in &mut expenses {
        if let Some(name) = ledger.resolve_name(&expense.category) {
            expense.category = name.to_string();
        }
    }
    let (matched, mut unmatched): (Vec<Expense>, Vec<Expense>) =
        expenses.into_iter().partition(|e| ledger.contains(&e.category));

    let parsed = matched.len() + unmatched.len();
    let commit = db.commit_expenses(&ledger, &matched)?;
    unmatched.extend(commit.unmatched);

    tracing::info!(
        path = %path.display(),
        parsed,
        recorded = commit.recorded,
        duplicates = commit.duplicates,
        unmatched = unmatched.len(),
        "imported csv"
    );
    Ok(ImportReport {
        parsed,
        recorded: commit.recorded,
        duplicates: commit.duplicates,
        unmatched,
        bad_patterns,
    })
}

/// Record every outflow in the snapshot the ledger has a category for.
pub(crate) fn sync_snapshot(db: &mut Database, snapshot: &Snapshot) -> Result<ImportReport> {
    let (categorizer, bad_patterns) = load_categorizer(db)?;
    let ledger = db.load_ledger()?;
    let feed = snapshot.expenses(&categorizer, &ledger);

    let parsed = feed.matched.len() + feed.unmatched.len();
    let commit = db.commit_expenses(&ledger, &feed.matched)?;
    let mut unmatched = feed.unmatched;
    unmatched.extend(commit.unmatched);

    tracing::info!(
        parsed,
        recorded = commit.recorded,
        duplicates = commit.duplicates,
        unmatched = unmatched.len(),
        "synced snapshot"
    );
    Ok(ImportReport {
        parsed,
        recorded: commit.recorded,
        duplicates: commit.duplicates,
        unmatched,
        bad_patterns,
    })
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
