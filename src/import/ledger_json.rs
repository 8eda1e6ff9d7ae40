use anyhow::{Context, Result};
use std::path::Path;

use crate::ledger::BudgetLedger;
use crate::models::BudgetCategory;

/// Read a ledger from a JSON array of `{"name", "spent", "budget"}` objects.
pub(crate) fn read_ledger_file(path: &Path) -> Result<BudgetLedger> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let categories: Vec<BudgetCategory> = serde_json::from_str(&data)
        .with_context(|| format!("Invalid ledger JSON in {}", path.display()))?;
    let ledger = BudgetLedger::new(categories)?;
    tracing::info!(path = %path.display(), categories = ledger.len(), "read ledger file");
    Ok(ledger)
}

pub(crate) fn write_ledger_file(path: &Path, ledger: &BudgetLedger) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger.categories())?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), categories = ledger.len(), "wrote ledger file");
    Ok(())
}

/// Overlay `incoming` on `current`: categories present in both take the
/// incoming spend and budget, new ones are appended in file order.
/// Categories missing from `incoming` are kept as they are.
pub(crate) fn merge_ledger(current: &BudgetLedger, incoming: &BudgetLedger) -> BudgetLedger {
    let mut categories = current.categories().to_vec();
    for cat in incoming.categories() {
        match categories.iter_mut().find(|c| c.name == cat.name) {
            Some(existing) => {
                existing.spent = cat.spent;
                existing.budget = cat.budget;
            }
            None => categories.push(cat.clone()),
        }
    }
    // Names stay unique after a by-name merge.
    BudgetLedger::new(categories)
        .unwrap_or_default()
        .with_mode(current.mode())
}

#[cfg(test)]
#[path = "ledger_json_tests.rs"]
mod tests;
