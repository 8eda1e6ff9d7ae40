use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use crate::categorize::Categorizer;
use crate::ledger::BudgetLedger;
use crate::models::{AccountKind, Expense, Institution, LinkedAccount};

const UNKNOWN_INSTITUTION: &str = "Unknown Institution";

// ── Wire format ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    institution: Option<RawInstitution>,
    #[serde(default)]
    accounts: Vec<RawAccount>,
    #[serde(default)]
    transactions: Vec<RawTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawInstitution {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    balances: Vec<RawBalance>,
}

#[derive(Debug, Deserialize)]
struct RawBalance {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    current: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    available: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    id: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    merchant_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    #[serde(default)]
    category: Vec<String>,
}

// ── Parsed snapshot ──────────────────────────────────────────

/// A transaction as reported by the aggregator. Positive amounts are money out.
#[derive(Debug, Clone)]
pub(crate) struct FeedTransaction {
    pub(crate) id: String,
    pub(crate) date: String,
    pub(crate) description: String,
    pub(crate) amount: Decimal,
    pub(crate) categories: Vec<String>,
}

impl FeedTransaction {
    pub(crate) fn is_expense(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub(crate) fn import_hash(&self) -> String {
        format!("txn:{}", self.id)
    }
}

/// Linked institutions and recent transactions from one aggregator export.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub(crate) institutions: Vec<Institution>,
    pub(crate) transactions: Vec<FeedTransaction>,
}

/// Expenses derived from a snapshot, split by whether a ledger category was found.
#[derive(Debug, Default)]
pub(crate) struct FeedExpenses {
    pub(crate) matched: Vec<Expense>,
    pub(crate) unmatched: Vec<Expense>,
}

impl Snapshot {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = Self::parse(&data)
            .with_context(|| format!("Invalid snapshot {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            institutions = snapshot.institutions.len(),
            transactions = snapshot.transactions.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    pub(crate) fn parse(json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        let mut snapshot = Self::default();

        for item in raw.items {
            let (id, name) = match item.institution {
                Some(inst) => (
                    inst.id.unwrap_or_default(),
                    inst.name
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_INSTITUTION.to_string()),
                ),
                None => (String::new(), UNKNOWN_INSTITUTION.to_string()),
            };

            let accounts = item
                .accounts
                .into_iter()
                .map(|acc| {
                    // Only the first balance entry is meaningful
                    let (balance, available) = acc
                        .balances
                        .into_iter()
                        .next()
                        .map(|b| (b.current.unwrap_or_default(), b.available))
                        .unwrap_or_default();
                    LinkedAccount {
                        id: acc.id,
                        name: acc.name,
                        kind: AccountKind::parse(&acc.kind),
                        subtype: acc.subtype.unwrap_or_default(),
                        balance,
                        available,
                    }
                })
                .collect();

            snapshot.institutions.push(Institution { id, name, accounts });

            snapshot
                .transactions
                .extend(item.transactions.into_iter().map(|t| FeedTransaction {
                    description: t
                        .merchant_name
                        .filter(|m| !m.trim().is_empty())
                        .or(t.name)
                        .unwrap_or_default(),
                    id: t.id,
                    date: t.date,
                    amount: t.amount,
                    categories: t.category,
                }));
        }

        Ok(snapshot)
    }

    pub(crate) fn total_assets(&self) -> Decimal {
        self.institutions.iter().map(|i| i.assets()).sum()
    }

    pub(crate) fn total_liabilities(&self) -> Decimal {
        self.institutions.iter().map(|i| i.liabilities()).sum()
    }

    pub(crate) fn net_worth(&self) -> Decimal {
        self.total_assets() - self.total_liabilities()
    }

    pub(crate) fn credit_cards(&self) -> Vec<&LinkedAccount> {
        self.institutions
            .iter()
            .flat_map(|i| i.accounts.iter())
            .filter(|a| a.kind == AccountKind::Credit)
            .collect()
    }

    /// Turn outflows into ledger expenses. Import rules decide the category
    /// first; otherwise the first aggregator category naming a ledger
    /// category (ignoring case) is used.
    pub(crate) fn expenses(&self, categorizer: &Categorizer, ledger: &BudgetLedger) -> FeedExpenses {
        let mut out = FeedExpenses::default();
        for txn in self.transactions.iter().filter(|t| t.is_expense()) {
            let category = categorizer
                .categorize(&txn.description)
                .filter(|c| ledger.contains(c))
                .or_else(|| {
                    txn.categories
                        .iter()
                        .find_map(|c| ledger.resolve_name(c))
                })
                .unwrap_or_default()
                .to_string();

            let expense = Expense::new(
                category,
                txn.date.clone(),
                txn.description.clone(),
                txn.amount,
            )
            .with_hash(txn.import_hash());

            if expense.is_categorized() {
                out.matched.push(expense);
            } else {
                tracing::debug!(id = %txn.id, description = %txn.description, "no ledger category for transaction");
                out.unmatched.push(expense);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests;
