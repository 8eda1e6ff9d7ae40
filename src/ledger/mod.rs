use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{calculate_progress, BudgetCategory, Progress};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum LedgerError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("Budget update has {got} entries but the ledger has {expected} categories")]
    MisalignedUpdate { expected: usize, got: usize },

    #[error("Budget update {index} names '{got}' but the ledger has '{expected}' there")]
    OutOfOrderUpdate {
        index: usize,
        expected: String,
        got: String,
    },
}

/// How the ledger reacts to lookups that miss and updates that do not line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LedgerMode {
    /// Misses are ignored and misaligned revisions are applied position by position.
    #[default]
    Legacy,
    /// Misses and misalignment are reported as errors.
    Strict,
}

impl LedgerMode {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Strict => "strict",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "legacy" | "lenient" => Some(Self::Legacy),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

impl std::fmt::Display for LedgerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A requested new ceiling for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BudgetUpdate {
    pub(crate) name: String,
    pub(crate) budget: Decimal,
}

impl BudgetUpdate {
    pub(crate) fn new(name: impl Into<String>, budget: Decimal) -> Self {
        Self {
            name: name.into(),
            budget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LedgerSummary {
    pub(crate) total_budget: Decimal,
    pub(crate) total_spent: Decimal,
    pub(crate) total_remaining: Decimal,
}

/// Ordered set of budget categories.
///
/// Mutations never touch `self`; they hand back the next ledger state.
/// Category order is insertion order and survives every operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct BudgetLedger {
    categories: Vec<BudgetCategory>,
    mode: LedgerMode,
}

impl BudgetLedger {
    pub(crate) fn new(categories: Vec<BudgetCategory>) -> Result<Self, LedgerError> {
        for (i, cat) in categories.iter().enumerate() {
            if categories[..i].iter().any(|c| c.name == cat.name) {
                return Err(LedgerError::DuplicateCategory(cat.name.clone()));
            }
        }
        Ok(Self {
            categories,
            mode: LedgerMode::default(),
        })
    }

    pub(crate) fn with_mode(mut self, mode: LedgerMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn mode(&self) -> LedgerMode {
        self.mode
    }

    pub(crate) fn categories(&self) -> &[BudgetCategory] {
        &self.categories
    }

    pub(crate) fn len(&self) -> usize {
        self.categories.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub(crate) fn category(&self, name: &str) -> Option<&BudgetCategory> {
        BudgetCategory::find_by_name(&self.categories, name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.category(name).is_some()
    }

    /// Resolve user-typed input to the stored category name.
    pub(crate) fn resolve_name(&self, input: &str) -> Option<&str> {
        BudgetCategory::find_by_name_ignore_case(&self.categories, input.trim())
            .map(|c| c.name.as_str())
    }

    // ── Queries ───────────────────────────────────────────────

    pub(crate) fn total_budget(&self) -> Decimal {
        self.categories.iter().map(|c| c.budget).sum()
    }

    pub(crate) fn total_spent(&self) -> Decimal {
        self.categories.iter().map(|c| c.spent).sum()
    }

    pub(crate) fn total_remaining(&self) -> Decimal {
        self.total_budget() - self.total_spent()
    }

    pub(crate) fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            total_budget: self.total_budget(),
            total_spent: self.total_spent(),
            total_remaining: self.total_remaining(),
        }
    }

    pub(crate) fn calculate_progress(&self, spent: Decimal, budget: Decimal) -> Progress {
        calculate_progress(spent, budget)
    }

    /// Progress of every category, in ledger order.
    pub(crate) fn progress_by_category(&self) -> Vec<(&BudgetCategory, Progress)> {
        self.categories.iter().map(|c| (c, c.progress())).collect()
    }

    // ── Mutations ─────────────────────────────────────────────

    /// Replace budgets position by position: `updates[i]` applies to the
    /// i-th category regardless of the name it carries.
    pub(crate) fn revise_budgets(&self, updates: &[BudgetUpdate]) -> Result<Self, LedgerError> {
        if self.mode == LedgerMode::Strict {
            if updates.len() != self.categories.len() {
                return Err(LedgerError::MisalignedUpdate {
                    expected: self.categories.len(),
                    got: updates.len(),
                });
            }
            for (index, (cat, update)) in self.categories.iter().zip(updates).enumerate() {
                if cat.name != update.name {
                    return Err(LedgerError::OutOfOrderUpdate {
                        index,
                        expected: cat.name.clone(),
                        got: update.name.clone(),
                    });
                }
            }
        } else if updates.len() != self.categories.len() {
            tracing::warn!(
                expected = self.categories.len(),
                got = updates.len(),
                "applying misaligned budget revision by position"
            );
        }

        let categories = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, cat)| match updates.get(i) {
                Some(update) => BudgetCategory {
                    budget: update.budget,
                    ..cat.clone()
                },
                None => cat.clone(),
            })
            .collect();
        tracing::debug!(count = updates.len(), "revised budgets by position");
        Ok(self.replaced(categories))
    }

    /// Replace budgets matched by category name.
    pub(crate) fn revise_budgets_by_name(
        &self,
        updates: &[BudgetUpdate],
    ) -> Result<Self, LedgerError> {
        let mut categories = self.categories.clone();
        for update in updates {
            match categories.iter_mut().find(|c| c.name == update.name) {
                Some(cat) => cat.budget = update.budget,
                None => self.miss(&update.name)?,
            }
        }
        tracing::debug!(count = updates.len(), "revised budgets by name");
        Ok(self.replaced(categories))
    }

    /// Add `amount` to the named category's spend.
    pub(crate) fn record_expense(&self, name: &str, amount: Decimal) -> Result<Self, LedgerError> {
        if !self.contains(name) {
            self.miss(name)?;
            return Ok(self.clone());
        }
        let categories = self
            .categories
            .iter()
            .map(|cat| {
                if cat.name == name {
                    BudgetCategory {
                        spent: cat.spent + amount,
                        ..cat.clone()
                    }
                } else {
                    cat.clone()
                }
            })
            .collect();
        Ok(self.replaced(categories))
    }

    /// Record a stream of `(category, amount)` expenses in order.
    pub(crate) fn record_expenses<'a, I>(&self, expenses: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        expenses
            .into_iter()
            .try_fold(self.clone(), |ledger, (name, amount)| {
                ledger.record_expense(name, amount)
            })
    }

    pub(crate) fn add_category(&self, category: BudgetCategory) -> Result<Self, LedgerError> {
        if self.contains(&category.name) {
            return Err(LedgerError::DuplicateCategory(category.name));
        }
        let mut categories = self.categories.clone();
        categories.push(category);
        Ok(self.replaced(categories))
    }

    fn replaced(&self, categories: Vec<BudgetCategory>) -> Self {
        Self {
            categories,
            mode: self.mode,
        }
    }

    fn miss(&self, name: &str) -> Result<(), LedgerError> {
        match self.mode {
            LedgerMode::Strict => Err(LedgerError::CategoryNotFound(name.to_string())),
            LedgerMode::Legacy => {
                tracing::warn!(category = name, "ignoring update for unknown category");
                Ok(())
            }
        }
    }
}

/// Starting categories for a fresh planner, with nothing spent yet.
pub(crate) fn starter_categories() -> Vec<BudgetCategory> {
    [
        ("Food", 300),
        ("Housing", 2100),
        ("Transportation", 500),
        ("Healthcare", 250),
        ("Debt Payment", 1600),
        ("Entertainment", 300),
        ("Personal", 250),
        ("Utilities", 350),
        ("Donation", 100),
        ("Miscellaneous", 200),
    ]
    .into_iter()
    .map(|(name, budget)| BudgetCategory::new(name, Decimal::ZERO, Decimal::from(budget)))
    .collect()
}
