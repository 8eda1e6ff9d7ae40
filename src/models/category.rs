use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::progress::{calculate_progress, Progress};

/// A named budget bucket: the planned ceiling and what has been spent against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BudgetCategory {
    pub(crate) name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) budget: Decimal,
}

impl BudgetCategory {
    pub(crate) fn new(name: impl Into<String>, spent: Decimal, budget: Decimal) -> Self {
        Self {
            name: name.into(),
            spent,
            budget,
        }
    }

    /// Budget left in this category. Negative when overspent.
    pub(crate) fn remaining(&self) -> Decimal {
        self.budget - self.spent
    }

    pub(crate) fn progress(&self) -> Progress {
        calculate_progress(self.spent, self.budget)
    }

    /// Find a category by exact name in a slice.
    pub(crate) fn find_by_name<'a>(
        categories: &'a [BudgetCategory],
        name: &str,
    ) -> Option<&'a BudgetCategory> {
        categories.iter().find(|c| c.name == name)
    }

    /// Find a category by name ignoring case. Used to resolve user input.
    pub(crate) fn find_by_name_ignore_case<'a>(
        categories: &'a [BudgetCategory],
        name: &str,
    ) -> Option<&'a BudgetCategory> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }
}

impl std::fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
