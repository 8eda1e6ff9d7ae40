mod account;
mod category;
mod expense;
mod import_rule;
mod progress;

pub(crate) use account::{AccountKind, Institution, LinkedAccount};
pub(crate) use category::BudgetCategory;
pub(crate) use expense::Expense;
pub(crate) use import_rule::ImportRule;
pub(crate) use progress::{calculate_progress, whole_percent, Band, Progress};
