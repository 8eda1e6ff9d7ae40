use anyhow::Result;
use rust_decimal::Decimal;
use std::path::Path;

use crate::db::Database;
use crate::feed::Snapshot;
use crate::ledger::BudgetLedger;
use crate::models::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Planner,
    Expenses,
    Accounts,
    Rules,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Planner, Self::Expenses, Self::Accounts, Self::Rules]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planner => write!(f, "Planner"),
            Self::Expenses => write!(f, "Expenses"),
            Self::Accounts => write!(f, "Accounts"),
            Self::Rules => write!(f, "Rules"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    /// Positional revision: `amounts[i]` becomes the budget of the i-th category.
    ReviseAll { amounts: Vec<Decimal> },
    DeleteRule { id: i64, pattern: String },
}

/// One line of the Accounts screen.
#[derive(Debug, Clone)]
pub(crate) enum AccountRow<'a> {
    Institution(&'a Institution),
    Kind(AccountKind),
    Account(&'a LinkedAccount),
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) edit_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    /// "YYYY-MM" filter for the expense log. `None` shows all time.
    pub(crate) current_month: Option<String>,

    // Planner
    pub(crate) ledger: BudgetLedger,
    pub(crate) category_index: usize,
    pub(crate) category_scroll: usize,

    // Expenses
    pub(crate) expenses: Vec<Expense>,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,
    pub(crate) expense_count: i64,
    pub(crate) expense_filter_category: Option<String>,

    // Accounts
    pub(crate) snapshot: Option<Snapshot>,
    pub(crate) snapshot_path: Option<String>,
    pub(crate) account_index: usize,
    pub(crate) account_scroll: usize,

    // Rules
    pub(crate) import_rules: Vec<ImportRule>,
    pub(crate) rule_index: usize,
    pub(crate) rule_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Planner,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            edit_input: String::new(),
            status_message: String::new(),
            show_help: false,
            current_month: None,

            ledger: BudgetLedger::default(),
            category_index: 0,
            category_scroll: 0,

            expenses: Vec::new(),
            expense_index: 0,
            expense_scroll: 0,
            expense_count: 0,
            expense_filter_category: None,

            snapshot: None,
            snapshot_path: None,
            account_index: 0,
            account_scroll: 0,

            import_rules: Vec::new(),
            rule_index: 0,
            rule_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_ledger(&mut self, db: &Database) -> Result<()> {
        self.ledger = db.load_ledger()?;
        clamp_index(&mut self.category_index, self.ledger.len());
        Ok(())
    }

    pub(crate) fn refresh_expenses(&mut self, db: &Database) -> Result<()> {
        let search = if self.search_input.is_empty() {
            None
        } else {
            Some(self.search_input.as_str())
        };
        self.expenses = db.get_expenses(
            Some(500),
            self.expense_filter_category.as_deref(),
            search,
            self.current_month.as_deref(),
        )?;
        self.expense_count = db.get_expense_count()?;
        clamp_index(&mut self.expense_index, self.expenses.len());
        Ok(())
    }

    pub(crate) fn refresh_rules(&mut self, db: &Database) -> Result<()> {
        self.import_rules = db.get_import_rules()?;
        clamp_index(&mut self.rule_index, self.import_rules.len());
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_ledger(db)?;
        self.refresh_expenses(db)?;
        self.refresh_rules(db)?;
        Ok(())
    }

    /// Load the last snapshot the user pointed at, if any. A snapshot that
    /// no longer loads is reported on the status bar rather than failing startup.
    pub(crate) fn restore_snapshot(&mut self, db: &Database) -> Result<()> {
        if let Some(path) = db.snapshot_path()? {
            if let Err(e) = self.load_snapshot(&path) {
                tracing::warn!(path = %path, error = %e, "could not reload snapshot");
                self.set_status(format!("Could not reload snapshot {path}: {e}"));
            }
        }
        Ok(())
    }

    pub(crate) fn load_snapshot(&mut self, path: &str) -> Result<()> {
        let snapshot = Snapshot::load(Path::new(path))?;
        self.snapshot = Some(snapshot);
        self.snapshot_path = Some(path.to_string());
        self.account_index = 0;
        self.account_scroll = 0;
        Ok(())
    }

    pub(crate) fn selected_category(&self) -> Option<&BudgetCategory> {
        self.ledger.categories().get(self.category_index)
    }

    pub(crate) fn account_rows(&self) -> Vec<AccountRow<'_>> {
        let mut rows = Vec::new();
        if let Some(snapshot) = &self.snapshot {
            for institution in &snapshot.institutions {
                rows.push(AccountRow::Institution(institution));
                for (kind, accounts) in institution.accounts_by_kind() {
                    rows.push(AccountRow::Kind(kind));
                    rows.extend(accounts.into_iter().map(AccountRow::Account));
                }
            }
        }
        rows
    }

    /// Rows that fit on the planner once the summary banner is drawn.
    pub(crate) fn planner_page(&self) -> usize {
        self.visible_rows.saturating_sub(5).max(1)
    }

    /// Table rows left after borders and the header row.
    pub(crate) fn expense_page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn account_page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn rule_page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

fn clamp_index(index: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
}
