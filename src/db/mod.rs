mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::ledger::{starter_categories, BudgetLedger, LedgerMode};
use crate::models::*;

const MODE_KEY: &str = "ledger_mode";
const SNAPSHOT_KEY: &str = "snapshot_path";

pub(crate) struct Database {
    conn: Connection,
}

/// Outcome of committing a batch of expenses.
#[derive(Debug)]
pub(crate) struct ExpenseCommit {
    pub(crate) ledger: BudgetLedger,
    pub(crate) recorded: usize,
    pub(crate) duplicates: usize,
    /// Expenses whose category the ledger does not know.
    pub(crate) unmatched: Vec<Expense>,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        tracing::info!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for (position, cat) in starter_categories().iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name, position, spent, budget) VALUES (?1, ?2, ?3, ?4)",
                params![
                    cat.name,
                    position as i64,
                    cat.spent.to_string(),
                    cat.budget.to_string()
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Ledger ────────────────────────────────────────────────

    pub(crate) fn load_ledger(&self) -> Result<BudgetLedger> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, spent, budget FROM categories ORDER BY position, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(BudgetCategory::new(
                row.get::<_, String>(0)?,
                decimal_column(row, 1)?,
                decimal_column(row, 2)?,
            ))
        })?;
        let categories = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        let ledger = BudgetLedger::new(categories).context("Stored categories are invalid")?;
        Ok(ledger.with_mode(self.ledger_mode()?))
    }

    /// Write every category's position, spend and budget, inserting new ones.
    pub(crate) fn save_ledger(&mut self, ledger: &BudgetLedger) -> Result<()> {
        let tx = self.conn.transaction()?;
        write_categories(&tx, ledger)?;
        tx.commit()?;
        Ok(())
    }

    /// Apply expenses to `ledger` and persist both the expense log and the
    /// resulting category totals in one transaction.
    ///
    /// Expenses already imported (same non-empty hash) are skipped. Expenses
    /// for categories the ledger does not hold are returned in `unmatched`;
    /// in strict mode the first one aborts the whole commit.
    pub(crate) fn commit_expenses(
        &mut self,
        ledger: &BudgetLedger,
        expenses: &[Expense],
    ) -> Result<ExpenseCommit> {
        let tx = self.conn.transaction()?;
        let mut spend: Vec<(&str, Decimal)> = Vec::new();
        let mut recorded = 0;
        let mut duplicates = 0;
        let mut unmatched = Vec::new();

        for expense in expenses {
            if !expense.import_hash.is_empty() {
                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM expenses WHERE import_hash = ?1)",
                    params![expense.import_hash],
                    |row| row.get(0),
                )?;
                if exists {
                    duplicates += 1;
                    continue;
                }
            }

            // Unknown categories still reach the ledger so strict mode can reject them.
            spend.push((expense.category.as_str(), expense.amount));
            if !ledger.contains(&expense.category) {
                unmatched.push(expense.clone());
                continue;
            }

            tx.execute(
                "INSERT INTO expenses (category, date, description, amount, import_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    expense.category,
                    expense.date,
                    expense.description,
                    expense.amount.to_string(),
                    expense.import_hash,
                    expense.created_at,
                ],
            )?;
            recorded += 1;
        }

        let ledger = ledger.record_expenses(spend)?;
        write_categories(&tx, &ledger)?;
        tx.commit()?;
        tracing::info!(recorded, duplicates, unmatched = unmatched.len(), "committed expenses");

        Ok(ExpenseCommit {
            ledger,
            recorded,
            duplicates,
            unmatched,
        })
    }

    pub(crate) fn get_expenses(
        &self,
        limit: Option<u32>,
        category: Option<&str>,
        search: Option<&str>,
        month: Option<&str>,
    ) -> Result<Vec<Expense>> {
        let mut sql = String::from(
            "SELECT id, category, date, description, amount, import_hash, created_at
             FROM expenses WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(c) = category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(c.to_string()));
        }
        if let Some(s) = search {
            sql.push_str(&format!(
                " AND (description LIKE ?{0} OR category LIKE ?{0})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{s}%")));
        }
        if let Some(m) = month {
            sql.push_str(&format!(" AND date LIKE ?{}", param_values.len() + 1));
            param_values.push(Box::new(format!("{m}%")));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        if let Some(l) = limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            Ok(Expense {
                id: Some(row.get(0)?),
                category: row.get(1)?,
                date: row.get(2)?,
                description: row.get(3)?,
                amount: decimal_column(row, 4)?,
                import_hash: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expense_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?)
    }

    /// Logged spend per category for one month, largest first.
    pub(crate) fn get_spending_by_category(&self, month: &str) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, amount FROM expenses WHERE date LIKE ?1")?;
        let rows = stmt.query_map(params![format!("{month}%")], |row| {
            Ok((row.get::<_, String>(0)?, decimal_column(row, 1)?))
        })?;

        let mut totals: Vec<(String, Decimal)> = Vec::new();
        for row in rows {
            let (name, amount) = row?;
            match totals.iter_mut().find(|(n, _)| *n == name) {
                Some((_, total)) => *total += amount,
                None => totals.push((name, amount)),
            }
        }
        totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(totals)
    }

    // ── Import Rules ──────────────────────────────────────────

    pub(crate) fn get_import_rules(&self) -> Result<Vec<ImportRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, pattern, category, is_regex, priority FROM import_rules ORDER BY priority DESC, pattern",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ImportRule {
                id: Some(row.get(0)?),
                pattern: row.get(1)?,
                category: row.get(2)?,
                is_regex: row.get(3)?,
                priority: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_import_rule(&self, rule: &ImportRule) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO import_rules (pattern, category, is_regex, priority)
             VALUES (?1, ?2, ?3, ?4)",
            params![rule.pattern, rule.category, rule.is_regex, rule.priority],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn delete_import_rule(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM import_rules WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Settings ──────────────────────────────────────────────

    pub(crate) fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    pub(crate) fn ledger_mode(&self) -> Result<LedgerMode> {
        Ok(self
            .get_setting(MODE_KEY)?
            .and_then(|v| LedgerMode::parse(&v))
            .unwrap_or_default())
    }

    pub(crate) fn set_ledger_mode(&self, mode: LedgerMode) -> Result<()> {
        self.set_setting(MODE_KEY, mode.as_str())
    }

    pub(crate) fn snapshot_path(&self) -> Result<Option<String>> {
        self.get_setting(SNAPSHOT_KEY)
    }

    pub(crate) fn set_snapshot_path(&self, path: &str) -> Result<()> {
        self.set_setting(SNAPSHOT_KEY, path)
    }
}

/// Read a TEXT column holding a decimal, failing on anything unparseable.
fn decimal_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn write_categories(tx: &rusqlite::Transaction<'_>, ledger: &BudgetLedger) -> Result<()> {
    for (position, cat) in ledger.categories().iter().enumerate() {
        tx.execute(
            "INSERT INTO categories (name, position, spent, budget) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET position = ?2, spent = ?3, budget = ?4",
            params![
                cat.name,
                position as i64,
                cat.spent.to_string(),
                cat.budget.to_string()
            ],
        )?;
    }
    Ok(())
}
