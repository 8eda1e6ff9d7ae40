use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::models::Expense;

#[derive(Debug, Clone)]
pub(crate) struct CsvProfile {
    pub(crate) date_column: usize,
    pub(crate) description_column: usize,
    pub(crate) amount_column: Option<usize>,
    pub(crate) debit_column: Option<usize>,
    pub(crate) credit_column: Option<usize>,
    /// Column holding a category name already assigned by the bank or user.
    pub(crate) category_column: Option<usize>,
    pub(crate) date_format: String,
    /// Flip signs for exports that list charges as positive numbers.
    pub(crate) negate_amounts: bool,
}

impl Default for CsvProfile {
    fn default() -> Self {
        Self {
            date_column: 0,
            description_column: 1,
            amount_column: Some(2),
            debit_column: None,
            credit_column: None,
            category_column: None,
            date_format: "%m/%d/%Y".into(),
            negate_amounts: false,
        }
    }
}

impl CsvProfile {
    /// Build a profile from recognizable header names, falling back to the
    /// default column layout for anything not found.
    pub(crate) fn from_headers(headers: &[String]) -> Self {
        let h: Vec<String> = headers.iter().map(|s| s.trim().to_lowercase()).collect();
        let find = |names: &[&str]| h.iter().position(|col| names.contains(&col.as_str()));

        let defaults = Self::default();
        let debit_column = find(&["debit", "withdrawal", "withdrawals"]);
        let credit_column = find(&["credit", "deposit", "deposits"]);
        let amount_column = find(&["amount", "transaction amount"]);

        Self {
            date_column: find(&["date", "transaction date", "posted date", "posting date"])
                .unwrap_or(defaults.date_column),
            description_column: find(&["description", "payee", "merchant", "name", "memo"])
                .unwrap_or(defaults.description_column),
            amount_column: match (amount_column, debit_column) {
                (Some(col), _) => Some(col),
                (None, Some(_)) => None,
                (None, None) => defaults.amount_column,
            },
            debit_column,
            credit_column,
            category_column: find(&["category", "budget category"]),
            ..defaults
        }
    }
}

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Read the CSV and return headers + all rows as strings.
    pub(crate) fn preview(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .context("Failed to open CSV file")?;

        let mut all_rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            all_rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        if all_rows.is_empty() {
            anyhow::bail!("CSV file is empty");
        }

        let first_row = &all_rows[0];
        let looks_like_header = first_row.iter().all(|field| {
            let trimmed = field.trim();
            // Headers don't parse as dates or numbers
            Decimal::from_str(trimmed.replace(['$', ','], "").trim()).is_err()
                && NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").is_err()
                && NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_err()
        });

        if looks_like_header {
            let headers = all_rows.remove(0);
            Ok((headers, all_rows))
        } else {
            let headers: Vec<String> = (0..first_row.len())
                .map(|i| format!("Column {}", i + 1))
                .collect();
            Ok((headers, all_rows))
        }
    }

    /// Parse rows into expenses. Only outflows (negative amounts after the
    /// profile's sign handling) become expenses; income rows are skipped.
    pub(crate) fn parse(rows: &[Vec<String>], profile: &CsvProfile) -> Result<Vec<Expense>> {
        let mut expenses = Vec::new();
        let mut skipped_income = 0usize;
        // Earlier rows with the same content, keyed by that content
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (i, row) in rows.iter().enumerate() {
            let date_str = row
                .get(profile.date_column)
                .map(|s| s.trim().to_string())
                .unwrap_or_default();

            if date_str.is_empty() {
                continue;
            }

            let date = parse_date(&date_str, &profile.date_format)
                .with_context(|| format!("Row {}: failed to parse date '{}'", i + 1, date_str))?;

            let description = row
                .get(profile.description_column)
                .map(|s| s.trim().to_string())
                .unwrap_or_default();

            let amount = parse_amount(row, profile)
                .with_context(|| format!("Row {}: failed to parse amount", i + 1))?;

            if amount >= Decimal::ZERO {
                skipped_income += 1;
                continue;
            }

            let category = profile
                .category_column
                .and_then(|c| row.get(c))
                .map(|s| s.trim().to_string())
                .unwrap_or_default();

            let occurrence = seen
                .entry(row_key(&date_str, &description, &amount))
                .or_insert(0);
            let hash = compute_hash(&date_str, &description, &amount, *occurrence);
            *occurrence += 1;
            expenses.push(
                Expense::new(category, date.format("%Y-%m-%d").to_string(), description, amount.abs())
                    .with_hash(hash),
            );
        }

        tracing::debug!(expenses = expenses.len(), skipped_income, "parsed csv rows");
        Ok(expenses)
    }
}

fn parse_date(s: &str, fmt: &str) -> Result<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
        return Ok(d);
    }
    for fallback in &["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y", "%m/%d/%y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fallback) {
            return Ok(d);
        }
    }
    anyhow::bail!("Could not parse date: {}", s)
}

fn parse_amount(row: &[String], profile: &CsvProfile) -> Result<Decimal> {
    let amount = if let Some(amt_col) = profile.amount_column {
        let raw = row
            .get(amt_col)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        parse_decimal(&raw)?
    } else {
        let debit = profile
            .debit_column
            .and_then(|c| row.get(c))
            .map(|s| s.trim())
            .unwrap_or("");
        let credit = profile
            .credit_column
            .and_then(|c| row.get(c))
            .map(|s| s.trim())
            .unwrap_or("");

        if !debit.is_empty() {
            -parse_decimal(debit)?.abs()
        } else if !credit.is_empty() {
            parse_decimal(credit)?.abs()
        } else {
            Decimal::ZERO
        }
    };

    if profile.negate_amounts {
        Ok(-amount)
    } else {
        Ok(amount)
    }
}

pub(crate) fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s
        .replace(['$', ','], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_str(&cleaned.replace('"', "")))
        .with_context(|| format!("Failed to parse '{}' as decimal", s))
}

fn row_key(date: &str, description: &str, amount: &Decimal) -> String {
    format!("{date}|{description}|{amount}")
}

/// Stable FNV-1a hash of a row's content, used to skip re-imported rows.
/// `occurrence` counts earlier identical rows in the same file, so repeated
/// same-day purchases stay distinct wherever they sit in the export.
fn compute_hash(date: &str, description: &str, amount: &Decimal, occurrence: usize) -> String {
    let input = format!("{}#{occurrence}", row_key(date, description, amount));
    format!("csv:{:016x}", fnv1a(input.as_bytes()))
}

fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
