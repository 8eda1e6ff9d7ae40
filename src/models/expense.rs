use rust_decimal::Decimal;

/// A single spend recorded against a ledger category.
///
/// `amount` is always the positive size of the outflow; the sign convention
/// of whatever source produced it is resolved before an `Expense` exists.
#[derive(Debug, Clone)]
pub(crate) struct Expense {
    pub(crate) id: Option<i64>,
    /// Ledger category name. Empty until categorized.
    pub(crate) category: String,
    /// Format: "YYYY-MM-DD"
    pub(crate) date: String,
    pub(crate) description: String,
    pub(crate) amount: Decimal,
    pub(crate) import_hash: String,
    pub(crate) created_at: String,
}

impl Expense {
    pub(crate) fn new(category: String, date: String, description: String, amount: Decimal) -> Self {
        Self {
            id: None,
            category,
            date,
            description,
            amount,
            import_hash: String::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// An expense entered by hand, dated today.
    pub(crate) fn manual(category: String, description: String, amount: Decimal) -> Self {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        Self::new(category, today, description, amount)
    }

    pub(crate) fn with_hash(mut self, hash: String) -> Self {
        self.import_hash = hash;
        self
    }

    pub(crate) fn is_categorized(&self) -> bool {
        !self.category.is_empty()
    }
}
