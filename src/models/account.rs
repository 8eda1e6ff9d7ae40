use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AccountKind {
    Depository,
    Credit,
    Loan,
    Investment,
    Other,
}

impl AccountKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Depository => "Depository",
            Self::Credit => "Credit",
            Self::Loan => "Loan",
            Self::Investment => "Investment",
            Self::Other => "Other",
        }
    }

    /// Parse the aggregator's account `type` field.
    pub(crate) fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "depository" | "checking" | "savings" | "cash" => Self::Depository,
            "credit" | "credit card" | "creditcard" => Self::Credit,
            "loan" | "mortgage" | "student" => Self::Loan,
            "investment" | "brokerage" => Self::Investment,
            _ => Self::Other,
        }
    }

    /// Balances of these kinds are owed, not owned.
    pub(crate) fn is_liability(&self) -> bool {
        matches!(self, Self::Credit | Self::Loan)
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LinkedAccount {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) kind: AccountKind,
    pub(crate) subtype: String,
    pub(crate) balance: Decimal,
    pub(crate) available: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub(crate) struct Institution {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) accounts: Vec<LinkedAccount>,
}

impl Institution {
    /// Accounts grouped by kind, kinds in first-seen order.
    pub(crate) fn accounts_by_kind(&self) -> Vec<(AccountKind, Vec<&LinkedAccount>)> {
        let mut groups: Vec<(AccountKind, Vec<&LinkedAccount>)> = Vec::new();
        for account in &self.accounts {
            match groups.iter_mut().find(|(kind, _)| *kind == account.kind) {
                Some((_, members)) => members.push(account),
                None => groups.push((account.kind, vec![account])),
            }
        }
        groups
    }

    pub(crate) fn assets(&self) -> Decimal {
        self.accounts
            .iter()
            .filter(|a| !a.kind.is_liability())
            .map(|a| a.balance)
            .sum()
    }

    pub(crate) fn liabilities(&self) -> Decimal {
        self.accounts
            .iter()
            .filter(|a| a.kind.is_liability())
            .map(|a| a.balance)
            .sum()
    }
}
