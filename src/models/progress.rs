use rust_decimal::{Decimal, RoundingStrategy};

/// Ratio at which a category leaves the `Ok` band.
pub(crate) const WARNING_THRESHOLD: Decimal = Decimal::from_parts(71, 0, 0, false, 2);
/// Ratio at which a category enters the `Critical` band.
pub(crate) const CRITICAL_THRESHOLD: Decimal = Decimal::from_parts(91, 0, 0, false, 2);

/// Classification of a category's spend against its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Band {
    Ok,
    Warning,
    Critical,
}

impl Band {
    /// Classify an uncapped spend ratio. Cut points belong to the higher band.
    pub(crate) fn classify(ratio: Decimal) -> Self {
        if ratio < WARNING_THRESHOLD {
            Self::Ok
        } else if ratio < CRITICAL_THRESHOLD {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Progress {
    /// Display fraction, capped at 1.
    pub(crate) progress: Decimal,
    pub(crate) band: Band,
    /// Uncapped `spent / budget`. `None` when the budget is zero.
    pub(crate) ratio: Option<Decimal>,
}

impl Progress {
    /// Whole-number percentage of the capped progress, for display.
    pub(crate) fn percent(&self) -> Decimal {
        whole_percent(self.progress)
    }
}

/// `fraction` as a whole percentage, with halves rounded away from zero.
pub(crate) fn whole_percent(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute display progress and band for `spent` against `budget`.
///
/// The band is decided on the uncapped ratio, so an overspent category
/// shows a full bar and is still classified by how far over it is. A zero
/// budget has no meaningful ratio; it is reported as full and critical.
pub(crate) fn calculate_progress(spent: Decimal, budget: Decimal) -> Progress {
    match spent.checked_div(budget) {
        Some(ratio) => Progress {
            progress: ratio.min(Decimal::ONE),
            band: Band::classify(ratio),
            ratio: Some(ratio),
        },
        None => Progress {
            progress: Decimal::ONE,
            band: Band::Critical,
            ratio: None,
        },
    }
}
