use regex::Regex;

use crate::models::{Expense, ImportRule};

pub(crate) struct Categorizer {
    rules: Vec<CompiledRule>,
}

struct CompiledRule {
    pattern: String,
    regex: Option<Regex>,
    category: String,
    is_regex: bool,
}

impl Categorizer {
    /// Compile rules in the order given. Returns the patterns of regex
    /// rules that failed to compile; those rules never match.
    pub(crate) fn new(rules: &[ImportRule]) -> (Self, Vec<String>) {
        let mut bad_patterns = Vec::new();
        let compiled = rules
            .iter()
            .map(|r| {
                let regex = if r.is_regex {
                    match Regex::new(&r.pattern) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            tracing::warn!(pattern = %r.pattern, error = %e, "invalid regex rule");
                            bad_patterns.push(r.pattern.clone());
                            None
                        }
                    }
                } else {
                    None
                };
                CompiledRule {
                    pattern: r.pattern.to_lowercase(),
                    regex,
                    category: r.category.clone(),
                    is_regex: r.is_regex,
                }
            })
            .collect();

        (Self { rules: compiled }, bad_patterns)
    }

    pub(crate) fn categorize(&self, description: &str) -> Option<&str> {
        let desc_lower = description.to_lowercase();

        self.rules
            .iter()
            .find(|rule| {
                if rule.is_regex {
                    rule.regex
                        .as_ref()
                        .is_some_and(|re| re.is_match(description))
                } else {
                    desc_lower.contains(&rule.pattern)
                }
            })
            .map(|rule| rule.category.as_str())
    }

    /// Fill in the category of every expense that does not have one yet.
    pub(crate) fn categorize_batch(&self, expenses: &mut [Expense]) {
        for expense in expenses.iter_mut() {
            if !expense.is_categorized() {
                if let Some(category) = self.categorize(&expense.description) {
                    expense.category = category.to_string();
                }
            }
        }
    }
}

/// Suggest a rule pattern for a description no rule matched.
pub(crate) fn suggest_rule(description: &str) -> String {
    let cleaned = description
        .to_uppercase()
        .replace(|c: char| c.is_ascii_digit(), "")
        .replace('#', "")
        .replace('*', " ")
        .trim()
        .to_string();

    // First one or two words are usually the merchant
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let pattern = match words.as_slice() {
        [first, second, ..] => format!("{first} {second}"),
        [only] => only.to_string(),
        [] => description.to_string(),
    };

    pattern.to_lowercase()
}
