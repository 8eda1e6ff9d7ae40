/// Maps transaction descriptions to a ledger category by substring or regex.
#[derive(Debug, Clone)]
pub(crate) struct ImportRule {
    pub(crate) id: Option<i64>,
    pub(crate) pattern: String,
    pub(crate) category: String,
    pub(crate) is_regex: bool,
    pub(crate) priority: i32,
}

impl ImportRule {
    pub(crate) fn new_contains(pattern: String, category: String) -> Self {
        Self {
            id: None,
            pattern,
            category,
            is_regex: false,
            priority: 0,
        }
    }

    pub(crate) fn new_regex(pattern: String, category: String) -> Self {
        Self {
            id: None,
            pattern,
            category,
            is_regex: true,
            priority: 0,
        }
    }
}
