pub(crate) mod accounts;
pub(crate) mod expenses;
pub(crate) mod planner;
pub(crate) mod rules;
