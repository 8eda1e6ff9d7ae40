pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE,
    position  INTEGER NOT NULL,
    spent     TEXT NOT NULL DEFAULT '0',
    budget    TEXT NOT NULL DEFAULT '0'
);

CREATE TABLE IF NOT EXISTS expenses (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    category     TEXT NOT NULL REFERENCES categories(name),
    date         TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    amount       TEXT NOT NULL,
    import_hash  TEXT NOT NULL DEFAULT '',
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);
CREATE UNIQUE INDEX IF NOT EXISTS idx_expenses_hash_unique ON expenses(import_hash) WHERE import_hash != '';

CREATE TABLE IF NOT EXISTS import_rules (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    pattern     TEXT NOT NULL,
    category    TEXT NOT NULL REFERENCES categories(name),
    is_regex    BOOLEAN NOT NULL DEFAULT 0,
    priority    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS settings (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
