//! SQL DDL for the item table.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT, so ids are never reused
/// - `type` the item tag (`lost` / `found`)
/// - `attributes` JSON object serialized as text, NULL when absent
/// - `imagePath` served path of the stored image, NULL when absent
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    description TEXT NOT NULL,
    attributes TEXT NULL, -- JSON object
    imagePath TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_type ON items(type);
"#;

/// Destructive reset. Only run on explicit request.
pub const SQLITE_RESET: &str = r#"
DROP INDEX IF EXISTS idx_items_type;
DROP TABLE IF EXISTS items;
"#;
