//! SQL DDL for the profile store.

/// SQLite schema:
/// - `users` holds the single profile row, addressed by the configured owner id
/// - `links` / `buttons` are owned by a user and ordered by a dense 0-based `order_index`
/// - timestamps are RFC3339 text
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    bio TEXT NULL,
    profile_image_url TEXT NULL,
    background_color TEXT NOT NULL DEFAULT '#000000',
    background_type TEXT NOT NULL DEFAULT 'solid',
    background_image_url TEXT NULL,
    background_overlay_opacity REAL NOT NULL DEFAULT 0.5,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    icon_url TEXT NULL,
    order_index INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_links_user_order ON links(user_id, order_index);

CREATE TABLE IF NOT EXISTS buttons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    label TEXT NOT NULL,
    url TEXT NOT NULL,
    order_index INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_buttons_user_order ON buttons(user_id, order_index);
"#;

/// Columns added after the first deployments. Databases created before them
/// still work; profile saves fall back to the base column set.
pub const EXTENDED_USER_COLUMNS: [&str; 2] = ["background_image_url", "background_overlay_opacity"];
