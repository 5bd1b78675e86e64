pub const SCHEMA: &str = r#"
-- Faculty accounts; admins manage labs, templates and weekend rules
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    faculty_id TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,       -- argon2id hash with embedded salt
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Login sessions; the raw token is only ever shown to the client
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,
    token_lookup TEXT NOT NULL,        -- 8 char prefix for fast lookup
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,                   -- NULL = never
    last_used_at TEXT
);

CREATE TABLE IF NOT EXISTS labs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Weekly template: one row per (lab, day, period), created with the lab
CREATE TABLE IF NOT EXISTS template_slots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lab_id INTEGER NOT NULL REFERENCES labs(id) ON DELETE CASCADE,
    day TEXT NOT NULL,                 -- Monday..Sunday
    period INTEGER NOT NULL CHECK (period BETWEEN 1 AND 8),
    status TEXT NOT NULL DEFAULT 'Free' CHECK (status IN ('Free', 'Regular')),
    class_info TEXT,

    UNIQUE(lab_id, day, period)
);

-- One-off reservations; the unique key is the only booking race guard
CREATE TABLE IF NOT EXISTS bookings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slot_id INTEGER NOT NULL REFERENCES template_slots(id) ON DELETE CASCADE,
    date TEXT NOT NULL,                -- YYYY-MM-DD
    faculty_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    class_info TEXT,
    created_at TEXT DEFAULT (datetime('now')),

    UNIQUE(slot_id, date)
);

-- Weekend fallbacks; lab_id NULL is the global row
CREATE TABLE IF NOT EXISTS weekend_defaults (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lab_id INTEGER REFERENCES labs(id) ON DELETE CASCADE,
    day TEXT NOT NULL CHECK (day IN ('Saturday', 'Sunday')),
    text TEXT
);

-- Current-week weekend overrides
CREATE TABLE IF NOT EXISTS weekend_overrides (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lab_id INTEGER NOT NULL REFERENCES labs(id) ON DELETE CASCADE,
    day TEXT NOT NULL CHECK (day IN ('Saturday', 'Sunday')),
    target_date TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'follow',
    source_day TEXT NOT NULL,
    created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,

    UNIQUE(lab_id, day, target_date)
);

-- Create indexes
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
CREATE INDEX IF NOT EXISTS idx_template_slots_lab ON template_slots(lab_id);
CREATE INDEX IF NOT EXISTS idx_bookings_date ON bookings(date);
CREATE INDEX IF NOT EXISTS idx_bookings_faculty ON bookings(faculty_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_weekend_defaults_lab ON weekend_defaults(lab_id, day)
    WHERE lab_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_weekend_defaults_global ON weekend_defaults(day)
    WHERE lab_id IS NULL;
CREATE INDEX IF NOT EXISTS idx_weekend_overrides_target ON weekend_overrides(target_date);
"#;
