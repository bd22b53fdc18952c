//! SQL schema for the BMI SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Records are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS bmi_records (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       TEXT    NOT NULL DEFAULT 'anonymous',
    height        REAL    NOT NULL CHECK (height > 0),   -- centimetres
    weight        REAL    NOT NULL CHECK (weight > 0),   -- kilograms
    age           INTEGER NOT NULL CHECK (age > 0),      -- years
    bmi_value     REAL    NOT NULL,                      -- 2 decimal places
    bmi_category  TEXT    NOT NULL,                      -- BmiCategory label
    notes         TEXT,
    created_at    TEXT    NOT NULL,                      -- RFC 3339 UTC, fixed width
    updated_at    TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS bmi_records_user_created_idx
    ON bmi_records(user_id, created_at DESC, id DESC);

PRAGMA user_version = 1;
";

/// Columns selected by every read, in the order [`crate::encode::RawRecord`]
/// expects them.
pub const RECORD_COLUMNS: &str = "id, user_id, height, weight, age, bmi_value, \
                                  bmi_category, notes, created_at, updated_at";
