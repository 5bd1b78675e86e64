use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Reads a `YYYY-MM-DD` column. A corrupt date fails the row instead of
/// silently moving a booking to another day; list queries then skip it.
fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
        tracing::error!("Invalid date in database: '{}' - {}", raw, e);
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl FromSql for Day {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse().map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

impl ToSql for Day {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for SlotStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        SlotStatus::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("invalid slot status: {s}").into()))
    }
}

impl ToSql for SlotStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for OverrideKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        OverrideKind::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("invalid override kind: {s}").into()))
    }
}

impl ToSql for OverrideKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

const USER_COLUMNS: &str = "id, name, faculty_id, password_hash, is_admin, created_at";
const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at";
const SLOT_COLUMNS: &str = "id, lab_id, day, period, status, class_info";
const BOOKING_COLUMNS: &str = "id, slot_id, date, faculty_id, class_info, created_at";
const DEFAULT_COLUMNS: &str = "id, lab_id, day, text";
const OVERRIDE_COLUMNS: &str = "id, lab_id, day, target_date, kind, source_day, created_by";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        faculty_id: row.get(2)?,
        password_hash: row.get(3)?,
        is_admin: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        user_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
    })
}

fn lab_from_row(row: &Row<'_>) -> rusqlite::Result<Lab> {
    Ok(Lab {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
    })
}

fn slot_from_row(row: &Row<'_>) -> rusqlite::Result<TemplateSlot> {
    Ok(TemplateSlot {
        id: row.get(0)?,
        lab_id: row.get(1)?,
        day: row.get(2)?,
        period: row.get(3)?,
        status: row.get(4)?,
        class_info: row.get(5)?,
    })
}

fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        slot_id: row.get(1)?,
        date: date_column(row, 2)?,
        faculty_id: row.get(3)?,
        class_info: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn default_from_row(row: &Row<'_>) -> rusqlite::Result<WeekendDefault> {
    Ok(WeekendDefault {
        id: row.get(0)?,
        lab_id: row.get(1)?,
        day: row.get(2)?,
        text: row.get(3)?,
    })
}

fn override_from_row(row: &Row<'_>) -> rusqlite::Result<WeekendOverride> {
    Ok(WeekendOverride {
        id: row.get(0)?,
        lab_id: row.get(1)?,
        day: row.get(2)?,
        target_date: date_column(row, 3)?,
        kind: row.get(4)?,
        source_day: row.get(5)?,
        created_by: row.get(6)?,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(
        &self,
        name: &str,
        faculty_id: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User> {
        let created_at = Utc::now();
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (name, faculty_id, password_hash, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                name,
                faculty_id,
                password_hash,
                is_admin,
                format_datetime(&created_at)
            ],
        );

        match result {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                faculty_id: faculty_id.to_string(),
                password_hash: password_hash.to_string(),
                is_admin,
                created_at,
            }),
            Err(e) if is_unique_violation(&e) => Err(Error::AlreadyExists(format!(
                "faculty id '{faculty_id}'"
            ))),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_faculty_id(&self, faculty_id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE faculty_id = ?1"),
            params![faculty_id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let rows = stmt.query_map([], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET name = ?1, password_hash = ?2, is_admin = ?3 WHERE id = ?4",
            params![user.name, user.password_hash, user.is_admin, user.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("user"));
        }
        Ok(())
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn count_admins(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
            params![lookup],
            token_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Lab operations

    fn create_lab(&self, name: &str) -> Result<Lab> {
        let created_at = Utc::now();
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO labs (name, created_at) VALUES (?1, ?2)",
            params![name, format_datetime(&created_at)],
        )?;
        let lab_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO template_slots (lab_id, day, period, status) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for day in Day::ALL {
                for period in 1..=PERIODS_PER_DAY {
                    stmt.execute(params![lab_id, day, period, SlotStatus::Free])?;
                }
            }
        }

        tx.commit()?;

        Ok(Lab {
            id: lab_id,
            name: name.to_string(),
            created_at,
        })
    }

    fn get_lab(&self, id: i64) -> Result<Option<Lab>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at FROM labs WHERE id = ?1",
            params![id],
            lab_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_labs(&self) -> Result<Vec<Lab>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM labs ORDER BY id")?;
        let rows = stmt.query_map([], lab_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn rename_lab(&self, id: i64, name: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE labs SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound("lab"));
        }
        Ok(())
    }

    fn delete_lab(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM labs WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn count_labs(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM labs", [], |row| row.get(0))?;
        Ok(count)
    }

    // Template slot operations

    fn get_slot(&self, id: i64) -> Result<Option<TemplateSlot>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {SLOT_COLUMNS} FROM template_slots WHERE id = ?1"),
            params![id],
            slot_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_slot_at(&self, lab_id: i64, day: Day, period: u8) -> Result<Option<TemplateSlot>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {SLOT_COLUMNS} FROM template_slots
                 WHERE lab_id = ?1 AND day = ?2 AND period = ?3"
            ),
            params![lab_id, day, period],
            slot_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_lab_slots(&self, lab_id: i64) -> Result<Vec<TemplateSlot>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SLOT_COLUMNS} FROM template_slots WHERE lab_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![lab_id], slot_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn set_slot_status(
        &self,
        slot_id: i64,
        status: SlotStatus,
        class_info: Option<&str>,
        evict_from: Option<NaiveDate>,
    ) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE template_slots SET status = ?1, class_info = ?2 WHERE id = ?3",
            params![status, class_info, slot_id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound("slot"));
        }

        let evicted = match evict_from {
            Some(from) => tx.execute(
                "DELETE FROM bookings WHERE slot_id = ?1 AND date >= ?2",
                params![slot_id, format_date(from)],
            )?,
            None => 0,
        };

        tx.commit()?;
        Ok(evicted)
    }

    // Booking operations

    fn create_booking(
        &self,
        slot_id: i64,
        date: NaiveDate,
        faculty_id: i64,
        class_info: Option<&str>,
    ) -> Result<Booking> {
        let created_at = Utc::now();
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO bookings (slot_id, date, faculty_id, class_info, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                slot_id,
                format_date(date),
                faculty_id,
                class_info,
                format_datetime(&created_at)
            ],
        );

        match result {
            Ok(_) => Ok(Booking {
                id: conn.last_insert_rowid(),
                slot_id,
                date,
                faculty_id,
                class_info: class_info.map(str::to_string),
                created_at,
            }),
            Err(e) if is_unique_violation(&e) => Err(Error::AlreadyBooked),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_booking(&self, slot_id: i64, date: NaiveDate) -> Result<Option<Booking>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE slot_id = ?1 AND date = ?2"),
            params![slot_id, format_date(date)],
            booking_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_lab_bookings(
        &self,
        lab_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Booking>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT b.id, b.slot_id, b.date, b.faculty_id, b.class_info, b.created_at
             FROM bookings b
             JOIN template_slots s ON s.id = b.slot_id
             WHERE s.lab_id = ?1 AND b.date >= ?2 AND b.date <= ?3
             ORDER BY b.date, b.slot_id",
        )?;
        let rows = stmt.query_map(
            params![lab_id, format_date(from), format_date(to)],
            booking_from_row,
        )?;

        let mut bookings = Vec::new();
        for row in rows {
            match row {
                Ok(booking) => bookings.push(booking),
                // Logged by date_column.
                Err(rusqlite::Error::FromSqlConversionFailure(..)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(bookings)
    }

    fn delete_booking(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn delete_bookings_before(&self, date: NaiveDate) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM bookings WHERE date < ?1",
            params![format_date(date)],
        )?;
        Ok(rows)
    }

    fn count_bookings(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))?;
        Ok(count)
    }

    // Weekend default operations

    fn get_weekend_default(&self, scope: DefaultScope, day: Day) -> Result<Option<WeekendDefault>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {DEFAULT_COLUMNS} FROM weekend_defaults WHERE lab_id IS ?1 AND day = ?2"),
            params![scope.lab_id(), day],
            default_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn upsert_weekend_default(
        &self,
        scope: DefaultScope,
        day: Day,
        text: Option<&str>,
    ) -> Result<WeekendDefault> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // `IS` so that the global row (NULL lab) matches itself.
        let updated = tx.execute(
            "UPDATE weekend_defaults SET text = ?1 WHERE lab_id IS ?2 AND day = ?3",
            params![text, scope.lab_id(), day],
        )?;
        if updated == 0 {
            tx.execute(
                "INSERT INTO weekend_defaults (lab_id, day, text) VALUES (?1, ?2, ?3)",
                params![scope.lab_id(), day, text],
            )?;
        }

        let row = tx.query_row(
            &format!("SELECT {DEFAULT_COLUMNS} FROM weekend_defaults WHERE lab_id IS ?1 AND day = ?2"),
            params![scope.lab_id(), day],
            default_from_row,
        )?;

        tx.commit()?;
        Ok(row)
    }

    // Weekend override operations

    fn get_weekend_override(
        &self,
        lab_id: i64,
        day: Day,
        target_date: NaiveDate,
    ) -> Result<Option<WeekendOverride>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {OVERRIDE_COLUMNS} FROM weekend_overrides
                 WHERE lab_id = ?1 AND day = ?2 AND target_date = ?3"
            ),
            params![lab_id, day, format_date(target_date)],
            override_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn upsert_weekend_override(
        &self,
        lab_id: i64,
        day: Day,
        target_date: NaiveDate,
        source_day: Day,
        created_by: Option<i64>,
    ) -> Result<WeekendOverride> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO weekend_overrides (lab_id, day, target_date, kind, source_day, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(lab_id, day, target_date) DO UPDATE SET
                kind = excluded.kind,
                source_day = excluded.source_day,
                created_by = excluded.created_by",
            params![
                lab_id,
                day,
                format_date(target_date),
                OverrideKind::Follow,
                source_day,
                created_by
            ],
        )?;

        conn.query_row(
            &format!(
                "SELECT {OVERRIDE_COLUMNS} FROM weekend_overrides
                 WHERE lab_id = ?1 AND day = ?2 AND target_date = ?3"
            ),
            params![lab_id, day, format_date(target_date)],
            override_from_row,
        )
        .map_err(Error::from)
    }

    fn delete_weekend_override(
        &self,
        lab_id: i64,
        day: Day,
        target_date: NaiveDate,
    ) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM weekend_overrides WHERE lab_id = ?1 AND day = ?2 AND target_date = ?3",
            params![lab_id, day, format_date(target_date)],
        )?;
        Ok(rows > 0)
    }

    fn delete_overrides_before(&self, date: NaiveDate) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM weekend_overrides WHERE target_date < ?1",
            params![format_date(date)],
        )?;
        Ok(rows)
    }
}
