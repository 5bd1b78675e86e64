mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Every lookup is an exact match on an entity's natural key. Mutations that
/// touch more than one row run in a single transaction.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(
        &self,
        name: &str,
        faculty_id: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_faculty_id(&self, faculty_id: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn count_admins(&self) -> Result<i64>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Lab operations
    /// Creates the lab together with its full Free weekly template.
    fn create_lab(&self, name: &str) -> Result<Lab>;
    fn get_lab(&self, id: i64) -> Result<Option<Lab>>;
    fn list_labs(&self) -> Result<Vec<Lab>>;
    fn rename_lab(&self, id: i64, name: &str) -> Result<()>;
    fn delete_lab(&self, id: i64) -> Result<bool>;
    fn count_labs(&self) -> Result<i64>;

    // Template slot operations
    fn get_slot(&self, id: i64) -> Result<Option<TemplateSlot>>;
    fn get_slot_at(&self, lab_id: i64, day: Day, period: u8) -> Result<Option<TemplateSlot>>;
    fn list_lab_slots(&self, lab_id: i64) -> Result<Vec<TemplateSlot>>;
    /// Sets a slot's stored status. With `evict_from`, bookings of the slot on
    /// or after that date are deleted in the same transaction. Returns the
    /// number of evicted bookings.
    fn set_slot_status(
        &self,
        slot_id: i64,
        status: SlotStatus,
        class_info: Option<&str>,
        evict_from: Option<NaiveDate>,
    ) -> Result<usize>;

    // Booking operations
    fn create_booking(
        &self,
        slot_id: i64,
        date: NaiveDate,
        faculty_id: i64,
        class_info: Option<&str>,
    ) -> Result<Booking>;
    fn get_booking(&self, slot_id: i64, date: NaiveDate) -> Result<Option<Booking>>;
    /// Bookings of a lab's slots dated within `[from, to]`. Rows with a
    /// corrupt date are skipped.
    fn list_lab_bookings(&self, lab_id: i64, from: NaiveDate, to: NaiveDate)
    -> Result<Vec<Booking>>;
    fn delete_booking(&self, id: i64) -> Result<bool>;
    fn delete_bookings_before(&self, date: NaiveDate) -> Result<usize>;
    fn count_bookings(&self) -> Result<i64>;

    // Weekend default operations
    fn get_weekend_default(&self, scope: DefaultScope, day: Day) -> Result<Option<WeekendDefault>>;
    fn upsert_weekend_default(
        &self,
        scope: DefaultScope,
        day: Day,
        text: Option<&str>,
    ) -> Result<WeekendDefault>;

    // Weekend override operations
    fn get_weekend_override(
        &self,
        lab_id: i64,
        day: Day,
        target_date: NaiveDate,
    ) -> Result<Option<WeekendOverride>>;
    fn upsert_weekend_override(
        &self,
        lab_id: i64,
        day: Day,
        target_date: NaiveDate,
        source_day: Day,
        created_by: Option<i64>,
    ) -> Result<WeekendOverride>;
    fn delete_weekend_override(&self, lab_id: i64, day: Day, target_date: NaiveDate)
    -> Result<bool>;
    fn delete_overrides_before(&self, date: NaiveDate) -> Result<usize>;
}
