//! Slot resolution: turns the weekly template, bookings and weekend rules into
//! the effective timetable, and guards every write against the same rules.

mod calendar;
mod guard;
mod resolver;
mod weekend;

pub use calendar::WeekDates;
pub use guard::OverrideUpdate;
pub use resolver::SlotView;
pub use weekend::{GlobalWeekendDefaults, WeekendDayConfig, WeekendResolution, WeekendRule};

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;

use crate::error::Result;
use crate::store::Store;

/// Counts of rows removed by an expiry sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExpirySweep {
    pub bookings: usize,
    pub overrides: usize,
}

#[derive(Clone)]
pub struct TimetableService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl TimetableService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Today's date in server local time. Callers read it once per operation
    /// and pass it down so that a single request never straddles midnight.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.local().date_naive()
    }

    #[must_use]
    pub fn week(&self) -> WeekDates {
        WeekDates::starting(self.today())
    }

    /// Deletes bookings dated before today and weekend overrides whose
    /// target date has passed.
    pub fn purge_expired(&self) -> Result<ExpirySweep> {
        self.purge_expired_at(self.today())
    }

    fn purge_expired_at(&self, today: NaiveDate) -> Result<ExpirySweep> {
        let sweep = ExpirySweep {
            bookings: self.store.delete_bookings_before(today)?,
            overrides: self.store.delete_overrides_before(today)?,
        };
        if sweep != ExpirySweep::default() {
            tracing::info!(
                "Expired {} past bookings and {} stale weekend overrides",
                sweep.bookings,
                sweep.overrides
            );
        }
        Ok(sweep)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
    use mockable::Clock;
    use tempfile::TempDir;

    use super::TimetableService;
    use crate::store::{SqliteStore, Store};

    /// Clock pinned to noon of a settable local date.
    pub struct FixedClock {
        today: Mutex<NaiveDate>,
    }

    impl FixedClock {
        pub fn new(today: NaiveDate) -> Self {
            Self {
                today: Mutex::new(today),
            }
        }

        pub fn set_today(&self, today: NaiveDate) {
            *self.today.lock().unwrap() = today;
        }
    }

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            let noon = self.today.lock().unwrap().and_hms_opt(12, 0, 0).unwrap();
            Local.from_local_datetime(&noon).earliest().unwrap()
        }

        fn utc(&self) -> DateTime<Utc> {
            self.local().with_timezone(&Utc)
        }
    }

    pub struct Fixture {
        pub _temp: TempDir,
        pub store: Arc<SqliteStore>,
        pub clock: Arc<FixedClock>,
        pub service: TimetableService,
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn fixture(today: NaiveDate) -> Fixture {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::new(temp.path().join("test.db")).unwrap());
        store.initialize().unwrap();
        let clock = Arc::new(FixedClock::new(today));
        let service = TimetableService::new(store.clone(), clock.clone());
        Fixture {
            _temp: temp,
            store,
            clock,
            service,
        }
    }
}
