use chrono::{Days, NaiveDate};

use crate::types::Day;

/// The seven-day window starting today, mapping each timetable day to its
/// next occurrence on or after today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekDates {
    today: NaiveDate,
}

impl WeekDates {
    #[must_use]
    pub const fn starting(today: NaiveDate) -> Self {
        Self { today }
    }

    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Last day of the window, `today + 6`.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.today + Days::new(6)
    }

    /// Date of the next `day` on or after today.
    #[must_use]
    pub fn date_of(&self, day: Day) -> NaiveDate {
        let offset = (day.index() + 7 - Day::of(self.today).index()) % 7;
        self.today + Days::new(u64::from(offset))
    }

    /// Whether `date` lies in `[today, today + 6]`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.today && date <= self.end()
    }

    /// Every day with its date, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Day, NaiveDate)> + '_ {
        Day::ALL.into_iter().map(|day| (day, self.date_of(day)))
    }
}
