use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A day of the weekly timetable, exchanged as its English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Monday through Sunday, in timetable order.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub const WEEKEND: [Day; 2] = [Day::Saturday, Day::Sunday];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    /// Parses an English day name. Matching is exact, as stored.
    pub fn parse(s: &str) -> Option<Day> {
        Self::ALL.into_iter().find(|d| d.as_str() == s)
    }

    #[must_use]
    pub const fn is_weekend(self) -> bool {
        matches!(self, Day::Saturday | Day::Sunday)
    }

    /// Days since Monday (Monday = 0).
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Day::Monday => 0,
            Day::Tuesday => 1,
            Day::Wednesday => 2,
            Day::Thursday => 3,
            Day::Friday => 4,
            Day::Saturday => 5,
            Day::Sunday => 6,
        }
    }

    /// The timetable day a calendar date falls on.
    #[must_use]
    pub fn of(date: NaiveDate) -> Day {
        Day::from(date.weekday())
    }
}

impl From<Weekday> for Day {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::parse(s).ok_or_else(|| format!("invalid day: {s}"))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day() {
        assert_eq!(Day::parse("Wednesday"), Some(Day::Wednesday));
        assert_eq!(Day::parse("wednesday"), None);
        assert_eq!(Day::parse("Wed"), None);
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for day in Day::ALL {
            assert_eq!(day.to_string().parse::<Day>(), Ok(day));
        }
        assert_eq!("Funday".parse::<Day>(), Err("invalid day: Funday".to_string()));
    }

    #[test]
    fn test_weekend_days() {
        let weekend: Vec<Day> = Day::ALL.into_iter().filter(|d| d.is_weekend()).collect();
        assert_eq!(weekend, Day::WEEKEND.to_vec());
    }

    #[test]
    fn test_day_of_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        assert_eq!(Day::of(date), Day::Wednesday);
    }

    #[test]
    fn test_serializes_as_english_name() {
        let json = serde_json::to_string(&Day::Saturday).unwrap();
        assert_eq!(json, "\"Saturday\"");
    }
}
