use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{TimetableService, WeekDates, WeekendResolution};
use crate::error::{Error, Result};
use crate::types::{Booking, Day, EffectiveStatus, TemplateSlot};

/// Effective state of one (lab, day, period) cell for the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    /// Template slot id, used to book, release or block the cell.
    pub id: i64,
    pub lab_id: i64,
    pub day: Day,
    pub period: u8,
    pub date: NaiveDate,
    pub status: EffectiveStatus,
    pub class_info: Option<String>,
    pub faculty_id: Option<i64>,
    pub faculty_name: Option<String>,
}

impl TimetableService {
    /// Effective timetable of a lab for the seven days starting today,
    /// ordered Monday to Sunday then by period.
    ///
    /// Expired bookings and overrides are purged first.
    pub fn timetable(&self, lab_id: i64) -> Result<Vec<SlotView>> {
        self.store.get_lab(lab_id)?.ok_or(Error::NotFound("lab"))?;

        let today = self.today();
        self.purge_expired_at(today)?;
        let week = WeekDates::starting(today);

        let mut bookings: HashMap<(i64, NaiveDate), Booking> = self
            .store
            .list_lab_bookings(lab_id, week.today(), week.end())?
            .into_iter()
            .map(|b| ((b.slot_id, b.date), b))
            .collect();
        let mut names: HashMap<i64, Option<String>> = HashMap::new();
        let mut views = self
            .store
            .list_lab_slots(lab_id)?
            .iter()
            .map(|slot| self.resolve_slot(slot, &week, &mut bookings, &mut names))
            .collect::<Result<Vec<_>>>()?;

        views.sort_by_key(|v| (v.day, v.period));
        Ok(views)
    }

    /// Resolves one slot on its date in `week`. A booking always wins;
    /// weekend slots go through the weekend policy; weekday slots show their
    /// stored status.
    fn resolve_slot(
        &self,
        slot: &TemplateSlot,
        week: &WeekDates,
        bookings: &mut HashMap<(i64, NaiveDate), Booking>,
        names: &mut HashMap<i64, Option<String>>,
    ) -> Result<SlotView> {
        let date = week.date_of(slot.day);
        let mut view = SlotView {
            id: slot.id,
            lab_id: slot.lab_id,
            day: slot.day,
            period: slot.period,
            date,
            status: EffectiveStatus::Free,
            class_info: None,
            faculty_id: None,
            faculty_name: None,
        };

        if let Some(booking) = bookings.remove(&(slot.id, date)) {
            let name = match names.get(&booking.faculty_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.store.get_user(booking.faculty_id)?.map(|u| u.name);
                    names.insert(booking.faculty_id, name.clone());
                    name
                }
            };
            view.status = EffectiveStatus::Booked;
            view.class_info = booking.class_info;
            view.faculty_id = Some(booking.faculty_id);
            view.faculty_name = name;
            return Ok(view);
        }

        if slot.day.is_weekend() {
            let (resolution, _) = self.resolve_weekend(slot, date)?;
            if let WeekendResolution::Regular(text) = resolution {
                view.status = EffectiveStatus::Regular;
                view.class_info = text;
            }
            return Ok(view);
        }

        view.status = slot.status.into();
        if view.status == EffectiveStatus::Regular {
            view.class_info = slot.class_info.clone();
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::timetable::testing::{date, fixture};
    use crate::types::{DefaultScope, SlotStatus};

    fn find(views: &[SlotView], day: Day, period: u8) -> &SlotView {
        views
            .iter()
            .find(|v| v.day == day && v.period == period)
            .unwrap()
    }

    #[test]
    fn test_fresh_lab_is_all_free_and_ordered() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();

        let views = fx.service.timetable(lab.id).unwrap();
        assert_eq!(views.len(), 56);
        assert!(views.iter().all(|v| v.status == EffectiveStatus::Free));
        assert_eq!(views[0].day, Day::Monday);
        assert_eq!(views[0].period, 1);
        assert_eq!(views[0].date, date(2026, 10, 26));
        assert_eq!(views[55].day, Day::Sunday);
        assert_eq!(views[55].period, 8);
        assert_eq!(views[55].date, date(2026, 10, 25));
    }

    #[test]
    fn test_unknown_lab() {
        let fx = fixture(date(2026, 10, 21));
        assert!(matches!(fx.service.timetable(42), Err(Error::NotFound("lab"))));
    }

    #[test]
    fn test_booking_wins_over_weekend_default() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        let user = fx.store.create_user("Grace", "f7", "hash", false).unwrap();
        let sat3 = fx.store.get_slot_at(lab.id, Day::Saturday, 3).unwrap().unwrap();

        // Booked before the default went in; the booking still shows.
        fx.store
            .create_booking(sat3.id, date(2026, 10, 24), user.id, Some("Makeup class"))
            .unwrap();
        fx.store
            .upsert_weekend_default(DefaultScope::Global, Day::Saturday, Some("Seminar"))
            .unwrap();

        let views = fx.service.timetable(lab.id).unwrap();
        let cell = find(&views, Day::Saturday, 3);
        assert_eq!(cell.status, EffectiveStatus::Booked);
        assert_eq!(cell.faculty_id, Some(user.id));
        assert_eq!(cell.faculty_name.as_deref(), Some("Grace"));
        assert_eq!(cell.class_info.as_deref(), Some("Makeup class"));

        let other = find(&views, Day::Saturday, 4);
        assert_eq!(other.status, EffectiveStatus::Regular);
        assert_eq!(other.class_info.as_deref(), Some("Seminar"));
    }

    #[test]
    fn test_weekday_regular_shows_class_info() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        let tue2 = fx.store.get_slot_at(lab.id, Day::Tuesday, 2).unwrap().unwrap();
        fx.store
            .set_slot_status(tue2.id, SlotStatus::Regular, Some("Networks"), None)
            .unwrap();

        let views = fx.service.timetable(lab.id).unwrap();
        let cell = find(&views, Day::Tuesday, 2);
        assert_eq!(cell.status, EffectiveStatus::Regular);
        assert_eq!(cell.class_info.as_deref(), Some("Networks"));
        assert_eq!(cell.faculty_id, None);
    }

    #[test]
    fn test_weekday_ignores_weekend_rules() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        fx.store
            .upsert_weekend_default(DefaultScope::Lab(lab.id), Day::Saturday, Some("Seminar"))
            .unwrap();

        let views = fx.service.timetable(lab.id).unwrap();
        assert!(
            views
                .iter()
                .filter(|v| !v.day.is_weekend())
                .all(|v| v.status == EffectiveStatus::Free)
        );
    }

    #[test]
    fn test_fetch_purges_past_bookings() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        let user = fx.store.create_user("Grace", "f7", "hash", false).unwrap();
        let wed3 = fx.store.get_slot_at(lab.id, Day::Wednesday, 3).unwrap().unwrap();
        fx.store
            .create_booking(wed3.id, date(2026, 10, 14), user.id, None)
            .unwrap();
        fx.store
            .create_booking(wed3.id, date(2026, 10, 21), user.id, None)
            .unwrap();

        fx.service.timetable(lab.id).unwrap();
        assert!(fx.store.get_booking(wed3.id, date(2026, 10, 14)).unwrap().is_none());
        assert!(fx.store.get_booking(wed3.id, date(2026, 10, 21)).unwrap().is_some());
    }

    #[test]
    fn test_window_slides_with_clock() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        let user = fx.store.create_user("Grace", "f7", "hash", false).unwrap();
        let wed3 = fx.store.get_slot_at(lab.id, Day::Wednesday, 3).unwrap().unwrap();
        fx.store
            .create_booking(wed3.id, date(2026, 10, 28), user.id, None)
            .unwrap();

        let views = fx.service.timetable(lab.id).unwrap();
        assert_eq!(find(&views, Day::Wednesday, 3).status, EffectiveStatus::Free);

        fx.clock.set_today(date(2026, 10, 22));
        let views = fx.service.timetable(lab.id).unwrap();
        let cell = find(&views, Day::Wednesday, 3);
        assert_eq!(cell.date, date(2026, 10, 28));
        assert_eq!(cell.status, EffectiveStatus::Booked);
    }
}
