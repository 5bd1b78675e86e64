use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{TimetableService, WeekendRule};
use crate::error::{Error, Result};
use crate::types::{
    Booking, DefaultScope, Day, SlotStatus, TemplateSlot, User, WeekendDefault, WeekendOverride,
};

/// Outcome of a set-or-clear weekend override call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum OverrideUpdate {
    Set(WeekendOverride),
    /// `removed` is false when there was nothing to clear.
    Cleared { removed: bool },
}

impl TimetableService {
    /// Books a Free slot for `date` on behalf of `faculty`.
    ///
    /// The unique (slot, date) constraint in the store is what settles two
    /// concurrent requests; the earlier lookup only gives a nicer error.
    pub fn book(
        &self,
        slot_id: i64,
        date: NaiveDate,
        faculty: &User,
        class_info: Option<&str>,
    ) -> Result<Booking> {
        let today = self.today();
        if date < today {
            return Err(Error::PastDate);
        }

        let slot = self.store.get_slot(slot_id)?.ok_or(Error::NotFound("slot"))?;
        if Day::of(date) != slot.day {
            return Err(Error::BadRequest(format!(
                "{} is a {}, slot is on {}",
                date,
                Day::of(date),
                slot.day
            )));
        }

        self.ensure_bookable(&slot, date)?;

        if self.store.get_booking(slot.id, date)?.is_some() {
            return Err(Error::AlreadyBooked);
        }

        let class_info = class_info.map(str::trim).filter(|s| !s.is_empty());
        let booking = self
            .store
            .create_booking(slot.id, date, faculty.id, class_info)?;

        tracing::info!(
            "Booked lab {} {} period {} on {} for {}",
            slot.lab_id,
            slot.day,
            slot.period,
            date,
            faculty.faculty_id
        );
        Ok(booking)
    }

    fn ensure_bookable(&self, slot: &TemplateSlot, date: NaiveDate) -> Result<()> {
        if !slot.day.is_weekend() {
            if slot.status == SlotStatus::Regular {
                return Err(Error::SlotBlocked(
                    "This period is marked Regular by admin".into(),
                ));
            }
            return Ok(());
        }

        let (resolution, rule) = self.resolve_weekend(slot, date)?;
        if !resolution.is_regular() {
            return Ok(());
        }

        let reason = match rule {
            WeekendRule::Follow { source_day } => format!(
                "This {} follows {}, where this period is Regular",
                slot.day, source_day
            ),
            WeekendRule::Default { .. } => {
                format!("{} is blocked by the weekend default", slot.day)
            }
            WeekendRule::Template => "This period is marked Regular by admin".to_string(),
        };
        Err(Error::SlotBlocked(reason))
    }

    /// Deletes the booking of `slot_id` on `date`. Only an admin or the
    /// faculty who made the booking may release it.
    pub fn release(&self, slot_id: i64, date: NaiveDate, requester: &User) -> Result<Booking> {
        let booking = self
            .store
            .get_booking(slot_id, date)?
            .ok_or(Error::NotFound("booking"))?;

        if !requester.is_admin && booking.faculty_id != requester.id {
            return Err(Error::Forbidden(
                "only an admin or the booking faculty can release it".into(),
            ));
        }

        if !self.store.delete_booking(booking.id)? {
            return Err(Error::NotFound("booking"));
        }

        tracing::info!(
            "Released slot {} on {} by {}",
            slot_id,
            date,
            requester.faculty_id
        );
        Ok(booking)
    }

    /// Sets a slot's stored status. Marking a slot Regular evicts its
    /// bookings from today onwards in the same transaction; marking it Free
    /// clears the class info. Returns the updated slot and the eviction count.
    pub fn set_slot_status(
        &self,
        slot_id: i64,
        status: SlotStatus,
        class_info: Option<&str>,
    ) -> Result<(TemplateSlot, usize)> {
        let (class_info, evict_from) = match status {
            SlotStatus::Regular => (
                class_info.map(str::trim).filter(|s| !s.is_empty()),
                Some(self.today()),
            ),
            SlotStatus::Free => (None, None),
        };

        let evicted = self
            .store
            .set_slot_status(slot_id, status, class_info, evict_from)?;
        let slot = self.store.get_slot(slot_id)?.ok_or(Error::NotFound("slot"))?;

        tracing::info!(
            "Slot {} (lab {} {} period {}) set to {}, {} bookings evicted",
            slot.id,
            slot.lab_id,
            slot.day,
            slot.period,
            status,
            evicted
        );
        Ok((slot, evicted))
    }

    /// Upserts the weekend default for a lab or globally. Empty text is stored
    /// as no text, which leaves the day unblocked but still masks the global
    /// row when set on a lab.
    pub fn set_weekend_default(
        &self,
        scope: DefaultScope,
        day: Day,
        text: Option<&str>,
    ) -> Result<WeekendDefault> {
        if !day.is_weekend() {
            return Err(Error::BadRequest(format!("{day} is not a weekend day")));
        }
        if let DefaultScope::Lab(lab_id) = scope {
            self.store.get_lab(lab_id)?.ok_or(Error::NotFound("lab"))?;
        }

        let text = text.map(str::trim).filter(|s| !s.is_empty());
        let default = self.store.upsert_weekend_default(scope, day, text)?;

        match scope {
            DefaultScope::Lab(lab_id) => {
                tracing::info!("Weekend default for lab {} {} set to {:?}", lab_id, day, text)
            }
            DefaultScope::Global => {
                tracing::info!("Global weekend default {} set to {:?}", day, text)
            }
        }
        Ok(default)
    }

    /// Points this week's `day` of a lab at a weekday template, or clears the
    /// override when `source` is `None`. The target date is the date `day`
    /// falls on in the current week.
    pub fn set_weekend_override(
        &self,
        lab_id: i64,
        day: Day,
        source: Option<Day>,
        created_by: Option<i64>,
    ) -> Result<OverrideUpdate> {
        if !day.is_weekend() {
            return Err(Error::BadRequest(format!("{day} is not a weekend day")));
        }
        self.store.get_lab(lab_id)?.ok_or(Error::NotFound("lab"))?;

        let target_date = self.week().date_of(day);

        let Some(source_day) = source else {
            let removed = self
                .store
                .delete_weekend_override(lab_id, day, target_date)?;
            if removed {
                tracing::info!(
                    "Cleared weekend override for lab {} {} ({})",
                    lab_id,
                    day,
                    target_date
                );
            }
            return Ok(OverrideUpdate::Cleared { removed });
        };

        if source_day.is_weekend() {
            return Err(Error::BadRequest(format!(
                "source day must be Monday to Friday, got {source_day}"
            )));
        }

        let ov = self
            .store
            .upsert_weekend_override(lab_id, day, target_date, source_day, created_by)?;
        tracing::info!(
            "Lab {} {} ({}) now follows {}",
            lab_id,
            day,
            target_date,
            source_day
        );
        Ok(OverrideUpdate::Set(ov))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::timetable::testing::{Fixture, date, fixture};
    use crate::types::EffectiveStatus;

    // 2026-10-21 is a Wednesday.
    fn wednesday() -> NaiveDate {
        date(2026, 10, 21)
    }

    fn setup() -> (Fixture, i64, User, User) {
        let fx = fixture(wednesday());
        let lab = fx.store.create_lab("Lab 1").unwrap();
        let admin = fx.store.create_user("Admin", "admin", "hash", true).unwrap();
        let faculty = fx.store.create_user("Grace", "f7", "hash", false).unwrap();
        (fx, lab.id, admin, faculty)
    }

    fn slot(fx: &Fixture, lab_id: i64, day: Day, period: u8) -> TemplateSlot {
        fx.store.get_slot_at(lab_id, day, period).unwrap().unwrap()
    }

    #[test]
    fn test_book_view_release_round_trip() {
        let (fx, lab_id, _, faculty) = setup();
        let wed3 = slot(&fx, lab_id, Day::Wednesday, 3);

        fx.service
            .book(wed3.id, wednesday(), &faculty, Some("Compilers"))
            .unwrap();
        let views = fx.service.timetable(lab_id).unwrap();
        let cell = views.iter().find(|v| v.id == wed3.id).unwrap();
        assert_eq!(cell.status, EffectiveStatus::Booked);
        assert_eq!(cell.faculty_id, Some(faculty.id));

        fx.service.release(wed3.id, wednesday(), &faculty).unwrap();
        let views = fx.service.timetable(lab_id).unwrap();
        let cell = views.iter().find(|v| v.id == wed3.id).unwrap();
        assert_eq!(cell.status, EffectiveStatus::Free);
        assert_eq!(cell.faculty_id, None);
    }

    #[test]
    fn test_book_rejects_past_date() {
        let (fx, lab_id, _, faculty) = setup();
        let wed3 = slot(&fx, lab_id, Day::Wednesday, 3);
        let result = fx.service.book(wed3.id, date(2026, 10, 14), &faculty, None);
        assert!(matches!(result, Err(Error::PastDate)));
    }

    #[test]
    fn test_book_rejects_mismatched_weekday() {
        let (fx, lab_id, _, faculty) = setup();
        let wed3 = slot(&fx, lab_id, Day::Wednesday, 3);
        let result = fx.service.book(wed3.id, date(2026, 10, 22), &faculty, None);
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_book_unknown_slot() {
        let (fx, _, _, faculty) = setup();
        let result = fx.service.book(9999, wednesday(), &faculty, None);
        assert!(matches!(result, Err(Error::NotFound("slot"))));
    }

    #[test]
    fn test_book_rejects_weekday_regular() {
        let (fx, lab_id, _, faculty) = setup();
        let wed3 = slot(&fx, lab_id, Day::Wednesday, 3);
        fx.service
            .set_slot_status(wed3.id, SlotStatus::Regular, Some("OS"))
            .unwrap();

        let result = fx.service.book(wed3.id, wednesday(), &faculty, None);
        assert!(matches!(result, Err(Error::SlotBlocked(_))));

        let views = fx.service.timetable(lab_id).unwrap();
        let cell = views.iter().find(|v| v.id == wed3.id).unwrap();
        assert_eq!(cell.status, EffectiveStatus::Regular);
    }

    #[test]
    fn test_book_twice_conflicts() {
        let (fx, lab_id, admin, faculty) = setup();
        let wed3 = slot(&fx, lab_id, Day::Wednesday, 3);
        fx.service.book(wed3.id, wednesday(), &faculty, None).unwrap();
        let result = fx.service.book(wed3.id, wednesday(), &admin, None);
        assert!(matches!(result, Err(Error::AlreadyBooked)));
    }

    #[test]
    fn test_concurrent_bookings_exactly_one_wins() {
        let (fx, lab_id, admin, faculty) = setup();
        let thu1 = slot(&fx, lab_id, Day::Thursday, 1);
        let target = date(2026, 10, 22);

        let results: Vec<Result<Booking>> = std::thread::scope(|s| {
            let handles = [&admin, &faculty].map(|user| {
                let service = fx.service.clone();
                s.spawn(move || service.book(thu1.id, target, user, None))
            });
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(Error::AlreadyBooked)))
        );
        assert_eq!(fx.store.count_bookings().unwrap(), 1);
    }

    #[test]
    fn test_weekend_default_blocks_booking() {
        let (fx, lab_id, _, faculty) = setup();
        fx.service
            .set_weekend_default(DefaultScope::Global, Day::Saturday, Some("Seminar"))
            .unwrap();
        let sat2 = slot(&fx, lab_id, Day::Saturday, 2);

        let result = fx.service.book(sat2.id, date(2026, 10, 24), &faculty, None);
        assert!(matches!(result, Err(Error::SlotBlocked(_))));

        // A lab row with empty text unblocks the lab again.
        fx.service
            .set_weekend_default(DefaultScope::Lab(lab_id), Day::Saturday, Some("  "))
            .unwrap();
        fx.service
            .book(sat2.id, date(2026, 10, 24), &faculty, None)
            .unwrap();
    }

    #[test]
    fn test_follow_override_decides_weekend_booking() {
        let (fx, lab_id, _, faculty) = setup();
        let wed5 = slot(&fx, lab_id, Day::Wednesday, 5);
        fx.service
            .set_slot_status(wed5.id, SlotStatus::Regular, Some("DB Lab"))
            .unwrap();
        fx.service
            .set_weekend_default(DefaultScope::Global, Day::Saturday, Some("Seminar"))
            .unwrap();
        fx.service
            .set_weekend_override(lab_id, Day::Saturday, Some(Day::Wednesday), None)
            .unwrap();

        let saturday = date(2026, 10, 24);
        let sat5 = slot(&fx, lab_id, Day::Saturday, 5);
        let sat4 = slot(&fx, lab_id, Day::Saturday, 4);
        assert!(matches!(
            fx.service.book(sat5.id, saturday, &faculty, None),
            Err(Error::SlotBlocked(_))
        ));
        fx.service.book(sat4.id, saturday, &faculty, None).unwrap();
    }

    #[test]
    fn test_release_requires_owner_or_admin() {
        let (fx, lab_id, admin, faculty) = setup();
        let other = fx.store.create_user("Alan", "f9", "hash", false).unwrap();
        let wed3 = slot(&fx, lab_id, Day::Wednesday, 3);

        assert!(matches!(
            fx.service.release(wed3.id, wednesday(), &faculty),
            Err(Error::NotFound("booking"))
        ));

        fx.service.book(wed3.id, wednesday(), &faculty, None).unwrap();
        assert!(matches!(
            fx.service.release(wed3.id, wednesday(), &other),
            Err(Error::Forbidden(_))
        ));
        fx.service.release(wed3.id, wednesday(), &admin).unwrap();
        assert!(fx.store.get_booking(wed3.id, wednesday()).unwrap().is_none());
    }

    #[test]
    fn test_marking_regular_evicts_future_bookings() {
        let (fx, lab_id, _, faculty) = setup();
        let fri2 = slot(&fx, lab_id, Day::Friday, 2);
        fx.service
            .book(fri2.id, date(2026, 10, 23), &faculty, None)
            .unwrap();
        fx.service
            .book(fri2.id, date(2026, 10, 30), &faculty, None)
            .unwrap();

        let (updated, evicted) = fx
            .service
            .set_slot_status(fri2.id, SlotStatus::Regular, Some("Robotics"))
            .unwrap();
        assert_eq!(evicted, 2);
        assert_eq!(updated.status, SlotStatus::Regular);
        assert_eq!(updated.class_info.as_deref(), Some("Robotics"));

        let (updated, evicted) = fx
            .service
            .set_slot_status(fri2.id, SlotStatus::Free, Some("ignored"))
            .unwrap();
        assert_eq!(evicted, 0);
        assert_eq!(updated.class_info, None);
    }

    #[test]
    fn test_set_slot_status_unknown_slot() {
        let (fx, _, _, _) = setup();
        let result = fx.service.set_slot_status(9999, SlotStatus::Regular, None);
        assert!(matches!(result, Err(Error::NotFound("slot"))));
    }

    #[test]
    fn test_weekend_default_validation() {
        let (fx, _, _, _) = setup();
        assert!(matches!(
            fx.service
                .set_weekend_default(DefaultScope::Global, Day::Monday, Some("x")),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            fx.service
                .set_weekend_default(DefaultScope::Lab(9999), Day::Sunday, Some("x")),
            Err(Error::NotFound("lab"))
        ));

        let stored = fx
            .service
            .set_weekend_default(DefaultScope::Global, Day::Sunday, Some(""))
            .unwrap();
        assert_eq!(stored.text, None);
    }

    #[test]
    fn test_override_targets_current_week_and_clears() {
        let (fx, lab_id, admin, _) = setup();

        let update = fx
            .service
            .set_weekend_override(lab_id, Day::Sunday, Some(Day::Monday), Some(admin.id))
            .unwrap();
        match update {
            OverrideUpdate::Set(ov) => {
                assert_eq!(ov.target_date, date(2026, 10, 25));
                assert_eq!(ov.source_day, Day::Monday);
                assert_eq!(ov.created_by, Some(admin.id));
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            fx.service
                .set_weekend_override(lab_id, Day::Sunday, Some(Day::Saturday), None),
            Err(Error::BadRequest(_))
        ));

        assert!(matches!(
            fx.service.set_weekend_override(lab_id, Day::Sunday, None, None),
            Ok(OverrideUpdate::Cleared { removed: true })
        ));
        assert!(matches!(
            fx.service.set_weekend_override(lab_id, Day::Sunday, None, None),
            Ok(OverrideUpdate::Cleared { removed: false })
        ));
    }

    #[test]
    fn test_stale_override_expires_when_week_slides() {
        let (fx, lab_id, _, _) = setup();
        fx.service
            .set_weekend_override(lab_id, Day::Saturday, Some(Day::Friday), None)
            .unwrap();

        fx.clock.set_today(date(2026, 10, 26));
        let sweep = fx.service.purge_expired().unwrap();
        assert_eq!(sweep.overrides, 1);
        assert!(
            fx.store
                .get_weekend_override(lab_id, Day::Saturday, date(2026, 10, 24))
                .unwrap()
                .is_none()
        );
    }
}
