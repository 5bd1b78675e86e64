use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimetableService;
use crate::error::{Error, Result};
use crate::types::{
    DefaultScope, Day, OverrideKind, SlotStatus, TemplateSlot, WeekendDefault, WeekendOverride,
};

/// Effective state of a weekend period before bookings are considered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekendResolution {
    Regular(Option<String>),
    Free,
}

impl WeekendResolution {
    #[must_use]
    pub const fn is_regular(&self) -> bool {
        matches!(self, WeekendResolution::Regular(_))
    }
}

/// Which rule produced a [`WeekendResolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekendRule {
    Follow { source_day: Day },
    Default { scope: DefaultScope },
    Template,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendDayConfig {
    pub day: Day,
    pub date: NaiveDate,
    /// Text of the effective default (lab row, else global row).
    pub default_text: Option<String>,
    #[serde(rename = "override")]
    pub override_: Option<WeekendOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalWeekendDefaults {
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

impl TimetableService {
    /// Resolves a weekend template slot for `date`.
    ///
    /// First match wins: a "follow" override for the date mirrors the source
    /// weekday's slot at the same period; otherwise a default with non-empty
    /// text blocks the period; otherwise the slot's own stored status applies.
    pub fn resolve_weekend(
        &self,
        slot: &TemplateSlot,
        date: NaiveDate,
    ) -> Result<(WeekendResolution, WeekendRule)> {
        if let Some(ov) = self.store.get_weekend_override(slot.lab_id, slot.day, date)? {
            match ov.kind {
                OverrideKind::Follow => {
                    let resolution = self.follow(slot, ov.source_day)?;
                    return Ok((
                        resolution,
                        WeekendRule::Follow {
                            source_day: ov.source_day,
                        },
                    ));
                }
            }
        }

        if let Some(default) = self.effective_default(slot.lab_id, slot.day)? {
            if let Some(text) = default.blocking_text() {
                let scope = match default.lab_id {
                    Some(id) => DefaultScope::Lab(id),
                    None => DefaultScope::Global,
                };
                return Ok((
                    WeekendResolution::Regular(Some(text.to_string())),
                    WeekendRule::Default { scope },
                ));
            }
        }

        let resolution = match slot.status {
            SlotStatus::Regular => WeekendResolution::Regular(slot.class_info.clone()),
            SlotStatus::Free => WeekendResolution::Free,
        };
        Ok((resolution, WeekendRule::Template))
    }

    /// Mirrors the source weekday slot. A missing source slot reads as Free.
    fn follow(&self, slot: &TemplateSlot, source_day: Day) -> Result<WeekendResolution> {
        let source = self
            .store
            .get_slot_at(slot.lab_id, source_day, slot.period)?;

        Ok(match source {
            Some(s) if s.status == SlotStatus::Regular => WeekendResolution::Regular(s.class_info),
            Some(_) => WeekendResolution::Free,
            None => {
                tracing::warn!(
                    "Override source slot missing: lab {} {} period {}",
                    slot.lab_id,
                    source_day,
                    slot.period
                );
                WeekendResolution::Free
            }
        })
    }

    /// The first default found for `day`, trying the lab row before the
    /// global row. A lab row masks the global row even when its text is empty.
    pub fn effective_default(&self, lab_id: i64, day: Day) -> Result<Option<WeekendDefault>> {
        for scope in DefaultScope::fallback_chain(lab_id) {
            if let Some(found) = self.store.get_weekend_default(scope, day)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Weekend defaults and current-week overrides for one lab.
    pub fn weekend_config(&self, lab_id: i64) -> Result<Vec<WeekendDayConfig>> {
        self.store.get_lab(lab_id)?.ok_or(Error::NotFound("lab"))?;
        let week = self.week();

        Day::WEEKEND
            .into_iter()
            .map(|day| -> Result<WeekendDayConfig> {
                let date = week.date_of(day);
                Ok(WeekendDayConfig {
                    day,
                    date,
                    default_text: self
                        .effective_default(lab_id, day)?
                        .and_then(|d| d.text),
                    override_: self.store.get_weekend_override(lab_id, day, date)?,
                })
            })
            .collect()
    }

    pub fn global_weekend_defaults(&self) -> Result<GlobalWeekendDefaults> {
        let text = |day| -> Result<Option<String>> {
            Ok(self
                .store
                .get_weekend_default(DefaultScope::Global, day)?
                .and_then(|d| d.text))
        };
        Ok(GlobalWeekendDefaults {
            saturday: text(Day::Saturday)?,
            sunday: text(Day::Sunday)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::timetable::testing::{date, fixture};

    // 2026-10-21 is a Wednesday; the weekend of that week is 24th/25th.
    fn saturday() -> NaiveDate {
        date(2026, 10, 24)
    }

    #[test]
    fn test_template_fallback() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        let slot = fx.store.get_slot_at(lab.id, Day::Saturday, 2).unwrap().unwrap();

        let (res, rule) = fx.service.resolve_weekend(&slot, saturday()).unwrap();
        assert_eq!(res, WeekendResolution::Free);
        assert_eq!(rule, WeekendRule::Template);

        fx.store
            .set_slot_status(slot.id, SlotStatus::Regular, Some("Maintenance"), None)
            .unwrap();
        let slot = fx.store.get_slot(slot.id).unwrap().unwrap();
        let (res, _) = fx.service.resolve_weekend(&slot, saturday()).unwrap();
        assert_eq!(res, WeekendResolution::Regular(Some("Maintenance".into())));
    }

    #[test]
    fn test_global_default_applies_to_every_period() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 2").unwrap();
        fx.store
            .upsert_weekend_default(DefaultScope::Global, Day::Saturday, Some("Seminar"))
            .unwrap();

        for period in 1..=8 {
            let slot = fx
                .store
                .get_slot_at(lab.id, Day::Saturday, period)
                .unwrap()
                .unwrap();
            let (res, rule) = fx.service.resolve_weekend(&slot, saturday()).unwrap();
            assert_eq!(res, WeekendResolution::Regular(Some("Seminar".into())));
            assert_eq!(
                rule,
                WeekendRule::Default {
                    scope: DefaultScope::Global
                }
            );
        }
    }

    #[test]
    fn test_lab_default_masks_global() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        fx.store
            .upsert_weekend_default(DefaultScope::Lab(lab.id), Day::Sunday, Some(""))
            .unwrap();
        fx.store
            .upsert_weekend_default(DefaultScope::Global, Day::Sunday, Some("Closed"))
            .unwrap();

        let slot = fx.store.get_slot_at(lab.id, Day::Sunday, 1).unwrap().unwrap();
        let (res, rule) = fx
            .service
            .resolve_weekend(&slot, date(2026, 10, 25))
            .unwrap();
        assert_eq!(res, WeekendResolution::Free);
        assert_eq!(rule, WeekendRule::Template);
    }

    #[test]
    fn test_follow_override_mirrors_source_and_beats_default() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 2").unwrap();
        fx.store
            .upsert_weekend_default(DefaultScope::Global, Day::Saturday, Some("Seminar"))
            .unwrap();
        let wed5 = fx.store.get_slot_at(lab.id, Day::Wednesday, 5).unwrap().unwrap();
        fx.store
            .set_slot_status(wed5.id, SlotStatus::Regular, Some("DB Lab"), None)
            .unwrap();
        fx.store
            .upsert_weekend_override(lab.id, Day::Saturday, saturday(), Day::Wednesday, None)
            .unwrap();

        let sat5 = fx.store.get_slot_at(lab.id, Day::Saturday, 5).unwrap().unwrap();
        let (res, rule) = fx.service.resolve_weekend(&sat5, saturday()).unwrap();
        assert_eq!(res, WeekendResolution::Regular(Some("DB Lab".into())));
        assert_eq!(
            rule,
            WeekendRule::Follow {
                source_day: Day::Wednesday
            }
        );

        // Wednesday period 4 is Free, so the followed Saturday period is Free
        // even though a global default exists.
        let sat4 = fx.store.get_slot_at(lab.id, Day::Saturday, 4).unwrap().unwrap();
        let (res, _) = fx.service.resolve_weekend(&sat4, saturday()).unwrap();
        assert_eq!(res, WeekendResolution::Free);
    }

    #[test]
    fn test_override_for_other_date_is_ignored() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        let mon1 = fx.store.get_slot_at(lab.id, Day::Monday, 1).unwrap().unwrap();
        fx.store
            .set_slot_status(mon1.id, SlotStatus::Regular, Some("Physics"), None)
            .unwrap();
        fx.store
            .upsert_weekend_override(lab.id, Day::Saturday, date(2026, 10, 17), Day::Monday, None)
            .unwrap();

        let sat1 = fx.store.get_slot_at(lab.id, Day::Saturday, 1).unwrap().unwrap();
        let (res, rule) = fx.service.resolve_weekend(&sat1, saturday()).unwrap();
        assert_eq!(res, WeekendResolution::Free);
        assert_eq!(rule, WeekendRule::Template);
    }

    #[test]
    fn test_weekend_config_reports_effective_rows() {
        let fx = fixture(date(2026, 10, 21));
        let lab = fx.store.create_lab("Lab 1").unwrap();
        fx.store
            .upsert_weekend_default(DefaultScope::Global, Day::Sunday, Some("Closed"))
            .unwrap();
        fx.store
            .upsert_weekend_override(lab.id, Day::Saturday, saturday(), Day::Friday, None)
            .unwrap();

        let config = fx.service.weekend_config(lab.id).unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config[0].day, Day::Saturday);
        assert_eq!(config[0].date, saturday());
        assert_eq!(
            config[0].override_.as_ref().map(|o| o.source_day),
            Some(Day::Friday)
        );
        assert_eq!(config[1].default_text.as_deref(), Some("Closed"));
        assert!(config[1].override_.is_none());

        let global = fx.service.global_weekend_defaults().unwrap();
        assert_eq!(global.saturday, None);
        assert_eq!(global.sunday.as_deref(), Some("Closed"));
    }
}
