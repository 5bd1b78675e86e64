mod day;
mod models;
mod status;

pub use day::Day;
pub use models::*;
pub use status::{EffectiveStatus, OverrideKind, SlotStatus};

/// Periods per day, numbered from 1.
pub const PERIODS_PER_DAY: u8 = 8;
