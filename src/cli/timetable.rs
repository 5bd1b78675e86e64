use super::credentials::load_credentials;
use super::http_client::ApiClient;
use crate::server::dto::{
    BookingRequest, ReleaseRequest, SlotStatusRequest, SlotStatusResponse, TimetableResponse,
};
use crate::timetable::SlotView;
use crate::types::{Booking, Day, EffectiveStatus, Lab, PERIODS_PER_DAY};

const CELL_WIDTH: usize = 16;

fn client() -> anyhow::Result<ApiClient> {
    ApiClient::new(&load_credentials()?)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn cell(view: &SlotView) -> String {
    let label = match view.status {
        EffectiveStatus::Free => "free".to_string(),
        EffectiveStatus::Regular => {
            format!("R {}", view.class_info.as_deref().unwrap_or("regular"))
        }
        EffectiveStatus::Booked => format!(
            "B {}",
            view.faculty_name
                .as_deref()
                .or(view.class_info.as_deref())
                .unwrap_or("booked")
        ),
    };
    truncate(&format!("#{} {}", view.id, label), CELL_WIDTH)
}

/// Renders the week as a period by day grid, today's column first.
fn render_grid(timetable: &TimetableResponse) -> String {
    let mut days: Vec<(Day, chrono::NaiveDate)> = Day::ALL
        .into_iter()
        .filter_map(|day| {
            timetable
                .slots
                .iter()
                .find(|s| s.day == day)
                .map(|s| (day, s.date))
        })
        .collect();
    days.sort_by_key(|(_, date)| *date);

    let mut out = String::new();
    out.push_str(&format!("{:<4}", ""));
    for (day, date) in &days {
        let header = format!("{} {}", &day.as_str()[..3], date.format("%d %b"));
        out.push_str(&format!(" {header:<CELL_WIDTH$}"));
    }
    out.push('\n');

    for period in 1..=PERIODS_PER_DAY {
        out.push_str(&format!("{:<4}", format!("P{period}")));
        for (day, _) in &days {
            let text = timetable
                .slots
                .iter()
                .find(|s| s.day == *day && s.period == period)
                .map(cell)
                .unwrap_or_default();
            out.push_str(&format!(" {text:<CELL_WIDTH$}"));
        }
        out.push('\n');
    }
    out
}

pub fn run_labs() -> anyhow::Result<()> {
    let labs: Vec<Lab> = client()?.get("/labs")?;

    println!();
    if labs.is_empty() {
        println!("No labs.");
    }
    for lab in labs {
        println!("  {:>3}  {}", lab.id, lab.name);
    }
    println!();
    Ok(())
}

pub fn run_timetable(lab_id: i64, json: bool) -> anyhow::Result<()> {
    let timetable: TimetableResponse = client()?.get(&format!("/labs/{lab_id}/timetable"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&timetable.slots)?);
        return Ok(());
    }

    println!();
    println!(
        "{} (week starting {})",
        timetable.lab.name, timetable.week_start
    );
    println!();
    print!("{}", render_grid(&timetable));
    println!();
    Ok(())
}

pub fn run_book(slot_id: i64, date: String, class_info: Option<String>) -> anyhow::Result<()> {
    let booking: Booking = client()?.post(
        "/bookings",
        &BookingRequest {
            slot_id,
            date,
            class_info,
        },
    )?;

    println!();
    println!("Booked slot {} on {}.", booking.slot_id, booking.date);
    println!();
    Ok(())
}

pub fn run_release(slot_id: i64, date: String) -> anyhow::Result<()> {
    let booking: Booking = client()?.post("/bookings/release", &ReleaseRequest { slot_id, date })?;

    println!();
    println!("Released slot {} on {}.", booking.slot_id, booking.date);
    println!();
    Ok(())
}

pub fn run_block(slot_id: i64, status: String, class_info: Option<String>) -> anyhow::Result<()> {
    let resp: SlotStatusResponse = client()?.put(
        &format!("/slots/{slot_id}/status"),
        &SlotStatusRequest { status, class_info },
    )?;

    println!();
    println!(
        "{} period {} is now {}.",
        resp.slot.day, resp.slot.period, resp.slot.status
    );
    if resp.evicted_bookings > 0 {
        println!("{} booking(s) were cancelled.", resp.evicted_bookings);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn view(id: i64, day: Day, period: u8, date: NaiveDate, status: EffectiveStatus) -> SlotView {
        SlotView {
            id,
            lab_id: 1,
            day,
            period,
            date,
            status,
            class_info: None,
            faculty_id: None,
            faculty_name: None,
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer text", 6), "a muc…");
    }

    #[test]
    fn test_grid_starts_with_today() {
        let wed = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        let mon = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();
        let mut booked = view(2, Day::Wednesday, 1, wed, EffectiveStatus::Booked);
        booked.faculty_name = Some("Grace".into());
        let timetable = TimetableResponse {
            lab: Lab {
                id: 1,
                name: "Lab 1".into(),
                created_at: Utc::now(),
            },
            week_start: wed,
            slots: vec![view(1, Day::Monday, 1, mon, EffectiveStatus::Free), booked],
        };

        let grid = render_grid(&timetable);
        let header = grid.lines().next().unwrap();
        assert!(header.find("Wed").unwrap() < header.find("Mon").unwrap());
        assert!(grid.contains("#2 B Grace"));
        assert!(grid.contains("#1 free"));
        assert_eq!(grid.lines().count(), 1 + usize::from(PERIODS_PER_DAY));
    }
}
