use super::credentials::load_credentials;
use super::http_client::ApiClient;
use crate::server::dto::{LabTarget, WeekendDefaultRequest, WeekendOverrideRequest};
use crate::timetable::{GlobalWeekendDefaults, OverrideUpdate, WeekendDayConfig};
use crate::types::WeekendDefault;

/// Lab id, or `None` for "global".
fn parse_target(target: &str) -> anyhow::Result<Option<i64>> {
    if target.eq_ignore_ascii_case("global") {
        return Ok(None);
    }
    target
        .parse()
        .map(Some)
        .map_err(|_| anyhow::anyhow!("Expected a lab id or 'global', got '{target}'"))
}

pub fn run_weekend_show(target: String) -> anyhow::Result<()> {
    let client = ApiClient::new(&load_credentials()?)?;

    println!();
    match parse_target(&target)? {
        None => {
            let defaults: GlobalWeekendDefaults = client.get("/weekend/global")?;
            println!("Global weekend defaults");
            println!("  Saturday: {}", defaults.saturday.as_deref().unwrap_or("-"));
            println!("  Sunday:   {}", defaults.sunday.as_deref().unwrap_or("-"));
        }
        Some(lab_id) => {
            let config: Vec<WeekendDayConfig> = client.get(&format!("/labs/{lab_id}/weekend"))?;
            println!("Weekend configuration for lab {lab_id}");
            for day in config {
                let follows = day
                    .override_
                    .map(|o| format!(", follows {}", o.source_day))
                    .unwrap_or_default();
                println!(
                    "  {} {}: default {}{}",
                    day.day,
                    day.date,
                    day.default_text.as_deref().unwrap_or("-"),
                    follows
                );
            }
        }
    }
    println!();
    Ok(())
}

pub fn run_weekend_default(target: String, day: String, text: Option<String>) -> anyhow::Result<()> {
    let client = ApiClient::new(&load_credentials()?)?;
    let default: WeekendDefault = client.put(
        "/weekend/defaults",
        &WeekendDefaultRequest {
            lab_id: parse_target(&target)?.map(LabTarget::Lab),
            day,
            text,
        },
    )?;

    let scope = default
        .lab_id
        .map_or_else(|| "all labs".to_string(), |id| format!("lab {id}"));
    println!();
    match default.text {
        Some(text) => println!("{} is now blocked for {scope}: {text}", default.day),
        None => println!("{} is open for {scope}.", default.day),
    }
    println!();
    Ok(())
}

pub fn run_weekend_override(lab_id: i64, day: String, source: Option<String>) -> anyhow::Result<()> {
    let client = ApiClient::new(&load_credentials()?)?;
    let update: OverrideUpdate = client.put(
        "/weekend/overrides",
        &WeekendOverrideRequest {
            lab_id,
            day: day.clone(),
            source_day: source,
        },
    )?;

    println!();
    match update {
        OverrideUpdate::Set(ov) => println!(
            "{} {} in lab {} follows {}.",
            ov.day, ov.target_date, ov.lab_id, ov.source_day
        ),
        OverrideUpdate::Cleared { removed: true } => {
            println!("Override for {day} in lab {lab_id} cleared.")
        }
        OverrideUpdate::Cleared { removed: false } => {
            println!("No override for {day} in lab {lab_id}.")
        }
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("global").unwrap(), None);
        assert_eq!(parse_target("GLOBAL").unwrap(), None);
        assert_eq!(parse_target("3").unwrap(), Some(3));
        assert!(parse_target("lab3").is_err());
    }
}
