use serde::Serialize;

use crate::store::Store;
use crate::types::{Day, DefaultScope, SlotStatus};

use super::init_store;

#[derive(Serialize)]
struct LabOutput {
    id: i64,
    name: String,
    regular_slots: usize,
    created_at: String,
}

#[derive(Serialize)]
struct UserOutput {
    id: i64,
    name: String,
    faculty_id: String,
    is_admin: bool,
}

#[derive(Serialize)]
struct ServerInfo {
    users: usize,
    admins: i64,
    bookings: i64,
    global_saturday: Option<String>,
    global_sunday: Option<String>,
    labs: Vec<LabOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    user_list: Vec<UserOutput>,
}

pub fn run_info(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let users = store.list_users()?;
    let mut labs = Vec::new();
    for lab in store.list_labs()? {
        let regular_slots = store
            .list_lab_slots(lab.id)?
            .iter()
            .filter(|s| s.status == SlotStatus::Regular)
            .count();
        labs.push(LabOutput {
            id: lab.id,
            name: lab.name,
            regular_slots,
            created_at: lab.created_at.to_rfc3339(),
        });
    }

    let global = |day| -> anyhow::Result<Option<String>> {
        Ok(store
            .get_weekend_default(DefaultScope::Global, day)?
            .and_then(|d| d.text))
    };

    let info = ServerInfo {
        users: users.len(),
        admins: store.count_admins()?,
        bookings: store.count_bookings()?,
        global_saturday: global(Day::Saturday)?,
        global_sunday: global(Day::Sunday)?,
        labs,
        user_list: if json {
            users
                .into_iter()
                .map(|u| UserOutput {
                    id: u.id,
                    name: u.name,
                    faculty_id: u.faculty_id,
                    is_admin: u.is_admin,
                })
                .collect()
        } else {
            Vec::new()
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!("Labtime Server Status");
    println!("{}", "─".repeat(21));
    println!("Users:     {} ({} admin)", info.users, info.admins);
    println!("Labs:      {}", info.labs.len());
    println!("Bookings:  {}", info.bookings);
    println!(
        "Weekend:   Saturday {}, Sunday {}",
        info.global_saturday.as_deref().unwrap_or("open"),
        info.global_sunday.as_deref().unwrap_or("open")
    );
    println!();
    for lab in &info.labs {
        println!(
            "  {:>3}  {:<24} {} regular slots",
            lab.id, lab.name, lab.regular_slots
        );
    }
    println!();

    Ok(())
}
