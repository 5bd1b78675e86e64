mod auth;
mod commands;
pub mod credentials;
pub mod http_client;
mod info;
mod init;
mod timetable;
mod weekend;

pub use auth::{run_auth_login, run_auth_logout};
pub use commands::{AdminCommands, AuthCommands, WeekendCommands};
pub use info::run_info;
pub use init::{ADMIN_FACULTY_ID, PASSWORD_FILE, run_init};
pub use timetable::{run_block, run_book, run_labs, run_release, run_timetable};
pub use weekend::{run_weekend_default, run_weekend_override, run_weekend_show};

use crate::store::SqliteStore;

/// Initialize store from data directory, checking it exists
pub fn init_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let data_path: std::path::PathBuf = data_dir.into();
    let db_path = data_path.join("labtime.db");

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'labtime admin init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}
