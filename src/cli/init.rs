use std::fs;
use std::path::{Path, PathBuf};

use anyhow::bail;
use inquire::{Password, PasswordDisplayMode};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::auth::TokenGenerator;
use crate::store::{SqliteStore, Store};

pub const ADMIN_FACULTY_ID: &str = "admin";
pub const PASSWORD_FILE: &str = ".admin_password";
const GENERATED_PASSWORD_LEN: usize = 20;

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Creates the database, seeds `labs` labs on an empty database and creates
/// the `admin` user.
pub fn run_init(
    data_dir: String,
    admin_password: Option<String>,
    labs: u32,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let data_path: PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let store = SqliteStore::new(data_path.join("labtime.db"))?;
    store.initialize()?;

    if store.get_user_by_faculty_id(ADMIN_FACULTY_ID)?.is_some() {
        bail!(
            "Server already initialized. Admin user '{ADMIN_FACULTY_ID}' exists in {}",
            data_path.display()
        );
    }

    let (password, generated) = match admin_password {
        Some(p) if p.chars().count() < 6 => bail!("Admin password must be at least 6 characters"),
        Some(p) => (p, false),
        None if non_interactive => (generate_password(), true),
        None => (
            Password::new("Admin password:")
                .with_display_mode(PasswordDisplayMode::Masked)
                .with_validator(|input: &str| {
                    if input.chars().count() < 6 {
                        Ok(inquire::validator::Validation::Invalid(
                            "At least 6 characters".into(),
                        ))
                    } else {
                        Ok(inquire::validator::Validation::Valid)
                    }
                })
                .prompt()?,
            false,
        ),
    };

    let hash = TokenGenerator::new().hash(&password)?;
    store.create_user("Administrator", ADMIN_FACULTY_ID, &hash, true)?;

    let mut created_labs = 0;
    if store.count_labs()? == 0 {
        for n in 1..=labs {
            store.create_lab(&format!("Lab {n}"))?;
            created_labs += 1;
        }
    }

    println!();
    println!("========================================");
    println!("Database: {}", data_path.join("labtime.db").display());
    println!("Labs created: {created_labs}");
    println!("Admin faculty id: {ADMIN_FACULTY_ID}");
    if generated {
        let password_file = data_path.join(PASSWORD_FILE);
        fs::write(&password_file, &password)?;
        #[cfg(unix)]
        set_restrictive_permissions(&password_file);

        println!();
        println!("Generated admin password (save this):");
        println!();
        println!("  {password}");
        println!();
        println!("Password also written to: {}", password_file.display());
    }
    println!("========================================");
    println!();

    Ok(())
}
