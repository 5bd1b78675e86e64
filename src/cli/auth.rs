use inquire::{Password, PasswordDisplayMode, Text};

use super::credentials::{Credentials, delete_credentials, load_credentials, save_credentials};
use super::http_client::ApiClient;
use crate::server::dto::{LoginRequest, LoginResponse};

fn normalize_server_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    // Strip trailing API paths to avoid duplication when constructing request URLs
    let url = url
        .trim_end_matches("/api/v1")
        .trim_end_matches("/api")
        .trim_end_matches('/');

    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    // Default to http:// for localhost/127.0.0.1, https:// for others
    if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
        format!("http://{url}")
    } else {
        format!("https://{url}")
    }
}

fn required_text(
    value: Option<String>,
    flag: &str,
    prompt: &str,
    non_interactive: bool,
) -> anyhow::Result<String> {
    match value {
        Some(v) if v.trim().is_empty() => anyhow::bail!("{flag} cannot be empty"),
        Some(v) => Ok(v),
        None if non_interactive => anyhow::bail!("{flag} is required in non-interactive mode"),
        None => Ok(Text::new(prompt)
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    Ok(inquire::validator::Validation::Invalid(
                        "A value is required".into(),
                    ))
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()?),
    }
}

pub fn run_auth_login(
    server: Option<String>,
    faculty_id: Option<String>,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let server = required_text(server, "--server", "Server URL:", non_interactive)?;
    let server_url = normalize_server_url(&server);
    let faculty_id = required_text(faculty_id, "--faculty-id", "Faculty id:", non_interactive)?;

    let password = match password {
        Some(p) => p,
        None if non_interactive => {
            anyhow::bail!("--password is required in non-interactive mode")
        }
        None => Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?,
    };

    let client = ApiClient::anonymous(&server_url)?;
    let login: LoginResponse = client.post(
        "/auth/login",
        &LoginRequest {
            faculty_id: faculty_id.trim().to_string(),
            password,
        },
    )?;

    save_credentials(&Credentials {
        server_url: server_url.clone(),
        token: login.token,
        faculty_id: login.user.faculty_id.clone(),
    })?;

    println!();
    println!("Logged in to {} as {}", server_url, login.user.name);
    if let Some(expires_at) = login.expires_at {
        println!("Session expires at {}", expires_at.to_rfc3339());
    }
    println!();

    Ok(())
}

pub fn run_auth_logout() -> anyhow::Result<()> {
    // Best effort: the local credentials go even if the server is unreachable.
    if let Ok(creds) = load_credentials() {
        if let Err(e) = ApiClient::new(&creds).and_then(|c| c.post_empty("/auth/logout")) {
            eprintln!("Warning: could not end the server session: {e}");
        }
    }

    println!();
    if delete_credentials()? {
        println!("Logged out successfully.");
    } else {
        println!("No credentials found.");
    }
    println!();
    Ok(())
}
