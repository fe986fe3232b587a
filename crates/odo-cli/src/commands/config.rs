use std::path::Path;

use odo_core::models::EmployeeProfile;

use crate::commands::common::{load_config, open_store, resolve_employee};
use crate::config_file::{is_http_url, normalize_text_option, CliConfig};
use crate::error::CliError;

pub fn run_config_init(
    remote_url: Option<String>,
    auth_token: Option<String>,
) -> Result<(), CliError> {
    let mut config = load_config()?;

    if let Some(url) = normalize_text_option(remote_url) {
        if !is_http_url(&url) {
            return Err(CliError::Config(format!(
                "Remote URL '{url}' must start with http:// or https://"
            )));
        }
        config.remote_url = Some(url);
    }
    if let Some(token) = normalize_text_option(auth_token) {
        config.auth_token = Some(token);
    }

    let path = config.save().map_err(CliError::Config)?;
    println!("{}", path.display());
    Ok(())
}

pub fn run_config_show() -> Result<(), CliError> {
    let config = load_config()?;

    println!(
        "remote_url:   {}",
        config.remote_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "auth_token:   {}",
        if config.auth_token.is_some() {
            "[REDACTED]"
        } else {
            "(not set)"
        }
    );
    println!(
        "employee_id:  {}",
        config.employee_id.as_deref().unwrap_or("(not set)")
    );
    Ok(())
}

pub fn run_employee_init(name: &str, email: &str, db_path: &Path) -> Result<(), CliError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(CliError::Config(
            "Employee name and email must not be empty".to_string(),
        ));
    }

    let mut config = load_config()?;
    let store = open_store(db_path)?;

    // Re-running updates the existing profile instead of minting a new ID
    let profile = match resolve_employee(&store, &config) {
        Ok(existing) => EmployeeProfile {
            name: name.to_string(),
            email: email.to_string(),
            updated_at: chrono::Utc::now().timestamp_millis(),
            ..existing
        },
        Err(CliError::NoEmployee) => EmployeeProfile::new(name, email),
        Err(error) => return Err(error),
    };

    store.save_employee(&profile)?;
    config.employee_id = Some(profile.id.as_str());
    config.save().map_err(CliError::Config)?;

    println!("{}", profile.id);
    Ok(())
}

pub fn run_employee_show(db_path: &Path) -> Result<(), CliError> {
    let config = load_config()?;
    let store = open_store(db_path)?;
    let profile = resolve_employee(&store, &config)?;

    println!("id:     {}", profile.id);
    println!("name:   {}", profile.name);
    println!("email:  {}", profile.email);
    Ok(())
}
