//! Configuration, profile, and password screens.

use anyhow::{Result, bail};
use inquire::validator::Validation;
use inquire::{Confirm, Text};
use serde_json::Value;
use tracing::info;

use crate::forms::{self, FieldKind, FieldSpec};
use crate::session::{AppContext, AppSettings, SessionStore};

pub const DEFAULT_API_URL: &str = "http://localhost/consty/api";

const PHOTO_SPEC: FieldSpec = FieldSpec {
    key: "photo",
    label: "Profile photo",
    kind: FieldKind::File,
    required: false,
};

/// Ask for the API base URL and persist it. Also the first-run setup when
/// no settings file exists yet.
pub fn config_wizard(store: &SessionStore, current: Option<&AppSettings>) -> Result<AppSettings> {
    println!("\n⚙️  --- Configuration Setup ---");
    let default_val = current
        .map(|settings| settings.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let url = forms::prompted(
        Text::new("API base URL:")
            .with_default(&default_val)
            .with_validator(|input: &str| {
                let trimmed = input.trim();
                if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                    Ok(Validation::Valid)
                } else {
                    Ok(Validation::Invalid(
                        "The URL must start with http:// or https://.".into(),
                    ))
                }
            })
            .prompt(),
    )?;

    let settings = AppSettings {
        api_url: url.trim().trim_end_matches('/').to_string(),
    };
    store.save_settings(&settings)?;
    println!("✅ Settings saved.");
    Ok(settings)
}

/// Show the stored identity, optionally change the display name or photo.
pub fn profile(ctx: &AppContext) -> Result<()> {
    let session = ctx.require_session()?;
    println!("\n--- Profile ---");
    println!("👤 {} (#{})", session.username, session.id);
    println!("   Role: {}", session.role().label());
    if let Some(photo) = &session.photo {
        println!("   Photo: {photo}");
    }

    let change = forms::prompted(
        Confirm::new("Update your profile?")
            .with_default(false)
            .prompt(),
    )?;
    if !change {
        return Ok(());
    }

    let username = forms::prompt_required_text("Username", Some(&session.username))?;
    let photo = forms::prompt_file(&PHOTO_SPEC, false)?;

    let value = ctx.api.update_profile(session.id, &username, photo)?;

    // Keep the stored session in step with what the server accepted.
    let mut next = session.clone();
    next.username = username;
    if let Some(photo) = value.get("photo").and_then(Value::as_str) {
        next.photo = Some(photo.to_string());
    }
    ctx.store.save_session(&next)?;
    info!(user = %next.username, "profile updated");
    println!("✅ Profile updated.");
    Ok(())
}

/// Change the account password. The new password is confirmed client-side
/// before anything goes over the wire.
pub fn settings(ctx: &AppContext) -> Result<()> {
    let session = ctx.require_session()?;
    println!("\n--- Account Settings ---");

    let current = forms::prompt_password("Current password:")?;
    let new = forms::prompt_password("New password:")?;
    let confirm = forms::prompt_password("Confirm new password:")?;
    if new != confirm {
        bail!("Passwords do not match.");
    }

    ctx.api.update_settings(session.id, &current, &new)?;
    println!("✅ Password updated.");
    Ok(())
}
