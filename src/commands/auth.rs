//! Sign in, sign up, sign out.

use anyhow::{Result, bail};
use tracing::info;

use crate::commands::dashboard;
use crate::forms::{self, FieldKind, FieldSpec};
use crate::query::Queries;
use crate::session::AppContext;

const EMAIL_SPEC: FieldSpec = FieldSpec {
    key: "email",
    label: "Email",
    kind: FieldKind::Email,
    required: true,
};

const PHOTO_SPEC: FieldSpec = FieldSpec {
    key: "photo",
    label: "Profile photo",
    kind: FieldKind::File,
    required: false,
};

/// Username/password prompt. A successful sign-in stores the session and
/// lands straight on the dashboard.
pub fn login(ctx: &AppContext) -> Result<()> {
    println!("\n--- Sign in ---");
    let username = forms::prompt_required_text("Username", None)?;
    let password = forms::prompt_password("Password:")?;

    let session = ctx.api.login(&username, &password)?;
    ctx.store.save_session(&session)?;
    info!(user = %session.username, "session stored");
    println!(
        "✅ Signed in as {} ({}).",
        session.username,
        session.role().label()
    );

    let queries = Queries::new(&ctx.api);
    dashboard::render(&queries);
    Ok(())
}

/// Account wizard with an optional profile photo upload.
pub fn signup(ctx: &AppContext) -> Result<()> {
    println!("\n--- Create account ---");
    let username = forms::prompt_required_text("Username", None)?;
    let email = match forms::prompt_text(&EMAIL_SPEC, None)? {
        Some(serde_json::Value::String(email)) => email,
        _ => bail!("Valid email required."),
    };
    let password = forms::prompt_password("Password:")?;
    let confirm = forms::prompt_password("Confirm password:")?;
    if confirm != password {
        bail!("Passwords do not match.");
    }
    let photo = forms::prompt_file(&PHOTO_SPEC, false)?;

    let fields = vec![
        ("username".to_string(), username),
        ("email".to_string(), email),
        ("password".to_string(), password),
    ];
    let session = ctx.api.signup(fields, photo)?;
    ctx.store.save_session(&session)?;
    info!(user = %session.username, "account created");
    println!("✅ Welcome, {}! Your account is ready.", session.username);

    let queries = Queries::new(&ctx.api);
    dashboard::render(&queries);
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.store.clear_session()?;
    println!("👋 Signed out.");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let Some(session) = ctx.session() else {
        println!("Not signed in.");
        return Ok(());
    };
    println!("👤 {} (#{})", session.username, session.id);
    println!("   Role: {}", session.role().label());
    if let Some(photo) = &session.photo {
        println!("   Photo: {photo}");
    }
    println!("   Server: {}", ctx.settings.api_url);
    Ok(())
}
