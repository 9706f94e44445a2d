//! Account commands: login, register, logout, whoami, profile

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};

use createathon::models::{ProfileFieldsUpdate, ProfileUpdate, RegisterRequest, User};
use createathon::session::{Session, SessionError};

use super::app::{print_json, App};

#[derive(Debug, Clone, Default)]
pub struct RegisterArgs {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileArgs {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
}

impl ProfileArgs {
    fn into_update(self) -> ProfileUpdate {
        let fields = ProfileFieldsUpdate {
            bio: self.bio,
            github_url: self.github,
            linkedin_url: self.linkedin,
            website_url: self.website,
        };
        let has_fields = fields != ProfileFieldsUpdate::default();
        ProfileUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            profile: has_fields.then_some(fields),
        }
    }
}

pub async fn login_command(
    app: &mut App,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = value_or_prompt(username, "Username")?;
    let password = value_or_prompt(password, "Password")?;
    if username.trim().is_empty() || password.is_empty() {
        bail!("Please enter both username and password");
    }

    let session = app
        .session
        .login(username.trim(), &password)
        .await
        .map_err(|e| session_alert(e, "Failed to login"))?
        .clone();
    report_session(app.json, &session, "Logged in")
}

pub async fn register_command(app: &mut App, args: RegisterArgs) -> Result<()> {
    let request = RegisterRequest {
        username: value_or_prompt(args.username, "Username")?,
        email: value_or_prompt(args.email, "Email")?,
        password: value_or_prompt(args.password, "Password")?,
        confirm_password: value_or_prompt(args.confirm_password, "Confirm password")?,
        first_name: args.first_name.unwrap_or_default(),
        last_name: args.last_name.unwrap_or_default(),
    };
    request.check().map_err(|msg| anyhow!(msg))?;

    let session = app
        .session
        .register(&request)
        .await
        .map_err(|e| session_alert(e, "Failed to register"))?
        .clone();
    report_session(app.json, &session, "Registered")
}

pub fn logout_command(app: &mut App) -> Result<()> {
    let was = app.session.current_user().map(|s| s.username.clone());
    app.session.logout().context("Failed to clear stored credentials")?;

    if app.json {
        return print_json(&serde_json::json!({ "logged_out": was }));
    }
    match was {
        Some(username) => println!("Logged out {username}."),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub fn whoami_command(app: &mut App) -> Result<()> {
    let json = app.json;
    match app.session.current_user() {
        Some(session) if json => print_json(&session.user),
        Some(session) => {
            println!("{} ({})", session.display_name, session.username);
            Ok(())
        }
        None if json => print_json(&serde_json::Value::Null),
        None => {
            println!("Not logged in.");
            Ok(())
        }
    }
}

/// Show the profile, or update it when any field is given.
pub async fn profile_command(app: &mut App, args: ProfileArgs) -> Result<()> {
    let session = app.require_user()?;
    let update = args.into_update();
    if update.is_empty() {
        return show_profile(app.json, &session.user);
    }

    let user = app
        .session
        .update_profile(&update)
        .await
        .map_err(|e| session_alert(e, "Failed to update profile"))?
        .user
        .clone();
    if !app.json {
        println!("Profile updated.\n");
    }
    show_profile(app.json, &user)
}

fn show_profile(json: bool, user: &User) -> Result<()> {
    if json {
        return print_json(user);
    }

    println!("{}", user.display_name());
    println!("{}", "-".repeat(40));
    println!("  Username:  {}", user.username);
    println!("  Email:     {}", user.email);
    if let Some(profile) = &user.profile {
        let rows = [
            ("Bio", &profile.bio),
            ("GitHub", &profile.github_url),
            ("LinkedIn", &profile.linkedin_url),
            ("Website", &profile.website_url),
        ];
        for (label, value) in rows {
            if !value.is_empty() {
                println!("  {:<10} {}", format!("{label}:"), value);
            }
        }
    }
    Ok(())
}

fn report_session(json: bool, session: &Session, verb: &str) -> Result<()> {
    if json {
        return print_json(&session.user);
    }
    println!("{verb} as {} ({}).", session.display_name, session.username);
    Ok(())
}

fn session_alert(err: SessionError, fallback: &'static str) -> anyhow::Error {
    match err {
        SessionError::Api(api) => super::app::alert(fallback)(api),
        other => anyhow!(other),
    }
}

fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("Failed to read {}", label.to_lowercase()))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
