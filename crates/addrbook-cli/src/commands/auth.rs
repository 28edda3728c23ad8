//! Register, login, logout and whoami

use super::shell::Session;
use crate::output;
use addrbook_client::api::SignupRequest;
use addrbook_client::Navigation;
use anyhow::Result;
use dialoguer::{Input, Password};

pub async fn register(session: &mut Session) -> Result<()> {
    let username: String = Input::with_theme(&session.theme)
        .with_prompt("Username")
        .interact_text()?;
    let email: String = Input::with_theme(&session.theme)
        .with_prompt("Email")
        .interact_text()?;
    let password = Password::with_theme(&session.theme)
        .with_prompt("Password")
        .interact()?;
    let repeated_password = Password::with_theme(&session.theme)
        .with_prompt("Repeat Password")
        .interact()?;

    let form = SignupRequest {
        username,
        email,
        password,
        repeated_password,
    };

    match session.client.auth().signup(&form).await {
        Ok(()) => {
            output::success("Account created. You can log in now.");
            session.navigate(Navigation::Login).await;
        }
        Err(e) => output::error(&e.message()),
    }
    Ok(())
}

pub async fn login(session: &mut Session) -> Result<()> {
    let email: String = Input::with_theme(&session.theme)
        .with_prompt("Email")
        .interact_text()?;
    let password = Password::with_theme(&session.theme)
        .with_prompt("Password")
        .interact()?;

    match session.client.auth().login(email, password).await {
        Ok(()) => {
            output::success("Logged in.");
            session.navigate(Navigation::Home).await;
        }
        Err(e) => output::error(&e.message()),
    }
    Ok(())
}

/// A failed logout is reported and the view stays where it is.
pub async fn logout(session: &mut Session) {
    match session.client.auth().logout().await {
        Ok(()) => {
            output::success("Logged out.");
            session.navigate(Navigation::Login).await;
        }
        Err(e) => output::error(&format!("Logout failed: {}", e.message())),
    }
}

pub async fn whoami(session: &Session) {
    match session.client.auth().profile().await {
        Ok(user) => output::user(&user),
        Err(e) if e.is_unauthorized() => output::hint("Not signed in."),
        Err(e) => output::error(&e.message()),
    }
}
