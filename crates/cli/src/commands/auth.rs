//! Session views: register, login, logout, whoami.

use copperpot_client::models::{Credentials, RegisterRequest};
use copperpot_client::{AppState, Result};

/// Create an account and establish the session from the issued token.
#[allow(clippy::print_stdout)]
pub async fn register(
    state: &AppState,
    firstname: String,
    lastname: String,
    email: String,
    password: String,
) -> Result<()> {
    let response = state
        .api()
        .register(&RegisterRequest {
            firstname,
            lastname,
            email,
            password,
        })
        .await?;
    let session = state.sessions().login(
        &response.token,
        &response.role,
        &response.firstname,
        &response.lastname,
    )?;
    println!("Welcome, {}! You are logged in.", session.display_name());
    Ok(())
}

/// Log in and establish the session from the issued token.
#[allow(clippy::print_stdout)]
pub async fn login(state: &AppState, email: String, password: String) -> Result<()> {
    let response = state
        .api()
        .authenticate(&Credentials { email, password })
        .await?;
    let session = state.sessions().login(
        &response.token,
        &response.role,
        &response.firstname,
        &response.lastname,
    )?;
    println!(
        "Welcome back, {} ({}).",
        session.display_name(),
        session.role
    );
    Ok(())
}

/// Clear the session.
#[allow(clippy::print_stdout)]
pub fn logout(state: &AppState) -> Result<()> {
    state.sessions().logout()?;
    println!("Logged out.");
    Ok(())
}

/// Show the current session.
#[allow(clippy::print_stdout)]
pub fn whoami(state: &AppState) -> Result<()> {
    match state.sessions().current() {
        Some(session) => println!("{} ({})", session.display_name(), session.role),
        None => println!("Not logged in."),
    }
    Ok(())
}
