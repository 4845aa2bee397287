//! Session commands: login, register, logout, whoami.

use mercadito_engine::{Engine, EngineError};

/// Log in and print the resulting identity.
#[allow(clippy::print_stdout)]
pub async fn login(engine: &Engine, email: &str, password: &str) -> Result<(), EngineError> {
    let identity = engine.auth().login(email, password).await?;
    println!("Logged in as {}", identity.display_name().unwrap_or(email));
    if !identity.roles.is_empty() {
        println!("Roles: {}", identity.roles.join(", "));
    }
    Ok(())
}

/// Create an account, then log in with the new credentials.
#[allow(clippy::print_stdout)]
pub async fn register(engine: &Engine, email: &str, password: &str) -> Result<(), EngineError> {
    engine.auth().register(email, password).await?;
    println!("Account created for {email}");
    login(engine, email, password).await
}

/// Clear session and local cart.
#[allow(clippy::print_stdout)]
pub async fn logout(engine: &Engine) {
    engine.auth().logout().await;
    println!("Logged out");
}

/// Print the session as the state file has it. No network.
#[allow(clippy::print_stdout)]
pub fn whoami(engine: &Engine) {
    let session = engine.session();
    if !session.is_logged_in() {
        println!("Not logged in");
        return;
    }

    let identity = session.identity();
    println!("{}", identity.display_name().unwrap_or("(unnamed)"));
    if let Some(user_id) = identity.user_id {
        println!("User id: {user_id}");
    }
    if !identity.roles.is_empty() {
        println!("Roles: {}", identity.roles.join(", "));
    }
    if session.is_expired() {
        println!("Token is expired; log in again");
    }
}
