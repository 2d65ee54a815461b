//! PIN and session command handlers.
//!
//! - `pocket set-pin` - set or replace the PIN
//! - `pocket login` / `pocket logout` - unlock or lock the session
//! - `pocket status` - report the lock state

use crate::commands::{open_auth, Out};
use crate::{Config, Result};
use anyhow::{bail, ensure};
use serde::Serialize;

/// Sets the PIN, replacing any existing one, and unlocks the session.
///
/// # Errors
/// - Returns an error if `pin` is shorter than the configured minimum or is not all digits.
/// - Returns an error if the new state cannot be written.
pub async fn set_pin(config: &Config, pin: &str) -> Result<Out<()>> {
    validate_pin(pin, config.min_pin_length())?;
    let mut auth = open_auth(config).await?;
    let replaced = auth.has_password();
    auth.set_password(pin);
    auth.flush().await?;
    let message = if replaced {
        "The PIN has been updated"
    } else {
        "The PIN has been set and pocket is unlocked"
    };
    Ok(message.into())
}

/// Unlocks the session.
///
/// # Errors
/// - Returns an error if the PIN is wrong. The lock state is left as it was.
pub async fn login(config: &Config, pin: &str) -> Result<Out<()>> {
    let mut auth = open_auth(config).await?;
    if !auth.login(pin) {
        bail!("Wrong PIN");
    }
    auth.flush().await?;
    if auth.has_password() {
        Ok("pocket is unlocked".into())
    } else {
        Ok("pocket is unlocked. No PIN is set yet, run 'pocket set-pin' to add one".into())
    }
}

/// Locks the session.
pub async fn logout(config: &Config) -> Result<Out<()>> {
    let mut auth = open_auth(config).await?;
    auth.logout();
    auth.flush().await?;
    Ok("pocket is locked".into())
}

/// The lock state as reported by `pocket status`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Status {
    pub has_pin: bool,
    pub unlocked: bool,
}

pub async fn status(config: &Config) -> Result<Out<Status>> {
    let auth = open_auth(config).await?;
    let status = Status {
        has_pin: auth.has_password(),
        unlocked: auth.is_authenticated(),
    };
    let message = match (status.has_pin, status.unlocked) {
        (false, _) => "No PIN is set",
        (true, true) => "A PIN is set and pocket is unlocked",
        (true, false) => "A PIN is set and pocket is locked",
    };
    Ok(Out::new(message, status))
}

fn validate_pin(pin: &str, min_length: usize) -> Result<()> {
    ensure!(
        pin.chars().count() >= min_length,
        "The PIN must be at least {min_length} digits long"
    );
    ensure!(
        pin.chars().all(|c| c.is_ascii_digit()),
        "The PIN may only contain digits"
    );
    Ok(())
}
