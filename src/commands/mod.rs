//! Command handlers for the pocket CLI.
//!
//! The CLI plays the part of the presentation layer: it validates user input (PIN length, amount
//! format, dates) before calling into the stores, refuses finance commands while the session is
//! locked, and flushes every store it mutated before returning.

mod auth;
mod categories;
mod init;
mod reminders;
mod reset;
mod transactions;

use crate::ids::RandomIds;
use crate::store::{AuthStore, FinanceStore};
use crate::{Config, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

pub use auth::{login, logout, set_pin, status, Status};
pub use categories::{add_category, delete_category, list_categories};
pub use init::init;
pub use reminders::{add_reminder, delete_reminder, list_reminders};
pub use reset::reset;
pub use transactions::{add, balance, day, delete, history, Balance};

/// The output type for a command: a message for the user and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

async fn open_auth(config: &Config) -> Result<AuthStore> {
    let storage = config.storage().await?;
    AuthStore::open(Arc::new(storage))
        .await
        .context("Unable to open the auth store")
}

async fn open_finance_unchecked(config: &Config) -> Result<FinanceStore> {
    let storage = config.storage().await?;
    FinanceStore::open(Arc::new(storage), Box::new(RandomIds))
        .await
        .context("Unable to open the finance store")
}

/// Opens the finance store, but only while the session is unlocked.
async fn open_finance(config: &Config) -> Result<FinanceStore> {
    let auth = open_auth(config).await?;
    if !auth.is_authenticated() {
        if auth.has_password() {
            bail!("pocket is locked, run 'pocket login --pin <PIN>' first");
        }
        bail!("No PIN has been set, run 'pocket set-pin --pin <PIN>' first");
    }
    open_finance_unchecked(config).await
}

/// Parses an RFC 3339 instant, or a bare `YYYY-MM-DD` day which is taken as local midnight.
pub(crate) fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Ok(instant.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| {
        format!("Invalid date '{s}', expected 2025-01-31 or 2025-01-31T18:30:00Z")
    })?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Unable to build midnight on {day}"))?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .with_context(|| format!("Local midnight does not exist on {day}"))?;
    Ok(local.with_timezone(&Utc))
}
