//! pocket-ledger: the data layer of a PIN-locked personal finance tracker.
//!
//! Two stores hold the application state. [`store::AuthStore`] keeps the PIN and whether the
//! session is unlocked. [`store::FinanceStore`] keeps transactions, reminders and the income and
//! expense category lists. Each store writes its state after every change to a
//! [`storage::Storage`] backend under a fixed key, and reloads it when opened.
//!
//! The `pocket` binary drives the stores from the command line through [`commands`].

pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ids;
pub mod model;
pub mod notifications;
pub mod storage;
pub mod store;
mod utils;

pub use config::Config;
pub use error::Error;
pub use error::Result;
