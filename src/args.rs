//! These structs provide the CLI interface for the pocket CLI.

use crate::model::{Amount, PaymentMethod, TransactionType};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// pocket: a PIN-locked income and expense tracker.
///
/// Record what comes in and what goes out, browse it by history or by calendar day, keep your
/// own income and expense categories, and see your balance. Everything is stored locally in
/// $POCKET_HOME.
///
/// Start with `pocket init`, then `pocket set-pin --pin <PIN>`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the default configuration.
    Init,
    /// Set or replace the PIN. This also unlocks the session.
    SetPin(PinArgs),
    /// Unlock the session with your PIN.
    Login(PinArgs),
    /// Lock the session. Your PIN is kept.
    Logout,
    /// Show whether a PIN is set and whether the session is unlocked.
    Status,
    /// Record an income or expense.
    Add(AddArgs),
    /// Delete a transaction by id.
    Delete(DeleteArgs),
    /// List transactions, newest first.
    History(HistoryArgs),
    /// List the transactions of one calendar day.
    Day(DayArgs),
    /// Show the total balance along with income and expense totals.
    Balance,
    /// List, add or delete categories.
    Categories(CategoriesArgs),
    /// List, add or delete reminders.
    Reminders(RemindersArgs),
    /// Delete every transaction and reminder and restore the default categories.
    Reset(PinArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where pocket data and configuration is held. Defaults to ~/pocket
    #[arg(long, env = "POCKET_HOME", default_value_t = default_pocket_home())]
    pocket_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, pocket_home: PathBuf) -> Self {
        Self {
            log_level,
            pocket_home: pocket_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn pocket_home(&self) -> &DisplayPath {
        &self.pocket_home
    }
}

/// Args for the commands that take a PIN.
#[derive(Debug, Parser, Clone)]
pub struct PinArgs {
    /// The PIN, at least 4 digits when setting one.
    #[arg(long)]
    pub pin: String,
}

/// Args for the `pocket add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Whether this is an income or an expense.
    #[arg(long = "type", value_enum)]
    pub r#type: TransactionType,

    /// The amount, e.g. 1250 or 1,250.50. Anything above 9,999,999,999 is rejected.
    #[arg(long)]
    pub amount: Amount,

    /// The category. Defaults to the first category of the matching list.
    #[arg(long)]
    pub category: Option<String>,

    /// How it was paid.
    #[arg(long, value_enum, default_value_t = PaymentMethod::Cash)]
    pub method: PaymentMethod,

    /// A free-form note.
    #[arg(long, default_value = "")]
    pub note: String,

    /// When it happened, as RFC 3339 (2025-01-31T18:30:00Z) or a day (2025-01-31). Defaults to
    /// now.
    #[arg(long)]
    pub date: Option<String>,
}

/// Args for the `pocket delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    pub id: String,
}

/// Args for the `pocket history` command.
#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    /// Only show transactions whose category or note contains this text (case-insensitive).
    #[arg(long, default_value = "")]
    pub search: String,

    /// Only show incomes or only expenses.
    #[arg(long = "type", value_enum)]
    pub r#type: Option<TransactionType>,

    /// Only show cash or only card transactions.
    #[arg(long, value_enum)]
    pub method: Option<PaymentMethod>,

    /// Show at most this many transactions. With no filters the configured recent count is used.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Show everything that matches.
    #[arg(long, conflicts_with = "limit")]
    pub all: bool,
}

/// Args for the `pocket day` command.
#[derive(Debug, Parser, Clone)]
pub struct DayArgs {
    /// The day, e.g. 2025-01-31. Defaults to today.
    pub date: Option<NaiveDate>,
}

/// Args for the `pocket categories` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub action: CategoriesAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoriesAction {
    /// List the categories of one or both types.
    List {
        #[arg(long = "type", value_enum)]
        r#type: Option<TransactionType>,
    },
    /// Add a category. Adding one that exists does nothing.
    Add {
        #[arg(long = "type", value_enum)]
        r#type: TransactionType,
        name: String,
    },
    /// Delete a category. Transactions that use it keep the label.
    Delete {
        #[arg(long = "type", value_enum)]
        r#type: TransactionType,
        name: String,
    },
}

/// Args for the `pocket reminders` command.
#[derive(Debug, Parser, Clone)]
pub struct RemindersArgs {
    #[command(subcommand)]
    pub action: RemindersAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RemindersAction {
    /// List reminders in the order they were added.
    List,
    /// Add a reminder for a day.
    Add {
        /// What to be reminded of.
        note: String,
        /// The day, e.g. 2025-01-31, or an RFC 3339 instant.
        #[arg(long)]
        date: String,
    },
    /// Delete a reminder by id.
    Delete { id: String },
}

fn default_pocket_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("pocket"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --pocket-home or POCKET_HOME instead of relying on the default \
                pocket home directory.",
            );
            PathBuf::from("pocket")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
