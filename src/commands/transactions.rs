//! Transaction command handlers: `add`, `delete`, `history`, `day` and `balance`.

use crate::args::{AddArgs, HistoryArgs};
use crate::commands::{open_finance, parse_date, Out};
use crate::model::{
    Amount, HistoryFilter, NewTransaction, Transaction, TransactionType, MAX_AMOUNT,
};
use crate::{Config, Result};
use anyhow::{bail, Context};
use chrono::{Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// Records a transaction and returns it, including its generated id.
///
/// When no category is given, the first category of the matching list is used. A category that is
/// not in the list is accepted with a warning.
///
/// # Errors
/// - Returns an error if the session is locked.
/// - Returns an error if the amount is larger than 9,999,999,999 or the date cannot be parsed.
pub async fn add(config: &Config, args: AddArgs) -> Result<Out<Transaction>> {
    if args.amount.value() > MAX_AMOUNT {
        bail!(
            "The amount {} is too large, the most a transaction can hold is {}",
            args.amount,
            Amount::MAX.formatted()
        );
    }
    let date = match args.date.as_deref() {
        Some(s) => parse_date(s)?,
        None => Utc::now(),
    };

    let mut finance = open_finance(config).await?;
    let category = match args.category {
        Some(category) => {
            if !finance
                .categories(args.r#type)
                .iter()
                .any(|c| *c == category)
            {
                warn!("'{category}' is not one of your {} categories", args.r#type);
            }
            category
        }
        None => finance
            .categories(args.r#type)
            .first()
            .cloned()
            .with_context(|| {
                format!(
                    "There are no {} categories, add one or pass --category",
                    args.r#type
                )
            })?,
    };

    let new = NewTransaction::new(args.r#type, args.amount, category, date)
        .with_method(args.method)
        .with_note(args.note);
    let id = finance.add_transaction(new);
    finance.flush().await?;

    let transaction = finance
        .transaction(&id)
        .cloned()
        .with_context(|| format!("Transaction {id} is missing right after being added"))?;
    Ok(Out::new(
        format!("Added {}", line(&transaction)),
        transaction,
    ))
}

/// Deletes a transaction. Deleting an id that does not exist is not an error.
pub async fn delete(config: &Config, id: &str) -> Result<Out<bool>> {
    let mut finance = open_finance(config).await?;
    let deleted = finance.delete_transaction(id);
    finance.flush().await?;
    let message = if deleted {
        format!("Deleted transaction {id}")
    } else {
        format!("There is no transaction {id}, nothing was deleted")
    };
    Ok(Out::new(message, deleted))
}

/// Lists transactions matching the filters in `args`, newest first.
pub async fn history(config: &Config, args: HistoryArgs) -> Result<Out<Vec<Transaction>>> {
    let finance = open_finance(config).await?;
    let filter = HistoryFilter::new(&args.search, args.r#type, args.method);
    let mut found: Vec<Transaction> = finance.history(&filter).into_iter().cloned().collect();
    let matched = found.len();
    if !args.all {
        found.truncate(args.limit.unwrap_or(config.recent_count()));
    }

    let mut message = format!("Showing {} of {matched} transactions", found.len());
    for t in &found {
        message.push('\n');
        message.push_str(&line(t));
    }
    Ok(Out::new(message, found))
}

/// Lists the transactions of one local calendar day, defaulting to today.
pub async fn day(config: &Config, date: Option<NaiveDate>) -> Result<Out<Vec<Transaction>>> {
    let finance = open_finance(config).await?;
    let day = date.unwrap_or_else(|| Local::now().date_naive());
    let found: Vec<Transaction> = finance.on_day(day, &Local).into_iter().cloned().collect();
    let active = finance.active_days(&Local).len();

    let mut message = format!(
        "{} transactions on {day} ({active} days have transactions)",
        found.len()
    );
    for t in &found {
        message.push('\n');
        message.push_str(&line(t));
    }
    Ok(Out::new(message, found))
}

/// The figures reported by `pocket balance`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Balance {
    pub total: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
}

pub async fn balance(config: &Config) -> Result<Out<Balance>> {
    let finance = open_finance(config).await?;
    let totals = finance.totals();
    let balance = Balance {
        total: finance.total_balance(),
        income: totals.income,
        expense: totals.expense,
    };
    let message = format!(
        "Balance: {} (income {}, expenses {})",
        signed(balance.total),
        signed(balance.income),
        signed(balance.expense)
    );
    Ok(Out::new(message, balance))
}

/// One transaction per line: local time, id, signed amount, method, category and note.
fn line(t: &Transaction) -> String {
    let sign = match t.r#type() {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };
    format!(
        "{}  {}  {sign}{}  {}  {}  {}",
        t.date().with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        t.id(),
        t.amount().formatted(),
        t.method(),
        t.category(),
        t.note()
    )
    .trim_end()
    .to_string()
}

fn signed(value: Decimal) -> String {
    let sign = if value < Decimal::ZERO { "-" } else { "" };
    match Amount::new(value.abs()) {
        Ok(amount) => format!("{sign}{}", amount.formatted()),
        Err(_) => value.to_string(),
    }
}
