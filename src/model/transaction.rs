use crate::model::Amount;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a transaction adds money to the balance or takes money from it.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// How a transaction was paid.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
}

serde_plain::derive_display_from_serialize!(PaymentMethod);
serde_plain::derive_fromstr_from_deserialize!(PaymentMethod);

/// A single recorded income or expense.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) id: String,
    #[serde(rename = "type")]
    pub(crate) r#type: TransactionType,
    pub(crate) method: PaymentMethod,
    pub(crate) amount: Amount,
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) note: String,
    pub(crate) date: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn from_new(id: String, new: NewTransaction) -> Self {
        Self {
            id,
            r#type: new.r#type,
            method: new.method,
            amount: new.amount.clamped(),
            category: new.category,
            note: new.note,
            date: new.date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The amount as it contributes to the balance: positive for income, negative for expense.
    pub fn signed_amount(&self) -> Decimal {
        match self.r#type {
            TransactionType::Income => self.amount.value(),
            TransactionType::Expense => -self.amount.value(),
        }
    }

    /// The calendar day this transaction falls on when viewed in `tz`.
    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.date.with_timezone(tz).date_naive()
    }
}

/// The data needed to record a transaction. The store assigns the id.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewTransaction {
    pub r#type: TransactionType,
    pub method: PaymentMethod,
    pub amount: Amount,
    pub category: String,
    pub note: String,
    pub date: DateTime<Utc>,
}

impl NewTransaction {
    /// Creates a cash transaction with an empty note.
    pub fn new(
        r#type: TransactionType,
        amount: Amount,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            r#type,
            method: PaymentMethod::default(),
            amount,
            category: category.into(),
            note: String::new(),
            date,
        }
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Narrows the transaction history the way the history screen does: a case-insensitive search
/// over category and note, plus optional type and payment method filters.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct HistoryFilter {
    search: String,
    r#type: Option<TransactionType>,
    method: Option<PaymentMethod>,
}

impl HistoryFilter {
    pub fn new(
        search: impl AsRef<str>,
        r#type: Option<TransactionType>,
        method: Option<PaymentMethod>,
    ) -> Self {
        Self {
            search: search.as_ref().to_lowercase(),
            r#type,
            method,
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        let search_ok = self.search.is_empty()
            || transaction.category.to_lowercase().contains(&self.search)
            || transaction.note.to_lowercase().contains(&self.search);
        let type_ok = self.r#type.map_or(true, |t| t == transaction.r#type);
        let method_ok = self.method.map_or(true, |m| m == transaction.method);
        search_ok && type_ok && method_ok
    }
}
