//! Types that represent the core data model, such as `Transaction`, `Categories` and `Reminder`.
mod amount;
mod category;
mod reminder;
mod transaction;

pub use amount::{Amount, AmountError, MAX_AMOUNT};
pub use category::{Categories, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES};
pub use reminder::{NewReminder, Reminder};
pub use transaction::{HistoryFilter, NewTransaction, PaymentMethod, Transaction, TransactionType};
