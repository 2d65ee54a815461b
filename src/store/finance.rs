use crate::ids::IdSource;
use crate::model::{
    Categories, HistoryFilter, NewReminder, NewTransaction, Reminder, Transaction,
    TransactionType,
};
use crate::storage::{self, Persister, Snapshot, Storage};
use crate::store::{Listeners, SubscriptionId};
use crate::Result;
use chrono::{NaiveDate, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// The persisted finance state: transactions (newest first), reminders and both category lists.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FinanceState {
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    reminders: Vec<Reminder>,
    #[serde(flatten)]
    categories: Categories,
}

impl Snapshot for FinanceState {
    const KEY: &'static str = "finance-storage";
}

impl FinanceState {
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }
}

/// Income and expense sums, each non-negative.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Records transactions, reminders and categories, and answers aggregate questions about them.
#[derive(Debug)]
pub struct FinanceStore {
    state: FinanceState,
    ids: Box<dyn IdSource>,
    persister: Persister,
    listeners: Listeners<FinanceState>,
}

impl FinanceStore {
    /// Rehydrates the store from `storage` and starts its background writer. New records get
    /// their ids from `ids`.
    pub async fn open(storage: Arc<dyn Storage>, ids: Box<dyn IdSource>) -> Result<Self> {
        let state: FinanceState = storage::load(storage.as_ref()).await?;
        debug!(
            "Opened finance store with {} transactions and {} reminders",
            state.transactions.len(),
            state.reminders.len()
        );
        Ok(Self {
            state,
            ids,
            persister: Persister::spawn(storage, FinanceState::KEY),
            listeners: Listeners::default(),
        })
    }

    pub fn state(&self) -> &FinanceState {
        &self.state
    }

    /// All transactions, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        self.state.transactions()
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.state.transactions.iter().find(|t| t.id == id)
    }

    pub fn reminders(&self) -> &[Reminder] {
        self.state.reminders()
    }

    pub fn categories(&self, r#type: TransactionType) -> &[String] {
        self.state.categories.list(r#type)
    }

    /// Records a transaction and returns its id.
    ///
    /// The amount is clamped to `MAX_AMOUNT`. Afterwards the collection is sorted by date, newest
    /// first. A transaction dated the same instant as existing ones is placed after them.
    pub fn add_transaction(&mut self, new: NewTransaction) -> String {
        let id = self.fresh_id();
        let transaction = Transaction::from_new(id.clone(), new);
        debug!(
            "Adding {} transaction {id} of {}",
            transaction.r#type, transaction.amount
        );
        self.state.transactions.push(transaction);
        self.state
            .transactions
            .sort_by(|a, b| b.date.cmp(&a.date));
        self.commit();
        id
    }

    /// Removes the transaction with `id`. Returns `false`, changing nothing, if there is none.
    pub fn delete_transaction(&mut self, id: &str) -> bool {
        let before = self.state.transactions.len();
        self.state.transactions.retain(|t| t.id != id);
        if self.state.transactions.len() == before {
            debug!("No transaction {id} to delete");
            return false;
        }
        self.commit();
        true
    }

    /// Records a reminder and returns its id. Reminders keep insertion order.
    pub fn add_reminder(&mut self, new: NewReminder) -> String {
        let id = self.fresh_id();
        self.state
            .reminders
            .push(Reminder::from_new(id.clone(), new));
        self.commit();
        id
    }

    /// Removes the reminder with `id`. Returns `false`, changing nothing, if there is none.
    pub fn delete_reminder(&mut self, id: &str) -> bool {
        let before = self.state.reminders.len();
        self.state.reminders.retain(|r| r.id != id);
        if self.state.reminders.len() == before {
            return false;
        }
        self.commit();
        true
    }

    /// Appends `name` to the list for `type` unless it is already there (exact, case-sensitive).
    /// Returns whether the list changed.
    pub fn add_category(&mut self, r#type: TransactionType, name: impl Into<String>) -> bool {
        let added = self.state.categories.add(r#type, name);
        if added {
            self.commit();
        }
        added
    }

    /// Removes `name` from the list for `type`. Transactions that use it keep the label.
    /// Returns whether the list changed.
    pub fn delete_category(&mut self, r#type: TransactionType, name: &str) -> bool {
        let removed = self.state.categories.remove(r#type, name);
        if removed {
            let orphans = self
                .state
                .transactions
                .iter()
                .filter(|t| t.r#type == r#type && t.category == name)
                .count();
            if orphans > 0 {
                debug!("Deleted category '{name}' is still used by {orphans} transactions");
            }
            self.commit();
        }
        removed
    }

    /// Clears all transactions and reminders and restores the default category lists.
    pub fn reset_data(&mut self) {
        info!(
            "Resetting finance data, discarding {} transactions",
            self.state.transactions.len()
        );
        self.state = FinanceState::default();
        self.commit();
    }

    /// Income minus expenses over every transaction.
    pub fn total_balance(&self) -> Decimal {
        self.state
            .transactions
            .iter()
            .map(Transaction::signed_amount)
            .sum()
    }

    pub fn totals(&self) -> Totals {
        self.state
            .transactions
            .iter()
            .fold(Totals::default(), |mut totals, t| {
                match t.r#type {
                    TransactionType::Income => totals.income += t.amount.value(),
                    TransactionType::Expense => totals.expense += t.amount.value(),
                }
                totals
            })
    }

    /// The `n` newest transactions.
    pub fn recent(&self, n: usize) -> &[Transaction] {
        let transactions = self.transactions();
        &transactions[..n.min(transactions.len())]
    }

    /// Transactions matching `filter`, newest first.
    pub fn history(&self, filter: &HistoryFilter) -> Vec<&Transaction> {
        self.state
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .collect()
    }

    /// Transactions that fall on `day` when viewed in `tz`, newest first.
    pub fn on_day<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<&Transaction> {
        self.state
            .transactions
            .iter()
            .filter(|t| t.day_in(tz) == day)
            .collect()
    }

    /// Every day, in `tz`, that has at least one transaction.
    pub fn active_days<Tz: TimeZone>(&self, tz: &Tz) -> BTreeSet<NaiveDate> {
        self.state
            .transactions
            .iter()
            .map(|t| t.day_in(tz))
            .collect()
    }

    /// Registers `listener` to be called with the new state after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&FinanceState) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Waits for all scheduled writes, returning the last write error since the previous flush.
    pub async fn flush(&self) -> Result<()> {
        self.persister.flush().await
    }

    /// Draws ids until one is not used by any transaction or reminder.
    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            let taken = self.state.transactions.iter().any(|t| t.id == id)
                || self.state.reminders.iter().any(|r| r.id == id);
            if !taken {
                return id;
            }
            debug!("Skipping id {id}, it is already in use");
        }
    }

    fn commit(&mut self) {
        self.listeners.notify(&self.state);
        self.persister.schedule(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::model::{
        Amount, PaymentMethod, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES,
    };
    use crate::storage::MemoryStorage;
    use chrono::{DateTime, Duration, FixedOffset, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn open(storage: &MemoryStorage) -> FinanceStore {
        FinanceStore::open(
            Arc::new(storage.clone()),
            Box::new(SequentialIds::new("t")),
        )
        .await
        .unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn income(amount: u64, category: &str, date: &str) -> NewTransaction {
        NewTransaction::new(
            TransactionType::Income,
            Amount::from(amount),
            category,
            at(date),
        )
    }

    fn expense(amount: u64, category: &str, date: &str) -> NewTransaction {
        NewTransaction::new(
            TransactionType::Expense,
            Amount::from(amount),
            category,
            at(date),
        )
    }

    fn is_sorted_newest_first(transactions: &[Transaction]) -> bool {
        transactions.windows(2).all(|w| w[0].date() >= w[1].date())
    }

    #[tokio::test]
    async fn test_balance_and_order_scenario() {
        let mut store = open(&MemoryStorage::new()).await;
        let d1 = store.add_transaction(income(100, "Maaş", "2025-01-01T09:00:00Z"));
        let d2 = store.add_transaction(expense(40, "Gıda", "2025-01-02T09:00:00Z"));
        assert_eq!(store.total_balance(), Decimal::from(60));
        let order: Vec<&str> = store.transactions().iter().map(|t| t.id()).collect();
        assert_eq!(order, vec![d2.as_str(), d1.as_str()]);
    }

    #[tokio::test]
    async fn test_empty_balance_is_zero() {
        let store = open(&MemoryStorage::new()).await;
        assert_eq!(store.total_balance(), Decimal::ZERO);
        assert_eq!(store.totals(), Totals::default());
    }

    #[tokio::test]
    async fn test_always_sorted() {
        let mut store = open(&MemoryStorage::new()).await;
        let base = at("2025-06-01T00:00:00Z");
        for offset in [5, -3, 12, 0, 7, -20, 7, 1] {
            let date = base + Duration::hours(offset);
            store.add_transaction(NewTransaction::new(
                TransactionType::Expense,
                Amount::from(1),
                "Genel",
                date,
            ));
            assert!(is_sorted_newest_first(store.transactions()));
        }
        assert_eq!(store.transactions().len(), 8);
    }

    #[tokio::test]
    async fn test_equal_dates_keep_insertion_order() {
        let mut store = open(&MemoryStorage::new()).await;
        let first = store.add_transaction(expense(1, "Kira", "2025-02-01T00:00:00Z"));
        let second = store.add_transaction(expense(2, "Kira", "2025-02-01T00:00:00Z"));
        assert_eq!(store.transactions()[0].id(), first);
        assert_eq!(store.transactions()[1].id(), second);
    }

    #[tokio::test]
    async fn test_amount_is_clamped() {
        let mut store = open(&MemoryStorage::new()).await;
        let id = store.add_transaction(income(20_000_000_000, "Bonus", "2025-01-01T00:00:00Z"));
        let stored = store.transaction(&id).unwrap();
        assert_eq!(stored.amount().value(), Decimal::from(9_999_999_999u64));
    }

    #[tokio::test]
    async fn test_add_then_delete_restores_state() {
        let mut store = open(&MemoryStorage::new()).await;
        store.add_transaction(income(10, "Faiz", "2025-01-01T00:00:00Z"));
        store.add_transaction(expense(3, "Fatura", "2025-01-03T00:00:00Z"));
        let before = store.transactions().to_vec();

        let id = store.add_transaction(expense(7, "Ulaşım", "2025-01-02T00:00:00Z"));
        assert_eq!(store.transactions().len(), 3);
        assert!(store.delete_transaction(&id));
        assert_eq!(store.transactions(), before.as_slice());
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let mut store = open(&MemoryStorage::new()).await;
        store.add_transaction(income(10, "Faiz", "2025-01-01T00:00:00Z"));
        let calls = Arc::new(AtomicUsize::new(0));
        let sink = calls.clone();
        store.subscribe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!store.delete_transaction("nope"));
        assert!(!store.delete_reminder("nope"));
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ids_are_unique_after_reopen() {
        let storage = MemoryStorage::new();
        let mut store = open(&storage).await;
        let a = store.add_transaction(income(1, "Maaş", "2025-01-01T00:00:00Z"));
        let r = store.add_reminder(NewReminder::new("rent", at("2025-01-05T00:00:00Z")));
        store.flush().await.unwrap();

        // A fresh counter starts over at t-1, which is already taken.
        let mut reopened = open(&storage).await;
        let b = reopened.add_transaction(income(1, "Maaş", "2025-01-02T00:00:00Z"));
        assert_eq!(a, "t-1");
        assert_eq!(r, "t-2");
        assert_eq!(b, "t-3");
    }

    #[tokio::test]
    async fn test_categories() {
        let mut store = open(&MemoryStorage::new()).await;
        assert!(store.add_category(TransactionType::Expense, "Spor"));
        assert!(!store.add_category(TransactionType::Expense, "Spor"));
        let count = store
            .categories(TransactionType::Expense)
            .iter()
            .filter(|c| *c == "Spor")
            .count();
        assert_eq!(count, 1);

        assert!(store.delete_category(TransactionType::Income, "Bonus"));
        assert!(!store.delete_category(TransactionType::Income, "Bonus"));
        assert!(!store
            .categories(TransactionType::Income)
            .contains(&"Bonus".to_string()));
    }

    #[tokio::test]
    async fn test_delete_category_orphans_transactions() {
        let mut store = open(&MemoryStorage::new()).await;
        let id = store.add_transaction(expense(5, "Eğlence", "2025-01-01T00:00:00Z"));
        assert!(store.delete_category(TransactionType::Expense, "Eğlence"));
        assert_eq!(store.transaction(&id).unwrap().category(), "Eğlence");
    }

    #[tokio::test]
    async fn test_reset_data() {
        let mut store = open(&MemoryStorage::new()).await;
        store.add_transaction(income(10, "Maaş", "2025-01-01T00:00:00Z"));
        store.add_reminder(NewReminder::new("pay rent", at("2025-01-05T00:00:00Z")));
        store.add_category(TransactionType::Income, "Kira Geliri");
        store.delete_category(TransactionType::Expense, "Gıda");

        store.reset_data();
        assert!(store.transactions().is_empty());
        assert!(store.reminders().is_empty());
        assert_eq!(
            store.categories(TransactionType::Income),
            DEFAULT_INCOME_CATEGORIES
        );
        assert_eq!(
            store.categories(TransactionType::Expense),
            DEFAULT_EXPENSE_CATEGORIES
        );
    }

    #[tokio::test]
    async fn test_reminders() {
        let mut store = open(&MemoryStorage::new()).await;
        let late = store.add_reminder(NewReminder::new("late", at("2025-03-01T00:00:00Z")));
        let early = store.add_reminder(NewReminder::new("early", at("2025-01-01T00:00:00Z")));
        let ids: Vec<&str> = store.reminders().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![late.as_str(), early.as_str()]);
        assert!(store.delete_reminder(&late));
        assert_eq!(store.reminders().len(), 1);
        assert_eq!(store.reminders()[0].note(), "early");
    }

    #[tokio::test]
    async fn test_totals_recent_and_history() {
        let mut store = open(&MemoryStorage::new()).await;
        store.add_transaction(income(100, "Maaş", "2025-01-01T00:00:00Z"));
        store.add_transaction(
            expense(30, "Gıda", "2025-01-02T00:00:00Z")
                .with_method(PaymentMethod::Card)
                .with_note("Market"),
        );
        store.add_transaction(expense(20, "Ulaşım", "2025-01-03T00:00:00Z"));

        let totals = store.totals();
        assert_eq!(totals.income, Decimal::from(100));
        assert_eq!(totals.expense, Decimal::from(50));
        assert_eq!(totals.income - totals.expense, store.total_balance());

        assert_eq!(store.recent(2).len(), 2);
        assert_eq!(store.recent(2)[0].category(), "Ulaşım");
        assert_eq!(store.recent(10).len(), 3);

        let cards = store.history(&HistoryFilter::new("", None, Some(PaymentMethod::Card)));
        assert_eq!(cards.len(), 1);
        let market = store.history(&HistoryFilter::new("market", None, None));
        assert_eq!(market[0].category(), "Gıda");
        let expenses =
            store.history(&HistoryFilter::new("", Some(TransactionType::Expense), None));
        assert_eq!(expenses.len(), 2);
    }

    #[tokio::test]
    async fn test_calendar_queries() {
        let mut store = open(&MemoryStorage::new()).await;
        store.add_transaction(expense(1, "Gıda", "2025-05-10T22:30:00Z"));
        store.add_transaction(expense(2, "Gıda", "2025-05-10T08:00:00Z"));
        store.add_transaction(expense(3, "Gıda", "2025-05-12T12:00:00Z"));

        let day = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        assert_eq!(store.on_day(day, &Utc).len(), 2);

        let istanbul = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(store.on_day(day, &istanbul).len(), 1);

        let days: Vec<NaiveDate> = store.active_days(&istanbul).into_iter().collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 11).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_persists_and_rehydrates() {
        let storage = MemoryStorage::new();
        let mut store = open(&storage).await;
        store.add_transaction(income(100, "Maaş", "2025-01-01T00:00:00Z"));
        store.add_transaction(expense(40, "Gıda", "2025-01-02T00:00:00Z"));
        store.add_category(TransactionType::Expense, "Spor");
        store.flush().await.unwrap();

        let reopened = open(&storage).await;
        assert_eq!(reopened.state(), store.state());
        assert_eq!(reopened.total_balance(), Decimal::from(60));
    }

    #[tokio::test]
    async fn test_reads_see_mutation_before_flush() {
        let storage = MemoryStorage::new();
        storage.fail_writes(true);
        let mut store = open(&storage).await;
        store.add_transaction(income(5, "Faiz", "2025-01-01T00:00:00Z"));
        assert_eq!(store.transactions().len(), 1);
        assert!(store.flush().await.is_err());
        assert_eq!(storage.get(FinanceState::KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_snapshot_layout() {
        let storage = MemoryStorage::new();
        let mut store = open(&storage).await;
        store.add_transaction(income(100, "Maaş", "2025-01-01T00:00:00Z"));
        store.flush().await.unwrap();

        let raw = storage.get(FinanceState::KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["version"], 1);
        let state = &json["state"];
        assert_eq!(state["transactions"][0]["id"], "t-1");
        assert_eq!(state["transactions"][0]["type"], "income");
        assert_eq!(state["income_categories"][0], "Maaş");
        assert_eq!(state["expense_categories"].as_array().unwrap().len(), 6);
        assert!(state["reminders"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_without_reminders_loads() {
        let storage = MemoryStorage::new();
        storage
            .set(
                FinanceState::KEY,
                r#"{"version":1,"state":{"transactions":[],
                "income_categories":["A"],"expense_categories":["B"]}}"#
                    .to_string(),
            )
            .await
            .unwrap();
        let store = open(&storage).await;
        assert!(store.reminders().is_empty());
        assert_eq!(store.categories(TransactionType::Income), ["A".to_string()]);
    }

    #[tokio::test]
    async fn test_snapshot_without_categories_loads_defaults() {
        let storage = MemoryStorage::new();
        storage
            .set(
                FinanceState::KEY,
                r#"{"version":1,"state":{"transactions":[]}}"#.to_string(),
            )
            .await
            .unwrap();
        let store = open(&storage).await;
        assert_eq!(
            store.categories(TransactionType::Income),
            DEFAULT_INCOME_CATEGORIES
        );
        assert_eq!(
            store.categories(TransactionType::Expense),
            DEFAULT_EXPENSE_CATEGORIES
        );

        storage
            .set(
                FinanceState::KEY,
                r#"{"version":1,"state":{"income_categories":["A"]}}"#.to_string(),
            )
            .await
            .unwrap();
        let store = open(&storage).await;
        assert_eq!(store.categories(TransactionType::Income), ["A".to_string()]);
        assert_eq!(
            store.categories(TransactionType::Expense),
            DEFAULT_EXPENSE_CATEGORIES
        );
    }
}
