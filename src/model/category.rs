use crate::model::TransactionType;
use serde::{Deserialize, Serialize};

/// The income categories a fresh (or reset) store starts with.
pub const DEFAULT_INCOME_CATEGORIES: [&str; 5] = ["Maaş", "Satış", "Bonus", "Faiz", "Diğer"];

/// The expense categories a fresh (or reset) store starts with.
pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 6] =
    ["Gıda", "Ulaşım", "Eğlence", "Kira", "Fatura", "Genel"];

/// The two category lists, one per `TransactionType`. Labels are unique within a list and keep
/// their insertion order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Categories {
    #[serde(default = "default_income")]
    income_categories: Vec<String>,
    #[serde(default = "default_expense")]
    expense_categories: Vec<String>,
}

impl Default for Categories {
    fn default() -> Self {
        Self {
            income_categories: default_income(),
            expense_categories: default_expense(),
        }
    }
}

impl Categories {
    pub fn list(&self, r#type: TransactionType) -> &[String] {
        match r#type {
            TransactionType::Income => &self.income_categories,
            TransactionType::Expense => &self.expense_categories,
        }
    }

    pub fn contains(&self, r#type: TransactionType, name: &str) -> bool {
        self.list(r#type).iter().any(|c| c == name)
    }

    /// Appends `name` unless the list already has it. Returns whether the list changed.
    pub(crate) fn add(&mut self, r#type: TransactionType, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(r#type, &name) {
            return false;
        }
        self.list_mut(r#type).push(name);
        true
    }

    /// Removes every occurrence of `name`. Returns whether the list changed.
    pub(crate) fn remove(&mut self, r#type: TransactionType, name: &str) -> bool {
        let list = self.list_mut(r#type);
        let before = list.len();
        list.retain(|c| c != name);
        list.len() != before
    }

    fn list_mut(&mut self, r#type: TransactionType) -> &mut Vec<String> {
        match r#type {
            TransactionType::Income => &mut self.income_categories,
            TransactionType::Expense => &mut self.expense_categories,
        }
    }
}

fn default_income() -> Vec<String> {
    to_owned(&DEFAULT_INCOME_CATEGORIES)
}

fn default_expense() -> Vec<String> {
    to_owned(&DEFAULT_EXPENSE_CATEGORIES)
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
