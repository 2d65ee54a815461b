use crate::commands::{open_finance, Out};
use crate::model::{Categories, TransactionType};
use crate::{Config, Result};
use anyhow::ensure;

/// Lists the categories of `r#type`, or of both types when it is `None`.
pub async fn list_categories(
    config: &Config,
    r#type: Option<TransactionType>,
) -> Result<Out<Categories>> {
    let finance = open_finance(config).await?;
    let all = finance.state().categories().clone();
    let mut message = String::new();
    for t in [TransactionType::Income, TransactionType::Expense] {
        if r#type.is_some_and(|wanted| wanted != t) {
            continue;
        }
        if !message.is_empty() {
            message.push('\n');
        }
        message.push_str(&format!("{t}: {}", all.list(t).join(", ")));
    }
    Ok(Out::new(message, all))
}

pub async fn add_category(
    config: &Config,
    r#type: TransactionType,
    name: &str,
) -> Result<Out<bool>> {
    let name = name.trim();
    ensure!(!name.is_empty(), "A category name cannot be empty");
    let mut finance = open_finance(config).await?;
    let added = finance.add_category(r#type, name);
    finance.flush().await?;
    let message = if added {
        format!("Added the {} category '{name}'", r#type)
    } else {
        format!("'{name}' is already a {} category", r#type)
    };
    Ok(Out::new(message, added))
}

/// Removes a category. Transactions already labelled with it keep their label.
pub async fn delete_category(
    config: &Config,
    r#type: TransactionType,
    name: &str,
) -> Result<Out<bool>> {
    let mut finance = open_finance(config).await?;
    let deleted = finance.delete_category(r#type, name);
    finance.flush().await?;
    let message = if deleted {
        format!("Deleted the {} category '{name}'", r#type)
    } else {
        format!("'{name}' is not a {} category, nothing was deleted", r#type)
    };
    Ok(Out::new(message, deleted))
}
