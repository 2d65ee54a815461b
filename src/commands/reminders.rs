use crate::commands::{open_finance, parse_date, Out};
use crate::model::{NewReminder, Reminder};
use crate::{notifications, Config, Result};
use anyhow::{ensure, Context};
use chrono::Local;

pub async fn list_reminders(config: &Config) -> Result<Out<Vec<Reminder>>> {
    let finance = open_finance(config).await?;
    let reminders = finance.reminders().to_vec();
    let mut message = format!("{} reminders", reminders.len());
    for r in &reminders {
        message.push_str(&format!(
            "\n{}  {}  {}",
            r.date().with_timezone(&Local).format("%Y-%m-%d"),
            r.id(),
            r.note()
        ));
    }
    Ok(Out::new(message, reminders))
}

/// Saves a reminder and hands it to the notification scheduler.
///
/// # Errors
/// - Returns an error if the note is empty or the date cannot be parsed.
/// - Returns an error if the session is locked.
pub async fn add_reminder(config: &Config, note: &str, date: &str) -> Result<Out<Reminder>> {
    let note = note.trim();
    ensure!(!note.is_empty(), "A reminder needs a note");
    let date = parse_date(date)?;

    let mut finance = open_finance(config).await?;
    let id = finance.add_reminder(NewReminder::new(note, date));
    finance.flush().await?;
    let _ = notifications::schedule_local_notification("pocket", note, date).await;

    let reminder = finance
        .reminders()
        .iter()
        .find(|r| r.id() == id)
        .cloned()
        .with_context(|| format!("Reminder {id} is missing right after being added"))?;
    Ok(Out::new(
        format!("Added reminder {id} for {}", date.with_timezone(&Local).format("%Y-%m-%d")),
        reminder,
    ))
}

pub async fn delete_reminder(config: &Config, id: &str) -> Result<Out<bool>> {
    let mut finance = open_finance(config).await?;
    let deleted = finance.delete_reminder(id);
    finance.flush().await?;
    let message = if deleted {
        format!("Deleted reminder {id}")
    } else {
        format!("There is no reminder {id}, nothing was deleted")
    };
    Ok(Out::new(message, deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_reminder_commands() {
        let env = TestEnv::unlocked().await;
        let config = env.config();

        assert!(add_reminder(&config, " ", "2025-05-01").await.is_err());
        assert!(add_reminder(&config, "Rent", "May first").await.is_err());

        let first = add_reminder(&config, "Rent", "2025-05-01")
            .await
            .unwrap()
            .structure()
            .unwrap()
            .clone();
        add_reminder(&config, "Phone bill", "2025-04-20")
            .await
            .unwrap();

        let out = list_reminders(&config).await.unwrap();
        let notes: Vec<&str> = out.structure().unwrap().iter().map(|r| r.note()).collect();
        assert_eq!(notes, vec!["Rent", "Phone bill"]);
        assert!(out.message().starts_with("2 reminders"));

        let out = delete_reminder(&config, first.id()).await.unwrap();
        assert_eq!(out.structure(), Some(&true));
        let out = delete_reminder(&config, first.id()).await.unwrap();
        assert_eq!(out.structure(), Some(&false));
        assert_eq!(
            list_reminders(&config).await.unwrap().structure().unwrap().len(),
            1
        );
    }
}
