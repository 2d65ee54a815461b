use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dated note the user wants to be reminded of, such as a bill that is due.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Reminder {
    pub(crate) id: String,
    pub(crate) note: String,
    pub(crate) date: DateTime<Utc>,
}

impl Reminder {
    pub(crate) fn from_new(id: String, new: NewReminder) -> Self {
        Self {
            id,
            note: new.note,
            date: new.date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// The data needed to create a reminder. The store assigns the id.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewReminder {
    pub note: String,
    pub date: DateTime<Utc>,
}

impl NewReminder {
    pub fn new(note: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            note: note.into(),
            date,
        }
    }
}
