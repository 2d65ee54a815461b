//! Sources of record ids for transactions and reminders.

use std::fmt::Debug;
use uuid::Uuid;

/// Produces ids for new records. The finance store skips any id that is already in use, so a
/// source only needs to produce fresh ids eventually, not on every call.
pub trait IdSource: Debug + Send + Sync {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs in their simple (hyphen-free) form.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic ids: `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[test]
fn sequential_ids_test() {
    let mut ids = SequentialIds::new("t");
    assert_eq!(ids.next_id(), "t-1");
    assert_eq!(ids.next_id(), "t-2");
}

#[test]
fn random_ids_test() {
    let mut ids = RandomIds;
    let a = ids.next_id();
    let b = ids.next_id();
    assert_eq!(a.len(), 32);
    assert_ne!(a, b);
}
