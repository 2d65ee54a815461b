//! The two persisted state containers: [`AuthStore`] and [`FinanceStore`].
//!
//! Both follow the same pattern. A mutator runs synchronously on `&mut self`, updates the owned
//! state, calls every subscribed listener with the new state, and schedules a snapshot write.
//! Reads see the mutation immediately; durability follows once the background write lands, which
//! callers can wait for with `flush`.

mod auth;
mod finance;

pub use auth::{AuthState, AuthStore};
pub use finance::{FinanceState, FinanceStore, Totals};

use std::fmt::{Debug, Formatter};

/// Identifies a listener registered with `subscribe`, for passing to `unsubscribe`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// The listeners of one store, called in registration order.
pub(crate) struct Listeners<T> {
    next: u64,
    entries: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Debug for Listeners<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl<T> Listeners<T> {
    pub(crate) fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&self, state: &T) {
        for (_, listener) in &self.entries {
            listener(state);
        }
    }
}
