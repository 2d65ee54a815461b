use crate::storage::{self, Persister, Snapshot, Storage};
use crate::store::{Listeners, SubscriptionId};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, info};

/// The persisted authentication state: the PIN, if one has been set, and whether the current
/// session has been unlocked.
#[derive(Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthState {
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    is_authenticated: bool,
}

impl Snapshot for AuthState {
    const KEY: &'static str = "auth-storage";
}

impl AuthState {
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// A missing PIN accepts anything; that is how first-run setup gets in.
    fn accepts(&self, pin: &str) -> bool {
        match &self.password {
            None => true,
            Some(stored) => stored == pin,
        }
    }
}

impl Debug for AuthState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("is_authenticated", &self.is_authenticated)
            .finish()
    }
}

/// Gates access behind a single shared PIN.
///
/// The store performs no validation of the PIN it is given. Callers enforce format rules, such
/// as a minimum length, before calling [`AuthStore::set_password`].
#[derive(Debug)]
pub struct AuthStore {
    state: AuthState,
    persister: Persister,
    listeners: Listeners<AuthState>,
}

impl AuthStore {
    /// Rehydrates the store from `storage` and starts its background writer.
    pub async fn open(storage: Arc<dyn Storage>) -> Result<Self> {
        let state: AuthState = storage::load(storage.as_ref()).await?;
        debug!("Opened {state:?}");
        Ok(Self {
            state,
            persister: Persister::spawn(storage, AuthState::KEY),
            listeners: Listeners::default(),
        })
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn has_password(&self) -> bool {
        self.state.has_password()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Replaces the PIN and unlocks the session.
    pub fn set_password(&mut self, pin: impl Into<String>) {
        self.state.password = Some(pin.into());
        self.state.is_authenticated = true;
        info!("The PIN has been set");
        self.commit();
    }

    /// Unlocks the session if `pin` matches the stored PIN, or if no PIN has been set yet.
    /// On a mismatch nothing changes and `false` is returned.
    pub fn login(&mut self, pin: &str) -> bool {
        if !self.state.accepts(pin) {
            debug!("Login rejected");
            return false;
        }
        self.state.is_authenticated = true;
        self.commit();
        true
    }

    /// Locks the session. The PIN is kept.
    pub fn logout(&mut self) {
        self.state.is_authenticated = false;
        self.commit();
    }

    /// The same comparison `login` makes, without unlocking anything.
    pub fn check_pin(&self, pin: &str) -> bool {
        self.state.accepts(pin)
    }

    /// Registers `listener` to be called with the new state after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
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

    fn commit(&mut self) {
        self.listeners.notify(&self.state);
        self.persister.schedule(&self.state);
    }
}
