use crate::commands::{open_auth, open_finance, open_finance_unchecked, Out};
use crate::{Config, Result};
use anyhow::bail;

/// Deletes every transaction and reminder and restores the default categories. The PIN and the
/// lock state are kept.
///
/// With no PIN set any `pin` is accepted and the lock state is not checked, the same as `login`.
///
/// # Errors
/// - Returns an error if `pin` does not match the stored PIN, or a PIN is set and the session is
///   locked.
pub async fn reset(config: &Config, pin: &str) -> Result<Out<()>> {
    let auth = open_auth(config).await?;
    if !auth.check_pin(pin) {
        bail!("Wrong PIN, nothing was reset");
    }
    let mut finance = if auth.has_password() {
        open_finance(config).await?
    } else {
        open_finance_unchecked(config).await?
    };
    let discarded = finance.transactions().len();
    finance.reset_data();
    finance.flush().await?;
    Ok(format!("Deleted {discarded} transactions and restored the default categories").into())
}
