use crate::commands::Out;
use crate::{notifications, Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its `storage` subdirectory and an initial `config.json`.
///
/// # Errors
/// - Returns an error if the directory has already been initialized or a file operation fails.
pub async fn init(pocket_home: &Path) -> Result<Out<()>> {
    let config = Config::create(pocket_home)
        .await
        .context("Unable to create the data directory and config")?;
    let _ = notifications::setup_notifications().await;
    Ok(format!(
        "Created {}. Run 'pocket set-pin --pin <PIN>' to lock it with a PIN",
        config.root().display()
    )
    .into())
}
