//! Error aliases shared by the stores, the storage backends and the CLI.

/// Every fallible operation in this crate reports an `anyhow::Error` with context attached.
pub type Error = anyhow::Error;

/// `Result` with the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
