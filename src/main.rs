use clap::Parser;
use pocket_ledger::args::{Args, CategoriesAction, Command, RemindersAction};
use pocket_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().pocket_home().path();

    // Every command other than init needs an existing config.
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),
        Command::SetPin(a) => {
            let config = Config::load(home).await?;
            commands::set_pin(&config, &a.pin).await?.print()
        }
        Command::Login(a) => {
            let config = Config::load(home).await?;
            commands::login(&config, &a.pin).await?.print()
        }
        Command::Logout => commands::logout(&Config::load(home).await?).await?.print(),
        Command::Status => commands::status(&Config::load(home).await?).await?.print(),
        Command::Add(a) => {
            let config = Config::load(home).await?;
            commands::add(&config, a.clone()).await?.print()
        }
        Command::Delete(a) => {
            let config = Config::load(home).await?;
            commands::delete(&config, &a.id).await?.print()
        }
        Command::History(a) => {
            let config = Config::load(home).await?;
            commands::history(&config, a.clone()).await?.print()
        }
        Command::Day(a) => {
            let config = Config::load(home).await?;
            commands::day(&config, a.date).await?.print()
        }
        Command::Balance => commands::balance(&Config::load(home).await?).await?.print(),

        Command::Categories(a) => {
            let config = Config::load(home).await?;
            match &a.action {
                CategoriesAction::List { r#type } => {
                    commands::list_categories(&config, *r#type).await?.print()
                }
                CategoriesAction::Add { r#type, name } => {
                    commands::add_category(&config, *r#type, name)
                        .await?
                        .print()
                }
                CategoriesAction::Delete { r#type, name } => {
                    commands::delete_category(&config, *r#type, name)
                        .await?
                        .print()
                }
            }
        }

        Command::Reminders(a) => {
            let config = Config::load(home).await?;
            match &a.action {
                RemindersAction::List => commands::list_reminders(&config).await?.print(),
                RemindersAction::Add { note, date } => {
                    commands::add_reminder(&config, note, date).await?.print()
                }
                RemindersAction::Delete { id } => {
                    commands::delete_reminder(&config, id).await?.print()
                }
            }
        }

        Command::Reset(a) => {
            let config = Config::load(home).await?;
            commands::reset(&config, &a.pin).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the given level for the library and the binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
