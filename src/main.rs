use caderneta::args::{Args, Command, DeleteSubcommand, InsertSubcommand, UpdateSubcommand};
use caderneta::{commands, Config, Mode, Result};
use clap::Parser;
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
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for testing the program without a proxy deployment. When
    // CADERNETA_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Proxy.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.proxy_url()).await?.print(),

        Command::Show(show_args) => {
            let config = Config::load(home).await?;
            commands::show(config, mode, show_args.month()).await?.print()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(config, mode, list_args.entity()).await?.print()
        }

        Command::Insert(insert_args) => {
            let config = Config::load(home).await?;
            match insert_args.entity() {
                InsertSubcommand::Transaction(args) => {
                    commands::insert_transaction(config, mode, args.clone())
                        .await?
                        .print()
                }
                InsertSubcommand::Goal(args) => commands::insert_goal(config, mode, args.clone())
                    .await?
                    .print(),
                InsertSubcommand::Tag(args) => commands::insert_tag(config, mode, args.clone())
                    .await?
                    .print(),
            }
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            match update_args.entity() {
                UpdateSubcommand::Transaction(args) => {
                    commands::update_transaction(config, mode, args.clone())
                        .await?
                        .print()
                }
                UpdateSubcommand::Goal(args) => commands::update_goal(config, mode, args.clone())
                    .await?
                    .print(),
                UpdateSubcommand::Tag(args) => commands::update_tag(config, mode, args.clone())
                    .await?
                    .print(),
            }
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            match delete_args.entity() {
                DeleteSubcommand::Goal(args) => commands::delete_goal(config, mode, args.clone())
                    .await?
                    .print(),
                DeleteSubcommand::Tag(args) => commands::delete_tag(config, mode, args.clone())
                    .await?
                    .print(),
            }
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
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
