//! Sabor - terminal client for the Sabor & Fuego storefront.
//!
//! Runs one command and exits, or starts the interactive shell when no
//! command is given.
//!
//! # Configuration
//!
//! Read from the environment (and `.env`): `SABOR_API_URL`,
//! `SABOR_API_TOKEN`, `SABOR_DATA_DIR`, `SABOR_HTTP_TIMEOUT_SECS`,
//! `SENTRY_DSN`, `SENTRY_ENVIRONMENT`. Logs go to stderr and are filtered
//! by `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sabor_storefront::config::StorefrontConfig;
use sabor_storefront::error::AppError;
use sabor_storefront::shell::{Command, PASSWORD_PROMPT, Shell};
use sabor_storefront::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "sabor", version, about = "Sabor & Fuego storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    #[command(flatten)]
    Run(Command),
    /// Interactive shell (default)
    Shell,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sabor_storefront=info,sabor_core=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[allow(clippy::print_stderr)]
fn fail(message: &str) -> ExitCode {
    eprintln!("{message}");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration first: Sentry needs it
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => return fail(&AppError::from(e).user_message()),
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            let err = AppError::from(e);
            err.report();
            return fail(&err.user_message());
        }
    };
    let mut shell = Shell::new(state);

    let result = match cli.command.unwrap_or(CliCommand::Shell) {
        CliCommand::Shell => run_shell(&mut shell).await,
        CliCommand::Run(command) => run_once(&mut shell, command).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            fail(&e.user_message())
        }
    }
}

async fn run_shell(shell: &mut Shell) -> Result<(), AppError> {
    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    shell.run(input, &mut output).await?;
    Ok(())
}

async fn run_once(shell: &mut Shell, command: Command) -> Result<(), AppError> {
    let command = match command {
        Command::Login(mut args) if args.password.is_none() => {
            args.password = prompt_password().await?;
            Command::Login(args)
        }
        command => command,
    };

    let text = shell.execute(command).await?;
    let mut output = tokio::io::stdout();
    output.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        output.write_all(b"\n").await?;
    }
    output.flush().await?;
    Ok(())
}

async fn prompt_password() -> std::io::Result<Option<String>> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(PASSWORD_PROMPT.as_bytes()).await?;
    stderr.flush().await?;
    BufReader::new(tokio::io::stdin()).lines().next_line().await
}
