//! Maestro - slash command listener and local CLI.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use maestro_slack::{ActionKind, CommandEnvelope, CommandHandler, MaestroConfig};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use maestro_server::run_with_shutdown;

/// User name reported for commands run from the terminal.
const CLI_USER: &str = "cli";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Dice rolls and spell lookups for Slack
#[derive(Parser)]
#[command(name = "maestro")]
#[command(version)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the slash command listener (default)
    Serve(ServeArgs),
    /// Roll dice locally and print the response
    Roll(RollArgs),
    /// Look a spell up and print the response
    Spell(SpellArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Listen address
    #[arg(short, long, env = "MAESTRO_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    listen: String,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            listen: std::env::var("MAESTRO_LISTEN_ADDR")
                .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string()),
        }
    }
}

#[derive(Args)]
struct RollArgs {
    /// Number of dice to roll
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    num_dice: u32,

    /// Number of sides on each die
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    num_sides: u32,
}

#[derive(Args)]
struct SpellArgs {
    /// Name of the spell
    #[arg(long, value_parser = non_empty)]
    spell_name: String,
}

fn non_empty(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Err("spell name cannot be empty".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

/// Run one action locally and print the JSON response. Nothing is posted
/// to the webhook.
async fn run_local(config: &MaestroConfig, kind: ActionKind, argument_text: String) -> anyhow::Result<()> {
    let handler = CommandHandler::new(config)
        .context("failed to set up the command handler")?
        .without_notifier();
    let envelope = CommandEnvelope {
        command: kind.command().to_string(),
        argument_text,
        invoking_user: CLI_USER.to_string(),
    };

    let response = handler.execute(&envelope).await?;
    let json = serde_json::to_string_pretty(&response)?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.json_logs);

    let config = match MaestroConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config from environment: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        stage = config.stage().unwrap_or("unset"),
        region = config.region().unwrap_or("unset"),
        "Loaded configuration: {:?}",
        config
    );

    let result = match cli.command.unwrap_or_else(|| Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            info!("Press Ctrl+C to stop");
            run_with_shutdown(&config, &args.listen, shutdown_signal()).await
        }
        Command::Roll(args) => {
            let text = format!("{}+d{}", args.num_dice, args.num_sides);
            run_local(&config, ActionKind::DiceRoll, text).await
        }
        Command::Spell(args) => run_local(&config, ActionKind::IdentifySpell, args.spell_name).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
