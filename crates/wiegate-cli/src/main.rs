//! wiegate - Wiegand card reader access controller
//!
//! Runs the gate pipeline against simulated hardware and administers the
//! persisted user registry, audit log and device settings.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::AppConfig;

/// wiegate - Wiegand card reader access controller
#[derive(Parser, Debug)]
#[command(name = "wiegate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the configuration file)
    #[arg(long)]
    database: Option<String>,

    /// Use a volatile in-memory store instead of SQLite
    #[arg(long)]
    memory: bool,

    /// Log filter used when RUST_LOG is unset (overrides the configuration file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gate. Card reads are typed on stdin as bit strings; `open`,
    /// `status` and `clear` are also accepted
    Run,

    /// Manage authorized cards
    #[command(subcommand)]
    Users(UsersCommand),

    /// Print the audit log, oldest first
    Logs,

    /// Present cards to a simulated reader and print each decision
    Simulate {
        /// Cards as bit strings, e.g. 10110100
        #[arg(required = true)]
        cards: Vec<String>,
    },

    /// Show or change device network settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    /// List registered cards
    #[command(alias = "ls")]
    List,

    /// Register a card
    Add {
        /// Card UID in hex
        uid: String,

        /// Card holder name
        name: String,
    },

    /// Unregister a card
    #[command(alias = "rm")]
    Remove {
        /// Card UID in hex
        uid: String,
    },

    /// Unregister every card
    Clear,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print the stored settings
    Show,

    /// Store Wi-Fi station credentials
    Wifi { ssid: String, pass: String },

    /// Store mesh radio parameters
    Mesh {
        /// Channel, 11-26
        channel: u8,

        /// PAN id, decimal or 0x-prefixed hex
        #[arg(value_parser = parse_pan_id)]
        pan_id: u16,
    },
}

fn parse_pan_id(s: &str) -> std::result::Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid PAN id '{s}': {e}"))
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.database.database_path = path;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_tracing(&config.log_level);

    let store = commands::open_store(&config, cli.memory).await?;

    match cli.command {
        Commands::Run => commands::run(&config, store).await,
        Commands::Users(cmd) => match cmd {
            UsersCommand::List => commands::users_list(store).await,
            UsersCommand::Add { uid, name } => commands::users_add(store, &uid, &name).await,
            UsersCommand::Remove { uid } => commands::users_remove(store, &uid).await,
            UsersCommand::Clear => commands::users_clear(store).await,
        },
        Commands::Logs => commands::logs(store).await,
        Commands::Simulate { cards } => commands::simulate(&config, store, &cards).await,
        Commands::Settings(cmd) => match cmd {
            SettingsCommand::Show => commands::settings_show(store).await,
            SettingsCommand::Wifi { ssid, pass } => {
                commands::settings_wifi(store, &ssid, &pass).await
            }
            SettingsCommand::Mesh { channel, pan_id } => {
                commands::settings_mesh(store, channel, pan_id).await
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_users_add() {
        let cli = Cli::try_parse_from(["wiegate", "--memory", "users", "add", "B4", "Alice"]).unwrap();
        assert!(cli.memory);
        assert!(matches!(
            cli.command,
            Commands::Users(UsersCommand::Add { ref uid, ref name }) if uid == "B4" && name == "Alice"
        ));
    }

    #[test]
    fn test_simulate_needs_a_card() {
        assert!(Cli::try_parse_from(["wiegate", "simulate"]).is_err());
    }

    #[test]
    fn test_pan_id_formats() {
        assert_eq!(parse_pan_id("0x1A62"), Ok(0x1A62));
        assert_eq!(parse_pan_id("6754"), Ok(6754));
        assert!(parse_pan_id("0x10000").is_err());
        assert!(parse_pan_id("pan").is_err());
    }
}
