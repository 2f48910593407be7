//! turbonet CLI: loads configuration, opens the credential store and drives
//! the command bridge from the terminal.

mod cli;
mod config;
mod console;

use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use tracing::info;
use turbonet_bridge::bridge::CommandBridge;
use turbonet_bridge::client::ApiClient;
use turbonet_memory::{CredentialStore, InMemoryCredentialStore, SqliteCredentialStore};
use turbonet_types::config::{BridgeConfig, StoreBackend, StoreConfig};
use turbonet_types::error::TurboNetResult;

fn init_tracing_stderr(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(store: &StoreConfig) -> TurboNetResult<Arc<dyn CredentialStore>> {
    match store.backend {
        StoreBackend::Sqlite => Ok(Arc::new(SqliteCredentialStore::open(&store.path)?)),
        StoreBackend::Memory => {
            info!("Using in-memory credential store; bindings will not persist");
            Ok(Arc::new(InMemoryCredentialStore::new()))
        }
    }
}

fn build_bridge(config: BridgeConfig) -> TurboNetResult<CommandBridge> {
    let store = open_store(&config.store)?;
    let client = ApiClient::from_config(&config)?;
    info!(api_base = %client.base_url(), "TurboNET bridge ready");
    Ok(CommandBridge::new(Arc::new(config), store, Arc::new(client)))
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{context}: {err}");
    std::process::exit(1);
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap_or_else(|e| fail("Failed to start runtime", e))
}

fn cmd_check_config(config: BridgeConfig) {
    if let Err(e) = open_store(&config.store) {
        fail("Credential store unavailable", e);
    }
    match toml::to_string_pretty(&config) {
        Ok(rendered) => {
            println!("Configuration OK\n");
            print!("{rendered}");
        }
        Err(e) => fail("Failed to render configuration", e),
    }
}

fn cmd_console(config: BridgeConfig, user: &str) {
    let bridge = build_bridge(config).unwrap_or_else(|e| fail("Failed to start bridge", e));
    let rt = runtime();
    let result = rt.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        console::run_console(&bridge, user, stdin, &mut std::io::stdout()).await
    });
    match result {
        Ok(replies) => info!(replies, "Console input closed"),
        Err(e) => fail("Console I/O error", e),
    }
}

fn cmd_send(config: BridgeConfig, user: &str, text: &str) {
    let bridge = build_bridge(config).unwrap_or_else(|e| fail("Failed to start bridge", e));
    let rt = runtime();
    match rt.block_on(bridge.handle_message(user, text)) {
        Some(reply) => println!("{reply}"),
        None => info!("Message is not a command; no reply"),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = config::resolve_config(cli.config.as_deref())
        .unwrap_or_else(|e| fail("Invalid configuration", e));
    init_tracing_stderr(&config.log_level);

    match cli.command {
        Commands::CheckConfig => cmd_check_config(config),
        Commands::Console { user } => cmd_console(config, &user),
        Commands::Send { user, text } => cmd_send(config, &user, &text.join(" ")),
    }
}
