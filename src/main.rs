use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;

use instantcmd::application::messaging::{FollowUpRouter, MessageDispatcher};
use instantcmd::application::services::builtin::{version_command, HelpCommand};
use instantcmd::application::services::{InstantCmd, RegistrySettings};
use instantcmd::domain::entities::{CommandRegistry, User};
use instantcmd::domain::traits::Bot;
use instantcmd::infrastructure::adapters::console::ConsoleAdapter;
use instantcmd::infrastructure::config::Config;
use instantcmd::infrastructure::script::ScriptEngine;
use instantcmd::infrastructure::storage::FileStore;

#[derive(Parser)]
#[command(name = "instantcmd")]
#[command(about = "A chat bot with runtime-defined commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_bot(cli.config),
        Commands::Version => {
            println!("instantcmd v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(cli.config),
    }
}

fn run_bot(config_path: String) {
    // Load config
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    tracing::info!("Starting bot: {}", config.bot.name);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return;
        }
    };
    rt.block_on(async {
        if let Err(e) = run_console_bot(config).await {
            tracing::error!("Bot stopped with error: {}", e);
        }
    });
}

async fn run_console_bot(config: Config) -> Result<(), instantcmd::application::errors::BotError> {
    let store = Arc::new(FileStore::open(&config.storage.path).await?);
    let engine = Arc::new(ScriptEngine::new(config.registry.max_script_operations));
    let registry = Arc::new(RwLock::new(CommandRegistry::new()));
    let followups = Arc::new(FollowUpRouter::new());

    let instant = InstantCmd::new(
        engine,
        registry.clone(),
        store,
        followups.clone(),
        RegistrySettings::from(&config.registry),
    );

    // Built-ins plus the management command
    {
        let mut reg = registry.write().await;
        for command in [
            HelpCommand::command(registry.clone()),
            version_command(),
            instant.clone().command(),
        ] {
            if let Err(e) = reg.register(command) {
                tracing::warn!("Failed to register built-in: {}", e);
            }
        }
    }

    // Reload persisted commands without blocking startup
    if config.registry.load_on_start {
        tokio::spawn(instant.clone().load_all());
    }

    // The console session runs as the first configured owner, or as an
    // implicit owner when none is configured.
    let mut owners = config.owner.ids.clone();
    if owners.is_empty() {
        tracing::info!("No owner configured; the console session acts as owner");
        owners.push("console".to_string());
    }
    let operator = owners[0].clone();

    let dispatcher = Arc::new(MessageDispatcher::new(
        &config.bot.prefix,
        registry,
        followups,
        owners,
        config.registry.message_limit,
    ));
    let bot: Arc<dyn Bot> = Arc::new(ConsoleAdapter::new(&config.bot.name));

    tracing::info!("Console session started; type commands, `exit` to quit");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        // Each message dispatches on its own task so a flow awaiting a
        // follow-up doesn't stall the input loop.
        let dispatcher = dispatcher.clone();
        let bot = bot.clone();
        let sender = User::new(operator.clone());
        tokio::spawn(async move {
            if let Err(e) = dispatcher
                .dispatch_text(&bot, "console", line, Some(sender))
                .await
            {
                tracing::error!("Dispatch failed: {}", e);
            }
        });
    }
    Ok(())
}

fn init_config(path: String) {
    let config = Config::default();
    match serde_yaml::to_string(&config) {
        Ok(yaml) => {
            if let Err(e) = std::fs::write(&path, yaml) {
                tracing::error!("Failed to write config: {}", e);
            } else {
                println!("Wrote default config to {}", path);
            }
        }
        Err(e) => tracing::error!("Failed to serialize config: {}", e),
    }
}
