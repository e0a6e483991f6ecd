use std::sync::Arc;

use clap::{Parser, Subcommand};

use ajubot::bot::{build_registry, AjuBot};
use ajubot::infrastructure::adapters::telegram::TelegramAdapter;
use ajubot::infrastructure::config::Config;
use ajubot::infrastructure::resources::Resources;
use ajubot::infrastructure::timezone::gmt;

#[derive(Parser)]
#[command(name = "ajubot")]
#[command(about = "Telegram bot for the local developer community", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config and environment)
    #[arg(short, long)]
    token: Option<String>,

    /// Debug/dev mode
    #[arg(short, long)]
    dev: bool,
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
        Commands::Run => {
            run_bot(cli.config, cli.token, cli.dev);
        }
        Commands::Version => {
            println!("ajubot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(config_path: String, token_override: Option<String>, dev: bool) {
    // Load config, falling back to environment-only configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(error = %error, path = %config_path, "config not loaded, using environment");
            Config::default()
        }
    };
    config.resolve(token_override, dev);

    // Missing required parameters are a fatal usage error
    if let Err(error) = config.validate() {
        tracing::error!(error = %error, "incomplete configuration");
        std::process::exit(2);
    }
    let token = match config.require_token() {
        Ok(token) => token.to_string(),
        Err(error) => {
            tracing::error!(error = %error, "incomplete configuration");
            std::process::exit(2);
        }
    };

    tracing::info!(name = %config.bot.name, "starting bot");

    let config = Arc::new(config);
    let tz = gmt(config.community.timezone_hours);
    let resources = match Resources::new(&config, tz) {
        Ok(resources) => Arc::new(resources),
        Err(error) => {
            tracing::error!(error = %error, "failed to set up resources");
            std::process::exit(1);
        }
    };
    let registry = build_registry(&config, &resources, tz);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!(error = %error, "failed to start runtime");
            std::process::exit(1);
        }
    };
    runtime.block_on(async {
        let transport = TelegramAdapter::new(token);
        let bot = AjuBot::new(config, transport, registry);
        if let Err(error) = bot.run().await {
            tracing::error!(error = %error, "bot stopped with error");
            std::process::exit(1);
        }
    });
}

fn init_config() {
    let path = "config.yaml";
    if std::path::Path::new(path).exists() {
        tracing::error!(path, "config already exists, not overwriting");
        std::process::exit(1);
    }
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            if let Err(error) = std::fs::write(path, yaml) {
                tracing::error!(error = %error, "failed to write config");
                std::process::exit(1);
            }
            tracing::info!(path, "default config written");
        }
        Err(error) => {
            tracing::error!(error = %error, "failed to serialize default config");
            std::process::exit(1);
        }
    }
}
