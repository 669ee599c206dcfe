use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tramtram::bot::Bot;
use tramtram::config::Config;
use tramtram::engine::{Engine, EngineConfig};
use tramtram::otp::{OtpClient, OtpConfig};
use tramtram::store::JsonStore;
use tramtram::transport::TelegramTransport;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let token = std::env::var("BOT_TOKEN").unwrap_or_else(|_| {
        eprintln!("BOT_TOKEN not set");
        std::process::exit(1);
    });

    let config_path =
        std::env::var("TRAMTRAM_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = Config::load(&config_path).expect("Failed to load configuration");
    tracing::info!(path = %config_path, "configuration loaded");

    let data_dir = std::env::var("TRAMTRAM_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let store = JsonStore::new(&data_dir);

    let provider = OtpClient::new(OtpConfig::new(config.otp_base_url.clone()))
        .expect("Failed to create OTP client");
    let transport =
        TelegramTransport::new(&token).expect("Failed to create Telegram client");

    let engine = Arc::new(
        Engine::new(provider, transport, store, EngineConfig::from(&config))
            .expect("Failed to load persisted state"),
    );

    let scheduler = engine.clone();
    tokio::spawn(async move { scheduler.run().await });

    let bot = Bot::new(engine);
    tokio::select! {
        _ = bot.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
}
