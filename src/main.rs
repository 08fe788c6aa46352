use clap::Parser;
use log::info;
use std::sync::Arc;

use referral_bot::bot::TelegramBot;
use referral_bot::config::BotConfig;
use referral_bot::db;
use referral_bot::migrations::MigrationManager;
use referral_bot::user_manager::UserManager;

#[derive(Parser)]
#[command(name = "referral-bot", version)]
#[command(about = "A Telegram bot that gates access behind a channel subscription and tracks referrals")]
struct Args {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        match e {
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // .env file not found, which is fine
            }
            _ => {
                eprintln!("warning: failed to load .env file: {}", e);
            }
        }
    }

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let _args = Args::parse();

    let config = Arc::new(BotConfig::from_env()?);
    info!("Loaded configuration: {:?}", config);

    let pool = db::create_pool(&config.database_url).await?;
    MigrationManager::run_migrations(&pool).await?;
    let user_manager = Arc::new(UserManager::new(pool));

    info!("Starting bot...");

    let bot = TelegramBot::new(config, user_manager);
    bot.run().await;

    Ok(())
}
