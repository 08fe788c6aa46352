use clap::Parser;
use dotenvy::dotenv;
use std::error::Error;

use referral_bot::db;
use referral_bot::user_manager::UserManager;

#[derive(Parser)]
#[command(name = "top_referrers")]
#[command(about = "List the users with the highest referral balance")]
struct Cli {
    /// Number of users to show
    #[arg(long, default_value_t = 20)]
    limit: i64,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    dotenv().ok();

    let cli = Cli::parse();
    if cli.limit <= 0 {
        return Err("--limit must be positive".into());
    }

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable is required")?;
    let pool = db::create_pool(&database_url).await?;
    let user_manager = UserManager::new(pool);

    let referrers = user_manager.top_referrers(cli.limit).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&referrers)?);
        return Ok(());
    }

    if referrers.is_empty() {
        println!("No referrals recorded yet.");
        return Ok(());
    }

    println!("{:>4}  {:>14}  {:>8}  {:>10}", "#", "user_id", "balance", "referred");
    for (rank, referrer) in referrers.iter().enumerate() {
        println!(
            "{:>4}  {:>14}  {:>8}  {:>10}",
            rank + 1,
            referrer.user_id,
            referrer.balance,
            referrer.referred_users
        );
    }

    Ok(())
}
