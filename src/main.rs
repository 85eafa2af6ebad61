use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

mod cli;
mod models;
mod repositories;
pub mod services;
pub mod settings;
mod views;

use repositories::{
    HttpPaymentGateway, PgAffiliateRepository, PgPayoutRepository, PgPreferenceRepository,
    PgReferralRepository,
};
use services::Repositories;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = cli::args::Args::parse();
    let settings = settings::Settings::new(&args.config)
        .map_err(|e| anyhow::anyhow!("Could not load config file {}: {}", args.config, e))?;

    init_logging(&args.log4rs)?;
    log::debug!("Loaded settings from {}.", args.config);

    let conn = PgPoolOptions::new()
        .max_connections(settings.postgres.max_connections)
        .connect(&settings.postgres.url)
        .await
        .map_err(|e| anyhow::anyhow!("Could not connect to database: {}", e))?;

    let repositories = Repositories {
        payouts: Arc::new(PgPayoutRepository::new(conn.clone())),
        referrals: Arc::new(PgReferralRepository::new(conn.clone())),
        affiliates: Arc::new(PgAffiliateRepository::new(conn.clone())),
        preferences: Arc::new(PgPreferenceRepository::new(conn)),
        gateway: Arc::new(HttpPaymentGateway::new(
            settings.gateway.api_key.clone(),
            settings.gateway.url.clone(),
        )),
    };

    cli::run(args.command, repositories, settings).await
}

fn init_logging(path: &str) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    match log4rs::init_file(path, Default::default()) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("[ERROR] Failed to initialize logging: {}", e);
            Err(anyhow::anyhow!("Could not initialize logging: {}", e))
        }
    }
}
