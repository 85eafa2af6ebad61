use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::repositories::{
    AffiliateRepository, PaymentGateway, PayoutRepository, PreferenceRepository,
    ReferralRepository,
};
use crate::settings::Settings;
use crate::views::format::DisplayFormat;

pub mod http;
pub mod payouts;
pub mod reports;
pub mod screen_options;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Repository error: {0} - {1}")]
    Repository(String, String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("External service error: {0} -> {1} => {2}")]
    ExternalService(String, String, String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// The stores every service draws from.
#[derive(Clone)]
pub struct Repositories {
    pub payouts: Arc<dyn PayoutRepository>,
    pub referrals: Arc<dyn ReferralRepository>,
    pub affiliates: Arc<dyn AffiliateRepository>,
    pub preferences: Arc<dyn PreferenceRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
}

/// Spawns one service per request type and returns the HTTP state wired to them.
pub fn spawn_services(
    repositories: &Repositories,
    format: DisplayFormat,
    admin_user_id: i64,
) -> http::AppState {
    let (payout_tx, mut payout_rx) = mpsc::channel(512);
    let (report_tx, mut report_rx) = mpsc::channel(512);
    let (screen_options_tx, mut screen_options_rx) = mpsc::channel(512);

    let mut payout_service = payouts::PayoutService::new();
    let mut report_service = reports::ReportService::new();
    let mut screen_options_service = screen_options::ScreenOptionsService::new();

    log::info!("Starting payout service.");
    let payout_handler = payouts::PayoutRequestHandler::new(repositories);
    tokio::spawn(async move {
        payout_service.run(payout_handler, &mut payout_rx).await;
    });

    log::info!("Starting report service.");
    let report_handler = reports::ReportRequestHandler::new(repositories.affiliates.clone());
    tokio::spawn(async move {
        report_service.run(report_handler, &mut report_rx).await;
    });

    log::info!("Starting screen options service.");
    let screen_options_handler =
        screen_options::ScreenOptionsRequestHandler::new(repositories.preferences.clone());
    tokio::spawn(async move {
        screen_options_service
            .run(screen_options_handler, &mut screen_options_rx)
            .await;
    });

    http::AppState {
        payout_channel: payout_tx,
        report_channel: report_tx,
        screen_options_channel: screen_options_tx,
        format: Arc::new(format),
        admin_user_id,
    }
}

pub async fn start_services(
    repositories: Repositories,
    settings: &Settings,
) -> Result<(), anyhow::Error> {
    let format = DisplayFormat::new(
        settings.admin.currency.clone(),
        settings.admin.date_format.clone(),
    );
    let state = spawn_services(&repositories, format, settings.admin.user_id);

    log::info!("Starting HTTP server on {}.", settings.server.listen);
    http::start_http_server(state, &settings.server.listen).await?;

    Ok(())
}
