use std::sync::Arc;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::{
    payouts::PayoutRequest, reports::ReportRequest, screen_options::ScreenOptionsRequest,
    ServiceError,
};
use crate::views::format::DisplayFormat;
use crate::views::links::{PAYOUTS_PATH, REGISTRATIONS_PATH, SCREEN_OPTIONS_PATH};
use crate::views::payout::ErrorTemplate;

pub mod payouts;
pub mod reports;

#[derive(Clone)]
pub struct AppState {
    pub payout_channel: mpsc::Sender<PayoutRequest>,
    pub report_channel: mpsc::Sender<ReportRequest>,
    pub screen_options_channel: mpsc::Sender<ScreenOptionsRequest>,
    pub format: Arc<DisplayFormat>,
    /// Admin whose screen options are read and written.
    pub admin_user_id: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PAYOUTS_PATH, get(payouts::payouts_page))
        .route(SCREEN_OPTIONS_PATH, post(payouts::save_screen_options))
        .route(REGISTRATIONS_PATH, get(reports::registrations_report))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(state: AppState, listen: &str) -> Result<(), anyhow::Error> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Sends a request to a service and waits for its reply.
pub(crate) async fn call<T, R>(
    channel: &mpsc::Sender<T>,
    request: impl FnOnce(oneshot::Sender<Result<R, ServiceError>>) -> T,
) -> Result<R, ServiceError> {
    let (response_tx, response_rx) = oneshot::channel();

    channel
        .send(request(response_tx))
        .await
        .map_err(|e| ServiceError::Internal(format!("Failed to process request: {}", e)))?;

    response_rx
        .await
        .map_err(|e| ServiceError::Internal(format!("Failed to receive response: {}", e)))?
}

pub(crate) fn render(template: impl Template) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("Failed to render template: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").into_response()
        }
    }
}

pub(crate) fn error_page(error: ServiceError) -> Response {
    let (status, title) = match &error {
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
        ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong"),
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Request failed: {}", error);
        "Internal server error.".to_string()
    } else {
        error.to_string()
    };

    let mut response = render(ErrorTemplate::new(title, &message));
    *response.status_mut() = status;
    response
}

/// Lowercases and keeps only `[a-z0-9_-]`, the shape of every action and status key.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;

    use super::*;
    use crate::repositories::memory::{self, MemoryStore};
    use crate::services::spawn_services;
    use crate::settings::Currency;

    pub const ADMIN: i64 = 1;

    pub fn test_server(store: Arc<MemoryStore>) -> TestServer {
        let state = spawn_services(
            &memory::repositories(store),
            DisplayFormat::new(Currency::default(), "%B %-d, %Y".to_string()),
            ADMIN,
        );

        TestServer::new(router(state)).unwrap()
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("View_Payout"), "view_payout");
        assert_eq!(sanitize_key("retry payment<script>"), "retrypaymentscript");
        assert_eq!(sanitize_key("-1"), "-1");
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_server(Arc::new(MemoryStore::new()));

        let response = server.get("/health").await;

        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }
}
