use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::repositories::PreferenceRepository;

pub const PAYOUTS_SCREEN_ID: &str = "affiliates_page_affiliate-wp-payouts";
pub const PER_PAGE_OPTION: &str = "affwp_edit_payouts_per_page";
pub const PER_PAGE_LABEL: &str = "Number of payouts per page:";
pub const PER_PAGE_DEFAULT: u64 = 30;
const PER_PAGE_MAX: u64 = 999;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenOption {
    pub option: &'static str,
    pub label: &'static str,
    pub default: u64,
}

/// Per-page option for the payouts screen. Other screens register nothing.
pub fn register(screen_id: &str) -> Option<ScreenOption> {
    if screen_id != PAYOUTS_SCREEN_ID {
        return None;
    }

    Some(ScreenOption {
        option: PER_PAGE_OPTION,
        label: PER_PAGE_LABEL,
        default: PER_PAGE_DEFAULT,
    })
}

/// Claims the payouts per-page option by handing back the submitted value.
/// Any other option keeps whatever `status` the caller already had.
pub fn set_screen_option<T>(status: T, option: &str, value: T) -> T {
    if option == PER_PAGE_OPTION {
        return value;
    }

    status
}

pub enum ScreenOptionsRequest {
    GetPerPage {
        user_id: i64,
        response: oneshot::Sender<Result<u64, ServiceError>>,
    },
    Save {
        user_id: i64,
        option: String,
        value: String,
        response: oneshot::Sender<Result<u64, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct ScreenOptionsRequestHandler {
    preferences: Arc<dyn PreferenceRepository>,
}

impl ScreenOptionsRequestHandler {
    pub fn new(preferences: Arc<dyn PreferenceRepository>) -> Self {
        Self { preferences }
    }

    pub async fn per_page(&self, user_id: i64) -> Result<u64, ServiceError> {
        let stored = self
            .preferences
            .get_option(user_id, PER_PAGE_OPTION)
            .await
            .map_err(|e| ServiceError::Repository("Preferences".to_string(), e.to_string()))?;

        Ok(stored
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|per_page| (1..=PER_PAGE_MAX).contains(per_page))
            .unwrap_or(PER_PAGE_DEFAULT))
    }

    /// Validates and stores a submitted screen option, returning the saved page size.
    pub async fn save(&self, user_id: i64, option: &str, value: &str) -> Result<u64, ServiceError> {
        let per_page = value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|per_page| (1..=PER_PAGE_MAX).contains(per_page))
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "Items per page must be a number between 1 and {}.",
                    PER_PAGE_MAX
                ))
            })?;

        let accepted = set_screen_option(None, option, Some(per_page)).ok_or_else(|| {
            ServiceError::InvalidInput(format!("Unknown screen option: {}.", option))
        })?;

        self.preferences
            .set_option(user_id, option, &accepted.to_string())
            .await
            .map_err(|e| ServiceError::Repository("Preferences".to_string(), e.to_string()))?;
        log::info!("Saved {} = {} for user {}.", option, accepted, user_id);

        Ok(accepted)
    }
}

#[async_trait]
impl RequestHandler<ScreenOptionsRequest> for ScreenOptionsRequestHandler {
    async fn handle_request(&self, request: ScreenOptionsRequest) {
        match request {
            ScreenOptionsRequest::GetPerPage { user_id, response } => {
                let per_page = self.per_page(user_id).await;
                let _ = response.send(per_page);
            }
            ScreenOptionsRequest::Save {
                user_id,
                option,
                value,
                response,
            } => {
                let saved = self.save(user_id, &option, &value).await;
                let _ = response.send(saved);
            }
        }
    }
}

pub struct ScreenOptionsService;

impl ScreenOptionsService {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Service<ScreenOptionsRequest, ScreenOptionsRequestHandler> for ScreenOptionsService {}
