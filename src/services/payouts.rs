use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use tokio::sync::oneshot;

use super::{Repositories, RequestHandler, Service, ServiceError};
use crate::models::payouts::{
    NewPayout, Payout, PayoutCounts, PayoutOrderBy, PayoutQuery, PayoutStatus, PayoutUpdate,
    SortOrder,
};
use crate::models::referrals::ReferralQuery;
use crate::repositories::{
    AffiliateRepository, PaymentGateway, PayoutRepository, ReferralRepository,
};

pub const DEFAULT_PAYOUT_METHOD: &str = "cli";
pub const DEFAULT_REFERRAL_STATUS: &str = "unpaid";

pub enum PayoutRequest {
    ListPage {
        request: PayoutListRequest,
        response: oneshot::Sender<Result<PayoutPage, ServiceError>>,
    },
    GetDetails {
        payout_id: i64,
        response: oneshot::Sender<Result<PayoutDetails, ServiceError>>,
    },
    RetryPayment {
        payout_id: i64,
        response: oneshot::Sender<Result<Payout, ServiceError>>,
    },
}

/// One page of the admin payouts table.
#[derive(Clone, Debug)]
pub struct PayoutListRequest {
    /// Empty, `all` and `any` show every status.
    pub status: String,
    pub orderby: PayoutOrderBy,
    pub order: SortOrder,
    pub page: u64,
    pub per_page: u64,
}

impl PayoutListRequest {
    pub fn status_filter(&self) -> Option<&str> {
        match self.status.as_str() {
            "" | "all" | "any" => None,
            status => Some(status),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AffiliateSummary {
    pub affiliate_id: i64,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct PayoutRow {
    pub payout: Payout,
    /// `None` when the affiliate or its name no longer exists.
    pub affiliate: Option<AffiliateSummary>,
}

#[derive(Clone, Debug)]
pub struct PayoutPage {
    pub rows: Vec<PayoutRow>,
    pub counts: PayoutCounts,
    pub total_items: u64,
    pub total_pages: u64,
    pub page: u64,
    pub per_page: u64,
}

pub type PayoutDetails = PayoutRow;

#[derive(Clone, Debug)]
pub struct CreatePayouts {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_earnings: Decimal,
    pub payout_method: String,
    pub referral_status: String,
}

impl Default for CreatePayouts {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            min_earnings: Decimal::ZERO,
            payout_method: DEFAULT_PAYOUT_METHOD.to_string(),
            referral_status: DEFAULT_REFERRAL_STATUS.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PayoutOutcome {
    pub affiliate_id: i64,
    pub amount: Decimal,
    pub result: Result<Payout, String>,
}

#[derive(Clone, Debug, Default)]
pub struct PayoutBatch {
    pub referrals_found: usize,
    /// One entry per affiliate that met the minimum, in affiliate id order.
    pub outcomes: Vec<PayoutOutcome>,
}

#[derive(Clone)]
pub struct PayoutRequestHandler {
    payouts: Arc<dyn PayoutRepository>,
    referrals: Arc<dyn ReferralRepository>,
    affiliates: Arc<dyn AffiliateRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

fn repository_error(repository: &str, e: anyhow::Error) -> ServiceError {
    ServiceError::Repository(repository.to_string(), e.to_string())
}

impl PayoutRequestHandler {
    pub fn new(repositories: &Repositories) -> Self {
        PayoutRequestHandler {
            payouts: repositories.payouts.clone(),
            referrals: repositories.referrals.clone(),
            affiliates: repositories.affiliates.clone(),
            gateway: repositories.gateway.clone(),
        }
    }

    pub async fn status_counts(&self) -> Result<PayoutCounts, ServiceError> {
        let paid = self
            .payouts
            .count(&PayoutQuery::with_status(PayoutStatus::PAID))
            .await
            .map_err(|e| repository_error("Payouts", e))?;
        let failed = self
            .payouts
            .count(&PayoutQuery::with_status(PayoutStatus::FAILED))
            .await
            .map_err(|e| repository_error("Payouts", e))?;

        Ok(PayoutCounts::new(paid, failed))
    }

    pub async fn payouts_page(
        &self,
        request: &PayoutListRequest,
    ) -> Result<PayoutPage, ServiceError> {
        let counts = self.status_counts().await?;
        let per_page = request.per_page.max(1);
        let page = request.page.max(1);

        let offset = per_page.saturating_mul(page - 1);

        let query = PayoutQuery {
            number: Some(i64::try_from(per_page).unwrap_or(i64::MAX)),
            offset: i64::try_from(offset).unwrap_or(i64::MAX),
            status: request.status_filter().map(str::to_string),
            orderby: request.orderby,
            order: request.order,
            ..Default::default()
        };
        let payouts = self.list_payouts(&query).await?;

        let mut rows = Vec::with_capacity(payouts.len());
        for payout in payouts {
            let affiliate = self.affiliate_summary(payout.affiliate_id).await?;
            rows.push(PayoutRow { payout, affiliate });
        }

        let total_items = counts.for_status(request.status_filter().unwrap_or("any"));

        Ok(PayoutPage {
            rows,
            counts,
            total_items,
            total_pages: total_items.div_ceil(per_page),
            page,
            per_page,
        })
    }

    pub async fn list_payouts(&self, query: &PayoutQuery) -> Result<Vec<Payout>, ServiceError> {
        self.payouts
            .get_payouts(query)
            .await
            .map_err(|e| repository_error("Payouts", e))
    }

    pub async fn count_payouts(&self, query: &PayoutQuery) -> Result<u64, ServiceError> {
        self.payouts
            .count(query)
            .await
            .map_err(|e| repository_error("Payouts", e))
    }

    pub async fn get_payout(&self, payout_id: i64) -> Result<Payout, ServiceError> {
        self.payouts
            .get_payout(payout_id)
            .await
            .map_err(|e| repository_error("Payouts", e))?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Could not find the payout with ID {}.", payout_id))
            })
    }

    pub async fn payout_details(&self, payout_id: i64) -> Result<PayoutDetails, ServiceError> {
        let payout = self.get_payout(payout_id).await?;
        let affiliate = self.affiliate_summary(payout.affiliate_id).await?;

        Ok(PayoutRow { payout, affiliate })
    }

    pub async fn affiliate_email(&self, affiliate_id: i64) -> Result<Option<String>, ServiceError> {
        self.affiliates
            .get_affiliate_email(affiliate_id)
            .await
            .map_err(|e| repository_error("Affiliates", e))
    }

    async fn affiliate_summary(
        &self,
        affiliate_id: i64,
    ) -> Result<Option<AffiliateSummary>, ServiceError> {
        let name = self
            .affiliates
            .get_affiliate_name(affiliate_id)
            .await
            .map_err(|e| repository_error("Affiliates", e))?;
        let affiliate = self
            .affiliates
            .get_affiliate(affiliate_id)
            .await
            .map_err(|e| repository_error("Affiliates", e))?;

        Ok(match (affiliate, name) {
            (Some(affiliate), Some(name)) => Some(AffiliateSummary {
                affiliate_id: affiliate.affiliate_id,
                name,
            }),
            _ => None,
        })
    }

    /// Pays out every affiliate whose matching referrals add up to at least
    /// `min_earnings`. A failed insert is recorded and the batch carries on.
    pub async fn create_payouts(
        &self,
        request: &CreatePayouts,
    ) -> Result<PayoutBatch, ServiceError> {
        if request.min_earnings.is_sign_negative() {
            return Err(ServiceError::InvalidInput(
                "The minimum earnings amount cannot be negative.".to_string(),
            ));
        }

        let query = ReferralQuery {
            status: Some(request.referral_status.clone()),
            date_start: request
                .start_date
                .map(|date| date.and_time(NaiveTime::MIN)),
            date_end: match request.end_date {
                Some(date) => Some(date.and_hms_opt(23, 59, 59).ok_or_else(|| {
                    ServiceError::InvalidInput(format!("Invalid end date: {}.", date))
                })?),
                None => None,
            },
        };
        let referrals = self
            .referrals
            .get_referrals(&query)
            .await
            .map_err(|e| repository_error("Referrals", e))?;

        let mut earnings: BTreeMap<i64, (Vec<i64>, Decimal)> = BTreeMap::new();
        for referral in referrals.iter().filter(|r| r.status == request.referral_status) {
            let entry = earnings
                .entry(referral.affiliate_id)
                .or_insert_with(|| (Vec::new(), Decimal::ZERO));
            entry.0.push(referral.referral_id);
            entry.1 += referral.amount;
        }

        let mut batch = PayoutBatch {
            referrals_found: referrals.len(),
            outcomes: Vec::new(),
        };

        for (affiliate_id, (referral_ids, amount)) in earnings {
            if amount < request.min_earnings {
                log::debug!(
                    "Skipping affiliate {}: {} is below the minimum of {}.",
                    affiliate_id,
                    amount,
                    request.min_earnings
                );
                continue;
            }

            let new_payout = NewPayout {
                affiliate_id,
                referrals: referral_ids,
                amount,
                payout_method: request.payout_method.clone(),
                status: PayoutStatus::PAID.to_string(),
            };
            let result = self.payouts.add_payout(&new_payout).await.map_err(|e| {
                log::warn!("Could not create payout for affiliate {}: {}", affiliate_id, e);
                e.to_string()
            });
            if let Ok(payout) = &result {
                log::info!(
                    "Created payout {} for affiliate {} ({}).",
                    payout.payout_id,
                    affiliate_id,
                    amount
                );
            }

            batch.outcomes.push(PayoutOutcome {
                affiliate_id,
                amount,
                result,
            });
        }

        Ok(batch)
    }

    pub async fn update_payout(
        &self,
        payout_id: i64,
        update: &PayoutUpdate,
    ) -> Result<Payout, ServiceError> {
        if update.is_empty() {
            return Err(ServiceError::InvalidInput(
                "No fields were given to update.".to_string(),
            ));
        }

        self.payouts
            .update_payout(payout_id, update)
            .await
            .map_err(|e| repository_error("Payouts", e))?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Could not find the payout with ID {}.", payout_id))
            })
    }

    pub async fn delete_payout(&self, payout_id: i64) -> Result<bool, ServiceError> {
        let deleted = self
            .payouts
            .delete_payout(payout_id)
            .await
            .map_err(|e| repository_error("Payouts", e))?;

        if deleted {
            log::info!("Deleted payout {}.", payout_id);
        }

        Ok(deleted)
    }

    /// Hands a failed payout back to the payment gateway once and stores the
    /// status it reports.
    pub async fn retry_payment(&self, payout_id: i64) -> Result<Payout, ServiceError> {
        let payout = self.get_payout(payout_id).await?;
        if !payout.is_failed() {
            return Err(ServiceError::InvalidInput(format!(
                "Payout #{} has not failed and cannot be retried.",
                payout_id
            )));
        }

        let status = self.gateway.retry_payment(&payout).await.map_err(|e| {
            ServiceError::ExternalService(
                "PayoutService".to_string(),
                "PaymentGateway".to_string(),
                e.to_string(),
            )
        })?;
        log::info!("Retried payment for payout {}: {}.", payout_id, status);

        let update = PayoutUpdate {
            status: Some(status),
            ..Default::default()
        };
        self.update_payout(payout_id, &update).await
    }
}

#[async_trait]
impl RequestHandler<PayoutRequest> for PayoutRequestHandler {
    async fn handle_request(&self, request: PayoutRequest) {
        match request {
            PayoutRequest::ListPage { request, response } => {
                let page = self.payouts_page(&request).await;
                let _ = response.send(page);
            }
            PayoutRequest::GetDetails {
                payout_id,
                response,
            } => {
                let details = self.payout_details(payout_id).await;
                let _ = response.send(details);
            }
            PayoutRequest::RetryPayment {
                payout_id,
                response,
            } => {
                let payout = self.retry_payment(payout_id).await;
                let _ = response.send(payout);
            }
        }
    }
}

pub struct PayoutService;

impl PayoutService {
    pub fn new() -> Self {
        PayoutService {}
    }
}

#[async_trait]
impl Service<PayoutRequest, PayoutRequestHandler> for PayoutService {}
