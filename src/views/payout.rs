use askama::Template;

use super::format::DisplayFormat;
use super::links::PAYOUTS_PATH;
use super::{referral_links, AffiliateLink, Link};
use crate::models::payouts::PayoutStatus;
use crate::services::payouts::PayoutDetails;

#[derive(Template)]
#[template(path = "payout.html")]
pub struct PayoutTemplate {
    pub payout_id: i64,
    pub affiliate: Option<AffiliateLink>,
    pub referrals: Vec<Link>,
    pub amount: String,
    pub payout_method: String,
    pub status: String,
    pub status_label: String,
    pub date: String,
    pub back_url: &'static str,
}

impl PayoutTemplate {
    pub fn new(details: &PayoutDetails, format: &DisplayFormat) -> Self {
        let payout = &details.payout;
        let payout_method = if payout.payout_method.trim().is_empty() {
            "(none)".to_string()
        } else {
            payout.payout_method.clone()
        };

        Self {
            payout_id: payout.payout_id,
            affiliate: details.affiliate.as_ref().map(AffiliateLink::from_summary),
            referrals: referral_links(&payout.referrals),
            amount: format.currency(payout.amount),
            payout_method,
            status: payout.status.to_ascii_lowercase(),
            status_label: PayoutStatus::label(&payout.status),
            date: format.date(payout.date),
            back_url: PAYOUTS_PATH,
        }
    }
}

/// Shown with a 404 when the requested payout does not exist.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
    pub back_url: &'static str,
}

impl ErrorTemplate {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            back_url: PAYOUTS_PATH,
        }
    }
}
