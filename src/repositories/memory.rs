//! In-memory stores used by the service, view and route tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::{AffiliateRepository, PaymentGateway, PayoutRepository, PreferenceRepository, ReferralRepository};
use crate::models::{
    affiliates::{Affiliate, AffiliateQuery},
    payouts::{NewPayout, Payout, PayoutOrderBy, PayoutQuery, PayoutUpdate, SortOrder},
    referrals::{Referral, ReferralQuery},
};
use crate::services::Repositories;

pub fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn payout(payout_id: i64, affiliate_id: i64, amount: i64, status: &str) -> Payout {
    Payout {
        payout_id,
        affiliate_id,
        referrals: vec![payout_id * 10, payout_id * 10 + 1],
        amount: Decimal::new(amount, 0),
        payout_method: "manual".to_string(),
        status: status.to_string(),
        date: datetime(2026, 9, payout_id as u32 % 28 + 1, 12, 0),
    }
}

pub fn referral(referral_id: i64, affiliate_id: i64, amount: i64, status: &str) -> Referral {
    Referral {
        referral_id,
        affiliate_id,
        amount: Decimal::new(amount, 0),
        status: status.to_string(),
        date: datetime(2026, 9, 15, 9, 0),
    }
}

pub fn affiliate(affiliate_id: i64, name: &str, date_registered: NaiveDateTime) -> Affiliate {
    Affiliate {
        affiliate_id,
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        date_registered,
    }
}

/// Wires one store in as every repository.
pub fn repositories(store: Arc<MemoryStore>) -> Repositories {
    Repositories {
        payouts: store.clone(),
        referrals: store.clone(),
        affiliates: store.clone(),
        preferences: store.clone(),
        gateway: store,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    payouts: RwLock<Vec<Payout>>,
    referrals: RwLock<Vec<Referral>>,
    affiliates: RwLock<Vec<Affiliate>>,
    options: RwLock<HashMap<(i64, String), String>>,
    failing_affiliates: RwLock<HashSet<i64>>,
    gateway_status: RwLock<Option<String>>,
    retried: RwLock<Vec<i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_payouts(self, payouts: Vec<Payout>) -> Self {
        *self.payouts.write().await = payouts;
        self
    }

    pub async fn with_referrals(self, referrals: Vec<Referral>) -> Self {
        *self.referrals.write().await = referrals;
        self
    }

    pub async fn with_affiliates(self, affiliates: Vec<Affiliate>) -> Self {
        *self.affiliates.write().await = affiliates;
        self
    }

    pub async fn with_gateway_status(self, status: &str) -> Self {
        *self.gateway_status.write().await = Some(status.to_string());
        self
    }

    /// `add_payout` fails for these affiliates.
    pub async fn failing_for(self, affiliate_ids: &[i64]) -> Self {
        self.failing_affiliates
            .write()
            .await
            .extend(affiliate_ids.iter().copied());
        self
    }

    pub async fn payouts(&self) -> Vec<Payout> {
        self.payouts.read().await.clone()
    }

    pub async fn retried(&self) -> Vec<i64> {
        self.retried.read().await.clone()
    }
}

fn compare(a: &Payout, b: &Payout, orderby: PayoutOrderBy) -> std::cmp::Ordering {
    match orderby {
        PayoutOrderBy::PayoutId => a.payout_id.cmp(&b.payout_id),
        PayoutOrderBy::Amount => a.amount.cmp(&b.amount),
        PayoutOrderBy::Affiliate => a.affiliate_id.cmp(&b.affiliate_id),
        PayoutOrderBy::PayoutMethod => a.payout_method.cmp(&b.payout_method),
        PayoutOrderBy::Status => a.status.cmp(&b.status),
        PayoutOrderBy::Date => a.date.cmp(&b.date),
    }
}

#[async_trait]
impl PayoutRepository for MemoryStore {
    async fn get_payouts(&self, query: &PayoutQuery) -> Result<Vec<Payout>, anyhow::Error> {
        let mut payouts: Vec<Payout> = self
            .payouts
            .read()
            .await
            .iter()
            .filter(|payout| query.matches(payout))
            .cloned()
            .collect();

        payouts.sort_by(|a, b| {
            let ordering = compare(a, b, query.orderby);
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let skipped = payouts.into_iter().skip(query.offset.max(0) as usize);
        Ok(match query.number {
            Some(number) => skipped.take(number.max(0) as usize).collect(),
            None => skipped.collect(),
        })
    }

    async fn count(&self, query: &PayoutQuery) -> Result<u64, anyhow::Error> {
        Ok(self
            .payouts
            .read()
            .await
            .iter()
            .filter(|payout| query.matches(payout))
            .count() as u64)
    }

    async fn get_payout(&self, payout_id: i64) -> Result<Option<Payout>, anyhow::Error> {
        Ok(self
            .payouts
            .read()
            .await
            .iter()
            .find(|payout| payout.payout_id == payout_id)
            .cloned())
    }

    async fn add_payout(&self, new: &NewPayout) -> Result<Payout, anyhow::Error> {
        if self.failing_affiliates.read().await.contains(&new.affiliate_id) {
            bail!("insert rejected for affiliate {}", new.affiliate_id);
        }

        let mut payouts = self.payouts.write().await;
        let payout_id = payouts.iter().map(|p| p.payout_id).max().unwrap_or(0) + 1;
        let payout = Payout {
            payout_id,
            affiliate_id: new.affiliate_id,
            referrals: new.referrals.clone(),
            amount: new.amount,
            payout_method: new.payout_method.clone(),
            status: new.status.clone(),
            date: datetime(2026, 10, 16, 8, 0),
        };
        payouts.push(payout.clone());

        let mut referrals = self.referrals.write().await;
        for referral in referrals.iter_mut() {
            if new.referrals.contains(&referral.referral_id) {
                referral.status = "paid".to_string();
            }
        }

        Ok(payout)
    }

    async fn update_payout(
        &self,
        payout_id: i64,
        update: &PayoutUpdate,
    ) -> Result<Option<Payout>, anyhow::Error> {
        let mut payouts = self.payouts.write().await;
        let Some(payout) = payouts.iter_mut().find(|p| p.payout_id == payout_id) else {
            return Ok(None);
        };

        if let Some(affiliate_id) = update.affiliate_id {
            payout.affiliate_id = affiliate_id;
        }
        if let Some(referrals) = &update.referrals {
            payout.referrals = referrals.clone();
        }
        if let Some(amount) = update.amount {
            payout.amount = amount;
        }
        if let Some(method) = &update.payout_method {
            payout.payout_method = method.clone();
        }
        if let Some(status) = &update.status {
            payout.status = status.clone();
        }

        Ok(Some(payout.clone()))
    }

    async fn delete_payout(&self, payout_id: i64) -> Result<bool, anyhow::Error> {
        let mut payouts = self.payouts.write().await;
        let before = payouts.len();
        payouts.retain(|payout| payout.payout_id != payout_id);

        Ok(payouts.len() < before)
    }
}

#[async_trait]
impl ReferralRepository for MemoryStore {
    async fn get_referrals(&self, query: &ReferralQuery) -> Result<Vec<Referral>, anyhow::Error> {
        Ok(self
            .referrals
            .read()
            .await
            .iter()
            .filter(|referral| query.matches(referral))
            .cloned()
            .collect())
    }

    async fn get_referral(&self, referral_id: i64) -> Result<Option<Referral>, anyhow::Error> {
        Ok(self
            .referrals
            .read()
            .await
            .iter()
            .find(|referral| referral.referral_id == referral_id)
            .cloned())
    }
}

#[async_trait]
impl AffiliateRepository for MemoryStore {
    async fn get_affiliate(&self, affiliate_id: i64) -> Result<Option<Affiliate>, anyhow::Error> {
        Ok(self
            .affiliates
            .read()
            .await
            .iter()
            .find(|affiliate| affiliate.affiliate_id == affiliate_id)
            .cloned())
    }

    async fn get_affiliate_name(&self, affiliate_id: i64) -> Result<Option<String>, anyhow::Error> {
        Ok(self
            .get_affiliate(affiliate_id)
            .await?
            .and_then(|affiliate| affiliate.name))
    }

    async fn get_affiliate_email(
        &self,
        affiliate_id: i64,
    ) -> Result<Option<String>, anyhow::Error> {
        Ok(self
            .get_affiliate(affiliate_id)
            .await?
            .and_then(|affiliate| affiliate.email))
    }

    async fn get_affiliates(
        &self,
        query: &AffiliateQuery,
    ) -> Result<Vec<Affiliate>, anyhow::Error> {
        let mut affiliates: Vec<Affiliate> = self
            .affiliates
            .read()
            .await
            .iter()
            .filter(|affiliate| {
                query
                    .registered_after
                    .map_or(true, |after| affiliate.date_registered >= after)
                    && query
                        .registered_before
                        .map_or(true, |before| affiliate.date_registered <= before)
            })
            .cloned()
            .collect();
        affiliates.sort_by_key(|affiliate| affiliate.date_registered);

        Ok(affiliates)
    }
}

#[async_trait]
impl PreferenceRepository for MemoryStore {
    async fn get_option(
        &self,
        user_id: i64,
        option: &str,
    ) -> Result<Option<String>, anyhow::Error> {
        Ok(self
            .options
            .read()
            .await
            .get(&(user_id, option.to_string()))
            .cloned())
    }

    async fn set_option(&self, user_id: i64, option: &str, value: &str) -> Result<(), anyhow::Error> {
        self.options
            .write()
            .await
            .insert((user_id, option.to_string()), value.to_string());

        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for MemoryStore {
    async fn retry_payment(&self, payout: &Payout) -> Result<String, anyhow::Error> {
        self.retried.write().await.push(payout.payout_id);

        match self.gateway_status.read().await.clone() {
            Some(status) => Ok(status),
            None => bail!("gateway unavailable"),
        }
    }
}
