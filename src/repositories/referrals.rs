use crate::models::referrals::{Referral, ReferralQuery};

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};

#[async_trait]
pub trait ReferralRepository: Send + Sync + 'static {
    async fn get_referrals(&self, query: &ReferralQuery) -> Result<Vec<Referral>, anyhow::Error>;

    async fn get_referral(&self, referral_id: i64) -> Result<Option<Referral>, anyhow::Error>;
}

#[derive(Clone)]
pub struct PgReferralRepository {
    conn: PgPool,
}

impl PgReferralRepository {
    pub fn new(conn: PgPool) -> Self {
        PgReferralRepository { conn }
    }
}

#[async_trait]
impl ReferralRepository for PgReferralRepository {
    async fn get_referrals(&self, query: &ReferralQuery) -> Result<Vec<Referral>, anyhow::Error> {
        let mut builder = QueryBuilder::new(
            "SELECT referral_id, affiliate_id, amount, status, date FROM referrals WHERE 1 = 1",
        );

        if let Some(status) = &query.status {
            builder.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(start) = query.date_start {
            builder.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = query.date_end {
            builder.push(" AND date <= ").push_bind(end);
        }
        builder.push(" ORDER BY referral_id ASC");

        let referrals = builder
            .build_query_as::<Referral>()
            .fetch_all(&self.conn)
            .await?;

        Ok(referrals)
    }

    async fn get_referral(&self, referral_id: i64) -> Result<Option<Referral>, anyhow::Error> {
        let referral = sqlx::query_as::<_, Referral>(
            "SELECT referral_id, affiliate_id, amount, status, date FROM referrals WHERE referral_id = $1",
        )
        .bind(referral_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(referral)
    }
}
