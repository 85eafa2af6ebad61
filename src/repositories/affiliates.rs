use crate::models::affiliates::{Affiliate, AffiliateQuery};

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};

#[async_trait]
pub trait AffiliateRepository: Send + Sync + 'static {
    async fn get_affiliate(&self, affiliate_id: i64) -> Result<Option<Affiliate>, anyhow::Error>;

    async fn get_affiliate_name(&self, affiliate_id: i64) -> Result<Option<String>, anyhow::Error>;

    async fn get_affiliate_email(&self, affiliate_id: i64)
        -> Result<Option<String>, anyhow::Error>;

    async fn get_affiliates(&self, query: &AffiliateQuery)
        -> Result<Vec<Affiliate>, anyhow::Error>;
}

#[derive(Clone)]
pub struct PgAffiliateRepository {
    conn: PgPool,
}

impl PgAffiliateRepository {
    pub fn new(conn: PgPool) -> Self {
        PgAffiliateRepository { conn }
    }
}

#[async_trait]
impl AffiliateRepository for PgAffiliateRepository {
    async fn get_affiliate(&self, affiliate_id: i64) -> Result<Option<Affiliate>, anyhow::Error> {
        let affiliate = sqlx::query_as::<_, Affiliate>(
            "SELECT affiliate_id, name, email, date_registered FROM affiliates WHERE affiliate_id = $1",
        )
        .bind(affiliate_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(affiliate)
    }

    async fn get_affiliate_name(&self, affiliate_id: i64) -> Result<Option<String>, anyhow::Error> {
        let name: Option<Option<String>> =
            sqlx::query_scalar("SELECT name FROM affiliates WHERE affiliate_id = $1")
                .bind(affiliate_id)
                .fetch_optional(&self.conn)
                .await?;

        Ok(name.flatten().filter(|name| !name.is_empty()))
    }

    async fn get_affiliate_email(
        &self,
        affiliate_id: i64,
    ) -> Result<Option<String>, anyhow::Error> {
        let email: Option<Option<String>> =
            sqlx::query_scalar("SELECT email FROM affiliates WHERE affiliate_id = $1")
                .bind(affiliate_id)
                .fetch_optional(&self.conn)
                .await?;

        Ok(email.flatten())
    }

    async fn get_affiliates(
        &self,
        query: &AffiliateQuery,
    ) -> Result<Vec<Affiliate>, anyhow::Error> {
        let mut builder = QueryBuilder::new(
            "SELECT affiliate_id, name, email, date_registered FROM affiliates WHERE 1 = 1",
        );

        if let Some(after) = query.registered_after {
            builder.push(" AND date_registered >= ").push_bind(after);
        }
        if let Some(before) = query.registered_before {
            builder.push(" AND date_registered <= ").push_bind(before);
        }
        builder.push(" ORDER BY date_registered ASC");

        let affiliates = builder
            .build_query_as::<Affiliate>()
            .fetch_all(&self.conn)
            .await?;

        Ok(affiliates)
    }
}
