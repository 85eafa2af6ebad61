use crate::models::payouts::{NewPayout, Payout, PayoutQuery, PayoutStatus, PayoutUpdate};

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const PAYOUT_COLUMNS: &str =
    "payout_id, affiliate_id, referrals, amount, payout_method, status, date";

#[async_trait]
pub trait PayoutRepository: Send + Sync + 'static {
    async fn get_payouts(&self, query: &PayoutQuery) -> Result<Vec<Payout>, anyhow::Error>;

    async fn count(&self, query: &PayoutQuery) -> Result<u64, anyhow::Error>;

    async fn get_payout(&self, payout_id: i64) -> Result<Option<Payout>, anyhow::Error>;

    async fn add_payout(&self, payout: &NewPayout) -> Result<Payout, anyhow::Error>;

    async fn update_payout(
        &self,
        payout_id: i64,
        update: &PayoutUpdate,
    ) -> Result<Option<Payout>, anyhow::Error>;

    async fn delete_payout(&self, payout_id: i64) -> Result<bool, anyhow::Error>;
}

#[derive(Clone)]
pub struct PgPayoutRepository {
    conn: PgPool,
}

impl PgPayoutRepository {
    pub fn new(conn: PgPool) -> Self {
        PgPayoutRepository { conn }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PayoutQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(payout_id) = query.payout_id {
        builder.push(" AND payout_id = ").push_bind(payout_id);
    }
    if let Some(affiliate_id) = query.affiliate_id {
        builder.push(" AND affiliate_id = ").push_bind(affiliate_id);
    }
    if let Some(status) = &query.status {
        builder
            .push(" AND LOWER(status) = LOWER(")
            .push_bind(status.clone())
            .push(")");
    }
    if let Some(payout_method) = &query.payout_method {
        builder
            .push(" AND payout_method = ")
            .push_bind(payout_method.clone());
    }
    if let Some(amount_min) = query.amount_min {
        builder.push(" AND amount >= ").push_bind(amount_min);
    }
    if let Some(amount_max) = query.amount_max {
        builder.push(" AND amount <= ").push_bind(amount_max);
    }
}

#[async_trait]
impl PayoutRepository for PgPayoutRepository {
    async fn get_payouts(&self, query: &PayoutQuery) -> Result<Vec<Payout>, anyhow::Error> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM payouts", PAYOUT_COLUMNS));
        push_filters(&mut builder, query);

        // Column names come from a closed enum, never from request input.
        builder.push(format!(
            " ORDER BY {} {}",
            query.orderby.column(),
            query.order.sql()
        ));

        if let Some(number) = query.number {
            builder.push(" LIMIT ").push_bind(number);
        }
        if query.offset > 0 {
            builder.push(" OFFSET ").push_bind(query.offset);
        }

        let payouts = builder
            .build_query_as::<Payout>()
            .fetch_all(&self.conn)
            .await?;

        Ok(payouts)
    }

    async fn count(&self, query: &PayoutQuery) -> Result<u64, anyhow::Error> {
        let mut builder = QueryBuilder::new("SELECT COUNT(1) FROM payouts");
        push_filters(&mut builder, query);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.conn)
            .await?;

        Ok(count as u64)
    }

    async fn get_payout(&self, payout_id: i64) -> Result<Option<Payout>, anyhow::Error> {
        let payout = sqlx::query_as::<_, Payout>(&format!(
            "SELECT {} FROM payouts WHERE payout_id = $1",
            PAYOUT_COLUMNS
        ))
        .bind(payout_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(payout)
    }

    async fn add_payout(&self, payout: &NewPayout) -> Result<Payout, anyhow::Error> {
        let mut tx = self.conn.begin().await?;

        let created = sqlx::query_as::<_, Payout>(&format!(
            r#"INSERT INTO payouts
            (affiliate_id, referrals, amount, payout_method, status, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}"#,
            PAYOUT_COLUMNS
        ))
        .bind(payout.affiliate_id)
        .bind(payout.referrals.clone())
        .bind(payout.amount)
        .bind(&payout.payout_method)
        .bind(&payout.status)
        .bind(chrono::Utc::now().naive_utc())
        .fetch_one(&mut *tx)
        .await?;

        if created.status == PayoutStatus::PAID && !created.referrals.is_empty() {
            sqlx::query("UPDATE referrals SET status = 'paid' WHERE referral_id = ANY($1)")
                .bind(created.referrals.clone())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn update_payout(
        &self,
        payout_id: i64,
        update: &PayoutUpdate,
    ) -> Result<Option<Payout>, anyhow::Error> {
        let payout = sqlx::query_as::<_, Payout>(&format!(
            r#"UPDATE payouts SET
            affiliate_id = COALESCE($2, affiliate_id),
            referrals = COALESCE($3, referrals),
            amount = COALESCE($4, amount),
            payout_method = COALESCE($5, payout_method),
            status = COALESCE($6, status)
            WHERE payout_id = $1
            RETURNING {}"#,
            PAYOUT_COLUMNS
        ))
        .bind(payout_id)
        .bind(update.affiliate_id)
        .bind(update.referrals.clone())
        .bind(update.amount)
        .bind(update.payout_method.clone())
        .bind(update.status.clone())
        .fetch_optional(&self.conn)
        .await?;

        Ok(payout)
    }

    async fn delete_payout(&self, payout_id: i64) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM payouts WHERE payout_id = $1")
            .bind(payout_id)
            .execute(&self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
