use async_trait::async_trait;
use sqlx::PgPool;

/// Per-user admin options, stored as text.
#[async_trait]
pub trait PreferenceRepository: Send + Sync + 'static {
    async fn get_option(&self, user_id: i64, option: &str)
        -> Result<Option<String>, anyhow::Error>;

    async fn set_option(&self, user_id: i64, option: &str, value: &str)
        -> Result<(), anyhow::Error>;
}

#[derive(Clone)]
pub struct PgPreferenceRepository {
    conn: PgPool,
}

impl PgPreferenceRepository {
    pub fn new(conn: PgPool) -> Self {
        PgPreferenceRepository { conn }
    }
}

#[async_trait]
impl PreferenceRepository for PgPreferenceRepository {
    async fn get_option(
        &self,
        user_id: i64,
        option: &str,
    ) -> Result<Option<String>, anyhow::Error> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT option_value FROM user_options WHERE user_id = $1 AND option_name = $2",
        )
        .bind(user_id)
        .bind(option)
        .fetch_optional(&self.conn)
        .await?;

        Ok(value)
    }

    async fn set_option(&self, user_id: i64, option: &str, value: &str) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
                INSERT INTO user_options (user_id, option_name, option_value)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, option_name)
                DO UPDATE SET option_value = EXCLUDED.option_value
            "#,
        )
        .bind(user_id)
        .bind(option)
        .bind(value)
        .execute(&self.conn)
        .await?;

        Ok(())
    }
}
