use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Affiliate {
    pub affiliate_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub date_registered: NaiveDateTime,
}

/// Registration window, both ends inclusive. Results come back oldest first.
#[derive(Clone, Debug, Default)]
pub struct AffiliateQuery {
    pub registered_after: Option<NaiveDateTime>,
    pub registered_before: Option<NaiveDateTime>,
}
