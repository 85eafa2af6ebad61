use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Referral {
    pub referral_id: i64,
    pub affiliate_id: i64,
    pub amount: Decimal,
    pub status: String,
    pub date: NaiveDateTime,
}

#[derive(Clone, Debug, Default)]
pub struct ReferralQuery {
    pub status: Option<String>,
    pub date_start: Option<NaiveDateTime>,
    pub date_end: Option<NaiveDateTime>,
}

impl ReferralQuery {
    pub fn matches(&self, referral: &Referral) -> bool {
        self.status
            .as_ref()
            .map_or(true, |status| &referral.status == status)
            && self.date_start.map_or(true, |start| referral.date >= start)
            && self.date_end.map_or(true, |end| referral.date <= end)
    }
}
