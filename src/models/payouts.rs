use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Payout {
    pub payout_id: i64,
    pub affiliate_id: i64,
    pub referrals: Vec<i64>,
    pub amount: Decimal,
    pub payout_method: String,
    pub status: String,
    pub date: NaiveDateTime,
}

impl Payout {
    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case(PayoutStatus::FAILED)
    }
}

pub struct PayoutStatus;

impl PayoutStatus {
    pub const PAID: &'static str = "paid";
    pub const FAILED: &'static str = "failed";

    pub fn label(status: &str) -> String {
        match status.to_ascii_lowercase().as_str() {
            Self::PAID => "Paid".to_string(),
            Self::FAILED => "Failed".to_string(),
            _ => {
                let mut chars = status.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewPayout {
    pub affiliate_id: i64,
    pub referrals: Vec<i64>,
    pub amount: Decimal,
    pub payout_method: String,
    pub status: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PayoutUpdate {
    pub affiliate_id: Option<i64>,
    pub referrals: Option<Vec<i64>>,
    pub amount: Option<Decimal>,
    pub payout_method: Option<String>,
    pub status: Option<String>,
}

impl PayoutUpdate {
    pub fn is_empty(&self) -> bool {
        self.affiliate_id.is_none()
            && self.referrals.is_none()
            && self.amount.is_none()
            && self.payout_method.is_none()
            && self.status.is_none()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutOrderBy {
    #[default]
    PayoutId,
    Amount,
    Affiliate,
    PayoutMethod,
    Status,
    Date,
}

impl PayoutOrderBy {
    pub const SORTABLE: [PayoutOrderBy; 6] = [
        PayoutOrderBy::PayoutId,
        PayoutOrderBy::Amount,
        PayoutOrderBy::Affiliate,
        PayoutOrderBy::PayoutMethod,
        PayoutOrderBy::Status,
        PayoutOrderBy::Date,
    ];

    /// Unknown keys sort by payout id.
    pub fn parse(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "amount" => Self::Amount,
            "affiliate" | "affiliate_id" => Self::Affiliate,
            "payout_method" => Self::PayoutMethod,
            "status" => Self::Status,
            "date" => Self::Date,
            _ => Self::PayoutId,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::PayoutId => "payout_id",
            Self::Amount => "amount",
            Self::Affiliate => "affiliate",
            Self::PayoutMethod => "payout_method",
            Self::Status => "status",
            Self::Date => "date",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Affiliate => "affiliate_id",
            other => other.key(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(key: &str) -> Self {
        if key.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Filters accepted by `PayoutRepository::get_payouts` and `count`.
///
/// `number: None` returns every match. Pagination fields are ignored by `count`.
#[derive(Clone, Debug, Default)]
pub struct PayoutQuery {
    pub number: Option<i64>,
    pub offset: i64,
    pub payout_id: Option<i64>,
    pub affiliate_id: Option<i64>,
    pub status: Option<String>,
    pub payout_method: Option<String>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub orderby: PayoutOrderBy,
    pub order: SortOrder,
}

impl PayoutQuery {
    pub fn with_status(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    pub fn matches(&self, payout: &Payout) -> bool {
        self.payout_id.map_or(true, |id| payout.payout_id == id)
            && self.affiliate_id.map_or(true, |id| payout.affiliate_id == id)
            && self
                .status
                .as_ref()
                .map_or(true, |status| payout.status.eq_ignore_ascii_case(status))
            && self
                .payout_method
                .as_ref()
                .map_or(true, |method| &payout.payout_method == method)
            && self.amount_min.map_or(true, |min| payout.amount >= min)
            && self.amount_max.map_or(true, |max| payout.amount <= max)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PayoutCounts {
    pub paid: u64,
    pub failed: u64,
    pub total: u64,
}

impl PayoutCounts {
    pub fn new(paid: u64, failed: u64) -> Self {
        Self {
            paid,
            failed,
            total: paid + failed,
        }
    }

    /// Item count behind a status filter. Unknown filters count everything.
    pub fn for_status(&self, status: &str) -> u64 {
        match status {
            PayoutStatus::PAID => self.paid,
            PayoutStatus::FAILED => self.failed,
            _ => self.total,
        }
    }
}
