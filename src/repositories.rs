//! Data access behind the payouts admin.
//!
//! Every store is reached through a trait so services can be handed the
//! PostgreSQL implementations in production and in-memory ones in tests.

pub mod affiliates;
pub mod gateway;
pub mod payouts;
pub mod preferences;
pub mod referrals;

#[cfg(test)]
pub mod memory;

pub use affiliates::{AffiliateRepository, PgAffiliateRepository};
pub use gateway::{HttpPaymentGateway, PaymentGateway};
pub use payouts::{PayoutRepository, PgPayoutRepository};
pub use preferences::{PgPreferenceRepository, PreferenceRepository};
pub use referrals::{PgReferralRepository, ReferralRepository};
