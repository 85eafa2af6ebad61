pub mod affiliates;
pub mod payouts;
pub mod referrals;
pub mod reports;
