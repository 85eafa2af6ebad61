//! Turns service results into what the admin pages render.

pub mod format;
pub mod links;
pub mod payout;
pub mod payouts;
pub mod registrations;

/// A labelled admin link.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub url: String,
    pub label: String,
}

/// Linked affiliate name followed by its id, or "(user deleted)".
#[derive(Clone, Debug, PartialEq)]
pub struct AffiliateLink {
    pub url: String,
    pub name: String,
    pub affiliate_id: i64,
}

impl AffiliateLink {
    pub fn from_summary(summary: &crate::services::payouts::AffiliateSummary) -> Self {
        Self {
            url: links::affiliate_url(summary.affiliate_id),
            name: summary.name.clone(),
            affiliate_id: summary.affiliate_id,
        }
    }
}

pub fn referral_links(referrals: &[i64]) -> Vec<Link> {
    referrals
        .iter()
        .map(|referral_id| Link {
            url: links::referral_url(*referral_id),
            label: referral_id.to_string(),
        })
        .collect()
}
