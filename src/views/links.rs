use url::form_urlencoded;

pub const PAYOUTS_PATH: &str = "/admin/payouts";
pub const SCREEN_OPTIONS_PATH: &str = "/admin/screen-options";
pub const REGISTRATIONS_PATH: &str = "/admin/reports/registrations";
const AFFILIATES_PATH: &str = "/admin/affiliates";
const REFERRALS_PATH: &str = "/admin/referrals";

/// `path?k=v&...` with form encoding. Empty values are dropped.
pub fn admin_url(path: &str, params: &[(&str, String)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.iter().filter(|(_, value)| !value.is_empty()) {
        query.append_pair(key, value);
    }

    let query = query.finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

pub fn affiliate_url(affiliate_id: i64) -> String {
    admin_url(
        AFFILIATES_PATH,
        &[
            ("action", "view_affiliate".to_string()),
            ("affiliate_id", affiliate_id.to_string()),
        ],
    )
}

pub fn referral_url(referral_id: i64) -> String {
    admin_url(
        REFERRALS_PATH,
        &[
            ("action", "edit_referral".to_string()),
            ("referral_id", referral_id.to_string()),
        ],
    )
}

pub fn view_payout_url(payout_id: i64) -> String {
    admin_url(
        PAYOUTS_PATH,
        &[
            ("action", "view_payout".to_string()),
            ("payout_id", payout_id.to_string()),
        ],
    )
}

pub fn retry_payout_url(payout_id: i64) -> String {
    admin_url(
        PAYOUTS_PATH,
        &[
            ("action", "retry_payment".to_string()),
            ("payout_id", payout_id.to_string()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_url_encodes_and_skips_empty() {
        let url = admin_url(
            PAYOUTS_PATH,
            &[("status", String::new()), ("orderby", "payout method".to_string())],
        );

        assert_eq!(url, "/admin/payouts?orderby=payout+method");
        assert_eq!(admin_url(PAYOUTS_PATH, &[]), "/admin/payouts");
    }

    #[test]
    fn test_row_links() {
        assert_eq!(
            view_payout_url(4),
            "/admin/payouts?action=view_payout&payout_id=4"
        );
        assert_eq!(
            referral_url(12),
            "/admin/referrals?action=edit_referral&referral_id=12"
        );
    }
}
