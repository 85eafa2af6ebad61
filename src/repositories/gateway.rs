use crate::models::payouts::Payout;

use anyhow::bail;
use async_trait::async_trait;
use serde_json::json;

/// The external service that actually moves money for a payout.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Asks the gateway to attempt the payment again and returns the status it
    /// reports for the payout.
    async fn retry_payment(&self, payout: &Payout) -> Result<String, anyhow::Error>;
}

pub struct HttpPaymentGateway {
    api_key: String,
    url: String,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(api_key: String, url: String) -> Self {
        Self {
            api_key,
            url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn retry_payment(&self, payout: &Payout) -> Result<String, anyhow::Error> {
        let payload = json!({
            "payoutId": payout.payout_id,
            "affiliateId": payout.affiliate_id,
            "amount": payout.amount.to_string(),
            "payoutMethod": payout.payout_method,
        });

        let response: serde_json::Value = self
            .client
            .post(format!("{}/payouts/{}/retry", self.url, payout.payout_id))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.get("status").and_then(|status| status.as_str()) {
            Some(status) => Ok(status.to_string()),
            None => bail!("Payment gateway: Bad response format."),
        }
    }
}
