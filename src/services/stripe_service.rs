//! Minimal Stripe REST client. Only the calls the portal makes itself live
//! here; everything else arrives through the webhook.

use anyhow::{Context, Result, bail};
use log::{info, warn};
use reqwest::Client;

use crate::constants::STRIPE_API_BASE;

pub struct StripeService {
    client: Client,
    secret_key: Option<String>,
    api_base: String,
}

impl StripeService {
    pub fn new(secret_key: Option<String>) -> Self {
        Self::with_base(secret_key, STRIPE_API_BASE)
    }

    pub fn with_base(secret_key: Option<String>, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    fn subscription_url(&self, stripe_subscription_id: &str) -> String {
        format!("{}/subscriptions/{}", self.api_base, stripe_subscription_id)
    }

    /// Cancels immediately. Returns `false` when no API key is configured.
    pub async fn cancel_subscription(&self, stripe_subscription_id: &str) -> Result<bool> {
        let Some(secret_key) = self.secret_key.as_deref() else {
            warn!(
                "STRIPE_SECRET_KEY not set; subscription {} canceled locally only",
                stripe_subscription_id
            );
            return Ok(false);
        };

        let response = self
            .client
            .delete(self.subscription_url(stripe_subscription_id))
            .bearer_auth(secret_key)
            .send()
            .await
            .context("Stripe request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Stripe rejected cancel of {}: {} {}", stripe_subscription_id, status, body);
        }

        info!("Canceled Stripe subscription {}", stripe_subscription_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_subscription_urls() {
        let stripe = StripeService::with_base(Some("sk_test".into()), "https://stripe.local/v1/");
        assert_eq!(
            stripe.subscription_url("sub_123"),
            "https://stripe.local/v1/subscriptions/sub_123"
        );
        assert!(stripe.is_configured());
    }

    #[actix_web::test]
    async fn unconfigured_client_skips_remote_cancel() {
        let stripe = StripeService::new(None);
        assert!(!stripe.cancel_subscription("sub_123").await.unwrap());
    }
}
