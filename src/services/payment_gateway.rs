/// Hosted-checkout payment gateway adapter.
///
/// The orchestrator only depends on the `PaymentGateway` trait; the Stripe
/// implementation is a thin HTTP wrapper. Sessions carry the listing id and
/// buyer id as opaque metadata so gateway events can later be correlated
/// back to an order.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Network(String),

    #[error("gateway rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("gateway response could not be decoded: {0}")]
    Decode(String),

    #[error("gateway protocol error: {0}")]
    Protocol(String),
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub product_name: String,
    pub product_description: String,
    pub success_url: String,
    pub cancel_url: String,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
}

/// External checkout transaction handle. `url` is the hosted page the buyer
/// is redirected to; the gateway may omit it on expired sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError>;
}

/// Stripe Checkout over the form-encoded v1 API.
pub struct StripeCheckout {
    secret_key: String,
    http_client: Client,
}

impl StripeCheckout {
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            http_client: Client::new(),
        }
    }

    async fn decode_session(response: reqwest::Response) -> Result<CheckoutSession, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for StripeCheckout {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let params: Vec<(&str, String)> = vec![
            ("mode", "payment".into()),
            ("payment_method_types[0]", "card".into()),
            (
                "line_items[0][price_data][currency]",
                request.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                request.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                request.product_description.clone(),
            ),
            ("line_items[0][quantity]", "1".into()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("metadata[listing_id]", request.listing_id.to_string()),
            ("metadata[buyer_id]", request.buyer_id.to_string()),
        ];

        let response = self
            .http_client
            .post(format!("{}/checkout/sessions", STRIPE_API_BASE))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Self::decode_session(response).await
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        let response = self
            .http_client
            .get(format!("{}/checkout/sessions/{}", STRIPE_API_BASE, session_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Self::decode_session(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_decodes_from_gateway_json() {
        let session: CheckoutSession = serde_json::from_str(
            r#"{"id": "cs_test_123", "url": "https://checkout.example/pay/cs_test_123", "object": "checkout.session"}"#,
        )
        .unwrap();
        assert_eq!(session.id, "cs_test_123");
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.example/pay/cs_test_123")
        );
    }

    #[test]
    fn session_url_may_be_absent() {
        let session: CheckoutSession = serde_json::from_str(r#"{"id": "cs_test_123"}"#).unwrap();
        assert!(session.url.is_none());
    }
}
