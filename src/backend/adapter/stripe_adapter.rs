// src/backend/adapter/stripe_adapter.rs
use crate::adapter::http_outcall::{send, OutcallRequest};
use crate::error::VaultError;
use crate::models::config::AppConfig;
use crate::models::subscription::CheckoutSession;
use crate::services::ports::{CheckoutSpec, PaymentProvider, PriceSpec};
use crate::utils::crypto::idempotency_key;
use crate::utils::time::get_current_time_ms;
use serde::Deserialize;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Deserialize, Debug)]
struct StripePrice {
    id: String,
}

#[derive(Deserialize, Debug)]
struct StripeCheckoutSession {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

pub struct StripeGateway {
    secret_key: String,
}

impl StripeGateway {
    pub fn from_config(config: &AppConfig) -> Result<Self, VaultError> {
        let secret_key = config
            .stripe_secret_key
            .clone()
            .ok_or_else(|| VaultError::NotConfigured("Payment service not configured".to_string()))?;
        Ok(Self { secret_key })
    }

    async fn post_form(&self, path: &str, fields: &[(String, String)]) -> Result<Vec<u8>, VaultError> {
        let body = encode_form(fields);
        // Replicas derive the same key, so Stripe performs the call once.
        let key = idempotency_key(&[path, &body, &get_current_time_ms().to_string()]);
        let request = OutcallRequest::post(format!("{}{}", STRIPE_API_BASE, path), FORM_CONTENT_TYPE, body.into_bytes())
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .header("Idempotency-Key", key)
            .keep_keys(&["id", "url"]);
        Ok(send(request).await?.ensure_success("Stripe")?.body)
    }
}

/// RFC 3986 unreserved characters pass through, everything else is %XX.
pub fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

pub fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn price_fields(spec: &PriceSpec) -> Vec<(String, String)> {
    vec![
        ("unit_amount".to_string(), spec.unit_amount.to_string()),
        ("currency".to_string(), spec.currency.clone()),
        ("recurring[interval]".to_string(), spec.interval.clone()),
        ("product_data[name]".to_string(), spec.product_name.clone()),
    ]
}

pub fn checkout_fields(spec: &CheckoutSpec) -> Vec<(String, String)> {
    let mut fields = vec![
        ("mode".to_string(), "subscription".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("line_items[0][price]".to_string(), spec.price_id.clone()),
        ("line_items[0][quantity]".to_string(), spec.quantity.to_string()),
        ("success_url".to_string(), spec.success_url.clone()),
        ("cancel_url".to_string(), spec.cancel_url.clone()),
    ];
    for (key, value) in &spec.metadata {
        fields.push((format!("metadata[{}]", key), value.clone()));
    }
    fields
}

impl PaymentProvider for StripeGateway {
    async fn create_price(&self, spec: &PriceSpec) -> Result<String, VaultError> {
        let body = self.post_form("/prices", &price_fields(spec)).await?;
        let price: StripePrice = serde_json::from_slice(&body)
            .map_err(|e| VaultError::SerializationError(format!("Failed to parse Stripe price: {}", e)))?;
        Ok(price.id)
    }

    async fn create_checkout_session(&self, spec: &CheckoutSpec) -> Result<CheckoutSession, VaultError> {
        let body = self.post_form("/checkout/sessions", &checkout_fields(spec)).await?;
        let session: StripeCheckoutSession = serde_json::from_slice(&body)
            .map_err(|e| VaultError::SerializationError(format!("Failed to parse Stripe session: {}", e)))?;
        let url = session
            .url
            .ok_or_else(|| VaultError::HttpError("Stripe session has no url".to_string()))?;
        Ok(CheckoutSession { id: session.id, url })
    }
}
