use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::domain::errors::DomainError;
use crate::domain::ports::{PaymentGateway, PaymentIntent, PaymentIntentRequest};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Creates payment intents through the Stripe REST API. The browser confirms
/// the intent with the returned client secret.
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::PaymentGateway(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    fn intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.api_base)
    }
}

/// Form body for `POST /v1/payment_intents`.
fn form_params(request: &PaymentIntentRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("amount".to_string(), request.amount_minor.to_string()),
        ("currency".to_string(), request.currency.clone()),
    ];
    params.extend(
        request
            .metadata
            .iter()
            .map(|(k, v)| (format!("metadata[{k}]"), v.clone())),
    );
    params
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| format!("processor responded with {status}"))
}

impl PaymentGateway for StripeGateway {
    fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> BoxFuture<'_, Result<PaymentIntent, DomainError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.intents_url())
                .bearer_auth(&self.secret_key)
                .form(&form_params(&request))
                .send()
                .await
                .map_err(|e| DomainError::PaymentGateway(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(DomainError::PaymentGateway(error_message(status, &body)));
            }

            let intent: IntentResponse = response
                .json()
                .await
                .map_err(|e| DomainError::PaymentGateway(e.to_string()))?;
            intent
                .client_secret
                .map(|client_secret| PaymentIntent { client_secret })
                .ok_or_else(|| DomainError::PaymentGateway("intent has no client secret".into()))
        })
    }
}
