use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::stripe::types::{
    Account, AccountLink, AccountLinkParams, AccountParams, CheckoutSession,
    CheckoutSessionParams,
};

const API_BASE: &str = "https://api.stripe.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse Stripe response: {0}")]
    ResponseParse(String),
}

/// Thin client over the Stripe REST API. Requests are form-encoded with
/// bracket notation; responses are JSON.
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            secret_key,
            api_base: API_BASE.to_string(),
        }
    }

    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, StripeError> {
        self.post_form("/checkout/sessions", &params.to_form()).await
    }

    pub async fn create_express_account(
        &self,
        params: &AccountParams,
    ) -> Result<Account, StripeError> {
        self.post_form("/accounts", &params.to_form()).await
    }

    pub async fn create_onboarding_link(
        &self,
        params: &AccountLinkParams,
    ) -> Result<AccountLink, StripeError> {
        self.post_form("/account_links", &params.to_form()).await
    }

    pub async fn retrieve_account(&self, account_id: &str) -> Result<Account, StripeError> {
        self.get(&format!("/accounts/{}", account_id)).await
    }

    async fn post_form<T>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, StripeError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(params)
            .send()
            .await
            .map_err(|e| StripeError::RequestFailed(e.to_string()))?;

        Self::read_response(response).await
    }

    async fn get<T>(&self, path: &str) -> Result<T, StripeError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(format!("{}{}", self.api_base, path))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| StripeError::RequestFailed(e.to_string()))?;

        Self::read_response(response).await
    }

    async fn read_response<T>(response: reqwest::Response) -> Result<T, StripeError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| StripeError::ResponseParse(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StripeError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body, status),
            })
        }
    }
}

/// Pull the human-readable message out of Stripe's `{"error": {...}}` body.
fn extract_error_message(body: &str, status: StatusCode) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        #[serde(default)]
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message_from_stripe_body() {
        let body = r#"{"error": {"type": "invalid_request_error", "message": "No such account"}}"#;
        assert_eq!(
            extract_error_message(body, StatusCode::NOT_FOUND),
            "No such account"
        );
    }

    #[test]
    fn test_extract_error_message_falls_back_to_status() {
        assert_eq!(
            extract_error_message("<html>gateway</html>", StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
    }
}
