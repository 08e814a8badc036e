//! Reqwest-backed payment gateway adapter.
//!
//! This adapter owns transport details only: form encoding, authentication,
//! idempotency headers, timeout and HTTP error mapping, and JSON decoding
//! into port types.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::dto::{
    AccountDto, AccountLinkDto, CheckoutSessionDto, ErrorEnvelopeDto, ListDto, ObjectDto,
    checkout_session_form, connected_account_form, onboarding_link_form, payment_intent_form,
};
use crate::domain::ports::{
    CheckoutSession, CheckoutSessionRequest, CheckoutSessionStatus, ConnectedAccountStatus,
    OnboardingLinkRequest, PaymentGateway, PaymentGatewayError, PaymentIntentRequest,
};

/// Processor API secret, zeroed on drop and redacted in `Debug`.
#[derive(Clone)]
pub struct ProcessorSecret(Zeroizing<String>);

impl ProcessorSecret {
    /// Wrap a raw secret key.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ProcessorSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProcessorSecret(***)")
    }
}

/// Payment gateway that talks to a Stripe-compatible REST API.
pub struct HttpPaymentGateway {
    client: Client,
    base_url: Url,
    secret: ProcessorSecret,
}

impl HttpPaymentGateway {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        mut base_url: Url,
        secret: ProcessorSecret,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        // `Url::join` replaces the last segment unless the base ends in `/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            secret,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentGatewayError> {
        self.base_url
            .join(path)
            .map_err(|err| PaymentGatewayError::transport(format!("invalid endpoint {path}: {err}")))
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, PaymentGatewayError> {
        Ok(self
            .client
            .get(self.endpoint(path)?)
            .bearer_auth(self.secret.expose()))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, PaymentGatewayError> {
        Ok(self
            .client
            .post(self.endpoint(path)?)
            .bearer_auth(self.secret.expose()))
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, PaymentGatewayError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        let error = map_status_error(status, body.as_ref());
        warn!(status = status.as_u16(), error = %error, "payment processor call failed");
        return Err(error);
    }
    serde_json::from_slice(body.as_ref()).map_err(|err| {
        PaymentGatewayError::decode(format!("invalid processor JSON payload: {err}"))
    })
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, PaymentGatewayError> {
        let request = self
            .get("v1/customers")?
            .query(&[("email", email), ("limit", "1")]);
        let list: ListDto = send(request).await?;
        Ok(list.data.into_iter().next().map(|customer| customer.id))
    }

    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<String, PaymentGatewayError> {
        let builder = self
            .post("v1/payment_intents")?
            .header("Idempotency-Key", request.idempotency_key.as_str())
            .form(&payment_intent_form(request));
        let intent: ObjectDto = send(builder).await?;
        debug!(intent_id = %intent.id, "payment intent created");
        Ok(intent.id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let builder = self
            .post("v1/checkout/sessions")?
            .form(&checkout_session_form(request));
        let session: CheckoutSessionDto = send(builder).await?;
        let url = session
            .url
            .ok_or_else(|| PaymentGatewayError::decode("checkout session has no url"))?;
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionStatus, PaymentGatewayError> {
        let path = format!("v1/checkout/sessions/{}", path_segment(session_id)?);
        let session: CheckoutSessionDto = send(self.get(&path)?).await?;
        Ok(session.into_status())
    }

    async fn create_connected_account(
        &self,
        email: Option<String>,
    ) -> Result<String, PaymentGatewayError> {
        let builder = self
            .post("v1/accounts")?
            .form(&connected_account_form(email.as_deref()));
        let account: ObjectDto = send(builder).await?;
        Ok(account.id)
    }

    async fn create_onboarding_link(
        &self,
        request: &OnboardingLinkRequest,
    ) -> Result<String, PaymentGatewayError> {
        let builder = self
            .post("v1/account_links")?
            .form(&onboarding_link_form(request));
        let link: AccountLinkDto = send(builder).await?;
        Ok(link.url)
    }

    async fn retrieve_connected_account(
        &self,
        account_id: &str,
    ) -> Result<ConnectedAccountStatus, PaymentGatewayError> {
        let path = format!("v1/accounts/{}", path_segment(account_id)?);
        let account: AccountDto = send(self.get(&path)?).await?;
        Ok(account.into())
    }
}

/// Reject identifiers that would escape their path segment.
fn path_segment(id: &str) -> Result<&str, PaymentGatewayError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if valid {
        Ok(id)
    } else {
        Err(PaymentGatewayError::rejected(format!(
            "invalid processor identifier: {id}"
        )))
    }
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let message = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("status {}", status.as_u16()));

    match status {
        StatusCode::TOO_MANY_REQUESTS => PaymentGatewayError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PaymentGatewayError::timeout(message)
        }
        _ if status.is_client_error() => PaymentGatewayError::rejected(message),
        _ => PaymentGatewayError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "Rejected")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "Transport")]
    fn maps_http_statuses_to_gateway_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{}");
        let matched = match expected {
            "RateLimited" => matches!(error, PaymentGatewayError::RateLimited { .. }),
            "Timeout" => matches!(error, PaymentGatewayError::Timeout { .. }),
            "Rejected" => matches!(error, PaymentGatewayError::Rejected { .. }),
            "Transport" => matches!(error, PaymentGatewayError::Transport { .. }),
            _ => false,
        };
        assert!(matched, "{status} mapped to {error:?}");
    }

    #[rstest]
    fn processor_message_is_preserved() {
        let body = br#"{"error":{"type":"invalid_request_error","message":"No such customer: 'cus_x'"}}"#;
        let error = map_status_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(error.to_string(), "No such customer: 'cus_x'");
    }

    #[rstest]
    #[case("cs_test_a1B2", true)]
    #[case("acct_1-x", true)]
    #[case("../v1/balance", false)]
    #[case("", false)]
    fn path_segments_are_restricted(#[case] id: &str, #[case] accepted: bool) {
        assert_eq!(path_segment(id).is_ok(), accepted);
    }

    #[rstest]
    fn secret_is_redacted() {
        let secret = ProcessorSecret::new("sk_test_123");
        assert_eq!(format!("{secret:?}"), "ProcessorSecret(***)");
    }
}
