//! Port for the third-party payment processor.
//!
//! Covers customer lookup, marketplace payment intents with an application
//! fee, hosted checkout sessions and connected payout accounts. Amounts cross
//! this boundary in minor units.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::Money;

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment processor adapters.
    ///
    /// Every variant carries the processor's own message so it can be shown
    /// to the caller.
    pub enum PaymentGatewayError {
        /// The processor refused the request.
        Rejected { message: String } => "{message}",
        /// The processor throttled the request.
        RateLimited { message: String } => "payment processor rate limited: {message}",
        /// No answer within the configured timeout.
        Timeout { message: String } => "payment processor timed out: {message}",
        /// The processor could not be reached.
        Transport { message: String } => "payment processor unreachable: {message}",
        /// The processor answered with an unexpected payload.
        Decode { message: String } => "payment processor response invalid: {message}",
    }
}

/// Key/value metadata attached to processor objects.
pub type PaymentMetadata = BTreeMap<String, String>;

/// Marketplace charge routed to a connected account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: Money,
    pub currency: String,
    /// Platform share retained as the application fee.
    pub application_fee: Money,
    /// Connected account receiving the remainder.
    pub destination_account: String,
    pub customer_id: Option<String>,
    pub metadata: PaymentMetadata,
    /// Replays with the same key return the original intent.
    pub idempotency_key: String,
}

/// What a checkout session collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutPayment {
    /// Collect an existing payment intent.
    Intent { intent_id: String },
    /// Collect a single priced line item.
    LineItem {
        name: String,
        amount: Money,
        currency: String,
    },
}

/// Hosted checkout session request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub payment: CheckoutPayment,
    /// Known processor customer. When absent, `customer_email` is sent.
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: PaymentMetadata,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// A checkout session read back for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionStatus {
    pub id: String,
    pub paid: bool,
    pub payment_intent_id: Option<String>,
    pub metadata: PaymentMetadata,
}

/// Connected account capabilities relevant to payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedAccountStatus {
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
}

impl ConnectedAccountStatus {
    /// Onboarding is complete once both capabilities are enabled.
    pub const fn onboarding_complete(self) -> bool {
        self.charges_enabled && self.payouts_enabled
    }
}

/// Redirect targets for a hosted onboarding flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingLinkRequest {
    pub account_id: String,
    pub refresh_url: String,
    pub return_url: String,
}

/// Port for payment processor operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// First processor customer registered with `email`, if any.
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, PaymentGatewayError>;

    /// Create a payment intent, returning its id.
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<String, PaymentGatewayError>;

    /// Open a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError>;

    /// Read a checkout session's payment outcome.
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionStatus, PaymentGatewayError>;

    /// Create a connected payout account, returning its id.
    async fn create_connected_account(
        &self,
        email: Option<String>,
    ) -> Result<String, PaymentGatewayError>;

    /// Create a single-use onboarding link, returning its URL.
    async fn create_onboarding_link(
        &self,
        request: &OnboardingLinkRequest,
    ) -> Result<String, PaymentGatewayError>;

    /// Read a connected account's capabilities.
    async fn retrieve_connected_account(
        &self,
        account_id: &str,
    ) -> Result<ConnectedAccountStatus, PaymentGatewayError>;
}

/// Fixture gateway for wiring without a processor. Every call is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentGateway;

impl FixturePaymentGateway {
    fn unconfigured() -> PaymentGatewayError {
        PaymentGatewayError::rejected("payment processor is not configured")
    }
}

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn find_customer_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<String>, PaymentGatewayError> {
        Err(Self::unconfigured())
    }

    async fn create_payment_intent(
        &self,
        _request: &PaymentIntentRequest,
    ) -> Result<String, PaymentGatewayError> {
        Err(Self::unconfigured())
    }

    async fn create_checkout_session(
        &self,
        _request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        Err(Self::unconfigured())
    }

    async fn retrieve_checkout_session(
        &self,
        _session_id: &str,
    ) -> Result<CheckoutSessionStatus, PaymentGatewayError> {
        Err(Self::unconfigured())
    }

    async fn create_connected_account(
        &self,
        _email: Option<String>,
    ) -> Result<String, PaymentGatewayError> {
        Err(Self::unconfigured())
    }

    async fn create_onboarding_link(
        &self,
        _request: &OnboardingLinkRequest,
    ) -> Result<String, PaymentGatewayError> {
        Err(Self::unconfigured())
    }

    async fn retrieve_connected_account(
        &self,
        _account_id: &str,
    ) -> Result<ConnectedAccountStatus, PaymentGatewayError> {
        Err(Self::unconfigured())
    }
}
