//! Payment processor double that records calls and settles on command.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    CheckoutPayment, CheckoutSession, CheckoutSessionRequest, CheckoutSessionStatus,
    ConnectedAccountStatus, OnboardingLinkRequest, PaymentGateway, PaymentGatewayError,
    PaymentIntentRequest,
};

/// A checkout session as the processor saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCheckout {
    pub session: CheckoutSession,
    pub request: CheckoutSessionRequest,
}

#[derive(Default)]
struct Ledger {
    sequence: u32,
    customers: HashMap<String, String>,
    intents: Vec<(String, PaymentIntentRequest)>,
    checkouts: Vec<RecordedCheckout>,
    paid_sessions: Vec<String>,
    accounts: HashMap<String, ConnectedAccountStatus>,
    failure: Option<PaymentGatewayError>,
}

impl Ledger {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}_{:04}", self.sequence)
    }

    fn check(&self) -> Result<(), PaymentGatewayError> {
        self.failure.clone().map_or(Ok(()), Err)
    }
}

/// Scripted stand-in for the hosted processor.
///
/// Intents replay by idempotency key like the real API. Checkout sessions
/// stay unpaid until [`ScriptedPaymentGateway::complete_checkout`] is called.
#[derive(Clone, Default)]
pub struct ScriptedPaymentGateway {
    ledger: Arc<Mutex<Ledger>>,
}

impl ScriptedPaymentGateway {
    /// Gateway with no customers, accounts or sessions.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an existing processor customer.
    pub fn with_customer(self, email: &str, customer_id: &str) -> Self {
        self.lock()
            .customers
            .insert(email.to_owned(), customer_id.to_owned());
        self
    }

    /// Make every subsequent call fail with `error`.
    pub fn fail_with(&self, error: PaymentGatewayError) {
        self.lock().failure = Some(error);
    }

    /// Mark a checkout session as paid.
    pub fn complete_checkout(&self, session_id: &str) {
        self.lock().paid_sessions.push(session_id.to_owned());
    }

    /// Enable charges and payouts on a connected account.
    pub fn complete_onboarding(&self, account_id: &str) {
        self.lock().accounts.insert(
            account_id.to_owned(),
            ConnectedAccountStatus {
                charges_enabled: true,
                payouts_enabled: true,
            },
        );
    }

    /// Distinct intents created, with the request that created each.
    pub fn intents(&self) -> Vec<(String, PaymentIntentRequest)> {
        self.lock().intents.clone()
    }

    /// Checkout sessions opened so far, oldest first.
    pub fn checkouts(&self) -> Vec<RecordedCheckout> {
        self.lock().checkouts.clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedPaymentGateway {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, PaymentGatewayError> {
        let ledger = self.lock();
        ledger.check()?;
        Ok(ledger.customers.get(email).cloned())
    }

    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<String, PaymentGatewayError> {
        let mut ledger = self.lock();
        ledger.check()?;
        if let Some((id, _)) = ledger
            .intents
            .iter()
            .find(|(_, existing)| existing.idempotency_key == request.idempotency_key)
        {
            return Ok(id.clone());
        }
        let id = ledger.next_id("pi");
        ledger.intents.push((id.clone(), request.clone()));
        Ok(id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let mut ledger = self.lock();
        ledger.check()?;
        let id = ledger.next_id("cs");
        let session = CheckoutSession {
            url: format!("https://checkout.processor.test/pay/{id}"),
            id,
        };
        ledger.checkouts.push(RecordedCheckout {
            session: session.clone(),
            request: request.clone(),
        });
        Ok(session)
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionStatus, PaymentGatewayError> {
        let ledger = self.lock();
        ledger.check()?;
        let recorded = ledger
            .checkouts
            .iter()
            .find(|recorded| recorded.session.id == session_id)
            .ok_or_else(|| {
                PaymentGatewayError::rejected(format!("No such checkout.session: '{session_id}'"))
            })?;
        let payment_intent_id = match &recorded.request.payment {
            CheckoutPayment::Intent { intent_id } => Some(intent_id.clone()),
            CheckoutPayment::LineItem { .. } => None,
        };
        Ok(CheckoutSessionStatus {
            id: session_id.to_owned(),
            paid: ledger.paid_sessions.iter().any(|paid| paid == session_id),
            payment_intent_id,
            metadata: recorded.request.metadata.clone(),
        })
    }

    async fn create_connected_account(
        &self,
        _email: Option<String>,
    ) -> Result<String, PaymentGatewayError> {
        let mut ledger = self.lock();
        ledger.check()?;
        let id = ledger.next_id("acct");
        ledger.accounts.insert(
            id.clone(),
            ConnectedAccountStatus {
                charges_enabled: false,
                payouts_enabled: false,
            },
        );
        Ok(id)
    }

    async fn create_onboarding_link(
        &self,
        request: &OnboardingLinkRequest,
    ) -> Result<String, PaymentGatewayError> {
        self.lock().check()?;
        Ok(format!(
            "https://connect.processor.test/setup/{}",
            request.account_id
        ))
    }

    async fn retrieve_connected_account(
        &self,
        account_id: &str,
    ) -> Result<ConnectedAccountStatus, PaymentGatewayError> {
        let ledger = self.lock();
        ledger.check()?;
        ledger.accounts.get(account_id).copied().ok_or_else(|| {
            PaymentGatewayError::rejected(format!("No such account: '{account_id}'"))
        })
    }
}
