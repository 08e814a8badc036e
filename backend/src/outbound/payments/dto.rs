//! Wire shapes for the payment processor's REST API.
//!
//! Requests are flattened into form pairs using the processor's bracketed
//! key convention (`metadata[booking_id]=...`). Responses decode into the
//! narrow DTOs below and are then mapped onto port types.

use serde::Deserialize;

use crate::domain::ports::{
    CheckoutPayment, CheckoutSessionRequest, CheckoutSessionStatus, ConnectedAccountStatus,
    OnboardingLinkRequest, PaymentIntentRequest, PaymentMetadata,
};

/// Ordered form pairs for one request body.
pub(super) type FormPairs = Vec<(String, String)>;

fn push(form: &mut FormPairs, key: impl Into<String>, value: impl Into<String>) {
    form.push((key.into(), value.into()));
}

fn push_metadata(form: &mut FormPairs, prefix: &str, metadata: &PaymentMetadata) {
    for (key, value) in metadata {
        push(form, format!("{prefix}[{key}]"), value.as_str());
    }
}

pub(super) fn payment_intent_form(request: &PaymentIntentRequest) -> FormPairs {
    let mut form = FormPairs::new();
    push(&mut form, "amount", request.amount.cents().to_string());
    push(&mut form, "currency", request.currency.as_str());
    push(
        &mut form,
        "application_fee_amount",
        request.application_fee.cents().to_string(),
    );
    push(
        &mut form,
        "transfer_data[destination]",
        request.destination_account.as_str(),
    );
    if let Some(customer) = &request.customer_id {
        push(&mut form, "customer", customer.as_str());
    }
    push_metadata(&mut form, "metadata", &request.metadata);
    form
}

pub(super) fn checkout_session_form(request: &CheckoutSessionRequest) -> FormPairs {
    let mut form = FormPairs::new();
    push(&mut form, "mode", "payment");
    match &request.payment {
        CheckoutPayment::Intent { intent_id } => {
            push(&mut form, "payment_intent", intent_id.as_str());
        }
        CheckoutPayment::LineItem {
            name,
            amount,
            currency,
        } => {
            push(&mut form, "line_items[0][quantity]", "1");
            push(
                &mut form,
                "line_items[0][price_data][currency]",
                currency.as_str(),
            );
            push(
                &mut form,
                "line_items[0][price_data][unit_amount]",
                amount.cents().to_string(),
            );
            push(
                &mut form,
                "line_items[0][price_data][product_data][name]",
                name.as_str(),
            );
        }
    }
    match (&request.customer_id, &request.customer_email) {
        (Some(customer), _) => push(&mut form, "customer", customer.as_str()),
        (None, Some(email)) => push(&mut form, "customer_email", email.as_str()),
        (None, None) => {}
    }
    push(&mut form, "success_url", request.success_url.as_str());
    push(&mut form, "cancel_url", request.cancel_url.as_str());
    push_metadata(&mut form, "metadata", &request.metadata);
    form
}

pub(super) fn connected_account_form(email: Option<&str>) -> FormPairs {
    let mut form = FormPairs::new();
    push(&mut form, "type", "express");
    push(&mut form, "business_type", "individual");
    push(&mut form, "capabilities[card_payments][requested]", "true");
    push(&mut form, "capabilities[transfers][requested]", "true");
    if let Some(email) = email {
        push(&mut form, "email", email);
    }
    form
}

pub(super) fn onboarding_link_form(request: &OnboardingLinkRequest) -> FormPairs {
    let mut form = FormPairs::new();
    push(&mut form, "account", request.account_id.as_str());
    push(&mut form, "refresh_url", request.refresh_url.as_str());
    push(&mut form, "return_url", request.return_url.as_str());
    push(&mut form, "type", "account_onboarding");
    form
}

/// Any object the processor identifies by `id`.
#[derive(Debug, Deserialize)]
pub(super) struct ObjectDto {
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListDto {
    #[serde(default)]
    pub(super) data: Vec<ObjectDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CheckoutSessionDto {
    pub(super) id: String,
    pub(super) url: Option<String>,
    #[serde(default)]
    pub(super) payment_status: Option<String>,
    #[serde(default)]
    pub(super) payment_intent: Option<String>,
    #[serde(default)]
    pub(super) metadata: PaymentMetadata,
}

impl CheckoutSessionDto {
    pub(super) fn into_status(self) -> CheckoutSessionStatus {
        CheckoutSessionStatus {
            paid: self.payment_status.as_deref() == Some("paid"),
            id: self.id,
            payment_intent_id: self.payment_intent,
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountDto {
    #[serde(default)]
    pub(super) charges_enabled: bool,
    #[serde(default)]
    pub(super) payouts_enabled: bool,
}

impl From<AccountDto> for ConnectedAccountStatus {
    fn from(dto: AccountDto) -> Self {
        Self {
            charges_enabled: dto.charges_enabled,
            payouts_enabled: dto.payouts_enabled,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AccountLinkDto {
    pub(super) url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    pub(super) message: Option<String>,
}
