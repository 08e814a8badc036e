//! Customer quote requests.

use chrono::{DateTime, Utc};

use crate::domain::{QuoteRequestId, UserId};

/// A customer's posted need for a service. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub id: QuoteRequestId,
    pub customer_id: UserId,
    pub service_category: String,
    pub description: String,
    pub zipcode: String,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub contact: CustomerContact,
    pub created_at: DateTime<Utc>,
}

/// Contact details a customer supplies with a request or booking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Validated quote request fields supplied by the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequestDraft {
    pub service_category: String,
    pub description: String,
    pub zipcode: String,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub contact: CustomerContact,
}

/// Validation failures for [`QuoteRequestDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteRequestValidationError {
    #[error("serviceCategory must not be empty")]
    EmptyCategory,
    #[error("projectDescription must not be empty")]
    EmptyDescription,
    #[error("zipcode must not be empty")]
    EmptyZipcode,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

impl QuoteRequestDraft {
    /// Trim and validate the customer's request fields.
    pub fn new(
        service_category: &str,
        description: &str,
        zipcode: &str,
        timeline: Option<String>,
        budget: Option<String>,
        contact: CustomerContact,
    ) -> Result<Self, QuoteRequestValidationError> {
        let service_category = service_category.trim();
        if service_category.is_empty() {
            return Err(QuoteRequestValidationError::EmptyCategory);
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(QuoteRequestValidationError::EmptyDescription);
        }
        let zipcode = zipcode.trim();
        if zipcode.is_empty() {
            return Err(QuoteRequestValidationError::EmptyZipcode);
        }
        Ok(Self {
            service_category: service_category.to_owned(),
            description: description.to_owned(),
            zipcode: zipcode.to_owned(),
            timeline: non_blank(timeline),
            budget: non_blank(budget),
            contact: CustomerContact {
                name: non_blank(contact.name),
                email: non_blank(contact.email),
                phone: non_blank(contact.phone),
            },
        })
    }
}
