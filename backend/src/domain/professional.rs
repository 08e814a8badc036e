//! Professional profiles and matching predicates.

use chrono::{DateTime, Utc};

use crate::domain::{Money, ProfessionalId, UserId};

/// A service professional listed on the marketplace.
///
/// At most one profile exists per owning user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Professional {
    pub id: ProfessionalId,
    pub user_id: UserId,
    pub name: String,
    /// Free-text category, matched loosely against request categories.
    pub specialty: String,
    pub hourly_rate: Money,
    pub service_zipcodes: Vec<String>,
    pub phone: String,
    pub bio: Option<String>,
    pub verified: bool,
    pub is_sponsored: bool,
    pub sponsored_until: Option<DateTime<Utc>>,
    pub payout_account_id: Option<String>,
    pub payout_onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl Professional {
    /// Loose category match: case-insensitive substring of the specialty.
    pub fn offers(&self, service_category: &str) -> bool {
        let needle = service_category.trim().to_lowercase();
        !needle.is_empty() && self.specialty.to_lowercase().contains(&needle)
    }

    /// Exact set membership of the zipcode in the service area.
    pub fn serves_zipcode(&self, zipcode: &str) -> bool {
        let zipcode = zipcode.trim();
        self.service_zipcodes.iter().any(|zip| zip == zipcode)
    }

    /// Both matching stages together.
    pub fn matches(&self, service_category: &str, zipcode: &str) -> bool {
        self.offers(service_category) && self.serves_zipcode(zipcode)
    }

    /// Whether funds can be routed to this professional.
    pub fn can_receive_payouts(&self) -> bool {
        self.payout_onboarding_complete && self.payout_account_id.is_some()
    }
}

/// Validated input for creating a professional profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfessionalDraft {
    pub name: String,
    pub specialty: String,
    pub hourly_rate: Money,
    pub service_zipcodes: Vec<String>,
    pub phone: String,
    pub bio: Option<String>,
}

/// Validation failures for [`ProfessionalDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfessionalValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("specialty must not be empty")]
    EmptySpecialty,
    #[error("hourly rate must be greater than zero")]
    ZeroRate,
    #[error("at least one service zipcode is required")]
    NoZipcodes,
    #[error("phone must not be empty")]
    EmptyPhone,
}

impl ProfessionalDraft {
    /// Normalise and validate raw profile input.
    ///
    /// Zipcodes are trimmed, blanks dropped and duplicates removed while
    /// keeping the caller's order.
    pub fn new(
        name: &str,
        specialty: &str,
        hourly_rate: Money,
        service_zipcodes: Vec<String>,
        phone: &str,
        bio: Option<String>,
    ) -> Result<Self, ProfessionalValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfessionalValidationError::EmptyName);
        }
        let specialty = specialty.trim();
        if specialty.is_empty() {
            return Err(ProfessionalValidationError::EmptySpecialty);
        }
        if hourly_rate.is_zero() {
            return Err(ProfessionalValidationError::ZeroRate);
        }
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(ProfessionalValidationError::EmptyPhone);
        }

        let mut zipcodes: Vec<String> = Vec::with_capacity(service_zipcodes.len());
        for zip in service_zipcodes {
            let zip = zip.trim();
            if !zip.is_empty() && !zipcodes.iter().any(|existing| existing == zip) {
                zipcodes.push(zip.to_owned());
            }
        }
        if zipcodes.is_empty() {
            return Err(ProfessionalValidationError::NoZipcodes);
        }

        Ok(Self {
            name: name.to_owned(),
            specialty: specialty.to_owned(),
            hourly_rate,
            service_zipcodes: zipcodes,
            phone: phone.to_owned(),
            bio: bio
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
        })
    }
}
