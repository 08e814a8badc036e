//! Application settings loaded via OrthoConfig.
//!
//! Values layer defaults, an optional config file, `BLUECALLER_*`
//! environment variables and CLI flags. [`AppSettings::validate`] turns the
//! raw values into typed [`ServiceSettings`] once at start-up.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{
    Money, PaymentTerms, PricingPolicy, PricingPolicyError, PromotionTerms,
};
use crate::inbound::ws::state::AllowedOrigins;
use crate::outbound::identity::AuthApiKey;
use crate::outbound::payments::ProcessorSecret;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PAYMENTS_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_CURRENCY: &str = "usd";
const DEFAULT_PUBLIC_ORIGIN: &str = "http://localhost:3000";

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_owned()
}

fn default_payments_api_base() -> String {
    DEFAULT_PAYMENTS_API_BASE.to_owned()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_owned()
}

fn default_public_origin() -> String {
    DEFAULT_PUBLIC_ORIGIN.to_owned()
}

/// Raw configuration values.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLUECALLER")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    #[ortho_config(default = default_bind_addr())]
    pub bind_addr: String,
    /// PostgreSQL URL. Without it the server runs on in-memory stores.
    pub database_url: Option<String>,
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Base URL of the hosted auth service.
    pub auth_url: Option<String>,
    pub auth_api_key: Option<String>,
    #[ortho_config(default = default_payments_api_base())]
    pub payments_api_base: String,
    pub payments_secret_key: Option<String>,
    #[ortho_config(default = 10_000)]
    pub payments_timeout_ms: u64,
    #[ortho_config(default = default_currency())]
    pub currency: String,
    #[ortho_config(default = 10)]
    pub platform_fee_percent: u32,
    #[ortho_config(default = 2)]
    pub assumed_booking_hours: u32,
    #[ortho_config(default = 500)]
    pub promotion_price_cents: u32,
    #[ortho_config(default = 30)]
    pub promotion_days: u16,
    #[ortho_config(default = 10)]
    pub acceptance_window_minutes: u16,
    /// Redirect base used when a request carries no `Origin` header.
    #[ortho_config(default = default_public_origin())]
    pub public_origin: String,
    /// Comma-separated origins allowed to open the notification stream.
    #[ortho_config(default = default_public_origin())]
    pub allowed_ws_origins: String,
    #[ortho_config(default = 1024)]
    pub notification_queue_capacity: usize,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "***"))
            .field("auth_url", &self.auth_url)
            .field("payments_api_base", &self.payments_api_base)
            .field("currency", &self.currency)
            .field("platform_fee_percent", &self.platform_fee_percent)
            .field("assumed_booking_hours", &self.assumed_booking_hours)
            .field("public_origin", &self.public_origin)
            .finish_non_exhaustive()
    }
}

/// Start-up configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("{key} is required when {requires} is set")]
    Missing {
        key: &'static str,
        requires: &'static str,
    },
    #[error(transparent)]
    Pricing(#[from] PricingPolicyError),
}

impl SettingsError {
    fn invalid(key: &'static str, message: impl fmt::Display) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Credentials for the hosted auth service.
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub url: Url,
    pub api_key: AuthApiKey,
}

/// Connection details for the payment processor.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub base_url: Url,
    pub secret: ProcessorSecret,
    pub timeout: Duration,
}

/// Validated, typed settings consumed by the server bootstrap.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub bind_addr: SocketAddr,
    pub database: Option<PoolConfig>,
    pub run_migrations: bool,
    /// `None` selects the fixture provider that accepts UUID tokens.
    pub identity: Option<IdentitySettings>,
    /// `None` selects a processor stub that rejects every call.
    pub payments: Option<PaymentSettings>,
    pub payment_terms: PaymentTerms,
    pub promotion_terms: PromotionTerms,
    pub acceptance_window_minutes: u16,
    pub public_origin: String,
    pub allowed_ws_origins: AllowedOrigins,
    pub notification_queue_capacity: usize,
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::invalid(key, err))
}

impl AppSettings {
    /// Check every value and build the typed settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] naming the first offending key.
    pub fn validate(&self) -> Result<ServiceSettings, SettingsError> {
        let bind_addr = self
            .bind_addr
            .parse()
            .map_err(|err| SettingsError::invalid("bind_addr", err))?;
        let pricing = PricingPolicy::new(self.assumed_booking_hours, self.platform_fee_percent)?;
        let currency = self.currency.trim().to_ascii_lowercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SettingsError::invalid(
                "currency",
                "expected a three-letter ISO code",
            ));
        }
        if self.promotion_days == 0 {
            return Err(SettingsError::invalid("promotion_days", "must be at least 1"));
        }
        if self.notification_queue_capacity == 0 {
            return Err(SettingsError::invalid(
                "notification_queue_capacity",
                "must be at least 1",
            ));
        }

        let public_origin = parse_url("public_origin", &self.public_origin)?;
        let allowed_ws_origins = AllowedOrigins::parse_list(&self.allowed_ws_origins)
            .map_err(|entry| SettingsError::invalid("allowed_ws_origins", entry))?;

        Ok(ServiceSettings {
            bind_addr,
            database: self.database_url.as_ref().map(|url| {
                PoolConfig::new(url.clone()).with_max_size(self.db_max_connections)
            }),
            run_migrations: self.run_migrations,
            identity: self.identity()?,
            payments: self.payments()?,
            payment_terms: PaymentTerms {
                pricing,
                currency: currency.clone(),
            },
            promotion_terms: PromotionTerms {
                price: Money::from_unsigned_cents(self.promotion_price_cents),
                days: self.promotion_days,
                currency,
            },
            acceptance_window_minutes: self.acceptance_window_minutes,
            public_origin: public_origin.as_str().trim_end_matches('/').to_owned(),
            allowed_ws_origins,
            notification_queue_capacity: self.notification_queue_capacity,
        })
    }

    fn identity(&self) -> Result<Option<IdentitySettings>, SettingsError> {
        let Some(raw_url) = self.auth_url.as_deref() else {
            return Ok(None);
        };
        let api_key = self.auth_api_key.as_deref().ok_or(SettingsError::Missing {
            key: "auth_api_key",
            requires: "auth_url",
        })?;
        Ok(Some(IdentitySettings {
            url: parse_url("auth_url", raw_url)?,
            api_key: AuthApiKey::new(api_key),
        }))
    }

    fn payments(&self) -> Result<Option<PaymentSettings>, SettingsError> {
        let Some(secret) = self.payments_secret_key.as_deref() else {
            return Ok(None);
        };
        if self.payments_timeout_ms == 0 {
            return Err(SettingsError::invalid(
                "payments_timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(Some(PaymentSettings {
            base_url: parse_url("payments_api_base", &self.payments_api_base)?,
            secret: ProcessorSecret::new(secret),
            timeout: Duration::from_millis(self.payments_timeout_ms),
        }))
    }
}
