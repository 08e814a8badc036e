//! Shared WebSocket adapter state.

use std::sync::Arc;

use url::{Origin, Url};

use crate::domain::ports::{IdentityProvider, NotificationFeed};

/// Browser origins allowed to open the notification stream.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<Origin>);

impl AllowedOrigins {
    /// Parse a comma-separated list of origins, skipping blank entries.
    ///
    /// # Errors
    ///
    /// Returns the offending entry when it is not an absolute URL.
    pub fn parse_list(raw: &str) -> Result<Self, String> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                Url::parse(entry)
                    .map(|url| url.origin())
                    .map_err(|_| entry.to_owned())
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Whether the scheme, host and port of `origin` are listed.
    pub fn allows(&self, origin: &Url) -> bool {
        let origin = origin.origin();
        origin.is_tuple() && self.0.contains(&origin)
    }

    /// True when no origin is allowed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Dependency bundle for the notification stream.
#[derive(Clone)]
pub struct WsState {
    pub identity: Arc<dyn IdentityProvider>,
    pub feed: Arc<dyn NotificationFeed>,
    pub allowed_origins: AllowedOrigins,
}

impl WsState {
    /// Bundle the stream's collaborators.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        feed: Arc<dyn NotificationFeed>,
        allowed_origins: AllowedOrigins,
    ) -> Self {
        Self {
            identity,
            feed,
            allowed_origins,
        }
    }
}
