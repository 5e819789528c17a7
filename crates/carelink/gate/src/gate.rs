//! The route authorization gate.
//!
//! Per navigation: resolve identity (cached per session), consult the
//! policy table, answer allow-or-block. While resolution is in flight
//! the UI renders a neutral placeholder — never the destination page and
//! never a blocked message, so unauthorized content cannot flash.

use std::sync::Arc;

use tracing::{debug, info};

use carelink_client::{ApiClient, IdentityCache};
use carelink_types::Role;

use crate::policy::{Decision, RoutePolicy};

/// Neutral text rendered while the gate is resolving.
const RESOLVING_PLACEHOLDER: &str = "Checking access…";

/// Gate outcome for one navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateState {
    /// Identity resolution still in flight. Render the placeholder.
    Resolving,
    /// The page may render.
    Allowed { role: Role },
    /// The page must not render. `message` is displayable as-is;
    /// `diagnostic` carries the resolution failure, when there was one.
    Blocked {
        role: Role,
        message: String,
        diagnostic: Option<String>,
    },
}

/// Decides, per authenticated persona, which pages may render.
pub struct RouteGate {
    client: ApiClient,
    cache: Arc<IdentityCache>,
    policy: RoutePolicy,
}

impl RouteGate {
    pub fn new(client: ApiClient, cache: Arc<IdentityCache>, policy: RoutePolicy) -> Self {
        Self {
            client,
            cache,
            policy,
        }
    }

    /// Text for the initial [`GateState::Resolving`] render.
    pub fn placeholder() -> &'static str {
        RESOLVING_PLACEHOLDER
    }

    /// The policy table this gate consults.
    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Evaluate a navigation to `path`.
    ///
    /// Stale-response guard: the cache epoch is captured before
    /// resolving; if a login/logout invalidated the cache while the
    /// resolution was in flight, that result describes a dead session
    /// and is discarded, and resolution repeats against the new epoch.
    pub async fn evaluate(&self, path: &str) -> GateState {
        loop {
            let epoch = self.cache.epoch();
            let resolved = self.cache.resolved(&self.client).await;

            if self.cache.epoch() != epoch {
                debug!(path, "stale identity resolution discarded");
                continue;
            }

            let role = resolved.identity.role;
            return match self.policy.authorize(role, path) {
                Decision::Allowed => {
                    debug!(role = %role, path, "navigation allowed");
                    GateState::Allowed { role }
                }
                Decision::Blocked { message } => {
                    info!(role = %role, path, "navigation blocked");
                    GateState::Blocked {
                        role,
                        message,
                        diagnostic: resolved.diagnostic,
                    }
                }
            };
        }
    }
}
