//! Session identity resolution and caching.
//!
//! Resolution is fail-closed: any failure — transport, non-2xx, decode —
//! collapses to the anonymous identity with a diagnostic string, never
//! to an elevated role and never to an error the UI has to handle.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use carelink_types::Identity;

use crate::api::ApiClient;

/// The backend's "who am I" endpoint.
pub const IDENTITY_PATH: &str = "/v1/auth/me";

/// Outcome of one identity resolution. `diagnostic` is populated on
/// failure for optional display; the identity itself is always usable.
#[derive(Clone, Debug)]
pub struct ResolvedIdentity {
    pub identity: Identity,
    pub diagnostic: Option<String>,
}

impl ResolvedIdentity {
    fn failed(diagnostic: String) -> Self {
        Self {
            identity: Identity::anonymous(),
            diagnostic: Some(diagnostic),
        }
    }
}

/// Resolve the current session identity. Calls the backend exactly once;
/// never retries.
async fn resolve(client: &ApiClient) -> ResolvedIdentity {
    let resp = match client.get(IDENTITY_PATH).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %e, "identity resolution failed; treating session as anonymous");
            return ResolvedIdentity::failed(format!("Cannot determine identity: {e}"));
        }
    };

    match resp.json::<Identity>() {
        Ok(identity) => {
            debug!(role = %identity.role, "identity resolved");
            ResolvedIdentity {
                identity,
                diagnostic: None,
            }
        }
        Err(e) => {
            warn!(error = %e, "identity response unreadable; treating session as anonymous");
            ResolvedIdentity::failed(format!("Cannot determine identity: {e}"))
        }
    }
}

/// Process-wide cache of the session identity.
///
/// Populated on first need, held for the lifetime of the session, and
/// invalidated on login/logout. The epoch counter lets callers detect a
/// resolution that raced an invalidation (stale-response guard). Only
/// successful resolutions are cached — a transient failure answers
/// anonymous for this navigation and retries on the next one.
#[derive(Debug, Default)]
pub struct IdentityCache {
    slot: Mutex<Option<ResolvedIdentity>>,
    epoch: AtomicU64,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation counter; bumped by every [`IdentityCache::invalidate`].
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Drop the cached identity and move to a new epoch. Call on login
    /// and logout so the next navigation resolves fresh.
    pub async fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().await = None;
        debug!(epoch = self.epoch(), "identity cache invalidated");
    }

    /// Current identity with its diagnostic, resolving on first need.
    ///
    /// Holding the slot lock across the resolve serializes concurrent
    /// callers: only one "who am I" request is in flight at a time.
    pub async fn resolved(&self, client: &ApiClient) -> ResolvedIdentity {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            return cached.clone();
        }

        let fresh = resolve(client).await;
        if fresh.diagnostic.is_none() {
            *slot = Some(fresh.clone());
        }
        fresh
    }

    /// Current identity, resolving on first need.
    pub async fn current(&self, client: &ApiClient) -> Identity {
        self.resolved(client).await.identity
    }
}
