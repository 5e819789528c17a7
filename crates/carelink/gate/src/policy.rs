//! Role → allowed-route table.
//!
//! Pure data consulted by the gate: add a role or a page by editing the
//! table, not control flow. Patterns are anchored and must match the
//! full path.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use carelink_types::Role;

use crate::error::{GateError, GateResult};

/// Allowed for every role regardless of the table, so a blocked persona
/// can always get back to switch accounts.
pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// Outcome of an authorization check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allowed,
    /// The message is deterministic and contains the literal path and
    /// the literal role name; pages render it as-is.
    Blocked { message: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Total mapping from role to anchored route patterns.
///
/// Every role has an entry, possibly empty. Static configuration — the
/// table is built once and never mutated at runtime.
#[derive(Debug)]
pub struct RoutePolicy {
    allow: HashMap<Role, Vec<Regex>>,
}

impl RoutePolicy {
    /// Empty-but-total table: every role present, no routes allowed
    /// beyond the universal paths.
    pub fn empty() -> Self {
        let allow = Role::ALL.iter().map(|r| (*r, Vec::new())).collect();
        Self { allow }
    }

    /// Add an anchored pattern for a role. The pattern matches the full
    /// path; write `/intake/\d+`, not a prefix.
    pub fn allow(mut self, role: Role, pattern: &str) -> GateResult<Self> {
        let compiled =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| GateError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        self.allow.entry(role).or_default().push(compiled);
        Ok(self)
    }

    /// The production table: which persona may reach which page.
    pub fn standard() -> GateResult<Self> {
        let mut policy = Self::empty();

        for pattern in ["/", "/login", "/book", "/confirm"] {
            policy = policy.allow(Role::Anonymous, pattern)?;
        }

        for pattern in [
            "/",
            "/login",
            "/book",
            "/confirm",
            r"/intake/\d+",
            "/consent/[^/]+",
            "/docs",
            "/check-in",
            "/portal/summary/[^/]+",
            "/portal/follow-up",
            "/portal/tasks",
        ] {
            policy = policy.allow(Role::Patient, pattern)?;
        }

        for pattern in [
            r"/provider/prechart/\d+",
            r"/provider/scribe/\d+",
            "/portal/summary/[^/]+",
            "/billing/cases",
            r"/billing/claims/\d+",
        ] {
            policy = policy.allow(Role::Clinician, pattern)?;
        }

        for pattern in [
            "/ops/queue",
            "/ops/escalations",
            "/admin/billing/eligibility",
            "/admin/tasks",
            "/admin/compliance/audit",
            "/admin/compliance/pia",
            "/admin/compliance/retention",
            "/admin/analytics",
            "/admin/experiments",
        ] {
            policy = policy.allow(Role::Operations, pattern)?;
        }

        Ok(policy)
    }

    /// Patterns for a role. Total: unknown entries answer as empty.
    pub fn patterns(&self, role: Role) -> &[Regex] {
        self.allow.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Decide whether `role` may render `path`.
    ///
    /// Pure and deterministic: same inputs, same decision.
    pub fn authorize(&self, role: Role, path: &str) -> Decision {
        // Persona-switch escape hatch: home and login always render.
        if path == HOME_PATH || path == LOGIN_PATH {
            return Decision::Allowed;
        }

        let allowed = self.patterns(role).iter().any(|rx| rx.is_match(path));
        trace!(role = %role, path = %path, allowed, "route authorization");

        if allowed {
            Decision::Allowed
        } else {
            Decision::Blocked {
                message: blocked_message(role, path),
            }
        }
    }
}

fn blocked_message(role: Role, path: &str) -> String {
    format!("Not authorized for: {path}. Signed in as {role}. Go to Home (/) or Login (/login).")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_paths_are_allowed_for_every_role() {
        let policy = RoutePolicy::empty();
        for role in Role::ALL {
            assert!(policy.authorize(role, HOME_PATH).is_allowed());
            assert!(policy.authorize(role, LOGIN_PATH).is_allowed());
        }
    }

    #[test]
    fn clinician_reaches_scribe_but_not_admin_tasks() {
        let policy = RoutePolicy::standard().unwrap();

        assert!(policy
            .authorize(Role::Clinician, "/provider/scribe/42")
            .is_allowed());

        match policy.authorize(Role::Clinician, "/admin/tasks") {
            Decision::Blocked { message } => {
                assert!(message.contains("/admin/tasks"));
                assert!(message.contains("CLINICIAN"));
            }
            Decision::Allowed => panic!("clinician must not reach /admin/tasks"),
        }
    }

    #[test]
    fn patterns_match_the_full_path_only() {
        let policy = RoutePolicy::standard().unwrap();

        // Prefix and suffix extensions must not match.
        assert!(!policy
            .authorize(Role::Patient, "/intake/12/extra")
            .is_allowed());
        assert!(!policy.authorize(Role::Patient, "/intake/abc").is_allowed());
        assert!(policy.authorize(Role::Patient, "/intake/12").is_allowed());
    }

    #[test]
    fn anonymous_is_limited_to_public_pages() {
        let policy = RoutePolicy::standard().unwrap();

        assert!(policy.authorize(Role::Anonymous, "/book").is_allowed());
        assert!(!policy.authorize(Role::Anonymous, "/ops/queue").is_allowed());
        assert!(!policy
            .authorize(Role::Anonymous, "/portal/tasks")
            .is_allowed());
    }

    #[test]
    fn decision_is_deterministic() {
        let policy = RoutePolicy::standard().unwrap();
        let first = policy.authorize(Role::Operations, "/admin/analytics");
        let second = policy.authorize(Role::Operations, "/admin/analytics");
        assert_eq!(first, second);

        let b1 = policy.authorize(Role::Patient, "/admin/analytics");
        let b2 = policy.authorize(Role::Patient, "/admin/analytics");
        assert_eq!(b1, b2);
    }

    #[test]
    fn invalid_pattern_reports_the_pattern() {
        let err = RoutePolicy::empty()
            .allow(Role::Patient, "/intake/(\\d+")
            .unwrap_err();
        assert!(err.to_string().contains("/intake/"));
    }
}
