//! Authorization personas.

use serde::{Deserialize, Serialize};

/// The authorization persona of the current caller.
///
/// Closed enumeration: the route policy table is total over these four
/// variants. An unresolved or failed session always collapses to
/// [`Role::Anonymous`], never to an elevated role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// No authenticated session. Legacy wire spelling: `ANON`.
    #[serde(alias = "ANON")]
    Anonymous,
    /// Patient portal persona.
    Patient,
    /// Provider-facing persona (prechart, scribe, billing detail).
    Clinician,
    /// Front-desk / admin persona. Legacy wire spelling: `OPS`.
    #[serde(alias = "OPS")]
    Operations,
}

impl Role {
    /// All roles, in policy-table order.
    pub const ALL: [Role; 4] = [
        Role::Anonymous,
        Role::Patient,
        Role::Clinician,
        Role::Operations,
    ];

    /// Canonical wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "ANONYMOUS",
            Role::Patient => "PATIENT",
            Role::Clinician => "CLINICIAN",
            Role::Operations => "OPERATIONS",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
