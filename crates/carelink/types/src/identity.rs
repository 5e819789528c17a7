//! Session identity as reported by the backend.

use serde::{Deserialize, Serialize};

use crate::Role;

/// Who the current caller is, per `GET /v1/auth/me`.
///
/// Fetched once per session start and treated as immutable for the
/// duration of a navigation decision. An anonymous session is a valid
/// identity, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Email or phone the session was established with.
    #[serde(
        default,
        alias = "email",
        alias = "phone",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact: Option<String>,
    pub role: Role,
}

impl Identity {
    /// The most restrictive identity. Every resolution failure collapses
    /// to this, never to an elevated role.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            contact: None,
            role: Role::Anonymous,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.role == Role::Anonymous
    }
}

/// A login contact: email when the raw string contains `@`, otherwise
/// the digits of a phone number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContactAddress {
    Email(String),
    Phone(String),
}

impl ContactAddress {
    /// Split a free-form identity string the way the login form does.
    /// Returns `None` when neither an email nor any digits are present.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.contains('@') {
            return Some(ContactAddress::Email(raw.to_string()));
        }
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            None
        } else {
            Some(ContactAddress::Phone(digits))
        }
    }
}
