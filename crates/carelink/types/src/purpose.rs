//! Purpose-of-use classification.

use serde::{Deserialize, Serialize};

/// Why a request accesses data. Stamped on every outbound call; the
/// backend treats a missing value as a policy violation, so this is
/// never optional and never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PurposeOfUse {
    /// Administrative and scheduling traffic. Default for reads.
    Operations,
    /// Clinical care. Default for body-bearing methods.
    Treatment,
    /// Billing and claims traffic. Always an explicit caller override.
    Payment,
    /// Extension point for backend-defined codes.
    Other(String),
}

impl PurposeOfUse {
    /// Method-based default: reads are OPERATIONS, writes are TREATMENT.
    ///
    /// Billing-flavored call sites override to [`PurposeOfUse::Payment`]
    /// explicitly; there is no method that defaults to it. Unknown or
    /// extension methods fall back to OPERATIONS.
    pub fn default_for_method(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" | "HEAD" | "OPTIONS" => PurposeOfUse::Operations,
            "POST" | "PUT" | "PATCH" | "DELETE" => PurposeOfUse::Treatment,
            _ => PurposeOfUse::Operations,
        }
    }

    /// Header value. Guaranteed non-empty for the closed variants;
    /// `Other` values come from backend configuration and are passed
    /// through as-is.
    pub fn as_str(&self) -> &str {
        match self {
            PurposeOfUse::Operations => "OPERATIONS",
            PurposeOfUse::Treatment => "TREATMENT",
            PurposeOfUse::Payment => "PAYMENT",
            PurposeOfUse::Other(code) => code,
        }
    }
}

impl std::fmt::Display for PurposeOfUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PurposeOfUse {
    fn from(code: String) -> Self {
        match code.as_str() {
            "OPERATIONS" => PurposeOfUse::Operations,
            "TREATMENT" => PurposeOfUse::Treatment,
            "PAYMENT" => PurposeOfUse::Payment,
            _ => PurposeOfUse::Other(code),
        }
    }
}

impl From<PurposeOfUse> for String {
    fn from(pou: PurposeOfUse) -> Self {
        pou.as_str().to_string()
    }
}
