//! Keyset pagination cursor and worklist rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cursor for keyset pagination over a descending-id list.
///
/// `before_id = None` means "from the most recent item". A page shorter
/// than `page_size` signals there are no further pages; the server does
/// not report a total count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCursor {
    pub page_size: usize,
    pub before_id: Option<i64>,
}

impl PageCursor {
    /// Cursor for the most recent page.
    pub fn first(page_size: usize) -> Self {
        Self {
            page_size,
            before_id: None,
        }
    }

    /// Cursor for the page strictly older than `last_id`.
    pub fn advance(&self, last_id: i64) -> Self {
        Self {
            page_size: self.page_size,
            before_id: Some(last_id),
        }
    }
}

/// One row of the tasks worklist, as served by `GET /v1/tasks`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: i64,
    /// Task type, e.g. `eligibility_followup`, `signature_issue`.
    #[serde(rename = "type")]
    pub kind: String,
    /// open | in_progress | done | canceled
    pub status: String,
    /// Free-form task context (appointment_id, request_id, claim_id, …).
    #[serde(
        rename = "payload_json",
        default,
        skip_serializing_if = "serde_json::Value::is_null"
    )]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
