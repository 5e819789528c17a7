//! Keyset page reads over the tasks endpoint.

use serde::Deserialize;
use tracing::debug;

use carelink_client::ApiClient;
use carelink_types::{PageCursor, WorkItem};

use crate::error::WorklistResult;

pub const TASKS_PATH: &str = "/v1/tasks";

/// Wire shape of one page. The server reports no total count; paging
/// state is inferred from the page itself.
#[derive(Debug, Deserialize)]
struct TasksEnvelope {
    items: Vec<WorkItem>,
}

/// One fetched page plus the cursor for the page after it.
#[derive(Debug)]
pub struct WorklistPage {
    pub items: Vec<WorkItem>,
    /// True when the page came back full. A full final page costs one
    /// extra empty read; a short page is a definitive end.
    pub has_more: bool,
    /// Cursor for the next-older page. None when this page was empty.
    pub next_cursor: Option<PageCursor>,
}

/// Reads descending-id pages of work items.
#[derive(Clone)]
pub struct WorklistReader {
    client: ApiClient,
    status: Option<String>,
}

impl WorklistReader {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            status: None,
        }
    }

    /// Restrict reads to one status, e.g. `open`.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Fetch the page addressed by `cursor`. Items arrive in strictly
    /// descending id order.
    pub async fn load_page(&self, cursor: &PageCursor) -> WorklistResult<WorklistPage> {
        let mut req = self
            .client
            .get(TASKS_PATH)
            .query("limit", cursor.page_size);
        if let Some(before_id) = cursor.before_id {
            req = req.query("before_id", before_id);
        }
        if let Some(status) = &self.status {
            req = req.query("status", status);
        }

        let envelope: TasksEnvelope = req.send().await?.json()?;
        let items = envelope.items;

        let has_more = items.len() == cursor.page_size;
        let next_cursor = items.last().map(|last| cursor.advance(last.id));

        debug!(
            count = items.len(),
            has_more,
            before_id = ?cursor.before_id,
            "worklist page loaded"
        );

        Ok(WorklistPage {
            items,
            has_more,
            next_cursor,
        })
    }
}
