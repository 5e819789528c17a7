//! Accumulated worklist with in-place completion.

use tracing::{debug, warn};

use carelink_client::ApiClient;
use carelink_types::{PageCursor, PurposeOfUse, WorkItem};

use crate::error::{WorklistError, WorklistResult};
use crate::reader::{WorklistReader, TASKS_PATH};

pub const STATUS_DONE: &str = "done";

/// Pages of work items accumulated newest-first, with completion that
/// patches rows in place instead of refetching.
pub struct Worklist {
    client: ApiClient,
    reader: WorklistReader,
    page_size: usize,
    items: Vec<WorkItem>,
    cursor: PageCursor,
    has_more: bool,
}

impl Worklist {
    pub fn new(client: ApiClient, page_size: usize) -> Self {
        Self {
            reader: WorklistReader::new(client.clone()),
            client,
            page_size,
            items: Vec::new(),
            cursor: PageCursor::first(page_size),
            has_more: false,
        }
    }

    /// Restrict all subsequent loads to one status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.reader = self.reader.with_status(status);
        self
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Discard everything accumulated and reload the most recent page.
    pub async fn refresh(&mut self) -> WorklistResult<()> {
        self.cursor = PageCursor::first(self.page_size);
        let page = self.reader.load_page(&self.cursor).await?;
        self.items = page.items;
        self.has_more = page.has_more;
        if let Some(next) = page.next_cursor {
            self.cursor = next;
        }
        Ok(())
    }

    /// Append the page older than everything loaded so far. No-op when
    /// the last page came back short.
    pub async fn load_older(&mut self) -> WorklistResult<()> {
        if !self.has_more {
            debug!("load_older skipped; no further pages");
            return Ok(());
        }
        let page = self.reader.load_page(&self.cursor).await?;
        self.has_more = page.has_more;
        if let Some(next) = page.next_cursor {
            self.cursor = next;
        }
        self.items.extend(page.items);
        Ok(())
    }

    /// Mark one task done. On success the row's status flips to `done`
    /// in place; the row keeps its position and stays visible until the
    /// next refresh. On failure the row is left fully intact and the
    /// error carries a displayable message.
    pub async fn complete(&mut self, id: i64) -> WorklistResult<()> {
        if !self.items.iter().any(|item| item.id == id) {
            return Err(WorklistError::UnknownItem(id));
        }

        let outcome = self
            .client
            .post(format!("{TASKS_PATH}/{id}/complete"))
            .purpose(PurposeOfUse::Operations)
            .send()
            .await;

        match outcome {
            Ok(_) => {
                for item in &mut self.items {
                    if item.id == id {
                        item.status = STATUS_DONE.to_string();
                    }
                }
                debug!(id, "task completed");
                Ok(())
            }
            Err(e) => {
                warn!(id, error = %e, "task completion failed; row left untouched");
                Err(e.into())
            }
        }
    }
}
