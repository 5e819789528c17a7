//! Back-office worklist for the carelink client.
//!
//! Keyset pagination over `/v1/tasks` (descending ids, `before_id`
//! cursor, no server-side total) and an accumulator that completes
//! tasks in place so finished rows stay visible until the next refresh.

#![deny(unsafe_code)]

mod error;
mod reader;
mod worklist;

pub use error::{WorklistError, WorklistResult};
pub use reader::{WorklistPage, WorklistReader, TASKS_PATH};
pub use worklist::{Worklist, STATUS_DONE};
