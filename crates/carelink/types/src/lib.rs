//! Shared vocabulary for the carelink access layer.
//!
//! Every other carelink crate speaks these types: the role/identity pair
//! resolved per session, the purpose-of-use classification stamped on each
//! outbound request, keyset pagination cursors, and the poll phase shared
//! by all status watchers.

#![deny(unsafe_code)]

mod identity;
mod purpose;
mod role;
mod watch;
mod worklist;

pub use identity::{ContactAddress, Identity};
pub use purpose::PurposeOfUse;
pub use role::Role;
pub use watch::WatchPhase;
pub use worklist::{PageCursor, WorkItem};
