//! Status polling for the carelink client.
//!
//! One generic engine — repeat a status read on an interval, classify
//! the result, stop on a terminal phase — and the three concrete flows
//! built on it: consent signature, asynchronous compliance job, and
//! generated-document readiness. Tick failures never propagate to the
//! surrounding UI; they are recorded on the watcher state and the next
//! tick is still scheduled.

#![deny(unsafe_code)]

mod flows;
mod poller;
mod watcher;

pub use flows::{
    compliance_watcher, document_watcher, signature_watcher, SignatureFlow, COMPLIANCE_STATUS_DONE,
    COMPLIANCE_STATUS_ERROR, SIGNATURE_STATUS_SIGNED,
};
pub use poller::{PollHandle, PollTick, Poller};
pub use watcher::{Classifier, StatusWatcher, Verdict, WatchState};
