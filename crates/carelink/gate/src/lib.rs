//! Route authorization for the carelink client.
//!
//! A client-side UX gate, not a security boundary: the backend enforces
//! the same or stricter policy independently. The gate exists so
//! unauthorized UI is never rendered — which pages a persona may reach
//! is one reviewable table, not conditionals scattered across pages.

#![deny(unsafe_code)]

mod error;
mod gate;
mod policy;

pub use error::{GateError, GateResult};
pub use gate::{GateState, RouteGate};
pub use policy::{Decision, RoutePolicy, HOME_PATH, LOGIN_PATH};
