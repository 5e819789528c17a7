//! Transport layer for carelink.
//!
//! Everything that leaves the client goes through [`ApiClient`], which
//! stamps the mandatory `X-Purpose-Of-Use` header on every request and
//! unifies the success/error shape. Identity resolution and the session
//! identity cache live here too, since the gate and every page depend on
//! them.

#![deny(unsafe_code)]

mod api;
mod auth;
mod error;
mod identity;

pub use api::{ApiClient, ApiResponse, RequestBuilder, ResponseBody, PURPOSE_HEADER};
pub use auth::{send_otp, verify_otp, OtpDispatch};
pub use error::{ClientError, ClientResult};
pub use identity::{IdentityCache, ResolvedIdentity, IDENTITY_PATH};
