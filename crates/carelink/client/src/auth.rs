//! OTP login flow.
//!
//! Both calls are classified OPERATIONS — establishing a session is
//! administrative traffic, not care delivery. The verified session comes
//! back as a cookie on the shared jar; nothing is stored client-side.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use carelink_types::ContactAddress;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use carelink_types::PurposeOfUse;

const OTP_SEND_PATH: &str = "/v1/auth/otp:send";
const SESSIONS_PATH: &str = "/v1/sessions";

/// Result of requesting an OTP. `dev_code` is only populated by dev
/// backends to ease testing.
#[derive(Clone, Debug, Deserialize)]
pub struct OtpDispatch {
    pub ok: bool,
    #[serde(default)]
    pub dev_code: Option<String>,
}

fn contact_payload(raw: &str) -> ClientResult<serde_json::Value> {
    match ContactAddress::parse(raw) {
        Some(ContactAddress::Email(email)) => Ok(json!({ "email": email })),
        Some(ContactAddress::Phone(phone)) => Ok(json!({ "phone": phone })),
        None => Err(ClientError::Invalid("Provide email or phone".into())),
    }
}

/// Request a one-time code for the given email or phone.
pub async fn send_otp(client: &ApiClient, contact: &str) -> ClientResult<OtpDispatch> {
    let payload = contact_payload(contact)?;
    let resp = client
        .post_json(OTP_SEND_PATH, &payload)
        .purpose(PurposeOfUse::Operations)
        .send()
        .await?;
    resp.json()
}

/// Exchange contact + code for a session. On success the session cookie
/// is captured by the client's jar; subsequent calls are authenticated.
pub async fn verify_otp(
    client: &ApiClient,
    contact: &str,
    code: &str,
) -> ClientResult<serde_json::Value> {
    if code.trim().is_empty() {
        return Err(ClientError::Invalid("Provide code".into()));
    }

    let mut payload = contact_payload(contact)?;
    payload["code"] = json!(code);

    let resp = client
        .post_json(SESSIONS_PATH, &payload)
        .purpose(PurposeOfUse::Operations)
        .send()
        .await?;

    info!("session established");
    Ok(resp.as_json().cloned().unwrap_or(serde_json::Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn send_otp_splits_email_and_phone() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/otp:send"))
            .and(header(crate::PURPOSE_HEADER, "OPERATIONS"))
            .and(body_json(json!({"phone": "5550102000"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": true, "dev_code": "123456"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let dispatch = send_otp(&client, "(555) 010-2000").await.unwrap();
        assert!(dispatch.ok);
        assert_eq!(dispatch.dev_code.as_deref(), Some("123456"));
    }

    #[tokio::test]
    async fn empty_contact_or_code_fail_before_any_request() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();

        let err = send_otp(&client, "   ").await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(_)));

        let err = verify_otp(&client, "pat@example.com", "").await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(_)));
    }

    #[tokio::test]
    async fn verify_otp_posts_contact_and_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sessions"))
            .and(body_json(json!({"email": "pat@example.com", "code": "654321"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": true, "role": "PATIENT"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let session = verify_otp(&client, "pat@example.com", "654321").await.unwrap();
        assert_eq!(session["role"], "PATIENT");
    }
}
