//! The three concrete poll-driven flows.
//!
//! Same machine, different terminal predicates:
//! - signature: `SIGNED` completes; everything else, read failures
//!   included, stays pending;
//! - compliance job: `DONE` completes, `ERROR` is a terminal failure,
//!   read failures stay pending — a transient outage is not a job
//!   failure, only an explicit error status is;
//! - document readiness: the first successful read completes; failure is
//!   indistinguishable from not-ready-yet.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::info;

use carelink_client::{ApiClient, ClientError, ClientResult};
use carelink_types::PurposeOfUse;

use crate::watcher::{Classifier, StatusWatcher, Verdict};

pub const SIGNATURE_STATUS_SIGNED: &str = "SIGNED";
pub const COMPLIANCE_STATUS_DONE: &str = "DONE";
pub const COMPLIANCE_STATUS_ERROR: &str = "ERROR";

const SIGNATURE_REQUESTS_PATH: &str = "/v1/signature/requests";
const COMPLIANCE_REQUESTS_PATH: &str = "/v1/compliance/requests";
const DISCHARGE_DOCUMENTS_PATH: &str = "/v1/documents/discharge";

fn status_of(value: &serde_json::Value) -> &str {
    value.get("status").and_then(|s| s.as_str()).unwrap_or("")
}

/// Watch a consent signature request until it is signed.
pub fn signature_watcher(
    client: ApiClient,
    request_id: impl Into<String>,
    interval: Duration,
) -> StatusWatcher {
    let request_id = request_id.into();
    let classify: Classifier = Arc::new(|outcome| match outcome {
        Ok(resp) => match resp.as_json() {
            Some(body) if status_of(body) == SIGNATURE_STATUS_SIGNED => {
                Verdict::Complete(body.clone())
            }
            _ => Verdict::Pending(None),
        },
        Err(e) => Verdict::Pending(Some(e.to_string())),
    });

    StatusWatcher::start(
        client,
        format!("{SIGNATURE_REQUESTS_PATH}/{request_id}"),
        request_id,
        interval,
        classify,
    )
}

/// Watch an asynchronous compliance job (export, PIA pack, erasure).
pub fn compliance_watcher(
    client: ApiClient,
    request_id: i64,
    interval: Duration,
) -> StatusWatcher {
    let classify: Classifier = Arc::new(move |outcome| match outcome {
        Ok(resp) => match resp.as_json() {
            Some(body) if status_of(body) == COMPLIANCE_STATUS_DONE => {
                Verdict::Complete(body.clone())
            }
            Some(body) if status_of(body) == COMPLIANCE_STATUS_ERROR => {
                Verdict::Failed(format!("Request {request_id} failed."))
            }
            _ => Verdict::Pending(None),
        },
        Err(e) => Verdict::Pending(Some(e.to_string())),
    });

    StatusWatcher::start(
        client,
        format!("{COMPLIANCE_REQUESTS_PATH}/{request_id}"),
        request_id.to_string(),
        interval,
        classify,
    )
}

/// Wait for a generated discharge summary to become available. Completes
/// on the first successful read, capturing the document payload (URL).
pub fn document_watcher(
    client: ApiClient,
    encounter_id: impl Into<String>,
    interval: Duration,
) -> StatusWatcher {
    let encounter_id = encounter_id.into();
    let classify: Classifier = Arc::new(|outcome| match outcome {
        Ok(resp) => Verdict::Complete(resp.as_json().cloned().unwrap_or(serde_json::Value::Null)),
        Err(e) => Verdict::Pending(Some(e.to_string())),
    });

    StatusWatcher::start(
        client,
        format!("{DISCHARGE_DOCUMENTS_PATH}/{encounter_id}"),
        encounter_id,
        interval,
        classify,
    )
}

/// Consent flow with manual retry.
///
/// Retry recreates the signature request server-side and restarts
/// polling from pending. The in-flight request id is never silently
/// dropped: on failure the existing watcher (and its subject) stays
/// untouched; on success the old watch is stopped explicitly and the
/// new id takes over.
pub struct SignatureFlow {
    client: ApiClient,
    interval: Duration,
    watcher: StatusWatcher,
}

impl SignatureFlow {
    /// Start watching an existing signature request.
    pub fn start(client: ApiClient, request_id: impl Into<String>, interval: Duration) -> Self {
        let watcher = signature_watcher(client.clone(), request_id, interval);
        Self {
            client,
            interval,
            watcher,
        }
    }

    /// The live watcher.
    pub fn watcher(&self) -> &StatusWatcher {
        &self.watcher
    }

    /// Request id currently being watched.
    pub fn request_id(&self) -> String {
        self.watcher.subject()
    }

    /// Recreate the signature request and restart polling from pending.
    /// Returns the new request id.
    pub async fn retry(
        &mut self,
        appointment_id: i64,
        signer_name: &str,
        email: &str,
    ) -> ClientResult<String> {
        let resp = self
            .client
            .post_json(
                SIGNATURE_REQUESTS_PATH,
                &json!({
                    "appointment_id": appointment_id,
                    "signer_name": signer_name,
                    "email": email,
                }),
            )
            .purpose(PurposeOfUse::Operations)
            .send()
            .await?;

        let new_id = resp
            .as_json()
            .and_then(|body| body.get("request_id"))
            .map(|rid| match rid.as_str() {
                Some(s) => s.to_string(),
                None => rid.to_string(),
            })
            .ok_or_else(|| {
                ClientError::Invalid(
                    "Could not start a new signature request. Please try again.".into(),
                )
            })?;

        info!(old = %self.watcher.subject(), new = %new_id, "signature request recreated");

        self.watcher.stop();
        self.watcher = signature_watcher(self.client.clone(), new_id.clone(), self.interval);
        Ok(new_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelink_types::WatchPhase;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TICK: Duration = Duration::from_millis(25);

    async fn wait_for_terminal(watcher: &StatusWatcher) {
        for _ in 0..200 {
            if watcher.phase().is_terminal() {
                return;
            }
            tokio::time::sleep(TICK).await;
        }
        panic!("watcher never reached a terminal phase");
    }

    #[tokio::test]
    async fn signature_completes_on_signed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/signature/requests/req-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING"})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/signature/requests/req-7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "SIGNED", "appointment_id": 12})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let watcher = signature_watcher(client, "req-7", TICK);
        wait_for_terminal(&watcher).await;

        let state = watcher.state();
        assert_eq!(state.phase, WatchPhase::Complete);
        assert_eq!(state.detail["appointment_id"], 12);
    }

    #[tokio::test]
    async fn signature_read_failure_is_still_pending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/signature/requests/req-8"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let watcher = signature_watcher(client, "req-8", TICK);

        tokio::time::sleep(TICK * 4).await;
        let state = watcher.state();
        assert_eq!(state.phase, WatchPhase::Pending);
        assert!(state.last_error.is_some());
        assert!(watcher.is_polling());
        watcher.stop();
    }

    #[tokio::test]
    async fn document_completes_on_first_successful_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/documents/discharge/enc-3"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not ready"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/documents/discharge/enc-3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"url": "https://docs/enc-3.pdf"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let watcher = document_watcher(client, "enc-3", TICK);
        wait_for_terminal(&watcher).await;

        let state = watcher.state();
        assert_eq!(state.phase, WatchPhase::Complete);
        assert_eq!(state.detail["url"], "https://docs/enc-3.pdf");
        assert!(!watcher.is_polling());
    }

    #[tokio::test]
    async fn retry_replaces_the_watched_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/signature/requests/req-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/signature/requests"))
            .and(header(carelink_client::PURPOSE_HEADER, "OPERATIONS"))
            .and(body_json(json!({
                "appointment_id": 12,
                "signer_name": "Patient",
                "email": "patient@example.com",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "req-2"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/signature/requests/req-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "SIGNED"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let mut flow = SignatureFlow::start(client, "req-1", TICK);
        assert_eq!(flow.request_id(), "req-1");

        let new_id = flow
            .retry(12, "Patient", "patient@example.com")
            .await
            .unwrap();
        assert_eq!(new_id, "req-2");
        assert_eq!(flow.request_id(), "req-2");

        wait_for_terminal(flow.watcher()).await;
        assert_eq!(flow.watcher().phase(), WatchPhase::Complete);
    }

    #[tokio::test]
    async fn failed_retry_keeps_the_existing_watch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/signature/requests/req-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/signature/requests"))
            .respond_with(
                ResponseTemplate::new(502).set_body_json(json!({"detail": "provider down"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let mut flow = SignatureFlow::start(client, "req-1", TICK);

        let err = flow
            .retry(12, "Patient", "patient@example.com")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "provider down");

        // Subject id survives the failed retry; polling continues.
        assert_eq!(flow.request_id(), "req-1");
        assert!(flow.watcher().is_polling());
        flow.watcher().stop();
    }
}
