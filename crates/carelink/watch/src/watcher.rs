//! Classifier-driven status watcher.
//!
//! All poll-driven flows are one machine with differing terminal
//! predicates: read the status endpoint, classify the result, stop on a
//! terminal verdict. Each flow supplies only its classifier.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, warn};

use carelink_client::{ApiClient, ApiResponse, ClientResult};
use carelink_types::WatchPhase;

use crate::poller::{PollHandle, PollTick, Poller};

/// How a classifier reads one status response.
#[derive(Clone, Debug)]
pub enum Verdict {
    /// Keep polling. An attached message (e.g. a read failure) is
    /// recorded as the session's last error without stopping anything.
    Pending(Option<String>),
    /// Terminal success; the payload is kept on the watcher state.
    Complete(serde_json::Value),
    /// Terminal failure reported by the backend.
    Failed(String),
}

/// Maps a status-read outcome to a verdict.
pub type Classifier = Arc<dyn Fn(ClientResult<ApiResponse>) -> Verdict + Send + Sync>;

/// Observable state of one watch session.
#[derive(Clone, Debug)]
pub struct WatchState {
    /// Identifier of the watched resource. Stays visible across tick
    /// failures so the user never loses context.
    pub subject: String,
    pub phase: WatchPhase,
    /// Most recent tick failure, cleared by the next successful tick.
    pub last_error: Option<String>,
    /// Payload captured by the terminal verdict (e.g. a document URL).
    pub detail: serde_json::Value,
}

/// A live, cancelable status watch over one resource.
///
/// At most one timer per watcher; ticks are serialized by the
/// underlying [`Poller`]. Dropping the watcher stops polling.
pub struct StatusWatcher {
    state: Arc<RwLock<WatchState>>,
    handle: PollHandle,
}

impl StatusWatcher {
    /// Start polling `path` every `interval`, classifying each response
    /// with `classify`. The first read happens immediately.
    pub fn start(
        client: ApiClient,
        path: impl Into<String>,
        subject: impl Into<String>,
        interval: Duration,
        classify: Classifier,
    ) -> Self {
        let path = path.into();
        let subject = subject.into();
        let state = Arc::new(RwLock::new(WatchState {
            subject: subject.clone(),
            phase: WatchPhase::Pending,
            last_error: None,
            detail: serde_json::Value::Null,
        }));

        debug!(subject = %subject, path = %path, "status watch started");

        let tick_state = state.clone();
        let handle = Poller::spawn(interval, move || {
            let client = client.clone();
            let path = path.clone();
            let classify = classify.clone();
            let state = tick_state.clone();

            async move {
                let outcome = client.get(&path).send().await;
                let verdict = classify(outcome);

                let mut s = state.write().unwrap();
                match verdict {
                    Verdict::Pending(error) => {
                        if let Some(ref msg) = error {
                            warn!(subject = %s.subject, error = %msg, "status read failed; still pending");
                        }
                        s.last_error = error;
                        PollTick::Continue
                    }
                    Verdict::Complete(detail) => {
                        debug!(subject = %s.subject, "watch complete");
                        s.phase = WatchPhase::Complete;
                        s.last_error = None;
                        s.detail = detail;
                        PollTick::Stop
                    }
                    Verdict::Failed(message) => {
                        warn!(subject = %s.subject, error = %message, "watch failed");
                        s.phase = WatchPhase::Failed;
                        s.last_error = Some(message);
                        PollTick::Stop
                    }
                }
            }
        });

        Self { state, handle }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WatchState {
        self.state.read().unwrap().clone()
    }

    /// Current phase.
    pub fn phase(&self) -> WatchPhase {
        self.state.read().unwrap().phase
    }

    /// Identifier of the watched resource.
    pub fn subject(&self) -> String {
        self.state.read().unwrap().subject.clone()
    }

    /// Stop polling. No further reads occur after this returns; a read
    /// in flight is discarded.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// False once polling has stopped (terminal phase or disposal).
    pub fn is_polling(&self) -> bool {
        self.handle.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TICK: Duration = Duration::from_millis(25);

    fn status_classifier() -> Classifier {
        Arc::new(|outcome| match outcome {
            Ok(resp) => {
                let status = resp
                    .as_json()
                    .and_then(|v| v.get("status"))
                    .and_then(|s| s.as_str())
                    .unwrap_or_default()
                    .to_string();
                match status.as_str() {
                    "DONE" => Verdict::Complete(json!({"status": "DONE"})),
                    "ERROR" => Verdict::Failed("job reported ERROR".into()),
                    _ => Verdict::Pending(None),
                }
            }
            Err(e) => Verdict::Pending(Some(e.to_string())),
        })
    }

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
    async fn three_pending_then_done_means_exactly_four_reads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/compliance/requests/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING"})))
            .up_to_n_times(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/compliance/requests/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "DONE"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let watcher = StatusWatcher::start(
            client,
            "/v1/compliance/requests/9",
            "9",
            TICK,
            status_classifier(),
        );

        wait_for_terminal(&watcher).await;
        assert_eq!(watcher.phase(), WatchPhase::Complete);

        // Give any spurious fifth read time to show up, then count.
        tokio::time::sleep(TICK * 4).await;
        let reads = server.received_requests().await.unwrap().len();
        assert_eq!(reads, 4);
        assert!(!watcher.is_polling());
    }

    #[tokio::test]
    async fn tick_failures_record_last_error_and_keep_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/compliance/requests/3"))
            .respond_with(ResponseTemplate::new(500).set_body_string("worker crashed"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/compliance/requests/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "DONE"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let watcher = StatusWatcher::start(
            client,
            "/v1/compliance/requests/3",
            "3",
            TICK,
            status_classifier(),
        );

        wait_for_terminal(&watcher).await;

        // Reached terminal success despite two failing reads, and the
        // subject survived the errors.
        let state = watcher.state();
        assert_eq!(state.phase, WatchPhase::Complete);
        assert_eq!(state.subject, "3");
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn explicit_error_status_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/compliance/requests/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ERROR"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let watcher = StatusWatcher::start(
            client,
            "/v1/compliance/requests/4",
            "4",
            TICK,
            status_classifier(),
        );

        wait_for_terminal(&watcher).await;
        let state = watcher.state();
        assert_eq!(state.phase, WatchPhase::Failed);
        assert!(state.last_error.unwrap().contains("ERROR"));
    }

    #[tokio::test]
    async fn stopping_mid_pending_halts_reads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/compliance/requests/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let watcher = StatusWatcher::start(
            client,
            "/v1/compliance/requests/5",
            "5",
            TICK,
            status_classifier(),
        );

        tokio::time::sleep(TICK * 2).await;
        watcher.stop();
        let reads_at_stop = server.received_requests().await.unwrap().len();

        tokio::time::sleep(TICK * 6).await;
        let reads_after = server.received_requests().await.unwrap().len();
        assert_eq!(reads_at_stop, reads_after);
        assert_eq!(watcher.phase(), WatchPhase::Pending);
    }
}
