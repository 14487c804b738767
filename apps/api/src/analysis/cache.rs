//! Analysis cache: one small state machine per `project_id`.
//!
//! ```text
//! NotRequested ──request──▶ Pending ──ok──▶ Ready
//!       ▲                      │
//!       │                      └──err──▶ Failed ──request──▶ Pending
//!       └──invalidate── (any)        Ready ──refresh──▶ Pending
//! ```
//!
//! At most one fetch per key is in flight. Every fetch is stamped with a
//! cache-wide generation; a result is applied only if its key still carries
//! that generation, so results for superseded fetches are dropped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::recommendation::{AnalysisRequest, AnalysisResult};
use crate::service_client::{AnalysisService, FailureKind, ServiceError};

/// Observable state of one project's analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum AnalysisState {
    NotRequested,
    Pending,
    Ready {
        payload: AnalysisResult,
    },
    Failed {
        failure_kind: FailureKind,
        message: String,
    },
}

/// What a single `request`/`refresh` call resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// Served from the cache; no network call was made.
    Cached(AnalysisResult),
    /// This call fetched and stored a fresh result.
    Completed(AnalysisResult),
    /// Another fetch for the same key is in flight; nothing was started.
    AlreadyPending,
    Failed {
        failure_kind: FailureKind,
        message: String,
    },
    /// The key was invalidated while this fetch ran; its result was dropped.
    Superseded,
}

struct Slot {
    state: AnalysisState,
    generation: u64,
}

#[derive(Default)]
struct Entries {
    slots: HashMap<String, Slot>,
    next_generation: u64,
}

impl Entries {
    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

enum Begin {
    Cached(AnalysisResult),
    InFlight,
    Started(u64),
}

struct Inner {
    service: Arc<dyn AnalysisService>,
    entries: Mutex<Entries>,
}

impl Inner {
    fn begin(&self, key: &str, force: bool) -> Begin {
        let mut entries = self.entries.lock();

        match entries.slots.get(key).map(|slot| &slot.state) {
            Some(AnalysisState::Pending) => return Begin::InFlight,
            Some(AnalysisState::Ready { payload }) if !force => {
                return Begin::Cached(payload.clone())
            }
            _ => {}
        }

        let generation = entries.bump();
        entries.slots.insert(
            key.to_string(),
            Slot {
                state: AnalysisState::Pending,
                generation,
            },
        );
        Begin::Started(generation)
    }

    /// Applies `state` to `key` only if the fetch stamped `generation` is still current.
    fn settle(&self, key: &str, generation: u64, state: AnalysisState) -> bool {
        let mut entries = self.entries.lock();
        match entries.slots.get_mut(key) {
            Some(slot) if slot.generation == generation => {
                slot.state = state;
                true
            }
            _ => {
                warn!("Discarding stale analysis result for {key} (generation {generation})");
                false
            }
        }
    }

    fn complete(
        &self,
        key: &str,
        generation: u64,
        outcome: Result<AnalysisResult, ServiceError>,
    ) -> RequestOutcome {
        let (state, result) = match outcome {
            Ok(payload) => (
                AnalysisState::Ready {
                    payload: payload.clone(),
                },
                RequestOutcome::Completed(payload),
            ),
            Err(e) => {
                let failure_kind = e.failure_kind();
                let message = e.to_string();
                warn!("Analysis for {key} failed ({failure_kind:?}): {message}");
                (
                    AnalysisState::Failed {
                        failure_kind,
                        message: message.clone(),
                    },
                    RequestOutcome::Failed {
                        failure_kind,
                        message,
                    },
                )
            }
        };

        if self.settle(key, generation, state) {
            result
        } else {
            RequestOutcome::Superseded
        }
    }
}

/// Cheap to clone; all clones share the same entries.
#[derive(Clone)]
pub struct AnalysisCache {
    inner: Arc<Inner>,
}

impl AnalysisCache {
    pub fn new(service: Arc<dyn AnalysisService>) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                entries: Mutex::new(Entries::default()),
            }),
        }
    }

    /// Returns the cached analysis, joins nothing, or starts exactly one fetch.
    ///
    /// `build` runs only when a fetch is actually started.
    pub async fn request<F>(&self, project_id: &str, build: F) -> RequestOutcome
    where
        F: FnOnce() -> AnalysisRequest,
    {
        self.run(project_id, build, false).await
    }

    /// User-initiated retry: like `request`, but also re-fetches a `Ready` entry.
    pub async fn refresh<F>(&self, project_id: &str, build: F) -> RequestOutcome
    where
        F: FnOnce() -> AnalysisRequest,
    {
        self.run(project_id, build, true).await
    }

    async fn run<F>(&self, project_id: &str, build: F, force: bool) -> RequestOutcome
    where
        F: FnOnce() -> AnalysisRequest,
    {
        let generation = match self.inner.begin(project_id, force) {
            Begin::Cached(payload) => {
                debug!("Analysis cache hit for {project_id}");
                return RequestOutcome::Cached(payload);
            }
            Begin::InFlight => {
                debug!("Analysis for {project_id} already in flight");
                return RequestOutcome::AlreadyPending;
            }
            Begin::Started(generation) => generation,
        };

        let request = build();
        let inner = self.inner.clone();
        let key = project_id.to_string();

        // Spawned so the entry settles even if the caller stops waiting.
        let fetch = tokio::spawn(async move {
            let outcome = inner.service.analyze(&request).await;
            inner.complete(&key, generation, outcome)
        });

        match fetch.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("Analysis task aborted: {e}");
                let failure_kind = FailureKind::TransportError;
                let state = AnalysisState::Failed {
                    failure_kind,
                    message: message.clone(),
                };
                if self.inner.settle(project_id, generation, state) {
                    RequestOutcome::Failed {
                        failure_kind,
                        message,
                    }
                } else {
                    RequestOutcome::Superseded
                }
            }
        }
    }

    /// Current state of `project_id`; unknown keys are `NotRequested`.
    pub fn status(&self, project_id: &str) -> AnalysisState {
        self.inner
            .entries
            .lock()
            .slots
            .get(project_id)
            .map(|slot| slot.state.clone())
            .unwrap_or(AnalysisState::NotRequested)
    }

    pub fn snapshot(&self) -> HashMap<String, AnalysisState> {
        self.inner
            .entries
            .lock()
            .slots
            .iter()
            .map(|(key, slot)| (key.clone(), slot.state.clone()))
            .collect()
    }

    /// The view lost interest in `project_id`: reset it and orphan any in-flight fetch.
    pub fn invalidate(&self, project_id: &str) {
        let mut entries = self.inner.entries.lock();
        let generation = entries.bump();
        if let Some(slot) = entries.slots.get_mut(project_id) {
            slot.state = AnalysisState::NotRequested;
            slot.generation = generation;
        }
    }

    /// Drops every entry. In-flight fetches complete into nothing.
    pub fn clear(&self) {
        let mut entries = self.inner.entries.lock();
        let dropped = entries.slots.len();
        entries.slots.clear();
        debug!("Cleared {dropped} analysis entries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recommendation::ProjectSkill;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{oneshot, Notify};

    enum Reply {
        Ok(&'static str),
        NotConfigured,
        Status(u16),
    }

    impl Reply {
        fn into_result(self) -> Result<AnalysisResult, ServiceError> {
            match self {
                Reply::Ok(text) => Ok(payload(text)),
                Reply::NotConfigured => Err(ServiceError::ServiceUnavailable(
                    "Configure LLM Services".to_string(),
                )),
                Reply::Status(status) => Err(ServiceError::RequestFailed {
                    status,
                    message: "upstream".to_string(),
                }),
            }
        }
    }

    /// Counts calls and parks each one until the test hands it a reply.
    #[derive(Default)]
    struct GatedService {
        calls: AtomicUsize,
        started: Notify,
        waiting: Mutex<Vec<oneshot::Sender<Reply>>>,
        requests: Mutex<Vec<AnalysisRequest>>,
    }

    impl GatedService {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Waits until `n` calls are parked.
        async fn wait_for_calls(&self, n: usize) {
            while self.waiting.lock().len() < n {
                self.started.notified().await;
            }
        }

        fn reply(&self, index: usize, reply: Reply) {
            let tx = std::mem::replace(&mut self.waiting.lock()[index], oneshot::channel().0);
            let _ = tx.send(reply);
        }
    }

    #[async_trait]
    impl AnalysisService for GatedService {
        async fn analyze(
            &self,
            request: &AnalysisRequest,
        ) -> Result<AnalysisResult, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().push(request.clone());
            let (tx, rx) = oneshot::channel();
            self.waiting.lock().push(tx);
            self.started.notify_one();
            match rx.await {
                Ok(reply) => reply.into_result(),
                Err(_) => Err(ServiceError::RequestFailed {
                    status: 499,
                    message: "dropped".to_string(),
                }),
            }
        }
    }

    /// Replies immediately, always the same way.
    struct InstantService {
        calls: AtomicUsize,
        not_configured: bool,
    }

    #[async_trait]
    impl AnalysisService for InstantService {
        async fn analyze(&self, _: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.not_configured {
                Reply::NotConfigured.into_result()
            } else {
                Ok(payload(if n == 0 { "first" } else { "again" }))
            }
        }
    }

    fn payload(text: &str) -> AnalysisResult {
        AnalysisResult {
            fitness_evaluation: format!("High - {text}"),
            recommended_courses: format!("Course for {text}"),
        }
    }

    fn build(project: &str) -> impl FnOnce() -> AnalysisRequest {
        let project = project.to_string();
        move || AnalysisRequest {
            employee_skills: vec![],
            employee_description: "ML work".to_string(),
            project_skills: vec![ProjectSkill {
                skill_name: "Python".to_string(),
                level: "Professional".to_string(),
                months: 36,
            }],
            project_description: project,
            score: 0.87,
        }
    }

    fn gated() -> (AnalysisCache, Arc<GatedService>) {
        let service = Arc::new(GatedService::default());
        (AnalysisCache::new(service.clone()), service)
    }

    async fn settle_until<F: Fn() -> bool>(condition: F) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition never became true");
    }

    #[tokio::test]
    async fn test_unknown_key_is_not_requested() {
        let (cache, service) = gated();
        assert_eq!(cache.status("proj_001"), AnalysisState::NotRequested);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_while_pending_fire_once() {
        let (cache, service) = gated();

        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_001", build("p1")).await }
        });
        service.wait_for_calls(1).await;
        assert_eq!(cache.status("proj_001"), AnalysisState::Pending);

        let second = cache.request("proj_001", build("p1")).await;
        assert_eq!(second, RequestOutcome::AlreadyPending);
        assert_eq!(service.calls(), 1);

        service.reply(0, Reply::Ok("first"));
        assert_eq!(
            first.await.unwrap(),
            RequestOutcome::Completed(payload("first"))
        );
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_ready_entry_is_served_without_network() {
        let service = Arc::new(InstantService {
            calls: AtomicUsize::new(0),
            not_configured: false,
        });
        let cache = AnalysisCache::new(service.clone());

        let first = cache.request("proj_001", build("p1")).await;
        assert_eq!(first, RequestOutcome::Completed(payload("first")));

        let mut built = false;
        for _ in 0..3 {
            let again = cache
                .request("proj_001", || {
                    built = true;
                    build("p1")()
                })
                .await;
            assert_eq!(again, RequestOutcome::Cached(payload("first")));
        }
        assert!(!built, "request builder must not run on a cache hit");
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.status("proj_001"),
            AnalysisState::Ready {
                payload: payload("first")
            }
        );
    }

    #[tokio::test]
    async fn test_not_configured_fails_with_service_unavailable_and_no_double_fire() {
        let (cache, service) = gated();

        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_002", build("p2")).await }
        });
        service.wait_for_calls(1).await;

        assert_eq!(
            cache.request("proj_002", build("p2")).await,
            RequestOutcome::AlreadyPending
        );

        service.reply(0, Reply::NotConfigured);
        let outcome = first.await.unwrap();
        assert!(matches!(
            outcome,
            RequestOutcome::Failed {
                failure_kind: FailureKind::ServiceUnavailable,
                ..
            }
        ));
        assert!(matches!(
            cache.status("proj_002"),
            AnalysisState::Failed {
                failure_kind: FailureKind::ServiceUnavailable,
                ..
            }
        ));
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_entry_retries_on_next_request() {
        let service = Arc::new(InstantService {
            calls: AtomicUsize::new(0),
            not_configured: true,
        });
        let cache = AnalysisCache::new(service.clone());

        for _ in 0..2 {
            let outcome = cache.request("proj_003", build("p3")).await;
            assert!(matches!(outcome, RequestOutcome::Failed { .. }));
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_request_failed_status_is_recorded() {
        let (cache, service) = gated();
        let pending = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_004", build("p4")).await }
        });
        service.wait_for_calls(1).await;
        service.reply(0, Reply::Status(500));

        assert!(matches!(
            pending.await.unwrap(),
            RequestOutcome::Failed {
                failure_kind: FailureKind::RequestFailed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_refresh_refetches_ready_entry() {
        let service = Arc::new(InstantService {
            calls: AtomicUsize::new(0),
            not_configured: false,
        });
        let cache = AnalysisCache::new(service.clone());

        cache.request("proj_001", build("p1")).await;
        let refreshed = cache.refresh("proj_001", build("p1")).await;

        assert_eq!(refreshed, RequestOutcome::Completed(payload("again")));
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            cache.status("proj_001"),
            AnalysisState::Ready {
                payload: payload("again")
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_is_a_no_op_while_pending() {
        let (cache, service) = gated();
        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_001", build("p1")).await }
        });
        service.wait_for_calls(1).await;

        assert_eq!(
            cache.refresh("proj_001", build("p1")).await,
            RequestOutcome::AlreadyPending
        );
        service.reply(0, Reply::Ok("first"));
        first.await.unwrap();
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_result_does_not_clobber_newer_fetch() {
        let (cache, service) = gated();

        let old = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_001", build("p1")).await }
        });
        service.wait_for_calls(1).await;

        cache.invalidate("proj_001");
        assert_eq!(cache.status("proj_001"), AnalysisState::NotRequested);

        let new = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_001", build("p1")).await }
        });
        service.wait_for_calls(2).await;

        // Old fetch lands first and must be discarded.
        service.reply(0, Reply::Ok("stale"));
        assert_eq!(old.await.unwrap(), RequestOutcome::Superseded);
        assert_eq!(cache.status("proj_001"), AnalysisState::Pending);

        service.reply(1, Reply::Ok("fresh"));
        assert_eq!(
            new.await.unwrap(),
            RequestOutcome::Completed(payload("fresh"))
        );
        assert_eq!(
            cache.status("proj_001"),
            AnalysisState::Ready {
                payload: payload("fresh")
            }
        );
    }

    #[tokio::test]
    async fn test_clear_orphans_in_flight_fetches() {
        let (cache, service) = gated();
        let pending = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_001", build("p1")).await }
        });
        service.wait_for_calls(1).await;

        cache.clear();
        service.reply(0, Reply::Ok("late"));

        assert_eq!(pending.await.unwrap(), RequestOutcome::Superseded);
        assert_eq!(cache.status("proj_001"), AnalysisState::NotRequested);
        assert!(cache.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let (cache, service) = gated();

        let a = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_a", build("a")).await }
        });
        service.wait_for_calls(1).await;
        let b = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_b", build("b")).await }
        });
        service.wait_for_calls(2).await;

        // Finish in reverse order of start.
        service.reply(1, Reply::NotConfigured);
        service.reply(0, Reply::Ok("a"));

        assert_eq!(a.await.unwrap(), RequestOutcome::Completed(payload("a")));
        assert!(matches!(b.await.unwrap(), RequestOutcome::Failed { .. }));

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(matches!(snapshot["proj_a"], AnalysisState::Ready { .. }));
        assert!(matches!(snapshot["proj_b"], AnalysisState::Failed { .. }));

        let projects: Vec<String> = service
            .requests
            .lock()
            .iter()
            .map(|r| r.project_description.clone())
            .collect();
        assert_eq!(projects, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_entry_settles_after_caller_gives_up() {
        let (cache, service) = gated();
        let caller = tokio::spawn({
            let cache = cache.clone();
            async move { cache.request("proj_001", build("p1")).await }
        });
        service.wait_for_calls(1).await;
        caller.abort();

        service.reply(0, Reply::Ok("first"));
        settle_until(|| matches!(cache.status("proj_001"), AnalysisState::Ready { .. })).await;
        assert_eq!(
            cache.request("proj_001", build("p1")).await,
            RequestOutcome::Cached(payload("first"))
        );
        assert_eq!(service.calls(), 1);
    }

    #[test]
    fn test_state_serializes_with_status_tag() {
        let failed = AnalysisState::Failed {
            failure_kind: FailureKind::ServiceUnavailable,
            message: "Configure LLM Services".to_string(),
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["status"], "Failed");
        assert_eq!(value["failure_kind"], "ServiceUnavailable");

        let pending = serde_json::to_value(AnalysisState::Pending).unwrap();
        assert_eq!(pending, serde_json::json!({"status": "Pending"}));
    }
}
