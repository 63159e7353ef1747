//! The navigation orchestrator.
//!
//! `navigate` is the central algorithm: consult the active session's cache,
//! fetch on a miss (or when forced), normalize every outcome into
//! [`RequestState`], keep the cache consistent, and recompute control
//! enablement on the way out. Suspension happens only at the network call.

use std::future::Future;

use tracing::{debug, warn};

use dirscope_api_client::{AnalyzeClient, AnalyzeOutcome, FetchError};
use dirscope_core::{
    AnalysisReport, ControlState, GateContext, LoadingGate, LoadingLabel, NavigationError,
    NavigationResult, RequestState,
};
use dirscope_local_store::cache;
use dirscope_local_store::{KeyValueStore, StoreError};

use crate::session::{ClientSession, SessionController, SessionError};

/// The outbound request seam. The production implementation is
/// [`AnalyzeClient`]; tests substitute canned responses.
pub trait DirectoryFetcher {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<AnalyzeOutcome, FetchError>>;
}

impl DirectoryFetcher for AnalyzeClient {
    async fn fetch(&self, path: &str) -> Result<AnalyzeOutcome, FetchError> {
        self.analyze(path).await
    }
}

/// What one navigation (or session operation) hands to the rendering layer:
/// the final request state, recomputed control enablement, and an optional
/// non-fatal notice (e.g. a storage-limit warning alongside a successful
/// listing).
#[derive(Debug)]
pub struct NavigateOutcome {
    pub state: RequestState,
    pub controls: ControlState,
    pub notice: Option<String>,
}

/// Composes the session controller, the fetcher, and the loading gate.
///
/// Takes `&mut self` for `navigate`, so one `Navigator` instance serializes
/// navigations by construction; there is no dedup or cancellation to model.
pub struct Navigator<S: KeyValueStore, F: DirectoryFetcher> {
    controller: SessionController<S>,
    fetcher: F,
    gate: LoadingGate,
    session: ClientSession,
    state: RequestState,
    current_path: String,
    selected_session: Option<String>,
}

impl<S: KeyValueStore, F: DirectoryFetcher> Navigator<S, F> {
    pub fn new(kv: S, fetcher: F) -> Self {
        Self {
            controller: SessionController::new(kv),
            fetcher,
            gate: LoadingGate::new(),
            session: ClientSession::inactive(),
            state: RequestState::Idle,
            current_path: String::new(),
            selected_session: None,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn controller(&self) -> &SessionController<S> {
        &self.controller
    }

    /// Registered session names, sorted.
    pub fn sessions(&self) -> Result<Vec<String>, StoreError> {
        self.controller.sessions()
    }

    /// Control enablement for the current state, recomputed on every call.
    pub fn controls(&self) -> ControlState {
        let known_sessions = self.known_sessions();
        let ctx = GateContext {
            current_path: &self.current_path,
            active_session: self.session.active_name(),
            selected_session: self.selected_session.as_deref(),
            known_sessions,
        };
        self.gate.controls(&ctx)
    }

    /// Record which registry entry is selected in the rendering layer's
    /// session picker; load/delete enablement follows the selection.
    pub fn select_session(&mut self, name: Option<String>) -> ControlState {
        self.selected_session = name;
        self.controls()
    }

    // ── Session operations ────────────────────────────────────────────────

    pub fn activate_session(&mut self, name: &str) -> Result<NavigateOutcome, SessionError> {
        let recovered = self.controller.activate(&mut self.session, name)?;
        self.selected_session = Some(name.to_string());
        self.reset_interface();
        let notice = recovered
            .then(|| format!("Cache for session '{name}' was corrupt and has been reset."));
        Ok(self.finish(notice))
    }

    pub fn deactivate_session(&mut self) -> NavigateOutcome {
        self.controller.deactivate(&mut self.session);
        self.reset_interface();
        self.finish(None)
    }

    pub fn clear_session(&mut self, name: &str) -> Result<NavigateOutcome, SessionError> {
        self.controller.clear(&mut self.session, name)?;
        if self.selected_session.as_deref() == Some(name) {
            self.selected_session = None;
        }
        self.reset_interface();
        Ok(self.finish(None))
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Navigate to `path`, serving from the active session's cache unless
    /// `force_refresh` is set. Cache entries never expire on their own; a
    /// hit always wins over a fetch.
    pub async fn navigate(&mut self, path: &str, force_refresh: bool) -> NavigateOutcome {
        self.reset_interface();

        let mut force = force_refresh;
        if !force && self.session.active_name().is_some() {
            match self.session.cache.get(path).map(cache::parse_entry) {
                Some(Some(entry)) => {
                    debug!("cache hit for '{path}'");
                    return self.finish_from_cache(path, entry);
                }
                Some(None) => {
                    // Structurally invalid entry: evict it and refetch once
                    // instead of surfacing a cache error to the user.
                    warn!("invalid cache entry for '{path}', evicting and refetching");
                    self.evict_invalid(path);
                    force = true;
                }
                None => debug!("cache miss for '{path}'"),
            }
        }
        self.fetch(path, force).await
    }

    async fn fetch(&mut self, path: &str, refreshing: bool) -> NavigateOutcome {
        self.state = RequestState::Loading(if refreshing {
            LoadingLabel::Refreshing
        } else {
            LoadingLabel::Analyzing
        });
        self.gate.lock();

        let mut notice = None;
        self.state = match self.fetcher.fetch(path).await {
            Err(err @ FetchError::Transport(_)) => {
                warn!("transport failure for '{path}': {err}");
                self.current_path = path.to_string();
                RequestState::Failed(NavigationError {
                    message: err.to_string(),
                    path: Some(path.to_string()),
                    // No response arrived, so no logs to show.
                    logs: Vec::new(),
                    from_cache: false,
                })
            }
            Err(err @ FetchError::Malformed { .. }) => {
                warn!("malformed response for '{path}': {err}");
                self.current_path = path.to_string();
                RequestState::Failed(NavigationError {
                    message: err.to_string(),
                    path: Some(path.to_string()),
                    logs: Vec::new(),
                    from_cache: false,
                })
            }
            Ok(outcome) => {
                let display_path = outcome
                    .report
                    .canonical_path()
                    .unwrap_or(path)
                    .to_string();
                self.current_path = display_path.clone();
                if outcome.report.is_error() || !outcome.transport_ok() {
                    let message = outcome
                        .report
                        .error
                        .clone()
                        .unwrap_or_else(|| format!("request failed ({})", outcome.status));
                    RequestState::Failed(NavigationError {
                        message,
                        path: Some(display_path),
                        logs: outcome.report.logs.clone(),
                        from_cache: false,
                    })
                } else {
                    notice = self.cache_result(&outcome.report);
                    RequestState::Succeeded(NavigationResult {
                        report: outcome.report,
                        from_cache: false,
                    })
                }
            }
        };
        self.finish(notice)
    }

    fn finish_from_cache(&mut self, requested: &str, report: AnalysisReport) -> NavigateOutcome {
        self.current_path = report.canonical_path().unwrap_or(requested).to_string();
        self.state = if let Some(message) = report.error.clone() {
            RequestState::Failed(NavigationError {
                message,
                path: Some(self.current_path.clone()),
                logs: report.logs.clone(),
                from_cache: true,
            })
        } else {
            RequestState::Succeeded(NavigationResult {
                report,
                from_cache: true,
            })
        };
        self.finish(None)
    }

    /// Persist a network success into the active session's cache. A missing
    /// canonical path skips caching; a persistence failure degrades to a
    /// notice. Neither fails the navigation.
    fn cache_result(&mut self, report: &AnalysisReport) -> Option<String> {
        let name = self.session.active_name().map(str::to_string)?;
        match cache::put(self.controller.kv(), &name, &mut self.session.cache, report) {
            Ok(_) => None,
            Err(StoreError::CapacityExceeded) => {
                warn!("storage limit reached for session '{name}'");
                Some(format!("Storage limit reached for session '{name}'."))
            }
            Err(err) => {
                warn!("could not save result to session '{name}': {err}");
                Some(format!("Could not save result to session '{name}': {err}"))
            }
        }
    }

    fn evict_invalid(&mut self, path: &str) {
        let Some(name) = self.session.active_name().map(str::to_string) else {
            return;
        };
        if let Err(err) = cache::evict(self.controller.kv(), &name, &mut self.session.cache, path)
        {
            warn!("could not persist eviction of '{path}': {err}");
        }
    }

    fn reset_interface(&mut self) {
        self.state = RequestState::Idle;
        self.current_path.clear();
    }

    /// Leave the loading state (whether or not it was entered) and hand the
    /// final state to rendering with freshly recomputed enablement.
    fn finish(&mut self, notice: Option<String>) -> NavigateOutcome {
        let known_sessions = self.known_sessions();
        let ctx = GateContext {
            current_path: &self.current_path,
            active_session: self.session.active_name(),
            selected_session: self.selected_session.as_deref(),
            known_sessions,
        };
        let controls = self.gate.unlock(&ctx);
        NavigateOutcome {
            state: self.state.clone(),
            controls,
            notice,
        }
    }

    fn known_sessions(&self) -> usize {
        // A store read failure reads as an empty registry: enablement
        // reflects current data only.
        self.controller
            .sessions()
            .map(|names| names.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use dirscope_core::{ChildEntry, EntryKind};
    use dirscope_local_store::MemoryStore;

    #[derive(Default)]
    struct FakeFetcher {
        responses: RefCell<VecDeque<Result<AnalyzeOutcome, FetchError>>>,
        calls: Cell<usize>,
    }

    impl FakeFetcher {
        fn push_ok(&self, status: u16, report: AnalysisReport) {
            self.responses
                .borrow_mut()
                .push_back(Ok(AnalyzeOutcome { status, report }));
        }

        fn push_err(&self, err: FetchError) {
            self.responses.borrow_mut().push_back(Err(err));
        }

        fn calls(&self) -> usize {
            self.calls.get()
        }
    }

    impl DirectoryFetcher for &FakeFetcher {
        async fn fetch(&self, path: &str) -> Result<AnalyzeOutcome, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected fetch for '{path}'"))
        }
    }

    fn listing(path: &str, total: u64) -> AnalysisReport {
        AnalysisReport {
            path: Some(path.to_string()),
            results: vec![ChildEntry {
                name: "sub".to_string(),
                path: format!("{path}/sub"),
                kind: EntryKind::Directory,
                size: Some(4096),
                human_readable_size: Some("4 KB".to_string()),
                error: None,
            }],
            total_items_in_dir: Some(total),
            logs: vec!["INFO: scan complete".to_string()],
            error: None,
        }
    }

    fn navigator(fetcher: &FakeFetcher) -> Navigator<MemoryStore, &FakeFetcher> {
        Navigator::new(MemoryStore::new(), fetcher)
    }

    async fn transport_error() -> FetchError {
        // Nothing listens on the discard port; the connect fails fast.
        let client = reqwest::Client::new();
        let err = client
            .get("http://127.0.0.1:1/analyze")
            .send()
            .await
            .expect_err("connection refused");
        FetchError::Transport(err)
    }

    #[tokio::test]
    async fn miss_fetches_then_hit_serves_from_cache() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        nav.activate_session("work").expect("activate");

        fetcher.push_ok(200, listing("/tmp", 1));
        let first = nav.navigate("/tmp", false).await;
        let RequestState::Succeeded(first_result) = &first.state else {
            panic!("expected success, got {:?}", first.state);
        };
        assert!(!first_result.from_cache);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(nav.session().cached_paths(), 1);

        // Second navigation: identical result, no network step.
        let second = nav.navigate("/tmp", false).await;
        let RequestState::Succeeded(second_result) = &second.state else {
            panic!("expected success, got {:?}", second.state);
        };
        assert!(second_result.from_cache);
        assert_eq!(second_result.report, first_result.report);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn no_active_session_always_fetches_and_never_caches() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);

        fetcher.push_ok(200, listing("/tmp", 1));
        fetcher.push_ok(200, listing("/tmp", 1));
        nav.navigate("/tmp", false).await;
        nav.navigate("/tmp", false).await;
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(nav.session().cached_paths(), 0);
        assert!(
            nav.controller()
                .kv()
                .get(&cache::cache_key("work"))
                .expect("get")
                .is_none()
        );
    }

    #[tokio::test]
    async fn force_refresh_bypasses_the_cache() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        nav.activate_session("work").expect("activate");

        fetcher.push_ok(200, listing("/tmp", 1));
        nav.navigate("/tmp", false).await;

        fetcher.push_ok(200, listing("/tmp", 2));
        let refreshed = nav.navigate("/tmp", true).await;
        let RequestState::Succeeded(result) = &refreshed.state else {
            panic!("expected success, got {:?}", refreshed.state);
        };
        assert!(!result.from_cache);
        assert_eq!(result.report.total_items_in_dir, Some(2));
        assert_eq!(fetcher.calls(), 2);

        // The refresh overwrote the stale entry.
        let entry = nav.session().cache.get("/tmp").expect("entry");
        let healed = cache::parse_entry(entry).expect("valid entry");
        assert_eq!(healed.total_items_in_dir, Some(2));
    }

    #[tokio::test]
    async fn canonical_path_is_the_cache_key() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        nav.activate_session("work").expect("activate");

        // Requested with a trailing slash; backend reports "/tmp".
        fetcher.push_ok(200, listing("/tmp", 1));
        let outcome = nav.navigate("/tmp/", false).await;
        assert!(matches!(outcome.state, RequestState::Succeeded(_)));
        assert_eq!(nav.current_path(), "/tmp");
        assert!(nav.session().cache.contains_key("/tmp"));
        assert!(!nav.session().cache.contains_key("/tmp/"));

        // The canonical key is now a hit.
        let hit = nav.navigate("/tmp", false).await;
        assert!(matches!(
            hit.state,
            RequestState::Succeeded(NavigationResult {
                from_cache: true,
                ..
            })
        ));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn server_reported_error_fails_and_is_not_cached() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        nav.activate_session("work").expect("activate");

        fetcher.push_ok(
            404,
            AnalysisReport {
                path: Some("/missing".to_string()),
                results: Vec::new(),
                total_items_in_dir: None,
                logs: vec!["ERROR: Path does not exist: /missing".to_string()],
                error: Some("not found".to_string()),
            },
        );
        let outcome = nav.navigate("/missing", false).await;
        let RequestState::Failed(error) = &outcome.state else {
            panic!("expected failure, got {:?}", outcome.state);
        };
        assert_eq!(error.message, "not found");
        assert_eq!(error.path.as_deref(), Some("/missing"));
        assert_eq!(error.logs.len(), 1);
        assert_eq!(nav.session().cached_paths(), 0);
    }

    #[tokio::test]
    async fn error_in_2xx_body_is_treated_identically() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);

        fetcher.push_ok(
            200,
            AnalysisReport {
                path: None,
                results: Vec::new(),
                total_items_in_dir: None,
                logs: Vec::new(),
                error: Some("permission denied".to_string()),
            },
        );
        let outcome = nav.navigate("/root/secret", false).await;
        let RequestState::Failed(error) = &outcome.state else {
            panic!("expected failure, got {:?}", outcome.state);
        };
        assert_eq!(error.message, "permission denied");
        // No canonical path in the body: the requested path is displayed.
        assert_eq!(error.path.as_deref(), Some("/root/secret"));
    }

    #[tokio::test]
    async fn non_2xx_without_error_field_gets_a_generic_message() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);

        fetcher.push_ok(
            502,
            AnalysisReport {
                path: None,
                results: Vec::new(),
                total_items_in_dir: None,
                logs: Vec::new(),
                error: None,
            },
        );
        let outcome = nav.navigate("/tmp", false).await;
        let RequestState::Failed(error) = &outcome.state else {
            panic!("expected failure, got {:?}", outcome.state);
        };
        assert_eq!(error.message, "request failed (502)");
    }

    #[tokio::test]
    async fn malformed_response_failure_names_the_status() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);

        fetcher.push_err(FetchError::Malformed {
            status: 500,
            excerpt: "<html>boom</html>".to_string(),
        });
        let outcome = nav.navigate("/tmp", false).await;
        let RequestState::Failed(error) = &outcome.state else {
            panic!("expected failure, got {:?}", outcome.state);
        };
        assert!(error.message.contains("500"));
        assert!(error.message.contains("<html>boom</html>"));
    }

    #[tokio::test]
    async fn transport_failure_is_generic_with_no_logs() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);

        fetcher.push_err(transport_error().await);
        let outcome = nav.navigate("/tmp", false).await;
        let RequestState::Failed(error) = &outcome.state else {
            panic!("expected failure, got {:?}", outcome.state);
        };
        assert_eq!(error.message, "network error or server unreachable");
        assert!(error.logs.is_empty());
        assert_eq!(nav.current_path(), "/tmp");
        assert!(outcome.controls.refresh);
    }

    #[tokio::test]
    async fn invalid_cache_entry_is_evicted_and_refetched_once() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        nav.activate_session("work").expect("activate");

        fetcher.push_ok(200, listing("/tmp", 1));
        nav.navigate("/tmp", false).await;

        // Corrupt the stored entry in place.
        nav.session
            .cache
            .insert("/tmp".to_string(), serde_json::Value::Null);
        cache::save_cache(nav.controller().kv(), "work", &nav.session.cache).expect("save");

        fetcher.push_ok(200, listing("/tmp", 5));
        let outcome = nav.navigate("/tmp", false).await;
        let RequestState::Succeeded(result) = &outcome.state else {
            panic!("expected success, got {:?}", outcome.state);
        };
        // Served by the forced refetch, not the corrupt entry.
        assert!(!result.from_cache);
        assert_eq!(result.report.total_items_in_dir, Some(5));
        assert_eq!(fetcher.calls(), 2);

        // The cache healed itself.
        let entry = nav.session().cache.get("/tmp").expect("entry");
        assert!(cache::parse_entry(entry).is_some());
    }

    #[tokio::test]
    async fn cached_error_result_serves_as_a_cache_sourced_failure() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        nav.activate_session("work").expect("activate");

        // An error report stored under its canonical path (older sessions
        // may contain these).
        let error_report = AnalysisReport {
            path: Some("/gone".to_string()),
            results: Vec::new(),
            total_items_in_dir: None,
            logs: Vec::new(),
            error: Some("vanished".to_string()),
        };
        nav.session.cache.insert(
            "/gone".to_string(),
            serde_json::to_value(&error_report).expect("to_value"),
        );

        let outcome = nav.navigate("/gone", false).await;
        let RequestState::Failed(error) = &outcome.state else {
            panic!("expected failure, got {:?}", outcome.state);
        };
        assert!(error.from_cache);
        assert_eq!(error.message, "vanished");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn capacity_overrun_degrades_to_a_notice() {
        let fetcher = FakeFetcher::default();
        let mut nav = Navigator::new(MemoryStore::with_capacity(64), &fetcher);
        nav.activate_session("work").expect("activate");

        fetcher.push_ok(200, listing("/tmp", 1));
        let outcome = nav.navigate("/tmp", false).await;
        // The navigation itself still succeeds.
        assert!(matches!(outcome.state, RequestState::Succeeded(_)));
        let notice = outcome.notice.expect("storage notice");
        assert!(notice.contains("Storage limit"));
        assert!(notice.contains("work"));
    }

    #[tokio::test]
    async fn missing_canonical_path_skips_caching_without_failing() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        nav.activate_session("work").expect("activate");

        let mut anonymous = listing("/tmp", 1);
        anonymous.path = None;
        fetcher.push_ok(200, anonymous);
        let outcome = nav.navigate("/tmp", false).await;
        assert!(matches!(outcome.state, RequestState::Succeeded(_)));
        assert!(outcome.notice.is_none());
        assert_eq!(nav.session().cached_paths(), 0);
        assert_eq!(nav.current_path(), "/tmp");
    }

    #[tokio::test]
    async fn session_operations_reset_the_interface() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        fetcher.push_ok(200, listing("/tmp", 1));
        nav.navigate("/tmp", false).await;
        assert_eq!(nav.current_path(), "/tmp");

        let outcome = nav.activate_session("work").expect("activate");
        assert_eq!(outcome.state, RequestState::Idle);
        assert_eq!(nav.current_path(), "");
        assert!(outcome.controls.clear_session);
        assert!(!outcome.controls.refresh);

        let outcome = nav.clear_session("work").expect("clear");
        assert!(!outcome.controls.clear_session);
        assert!(!outcome.controls.load_selected);
        assert_eq!(nav.sessions().expect("list").len(), 0);
    }

    #[tokio::test]
    async fn selection_drives_load_and_delete_enablement() {
        let fetcher = FakeFetcher::default();
        let mut nav = navigator(&fetcher);
        nav.activate_session("work").expect("activate");
        nav.deactivate_session();

        let controls = nav.select_session(Some("work".to_string()));
        assert!(controls.load_selected);
        assert!(controls.delete_selected);
        assert!(controls.session_selector);

        let controls = nav.select_session(None);
        assert!(!controls.load_selected);
        assert!(!controls.delete_selected);
    }
}
