use std::future::Future;
use std::sync::Arc;

use lexsum_core::{
    update, AppState, AppViewModel, CleanupScope, Effect, Msg, SessionId, SessionRecord,
};
use lexsum_logging::{lexsum_debug, lexsum_error, lexsum_info, lexsum_warn};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::notify::{CompletionNotifier, SessionCompleted};
use crate::recent::RecentDocumentStore;
use crate::timers::{PollSettings, TimerSet};
use crate::{BackendApi, UploadFile};

/// Runs the session state machine against a backend.
///
/// Messages are handled one at a time. Network calls and timers run as
/// tokio tasks that post their outcome back onto the controller's channel,
/// so every method here must be called from inside a tokio runtime.
pub struct SessionController {
    state: AppState,
    api: Arc<dyn BackendApi>,
    settings: PollSettings,
    msg_tx: mpsc::UnboundedSender<Msg>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    timers: TimerSet,
    requests: Option<(SessionId, CancellationToken)>,
    staged_upload: Option<UploadFile>,
    recent: Option<RecentDocumentStore>,
    notifier: CompletionNotifier,
}

impl SessionController {
    pub fn new(api: Arc<dyn BackendApi>, settings: PollSettings) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::with_max_polls(settings.max_polls),
            api,
            settings,
            msg_tx,
            msg_rx,
            timers: TimerSet::new(),
            requests: None,
            staged_upload: None,
            recent: None,
            notifier: CompletionNotifier::default(),
        }
    }

    pub fn with_recent_store(mut self, store: RecentDocumentStore) -> Self {
        self.recent = Some(store);
        self
    }

    pub fn with_notifier(mut self, notifier: CompletionNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionCompleted> {
        self.notifier.subscribe()
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    pub fn is_live(&self) -> bool {
        self.state.is_live()
    }

    pub fn timers_active(&self) -> bool {
        self.timers.is_active()
    }

    pub fn requests_active(&self) -> bool {
        self.requests.is_some()
    }

    /// Starts a new session for `file`, tearing down any previous one first.
    pub fn submit(&mut self, file: UploadFile) -> SessionId {
        let file_name = file.file_name.clone();
        self.staged_upload = Some(file);
        self.dispatch(Msg::FileSubmitted { file_name });
        // The upload effect has taken the file by now.
        self.staged_upload = None;
        self.state.current_session_id().unwrap_or_default()
    }

    /// Requests one progress poll; a no-op while another poll is outstanding.
    pub fn poll(&mut self) {
        if let Some(session) = self.state.current_session_id() {
            self.dispatch(Msg::PollTick { session });
        }
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::ResetClicked);
    }

    pub fn navigate_away(&mut self) {
        self.dispatch(Msg::NavigatedAway);
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    /// Waits for the next task or timer message and applies it.
    pub async fn next_event(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    /// Applies every message already queued without waiting. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg);
            handled += 1;
        }
        handled
    }

    /// Drives the current session until it reaches results or fails.
    pub async fn run_until_settled(&mut self) -> AppViewModel {
        while self.state.is_live() {
            if !self.next_event().await {
                break;
            }
        }
        self.view()
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Cleanup { session, scope } => self.cleanup(session, scope),
            Effect::Upload { session, file_name } => self.spawn_upload(session, file_name),
            Effect::StartPolling {
                session,
                request_id,
            } => {
                lexsum_info!(
                    "session {} polling request_id={} every {:?}",
                    session,
                    request_id,
                    self.settings.interval
                );
                self.timers
                    .start(session, &self.settings, self.msg_tx.clone());
            }
            Effect::Poll {
                session,
                request_id,
            } => self.spawn_poll(session, request_id),
            Effect::FetchResult {
                session,
                request_id,
            } => self.spawn_fetch(session, request_id),
            Effect::RecordSession(record) => self.record(&record),
            Effect::NotifyCompleted {
                session,
                request_id,
                file_name,
            } => {
                let receivers = self.notifier.notify(SessionCompleted {
                    session,
                    request_id,
                    file_name,
                });
                lexsum_debug!(
                    "session {} completion sent to {} listeners",
                    session,
                    receivers
                );
            }
        }
    }

    /// Stops timers, and for `CleanupScope::Session` also in-flight requests.
    ///
    /// The staged file is left alone: during a resubmit it already belongs
    /// to the session that replaces `session`.
    fn cleanup(&mut self, session: SessionId, scope: CleanupScope) {
        self.timers.cancel(session);
        if scope == CleanupScope::Session
            && matches!(self.requests, Some((id, _)) if id == session)
        {
            if let Some((_, token)) = self.requests.take() {
                token.cancel();
            }
        }
    }

    fn request_token(&mut self, session: SessionId) -> CancellationToken {
        if let Some((id, token)) = &self.requests {
            if *id == session {
                return token.clone();
            }
        }
        if let Some((_, stale)) = self.requests.take() {
            stale.cancel();
        }
        let token = CancellationToken::new();
        self.requests = Some((session, token.clone()));
        token
    }

    fn spawn_request<F>(&mut self, session: SessionId, request: F)
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        let token = self.request_token(session);
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                msg = request => {
                    let _ = tx.send(msg);
                }
            }
        });
    }

    fn spawn_upload(&mut self, session: SessionId, file_name: String) {
        let Some(file) = self.staged_upload.take() else {
            lexsum_error!("session {} has no staged file for {}", session, file_name);
            let _ = self.msg_tx.send(Msg::UploadFailed {
                session,
                message: "no file staged for upload".to_string(),
            });
            return;
        };
        lexsum_info!(
            "session {} uploading {} ({} bytes)",
            session,
            file_name,
            file.bytes.len()
        );
        let api = self.api.clone();
        self.spawn_request(session, async move {
            match api.upload(&file).await {
                Ok(request_id) => Msg::UploadAccepted {
                    session,
                    request_id,
                },
                Err(err) => {
                    lexsum_warn!("upload of {} failed: {}", file.file_name, err);
                    Msg::UploadFailed {
                        session,
                        message: err.to_string(),
                    }
                }
            }
        });
    }

    fn spawn_poll(&mut self, session: SessionId, request_id: String) {
        let api = self.api.clone();
        self.spawn_request(session, async move {
            match api.progress(&request_id).await {
                Ok(snapshot) => Msg::ProgressReceived { session, snapshot },
                Err(err) => {
                    lexsum_warn!("progress poll for {} failed: {}", request_id, err);
                    Msg::ProgressFailed {
                        session,
                        message: err.to_string(),
                    }
                }
            }
        });
    }

    fn spawn_fetch(&mut self, session: SessionId, request_id: String) {
        lexsum_info!("session {} complete, fetching result for {}", session, request_id);
        let api = self.api.clone();
        self.spawn_request(session, async move {
            match api.complete_summary(&request_id).await {
                Ok(payload) => Msg::ResultReceived { session, payload },
                Err(err) => {
                    lexsum_error!("result fetch for {} failed: {}", request_id, err);
                    Msg::ResultFailed {
                        session,
                        message: err.to_string(),
                    }
                }
            }
        });
    }

    fn record(&self, record: &SessionRecord) {
        let Some(store) = &self.recent else {
            return;
        };
        let payload = self
            .state
            .session()
            .filter(|session| session.id == record.session)
            .and_then(|session| session.result.as_ref());
        if let Err(err) = store.record_session(record, payload) {
            lexsum_error!(
                "failed to record session {} in recent documents: {}",
                record.session,
                err
            );
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.timers.cancel_all();
        if let Some((_, token)) = self.requests.take() {
            token.cancel();
        }
    }
}
