use std::fmt;

use crate::{AppViewModel, CompletionSignal, ProgressSnapshot, ResultPayload};

/// Client-side identifier of one upload session. Monotonic per `AppState`.
pub type SessionId = u64;

/// Sanity ceiling on polls per session; the wall-clock timeout is the real bound.
pub const DEFAULT_MAX_POLLS: u32 = 300;

/// Page stage shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Upload,
    Processing,
    Results,
}

/// Externally visible state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Uploading,
    Processing,
    Results,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uploading,
    Polling { in_flight: bool },
    /// Completion detected; the result fetch is outstanding.
    Fetching,
    Results,
    Failed { at: Stage },
    /// The host view went away while the session was live.
    Detached,
}

impl Phase {
    pub fn is_live(self) -> bool {
        matches!(
            self,
            Phase::Uploading | Phase::Polling { .. } | Phase::Fetching
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Upload,
    ProcessingTimeout,
    ResultFetch,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Upload => write!(f, "upload failed"),
            FailureKind::ProcessingTimeout => write!(f, "processing timed out"),
            FailureKind::ResultFetch => write!(f, "fetching results failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SessionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadSession {
    pub id: SessionId,
    pub file_name: String,
    pub request_id: Option<String>,
    pub phase: Phase,
    pub progress: ProgressSnapshot,
    pub result: Option<ResultPayload>,
    pub error: Option<SessionFailure>,
    pub polls_issued: u32,
    pub poll_failures: u32,
    /// Last transient poll error; cleared by the next successful poll.
    pub poll_warning: Option<String>,
    pub completion: Option<CompletionSignal>,
}

impl UploadSession {
    fn new(id: SessionId, file_name: String) -> Self {
        Self {
            id,
            file_name,
            request_id: None,
            phase: Phase::Uploading,
            progress: ProgressSnapshot::zeroed(),
            result: None,
            error: None,
            polls_issued: 0,
            poll_failures: 0,
            poll_warning: None,
            completion: None,
        }
    }

    pub fn stage(&self) -> Stage {
        match self.phase {
            Phase::Uploading => Stage::Upload,
            Phase::Polling { .. } | Phase::Fetching | Phase::Detached => Stage::Processing,
            Phase::Results => Stage::Results,
            Phase::Failed { at } => at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    session: Option<UploadSession>,
    last_session_id: SessionId,
    max_polls: u32,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_max_polls(DEFAULT_MAX_POLLS)
    }

    pub fn with_max_polls(max_polls: u32) -> Self {
        Self {
            session: None,
            last_session_id: 0,
            max_polls: max_polls.max(1),
            dirty: false,
        }
    }

    pub fn session(&self) -> Option<&UploadSession> {
        self.session.as_ref()
    }

    pub fn session_state(&self) -> SessionState {
        match self.session.as_ref().map(|s| s.phase) {
            None | Some(Phase::Detached) => SessionState::Idle,
            Some(Phase::Uploading) => SessionState::Uploading,
            Some(Phase::Polling { .. }) | Some(Phase::Fetching) => SessionState::Processing,
            Some(Phase::Results) => SessionState::Results,
            Some(Phase::Failed { .. }) => SessionState::Failed,
        }
    }

    /// True while a session is uploading, polling, or fetching its result.
    pub fn is_live(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.phase.is_live())
    }

    pub fn current_session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn max_polls(&self) -> u32 {
        self.max_polls
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self, self.dirty)
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn begin_session(&mut self, file_name: String) -> SessionId {
        self.last_session_id += 1;
        let id = self.last_session_id;
        self.session = Some(UploadSession::new(id, file_name));
        self.mark_dirty();
        id
    }

    pub(crate) fn clear_session(&mut self) -> Option<UploadSession> {
        let previous = self.session.take();
        if previous.is_some() {
            self.mark_dirty();
        }
        previous
    }

    /// The session with `id`, if it is still the current one.
    pub(crate) fn session_mut(&mut self, id: SessionId) -> Option<&mut UploadSession> {
        self.session.as_mut().filter(|s| s.id == id)
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut UploadSession> {
        self.session.as_mut()
    }
}
