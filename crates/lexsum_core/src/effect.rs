use crate::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tear down the session's timers, and with `CleanupScope::Session` its requests too.
    Cleanup {
        session: SessionId,
        scope: CleanupScope,
    },
    Upload {
        session: SessionId,
        file_name: String,
    },
    /// Arm the recurring poll timer and the overall timeout.
    StartPolling {
        session: SessionId,
        request_id: String,
    },
    Poll {
        session: SessionId,
        request_id: String,
    },
    FetchResult {
        session: SessionId,
        request_id: String,
    },
    RecordSession(SessionRecord),
    NotifyCompleted {
        session: SessionId,
        request_id: String,
        file_name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupScope {
    Timers,
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Processing,
    Completed,
    Failed,
}

impl RecordStatus {
    pub fn label(self) -> &'static str {
        match self {
            RecordStatus::Processing => "processing",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        }
    }
}

/// What to write into the recent-documents cache for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session: SessionId,
    pub request_id: String,
    pub file_name: String,
    pub status: RecordStatus,
}
