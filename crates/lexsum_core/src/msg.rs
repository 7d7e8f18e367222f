use crate::{ProgressSnapshot, ResultPayload, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a file for analysis.
    FileSubmitted { file_name: String },
    /// Ingestion endpoint accepted the file.
    UploadAccepted {
        session: SessionId,
        request_id: String,
    },
    /// Ingestion failed, timed out, or returned no request id.
    UploadFailed { session: SessionId, message: String },
    /// Recurring poll timer fired.
    PollTick { session: SessionId },
    /// One progress poll returned.
    ProgressReceived {
        session: SessionId,
        snapshot: ProgressSnapshot,
    },
    /// One progress poll failed; transient.
    ProgressFailed { session: SessionId, message: String },
    /// Consolidated result payload arrived.
    ResultReceived {
        session: SessionId,
        payload: ResultPayload,
    },
    /// Fetching the consolidated result failed.
    ResultFailed { session: SessionId, message: String },
    /// Overall session timeout elapsed.
    SessionTimedOut { session: SessionId },
    /// User asked to start over.
    ResetClicked,
    /// Host view is going away.
    NavigatedAway,
    /// Render tick to coalesce output.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
