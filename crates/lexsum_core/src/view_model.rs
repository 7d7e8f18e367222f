use crate::{
    AppState, CompletionSignal, ProgressSnapshot, ResultPayload, SessionFailure, SessionId,
    SessionState, Stage,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub state: SessionState,
    pub stage: Stage,
    pub session_id: Option<SessionId>,
    pub file_name: Option<String>,
    pub request_id: Option<String>,
    pub progress: ProgressSnapshot,
    pub result: Option<ResultPayload>,
    pub error: Option<SessionFailure>,
    pub poll_warning: Option<String>,
    pub polls_issued: u32,
    pub completion: Option<CompletionSignal>,
    pub dirty: bool,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState, dirty: bool) -> Self {
        let Some(session) = state.session() else {
            return Self {
                dirty,
                ..Self::default()
            };
        };
        Self {
            state: state.session_state(),
            stage: session.stage(),
            session_id: Some(session.id),
            file_name: Some(session.file_name.clone()),
            request_id: session.request_id.clone(),
            progress: session.progress.clone(),
            result: session.result.clone(),
            error: session.error.clone(),
            poll_warning: session.poll_warning.clone(),
            polls_issued: session.polls_issued,
            completion: session.completion,
            dirty,
        }
    }
}
