use crate::{
    detect_completion, AppState, CleanupScope, Effect, FailureKind, Msg, Phase, ProgressSnapshot,
    RecordStatus, SessionFailure, SessionRecord, Stage, UploadSession,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSubmitted { file_name } => {
            // The previous session is torn down before the new one exists.
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = state.clear_session() {
                effects.push(Effect::Cleanup {
                    session: previous.id,
                    scope: CleanupScope::Session,
                });
            }
            let session = state.begin_session(file_name.clone());
            effects.push(Effect::Upload { session, file_name });
            effects
        }
        Msg::UploadAccepted {
            session,
            request_id,
        } => {
            let effects = match state.session_mut(session) {
                Some(current) if current.phase == Phase::Uploading => {
                    accept_upload(current, request_id)
                }
                _ => return (state, Vec::new()),
            };
            state.mark_dirty();
            effects
        }
        Msg::UploadFailed { session, message } => {
            let effects = match state.session_mut(session) {
                Some(current) if current.phase == Phase::Uploading => {
                    fail(current, Stage::Upload, FailureKind::Upload, message)
                }
                _ => return (state, Vec::new()),
            };
            state.mark_dirty();
            effects
        }
        Msg::PollTick { session } => {
            let max_polls = state.max_polls();
            match state.session_mut(session) {
                Some(current) => start_poll(current, max_polls),
                None => Vec::new(),
            }
        }
        Msg::ProgressReceived { session, snapshot } => {
            let effects = match state.session_mut(session) {
                Some(current) if matches!(current.phase, Phase::Polling { .. }) => {
                    current.progress = snapshot;
                    current.poll_warning = None;
                    finish_poll(current)
                }
                // Late responses after completion or teardown are dropped.
                _ => return (state, Vec::new()),
            };
            state.mark_dirty();
            effects
        }
        Msg::ProgressFailed { session, message } => {
            match state.session_mut(session) {
                Some(current) if matches!(current.phase, Phase::Polling { .. }) => {
                    current.phase = Phase::Polling { in_flight: false };
                    current.poll_failures += 1;
                    current.poll_warning = Some(message);
                }
                _ => return (state, Vec::new()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::ResultReceived { session, payload } => {
            let effects = match state.session_mut(session) {
                Some(current) if current.phase == Phase::Fetching => {
                    current.phase = Phase::Results;
                    current.result = Some(payload);
                    current.error = None;
                    complete(current)
                }
                _ => return (state, Vec::new()),
            };
            state.mark_dirty();
            effects
        }
        Msg::ResultFailed { session, message } => {
            let effects = match state.session_mut(session) {
                Some(current) if current.phase == Phase::Fetching => {
                    fail(current, Stage::Processing, FailureKind::ResultFetch, message)
                }
                _ => return (state, Vec::new()),
            };
            state.mark_dirty();
            effects
        }
        Msg::SessionTimedOut { session } => {
            let effects = match state.session_mut(session) {
                Some(current) if matches!(current.phase, Phase::Polling { .. }) => {
                    let message = format!(
                        "no completion signal after {} polls",
                        current.polls_issued
                    );
                    fail(
                        current,
                        Stage::Processing,
                        FailureKind::ProcessingTimeout,
                        message,
                    )
                }
                _ => return (state, Vec::new()),
            };
            state.mark_dirty();
            effects
        }
        Msg::ResetClicked => match state.clear_session() {
            Some(previous) => vec![Effect::Cleanup {
                session: previous.id,
                scope: CleanupScope::Session,
            }],
            None => Vec::new(),
        },
        Msg::NavigatedAway => {
            let effects = match state.current_mut() {
                Some(current) => {
                    if current.phase.is_live() {
                        current.phase = Phase::Detached;
                    }
                    vec![Effect::Cleanup {
                        session: current.id,
                        scope: CleanupScope::Session,
                    }]
                }
                None => return (state, Vec::new()),
            };
            state.mark_dirty();
            effects
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn accept_upload(session: &mut UploadSession, request_id: String) -> Vec<Effect> {
    let request_id = request_id.trim().to_string();
    if request_id.is_empty() {
        return fail(
            session,
            Stage::Upload,
            FailureKind::Upload,
            "response carried no request id",
        );
    }
    session.request_id = Some(request_id.clone());
    session.phase = Phase::Polling { in_flight: false };
    session.progress = ProgressSnapshot::zeroed();
    vec![
        Effect::StartPolling {
            session: session.id,
            request_id: request_id.clone(),
        },
        Effect::RecordSession(record(session, request_id, RecordStatus::Processing)),
    ]
}

fn start_poll(session: &mut UploadSession, max_polls: u32) -> Vec<Effect> {
    let Some(request_id) = session.request_id.clone() else {
        return Vec::new();
    };
    match session.phase {
        Phase::Polling { in_flight: false } if session.polls_issued < max_polls => {
            session.phase = Phase::Polling { in_flight: true };
            session.polls_issued += 1;
            vec![Effect::Poll {
                session: session.id,
                request_id,
            }]
        }
        _ => Vec::new(),
    }
}

fn finish_poll(session: &mut UploadSession) -> Vec<Effect> {
    let (Some(signal), Some(request_id)) = (
        detect_completion(&session.progress),
        session.request_id.clone(),
    ) else {
        session.phase = Phase::Polling { in_flight: false };
        return Vec::new();
    };
    // Leaving `Polling` here is what keeps the fetch to one per session.
    session.completion = Some(signal);
    session.phase = Phase::Fetching;
    vec![
        Effect::Cleanup {
            session: session.id,
            scope: CleanupScope::Timers,
        },
        Effect::FetchResult {
            session: session.id,
            request_id,
        },
    ]
}

fn complete(session: &mut UploadSession) -> Vec<Effect> {
    let Some(request_id) = session.request_id.clone() else {
        return Vec::new();
    };
    vec![
        Effect::RecordSession(record(session, request_id.clone(), RecordStatus::Completed)),
        Effect::NotifyCompleted {
            session: session.id,
            request_id,
            file_name: session.file_name.clone(),
        },
    ]
}

fn fail(
    session: &mut UploadSession,
    at: Stage,
    kind: FailureKind,
    message: impl Into<String>,
) -> Vec<Effect> {
    session.phase = Phase::Failed { at };
    session.error = Some(SessionFailure::new(kind, message));
    // A failed session keeps nothing running, including an overlapping poll.
    let mut effects = vec![Effect::Cleanup {
        session: session.id,
        scope: CleanupScope::Session,
    }];
    if let Some(request_id) = session.request_id.clone() {
        effects.push(Effect::RecordSession(record(
            session,
            request_id,
            RecordStatus::Failed,
        )));
    }
    effects
}

fn record(session: &UploadSession, request_id: String, status: RecordStatus) -> SessionRecord {
    SessionRecord {
        session: session.id,
        request_id,
        file_name: session.file_name.clone(),
        status,
    }
}
