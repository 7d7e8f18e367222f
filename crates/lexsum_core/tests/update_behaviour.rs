use std::sync::Once;

use lexsum_core::{
    update, AppState, CleanupScope, CompletionSignal, Effect, FailureKind, Msg, ProgressSnapshot,
    ProgressStep, RecordStatus, ResultPayload, SessionId, SessionRecord, SessionState, Stage,
    StepStatus, QUALITY_REVIEW_STEP,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(lexsum_logging::initialize_for_tests);
}

fn submit(state: AppState, file_name: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::FileSubmitted {
            file_name: file_name.to_string(),
        },
    )
}

fn uploaded(file_name: &str, request_id: &str) -> (AppState, SessionId) {
    let (state, _) = submit(AppState::new(), file_name);
    let session = state.current_session_id().expect("session");
    let (state, _) = update(
        state,
        Msg::UploadAccepted {
            session,
            request_id: request_id.to_string(),
        },
    );
    (state, session)
}

fn tick(state: AppState, session: SessionId) -> (AppState, Vec<Effect>) {
    update(state, Msg::PollTick { session })
}

fn progress(percentage: f64, completed: bool) -> ProgressSnapshot {
    ProgressSnapshot {
        percentage,
        completed,
        ..ProgressSnapshot::zeroed()
    }
}

fn payload() -> ResultPayload {
    ResultPayload::from_value(json!({
        "summary_tab": {"summary": "Services agreement"},
        "risk_analysis_tab": {"risks": []},
        "financial_terms_tab": {},
        "quality_tab": {},
        "audit_trail_tab": {},
    }))
    .unwrap()
}

#[test]
fn submit_starts_upload() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(), "contract.pdf");

    let view = state.view();
    assert_eq!(view.state, SessionState::Uploading);
    assert_eq!(view.stage, Stage::Upload);
    assert_eq!(view.file_name.as_deref(), Some("contract.pdf"));
    assert_eq!(
        effects,
        vec![Effect::Upload {
            session: 1,
            file_name: "contract.pdf".to_string(),
        }]
    );
    assert!(state.consume_dirty());
}

#[test]
fn upload_ack_starts_polling_and_records_provisional_entry() {
    init_logging();
    let (state, _) = submit(AppState::new(), "contract.pdf");
    let (state, effects) = update(
        state,
        Msg::UploadAccepted {
            session: 1,
            request_id: "r1".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.state, SessionState::Processing);
    assert_eq!(view.stage, Stage::Processing);
    assert_eq!(view.request_id.as_deref(), Some("r1"));
    assert_eq!(view.progress, ProgressSnapshot::zeroed());
    assert_eq!(
        effects,
        vec![
            Effect::StartPolling {
                session: 1,
                request_id: "r1".to_string(),
            },
            Effect::RecordSession(SessionRecord {
                session: 1,
                request_id: "r1".to_string(),
                file_name: "contract.pdf".to_string(),
                status: RecordStatus::Processing,
            }),
        ]
    );
}

#[test]
fn blank_request_id_is_an_upload_error() {
    init_logging();
    let (state, _) = submit(AppState::new(), "contract.pdf");
    let (state, effects) = update(
        state,
        Msg::UploadAccepted {
            session: 1,
            request_id: "   ".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.state, SessionState::Failed);
    assert_eq!(view.stage, Stage::Upload);
    assert_eq!(view.error.unwrap().kind, FailureKind::Upload);
    assert_eq!(
        effects,
        vec![Effect::Cleanup {
            session: 1,
            scope: CleanupScope::Session,
        }]
    );
}

#[test]
fn upload_failure_surfaces_error() {
    init_logging();
    let (state, _) = submit(AppState::new(), "contract.pdf");
    let (state, _) = update(
        state,
        Msg::UploadFailed {
            session: 1,
            message: "timeout".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.state, SessionState::Failed);
    let error = view.error.unwrap();
    assert_eq!(error.kind, FailureKind::Upload);
    assert_eq!(error.message, "timeout");
}

#[test]
fn contract_scenario_reaches_results_with_single_fetch() {
    init_logging();
    let (state, session) = uploaded("contract.pdf", "r1");

    let (state, effects) = tick(state, session);
    assert_eq!(
        effects,
        vec![Effect::Poll {
            session,
            request_id: "r1".to_string(),
        }]
    );
    let (state, effects) = update(
        state,
        Msg::ProgressReceived {
            session,
            snapshot: progress(40.0, false),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().progress.percentage, 40.0);

    let (state, _) = tick(state, session);
    let finished = ProgressSnapshot {
        steps: vec![
            ProgressStep::new("Text Extraction", StepStatus::Completed),
            ProgressStep::new(QUALITY_REVIEW_STEP, StepStatus::Completed),
        ],
        ..ProgressSnapshot::zeroed()
    };
    let (state, effects) = update(
        state,
        Msg::ProgressReceived {
            session,
            snapshot: finished,
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::Cleanup {
                session,
                scope: CleanupScope::Timers,
            },
            Effect::FetchResult {
                session,
                request_id: "r1".to_string(),
            },
        ]
    );
    assert_eq!(
        state.view().completion,
        Some(CompletionSignal::QualityReviewCompleted)
    );

    let (state, effects) = update(
        state,
        Msg::ResultReceived {
            session,
            payload: payload(),
        },
    );
    let view = state.view();
    assert_eq!(view.state, SessionState::Results);
    assert_eq!(view.stage, Stage::Results);
    assert!(view.result.is_some());
    assert_eq!(
        effects,
        vec![
            Effect::RecordSession(SessionRecord {
                session,
                request_id: "r1".to_string(),
                file_name: "contract.pdf".to_string(),
                status: RecordStatus::Completed,
            }),
            Effect::NotifyCompleted {
                session,
                request_id: "r1".to_string(),
                file_name: "contract.pdf".to_string(),
            },
        ]
    );
}

#[test]
fn result_fetch_failure_stays_on_processing_stage() {
    init_logging();
    let (state, session) = uploaded("contract.pdf", "r1");
    let (state, _) = tick(state, session);
    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            session,
            snapshot: progress(100.0, true),
        },
    );
    let (state, effects) = update(
        state,
        Msg::ResultFailed {
            session,
            message: "network error".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.state, SessionState::Failed);
    assert_eq!(view.stage, Stage::Processing);
    assert_eq!(view.error.unwrap().kind, FailureKind::ResultFetch);
    assert_eq!(
        effects[0],
        Effect::Cleanup {
            session,
            scope: CleanupScope::Session,
        }
    );
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::RecordSession(SessionRecord {
            status: RecordStatus::Failed,
            ..
        })
    )));
}

#[test]
fn reset_returns_to_idle_from_every_state() {
    init_logging();
    let (uploading, _) = submit(AppState::new(), "a.pdf");
    let (polling, session) = uploaded("b.pdf", "r2");
    let (fetching, _) = {
        let (state, _) = tick(polling.clone(), session);
        update(
            state,
            Msg::ProgressReceived {
                session,
                snapshot: progress(100.0, false),
            },
        )
    };
    let (failed, _) = update(polling.clone(), Msg::SessionTimedOut { session });

    for state in [uploading, polling, fetching, failed] {
        let id = state.current_session_id().unwrap();
        let (mut next, effects) = update(state, Msg::ResetClicked);
        let view = next.view();
        assert_eq!(view.state, SessionState::Idle);
        assert_eq!(view.stage, Stage::Upload);
        assert!(view.request_id.is_none());
        assert!(view.result.is_none());
        assert!(view.error.is_none());
        assert_eq!(
            effects,
            vec![Effect::Cleanup {
                session: id,
                scope: CleanupScope::Session,
            }]
        );
        assert!(next.consume_dirty());
    }
}

#[test]
fn resubmitting_tears_down_previous_session_first() {
    init_logging();
    let (state, first) = uploaded("first.pdf", "r1");
    let (state, effects) = submit(state, "second.pdf");

    let second = state.current_session_id().unwrap();
    assert_ne!(first, second);
    assert_eq!(
        effects,
        vec![
            Effect::Cleanup {
                session: first,
                scope: CleanupScope::Session,
            },
            Effect::Upload {
                session: second,
                file_name: "second.pdf".to_string(),
            },
        ]
    );

    // Anything still addressed to the first session is stale.
    let (state, effects) = tick(state, first);
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::ProgressReceived {
            session: first,
            snapshot: progress(100.0, true),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().state, SessionState::Uploading);
}

#[test]
fn navigate_away_detaches_live_session_but_keeps_data() {
    init_logging();
    let (state, session) = uploaded("contract.pdf", "r1");
    let (state, _) = tick(state, session);
    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            session,
            snapshot: progress(55.0, false),
        },
    );
    let (state, effects) = update(state, Msg::NavigatedAway);

    assert_eq!(
        effects,
        vec![Effect::Cleanup {
            session,
            scope: CleanupScope::Session,
        }]
    );
    let view = state.view();
    assert_eq!(view.state, SessionState::Idle);
    assert_eq!(view.request_id.as_deref(), Some("r1"));
    assert_eq!(view.progress.percentage, 55.0);

    let (_, effects) = tick(state, session);
    assert!(effects.is_empty());
}

#[test]
fn navigate_away_keeps_results() {
    init_logging();
    let (state, session) = uploaded("contract.pdf", "r1");
    let (state, _) = tick(state, session);
    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            session,
            snapshot: progress(100.0, false),
        },
    );
    let (state, _) = update(
        state,
        Msg::ResultReceived {
            session,
            payload: payload(),
        },
    );
    let (state, _) = update(state, Msg::NavigatedAway);
    assert_eq!(state.view().state, SessionState::Results);
}
