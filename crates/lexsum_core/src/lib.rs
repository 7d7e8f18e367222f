//! Lexsum core: pure session state machine and view-model helpers.
mod completion;
mod effect;
mod msg;
mod payload;
mod progress;
mod state;
mod update;
mod view_model;

pub use completion::{detect_completion, CompletionSignal, QUALITY_REVIEW_STEP};
pub use effect::{CleanupScope, Effect, RecordStatus, SessionRecord};
pub use msg::Msg;
pub use payload::{ResultPayload, TabKind, UnknownTab};
pub use progress::{ProgressSnapshot, ProgressStep, StepStatus, StepTiming};
pub use state::{
    AppState, FailureKind, Phase, SessionFailure, SessionId, SessionState, Stage, UploadSession,
    DEFAULT_MAX_POLLS,
};
pub use update::update;
pub use view_model::AppViewModel;
