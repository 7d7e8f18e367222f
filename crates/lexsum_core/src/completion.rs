use crate::{ProgressSnapshot, StepStatus};

/// Name of the final backend step; its completion ends processing.
pub const QUALITY_REVIEW_STEP: &str = "Quality Review";

/// Which signal in a progress snapshot marked processing as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSignal {
    /// Explicit `phase: "completed"` contract field.
    Phase,
    QualityReviewCompleted,
    PercentageReached,
    CompletedFlag,
    StatusString,
}

/// Decides whether a snapshot reports finished processing.
///
/// Signals are checked in priority order and the first match wins.
pub fn detect_completion(snapshot: &ProgressSnapshot) -> Option<CompletionSignal> {
    if snapshot
        .phase
        .as_deref()
        .is_some_and(|phase| phase.trim().eq_ignore_ascii_case("completed"))
    {
        return Some(CompletionSignal::Phase);
    }
    if snapshot
        .step(QUALITY_REVIEW_STEP)
        .is_some_and(|step| step.status == StepStatus::Completed)
    {
        return Some(CompletionSignal::QualityReviewCompleted);
    }
    if snapshot.percentage >= 100.0 {
        return Some(CompletionSignal::PercentageReached);
    }
    if snapshot.completed {
        return Some(CompletionSignal::CompletedFlag);
    }
    let finished = snapshot.status.as_deref().is_some_and(|status| {
        let status = status.trim();
        status.eq_ignore_ascii_case("completed") || status.eq_ignore_ascii_case("finished")
    });
    if finished {
        return Some(CompletionSignal::StatusString);
    }
    None
}

