//! Backend response shapes and their validation into core types.
//!
//! The progress endpoint answers either with a bare array of steps or with
//! an object wrapping them. Both are accepted here and normalized into a
//! single [`ProgressSnapshot`], so nothing past this module branches on the
//! response shape.

use lexsum_core::{ProgressSnapshot, ProgressStep, ResultPayload, StepStatus, StepTiming};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, FailureKind};

#[derive(Debug, Deserialize)]
struct UploadAck {
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProgressBody {
    Steps(Vec<StepBody>),
    Report(ProgressReport),
}

#[derive(Debug, Default, Deserialize)]
struct ProgressReport {
    #[serde(default)]
    steps: Option<Vec<StepBody>>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    progress_percentage: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    phase: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StepBody {
    #[serde(default)]
    step_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    progress_percentage: Option<f64>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    duration_ms: Option<f64>,
    #[serde(default)]
    details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub context: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    response: Option<String>,
}

pub fn decode_upload_ack(body: &[u8]) -> Result<String, ApiError> {
    let ack: UploadAck = serde_json::from_slice(body)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
    match ack.request_id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::new(
            FailureKind::MissingRequestId,
            "upload response carried no request_id",
        )),
    }
}

pub fn decode_progress(body: &[u8]) -> Result<ProgressSnapshot, ApiError> {
    let parsed: ProgressBody = serde_json::from_slice(body)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
    let report = match parsed {
        ProgressBody::Steps(steps) => ProgressReport {
            steps: Some(steps),
            ..ProgressReport::default()
        },
        ProgressBody::Report(report) => report,
    };
    Ok(normalize(report))
}

pub fn decode_result(body: &[u8]) -> Result<ResultPayload, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
    ResultPayload::from_value(value).ok_or_else(|| {
        ApiError::new(
            FailureKind::Decode,
            "complete summary is not a JSON object",
        )
    })
}

pub fn decode_tab(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

pub fn decode_chat_reply(body: &[u8]) -> Result<String, ApiError> {
    let reply: ChatReply = serde_json::from_slice(body)
        .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
    reply
        .response
        .ok_or_else(|| ApiError::new(FailureKind::Decode, "chat reply carried no response"))
}

fn normalize(report: ProgressReport) -> ProgressSnapshot {
    // Steps without a name cannot be matched or displayed and are skipped.
    let steps: Vec<ProgressStep> = report
        .steps
        .unwrap_or_default()
        .into_iter()
        .filter_map(normalize_step)
        .collect();
    let percentage = report
        .progress
        .or(report.progress_percentage)
        .filter(|value| value.is_finite())
        .unwrap_or_else(|| derived_percentage(&steps));

    ProgressSnapshot {
        percentage,
        message: report.message.unwrap_or_default(),
        completed: report.completed.unwrap_or(false),
        status: report.status,
        phase: report.phase,
        steps,
    }
}

fn normalize_step(step: StepBody) -> Option<ProgressStep> {
    let name = step
        .step_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())?;
    let status = step
        .status
        .as_deref()
        .map(StepStatus::from_label)
        .unwrap_or_default();
    let details = step.details.and_then(|details| match details {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    });
    Some(ProgressStep {
        name,
        status,
        percentage: step.progress_percentage.filter(|value| value.is_finite()),
        timing: StepTiming {
            start_time: step.start_time,
            end_time: step.end_time,
            duration_ms: step
                .duration_ms
                .filter(|ms| ms.is_finite() && *ms >= 0.0)
                .map(|ms| ms.round() as u64),
        },
        details,
    })
}

/// Completed-step fraction, used when the backend reports no percentage.
fn derived_percentage(steps: &[ProgressStep]) -> f64 {
    if steps.is_empty() {
        return 0.0;
    }
    let completed = steps
        .iter()
        .filter(|step| step.status == StepStatus::Completed)
        .count();
    completed as f64 / steps.len() as f64 * 100.0
}
