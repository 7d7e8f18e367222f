use lexsum_core::{ResultPayload, TabKind};
use lexsum_logging::lexsum_debug;
use serde_json::Value;

use crate::{ApiError, BackendApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceSource {
    Payload,
    Endpoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabSlice {
    pub tab: TabKind,
    pub source: SliceSource,
    pub data: Value,
}

/// Returns the tab's slice from the consolidated payload, fetching it from
/// the tab's own endpoint when the payload is absent or lacks it.
pub async fn resolve_tab(
    api: &dyn BackendApi,
    payload: Option<&ResultPayload>,
    request_id: &str,
    tab: TabKind,
) -> Result<TabSlice, ApiError> {
    if let Some(data) = payload.and_then(|payload| payload.slice(tab)) {
        return Ok(TabSlice {
            tab,
            source: SliceSource::Payload,
            data: data.clone(),
        });
    }
    lexsum_debug!("{} missing from payload, fetching {}-tab", tab.label(), tab);
    let data = api.tab(request_id, tab).await?;
    Ok(TabSlice {
        tab,
        source: SliceSource::Endpoint,
        data,
    })
}

/// Resolves all five tabs; each entry fails or succeeds on its own.
pub async fn resolve_all_tabs(
    api: &dyn BackendApi,
    payload: Option<&ResultPayload>,
    request_id: &str,
) -> Vec<(TabKind, Result<TabSlice, ApiError>)> {
    let mut resolved = Vec::with_capacity(TabKind::ALL.len());
    for tab in TabKind::ALL {
        resolved.push((tab, resolve_tab(api, payload, request_id, tab).await));
    }
    resolved
}
