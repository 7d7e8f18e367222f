use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

/// The five result tabs the backend produces for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabKind {
    Summary,
    RiskAnalysis,
    FinancialTerms,
    Quality,
    AuditTrail,
}

impl TabKind {
    pub const ALL: [TabKind; 5] = [
        TabKind::Summary,
        TabKind::RiskAnalysis,
        TabKind::FinancialTerms,
        TabKind::Quality,
        TabKind::AuditTrail,
    ];

    /// Key of this tab's slice inside the consolidated payload.
    pub fn payload_key(self) -> &'static str {
        match self {
            TabKind::Summary => "summary_tab",
            TabKind::RiskAnalysis => "risk_analysis_tab",
            TabKind::FinancialTerms => "financial_terms_tab",
            TabKind::Quality => "quality_tab",
            TabKind::AuditTrail => "audit_trail_tab",
        }
    }

    /// Path segment of the dedicated endpoint, as in `/api/{slug}-tab/{id}`.
    pub fn endpoint_slug(self) -> &'static str {
        match self {
            TabKind::Summary => "summary",
            TabKind::RiskAnalysis => "risk-analysis",
            TabKind::FinancialTerms => "financial-terms",
            TabKind::Quality => "quality",
            TabKind::AuditTrail => "audit-trail",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TabKind::Summary => "Summary",
            TabKind::RiskAnalysis => "Risk Analysis",
            TabKind::FinancialTerms => "Financial Terms",
            TabKind::Quality => "Quality",
            TabKind::AuditTrail => "Audit Trail",
        }
    }
}

impl fmt::Display for TabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint_slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab '{0}' (expected one of summary, risk-analysis, financial-terms, quality, audit-trail)")]
pub struct UnknownTab(pub String);

impl FromStr for TabKind {
    type Err = UnknownTab;

    /// Accepts the endpoint slug, the payload key, or the slug with underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        TabKind::ALL
            .into_iter()
            .find(|tab| {
                wanted == tab.endpoint_slug()
                    || wanted == tab.payload_key().replace('_', "-")
            })
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

/// Consolidated analysis result. Opaque apart from per-tab slice lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPayload {
    fields: Map<String, Value>,
}

impl ResultPayload {
    /// Wraps a JSON object; any other JSON value is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// The tab's slice, treating `null` the same as a missing key.
    pub fn slice(&self, tab: TabKind) -> Option<&Value> {
        self.fields
            .get(tab.payload_key())
            .filter(|value| !value.is_null())
    }

    pub fn has_slice(&self, tab: TabKind) -> bool {
        self.slice(tab).is_some()
    }

    pub fn missing_slices(&self) -> Vec<TabKind> {
        TabKind::ALL
            .into_iter()
            .filter(|tab| !self.has_slice(*tab))
            .collect()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
