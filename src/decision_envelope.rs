// =============================================================================
// Decision Envelope — auditable record of every signal request
// =============================================================================
//
// Every request through the pipeline produces exactly one envelope recording
// which terminal outcome was reached and why. Envelopes are emitted to the
// log and dropped; nothing is persisted.
// =============================================================================

use serde::Serialize;
use tracing::info;

use crate::reasoning::TokenUsage;
use crate::types::TradingDecision;

/// Terminal outcome label, stable for log queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    /// Blocked by the safety gate before any engine call.
    PreVeto,
    /// Engine timed out, was unreachable, or errored.
    EngineFailure,
    /// Engine answered but the answer failed validation.
    InvalidResponse,
    /// Validated decision returned verbatim.
    Decision,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PreVeto => "PRE_VETO",
            Self::EngineFailure => "ENGINE_FAILURE",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::Decision => "DECISION",
        };
        f.write_str(s)
    }
}

/// Complete auditable record of one request.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionEnvelope {
    /// Unique identifier for this request (UUID v4).
    pub id: String,

    pub symbol: String,

    pub outcome: OutcomeKind,

    /// Model consulted, if the engine was called at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Why the outcome was reached (veto reason or failure detail).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Wall time spent inside the engine call, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_elapsed_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,

    /// Final decision fields that matter for audit.
    pub veto: bool,
    pub order_type: String,
    pub confidence: f64,

    /// ISO 8601 timestamp of when this envelope was created.
    pub created_at: String,
}

impl DecisionEnvelope {
    pub fn new(id: impl Into<String>, outcome: OutcomeKind, decision: &TradingDecision) -> Self {
        Self {
            id: id.into(),
            symbol: decision.symbol.clone(),
            outcome,
            model: None,
            reason: None,
            engine_elapsed_ms: None,
            usage: None,
            veto: decision.veto,
            order_type: decision.order.order_type.to_string(),
            confidence: decision.confidence,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_engine_elapsed_ms(mut self, ms: u64) -> Self {
        self.engine_elapsed_ms = Some(ms);
        self
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }

    /// Write the envelope to the audit log target.
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        info!(
            target: "audit",
            id = %self.id,
            symbol = %self.symbol,
            outcome = %self.outcome,
            envelope = %json,
            "decision envelope"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety_gate::veto_response;

    #[test]
    fn envelope_captures_decision_fields() {
        let d = veto_response("XAUUSD", "spread 60 > max 50");
        let e = DecisionEnvelope::new("req-1", OutcomeKind::PreVeto, &d)
            .with_reason(d.veto_reason.clone());
        assert_eq!(e.symbol, "XAUUSD");
        assert!(e.veto);
        assert_eq!(e.order_type, "none");
        assert_eq!(e.confidence, 0.0);
        assert_eq!(e.reason.as_deref(), Some("spread 60 > max 50"));
        assert!(e.model.is_none());
    }

    #[test]
    fn optional_fields_are_omitted_when_empty() {
        let d = veto_response("XAUUSD", "x");
        let v = serde_json::to_value(DecisionEnvelope::new("id", OutcomeKind::PreVeto, &d)).unwrap();
        assert_eq!(v["outcome"], "PRE_VETO");
        assert!(v.get("model").is_none());
        assert!(v.get("usage").is_none());
        assert!(v.get("engine_elapsed_ms").is_none());
    }

    #[test]
    fn outcome_display_matches_serde() {
        for kind in [
            OutcomeKind::PreVeto,
            OutcomeKind::EngineFailure,
            OutcomeKind::InvalidResponse,
            OutcomeKind::Decision,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.to_string());
        }
    }
}
