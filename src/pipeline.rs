// =============================================================================
// Signal Pipeline — snapshot in, decision out
// =============================================================================
//
// Pipeline:
//   1. Safety gate pre-check (spread). On veto the engine is never called.
//   2. Derive features (ATR, session, market structure)
//   3. Build the contract (instructions, payload, strict schema)
//   4. One engine call, bounded by the configured timeout. No retry.
//   5. Validate the raw response against the schema
//   6. Fold the outcome into a decision and emit a DecisionEnvelope
//
// Terminal outcomes:
//   PreVeto          -> veto with the gate's reason
//   EngineFailure    -> veto "model_unavailable"
//   InvalidResponse  -> veto "model_unavailable"
//   Decision         -> validated decision, verbatim unless it is a veto;
//                       vetoes are rebuilt around the engine's reason
//
// The pipeline holds no mutable state; one instance serves every request.
// =============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::SignalConfig;
use crate::contract::ContractBuilder;
use crate::decision_envelope::{DecisionEnvelope, OutcomeKind};
use crate::features;
use crate::reasoning::{InferenceError, ReasoningEngine, TokenUsage};
use crate::safety_gate::{self, Veto, MODEL_UNAVAILABLE};
use crate::types::{MarketSnapshot, TradingDecision};
use crate::validator::{self, ValidationFailure};

// =============================================================================
// Outcome
// =============================================================================

/// Where a request ended up. Exactly one per request.
#[derive(Debug)]
pub enum PipelineOutcome {
    PreVeto(Veto),
    EngineFailure(InferenceError),
    InvalidResponse(ValidationFailure),
    Decision(TradingDecision),
}

impl PipelineOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::PreVeto(_) => OutcomeKind::PreVeto,
            Self::EngineFailure(_) => OutcomeKind::EngineFailure,
            Self::InvalidResponse(_) => OutcomeKind::InvalidResponse,
            Self::Decision(_) => OutcomeKind::Decision,
        }
    }

    /// Collapse into the decision returned to the caller.
    ///
    /// An engine-issued veto keeps only its reason; the rest of the veto
    /// shape is always rebuilt by the safety gate.
    pub fn into_decision(self, symbol: &str) -> TradingDecision {
        match self {
            Self::PreVeto(veto) => safety_gate::veto_response(symbol, veto.reason),
            Self::EngineFailure(_) | Self::InvalidResponse(_) => {
                safety_gate::veto_response(symbol, MODEL_UNAVAILABLE)
            }
            Self::Decision(decision) if decision.veto => {
                safety_gate::veto_response(symbol, decision.veto_reason)
            }
            Self::Decision(decision) => decision,
        }
    }

    fn reason(&self) -> Option<String> {
        match self {
            Self::PreVeto(veto) => Some(veto.reason.clone()),
            Self::EngineFailure(e) => Some(e.to_string()),
            Self::InvalidResponse(e) => Some(e.to_string()),
            Self::Decision(d) if d.veto => Some(d.veto_reason.clone()),
            Self::Decision(_) => None,
        }
    }
}

/// An outcome plus what was measured on the way there.
#[derive(Debug)]
pub struct Evaluation {
    pub outcome: PipelineOutcome,
    /// Set whenever the engine was actually called.
    pub engine_elapsed: Option<Duration>,
    pub usage: Option<TokenUsage>,
}

// =============================================================================
// Pipeline
// =============================================================================

pub struct SignalPipeline {
    engine: Arc<dyn ReasoningEngine>,
    builder: ContractBuilder,
    timeout: Duration,
}

impl SignalPipeline {
    pub fn new(engine: Arc<dyn ReasoningEngine>, config: &SignalConfig) -> Self {
        Self {
            engine,
            builder: ContractBuilder::new(config.local_clock()),
            timeout: config.inference_timeout(),
        }
    }

    pub fn model(&self) -> &str {
        self.engine.model()
    }

    /// Run the pipeline and always return a well-formed decision.
    pub async fn generate(&self, snapshot: &MarketSnapshot) -> TradingDecision {
        let request_id = uuid::Uuid::new_v4().to_string();

        info!(
            request_id = %request_id,
            symbol = %snapshot.symbol,
            timeframe = %snapshot.timeframe,
            bid = snapshot.bid,
            ask = snapshot.ask,
            spread_points = snapshot.spread_points,
            candles = snapshot.candles.len(),
            atr = ?snapshot.atr,
            server_time_utc = %snapshot.server_time_utc,
            model = %self.model(),
            "signal request received"
        );

        let evaluation = self.evaluate(snapshot, Utc::now()).await;
        let kind = evaluation.outcome.kind();
        let reason = evaluation.outcome.reason();
        let called_engine = evaluation.engine_elapsed.is_some();

        let decision = evaluation.outcome.into_decision(&snapshot.symbol);
        log_decision(&request_id, &decision);

        let mut envelope = DecisionEnvelope::new(&request_id, kind, &decision)
            .with_usage(evaluation.usage);
        if let Some(reason) = reason {
            envelope = envelope.with_reason(reason);
        }
        if called_engine {
            envelope = envelope.with_model(self.model());
        }
        if let Some(elapsed) = evaluation.engine_elapsed {
            envelope = envelope.with_engine_elapsed_ms(elapsed.as_millis() as u64);
        }
        envelope.emit();

        decision
    }

    /// Run every stage and report the terminal outcome without folding it.
    pub async fn evaluate(&self, snapshot: &MarketSnapshot, now: DateTime<Utc>) -> Evaluation {
        // ── 1. Pre-call gate ────────────────────────────────────────────
        if let Some(veto) = safety_gate::pre_check(snapshot) {
            warn!(symbol = %snapshot.symbol, reason = %veto.reason, "pre-call veto");
            return Evaluation {
                outcome: PipelineOutcome::PreVeto(veto),
                engine_elapsed: None,
                usage: None,
            };
        }

        // ── 2. Features ─────────────────────────────────────────────────
        let features = features::derive(snapshot, now);

        // ── 3. Contract ─────────────────────────────────────────────────
        let contract = self.builder.build(snapshot, &features, now);

        // ── 4. Engine call ──────────────────────────────────────────────
        info!(
            symbol = %snapshot.symbol,
            model = %self.model(),
            volatility = features.volatility,
            session = %features.session.session,
            "calling reasoning engine"
        );
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.engine.infer(&contract)).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout(self.timeout)),
        };
        let elapsed = started.elapsed();

        let completion = match result {
            Ok(completion) => completion,
            Err(e) => {
                error!(
                    symbol = %snapshot.symbol,
                    error = %e,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "reasoning engine call failed"
                );
                return Evaluation {
                    outcome: PipelineOutcome::EngineFailure(e),
                    engine_elapsed: Some(elapsed),
                    usage: None,
                };
            }
        };

        match completion.usage {
            Some(u) => info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                elapsed = format!("{:.1}s", elapsed.as_secs_f64()),
                "engine responded"
            ),
            None => info!(
                elapsed = format!("{:.1}s", elapsed.as_secs_f64()),
                "engine responded"
            ),
        }

        // ── 5. Validation ───────────────────────────────────────────────
        let outcome = match validator::validate(&completion.content) {
            Ok(decision) => PipelineOutcome::Decision(decision),
            Err(e) => {
                error!(symbol = %snapshot.symbol, error = %e, "engine response rejected");
                PipelineOutcome::InvalidResponse(e)
            }
        };

        Evaluation {
            outcome,
            engine_elapsed: Some(elapsed),
            usage: completion.usage,
        }
    }
}

fn log_decision(request_id: &str, decision: &TradingDecision) {
    if decision.veto {
        info!(
            request_id = %request_id,
            symbol = %decision.symbol,
            reason = %decision.veto_reason,
            "VETO"
        );
    } else {
        info!(
            request_id = %request_id,
            symbol = %decision.symbol,
            bias = %decision.bias,
            confidence = format!("{:.0}%", decision.confidence * 100.0),
            order_type = %decision.order.order_type,
            entry = decision.order.entry,
            sl = decision.order.sl,
            tp = decision.order.tp,
            comment = %decision.order.comment,
            "signal issued"
        );
    }
}
