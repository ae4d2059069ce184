// =============================================================================
// Strict Output Schema — the one definition of a valid decision
// =============================================================================
//
// `signal_schema()` is sent to the reasoning engine as a hard output
// constraint and is also what `validator` checks every response against.
// Enum values come straight from the Rust types so the two cannot drift.
//
// `check` implements only the keywords this schema uses:
//   type, enum, properties, required, additionalProperties: false
// =============================================================================

use serde_json::{json, Map, Value};

use crate::types::{Bias, OrderType};

/// Name the schema is registered under in the outbound request.
pub const SCHEMA_NAME: &str = "trading_signal";

/// Top-level fields of a `TradingDecision`, in wire order.
pub const DECISION_FIELDS: [&str; 7] = [
    "symbol",
    "timestamp_utc",
    "bias",
    "order",
    "confidence",
    "veto",
    "veto_reason",
];

/// Fields of the nested `order` object, in wire order.
pub const ORDER_FIELDS: [&str; 6] = ["type", "entry", "sl", "tp", "expiry_minutes", "comment"];

/// The canonical JSON schema for a `TradingDecision`.
pub fn signal_schema() -> Value {
    let bias: Vec<&str> = Bias::ALL.iter().map(Bias::as_str).collect();
    let order_types: Vec<&str> = OrderType::ALL.iter().map(OrderType::as_str).collect();

    json!({
        "type": "object",
        "properties": {
            "symbol": { "type": "string" },
            "timestamp_utc": { "type": "string" },
            "bias": { "type": "string", "enum": bias },
            "order": {
                "type": "object",
                "properties": {
                    "type": { "type": "string", "enum": order_types },
                    "entry": { "type": "number" },
                    "sl": { "type": "number" },
                    "tp": { "type": "number" },
                    "expiry_minutes": { "type": "integer" },
                    "comment": { "type": "string" }
                },
                "required": ORDER_FIELDS,
                "additionalProperties": false
            },
            "confidence": { "type": "number" },
            "veto": { "type": "boolean" },
            "veto_reason": { "type": "string" }
        },
        "required": DECISION_FIELDS,
        "additionalProperties": false
    })
}

/// First point at which a value departs from the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// Dotted path from the root, `$` for the root itself.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Check `value` against `schema`, stopping at the first violation.
pub fn check(value: &Value, schema: &Value) -> Result<(), SchemaViolation> {
    check_at("$", value, schema)
}

fn violation(path: &str, message: impl Into<String>) -> SchemaViolation {
    SchemaViolation {
        path: path.to_string(),
        message: message.into(),
    }
}

fn check_at(path: &str, value: &Value, schema: &Value) -> Result<(), SchemaViolation> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !matches_type(value, expected) {
            return Err(violation(
                path,
                format!("expected {expected}, got {}", type_name(value)),
            ));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(violation(path, format!("{value} is not one of {allowed:?}")));
        }
    }

    if let Some(obj) = value.as_object() {
        check_object(path, obj, schema)?;
    }

    Ok(())
}

fn check_object(
    path: &str,
    obj: &Map<String, Value>,
    schema: &Value,
) -> Result<(), SchemaViolation> {
    let empty = Map::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(field) {
                return Err(violation(path, format!("missing required field '{field}'")));
            }
        }
    }

    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));

    for (key, child) in obj {
        let child_path = format!("{path}.{key}");
        match properties.get(key) {
            Some(child_schema) => check_at(&child_path, child, child_schema)?,
            None if closed => {
                return Err(violation(&child_path, "additional property not allowed"));
            }
            None => {}
        }
    }

    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
