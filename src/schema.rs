// src/schema.rs
// Structural validation of model output.
//
// Two tiers: fields that break the response contract (missing names, unknown
// node or connection types) reject the whole payload, while cosmetic fields
// (duration, pacing, NPC property defaults) are normalized and never fail.
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

use crate::content::{
    ConnectionType, DEFAULT_BACKSTORY, DEFAULT_DURATION_MINUTES, DEFAULT_FACTION,
    DEFAULT_MOTIVATION, GeneratedEvent, GeneratedNpc, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
    NodeType, NpcProperties, PacingImpact, SuggestedConnection, SuggestedNode,
};
use crate::error::{ForgeError, Result};

/// Parses raw completion text into a JSON object.
///
/// A parse failure is a validation error: the model answered, but not with
/// the JSON it was asked for.
pub fn parse_object(text: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ForgeError::validation(format!("Failed to parse AI response as JSON: {}", e)))?;
    match value {
        Value::Object(object) => Ok(object),
        other => Err(ForgeError::validation(format!(
            "AI response must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

pub fn parse_event(text: &str) -> Result<GeneratedEvent> {
    normalize_event(&Value::Object(parse_object(text)?))
}

pub fn parse_npc(text: &str) -> Result<GeneratedNpc> {
    normalize_npc(&Value::Object(parse_object(text)?))
}

pub fn normalize_event(value: &Value) -> Result<GeneratedEvent> {
    let object = as_object(value, "event")?;

    let name = required_text(object, "name", "event")?;
    let description = required_text(object, "description", "event")?;

    let suggested_nodes = array_or_empty(object.get("suggestedNodes"))
        .iter()
        .enumerate()
        .map(|(index, node)| normalize_node(index, node))
        .collect::<Result<Vec<_>>>()?;

    let suggested_connections = array_or_empty(object.get("suggestedConnections"))
        .iter()
        .enumerate()
        .map(|(index, connection)| normalize_connection(index, connection))
        .collect::<Result<Vec<_>>>()?;

    Ok(GeneratedEvent {
        name,
        description,
        suggested_nodes,
        suggested_connections,
        estimated_duration: normalize_duration(object.get("estimatedDuration")),
        pacing_impact: normalize_pacing(object.get("pacingImpact")),
    })
}

pub fn normalize_npc(value: &Value) -> Result<GeneratedNpc> {
    let object = as_object(value, "NPC")?;

    let name = required_text(object, "name", "NPC")?;
    let description = required_text(object, "description", "NPC")?;
    let npc_type = required_text(object, "type", "NPC")?;

    let properties = match object.get("properties") {
        Some(Value::Object(properties)) => normalize_npc_properties(properties),
        _ => NpcProperties::default(),
    };

    Ok(GeneratedNpc {
        name,
        description,
        npc_type,
        properties,
    })
}

// Non-numeric or missing durations fall back to the default; numbers are
// rounded to whole minutes and pulled into range. Numbers too large for an
// f64 (kept verbatim by `arbitrary_precision`) go to the bound on their side.
pub fn normalize_duration(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(number)) => match number.as_f64() {
            Some(minutes) => minutes
                .round()
                .clamp(MIN_DURATION_MINUTES as f64, MAX_DURATION_MINUTES as f64)
                as u32,
            None if number.to_string().starts_with('-') => MIN_DURATION_MINUTES,
            None => MAX_DURATION_MINUTES,
        },
        _ => DEFAULT_DURATION_MINUTES,
    }
}

pub fn normalize_pacing(value: Option<&Value>) -> PacingImpact {
    value
        .and_then(Value::as_str)
        .and_then(|pacing| pacing.parse().ok())
        .unwrap_or_default()
}

fn normalize_node(index: usize, value: &Value) -> Result<SuggestedNode> {
    let context = format!("suggestedNodes[{}]", index);
    let node = as_object(value, &context)?;

    let raw_type = string_field(node, "type", &context)?;
    let node_type = raw_type.parse::<NodeType>().map_err(|_| {
        ForgeError::validation(format!(
            "{}: invalid node type '{}', expected one of {}",
            context,
            raw_type,
            allowed::<NodeType>()
        ))
    })?;

    Ok(SuggestedNode {
        node_type,
        name: string_field(node, "name", &context)?.to_string(),
        description: string_field(node, "description", &context)?.to_string(),
        properties: match node.get("properties") {
            Some(Value::Object(properties)) => properties.clone(),
            _ => Map::new(),
        },
    })
}

fn normalize_connection(index: usize, value: &Value) -> Result<SuggestedConnection> {
    let context = format!("suggestedConnections[{}]", index);
    let connection = as_object(value, &context)?;

    let raw_type = string_field(connection, "connectionType", &context)?;
    let connection_type = raw_type.parse::<ConnectionType>().map_err(|_| {
        ForgeError::validation(format!(
            "{}: invalid connection type '{}', expected one of {}",
            context,
            raw_type,
            allowed::<ConnectionType>()
        ))
    })?;

    Ok(SuggestedConnection {
        from_type: string_field(connection, "fromType", &context)?.to_string(),
        from_name: string_field(connection, "fromName", &context)?.to_string(),
        to_type: string_field(connection, "toType", &context)?.to_string(),
        to_name: string_field(connection, "toName", &context)?.to_string(),
        connection_type,
    })
}

fn normalize_npc_properties(properties: &Map<String, Value>) -> NpcProperties {
    let mut extra = properties.clone();
    for key in [
        "faction",
        "motivation",
        "equipment",
        "secrets",
        "stats",
        "relationships",
        "backstory",
    ] {
        extra.remove(key);
    }

    NpcProperties {
        faction: text_or(properties.get("faction"), DEFAULT_FACTION),
        motivation: text_or(properties.get("motivation"), DEFAULT_MOTIVATION),
        equipment: array_or_empty(properties.get("equipment")).to_vec(),
        secrets: array_or_empty(properties.get("secrets")).to_vec(),
        stats: object_or_empty(properties.get("stats")),
        relationships: object_or_empty(properties.get("relationships")),
        backstory: text_or(properties.get("backstory"), DEFAULT_BACKSTORY),
        extra,
    }
}

// Helper functions to extract fields

fn as_object<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        ForgeError::validation(format!(
            "{} must be a JSON object, got {}",
            context,
            json_kind(value)
        ))
    })
}

// A string that must also be non-empty once trimmed. Returned trimmed.
fn required_text(object: &Map<String, Value>, field: &str, context: &str) -> Result<String> {
    match object.get(field).and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ForgeError::validation(format!(
            "Missing or empty {} {}",
            context, field
        ))),
    }
}

fn string_field<'a>(object: &'a Map<String, Value>, field: &str, context: &str) -> Result<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ForgeError::validation(format!("{}: missing or invalid {}", context, field)))
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default.to_string(),
    }
}

fn array_or_empty(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn object_or_empty(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(object)) => object.clone(),
        _ => Map::new(),
    }
}

fn allowed<E: IntoEnumIterator + AsRef<str>>() -> String {
    E::iter()
        .map(|variant| variant.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
