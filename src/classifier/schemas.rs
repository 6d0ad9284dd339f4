//! Structured-output schemas sent with each provider call. The provider is
//! asked to constrain its JSON to these shapes, so response parsing can
//! deserialize directly into the typed payloads.

use serde_json::{json, Value};

use crate::models::{RoomType, FEATURE_WHITELIST};

fn room_types() -> Vec<&'static str> {
    RoomType::ALL.iter().map(|room| room.as_str()).collect()
}

fn feature_ids() -> Vec<&'static str> {
    FEATURE_WHITELIST
        .iter()
        .map(|feature| feature.as_str())
        .collect()
}

pub fn pass1_schema() -> Value {
    json!({
        "name": "pass1_result",
        "schema": {
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "room_type": { "type": "string", "enum": room_types() },
                "actionable": { "type": "boolean" },
                "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
            },
            "required": ["room_type", "actionable", "confidence"],
        },
        "strict": true,
    })
}

pub fn pass2_schema() -> Value {
    json!({
        "name": "pass2_result",
        "schema": {
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "features": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "feature_id": { "type": "string", "enum": feature_ids() },
                            "severity": { "type": "string", "enum": ["low", "medium", "high"] },
                            "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                            "explanation": { "type": "string" },
                        },
                        "required": ["feature_id", "severity", "confidence", "explanation"],
                    },
                }
            },
            "required": ["features"],
        },
        "strict": true,
    })
}
