use serde_json::{json, Value};
use std::sync::LazyLock;

const CATEGORY_PATTERNS: &str = "#/$defs/patterns";

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                    "api_token": { "type": "string" }
                }
            },
            "guardrails": {
                "type": "object",
                "properties": {
                    "enabled": { "type": "boolean" },
                    "input_patterns": { "$ref": CATEGORY_PATTERNS },
                    "response_patterns": { "$ref": CATEGORY_PATTERNS }
                }
            },
            "providers": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "openai": { "$ref": "#/$defs/provider" },
                    "anthropic": { "$ref": "#/$defs/provider" },
                    "groq": { "$ref": "#/$defs/provider" },
                    "google": { "$ref": "#/$defs/provider" }
                }
            }
        },
        "$defs": {
            "provider": {
                "type": "object",
                "properties": {
                    "api_key": { "type": "string" },
                    "base_url": { "type": "string" },
                    "model": { "type": "string" },
                    "timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "patterns": {
                "type": "object",
                "propertyNames": {
                    "enum": [
                        "prompt_injection", "jailbreak", "harmful_content",
                        "harmful_instructions", "illegal_activities", "violence",
                        "self_harm", "unspecified"
                    ]
                },
                "additionalProperties": { "type": "array", "items": { "type": "string" } }
            }
        }
    })
});
