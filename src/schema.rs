//! The profile data contract.
//!
//! [`Profile`] is the shape the extraction service must return. Two
//! representations must stay in lockstep:
//!
//! 1. The Rust structs below, which deserialize (and thereby validate) the
//!    service response. Every field is required — there is no optional field
//!    and no defaulting — and unknown fields are rejected.
//! 2. The JSON Schema built by [`profile_schema`], sent to the service as a
//!    `json_schema` response-format constraint with `strict: true` and
//!    `additionalProperties: false`.
//!
//! Deserialization through these structs is the only validation layer: a
//! response missing a field surfaces as
//! [`crate::error::ExtractError::SchemaViolation`] rather than a partially
//! populated result.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured profile data extracted from a resume.
///
/// Field names serialize in camelCase (`contactInfo`, `currentTitle`) to
/// match the wire contract named `profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Profile {
    pub name: String,
    pub contact_info: ContactInfo,
    pub current_title: String,
    /// Key qualifications, in the order the model listed them.
    pub qualifications: Vec<String>,
}

/// Contact details for a [`Profile`].
///
/// All fields are plain strings; no format validation (email syntax, URL
/// shape) is performed on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactInfo {
    pub email: String,
    pub linked_in_url: String,
    pub phone: String,
    pub twitter_url: String,
}

/// A named JSON Schema constraining the service response.
///
/// Serializes as the `json_schema` member of an OpenAI
/// `response_format = { type: "json_schema", json_schema: … }` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// Schema name reported back by the service (`"profile"`).
    pub name: String,
    /// Require exact conformance — the service rejects extra or missing fields.
    pub strict: bool,
    /// The JSON Schema document itself.
    pub schema: Value,
}

/// Build the response schema for [`Profile`].
///
/// Kept in this module, next to the structs, so a field added to `Profile`
/// is added here in the same change.
pub fn profile_schema() -> ResponseSchema {
    ResponseSchema {
        name: "profile".to_string(),
        strict: true,
        schema: json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "contactInfo": {
                    "type": "object",
                    "properties": {
                        "email": { "type": "string" },
                        "linkedInUrl": { "type": "string" },
                        "phone": { "type": "string" },
                        "twitterUrl": { "type": "string" }
                    },
                    "required": ["email", "linkedInUrl", "phone", "twitterUrl"],
                    "additionalProperties": false
                },
                "currentTitle": { "type": "string" },
                "qualifications": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["name", "contactInfo", "currentTitle", "qualifications"],
            "additionalProperties": false
        }),
    }
}
