//! User record and upstream error definitions.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A user as returned by the upstream API and re-served to callers.
///
/// Fields missing from the upstream payload, or set to `null`, take their
/// default value and unknown fields are ignored; a field of the wrong JSON
/// type fails decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
}

const USER_FIELDS: [&str; 4] = ["id", "name", "username", "email"];

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Errors that can occur while looking a user up upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// No response was received (DNS, connect, TLS, deadline).
    #[error("upstream request to {url} failed: {reason}")]
    Unreachable {
        url: String,
        reason: String,
        timed_out: bool,
    },

    /// A response arrived but its body could not be read.
    #[error("failed to read upstream response body: {reason}")]
    ReadFailed { reason: String, timed_out: bool },

    /// The body was read but is not a user record.
    #[error("failed to decode upstream response: {0}")]
    DecodeFailed(#[from] serde_json::Error),
}

impl UpstreamError {
    /// Whether the failure was the deadline running out.
    pub fn is_timeout(&self) -> bool {
        match self {
            UpstreamError::Unreachable { timed_out, .. } => *timed_out,
            UpstreamError::ReadFailed { timed_out, .. } => *timed_out,
            UpstreamError::DecodeFailed(_) => false,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Unreachable { .. } => "unreachable",
            UpstreamError::ReadFailed { .. } => "read",
            UpstreamError::DecodeFailed(_) => "decode",
        }
    }
}

/// Decode an upstream body into a user record.
///
/// A top-level `null` is an empty record. Object keys match field names
/// ASCII case-insensitively; an exact-case key wins over a folded one.
pub fn decode_user(body: &[u8]) -> Result<UserRecord, UpstreamError> {
    let map = match serde_json::from_slice::<Value>(body)? {
        Value::Null => return Ok(UserRecord::default()),
        Value::Object(map) => map,
        other => {
            return Err(serde_json::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))
            .into())
        }
    };

    Ok(UserRecord::deserialize(Value::Object(fold_keys(map)))?)
}

fn fold_keys(map: Map<String, Value>) -> Map<String, Value> {
    let mut folded = Map::new();
    for (key, value) in map {
        match USER_FIELDS.iter().find(|field| field.eq_ignore_ascii_case(&key)) {
            Some(field) if *field != key => {
                folded.entry(field.to_string()).or_insert(value);
            }
            _ => {
                folded.insert(key, value);
            }
        }
    }
    folded
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
