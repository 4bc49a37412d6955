//! CloudFront origin-response event as delivered to Lambda@Edge.
//!
//! Only the fields the resizer reads or writes are typed; everything else is
//! kept in the `other` maps so a pass-through response goes back exactly as
//! CloudFront sent it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CONTENT_TYPE: &str = "content-type";

/// Header name (lower-cased) to the ordered list of its entries.
pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CloudFrontEvent {
    #[serde(rename = "Records")]
    pub records: Vec<CloudFrontRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CloudFrontRecord {
    pub cf: CloudFrontPayload,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CloudFrontPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    pub request: EdgeRequest,
    pub response: EdgeResponse,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EdgeRequest {
    pub uri: String,
    #[serde(default)]
    pub querystring: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<BodyEncoding>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    Text,
    Base64,
}

impl EdgeResponse {
    /// Replaces every existing entry of the header with a single `key: value` entry.
    pub fn set_header(&mut self, key: &str, value: impl Into<String>) {
        self.headers.get_or_insert_with(Headers::new).insert(
            key.to_ascii_lowercase(),
            vec![HeaderEntry {
                key: Some(key.to_string()),
                value: value.into(),
            }],
        );
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .get(&name.to_ascii_lowercase())
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }
}
