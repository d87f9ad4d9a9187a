//! Wire shapes of the Firestore REST v1 API that the admin pages read.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single typed field value.
///
/// Firestore encodes the type as the key (`{"stringValue": "..."}`). Only the
/// variants the dashboard reads are modelled; any other key is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`.
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl Document {
    pub fn get_string(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.string_value.as_deref()
    }

    pub fn get_timestamp(&self, field: &str) -> Option<Timestamp> {
        self.fields.get(field)?.timestamp_value
    }

    /// Last segment of the resource name.
    pub fn document_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

/// One element of a `documents:runQuery` response stream.
///
/// Progress-only elements carry a `readTime` but no document.
#[derive(Debug, Clone, Deserialize)]
pub struct RunQueryItem {
    #[serde(default)]
    pub document: Option<Document>,
}
