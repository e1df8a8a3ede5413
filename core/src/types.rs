//! Domain values and the wire schema of the book-search API.
//!
//! # Design
//! `Book` is what callers see: three always-present strings, no optional
//! fields, so rendering code never checks for absence. The `Volumes*` types
//! mirror the subset of the API document the parser reads; everything else
//! in the document is ignored by serde.

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One search result, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    title: String,
    subtitle: String,
    author: String,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            author: author.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// Contributor names joined with `", "`.
    pub fn author(&self) -> &str {
        &self.author
    }
}

/// Top-level search document. `items` is required: a document without it is
/// rejected like malformed JSON.
#[derive(Debug, Deserialize)]
pub(crate) struct VolumesResponse {
    pub items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Volume {
    #[serde(rename = "volumeInfo")]
    pub volume_info: VolumeInfo,
}

/// `null` and absent are the same thing for every field here.
#[derive(Debug, Deserialize)]
pub(crate) struct VolumeInfo {
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<serde_json::Value>>,
}

/// A text field that also accepts numbers and booleans in their JSON
/// spelling (`1984` becomes `"1984"`). Arrays and objects are rejected.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_)) => Err(de::Error::invalid_type(
            Unexpected::Seq,
            &"a string, number or boolean",
        )),
        Some(Value::Object(_)) => Err(de::Error::invalid_type(
            Unexpected::Map,
            &"a string, number or boolean",
        )),
    }
}

impl From<VolumeInfo> for Book {
    fn from(info: VolumeInfo) -> Self {
        let author = info
            .authors
            .map(|authors| {
                authors
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        Book {
            title: info.title.unwrap_or_default(),
            subtitle: info.subtitle.unwrap_or_default(),
            author,
        }
    }
}
