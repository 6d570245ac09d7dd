use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::Schema;

/// Detected source-document flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecVersion {
    #[serde(rename = "2.0")]
    V2,
    #[serde(rename = "3.x")]
    V3,
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecVersion::V2 => write!(f, "2.0"),
            SpecVersion::V3 => write!(f, "3.x"),
        }
    }
}

/// API metadata. Everything is optional because real documents frequently
/// omit fields the spec calls required.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Info {
    /// Document title, used as the output directory name.
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("api")
    }
}

/// A grouping tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where a parameter is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    Body,
    Query,
    Path,
    Header,
    FormData,
    #[serde(other)]
    Other,
}

/// A canonical parameter. In the canonical form at most one parameter per
/// operation has `location == Body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParamLocation,

    #[serde(default)]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A canonical response: description plus an optional flattened schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Success status codes, checked in order of preference.
pub const SUCCESS_CODES: [&str; 3] = ["200", "201", "default"];

/// A canonical operation. OpenAPI 3.x request bodies have already been
/// collapsed into a synthetic body parameter; there is no `requestBody`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

impl Operation {
    /// The success response, preferring 200, then 201, then `default`.
    pub fn success_response(&self) -> Option<&Response> {
        SUCCESS_CODES.iter().find_map(|c| self.responses.get(*c))
    }
}

/// `path -> http method -> operation`.
pub type Paths = IndexMap<String, IndexMap<String, Operation>>;

/// The canonical intermediate form both document flavors normalize into.
///
/// Serialized copies carry an `x-normalized` marker so that re-normalizing
/// cached data is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSpec {
    #[serde(rename = "x-normalized", default)]
    pub normalized: bool,

    pub version: SpecVersion,

    #[serde(default)]
    pub info: Info,

    #[serde(rename = "basePath", default)]
    pub base_path: String,

    #[serde(default)]
    pub paths: Paths,

    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,

    #[serde(default)]
    pub tags: Vec<Tag>,
}
