use indexmap::IndexMap;
use serde::Deserialize;

use super::normalized::{Info, Parameter, Tag};
use super::schema::Schema;

/// Raw top-level document, lenient enough to hold either flavor before the
/// version branch. Path items stay untyped here because Swagger path objects
/// mix operations with non-operation keys (`parameters`, `$ref`, vendor
/// extensions).
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    pub swagger: Option<String>,
    pub openapi: Option<String>,

    #[serde(default)]
    pub info: Info,

    #[serde(rename = "basePath")]
    pub base_path: Option<String>,

    #[serde(default)]
    pub servers: Vec<Server>,

    #[serde(default)]
    pub paths: IndexMap<String, IndexMap<String, serde_json::Value>>,

    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,

    pub components: Option<Components>,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub url: String,
    pub description: Option<String>,
}

/// An OpenAPI 3.x operation as written: request body and per-media-type
/// response content still in place.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOperation {
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,

    pub summary: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,

    #[serde(default)]
    pub responses: IndexMap<String, RawResponse>,

    pub deprecated: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}
