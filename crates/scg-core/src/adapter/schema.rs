use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `$ref` prefix used by the canonical (Swagger 2.0 style) form.
pub const DEFINITIONS_REF_PREFIX: &str = "#/definitions/";

/// The `type` keyword can be a single keyword or (OpenAPI 3.1) an array of
/// keywords. Normalization collapses arrays to a single keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(String),
    Multiple(Vec<String>),
}

impl TypeSet {
    /// The single type keyword, if this is (or has been collapsed to) one.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            TypeSet::Single(t) => Some(t),
            TypeSet::Multiple(_) => None,
        }
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// A lenient, recursive schema. Covers both Swagger 2.0 definitions and
/// OpenAPI 3.x component schemas; unknown keys are ignored. In the canonical
/// form a `$ref` never co-occurs with other descriptive keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<AdditionalProperties>>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
}

impl Schema {
    /// A schema that carries no keys at all. OpenAPI 3.x uses `{}` as "no
    /// response body"; such schemas are dropped during normalization.
    pub fn is_vacant(&self) -> bool {
        self.ref_path.is_none()
            && self.schema_type.is_none()
            && self.format.is_none()
            && self.description.is_none()
            && self.enum_values.is_empty()
            && self.items.is_none()
            && self.properties.is_empty()
            && self.required.is_empty()
            && self.additional_properties.is_none()
            && self.any_of.is_empty()
            && self.one_of.is_empty()
            && self.all_of.is_empty()
    }

    /// The single `type` keyword, if present.
    pub fn type_str(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(TypeSet::as_single)
    }

    /// The referenced definition name, with the canonical prefix stripped.
    /// A `$ref` with an unexpected prefix is returned whole so it still
    /// fails type-pool lookup instead of silently aliasing something.
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_path
            .as_deref()
            .map(|r| r.strip_prefix(DEFINITIONS_REF_PREFIX).unwrap_or(r))
    }

    /// Shorthand for a schema that is only a `$ref`.
    pub fn reference(target: impl Into<String>) -> Schema {
        Schema {
            ref_path: Some(target.into()),
            ..Schema::default()
        }
    }
}
