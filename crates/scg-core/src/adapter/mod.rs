//! Adapts Swagger 2.0 and OpenAPI 3.x documents into one canonical shape.
//!
//! 2.0 documents pass through almost untouched (tag synthesis only). 3.x
//! documents are rewritten into the 2.0-style layout used internally:
//! `components.schemas` becomes `definitions`, request bodies collapse into a
//! synthetic `body` parameter, response content is flattened to a single
//! schema, and `$ref` paths are rewritten to the `#/definitions/` convention.

pub mod document;
pub mod normalized;
pub mod schema;

pub use normalized::{
    Info, NormalizedSpec, Operation, ParamLocation, Parameter, Paths, Response, SpecVersion, Tag,
};
pub use schema::{AdditionalProperties, Schema, TypeSet, DEFINITIONS_REF_PREFIX};

use indexmap::IndexMap;

use crate::error::AdapterError;
use document::{RawDocument, RawOperation, RawResponse, RequestBody, Server};
use schema::TypeSet as Ts;

/// HTTP methods recognized inside a path item. Anything else on the path
/// object (`parameters`, vendor extensions) is ignored.
pub const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];

const NORMALIZED_MARKER: &str = "x-normalized";
const SCHEMAS_REF_PREFIX: &str = "#/components/schemas/";
const DEFAULT_TAG: &str = "default";
const CONTROLLER_SUFFIX: &str = "Controller";

/// Inspect the document's version marker.
pub fn detect_version(doc: &serde_json::Value) -> Option<SpecVersion> {
    if let Some(v) = doc.get("swagger").and_then(serde_json::Value::as_str)
        && v.starts_with("2.")
    {
        return Some(SpecVersion::V2);
    }
    if let Some(v) = doc.get("openapi").and_then(serde_json::Value::as_str)
        && v.starts_with("3.")
    {
        return Some(SpecVersion::V3);
    }
    None
}

/// Normalize a parsed document into the canonical shape.
///
/// Idempotent: a value carrying the `x-normalized` marker deserializes back
/// unchanged. An unrecognized version marker is fatal; malformed nested
/// schemas are not (they resolve to `any` downstream).
pub fn normalize(doc: &serde_json::Value) -> Result<NormalizedSpec, AdapterError> {
    if doc.get(NORMALIZED_MARKER).and_then(serde_json::Value::as_bool) == Some(true) {
        return Ok(serde_json::from_value(doc.clone())?);
    }

    let Some(version) = detect_version(doc) else {
        let marker = doc
            .get("swagger")
            .or_else(|| doc.get("openapi"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        return Err(AdapterError::UnsupportedVersion(marker));
    };

    let raw: RawDocument = serde_json::from_value(doc.clone())?;
    Ok(match version {
        SpecVersion::V2 => normalize_swagger2(raw),
        SpecVersion::V3 => normalize_openapi3(raw),
    })
}

fn normalize_swagger2(raw: RawDocument) -> NormalizedSpec {
    let paths = parse_operations(raw.paths, SpecVersion::V2);
    let tags = build_tags(&raw.tags, &paths, false);

    NormalizedSpec {
        normalized: true,
        version: SpecVersion::V2,
        info: raw.info,
        base_path: clean_base_path(raw.base_path.as_deref().unwrap_or("")),
        paths,
        definitions: raw.definitions,
        tags,
    }
}

fn normalize_openapi3(raw: RawDocument) -> NormalizedSpec {
    let definitions: IndexMap<String, Schema> = raw
        .components
        .map(|c| c.schemas)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, s)| (name, normalize_schema(s)))
        .collect();

    let base_path = extract_base_path(&raw.servers);
    let paths = parse_operations(raw.paths, SpecVersion::V3);
    let tags = build_tags(&raw.tags, &paths, true);

    NormalizedSpec {
        normalized: true,
        version: SpecVersion::V3,
        info: raw.info,
        base_path,
        paths,
        definitions,
        tags,
    }
}

fn parse_operations(
    raw_paths: IndexMap<String, IndexMap<String, serde_json::Value>>,
    version: SpecVersion,
) -> Paths {
    let mut out = Paths::new();

    for (path, item) in raw_paths {
        let mut methods: IndexMap<String, Operation> = IndexMap::new();

        for (method, value) in item {
            let m = method.to_ascii_lowercase();
            if !HTTP_METHODS.contains(&m.as_str()) {
                continue;
            }

            let parsed = match version {
                SpecVersion::V2 => serde_json::from_value::<Operation>(value).map(|mut op| {
                    if op.tags.is_empty() {
                        op.tags = vec![DEFAULT_TAG.to_string()];
                    }
                    op
                }),
                SpecVersion::V3 => {
                    serde_json::from_value::<RawOperation>(value).map(normalize_operation)
                }
            };

            match parsed {
                Ok(op) => {
                    methods.insert(m, op);
                }
                Err(e) => log::warn!("skipping unparsable operation {m} {path}: {e}"),
            }
        }

        if !methods.is_empty() {
            out.insert(path, methods);
        }
    }

    out
}

/// Convert a raw 3.x operation to the canonical form: body parameter
/// synthesized, responses flattened, tags suffixed.
fn normalize_operation(raw: RawOperation) -> Operation {
    let mut parameters: Vec<Parameter> = raw
        .parameters
        .into_iter()
        .map(|mut p| {
            p.schema = p.schema.map(normalize_schema);
            p.items = p.items.map(normalize_schema);
            p
        })
        .collect();

    if let Some(rb) = raw.request_body
        && let Some(body) = request_body_to_parameter(rb)
    {
        parameters.push(body);
    }

    let responses = raw
        .responses
        .into_iter()
        .map(|(code, r)| (code, normalize_response(r)))
        .collect();

    let tags = if raw.tags.is_empty() {
        vec![suffix_controller(DEFAULT_TAG)]
    } else {
        raw.tags.iter().map(|t| suffix_controller(t)).collect()
    };

    Operation {
        tags,
        operation_id: raw.operation_id,
        summary: raw.summary,
        description: raw.description,
        parameters,
        responses,
        deprecated: raw.deprecated,
    }
}

fn request_body_to_parameter(rb: RequestBody) -> Option<Parameter> {
    let schema = pick_schema(rb.content)?;
    Some(Parameter {
        name: "body".to_string(),
        location: ParamLocation::Body,
        required: rb.required,
        schema: Some(normalize_schema(schema)),
        param_type: None,
        format: None,
        items: None,
        description: rb.description,
    })
}

fn normalize_response(raw: RawResponse) -> Response {
    let schema = pick_schema(raw.content)
        .filter(|s| !s.is_vacant())
        .map(normalize_schema);
    Response {
        description: raw.description,
        schema,
    }
}

/// Choose a media type: JSON first, then the wildcard, then whatever is
/// declared first.
fn pick_schema(mut content: IndexMap<String, document::MediaType>) -> Option<Schema> {
    for key in ["application/json", "*/*"] {
        if let Some(mt) = content.shift_remove(key) {
            return mt.schema;
        }
    }
    content.into_iter().next().and_then(|(_, mt)| mt.schema)
}

/// Recursively rewrite a 3.x schema into the canonical form.
fn normalize_schema(schema: Schema) -> Schema {
    // $ref is exclusive in canonical form; sibling keys are dropped.
    if let Some(ref_path) = schema.ref_path {
        return Schema::reference(ref_path.replace(SCHEMAS_REF_PREFIX, DEFINITIONS_REF_PREFIX));
    }

    let mut out = schema;

    // 3.1-style `type: [T, "null"]` collapses to the first non-null keyword.
    out.schema_type = match out.schema_type.take() {
        Some(Ts::Multiple(types)) => types.into_iter().find(|t| t != "null").map(Ts::Single),
        single => single,
    };

    // Nullable anyOf unions collapse to their single non-null branch;
    // genuine multi-branch unions keep anyOf and lose `type`.
    if !out.any_of.is_empty() {
        let non_null: Vec<Schema> = std::mem::take(&mut out.any_of)
            .into_iter()
            .filter(|s| s.type_str() != Some("null"))
            .collect();
        if non_null.len() == 1 {
            return normalize_schema(non_null.into_iter().next().expect("one branch"));
        }
        if non_null.len() > 1 {
            out.any_of = non_null.into_iter().map(normalize_schema).collect();
            out.schema_type = None;
        }
    }

    out.items = out.items.map(|s| Box::new(normalize_schema(*s)));
    out.properties = out
        .properties
        .into_iter()
        .map(|(k, v)| (k, normalize_schema(v)))
        .collect();
    if let Some(ap) = out.additional_properties.take() {
        out.additional_properties = Some(Box::new(match *ap {
            AdditionalProperties::Schema(s) => {
                AdditionalProperties::Schema(Box::new(normalize_schema(*s)))
            }
            keep => keep,
        }));
    }
    out.all_of = out.all_of.into_iter().map(normalize_schema).collect();
    out.one_of = out.one_of.into_iter().map(normalize_schema).collect();

    out
}

/// The path component of the first declared server URL. Relative server
/// URLs are used as-is, coerced to a leading slash.
fn extract_base_path(servers: &[Server]) -> String {
    let Some(server) = servers.first() else {
        return String::new();
    };
    let url = server.url.trim();
    let path = match url.find("://") {
        Some(idx) => {
            let rest = &url[idx + 3..];
            match rest.find('/') {
                Some(i) => &rest[i..],
                None => "",
            }
        }
        None => url,
    };
    let path = path.split(['?', '#']).next().unwrap_or("");
    clean_base_path(path)
}

/// '' or a leading-slash path with no trailing slash.
fn clean_base_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn suffix_controller(name: &str) -> String {
    if name.to_ascii_lowercase().ends_with("controller") {
        name.to_string()
    } else {
        format!("{name}{CONTROLLER_SUFFIX}")
    }
}

/// Build the unified tag list: declared tags first (suffixed for 3.x), then
/// tags collected from operations in document order. Descriptions default to
/// the tag name. Operation tags are canonical by the time this runs, so the
/// synthetic default tag arrives via collection.
fn build_tags(declared: &[Tag], paths: &Paths, suffix: bool) -> Vec<Tag> {
    let mut seen: IndexMap<String, Tag> = IndexMap::new();

    for tag in declared {
        let name = if suffix {
            suffix_controller(&tag.name)
        } else {
            tag.name.clone()
        };
        let description = tag.description.clone().unwrap_or_else(|| name.clone());
        seen.entry(name.clone()).or_insert(Tag {
            name,
            description: Some(description),
        });
    }

    for methods in paths.values() {
        for op in methods.values() {
            for t in &op.tags {
                seen.entry(t.clone()).or_insert_with(|| Tag {
                    name: t.clone(),
                    description: Some(t.clone()),
                });
            }
        }
    }

    if seen.is_empty() {
        let name = if suffix {
            suffix_controller(DEFAULT_TAG)
        } else {
            DEFAULT_TAG.to_string()
        };
        seen.insert(
            name.clone(),
            Tag {
                name: name.clone(),
                description: Some(name),
            },
        );
    }

    seen.into_values().collect()
}
