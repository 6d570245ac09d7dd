pub mod apis;
pub mod index;
pub mod types;

use std::collections::BTreeSet;

use indexmap::IndexMap;

use scg_core::adapter::{NormalizedSpec, ParamLocation, Parameter};
use scg_core::generic::{Delimiters, TypeResolver, WrapperCatalog};
use scg_core::graph::{ApiDefinition, TypeDefinition};
use scg_core::selection::SelectedApis;

/// Everything the emitters need for one generation pass.
pub struct RenderContext<'a> {
    pub spec: &'a NormalizedSpec,
    pub selection: &'a SelectedApis,
    pub types_pool: &'a IndexMap<String, TypeDefinition>,
    pub api_pool: &'a IndexMap<String, ApiDefinition>,
    pub required: &'a BTreeSet<String>,
    pub generic_keys: &'a BTreeSet<String>,
    pub delimiters: Delimiters,
    pub catalog: &'a WrapperCatalog,
    pub base_path: &'a str,
}

impl RenderContext<'_> {
    /// Description of a tag from the document's tag list, defaulting to the
    /// tag name itself.
    pub fn tag_description<'b>(&'b self, tag: &'b str) -> &'b str {
        self.spec
            .tags
            .iter()
            .find(|t| t.name == tag)
            .and_then(|t| t.description.as_deref())
            .unwrap_or(tag)
    }

    /// The original tag a controller bucket was grouped under, recovered
    /// from its first operation; falls back to the normalized bucket key.
    pub fn original_tag<'b>(
        &'b self,
        controller: &'b str,
        apis: &[scg_core::selection::SelectedApi],
    ) -> &'b str {
        apis.iter()
            .find_map(|api| {
                let key = scg_core::graph::api_key(&api.path, &api.method);
                self.api_pool.get(&key).and_then(|d| d.tags.first())
            })
            .map(String::as_str)
            .unwrap_or(controller)
    }
}

/// The single body argument of a method.
pub struct BodyBinding {
    pub name: String,
    pub ty: String,
    pub optional: bool,
}

/// An operation's parameters classified and rendered for a signature.
pub struct BoundParams {
    /// Argument declarations, in emit order: path, query, body.
    pub signature: Vec<String>,
    /// Names feeding the payload object (path + query; body names when the
    /// document declares several body parameters).
    pub payload_names: Vec<String>,
    pub body: Option<BodyBinding>,
    pub multi_body: bool,
}

/// Classify and render an operation's parameters. Path parameters are
/// always required; query and body parameters are optional unless the
/// source marks them required. Several body parameters (malformed 2.0
/// input) all become arguments and feed the payload object.
pub fn bind_params(api: &ApiDefinition, resolver: &TypeResolver) -> BoundParams {
    let bodies: Vec<&Parameter> = api
        .parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Body)
        .collect();

    if bodies.len() > 1 {
        let mut signature = Vec::new();
        let mut payload_names = Vec::new();
        for p in &bodies {
            let name = body_name(p);
            let optional = if p.required { "" } else { "?" };
            signature.push(format!("{name}{optional}: {}", param_type(p, resolver)));
            payload_names.push(name.to_string());
        }
        return BoundParams {
            signature,
            payload_names,
            body: None,
            multi_body: true,
        };
    }

    let mut signature = Vec::new();
    let mut payload_names = Vec::new();

    for p in &api.parameters {
        if p.location != ParamLocation::Path {
            continue;
        }
        signature.push(format!("{}: {}", p.name, param_type(p, resolver)));
        payload_names.push(p.name.clone());
    }
    for p in &api.parameters {
        if p.location != ParamLocation::Query {
            continue;
        }
        let optional = if p.required { "" } else { "?" };
        signature.push(format!("{}{optional}: {}", p.name, param_type(p, resolver)));
        payload_names.push(p.name.clone());
    }

    let body = bodies.first().map(|p| {
        let name = body_name(p).to_string();
        let ty = param_type(p, resolver);
        let optional = !p.required;
        signature.push(format!(
            "{name}{}: {ty}",
            if optional { "?" } else { "" }
        ));
        BodyBinding { name, ty, optional }
    });

    BoundParams {
        signature,
        payload_names,
        body,
        multi_body: false,
    }
}

fn body_name(p: &Parameter) -> &str {
    if p.name.is_empty() { "body" } else { &p.name }
}

/// A parameter's TypeScript type: schema when present, else the primitive
/// `type`/`format` pair, with 2.0-style `items` arrays handled.
pub fn param_type(p: &Parameter, resolver: &TypeResolver) -> String {
    if let Some(schema) = &p.schema {
        return resolver.schema_type(schema);
    }
    if p.param_type.as_deref() == Some("array") {
        return match &p.items {
            Some(items) => format!("{}[]", resolver.schema_type(items)),
            None => "any[]".to_string(),
        };
    }
    resolver.primitive_param(p.param_type.as_deref(), p.format.as_deref())
}

/// The resolved return type of an operation: `void` without a success
/// schema, otherwise the wrapper-aware expression with bare generic
/// envelopes defaulted to `<void>`.
pub fn return_type(
    api: &ApiDefinition,
    resolver: &TypeResolver,
    generic_keys: &BTreeSet<String>,
) -> String {
    match &api.response {
        None => "void".to_string(),
        Some(schema) => resolver.ensure_generic(resolver.schema_type(schema), generic_keys),
    }
}
