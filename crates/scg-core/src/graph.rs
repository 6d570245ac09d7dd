//! Builds the pools of type and operation definitions and computes the
//! transitive closure of definitions actually reachable from the selected
//! operations.

use std::collections::{BTreeSet, HashSet, VecDeque};

use indexmap::IndexMap;

use crate::adapter::{Operation, Parameter, Paths, Schema};
use crate::generic::{Delimiters, WrapperCatalog};

/// Keys that never enter the emitted pool: `Map` and the prelude aliases are
/// declared once at the top of the types module, and `List` only exists as
/// the resolver's array form.
pub const RESERVED_POOL_KEYS: [&str; 4] = ["Map", "List", "PlainObject", "BaseRequestDTO"];

/// A cleaned, emittable type definition derived from a raw definition entry.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    /// Base name with generic markers stripped; unique within the pool.
    pub key: String,
    /// The raw definition name as it appears in the document.
    pub original_name: String,
    pub is_generic: bool,
    /// The expression between the outermost generic markers, when generic.
    pub generic_param_expr: Option<String>,
    pub properties: IndexMap<String, Schema>,
    pub description: String,
}

/// A selected operation with its type dependencies resolved.
#[derive(Debug, Clone)]
pub struct ApiDefinition {
    pub path: String,
    /// Lowercase HTTP method.
    pub method: String,
    pub operation_id: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Schema of the success response, when one is declared.
    pub response: Option<Schema>,
    pub input_types: BTreeSet<String>,
    pub output_types: BTreeSet<String>,
    pub all_types: BTreeSet<String>,
}

impl ApiDefinition {
    /// Pool key: `path::method`.
    pub fn key(&self) -> String {
        api_key(&self.path, &self.method)
    }
}

pub fn api_key(path: &str, method: &str) -> String {
    format!("{path}::{}", method.to_ascii_lowercase())
}

/// Clean the raw definitions into a keyed pool. When a generic and a
/// non-generic definition share a base key, the generic one wins no matter
/// which the document declares first; otherwise the first occurrence wins.
pub fn build_types_pool(
    definitions: &IndexMap<String, Schema>,
    delimiters: Delimiters,
) -> IndexMap<String, TypeDefinition> {
    let mut pool: IndexMap<String, TypeDefinition> = IndexMap::new();

    for (original_name, def) in definitions {
        let key = delimiters.base_key(original_name).to_string();
        if key.is_empty() || RESERVED_POOL_KEYS.contains(&key.as_str()) {
            continue;
        }

        let is_generic = delimiters.is_generic(original_name);
        if let Some(existing) = pool.get(&key) {
            // Only a generic definition may displace a non-generic one.
            if existing.is_generic || !is_generic {
                continue;
            }
        }

        let type_def = TypeDefinition {
            key: key.clone(),
            original_name: original_name.clone(),
            is_generic,
            generic_param_expr: delimiters.param_expr(original_name).map(str::to_string),
            properties: def.properties.clone(),
            description: def.description.clone().unwrap_or_default(),
        };
        pool.insert(key, type_def);
    }

    pool
}

/// Build one `ApiDefinition` per operation in the (already filtered) paths,
/// collecting input-position and output-position type names.
pub fn build_api_pool(
    paths: &Paths,
    delimiters: Delimiters,
    catalog: &WrapperCatalog,
) -> IndexMap<String, ApiDefinition> {
    let mut pool = IndexMap::new();

    for (path, methods) in paths {
        for (method, op) in methods {
            let def = build_api_definition(path, method, op, delimiters, catalog);
            pool.insert(def.key(), def);
        }
    }

    pool
}

fn build_api_definition(
    path: &str,
    method: &str,
    op: &Operation,
    delimiters: Delimiters,
    catalog: &WrapperCatalog,
) -> ApiDefinition {
    let mut input_types = BTreeSet::new();
    for param in &op.parameters {
        if let Some(schema) = &param.schema {
            collect_schema_types(schema, delimiters, catalog, &mut input_types);
        }
    }

    let mut output_types = BTreeSet::new();
    let response = op.success_response().and_then(|r| r.schema.clone());
    if let Some(schema) = &response {
        collect_schema_types(schema, delimiters, catalog, &mut output_types);
    }

    let all_types = input_types.union(&output_types).cloned().collect();

    ApiDefinition {
        path: path.to_string(),
        method: method.to_ascii_lowercase(),
        operation_id: op.operation_id.clone().unwrap_or_default(),
        summary: op
            .summary
            .clone()
            .or_else(|| op.description.clone())
            .unwrap_or_default(),
        tags: op.tags.clone(),
        parameters: op.parameters.clone(),
        response,
        input_types,
        output_types,
        all_types,
    }
}

/// Record the type names a schema references: a direct `$ref`, or the
/// `items.$ref` of an array.
fn collect_schema_types(
    schema: &Schema,
    delimiters: Delimiters,
    catalog: &WrapperCatalog,
    out: &mut BTreeSet<String>,
) {
    if let Some(name) = schema.ref_name() {
        out.extend(extract_types_from_name(name, delimiters, catalog));
    } else if schema.type_str() == Some("array")
        && let Some(items) = &schema.items
        && let Some(name) = items.ref_name()
    {
        out.extend(extract_types_from_name(name, delimiters, catalog));
    }
}

/// All type names a (possibly pseudo-generic) definition name depends on:
/// the base key plus every nested parameter name, list wrappers unwrapped.
pub fn extract_types_from_name(
    name: &str,
    delimiters: Delimiters,
    catalog: &WrapperCatalog,
) -> Vec<String> {
    if name.is_empty() {
        return Vec::new();
    }
    if !delimiters.is_generic(name) {
        return vec![name.to_string()];
    }

    let mut types = vec![delimiters.base_key(name).to_string()];
    if let Some(expr) = delimiters.param_expr(name) {
        types.extend(delimiters.type_tokens(expr, catalog));
    }
    types
}

/// The set of definition keys that must be emitted for the selected
/// operations.
///
/// Every generic pool entry is emitted unconditionally (any concrete API may
/// reference an envelope with a fresh instantiation); concrete types are
/// collected breadth-first from the operations' referenced names through
/// property and array-item references. Unresolvable names are skipped; they
/// render as `any` at the use site. The visited set tolerates definition
/// cycles.
pub fn collect_required_types(
    api_pool: &IndexMap<String, ApiDefinition>,
    types_pool: &IndexMap<String, TypeDefinition>,
    delimiters: Delimiters,
    catalog: &WrapperCatalog,
) -> BTreeSet<String> {
    let mut required: BTreeSet<String> = types_pool
        .values()
        .filter(|t| t.is_generic)
        .map(|t| t.key.clone())
        .collect();

    let mut queue: VecDeque<String> = VecDeque::new();
    let mut seen: HashSet<String> = HashSet::new();

    for api in api_pool.values() {
        for name in &api.all_types {
            if seen.insert(name.clone()) {
                queue.push_back(name.clone());
            }
        }
    }

    while let Some(name) = queue.pop_front() {
        let Some(type_def) = types_pool.get(&name) else {
            log::debug!("type {name} not found in pool; it will render as any");
            continue;
        };
        if type_def.is_generic {
            continue;
        }

        required.insert(type_def.key.clone());

        for prop in type_def.properties.values() {
            let mut referenced = BTreeSet::new();
            collect_schema_types(prop, delimiters, catalog, &mut referenced);
            for name in referenced {
                if seen.insert(name.clone()) {
                    queue.push_back(name);
                }
            }
        }
    }

    required
}
