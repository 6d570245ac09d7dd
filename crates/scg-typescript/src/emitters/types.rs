//! Emits `types.ts`: prelude aliases, generic wrapper interfaces, concrete
//! data interfaces, and one interface per controller.

use std::collections::HashSet;

use heck::ToPascalCase;
use minijinja::{Environment, context};

use scg_core::adapter::Schema;
use scg_core::generic::{Delimiters, TypeResolver, WrapperCatalog};
use scg_core::graph::{TypeDefinition, api_key};
use scg_core::selection::{SelectedApi, locale_cmp};

use super::{RenderContext, bind_params, return_type};
use crate::naming;

pub fn emit_types(ctx: &RenderContext) -> String {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template("types.ts.j2", include_str!("../../templates/types.ts.j2"))
        .expect("template should be valid");
    let tmpl = env.get_template("types.ts.j2").unwrap();

    let resolver = TypeResolver::new(ctx.delimiters, ctx.catalog, None);

    let mut generic_defs: Vec<&TypeDefinition> = Vec::new();
    let mut concrete_defs: Vec<&TypeDefinition> = Vec::new();
    for key in ctx.required {
        if let Some(def) = ctx.types_pool.get(key) {
            if def.is_generic {
                generic_defs.push(def);
            } else {
                concrete_defs.push(def);
            }
        }
    }
    generic_defs.sort_by(|a, b| locale_cmp(&a.key, &b.key));
    concrete_defs.sort_by(|a, b| locale_cmp(&a.key, &b.key));

    let generic_blocks: Vec<String> = generic_defs
        .iter()
        .map(|def| render_generic_interface(def, &resolver, ctx.delimiters, ctx.catalog))
        .collect();
    let concrete_blocks: Vec<String> = concrete_defs
        .iter()
        .map(|def| render_concrete_interface(def, &resolver))
        .collect();

    let controller_blocks: Vec<String> = ctx
        .selection
        .iter()
        .filter(|(_, apis)| !apis.is_empty())
        .map(|(controller, apis)| render_controller_interface(controller, apis, ctx, &resolver))
        .collect();

    tmpl.render(context! {
        generic_blocks => generic_blocks,
        concrete_blocks => concrete_blocks,
        controller_blocks => controller_blocks,
    })
    .expect("render should succeed")
}

fn render_generic_interface(
    def: &TypeDefinition,
    resolver: &TypeResolver,
    delimiters: Delimiters,
    catalog: &WrapperCatalog,
) -> String {
    let mut lines = Vec::new();
    if !def.description.is_empty() {
        lines.push(format!("/** {} */", def.description));
    }
    lines.push(format!("export interface {}<T> {{", def.key));

    // Type names mentioned by this definition's own parameter expression;
    // properties referencing one of them become the placeholder.
    let expr = def.generic_param_expr.as_deref();
    let tokens: HashSet<String> = expr
        .map(|e| delimiters.type_tokens(e, catalog).into_iter().collect())
        .unwrap_or_default();

    for (name, prop) in &def.properties {
        if let Some(d) = &prop.description {
            lines.push(format!("  /** {d} */"));
        }
        let ty = generic_prop_type(prop, expr, &tokens, resolver, delimiters);
        lines.push(format!("  {name}?: {ty};"));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn generic_prop_type(
    prop: &Schema,
    param_expr: Option<&str>,
    tokens: &HashSet<String>,
    resolver: &TypeResolver,
    delimiters: Delimiters,
) -> String {
    let matches_placeholder = |target: &str| {
        param_expr == Some(target) || tokens.contains(delimiters.base_key(target))
    };

    if let Some(target) = prop.ref_name() {
        if matches_placeholder(target) {
            return "T".to_string();
        }
        return resolver.resolve(target);
    }

    if prop.type_str() == Some("array")
        && let Some(items) = &prop.items
        && let Some(target) = items.ref_name()
    {
        if matches_placeholder(target) {
            return "Array<T>".to_string();
        }
        return format!("{}[]", resolver.resolve(target));
    }

    resolver.schema_type(prop)
}

fn render_concrete_interface(def: &TypeDefinition, resolver: &TypeResolver) -> String {
    let mut lines = Vec::new();
    if !def.description.is_empty() {
        lines.push(format!("/** {} */", def.description));
    }
    lines.push(format!("export interface {} {{", def.key));

    // Required-ness is not propagated; source documents rarely declare it
    // reliably, so every property is optional.
    for (name, prop) in &def.properties {
        if let Some(d) = &prop.description {
            lines.push(format!("  /** {d} */"));
        }
        lines.push(format!("  {name}?: {};", resolver.schema_type(prop)));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn render_controller_interface(
    controller: &str,
    apis: &[SelectedApi],
    ctx: &RenderContext,
    resolver: &TypeResolver,
) -> String {
    let original_tag = ctx.original_tag(controller, apis);
    let description = ctx.tag_description(original_tag);

    let mut lines = Vec::new();
    lines.push(format!("/** {description} */"));
    lines.push(format!("export interface {} {{", original_tag.to_pascal_case()));

    for api in apis {
        let Some(def) = ctx.api_pool.get(&api_key(&api.path, &api.method)) else {
            continue;
        };
        if !def.summary.is_empty() {
            lines.push(format!("  /** {} */", def.summary));
        }
        let name = naming::method_name(&api.operation_id, &api.path, &api.method);
        let mut signature = bind_params(def, resolver).signature;
        signature.push("axiosConfig?: AxiosRequestConfig".to_string());
        let ret = return_type(def, resolver, ctx.generic_keys);
        lines.push(format!(
            "  {name}({}): Promise<{ret}>;",
            signature.join(", ")
        ));
    }

    lines.push("}".to_string());
    lines.join("\n")
}
