//! Emits `apis.ts`: the callable client, one exported constant per
//! controller, each method delegating to the injected `$http.run` executor.

use std::collections::BTreeSet;

use heck::{ToLowerCamelCase, ToPascalCase};
use minijinja::{Environment, context};

use scg_core::generic::TypeResolver;
use scg_core::graph::{ApiDefinition, api_key};
use scg_core::selection::SelectedApi;

use super::{RenderContext, bind_params, return_type};
use crate::naming;

/// Namespace alias the client imports the types module under.
const TYPES_NS: &str = "Types";

pub fn emit_apis(ctx: &RenderContext) -> String {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template("apis.ts.j2", include_str!("../../templates/apis.ts.j2"))
        .expect("template should be valid");
    let tmpl = env.get_template("apis.ts.j2").unwrap();

    let resolver = TypeResolver::new(ctx.delimiters, ctx.catalog, Some(TYPES_NS));

    let controller_blocks: Vec<String> = ctx
        .selection
        .iter()
        .filter(|(_, apis)| !apis.is_empty())
        .map(|(controller, apis)| render_controller(controller, apis, ctx, &resolver))
        .collect();

    tmpl.render(context! {
        base_path => ctx.base_path,
        controller_blocks => controller_blocks,
    })
    .expect("render should succeed")
}

fn render_controller(
    controller: &str,
    apis: &[SelectedApi],
    ctx: &RenderContext,
    resolver: &TypeResolver,
) -> String {
    let original_tag = ctx.original_tag(controller, apis);
    let const_name = original_tag.to_lower_camel_case();
    let type_name = original_tag.to_pascal_case();

    let mut lines = vec![format!(
        "export const {const_name}: {TYPES_NS}.{type_name} = {{"
    )];

    for api in apis {
        if let Some(def) = ctx.api_pool.get(&api_key(&api.path, &api.method)) {
            lines.extend(render_method(api, def, ctx.generic_keys, resolver));
        }
    }

    lines.push("};".to_string());
    lines.join("\n")
}

fn render_method(
    api: &SelectedApi,
    def: &ApiDefinition,
    generic_keys: &BTreeSet<String>,
    resolver: &TypeResolver,
) -> Vec<String> {
    let name = naming::method_name(&api.operation_id, &api.path, &api.method);
    let bound = bind_params(def, resolver);
    let resp = return_type(def, resolver, generic_keys);

    let mut signature = bound.signature.clone();
    signature.push("axiosConfig?: AxiosRequestConfig".to_string());

    let mut lines = Vec::new();
    lines.push(format!(
        "  async {name}({}): Promise<{resp}> {{",
        signature.join(", ")
    ));
    // Path parameters stay as literal {name} placeholders; the executor
    // interpolates them from the payload.
    lines.push(format!("    const path = `${{basePath}}{}`;", def.path));

    let plain_body = bound.body.as_ref().filter(|_| !bound.multi_body);
    match plain_body {
        Some(body) if bound.payload_names.is_empty() => {
            let payload_ty = if body.optional {
                format!("{} | undefined", body.ty)
            } else {
                body.ty.clone()
            };
            lines.push(format!("    const payload: {payload_ty} = {};", body.name));
            lines.push(format!(
                "    const ret = await $http.run<{}, {resp}>(path, '{}', payload, axiosConfig);",
                body.ty, def.method
            ));
        }
        _ => {
            let mut entries = bound.payload_names.clone();
            if let Some(body) = plain_body {
                entries.push(format!("...{}", body.name));
            }
            let obj = if entries.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", entries.join(", "))
            };
            lines.push(format!(
                "    const payload: {TYPES_NS}.BaseRequestDTO = {obj};"
            ));
            lines.push(format!(
                "    const ret = await $http.run<{TYPES_NS}.BaseRequestDTO, {resp}>(path, '{}', payload, axiosConfig);",
                def.method
            ));
        }
    }

    lines.push("    return ret;".to_string());
    lines.push("  },".to_string());
    lines
}
