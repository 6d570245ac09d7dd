use serde_json::json;

use scg_core::adapter::{self, NormalizedSpec};
use scg_core::selection::{self, SelectedApis};
use scg_core::{CodeGenerator, GeneratedFile};
use scg_typescript::{TsClientGenerator, TsGeneratorConfig, naming, recover_selection};

fn demo_doc() -> serde_json::Value {
    json!({
        "openapi": "3.0.1",
        "info": {"title": "Demo", "version": "1.0"},
        "servers": [{"url": "https://host.example.com/api"}],
        "tags": [{"name": "user", "description": "User ops"}],
        "paths": {
            "/users/{id}": {
                "get": {
                    "tags": ["user"],
                    "operationId": "getUserUsingGET",
                    "summary": "Get user",
                    "parameters": [
                        {"name": "id", "in": "path", "required": true,
                         "schema": {"type": "integer"}},
                        {"name": "verbose", "in": "query",
                         "schema": {"type": "boolean"}}
                    ],
                    "responses": {"200": {"description": "ok", "content": {
                        "application/json": {"schema": {"$ref": "#/components/schemas/Result«UserDTO»"}}
                    }}}
                }
            },
            "/users": {
                "post": {
                    "tags": ["user"],
                    "operationId": "createUser",
                    "requestBody": {"required": true, "content": {
                        "application/json": {"schema": {"$ref": "#/components/schemas/UserDTO"}}
                    }},
                    "responses": {"200": {"description": "ok", "content": {
                        "application/json": {"schema": {"$ref": "#/components/schemas/Result«PageResult«UserDTO»»"}}
                    }}}
                }
            }
        },
        "components": {"schemas": {
            "Result«UserDTO»": {
                "type": "object",
                "description": "Response envelope",
                "properties": {
                    "code": {"type": "integer"},
                    "data": {"$ref": "#/components/schemas/UserDTO"}
                }
            },
            "PageResult«UserDTO»": {
                "type": "object",
                "properties": {
                    "list": {"type": "array", "items": {"$ref": "#/components/schemas/UserDTO"}},
                    "total": {"type": "integer"}
                }
            },
            "UserDTO": {
                "type": "object",
                "properties": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"},
                    "roles": {"type": "array", "items": {"$ref": "#/components/schemas/RoleDTO"}}
                }
            },
            "RoleDTO": {
                "type": "object",
                "properties": {"label": {"type": "string"}}
            }
        }}
    })
}

fn full_selection(spec: &NormalizedSpec) -> SelectedApis {
    selection::merge_selection(SelectedApis::new(), selection::select_all(spec, &[]))
}

fn generate(
    spec: &NormalizedSpec,
    sel: &SelectedApis,
    config: &TsGeneratorConfig,
) -> Vec<GeneratedFile> {
    TsClientGenerator::default()
        .generate(spec, sel, config)
        .unwrap()
}

fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
    &files.iter().find(|f| f.path == path).unwrap().content
}

#[test]
fn full_pipeline_renders_expected_shapes() {
    let spec = adapter::normalize(&demo_doc()).unwrap();
    let sel = full_selection(&spec);
    let files = generate(&spec, &sel, &TsGeneratorConfig::default());

    let types = file(&files, "types.ts");
    let apis = file(&files, "apis.ts");

    // generic envelopes, with the instantiation-matched property as T
    assert!(types.contains("/** Response envelope */"));
    assert!(types.contains("export interface Result<T> {\n  code?: number;\n  data?: T;\n}"));
    assert!(types.contains("export interface PageResult<T> {\n  list?: Array<T>;\n  total?: number;\n}"));

    // concrete types, every property optional, refs resolved bare
    assert!(types.contains("export interface UserDTO {\n  id?: number;\n  name?: string;\n  roles?: RoleDTO[];\n}"));
    assert!(types.contains("export interface RoleDTO {"));

    // controller interface carries the tag description and both methods
    assert!(types.contains("/** User ops */\nexport interface UserController {"));
    let get_name = naming::method_name("getUser", "/users/{id}", "get");
    let create_name = naming::method_name("createUser", "/users", "post");
    assert!(types.contains(&format!(
        "  /** Get user */\n  {get_name}(id: number, verbose?: boolean, axiosConfig?: AxiosRequestConfig): Promise<Result<UserDTO>>;"
    )));
    // nested generic unwrap: Result«PageResult«UserDTO»» flattens the page
    // payload to an element array
    assert!(types.contains(&format!(
        "  {create_name}(body: UserDTO, axiosConfig?: AxiosRequestConfig): Promise<Result<PageResult<UserDTO[]>>>;"
    )));

    // client module: base path constant, namespaced types, payload binding
    assert!(apis.contains("const basePath = '/api';"));
    assert!(apis.contains("export const userController: Types.UserController = {"));
    assert!(apis.contains(&format!(
        "  async {get_name}(id: number, verbose?: boolean, axiosConfig?: AxiosRequestConfig): Promise<Types.Result<Types.UserDTO>> {{"
    )));
    assert!(apis.contains("    const path = `${basePath}/users/{id}`;"));
    assert!(apis.contains("    const payload: Types.BaseRequestDTO = { id, verbose };"));
    assert!(apis.contains(
        "    const ret = await $http.run<Types.BaseRequestDTO, Types.Result<Types.UserDTO>>(path, 'get', payload, axiosConfig);"
    ));

    // body-only operation uses the body argument as the payload
    assert!(apis.contains("    const payload: Types.UserDTO = body;"));
    assert!(apis.contains(
        "    const ret = await $http.run<Types.UserDTO, Types.Result<Types.PageResult<Types.UserDTO[]>>>(path, 'post', payload, axiosConfig);"
    ));

    // barrel re-exports both modules
    let index = file(&files, "index.ts");
    assert!(index.contains("import * as Types from './types';"));
    assert!(index.contains("import * as APIs from './apis';"));
}

#[test]
fn output_stable_under_selection_reordering() {
    let spec = adapter::normalize(&demo_doc()).unwrap();

    let forward = full_selection(&spec);
    let mut reversed_input = selection::select_all(&spec, &[]);
    for apis in reversed_input.values_mut() {
        apis.reverse();
    }
    let backward = selection::merge_selection(SelectedApis::new(), reversed_input);

    let a = generate(&spec, &forward, &TsGeneratorConfig::default());
    let b = generate(&spec, &backward, &TsGeneratorConfig::default());

    for (fa, fb) in a.iter().zip(&b) {
        assert_eq!(fa.content, fb.content, "{} differs", fa.path);
    }
}

#[test]
fn incremental_regeneration_is_noop() {
    let spec = adapter::normalize(&demo_doc()).unwrap();
    let sel = full_selection(&spec);

    let first = generate(&spec, &sel, &TsGeneratorConfig::default());

    let config = TsGeneratorConfig {
        previous_types: Some(file(&first, "types.ts").to_string()),
        previous_apis: Some(file(&first, "apis.ts").to_string()),
        ..TsGeneratorConfig::default()
    };
    let second = generate(&spec, &sel, &config);

    assert_eq!(file(&first, "types.ts"), file(&second, "types.ts"));
    assert_eq!(file(&first, "apis.ts"), file(&second, "apis.ts"));
}

#[test]
fn regeneration_after_recovery_is_stable() {
    let spec = adapter::normalize(&demo_doc()).unwrap();
    let sel = full_selection(&spec);
    let first = generate(&spec, &sel, &TsGeneratorConfig::default());

    // a later pass starts from the artifacts alone
    let recovered = recover_selection(file(&first, "apis.ts"));
    assert!(!recovered.is_empty());
    let merged = selection::merge_selection(recovered, selection::select_all(&spec, &[]));

    let config = TsGeneratorConfig {
        previous_types: Some(file(&first, "types.ts").to_string()),
        previous_apis: Some(file(&first, "apis.ts").to_string()),
        ..TsGeneratorConfig::default()
    };
    let second = generate(&spec, &merged, &config);

    assert_eq!(file(&first, "types.ts"), file(&second, "types.ts"));
    assert_eq!(file(&first, "apis.ts"), file(&second, "apis.ts"));
}

#[test]
fn merge_preserves_hand_authored_additions() {
    let spec = adapter::normalize(&demo_doc()).unwrap();
    let sel = full_selection(&spec);
    let first = generate(&spec, &sel, &TsGeneratorConfig::default());

    let mut edited_types = file(&first, "types.ts").to_string();
    edited_types.push_str("export interface HandRolled {\n  note?: string;\n}\n");

    let config = TsGeneratorConfig {
        previous_types: Some(edited_types),
        previous_apis: Some(file(&first, "apis.ts").to_string()),
        ..TsGeneratorConfig::default()
    };
    let second = generate(&spec, &sel, &config);

    let types = file(&second, "types.ts");
    assert!(types.contains("export interface HandRolled {\n  note?: string;\n}"));
    // nothing was replaced, so no block carries the regeneration marker
    assert!(!types.contains("// @regenerated"));
}

#[test]
fn duplicate_operation_ids_get_distinct_names() {
    let doc = json!({
        "swagger": "2.0",
        "info": {"title": "Dup"},
        "paths": {
            "/a/save": {"post": {"tags": ["t"], "operationId": "save",
                "responses": {"200": {"description": "ok"}}}},
            "/b/save": {"post": {"tags": ["t"], "operationId": "save",
                "responses": {"200": {"description": "ok"}}}}
        },
        "definitions": {}
    });
    let spec = adapter::normalize(&doc).unwrap();
    let sel = full_selection(&spec);
    let files = generate(&spec, &sel, &TsGeneratorConfig::default());

    let a = naming::method_name("save", "/a/save", "post");
    let b = naming::method_name("save", "/b/save", "post");
    assert_ne!(a, b);
    let apis = file(&files, "apis.ts");
    assert!(apis.contains(&a));
    assert!(apis.contains(&b));
}

#[test]
fn empty_selection_fails_before_writing() {
    let spec = adapter::normalize(&demo_doc()).unwrap();
    let err = TsClientGenerator::default()
        .generate(&spec, &SelectedApis::new(), &TsGeneratorConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        scg_typescript::GenerateError::NothingSelected
    ));
}

#[test]
fn void_return_for_schemaless_success_response() {
    let doc = json!({
        "swagger": "2.0",
        "info": {"title": "Voidy"},
        "paths": {
            "/fire": {"post": {"tags": ["t"], "operationId": "fire",
                "responses": {"200": {"description": "accepted"}}}}
        },
        "definitions": {}
    });
    let spec = adapter::normalize(&doc).unwrap();
    let sel = full_selection(&spec);
    let files = generate(&spec, &sel, &TsGeneratorConfig::default());

    assert!(file(&files, "types.ts").contains("): Promise<void>;"));
    assert!(file(&files, "apis.ts").contains("): Promise<void> {"));
}

#[test]
fn mixed_url_and_body_parameters_spread_into_payload() {
    let doc = json!({
        "swagger": "2.0",
        "info": {"title": "Mixed"},
        "paths": {
            "/orders/{orderId}/lines": {"put": {
                "tags": ["order"],
                "operationId": "replaceLines",
                "parameters": [
                    {"name": "orderId", "in": "path", "required": true, "type": "integer"},
                    {"name": "dryRun", "in": "query", "type": "boolean"},
                    {"name": "body", "in": "body", "required": true,
                     "schema": {"$ref": "#/definitions/LineSet"}}
                ],
                "responses": {"200": {"description": "ok",
                    "schema": {"$ref": "#/definitions/LineSet"}}}
            }}
        },
        "definitions": {"LineSet": {"type": "object",
            "properties": {"lines": {"type": "array", "items": {"type": "string"}}}}}
    });
    let spec = adapter::normalize(&doc).unwrap();
    let sel = full_selection(&spec);
    let files = generate(&spec, &sel, &TsGeneratorConfig::default());
    let apis = file(&files, "apis.ts");

    // path first, query second, body third, config last
    assert!(apis.contains(
        "(orderId: number, dryRun?: boolean, body: Types.LineSet, axiosConfig?: AxiosRequestConfig)"
    ));
    assert!(apis.contains("    const payload: Types.BaseRequestDTO = { orderId, dryRun, ...body };"));
}
