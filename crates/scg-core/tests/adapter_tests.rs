use serde_json::json;

use scg_core::adapter::{self, ParamLocation, SpecVersion};

fn openapi3_doc() -> serde_json::Value {
    json!({
        "openapi": "3.0.1",
        "info": {"title": "Demo", "version": "1.0"},
        "servers": [{"url": "https://host.example.com/api/v1/"}],
        "tags": [{"name": "widget", "description": "Widget ops"}],
        "paths": {
            "/widgets": {
                "post": {
                    "tags": ["widget"],
                    "operationId": "createWidget",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {"$ref": "#/components/schemas/Widget"}
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/Widget"}
                                }
                            }
                        }
                    }
                }
            },
            "/ping": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "no body",
                            "content": {"application/json": {"schema": {}}}
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Widget": {
                    "type": "object",
                    "properties": {
                        "label": {
                            "anyOf": [{"type": "string"}, {"type": "null"}]
                        },
                        "parts": {
                            "type": "array",
                            "items": {"$ref": "#/components/schemas/Part"}
                        }
                    }
                },
                "Part": {"type": "object"}
            }
        }
    })
}

#[test]
fn normalize_is_idempotent() {
    let spec = adapter::normalize(&openapi3_doc()).unwrap();
    let round_tripped = serde_json::to_value(&spec).unwrap();
    let again = adapter::normalize(&round_tripped).unwrap();
    assert_eq!(spec, again);
}

#[test]
fn request_body_collapses_to_body_parameter() {
    let spec = adapter::normalize(&openapi3_doc()).unwrap();
    let op = &spec.paths["/widgets"]["post"];

    let bodies: Vec<_> = op
        .parameters
        .iter()
        .filter(|p| p.location == ParamLocation::Body)
        .collect();
    assert_eq!(bodies.len(), 1);

    let body = bodies[0];
    assert_eq!(body.name, "body");
    assert!(body.required);
    assert_eq!(
        body.schema.as_ref().unwrap().ref_path.as_deref(),
        Some("#/definitions/Widget")
    );
}

#[test]
fn response_content_flattens_and_vacant_schema_is_dropped() {
    let spec = adapter::normalize(&openapi3_doc()).unwrap();

    let created = spec.paths["/widgets"]["post"].success_response().unwrap();
    assert_eq!(
        created.schema.as_ref().unwrap().ref_name(),
        Some("Widget")
    );

    let ping = spec.paths["/ping"]["get"].success_response().unwrap();
    assert!(ping.schema.is_none(), "empty schema means no response body");
}

#[test]
fn base_path_comes_from_first_server_url() {
    let spec = adapter::normalize(&openapi3_doc()).unwrap();
    assert_eq!(spec.base_path, "/api/v1");
}

#[test]
fn definitions_are_rewritten_recursively() {
    let spec = adapter::normalize(&openapi3_doc()).unwrap();
    let widget = &spec.definitions["Widget"];

    // nullable anyOf collapsed to its single non-null branch
    let label = &widget.properties["label"];
    assert_eq!(label.type_str(), Some("string"));
    assert!(label.any_of.is_empty());

    // nested array item ref rewritten to the canonical prefix
    let parts = &widget.properties["parts"];
    let items = parts.items.as_ref().unwrap();
    assert_eq!(items.ref_path.as_deref(), Some("#/definitions/Part"));
}

#[test]
fn tags_get_controller_suffix_consistently() {
    let spec = adapter::normalize(&openapi3_doc()).unwrap();

    let names: Vec<&str> = spec.tags.iter().map(|t| t.name.as_str()).collect();
    assert!(names.contains(&"widgetController"));
    assert!(names.contains(&"defaultController"));

    // declared description survives the rename
    let widget_tag = spec.tags.iter().find(|t| t.name == "widgetController").unwrap();
    assert_eq!(widget_tag.description.as_deref(), Some("Widget ops"));

    // operation tag references match the tag list entries
    assert_eq!(spec.paths["/widgets"]["post"].tags, vec!["widgetController"]);
    assert_eq!(spec.paths["/ping"]["get"].tags, vec!["defaultController"]);
}

#[test]
fn swagger2_passes_through_with_tag_synthesis() {
    let doc = json!({
        "swagger": "2.0",
        "info": {"title": "Legacy"},
        "basePath": "/svc/",
        "paths": {
            "/items": {
                "get": {
                    "operationId": "listItems",
                    "responses": {
                        "200": {
                            "description": "ok",
                            "schema": {"$ref": "#/definitions/Result«List«Item»»"}
                        }
                    }
                }
            }
        },
        "definitions": {
            "Item": {"type": "object"},
            "Result«List«Item»»": {"type": "object"}
        }
    });

    let spec = adapter::normalize(&doc).unwrap();
    assert_eq!(spec.version, SpecVersion::V2);
    assert_eq!(spec.base_path, "/svc");

    // definitions and responses are untouched for 2.0
    let op = &spec.paths["/items"]["get"];
    assert_eq!(
        op.success_response().unwrap().schema.as_ref().unwrap().ref_name(),
        Some("Result«List«Item»»")
    );

    // untagged operations get the synthetic default tag, unsuffixed
    assert_eq!(op.tags, vec!["default"]);
    assert!(spec.tags.iter().any(|t| t.name == "default"));
}
