//! Re-derives the previously generated selection from an existing client
//! module, so a new pass can merge with it instead of clobbering it.

use scg_core::selection::{SelectedApi, SelectedApis};

use crate::merge::{BlockKind, Segment, parse_blocks};
use crate::naming;

/// Scan a previously generated apis module and rebuild the selection it was
/// generated from: one bucket per controller constant, one entry per method,
/// with operationIds recovered through the path-hash round trip. Content the
/// scanner cannot make sense of yields an empty selection, which degrades to
/// full regeneration.
pub fn recover_selection(apis_content: &str) -> SelectedApis {
    let Some(segments) = parse_blocks(apis_content) else {
        log::warn!("existing apis module not recognized; treating it as empty");
        return SelectedApis::new();
    };

    let mut out = SelectedApis::new();
    for seg in segments {
        let Segment::Block {
            kind: BlockKind::Const,
            name,
            lines,
        } = seg
        else {
            continue;
        };
        if !name.ends_with("Controller") {
            continue;
        }
        let apis = recover_methods(&lines);
        if !apis.is_empty() {
            out.insert(name, apis);
        }
    }
    out
}

fn recover_methods(lines: &[String]) -> Vec<SelectedApi> {
    let mut apis = Vec::new();
    let mut method_name: Option<String> = None;
    let mut path: Option<String> = None;

    for line in lines {
        let t = line.trim();

        if let Some(rest) = t.strip_prefix("async ") {
            if let Some(idx) = rest.find('(') {
                method_name = Some(rest[..idx].trim().to_string());
                path = None;
            }
        } else if let Some(rest) = t.strip_prefix("const path = `${basePath}") {
            if let Some(p) = rest.strip_suffix("`;") {
                path = Some(p.to_string());
            }
        } else if t.contains("$http.run") {
            let (Some(name), Some(p)) = (method_name.take(), path.take()) else {
                continue;
            };
            let Some(verb) = quoted_second_arg(t) else {
                continue;
            };
            let operation_id = naming::parse_method_name(&name, &p);
            apis.push(SelectedApi {
                operation_id: operation_id.clone(),
                path: p,
                method: verb,
                summary: operation_id,
            });
        }
    }

    apis
}

/// The quoted HTTP method in `$http.run<...>(path, 'get', ...)`.
fn quoted_second_arg(line: &str) -> Option<String> {
    let idx = line.find("(path, '")?;
    let rest = &line[idx + "(path, '".len()..];
    let end = rest.find('\'')?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::path_hash;

    #[test]
    fn test_recover_round_trip() {
        let hash = path_hash("/api/users/{id}");
        let content = format!(
            "/* eslint-disable */\n\nconst basePath = '';\n\nexport const userController: Types.UserController = {{\n  async getUser_{hash}(id: number, axiosConfig?: AxiosRequestConfig): Promise<Types.UserDTO> {{\n    const path = `${{basePath}}/api/users/{{id}}`;\n    const payload: Types.BaseRequestDTO = {{ id }};\n    const ret = await $http.run<Types.BaseRequestDTO, Types.UserDTO>(path, 'get', payload, axiosConfig);\n    return ret;\n  }},\n}};\n"
        );

        let recovered = recover_selection(&content);
        assert_eq!(recovered.len(), 1);
        let apis = &recovered["userController"];
        assert_eq!(apis.len(), 1);
        assert_eq!(apis[0].operation_id, "getUser");
        assert_eq!(apis[0].path, "/api/users/{id}");
        assert_eq!(apis[0].method, "get");
    }

    #[test]
    fn test_recover_ignores_non_controller_blocks() {
        let content = "export const helpers = {\n  async x(): Promise<void> {\n  },\n};\n";
        assert!(recover_selection(content).is_empty());
    }

    #[test]
    fn test_recover_empty_on_unrecognized_text() {
        assert!(recover_selection("not a generated file").is_empty());
    }
}
