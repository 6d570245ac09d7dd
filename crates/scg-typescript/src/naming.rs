//! Stable method-name derivation.
//!
//! A generated method name is `{base}_{hash}` where `base` comes from the
//! operationId (verb marker stripped) or is synthesized from the route, and
//! `hash` is a 6-hex-digit digest of the raw path. The hash is a pure
//! function of the path, so a previously generated name can be mapped back
//! to its operationId by recomputing the expected suffix.

use scg_core::selection::strip_verb_suffix;

/// 6-hex-digit digest of a path string: a rolling `h*31 + c` over UTF-16
/// code units, wrapped to a signed 32-bit value, absolute value in lowercase
/// hex, truncated and left-padded to 6 digits.
pub fn path_hash(path: &str) -> String {
    let mut hash: i32 = 0;
    for unit in path.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    let hex = format!("{:x}", hash.unsigned_abs());
    let short: String = hex.chars().take(6).collect();
    format!("{short:0>6}")
}

/// Derive the emitted method name for an operation.
pub fn method_name(operation_id: &str, path: &str, method: &str) -> String {
    let base = if operation_id.is_empty() {
        synthesize_base(path, method)
    } else {
        strip_verb_suffix(operation_id).to_string()
    };
    format!("{base}_{}", path_hash(path))
}

fn synthesize_base(path: &str, method: &str) -> String {
    let last = path
        .split('/')
        .filter(|s| !s.is_empty())
        .next_back()
        .unwrap_or("unknown");
    let method = method.to_ascii_lowercase();
    let mut chars = last.chars();
    match chars.next() {
        Some(first) => format!("{method}{}{}", first.to_uppercase(), chars.as_str()),
        None => format!("{method}Unknown"),
    }
}

/// Recover the operationId base from a generated method name by stripping
/// the hash suffix expected for this path. Names that do not carry the
/// expected suffix fall back to verb-marker stripping.
pub fn parse_method_name(method_name: &str, path: &str) -> String {
    let suffix = format!("_{}", path_hash(path));
    match method_name.strip_suffix(&suffix) {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => strip_verb_suffix(method_name).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_six_lowercase_hex_digits() {
        for path in ["/users", "/users/{id}", "", "/курс/列表"] {
            let h = path_hash(path);
            assert_eq!(h.len(), 6, "{path}: {h}");
            assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(path_hash("/users"), path_hash("/users"));
        assert_ne!(path_hash("/users"), path_hash("/user"));
    }

    #[test]
    fn test_method_name_strips_verb_marker() {
        let name = method_name("listUsersUsingGET_1", "/users", "get");
        assert!(name.starts_with("listUsers_"));
        assert_eq!(name.len(), "listUsers_".len() + 6);
    }

    #[test]
    fn test_method_name_synthesized_from_route() {
        let name = method_name("", "/api/orders", "POST");
        assert!(name.starts_with("postOrders_"));
    }

    #[test]
    fn test_round_trip() {
        for (id, path) in [
            ("listUsersUsingGET", "/users"),
            ("save", "/api/orders/{orderId}"),
            ("查询课表", "/api/timetable"),
        ] {
            let stripped = strip_verb_suffix(id).to_string();
            let name = method_name(id, path, "get");
            assert_eq!(parse_method_name(&name, path), stripped);
        }
    }

    #[test]
    fn test_same_operation_id_different_paths_distinct() {
        let a = method_name("save", "/api/a", "post");
        let b = method_name("save", "/api/b", "post");
        assert_ne!(a, b);
    }
}
