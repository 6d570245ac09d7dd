//! Parsing and resolution of pseudo-generic definition names.
//!
//! Some backend code generators publish definition names carrying a nested
//! bracketed-generic notation, e.g. `Result«PageResult«WidgetDTO»»`. This is
//! not a type system; it is a string DSL with a single matched delimiter
//! pair, parsed here with depth tracking and mapped onto TypeScript type
//! expressions. A fixed catalog of response-envelope wrapper names receives
//! bespoke unwrapping; everything outside the catalog resolves generically.

use std::collections::BTreeSet;

use crate::adapter::Schema;

/// The delimiter pair enclosing generic parameters. Source documents decide
/// the glyphs; `«»` is what the Springfox family emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            open: '\u{ab}',
            close: '\u{bb}',
        }
    }
}

impl Delimiters {
    /// ASCII angle brackets, for documents that use `Result<Foo>` names.
    pub const ANGLE: Delimiters = Delimiters {
        open: '<',
        close: '>',
    };

    pub fn is_generic(&self, name: &str) -> bool {
        name.contains(self.open)
    }

    /// Substring before the first opening delimiter; the whole name when no
    /// delimiter is present.
    pub fn base_key<'a>(&self, name: &'a str) -> &'a str {
        match name.find(self.open) {
            Some(idx) => &name[..idx],
            None => name,
        }
    }

    /// The expression between the outermost delimiter pair, requiring the
    /// closing delimiter to sit at the end of the name.
    pub fn param_expr<'a>(&self, name: &'a str) -> Option<&'a str> {
        let start = name.find(self.open)?;
        if !name.ends_with(self.close) {
            return None;
        }
        let inner = &name[start + self.open.len_utf8()..name.len() - self.close.len_utf8()];
        (!inner.is_empty()).then_some(inner)
    }

    /// Split a parameter expression on commas that are not nested inside an
    /// inner delimiter pair, so `string,List«Foo»` yields two parts.
    pub fn split_top_level<'a>(&self, expr: &'a str) -> Vec<&'a str> {
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;

        for (idx, ch) in expr.char_indices() {
            if ch == self.open {
                depth += 1;
            } else if ch == self.close {
                depth = depth.saturating_sub(1);
            } else if ch == ',' && depth == 0 {
                parts.push(expr[start..idx].trim());
                start = idx + ch.len_utf8();
            }
        }

        let tail = expr[start..].trim();
        if !tail.is_empty() {
            parts.push(tail);
        }
        parts
    }

    /// Every type name mentioned anywhere in a parameter expression, at any
    /// nesting depth. List-like wrapper names are unwrapped rather than
    /// reported; primitives are included (callers filter).
    pub fn type_tokens(&self, expr: &str, catalog: &WrapperCatalog) -> Vec<String> {
        let mut out = Vec::new();
        self.type_tokens_into(expr, catalog, &mut out);
        out
    }

    fn type_tokens_into(&self, expr: &str, catalog: &WrapperCatalog, out: &mut Vec<String>) {
        for part in self.split_top_level(expr) {
            if self.is_generic(part) {
                let base = self.base_key(part);
                if catalog.rule(base) != Some(WrapperRule::ListLike) && !base.is_empty() {
                    out.push(base.to_string());
                }
                if let Some(inner) = self.param_expr(part) {
                    self.type_tokens_into(inner, catalog, out);
                }
            } else if !part.is_empty() {
                out.push(part.to_string());
            }
        }
    }
}

/// How a cataloged wrapper name unwraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperRule {
    /// Plain envelope: resolves recursively, no reshaping.
    Envelope,
    /// Collapses to an array of its parameter (`List«X»` → `X[]`).
    ListLike,
    /// Paging container: its parameter is rendered as an array
    /// (`PageResult«X»` → `PageResult<X[]>`).
    Paging,
}

enum WrapperPattern {
    Exact(&'static str),
    Prefix(&'static str),
    PrefixSuffix(&'static str, &'static str),
}

impl WrapperPattern {
    fn matches(&self, base: &str) -> bool {
        match self {
            WrapperPattern::Exact(n) => base == *n,
            WrapperPattern::Prefix(p) => base.starts_with(p),
            WrapperPattern::PrefixSuffix(p, s) => {
                base.starts_with(p) && base.ends_with(s) && base.len() > p.len() + s.len()
            }
        }
    }
}

/// The closed catalog of conventionally named response envelopes. This is a
/// fixed table tuned against one ecosystem's generators, not something to
/// infer; names outside it render as plain generic references.
pub struct WrapperCatalog {
    rules: Vec<(WrapperPattern, WrapperRule)>,
}

impl Default for WrapperCatalog {
    fn default() -> Self {
        WrapperCatalog {
            rules: vec![
                (WrapperPattern::Exact("List"), WrapperRule::ListLike),
                (WrapperPattern::Exact("Result"), WrapperRule::Envelope),
                (WrapperPattern::Exact("ReplyEntity"), WrapperRule::Envelope),
                (WrapperPattern::Prefix("PageResult"), WrapperRule::Paging),
                (
                    WrapperPattern::Exact("BasePageRespDTO"),
                    WrapperRule::Paging,
                ),
                (
                    WrapperPattern::PrefixSuffix("Page", "RespDTO"),
                    WrapperRule::Paging,
                ),
            ],
        }
    }
}

impl WrapperCatalog {
    pub fn rule(&self, base_key: &str) -> Option<WrapperRule> {
        self.rules
            .iter()
            .find(|(p, _)| p.matches(base_key))
            .map(|(_, r)| *r)
    }
}

/// Map a bare swagger type token to its TypeScript primitive, when it is one.
pub fn map_primitive_token(token: &str) -> Option<&'static str> {
    match token {
        "integer" | "int" | "long" | "float" | "double" | "number" | "Integer" | "Long" => {
            Some("number")
        }
        "string" | "String" => Some("string"),
        "boolean" | "Boolean" => Some("boolean"),
        "Void" => Some("void"),
        "object" => Some("PlainObject"),
        "array" => Some("any[]"),
        _ => None,
    }
}

/// Built-in TypeScript types that never take a namespace prefix.
pub fn is_basic_ts_type(ty: &str) -> bool {
    matches!(ty, "number" | "string" | "boolean" | "void" | "any" | "any[]")
}

/// Resolves definition names and schemas to TypeScript type expressions.
///
/// Two render targets use different qualification rules: declarations inside
/// the types module reference siblings bare, while client code references
/// them through a namespace alias (`Types.`). The `namespace` field selects
/// the mode.
pub struct TypeResolver<'a> {
    pub delimiters: Delimiters,
    pub catalog: &'a WrapperCatalog,
    pub namespace: Option<&'a str>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        delimiters: Delimiters,
        catalog: &'a WrapperCatalog,
        namespace: Option<&'a str>,
    ) -> Self {
        TypeResolver {
            delimiters,
            catalog,
            namespace,
        }
    }

    /// Resolve a definition name (possibly pseudo-generic) to a TypeScript
    /// type expression.
    pub fn resolve(&self, name: &str) -> String {
        let name = name.trim();
        if !self.delimiters.is_generic(name) {
            return self.resolve_token(name);
        }

        let base = self.delimiters.base_key(name);
        let expr = self.delimiters.param_expr(name);

        let Some(expr) = expr else {
            // Unbalanced or empty parameter list: render the bare base and
            // let ensure_generic fill a placeholder in.
            return self.qualify(base);
        };

        match self.catalog.rule(base) {
            Some(WrapperRule::ListLike) => format!("{}[]", self.resolve_expr(expr)),
            Some(WrapperRule::Paging) => {
                let inner = self.resolve_expr(expr);
                let inner = if inner.ends_with("[]") {
                    inner
                } else {
                    format!("{inner}[]")
                };
                format!("{}<{}>", self.qualify(base), inner)
            }
            _ => format!("{}<{}>", self.qualify(base), self.resolve_expr(expr)),
        }
    }

    fn resolve_expr(&self, expr: &str) -> String {
        let parts = self.delimiters.split_top_level(expr);
        if parts.len() > 1 {
            let resolved: Vec<String> = parts.iter().map(|p| self.resolve(p)).collect();
            resolved.join(", ")
        } else {
            self.resolve(expr)
        }
    }

    fn resolve_token(&self, token: &str) -> String {
        match map_primitive_token(token) {
            Some(p) if is_basic_ts_type(p) => p.to_string(),
            Some(p) => self.qualify(p),
            None => self.qualify(token),
        }
    }

    fn qualify(&self, name: &str) -> String {
        match self.namespace {
            Some(ns) => format!("{ns}.{name}"),
            None => name.to_string(),
        }
    }

    /// Append `<void>` to a bare reference to a known generic wrapper, so an
    /// unparameterized envelope never renders as an invalid bare generic.
    pub fn ensure_generic(&self, expr: String, generic_keys: &BTreeSet<String>) -> String {
        if expr.contains('<') {
            return expr;
        }
        let bare = match self.namespace {
            Some(ns) => expr
                .strip_prefix(ns)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(expr.as_str()),
            None => expr.as_str(),
        };
        if generic_keys.contains(bare) {
            format!("{expr}<void>")
        } else {
            expr
        }
    }

    /// Type for a parameter declared with a bare `type`/`format` pair
    /// instead of a schema.
    pub fn primitive_param(&self, ty: Option<&str>, _format: Option<&str>) -> String {
        match ty {
            Some("integer" | "number" | "long") => "number".to_string(),
            Some("boolean") => "boolean".to_string(),
            Some("string") => "string".to_string(),
            Some("array") => "any[]".to_string(),
            Some("object") => self.qualify("PlainObject"),
            _ => "any".to_string(),
        }
    }

    /// Type expression for a schema: `$ref` resolution, arrays, enum literal
    /// unions, primitives. Anything unrecognized is `any`.
    pub fn schema_type(&self, schema: &Schema) -> String {
        if let Some(name) = schema.ref_name() {
            return self.resolve(name);
        }

        if schema.type_str() == Some("array") {
            return match &schema.items {
                Some(items) => format!("{}[]", self.schema_type(items)),
                None => "any[]".to_string(),
            };
        }

        if !schema.enum_values.is_empty() {
            let literals: Vec<String> = schema
                .enum_values
                .iter()
                .map(|v| match v.as_str() {
                    Some(s) => format!("\"{s}\""),
                    None => format!("\"{v}\""),
                })
                .collect();
            return literals.join(" | ");
        }

        match schema.type_str() {
            Some(t) => self.primitive_param(Some(t), schema.format.as_deref()),
            None => "any".to_string(),
        }
    }
}
