//! The set of operations chosen for a generation pass, and the merge of a
//! fresh choice with what an earlier pass already generated.
//!
//! Selection records carry identity only (controller, path, method,
//! operationId, summary); everything needed for rendering is re-read from
//! the normalized spec.

use std::cmp::Ordering;
use std::collections::HashSet;

use heck::ToPascalCase;
use indexmap::IndexMap;

use crate::adapter::{NormalizedSpec, Paths};
use crate::graph::api_key;

pub const CONTROLLER_SUFFIX: &str = "Controller";

const VERBS: [&str; 7] = ["POST", "GET", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// One chosen operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedApi {
    pub operation_id: String,
    pub path: String,
    pub method: String,
    pub summary: String,
}

/// Chosen operations grouped by controller.
pub type SelectedApis = IndexMap<String, Vec<SelectedApi>>;

/// Strip a code-generator verb marker (`UsingGET`, `UsingPOST_2`, …,
/// case-insensitive, optional numeric disambiguator) from an operationId.
/// Returns the id unchanged when stripping would leave nothing.
pub fn strip_verb_suffix(id: &str) -> &str {
    let mut end = id.len();
    if let Some(pos) = id.rfind('_') {
        let tail = &id[pos + 1..];
        if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            end = pos;
        }
    }

    let body = &id[..end];
    let lower = body.to_ascii_lowercase();
    for verb in VERBS {
        let marker = format!("using{}", verb.to_ascii_lowercase());
        if lower.ends_with(&marker) {
            let stripped = &body[..body.len() - marker.len()];
            return if stripped.is_empty() { id } else { stripped };
        }
    }

    id
}

/// Canonical controller key: PascalCase base with a single `Controller`
/// suffix, so `assistant-agenda-controller` and `AssistantAgendaController`
/// merge into one bucket.
pub fn normalize_controller_name(name: &str) -> String {
    let base = if name.to_ascii_lowercase().ends_with("controller") {
        &name[..name.len() - "controller".len()]
    } else {
        name
    };
    format!("{}{CONTROLLER_SUFFIX}", base.to_pascal_case())
}

/// Deterministic string ordering that groups case-insensitively before
/// falling back to an exact comparison. Stands in for ICU collation: it is
/// stable across runs and keeps non-ASCII names in a single, predictable
/// order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<String>();
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

/// Sort key for an operation: operationId, else summary, else the final
/// path segment.
pub fn sort_key(api: &SelectedApi) -> &str {
    if !api.operation_id.is_empty() {
        &api.operation_id
    } else if !api.summary.is_empty() {
        &api.summary
    } else {
        api.path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }
}

/// Merge previously generated operations with a fresh selection.
///
/// Buckets are keyed per controller so identical routes under different
/// controllers stay apart; within a bucket a new choice replaces an existing
/// entry with the same path and method. Output ordering is fully sorted so
/// regeneration is stable under input reordering.
pub fn merge_selection(existing: SelectedApis, selected: SelectedApis) -> SelectedApis {
    let mut merged: SelectedApis = IndexMap::new();

    for (controller, apis) in existing {
        merged
            .entry(normalize_controller_name(&controller))
            .or_default()
            .extend(apis);
    }

    for (controller, new_apis) in selected {
        let bucket = merged
            .entry(normalize_controller_name(&controller))
            .or_default();

        for mut api in new_apis {
            api.operation_id = strip_verb_suffix(&api.operation_id).to_string();
            let existing_idx = bucket
                .iter()
                .position(|e| e.path == api.path && e.method.eq_ignore_ascii_case(&api.method));
            match existing_idx {
                Some(i) => bucket[i] = api,
                None => bucket.push(api),
            }
        }
    }

    sort_selection(merged)
}

/// Sort controllers and their operations into the canonical order.
pub fn sort_selection(selection: SelectedApis) -> SelectedApis {
    let mut entries: Vec<(String, Vec<SelectedApi>)> = selection.into_iter().collect();
    entries.sort_by(|a, b| locale_cmp(&a.0, &b.0));

    entries
        .into_iter()
        .map(|(controller, mut apis)| {
            apis.sort_by(|a, b| locale_cmp(sort_key(a), sort_key(b)));
            (controller, apis)
        })
        .collect()
}

/// Build a selection covering every operation in the spec, optionally
/// restricted to the given tags. Operations are grouped under their first
/// tag.
pub fn select_all(spec: &NormalizedSpec, tag_filter: &[String]) -> SelectedApis {
    let mut selection: SelectedApis = IndexMap::new();

    for (path, methods) in &spec.paths {
        for (method, op) in methods {
            if !tag_filter.is_empty() && !op.tags.iter().any(|t| tag_filter.contains(t)) {
                continue;
            }
            let controller = op.tags.first().cloned().unwrap_or_default();
            selection.entry(controller).or_default().push(SelectedApi {
                operation_id: op.operation_id.clone().unwrap_or_default(),
                path: path.clone(),
                method: method.clone(),
                summary: op
                    .summary
                    .clone()
                    .or_else(|| op.description.clone())
                    .unwrap_or_default(),
            });
        }
    }

    selection
}

/// `path::method` keys of everything in the selection.
pub fn picked_keys(selection: &SelectedApis) -> HashSet<String> {
    selection
        .values()
        .flatten()
        .map(|api| api_key(&api.path, &api.method))
        .collect()
}

/// Restrict paths to the picked operations.
pub fn filter_paths(paths: &Paths, picked: &HashSet<String>) -> Paths {
    let mut out = Paths::new();
    for (path, methods) in paths {
        let kept: IndexMap<_, _> = methods
            .iter()
            .filter(|(m, _)| picked.contains(&api_key(path, m)))
            .map(|(m, op)| (m.clone(), op.clone()))
            .collect();
        if !kept.is_empty() {
            out.insert(path.clone(), kept);
        }
    }
    out
}
