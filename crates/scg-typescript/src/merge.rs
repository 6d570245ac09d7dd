//! Reconciles freshly rendered output with a previously generated file so
//! unrelated, unchanged content is preserved.
//!
//! Previously generated text is re-read with a small line-oriented state
//! machine, not pattern matching: Scanning until a named block-start line,
//! then accumulating until the block's column-zero closing line, keyed by
//! name. Any structural surprise (a block opening inside a block) means the
//! file is not one of ours and the caller falls back to full regeneration.

use std::collections::HashSet;

use indexmap::IndexMap;

/// Marker line placed above a block that was replaced by a regeneration.
pub const REGENERATED_MARKER: &str = "// @regenerated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Interface,
    Const,
    TypeAlias,
}

/// One stretch of a generated file: either prose (imports, headers, blank
/// lines) carried verbatim, or a named declaration block.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Prose(Vec<String>),
    Block {
        kind: BlockKind,
        name: String,
        lines: Vec<String>,
    },
}

/// Split file text into prose and named blocks. Returns `None` when the
/// text does not look like something this generator wrote. Marker lines
/// from earlier merges are dropped so comparisons see clean block text.
/// End of input flushes an open block.
pub fn parse_blocks(text: &str) -> Option<Vec<Segment>> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut prose: Vec<String> = Vec::new();
    // A column-zero `/** ... */` line is held back: it belongs to the block
    // it precedes, so doc edits travel with the declaration.
    let mut pending_doc: Option<String> = None;
    let mut open: Option<(BlockKind, String, Vec<String>)> = None;

    for line in text.split('\n') {
        if let Some((_, _, lines)) = open.as_mut() {
            if block_start(line).is_some() {
                return None;
            }
            lines.push(line.to_string());
            if line == "}" || line == "};" {
                let (kind, name, lines) = open.take().expect("block is open");
                segments.push(Segment::Block { kind, name, lines });
            }
            continue;
        }

        if line.trim() == REGENERATED_MARKER {
            continue;
        }

        match block_start(line) {
            Some((kind, name, complete)) => {
                if !prose.is_empty() {
                    segments.push(Segment::Prose(std::mem::take(&mut prose)));
                }
                let mut lines = Vec::new();
                if let Some(doc) = pending_doc.take() {
                    lines.push(doc);
                }
                lines.push(line.to_string());
                if complete {
                    segments.push(Segment::Block { kind, name, lines });
                } else {
                    open = Some((kind, name, lines));
                }
            }
            None => {
                if let Some(doc) = pending_doc.take() {
                    prose.push(doc);
                }
                if line.starts_with("/**") && line.trim_end().ends_with("*/") {
                    pending_doc = Some(line.to_string());
                } else {
                    prose.push(line.to_string());
                }
            }
        }
    }

    if let Some((kind, name, lines)) = open {
        segments.push(Segment::Block { kind, name, lines });
    }
    if let Some(doc) = pending_doc {
        prose.push(doc);
    }
    if !prose.is_empty() {
        segments.push(Segment::Prose(prose));
    }

    Some(segments)
}

/// Recognize a block-start line and extract its kind and name. The third
/// field says whether the line is a complete single-line block.
fn block_start(line: &str) -> Option<(BlockKind, String, bool)> {
    let kinds = [
        ("export interface ", BlockKind::Interface),
        ("export const ", BlockKind::Const),
        ("export type ", BlockKind::TypeAlias),
    ];

    for (prefix, kind) in kinds {
        if let Some(rest) = line.strip_prefix(prefix) {
            let name = ident_prefix(rest);
            if name.is_empty() {
                return None;
            }
            let trimmed = line.trim_end();
            let complete = trimmed.ends_with(';') || trimmed.ends_with('}');
            return Some((kind, name, complete));
        }
    }
    None
}

fn ident_prefix(s: &str) -> String {
    s.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect()
}

/// Merge freshly rendered text with the previous generated file.
///
/// The fresh file's skeleton and block order drive the output. Per block:
/// new blocks are emitted as-is, unchanged blocks keep the previous text,
/// changed blocks are replaced and tagged with a marker comment. Blocks the
/// previous file has but the fresh render does not (earlier generations or
/// hand-authored additions) are appended untouched. An unparsable previous
/// file falls back to the fresh render.
pub fn merge(previous: &str, fresh: &str) -> String {
    let Some(prev_segments) = parse_blocks(previous) else {
        log::warn!("previous artifact not recognized by the block scanner; regenerating in full");
        return fresh.to_string();
    };
    let Some(fresh_segments) = parse_blocks(fresh) else {
        return fresh.to_string();
    };

    let mut prev_blocks: IndexMap<&str, &Vec<String>> = IndexMap::new();
    for seg in &prev_segments {
        if let Segment::Block { name, lines, .. } = seg {
            prev_blocks.insert(name.as_str(), lines);
        }
    }

    let mut fresh_names: HashSet<&str> = HashSet::new();
    let mut out: Vec<String> = Vec::new();

    for seg in &fresh_segments {
        match seg {
            Segment::Prose(lines) => out.extend(lines.iter().cloned()),
            Segment::Block { name, lines, .. } => {
                fresh_names.insert(name.as_str());
                match prev_blocks.get(name.as_str()) {
                    Some(old) if *old != lines => {
                        out.push(REGENERATED_MARKER.to_string());
                        out.extend(lines.iter().cloned());
                    }
                    _ => out.extend(lines.iter().cloned()),
                }
            }
        }
    }

    let leftovers: Vec<&Vec<String>> = prev_segments
        .iter()
        .filter_map(|seg| match seg {
            Segment::Block { name, lines, .. } if !fresh_names.contains(name.as_str()) => {
                Some(lines)
            }
            _ => None,
        })
        .collect();

    if !leftovers.is_empty() {
        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }
        for lines in leftovers {
            out.push(String::new());
            out.extend(lines.iter().cloned());
        }
        out.push(String::new());
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "/* eslint-disable */\n\nexport type PlainObject = { [key: string]: any };\n\nexport interface Foo {\n  id?: number;\n}\n\nexport const fooController: Types.Foo = {\n  async list_000000(): Promise<void> {\n    return;\n  },\n};\n";

    #[test]
    fn test_parse_recognizes_blocks() {
        let segments = parse_blocks(FILE).unwrap();
        let names: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Block { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["PlainObject", "Foo", "fooController"]);
    }

    #[test]
    fn test_parse_rejects_nested_start() {
        let text = "export interface A {\nexport interface B {\n}\n}\n";
        assert!(parse_blocks(text).is_none());
    }

    #[test]
    fn test_parse_flushes_open_block_at_eof() {
        let text = "export interface A {\n  id?: number;";
        let segments = parse_blocks(text).unwrap();
        assert!(matches!(
            segments.last(),
            Some(Segment::Block { name, .. }) if name == "A"
        ));
    }

    #[test]
    fn test_merge_noop_is_byte_identical() {
        assert_eq!(merge(FILE, FILE), FILE);
    }

    #[test]
    fn test_merge_replaces_changed_block_with_marker() {
        let fresh = FILE.replace("id?: number", "id?: string");
        let merged = merge(FILE, &fresh);
        assert!(merged.contains("id?: string"));
        assert!(!merged.contains("id?: number"));
        let marker_at = merged.find(REGENERATED_MARKER).unwrap();
        assert!(merged[marker_at..].starts_with("// @regenerated\nexport interface Foo {"));
    }

    #[test]
    fn test_merge_carries_unselected_blocks() {
        let fresh = "/* eslint-disable */\n\nexport interface Bar {\n  x?: string;\n}\n";
        let merged = merge(FILE, fresh);
        assert!(merged.contains("export interface Bar {"));
        // previously generated content not part of this pass survives
        assert!(merged.contains("export interface Foo {"));
        assert!(merged.contains("export const fooController"));
        assert!(merged.ends_with('\n'));
    }

    #[test]
    fn test_merge_falls_back_on_foreign_file() {
        let foreign = "export interface A {\nexport interface B {\n}\n";
        let fresh = "export interface C {\n}\n";
        assert_eq!(merge(foreign, fresh), fresh);
    }

    #[test]
    fn test_stale_markers_are_dropped() {
        let with_marker = FILE.replace(
            "export interface Foo {",
            "// @regenerated\nexport interface Foo {",
        );
        let merged = merge(&with_marker, FILE);
        assert_eq!(merged, FILE);
    }
}
