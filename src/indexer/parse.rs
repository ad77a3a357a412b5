//! Tag-line parsing.
//!
//! Two dialects come out of the tag tool: JSON objects, one per line, from
//! universal-ctags' `--output-format=json`, and the classic tab-separated
//! format. A line that does not yield a name, a file and a positive line number
//! is skipped; nothing here returns an error.

use crate::model::{DEFAULT_KIND, ParsedTag, Symbol};
use crate::util;
use serde::Deserialize;
use std::path::Path;

/// Single-letter kind codes emitted by ctags when `kind:` is not spelled out.
static KIND_LETTERS: &[(&str, &str)] = &[
    ("f", "function"),
    ("c", "class"),
    ("m", "method"),
    ("v", "variable"),
    ("s", "struct"),
    ("i", "interface"),
    ("e", "enum"),
    ("n", "namespace"),
    ("t", "type"),
    ("p", "property"),
    ("M", "module"),
    ("C", "constant"),
];

#[derive(Deserialize)]
struct JsonTag {
    #[serde(rename = "_type")]
    tag_type: Option<String>,
    name: Option<String>,
    path: Option<String>,
    line: Option<i64>,
    kind: Option<String>,
}

pub fn parse_line(line: &str, repo_root: &Path) -> ParsedTag {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.starts_with('!') {
        return ParsedTag::Skipped;
    }
    if line.starts_with('{') {
        return parse_json(line, repo_root);
    }
    parse_tabbed(line, repo_root)
}

fn parse_json(line: &str, repo_root: &Path) -> ParsedTag {
    let Ok(tag) = serde_json::from_str::<JsonTag>(line) else {
        return ParsedTag::Skipped;
    };
    if tag.tag_type.as_deref().is_some_and(|kind| kind != "tag") {
        return ParsedTag::Skipped;
    }
    let (Some(name), Some(path)) = (tag.name, tag.path) else {
        return ParsedTag::Skipped;
    };
    let Some(line_no) = tag.line.and_then(positive) else {
        return ParsedTag::Skipped;
    };
    let kind = tag
        .kind
        .map(|kind| resolve_kind(&kind))
        .unwrap_or_else(|| DEFAULT_KIND.to_string());
    build(name, &path, line_no, kind, repo_root)
}

fn parse_tabbed(line: &str, repo_root: &Path) -> ParsedTag {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        return ParsedTag::Skipped;
    }
    let (name, file, address) = (fields[0], fields[1], fields[2]);
    let extensions = &fields[3..];

    let line_no = address_line(address).or_else(|| extension_line(extensions));
    let Some(line_no) = line_no else {
        return ParsedTag::Skipped;
    };
    build(
        name.to_string(),
        file,
        line_no,
        extension_kind(extensions),
        repo_root,
    )
}

fn build(name: String, file: &str, line: u32, kind: String, repo_root: &Path) -> ParsedTag {
    let name = name.trim();
    let file = file.trim();
    if name.is_empty() || file.is_empty() {
        return ParsedTag::Skipped;
    }
    ParsedTag::Parsed(Symbol {
        name: name.to_string(),
        file: util::tool_path_to_rel(repo_root, file),
        line,
        kind,
    })
}

/// Line number from the address field: `12`, `12;"`, or an excmd whose
/// leading token is numeric. Search patterns yield nothing here.
fn address_line(address: &str) -> Option<u32> {
    let address = address.trim();
    let address = address.strip_suffix(";\"").unwrap_or(address);
    if address.starts_with('/') || address.starts_with('?') {
        return None;
    }
    let token = address.split(';').next()?.trim();
    token.parse::<i64>().ok().and_then(positive)
}

fn extension_line(extensions: &[&str]) -> Option<u32> {
    extensions.iter().find_map(|field| {
        field
            .strip_prefix("line:")
            .and_then(|value| value.trim().parse::<i64>().ok())
            .and_then(positive)
    })
}

fn extension_kind(extensions: &[&str]) -> String {
    for field in extensions {
        if let Some(kind) = field.strip_prefix("kind:") {
            let kind = kind.trim();
            if !kind.is_empty() {
                return resolve_kind(kind);
            }
        }
    }
    for field in extensions {
        let field = field.trim();
        if field.is_empty() || field.contains(':') {
            continue;
        }
        return resolve_kind(field);
    }
    DEFAULT_KIND.to_string()
}

fn resolve_kind(raw: &str) -> String {
    if raw.chars().count() == 1 {
        return KIND_LETTERS
            .iter()
            .find(|(letter, _)| *letter == raw)
            .map(|(_, kind)| kind.to_string())
            .unwrap_or_else(|| DEFAULT_KIND.to_string());
    }
    raw.to_string()
}

fn positive(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|line| *line > 0)
}
