//! Readers for the DOT documents produced by external dependency tools.
//!
//! Only the subset those tools emit is understood: node statements with an
//! optional attribute list, edge statements (possibly chained), and graph
//! level attributes, which are ignored.

use crate::error::{GraphError, Result};
use crate::types::DepGraph;
use once_cell::sync::Lazy;
use regex::Regex;

const DOT_KEYWORDS: [&str; 4] = ["node", "edge", "graph", "subgraph"];

static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^("(?:[^"\\]|\\.)*"|[A-Za-z0-9_./']+)\s*(?:\[(.*)\])?$"#)
        .expect("valid node regex")
});

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[\s,])label\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^\s,\]]+))"#)
        .expect("valid label regex")
});

enum Statement {
    Node { id: String, label: Option<String> },
    Edges(Vec<String>),
}

/// Parse a file dependency graph (`coqdep -dumpgraph` output).
///
/// Edges keep their DOT direction, dependency -> dependent. Every node name
/// is normalized to a `./`-prefixed `.v` path.
pub fn parse_file_graph(dot: &str) -> Result<DepGraph> {
    let mut graph = DepGraph::new();

    for statement in statements(dot)? {
        match statement {
            Statement::Node { id, .. } => {
                graph.add_node(&normalize_file_node(&id));
            }
            Statement::Edges(chain) => {
                for pair in chain.windows(2) {
                    graph.add_edge(&normalize_file_node(&pair[0]), &normalize_file_node(&pair[1]));
                }
            }
        }
    }

    log::debug!(
        "Parsed file graph: {} files, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Parse a per-file symbol graph (`dpd2dot` output).
///
/// Node ids are replaced by their labels. Edges that would close a cycle
/// are dropped with a warning instead of failing the whole graph.
pub fn parse_symbol_graph(dot: &str) -> Result<DepGraph> {
    let parsed = statements(dot)?;
    let mut labels = std::collections::HashMap::new();
    let mut graph = DepGraph::new();

    for statement in &parsed {
        if let Statement::Node { id, label } = statement {
            let label = label.clone().unwrap_or_else(|| id.clone());
            graph.add_node(&label);
            labels.insert(id.clone(), label);
        }
    }

    for statement in &parsed {
        let Statement::Edges(chain) = statement else {
            continue;
        };
        for pair in chain.windows(2) {
            let src = labels.get(&pair[0]).unwrap_or(&pair[0]);
            let dst = labels.get(&pair[1]).unwrap_or(&pair[1]);
            if src == dst {
                continue;
            }
            graph.add_edge_acyclic(src, dst);
        }
    }

    Ok(graph)
}

fn normalize_file_node(name: &str) -> String {
    let mut name = name.to_string();
    if !name.ends_with(".v") {
        name.push_str(".v");
    }
    if !name.starts_with('.') {
        name.insert_str(0, "./");
    }
    name
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
        .replace("\\\"", "\"")
}

/// Split a graph body on `;` and newlines that sit outside quoted strings
/// and `<...>` identifiers
fn split_statements(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut angle_depth = 0usize;

    for (pos, ch) in body.char_indices() {
        if in_quotes {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            '<' => angle_depth += 1,
            '>' => angle_depth = angle_depth.saturating_sub(1),
            ';' | '\n' if angle_depth == 0 => {
                parts.push(&body[start..pos]);
                start = pos + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Statement text up to its `[` attribute list, ignoring brackets in quotes
fn before_attributes(raw: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (pos, ch) in raw.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => return &raw[..pos],
            _ => {}
        }
    }
    raw
}

fn statements(dot: &str) -> Result<Vec<Statement>> {
    let (Some(open), Some(close)) = (dot.find('{'), dot.rfind('}')) else {
        return Err(GraphError::DotParse("missing graph body".to_string()));
    };
    let header = dot[..open].trim_start();
    if close < open || !(header.starts_with("digraph") || header.starts_with("graph")) {
        return Err(GraphError::DotParse(
            "expected a digraph or graph declaration".to_string(),
        ));
    }

    let mut parsed = Vec::new();
    for raw in split_statements(&dot[open + 1..close]) {
        let raw = raw.trim().trim_start_matches(['{', '}']).trim();
        if raw.is_empty() || raw.starts_with("//") || raw.starts_with('#') {
            continue;
        }

        let without_attrs = before_attributes(raw);
        if without_attrs.contains("->") {
            let chain: Vec<String> = without_attrs
                .split("->")
                .map(unquote)
                .filter(|id| !id.is_empty())
                .collect();
            if chain.len() < 2 || chain.iter().any(|id| DOT_KEYWORDS.contains(&id.as_str())) {
                continue;
            }
            parsed.push(Statement::Edges(chain));
            continue;
        }

        let Some(caps) = NODE_RE.captures(raw) else {
            continue;
        };
        let id = unquote(&caps[1]);
        if DOT_KEYWORDS.contains(&id.as_str()) {
            continue;
        }
        let label = caps.get(2).and_then(|attrs| {
            LABEL_RE.captures(attrs.as_str()).and_then(|label| {
                label
                    .get(1)
                    .or_else(|| label.get(2))
                    .map(|m| m.as_str().replace("\\\"", "\""))
            })
        });
        parsed.push(Statement::Node { id, label });
    }

    Ok(parsed)
}
