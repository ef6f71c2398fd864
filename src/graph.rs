//! DOT rendering of an agent hierarchy.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::agent::{Agent, AgentKind, AgentNode};

static INVALID_ID_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_]").expect("DOT id sanitizer regex must compile")
});

/// Render `agent` and everything below it as a Graphviz digraph.
pub fn build_dot(agent: &dyn Agent) -> String {
    render(&agent.node())
}

/// Render an already collected [`AgentNode`] tree.
pub fn render(root: &AgentNode) -> String {
    let mut out = String::new();
    out.push_str("digraph G {\n");
    out.push_str("  rankdir=TB;\n");
    out.push_str("  bgcolor=\"#f8f9fa\";\n");
    out.push_str(
        "  node [shape=box, style=\"rounded,filled\", fillcolor=\"#ffffff\", fontname=\"Inter\"];\n",
    );
    out.push_str("  edge [fontname=\"Inter\"];\n\n");
    write_node(&mut out, root);
    out.push_str("}\n");
    out
}

/// Make `name` usable as a bare DOT identifier.
pub fn sanitize_id(name: &str) -> String {
    let id = INVALID_ID_CHARS.replace_all(name, "_");
    if id.is_empty() || id.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{id}")
    } else {
        id.into_owned()
    }
}

fn kind_label(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Llm => "LLM Agent",
        AgentKind::Sequential => "Sequential Workflow",
        AgentKind::Parallel => "Parallel Workflow",
        AgentKind::Loop => "Loop Workflow",
    }
}

fn escape_label(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

// `write!` into a String cannot fail.
fn write_node(out: &mut String, node: &AgentNode) {
    let id = sanitize_id(&node.name);
    let fill = if node.kind.is_workflow() { "#d1e7dd" } else { "#e0eafc" };
    let _ = writeln!(
        out,
        "  {id} [label=\"{}\\n({})\", fillcolor=\"{fill}\"];",
        escape_label(&node.name),
        kind_label(node.kind)
    );

    for tool in &node.tools {
        // Tool names repeat across agents; scope the node to its owner.
        let tool_id = format!("{id}__{}", sanitize_id(tool));
        let _ = writeln!(
            out,
            "  {tool_id} [label=\"{}\\n(Tool)\", shape=cylinder, fillcolor=\"#fff3cd\"];",
            escape_label(tool)
        );
        let _ = writeln!(out, "  {id} -> {tool_id};");
    }

    let mut previous: Option<String> = None;
    for child in &node.children {
        write_node(out, child);
        let child_id = sanitize_id(&child.name);
        match node.kind {
            AgentKind::Sequential => match &previous {
                None => {
                    let _ = writeln!(out, "  {id} -> {child_id} [label=\"start\"];");
                }
                Some(prev) => {
                    let _ = writeln!(out, "  {prev} -> {child_id} [label=\"next\"];");
                }
            },
            AgentKind::Parallel => {
                let _ = writeln!(out, "  {id} -> {child_id} [label=\"concurrent\"];");
            }
            AgentKind::Loop => match &previous {
                None => {
                    let _ = writeln!(out, "  {id} -> {child_id} [label=\"start loop\"];");
                }
                Some(prev) => {
                    let _ = writeln!(out, "  {prev} -> {child_id} [label=\"next\"];");
                }
            },
            AgentKind::Llm => {}
        }
        previous = Some(child_id);
    }

    if node.kind == AgentKind::Loop {
        if let (Some(first), Some(last)) = (node.children.first(), previous.as_deref()) {
            let first_id = sanitize_id(&first.name);
            let _ = writeln!(
                out,
                "  {last} -> {first_id} [label=\"repeat\", style=dashed, constraint=false];"
            );
        }
    }
}
