// src/source/tree.rs

//! Text rendering of a source's import tree, as printed by `lesswatch tree`.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::source::SourceUnit;

/// Render `unit` and its imports as indented lines:
///
/// ```text
/// main.less
/// |-- mixins
/// |   `-- colors
/// `-- layout.less
/// ```
///
/// A file that imports one of its own ancestors is printed once more with a
/// `(cycle)` marker instead of being expanded again.
pub fn render_tree(unit: &SourceUnit) -> Vec<String> {
    let graph = unit.imports();
    let mut lines = Vec::new();
    let mut ancestors = HashSet::new();
    render_node(
        unit,
        graph.root_index(),
        unit.relative(),
        0,
        false,
        &mut ancestors,
        &mut lines,
    );
    lines
}

fn render_node(
    unit: &SourceUnit,
    node: NodeIndex,
    label: &str,
    level: usize,
    last: bool,
    ancestors: &mut HashSet<NodeIndex>,
    lines: &mut Vec<String>,
) {
    let prefix = tree_prefix(level, last);

    if !ancestors.insert(node) {
        lines.push(format!("{prefix}{label} (cycle)"));
        return;
    }
    lines.push(format!("{prefix}{label}"));

    let imports = unit.imports().direct_imports(node);
    let count = imports.len();
    for (i, (spec, child)) in imports.into_iter().enumerate() {
        render_node(unit, child, spec, level + 1, i + 1 == count, ancestors, lines);
    }

    ancestors.remove(&node);
}

// Only the last segment reflects `last`; outer levels always draw a rail.
fn tree_prefix(level: usize, last: bool) -> String {
    let mut prefix = String::new();
    for i in 1..=level {
        if i == level && last {
            prefix.push_str("`-- ");
        } else if i == level {
            prefix.push_str("|-- ");
        } else {
            prefix.push_str("|   ");
        }
    }
    prefix
}
