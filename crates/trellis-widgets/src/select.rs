//! Selection synchronizer
//!
//! A `select` container exposes one external `value` surface backed by
//! the `selected` markers on its option children. Browsers apply
//! `selected` unreliably when option elements are patched in place
//! (crbug.com/662669), so any structural change to the option set while
//! tracking is active forces the whole element to re-render as complete
//! markup instead of patch instructions.

use crate::{WidgetId, WidgetTree};

/// Comma-joined values of every option carrying `selected`;
/// empty string when none is selected
pub(crate) fn joined_value(tree: &WidgetTree, select: WidgetId) -> String {
    let mut values = Vec::new();
    for &child in tree.children(select) {
        let option = &tree[child];
        if option.attrs().has("selected") {
            values.push(option.attrs().get("value").unwrap_or("").to_string());
        }
    }
    values.join(",")
}

/// Write the external value: clear every `selected` marker, then set it
/// on each option whose value matches a comma-split token. Duplicate
/// and unmatched tokens are ignored.
pub(crate) fn write_value(tree: &mut WidgetTree, select: WidgetId, value: &str) {
    let children = tree.children(select).to_vec();
    for &child in &children {
        tree[child].attrs_mut().remove("selected");
    }
    for token in value.split(',') {
        for &child in &children {
            if tree[child].attrs().get("value") == Some(token) {
                tree[child].attrs_mut().set_bare("selected");
            }
        }
    }
}

/// `has_attribute("value")` surface: true iff some option is selected
pub(crate) fn has_value(tree: &WidgetTree, select: WidgetId) -> bool {
    tree.children(select)
        .iter()
        .any(|&child| tree[child].attrs().has("selected"))
}

/// Structural addition of an option while tracking is active.
///
/// An incoming `selected` marker wins over the previous selection:
/// every sibling loses its marker first, keeping single-selection
/// semantics for controls that are not explicitly multi-select.
pub(crate) fn option_added(tree: &mut WidgetTree, select: WidgetId, added: WidgetId) {
    if tree[added].attrs().has("selected") {
        let siblings: Vec<WidgetId> = tree
            .children(select)
            .iter()
            .copied()
            .filter(|&child| child != added)
            .collect();
        for sibling in siblings {
            tree[sibling].attrs_mut().remove("selected");
        }
    }
    tree[select].re_render();
}

/// Structural removal of an option while tracking is active
pub(crate) fn option_removed(tree: &mut WidgetTree, select: WidgetId) {
    tree[select].re_render();
}
