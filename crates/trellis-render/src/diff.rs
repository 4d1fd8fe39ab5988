//! Incremental child-list renderer
//!
//! During a partial-update request, a container whose children were
//! mutated renders as the minimal set of client operations: deletions
//! for children that left, markup insertions for children that arrived,
//! and recursive incremental rendering for the rest. Classification is
//! by widget identity, never by identifier string: removing a child and
//! adding a new one under the same identifier is a remove plus an add.
//!
//! A widget in `ReRender` mode ships its whole subtree as one
//! replacement instead; its descendants are serialized by the full
//! markup writer, so no diff logic runs below it and the incremental
//! mode resumes untouched for its siblings.

use trellis_widgets::{RenderMode, WidgetId, WidgetTree};

use crate::markup::render_markup;
use crate::patch::PatchSink;

/// Render one widget for a partial-update response.
///
/// Emits patch instructions into `sink`; widgets that did not change
/// structurally emit nothing for themselves and recurse into their
/// children.
pub fn render_partial(tree: &WidgetTree, widget: WidgetId, sink: &mut dyn PatchSink) {
    if tree[widget].render_mode() == RenderMode::ReRender {
        let markup = render_markup(tree, widget);
        sink.register_replacement(&tree.client_id(widget), &markup);
        return;
    }

    let node = &tree[widget];
    match node.original_children() {
        Some(original) if node.is_container() => {
            render_children_diff(tree, widget, original, sink);
        }
        _ => {
            for &child in tree.children(widget) {
                render_partial(tree, child, sink);
            }
        }
    }
}

fn render_children_diff(
    tree: &WidgetTree,
    container: WidgetId,
    original: &[WidgetId],
    sink: &mut dyn PatchSink,
) {
    let current = tree.children(container);

    // Children that left this request: deletion by client id. Their
    // arena slots still know the old parent, so the id resolves.
    for &old in original {
        if !current.contains(&old) && !tree[old].identifier().is_empty() {
            sink.register_deletion(&tree.client_id(old));
        }
    }

    // Children that arrived: full markup, addressed by the container
    // and the child's position in the current list.
    let mut added = 0usize;
    for (index, &child) in current.iter().enumerate() {
        if !original.contains(&child) && !tree[child].identifier().is_empty() {
            let markup = render_markup(tree, child);
            sink.register_insertion(
                &tree.client_id(container),
                &format!("__add_{index}"),
                &markup,
            );
            added += 1;
        }
    }
    if added > 0 {
        tracing::debug!(
            "container `{}`: {added} inserted children",
            tree[container].identifier()
        );
    }

    // Survivors render incrementally, in their original relative order.
    for &child in original {
        if current.contains(&child) {
            render_partial(tree, child, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{Patch, PatchList};
    use trellis_widgets::{Kind, KindRegistry, Widget};

    fn build(ids: &[&str]) -> (WidgetTree, KindRegistry, WidgetId) {
        let mut tree = WidgetTree::new();
        let registry = KindRegistry::new();
        let root = tree.root();
        let container = tree.insert(Widget::container("container"));
        tree[container].set_identifier("list");
        tree.attach(root, container, None).unwrap();
        for id in ids {
            let child = tree.insert(Widget::literal("literal"));
            tree[child].set_identifier(*id);
            tree.attach(container, child, None).unwrap();
        }
        tree.set_tracking(true);
        (tree, registry, container)
    }

    #[test]
    fn test_no_mutation_emits_nothing() {
        let (tree, _, container) = build(&["a", "b"]);
        let mut patches = PatchList::new();
        render_partial(&tree, container, &mut patches);
        assert!(patches.is_empty());
    }

    #[test]
    fn test_captured_but_unchanged_emits_nothing() {
        let (mut tree, _, container) = build(&["a", "b"]);
        tree.ensure_original_captured(container);

        let mut patches = PatchList::new();
        render_partial(&tree, container, &mut patches);
        assert!(patches.is_empty());
    }

    #[test]
    fn test_remove_and_insert_scenario() {
        // O = [a, b]; remove a, add c at index 0 -> C = [c, b].
        let (mut tree, registry, container) = build(&["a", "b"]);
        let a = tree.find_child(container, "a").unwrap();
        tree.remove_persistent_child(a);
        tree.create_persistent_child(&registry, container, &Kind::literal("literal"), Some("c"), Some(0))
            .unwrap();

        let mut patches = PatchList::new();
        render_partial(&tree, container, &mut patches);

        let patches = patches.into_vec();
        assert_eq!(patches.len(), 2);
        assert!(matches!(&patches[0], Patch::Delete { client_id } if client_id == "list_a"));
        match &patches[1] {
            Patch::Insert {
                container,
                position,
                markup,
            } => {
                assert_eq!(container, "list");
                assert_eq!(position, "__add_0");
                assert!(markup.starts_with("<p id=\"list_c\""));
            }
            other => panic!("expected insertion, got {other:?}"),
        }
    }

    #[test]
    fn test_identifier_reuse_is_remove_plus_add() {
        let (mut tree, registry, container) = build(&["a"]);
        let a = tree.find_child(container, "a").unwrap();
        tree.remove_persistent_child(a);
        tree.create_persistent_child(&registry, container, &Kind::literal("literal"), Some("a"), None)
            .unwrap();

        let mut patches = PatchList::new();
        render_partial(&tree, container, &mut patches);

        let patches = patches.into_vec();
        assert_eq!(patches.len(), 2);
        assert!(matches!(patches[0], Patch::Delete { .. }));
        assert!(matches!(patches[1], Patch::Insert { .. }));
    }

    #[test]
    fn test_deletions_precede_insertions() {
        let (mut tree, registry, container) = build(&["a", "b"]);
        for id in ["a", "b"] {
            let child = tree.find_child(container, id).unwrap();
            tree.remove_persistent_child(child);
        }
        for id in ["x", "y"] {
            tree.create_persistent_child(&registry, container, &Kind::literal("literal"), Some(id), None)
                .unwrap();
        }

        let mut patches = PatchList::new();
        render_partial(&tree, container, &mut patches);

        let kinds: Vec<u8> = patches
            .iter()
            .map(|p| match p {
                Patch::Delete { .. } => 0,
                Patch::Insert { .. } => 1,
                Patch::Replace { .. } => 2,
            })
            .collect();
        assert_eq!(kinds, [0, 0, 1, 1]);
    }

    #[test]
    fn test_nested_mutation_in_unchanged_subtree() {
        let (mut tree, registry, outer) = build(&[]);
        tree.set_tracking(false);
        let inner = tree.insert(Widget::container("container"));
        tree[inner].set_identifier("inner");
        tree.attach(outer, inner, None).unwrap();
        tree.set_tracking(true);

        tree.create_persistent_child(&registry, inner, &Kind::literal("literal"), Some("n"), None)
            .unwrap();

        let mut patches = PatchList::new();
        render_partial(&tree, outer, &mut patches);

        let patches = patches.into_vec();
        assert_eq!(patches.len(), 1);
        assert!(
            matches!(&patches[0], Patch::Insert { container, .. } if container == "list_inner")
        );
    }

    #[test]
    fn test_rerender_ships_replacement_and_skips_diff() {
        let (mut tree, registry, container) = build(&["a"]);
        tree.create_persistent_child(&registry, container, &Kind::literal("literal"), Some("b"), None)
            .unwrap();
        tree[container].re_render();

        let mut patches = PatchList::new();
        render_partial(&tree, container, &mut patches);

        let patches = patches.into_vec();
        assert_eq!(patches.len(), 1);
        match &patches[0] {
            Patch::Replace { client_id, markup } => {
                assert_eq!(client_id, "list");
                assert!(markup.contains("id=\"list_a\""));
                assert!(markup.contains("id=\"list_b\""));
            }
            other => panic!("expected replacement, got {other:?}"),
        }
    }

    #[test]
    fn test_anonymous_children_are_not_diffed() {
        let (mut tree, _registry, container) = build(&["a"]);
        tree.ensure_original_captured(container);
        // A formatting node slipping in mid-request is invisible to the
        // patch stream.
        let raw = tree.insert(Widget::raw(" "));
        tree.attach(container, raw, None).unwrap();

        let mut patches = PatchList::new();
        render_partial(&tree, container, &mut patches);
        assert!(patches.is_empty());
    }
}
