//! Tree rebuilder
//!
//! Reconciles a container's live children against the decoded manifest
//! on state reload: anonymous and stale children go, missing ones are
//! rebuilt through the kind registry at their recorded positions, and
//! the result is captured as the request's original child list.

use trellis_widgets::{KindRegistry, WidgetId, WidgetTree};

use crate::StateError;

/// Restore a container's children to the persisted shape.
///
/// An unknown kind tag is fatal to the request: the kind was created
/// dynamically by an earlier request and this process never registered
/// it. The error propagates; nothing is skipped.
pub fn rebuild_children(
    tree: &mut WidgetTree,
    registry: &KindRegistry,
    container: WidgetId,
    manifest: &[(String, String)],
) -> Result<(), StateError> {
    // Anonymous children never survive a reload; identified children
    // absent from the manifest are stale.
    let stale: Vec<WidgetId> = tree
        .children(container)
        .iter()
        .copied()
        .filter(|&child| {
            let identifier = tree[child].identifier();
            identifier.is_empty() || !manifest.iter().any(|(_, id)| id == identifier)
        })
        .collect();
    for child in stale {
        tree.detach(child);
    }

    // Walk the manifest with a running insertion cursor; children that
    // already exist keep their place.
    for (position, (kind, identifier)) in manifest.iter().enumerate() {
        if tree.find_child(container, identifier).is_none() {
            let mut widget = registry.create(kind)?;
            widget.set_identifier(identifier.clone());
            let child = tree.insert(widget);
            tree.attach(container, child, Some(position))
                .map_err(StateError::Widget)?;
        }
    }

    tracing::debug!(
        "rebuilt {} persisted children under `{}`",
        manifest.len(),
        tree[container].identifier()
    );

    // The just-rebuilt list is definitionally this request's original.
    tree.ensure_original_captured(container);
    Ok(())
}
