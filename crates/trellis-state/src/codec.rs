//! Child manifest codec
//!
//! A container that has ever mutated its children persists an ordered
//! (kind, identifier) entry for every identified child. Anonymous
//! formatting nodes are skipped. Containers that never mutated write no
//! manifest and reload through the generic state path alone.

use trellis_widgets::{WidgetId, WidgetTree};

use crate::{StateError, StateValue};

/// Encode the container's current children as a manifest value
pub fn encode_manifest(tree: &WidgetTree, container: WidgetId) -> StateValue {
    let entries = tree
        .children(container)
        .iter()
        .map(|&child| &tree[child])
        .filter(|widget| !widget.identifier().is_empty())
        .map(|widget| {
            StateValue::List(vec![
                StateValue::Text(widget.kind().to_string()),
                StateValue::Text(widget.identifier().to_string()),
            ])
        })
        .collect();
    StateValue::List(entries)
}

/// Decode a manifest value into ordered (kind, identifier) pairs.
///
/// Strict: every entry must be a two-element list of text values.
pub fn decode_manifest(value: &StateValue) -> Result<Vec<(String, String)>, StateError> {
    let StateValue::List(entries) = value else {
        return Err(StateError::MalformedState);
    };
    entries
        .iter()
        .map(|entry| match entry {
            StateValue::List(pair) => match pair.as_slice() {
                [StateValue::Text(kind), StateValue::Text(identifier)] => {
                    Ok((kind.clone(), identifier.clone()))
                }
                _ => Err(StateError::MalformedState),
            },
            _ => Err(StateError::MalformedState),
        })
        .collect()
}
