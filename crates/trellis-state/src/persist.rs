//! Recursive widget-state persistence
//!
//! The generic path carries element override, attributes, inner markup,
//! and child states keyed by identifier. A container with a captured
//! original child list extends the generic hook: its state is wrapped in
//! a two-element list led by the child manifest, which the loader feeds
//! through the rebuilder before descending.

use trellis_widgets::{Flavor, KindRegistry, WidgetId, WidgetTree};

use crate::codec::{decode_manifest, encode_manifest};
use crate::rebuild::rebuild_children;
use crate::{StateError, StateValue};

/// Save a widget subtree to a persisted-state value
pub fn save_state(tree: &WidgetTree, widget: WidgetId) -> StateValue {
    let generic = save_generic(tree, widget);
    if tree[widget].original_children().is_some() {
        StateValue::List(vec![encode_manifest(tree, widget), generic])
    } else {
        generic
    }
}

fn save_generic(tree: &WidgetTree, widget: WidgetId) -> StateValue {
    let node = &tree[widget];
    let mut fields = Vec::new();
    if let Some(element) = node.element_override() {
        fields.push(("element".to_string(), StateValue::Text(element.to_string())));
    }
    if !node.attrs().is_empty() {
        let attrs = node
            .attrs()
            .iter()
            .map(|attr| {
                StateValue::List(vec![
                    StateValue::Text(attr.name.clone()),
                    attr.value
                        .clone()
                        .map_or(StateValue::Null, StateValue::Text),
                ])
            })
            .collect();
        fields.push(("attrs".to_string(), StateValue::List(attrs)));
    }
    if node.flavor() == Flavor::Literal && !node.inner_value().is_empty() {
        fields.push((
            "inner".to_string(),
            StateValue::Text(node.inner_value().to_string()),
        ));
    }
    let children: Vec<(String, StateValue)> = tree
        .children(widget)
        .iter()
        .copied()
        .filter(|&child| !tree[child].identifier().is_empty())
        .map(|child| (tree[child].identifier().to_string(), save_state(tree, child)))
        .collect();
    if !children.is_empty() {
        fields.push(("children".to_string(), StateValue::Map(children)));
    }
    StateValue::Map(fields)
}

/// Apply a persisted-state value to a widget subtree.
///
/// Containers whose state leads with a child manifest are rebuilt
/// through the registry before their descendants load. Shape violations
/// and unknown kind tags are fatal and propagate to the caller.
pub fn load_state(
    tree: &mut WidgetTree,
    registry: &KindRegistry,
    widget: WidgetId,
    state: &StateValue,
) -> Result<(), StateError> {
    match state {
        StateValue::Null => Ok(()),
        StateValue::Map(_) => load_generic(tree, registry, widget, state),
        StateValue::List(parts) => {
            let [manifest_value, generic] = parts.as_slice() else {
                return Err(StateError::MalformedState);
            };
            let manifest = decode_manifest(manifest_value)?;
            rebuild_children(tree, registry, widget, &manifest)?;
            load_generic(tree, registry, widget, generic)
        }
        StateValue::Text(_) => Err(StateError::MalformedState),
    }
}

fn load_generic(
    tree: &mut WidgetTree,
    registry: &KindRegistry,
    widget: WidgetId,
    state: &StateValue,
) -> Result<(), StateError> {
    let StateValue::Map(fields) = state else {
        return Err(StateError::MalformedState);
    };
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("element", StateValue::Text(element)) => {
                tree[widget].set_element(element)?;
            }
            ("attrs", StateValue::List(entries)) => {
                let attrs = tree[widget].attrs_mut();
                attrs.clear();
                for entry in entries {
                    let StateValue::List(pair) = entry else {
                        return Err(StateError::MalformedState);
                    };
                    match pair.as_slice() {
                        [StateValue::Text(name), StateValue::Text(value)] => {
                            attrs.set(name.clone(), value.clone());
                        }
                        [StateValue::Text(name), StateValue::Null] => {
                            attrs.set_bare(name.clone());
                        }
                        _ => return Err(StateError::MalformedState),
                    }
                }
            }
            ("inner", StateValue::Text(text)) => {
                if matches!(tree[widget].flavor(), Flavor::Literal | Flavor::Raw) {
                    tree[widget].set_inner_value(text.clone())?;
                }
            }
            ("children", StateValue::Map(entries)) => {
                for (identifier, child_state) in entries {
                    // State for a child that no longer exists is dropped.
                    if let Some(child) = tree.find_child(widget, identifier) {
                        load_state(tree, registry, child, child_state)?;
                    }
                }
            }
            // Unknown keys are skipped so older blobs stay loadable.
            _ => {}
        }
    }
    // Restored attributes are not local changes.
    tree[widget].attrs_mut().mark_clean();
    Ok(())
}
