//! Widget tree arena
//!
//! Flat arena of widgets with parent-owned child lists. Slots are never
//! reused within a request: a detached widget keeps its slot and its
//! parent handle, so a deletion patch can still address it by client id
//! after it left the child list. The whole arena lives exactly one
//! request.

use crate::kind::{Kind, KindRegistry};
use crate::node::Widget;
use crate::select;
use crate::{WidgetError, WidgetId};

/// Arena-backed widget tree for one request
#[derive(Debug)]
pub struct WidgetTree {
    nodes: Vec<Widget>,
    root: WidgetId,
    tracking: bool,
}

impl WidgetTree {
    /// Create a tree holding only the anonymous root container
    pub fn new() -> Self {
        let root_widget = Widget::container("container");
        Self {
            nodes: vec![root_widget],
            root: WidgetId(0),
            tracking: false,
        }
    }

    /// The anonymous root container all top-level widgets hang off
    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Get a widget by id
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.nodes.get(id.index())
    }

    /// Get a mutable widget by id
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.nodes.get_mut(id.index())
    }

    /// Number of widgets ever allocated in this request
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether persisted-state tracking is active.
    ///
    /// Off while the declarative tree is built, on from state load until
    /// the end of the request.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
    }

    /// Allocate a widget slot; the widget starts detached
    pub fn insert(&mut self, widget: Widget) -> WidgetId {
        let id = WidgetId(self.nodes.len() as u32);
        self.nodes.push(widget);
        id
    }

    /// Ordered children of a widget
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        &self[id].children
    }

    /// Parent of a widget, if attached
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        let parent = self[id].parent;
        (!parent.is_none()).then_some(parent)
    }

    /// Find a direct child by its non-empty identifier
    pub fn find_child(&self, parent: WidgetId, identifier: &str) -> Option<WidgetId> {
        if identifier.is_empty() {
            return None;
        }
        self[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self[child].identifier == identifier)
    }

    /// Identified children of one kind, skipping anonymous formatting
    /// nodes. The iterator is lazy and restartable by calling again.
    pub fn children_of_kind<'a>(
        &'a self,
        parent: WidgetId,
        tag: &'a str,
    ) -> impl Iterator<Item = WidgetId> + 'a {
        self[parent].children.iter().copied().filter(move |&child| {
            let widget = &self[child];
            !widget.identifier.is_empty() && widget.kind == tag
        })
    }

    /// Client-visible identifier: non-empty identifiers on the ancestor
    /// chain joined with `_`
    pub fn client_id(&self, id: WidgetId) -> String {
        let mut parts = Vec::new();
        let mut current = id;
        while !current.is_none() {
            let widget = &self[current];
            if !widget.identifier.is_empty() {
                parts.push(widget.identifier.as_str());
            }
            current = widget.parent;
        }
        parts.reverse();
        parts.join("_")
    }

    /// Attach a detached widget under a container at `index`
    /// (appended when `None`).
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the end of the child list.
    pub fn attach(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        index: Option<usize>,
    ) -> Result<(), WidgetError> {
        if !self[parent].is_container() {
            return Err(WidgetError::NotAContainer {
                identifier: self[parent].identifier.clone(),
            });
        }
        self[child].parent = parent;
        match index {
            Some(index) => self[parent].children.insert(index, child),
            None => self[parent].children.push(child),
        }
        if self.tracking && self[parent].element() == "select" {
            select::option_added(self, parent, child);
        }
        Ok(())
    }

    /// Remove a widget from its parent's child list.
    ///
    /// The slot and the parent handle stay so the widget remains
    /// addressable for deletion patches.
    pub fn detach(&mut self, child: WidgetId) {
        let parent = self[child].parent;
        if parent.is_none() {
            return;
        }
        let children = &mut self[parent].children;
        let Some(position) = children.iter().position(|&c| c == child) else {
            return;
        };
        children.remove(position);
        if self.tracking && self[parent].element() == "select" {
            select::option_removed(self, parent);
        }
    }

    /// Capture the container's children as this request's original list.
    ///
    /// Captured at most once per request; every persistent mutation
    /// calls this before changing the child list, so the capture always
    /// reflects the tree as rebuilt from the prior persisted state.
    pub fn ensure_original_captured(&mut self, id: WidgetId) {
        let widget = &mut self[id];
        if widget.original_children.is_none() {
            widget.original_children = Some(widget.children.clone());
        }
    }

    /// Create a child widget that is re-created automatically on future
    /// requests.
    ///
    /// Registers the kind as a side effect, assigns `id` (or a generated
    /// one), and inserts at `index` (appended when `None`).
    pub fn create_persistent_child(
        &mut self,
        registry: &KindRegistry,
        parent: WidgetId,
        kind: &Kind,
        id: Option<&str>,
        index: Option<usize>,
    ) -> Result<WidgetId, WidgetError> {
        if !self[parent].is_container() {
            return Err(WidgetError::NotAContainer {
                identifier: self[parent].identifier.clone(),
            });
        }
        self.ensure_original_captured(parent);
        registry.register(kind);
        let mut widget = kind.construct();
        let identifier = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Self::unique_id()?,
        };
        widget.set_identifier(identifier);
        let child = self.insert(widget);
        self.attach(parent, child, index)?;
        Ok(child)
    }

    /// Remove a child and persist the change. No-op if the widget is
    /// already detached.
    pub fn remove_persistent_child(&mut self, child: WidgetId) {
        let parent = self[child].parent;
        if parent.is_none() || !self[parent].children.contains(&child) {
            return;
        }
        self.ensure_original_captured(parent);
        self.detach(child);
    }

    /// Remove the child at `index` and persist the change.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_persistent_child_at(&mut self, parent: WidgetId, index: usize) {
        self.ensure_original_captured(parent);
        let child = self[parent].children[index];
        self.detach(child);
    }

    /// Drop every anonymous formatting child from every container.
    ///
    /// Run at the start of a partial request, before tracking begins:
    /// formatting nodes only exist for full-page output and would
    /// otherwise pollute the diff.
    pub fn strip_anonymous_children(&mut self) {
        let mut to_detach = Vec::new();
        for node in &self.nodes {
            if node.is_container() {
                for &child in &node.children {
                    if self.nodes[child.index()].identifier.is_empty() {
                        to_detach.push(child);
                    }
                }
            }
        }
        if !to_detach.is_empty() {
            tracing::debug!("stripping {} formatting nodes", to_detach.len());
        }
        for child in to_detach {
            self.detach(child);
        }
    }

    /// Generate a unique widget id: `x` plus seven hex characters
    /// sampled from 128 random bits
    pub fn unique_id() -> Result<String, WidgetError> {
        let mut bytes = [0u8; 16];
        getrandom::fill(&mut bytes)
            .map_err(|err| WidgetError::IdGeneration(err.to_string()))?;
        let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
        let hex = hex.as_bytes();
        let mut id = String::with_capacity(8);
        id.push('x');
        for &position in &[0usize, 5, 10, 15, 20, 25, 30] {
            id.push(hex[position] as char);
        }
        Ok(id)
    }

    /// Read an attribute, applying element-specific synthetic handling:
    /// `innerValue` maps to the inner markup of literals and is denied
    /// on containers, and `value` on a `select` reads the joined values
    /// of its selected options.
    pub fn attribute(&self, id: WidgetId, name: &str) -> Result<Option<String>, WidgetError> {
        let widget = &self[id];
        if name == "innerValue" {
            return match widget.flavor() {
                crate::Flavor::Literal | crate::Flavor::Raw => {
                    Ok(Some(widget.inner_value().to_string()))
                }
                flavor => Err(WidgetError::ForbiddenProperty {
                    name: name.to_string(),
                    flavor: flavor.as_str().to_string(),
                }),
            };
        }
        if widget.is_container() && widget.element() == "select" && name == "value" {
            return Ok(Some(select::joined_value(self, id)));
        }
        Ok(widget.attrs().get(name).map(str::to_string))
    }

    /// Write an attribute, applying the same synthetic handling as
    /// [`attribute`](Self::attribute)
    pub fn set_attribute(&mut self, id: WidgetId, name: &str, value: &str) -> Result<(), WidgetError> {
        if name == "innerValue" {
            return self[id].set_inner_value(value);
        }
        if self[id].is_container() && self[id].element() == "select" && name == "value" {
            select::write_value(self, id, value);
            return Ok(());
        }
        self[id].attrs_mut().set(name, value);
        Ok(())
    }

    /// Check an attribute; `value` on a `select` is true iff some
    /// option carries `selected`
    pub fn has_attribute(&self, id: WidgetId, name: &str) -> bool {
        let widget = &self[id];
        if widget.is_container() && widget.element() == "select" && name == "value" {
            return select::has_value(self, id);
        }
        widget.attrs().has(name)
    }

    /// Delete an attribute; returns whether it existed
    pub fn delete_attribute(&mut self, id: WidgetId, name: &str) -> bool {
        self[id].attrs_mut().remove(name)
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<WidgetId> for WidgetTree {
    type Output = Widget;

    fn index(&self, id: WidgetId) -> &Widget {
        &self.nodes[id.index()]
    }
}

impl std::ops::IndexMut<WidgetId> for WidgetTree {
    fn index_mut(&mut self, id: WidgetId) -> &mut Widget {
        &mut self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderMode;

    fn tree_with_children(ids: &[&str]) -> (WidgetTree, WidgetId) {
        let mut tree = WidgetTree::new();
        let parent = tree.insert(Widget::container("container"));
        tree[parent].set_identifier("list");
        let root = tree.root();
        tree.attach(root, parent, None).unwrap();
        for id in ids {
            let child = tree.insert(Widget::literal("literal"));
            tree[child].set_identifier(*id);
            tree.attach(parent, child, None).unwrap();
        }
        (tree, parent)
    }

    #[test]
    fn test_client_id_joins_ancestors() {
        let (mut tree, parent) = tree_with_children(&["a"]);
        let child = tree.find_child(parent, "a").unwrap();
        assert_eq!(tree.client_id(child), "list_a");

        // Anonymous ancestors contribute nothing.
        let raw = tree.insert(Widget::raw("\n    "));
        tree.attach(parent, raw, None).unwrap();
        assert_eq!(tree.client_id(raw), "list");
    }

    #[test]
    fn test_create_persistent_child_generates_id() {
        let (mut tree, parent) = tree_with_children(&[]);
        let registry = KindRegistry::new();
        let child = tree
            .create_persistent_child(&registry, parent, &Kind::literal("literal"), None, None)
            .unwrap();

        let identifier = tree[child].identifier().to_string();
        assert_eq!(identifier.len(), 8);
        assert!(identifier.starts_with('x'));
        assert!(registry.is_registered("literal"));
    }

    #[test]
    fn test_create_persistent_child_at_index() {
        let (mut tree, parent) = tree_with_children(&["a", "b"]);
        let registry = KindRegistry::new();
        let child = tree
            .create_persistent_child(&registry, parent, &Kind::literal("literal"), Some("c"), Some(0))
            .unwrap();

        assert_eq!(tree.children(parent)[0], child);
        assert_eq!(tree.children(parent).len(), 3);
    }

    #[test]
    fn test_original_captured_once_before_first_mutation() {
        let (mut tree, parent) = tree_with_children(&["a", "b"]);
        let registry = KindRegistry::new();

        assert!(tree[parent].original_children().is_none());

        let before = tree.children(parent).to_vec();
        tree.create_persistent_child(&registry, parent, &Kind::literal("literal"), Some("c"), None)
            .unwrap();
        tree.remove_persistent_child_at(parent, 0);

        // The capture reflects the state before the first mutation only.
        assert_eq!(tree[parent].original_children().unwrap(), before);
    }

    #[test]
    fn test_remove_persistent_child_detaches_but_keeps_slot() {
        let (mut tree, parent) = tree_with_children(&["a"]);
        let child = tree.find_child(parent, "a").unwrap();

        tree.remove_persistent_child(child);

        assert!(tree.children(parent).is_empty());
        // Still addressable for deletion patches.
        assert_eq!(tree.client_id(child), "list_a");
        // Removing again is a no-op.
        tree.remove_persistent_child(child);
    }

    #[test]
    fn test_children_of_kind_skips_anonymous() {
        let (mut tree, parent) = tree_with_children(&["a", "b"]);
        let raw = tree.insert(Widget::raw("  "));
        tree.attach(parent, raw, None).unwrap();
        let other = tree.insert(Widget::void("void"));
        tree[other].set_identifier("v");
        tree.attach(parent, other, None).unwrap();

        let found: Vec<String> = tree
            .children_of_kind(parent, "literal")
            .map(|id| tree[id].identifier().to_string())
            .collect();
        assert_eq!(found, ["a", "b"]);
    }

    #[test]
    fn test_not_a_container() {
        let (mut tree, parent) = tree_with_children(&["a"]);
        let leaf = tree.find_child(parent, "a").unwrap();
        let registry = KindRegistry::new();

        let err = tree
            .create_persistent_child(&registry, leaf, &Kind::literal("literal"), None, None)
            .unwrap_err();
        assert!(matches!(err, WidgetError::NotAContainer { .. }));
    }

    #[test]
    fn test_select_add_clears_sibling_selection_and_rerenders() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let select = tree.insert(Widget::container("container"));
        tree[select].set_identifier("sel");
        tree[select].set_element("select").unwrap();
        tree.attach(root, select, None).unwrap();

        let opt1 = tree.insert(Widget::literal("literal"));
        tree[opt1].set_identifier("opt1");
        tree[opt1].attrs_mut().set("value", "1");
        tree[opt1].attrs_mut().set_bare("selected");
        tree.attach(select, opt1, None).unwrap();

        tree.set_tracking(true);

        let opt2 = tree.insert(Widget::literal("literal"));
        tree[opt2].set_identifier("opt2");
        tree[opt2].attrs_mut().set("value", "2");
        tree[opt2].attrs_mut().set_bare("selected");
        tree.attach(select, opt2, None).unwrap();

        assert!(!tree[opt1].attrs().has("selected"));
        assert!(tree[opt2].attrs().has("selected"));
        assert_eq!(tree[select].render_mode(), RenderMode::ReRender);
    }

    #[test]
    fn test_select_value_through_tree_accessors() {
        let mut tree = WidgetTree::new();
        let root = tree.root();
        let select = tree.insert(Widget::container("container"));
        tree[select].set_identifier("sel");
        tree[select].set_element("select").unwrap();
        tree.attach(root, select, None).unwrap();
        for value in ["opt1", "opt2"] {
            let option = tree.insert(Widget::literal("literal"));
            tree[option].set_identifier(value);
            tree[option].attrs_mut().set("value", value);
            tree.attach(select, option, None).unwrap();
        }

        assert!(!tree.has_attribute(select, "value"));

        tree.set_attribute(select, "value", "opt2").unwrap();
        assert!(tree.has_attribute(select, "value"));
        assert_eq!(tree.attribute(select, "value").unwrap().as_deref(), Some("opt2"));
    }

    #[test]
    fn test_inner_value_denied_through_tree() {
        let (tree, parent) = tree_with_children(&[]);
        assert!(matches!(
            tree.attribute(parent, "innerValue"),
            Err(WidgetError::ForbiddenProperty { .. })
        ));
    }

    #[test]
    fn test_strip_anonymous_children() {
        let (mut tree, parent) = tree_with_children(&["a"]);
        let raw = tree.insert(Widget::raw("\r\n\t"));
        tree.attach(parent, raw, None).unwrap();

        tree.strip_anonymous_children();

        assert_eq!(tree.children(parent).len(), 1);
        let survivor = tree.children(parent)[0];
        assert_eq!(tree[survivor].identifier(), "a");
    }
}
