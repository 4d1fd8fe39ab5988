//! Widget attributes
//!
//! Ordered attribute collection: get, set, remove, has. A dirty flag is
//! raised on any change so hosts can tell which widgets need attribute
//! patches; the flag is cleared after persisted state is applied.

/// Single attribute
///
/// `value: None` is a bare attribute (`selected`, `disabled`), rendered
/// as the name alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
}

/// Ordered attribute collection for one widget
#[derive(Debug, Clone, Default)]
pub struct AttrMap {
    attrs: Vec<Attr>,
    dirty: bool,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value; bare attributes read as the empty string
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    /// Check if an attribute exists
    pub fn has(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set_inner(name.into(), Some(value.into()));
    }

    /// Set a bare (value-less) attribute such as `selected`
    pub fn set_bare(&mut self, name: impl Into<String>) {
        self.set_inner(name.into(), None);
    }

    fn set_inner(&mut self, name: String, value: Option<String>) {
        self.dirty = true;
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value;
        } else {
            self.attrs.push(Attr { name, value });
        }
    }

    /// Remove an attribute; returns whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        let removed = self.attrs.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Drop every attribute
    pub fn clear(&mut self) {
        if !self.attrs.is_empty() {
            self.dirty = true;
        }
        self.attrs.clear();
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attrs.iter()
    }

    /// Whether any attribute changed since the last `mark_clean`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reset the dirty flag (after persisted state is applied)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
