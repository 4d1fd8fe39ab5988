//! Patch instructions
//!
//! Typed client-side operations collected during partial rendering.
//! Transport encoding is the host's concern; the engine only guarantees
//! that deletions are registered before insertions reuse the same
//! identifier space.

/// One client-side DOM operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Remove the element addressed by client id
    Delete { client_id: String },
    /// Insert markup into a container at a position slot
    Insert {
        container: String,
        position: String,
        markup: String,
    },
    /// Replace an element's entire markup
    Replace { client_id: String, markup: String },
}

/// Sink receiving patch instructions during partial rendering
pub trait PatchSink {
    fn register_deletion(&mut self, client_id: &str);
    fn register_insertion(&mut self, container: &str, position: &str, markup: &str);
    fn register_replacement(&mut self, client_id: &str, markup: &str);
}

/// Vec-backed patch sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchList {
    patches: Vec<Patch>,
}

impl PatchList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.patches.iter()
    }

    pub fn into_vec(self) -> Vec<Patch> {
        self.patches
    }
}

impl PatchSink for PatchList {
    fn register_deletion(&mut self, client_id: &str) {
        self.patches.push(Patch::Delete {
            client_id: client_id.to_string(),
        });
    }

    fn register_insertion(&mut self, container: &str, position: &str, markup: &str) {
        self.patches.push(Patch::Insert {
            container: container.to_string(),
            position: position.to_string(),
            markup: markup.to_string(),
        });
    }

    fn register_replacement(&mut self, client_id: &str, markup: &str) {
        self.patches.push(Patch::Replace {
            client_id: client_id.to_string(),
            markup: markup.to_string(),
        });
    }
}
