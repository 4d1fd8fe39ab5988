//! Page - one request over a widget tree
//!
//! Lifecycle per request: declare the static tree, `load` the persisted
//! blob (rebuilding whatever earlier requests created), let event
//! handlers mutate the tree, then `render` and `save`. The tree and its
//! change tracking live exactly one request; only the kind registry
//! survives between requests.

use std::sync::Arc;

use trellis_render::{render_partial, write_markup, PatchList};
use trellis_state::{load_state, save_state, StateError, StateValue};
use trellis_widgets::{Flavor, Kind, KindRegistry, WidgetError, WidgetId, WidgetTree};

/// Errors raised at the request boundary
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The persisted-state blob is not valid JSON
    #[error("invalid persisted-state blob: {0}")]
    Blob(#[from] serde_json::Error),

    /// The decoded state could not be applied to the tree
    #[error(transparent)]
    State(#[from] StateError),
}

/// Output of rendering one request
#[derive(Debug)]
pub enum RenderOutput {
    /// Complete page markup (full-page request)
    Full(String),
    /// Patch instructions (partial-update request)
    Partial(PatchList),
}

/// One request's view of the widget tree
pub struct Page {
    tree: WidgetTree,
    registry: Arc<KindRegistry>,
    partial: bool,
}

impl Page {
    /// Create a page with a fresh tree; tracking stays off until `load`
    /// so the declarative build is not mistaken for a mutation
    pub fn new(registry: Arc<KindRegistry>) -> Self {
        Self {
            tree: WidgetTree::new(),
            registry,
            partial: false,
        }
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    /// Whether the current request expects patch instructions
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Apply the persisted blob from the previous request.
    ///
    /// Partial requests first drop every anonymous formatting node:
    /// those exist for full-page output only and would pollute the diff.
    /// Tracking activates before state is applied, so structural changes
    /// made by the rebuilder fire the same hooks as handler mutations.
    pub fn load(&mut self, blob: Option<&str>, partial: bool) -> Result<(), PageError> {
        self.partial = partial;
        if partial {
            self.tree.strip_anonymous_children();
        }
        self.tree.set_tracking(true);
        if let Some(blob) = blob {
            tracing::debug!("loading persisted state ({} bytes)", blob.len());
            let state: StateValue = serde_json::from_str(blob)?;
            let root = self.tree.root();
            load_state(&mut self.tree, &self.registry, root, &state)?;
        }
        Ok(())
    }

    /// Create a persistent child through the shared registry
    pub fn create_persistent_child(
        &mut self,
        parent: WidgetId,
        kind: &Kind,
        id: Option<&str>,
        index: Option<usize>,
    ) -> Result<WidgetId, WidgetError> {
        self.tree
            .create_persistent_child(&self.registry, parent, kind, id, index)
    }

    /// Render the response: full markup for full-page requests, patch
    /// instructions for partial ones
    pub fn render(&self) -> RenderOutput {
        let root = self.tree.root();
        if self.partial {
            let mut patches = PatchList::new();
            render_partial(&self.tree, root, &mut patches);
            tracing::debug!("rendered partial response ({} patches)", patches.len());
            RenderOutput::Partial(patches)
        } else {
            let mut out = String::new();
            for &child in self.tree.children(root) {
                if self.tree[child].flavor() != Flavor::Raw && !out.is_empty() {
                    out.push_str("\r\n");
                }
                write_markup(&self.tree, child, &mut out, 0);
            }
            RenderOutput::Full(out)
        }
    }

    /// Serialize the tree's persisted state to the blob returned to the
    /// client
    pub fn save(&self) -> Result<String, PageError> {
        let root = self.tree.root();
        let state = save_state(&self.tree, root);
        Ok(serde_json::to_string(&state)?)
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("partial", &self.partial)
            .field("widgets", &self.tree.len())
            .finish()
    }
}
