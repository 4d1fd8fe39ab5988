//! trellis Engine
//!
//! A server-side widget tree for stateless request/response hosts. Each
//! request rebuilds the prior tree shape from an opaque persisted blob,
//! lets application code mutate it, and renders either the full page or
//! the minimal set of client patch instructions.
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis_engine::{Page, widgets::{Kind, KindRegistry}};
//!
//! let registry = Arc::new(KindRegistry::new());
//! let mut page = Page::new(Arc::clone(&registry));
//! // ... declare the static tree ...
//! page.load(Some(&blob), true)?;
//! // ... event handlers mutate the tree ...
//! let output = page.render();
//! let blob = page.save()?;
//! ```

mod page;

pub use page::{Page, PageError, RenderOutput};

// Re-export sub-crates for direct access
pub use trellis_render as render;
pub use trellis_state as state;
pub use trellis_widgets as widgets;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
