//! trellis Render - markup and patch emission
//!
//! Full-page serialization of widget subtrees, plus the incremental
//! renderer that turns child-list changes into client patch
//! instructions during partial-update requests.

mod diff;
mod markup;
mod patch;

pub use diff::render_partial;
pub use markup::{render_markup, write_markup};
pub use patch::{Patch, PatchList, PatchSink};
