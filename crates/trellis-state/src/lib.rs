//! trellis State - persisted widget-tree state
//!
//! Round-trips tree shape and widget state across the stateless request
//! boundary: the snapshot codec records which children a container had,
//! the rebuilder restores them through the kind registry, and the
//! persistence walk carries everything else.

mod codec;
mod persist;
mod rebuild;

pub use codec::{decode_manifest, encode_manifest};
pub use persist::{load_state, save_state};
pub use rebuild::rebuild_children;

use serde::{Deserialize, Serialize};
use trellis_widgets::WidgetError;

/// Persisted-state payload.
///
/// The opaque blob round-tripped between server and client, modeled as
/// a small value tree so hosts pick their own text encoding. Generic
/// widget state is a `Map`; a container with an active child snapshot
/// wraps its generic state in a two-element `List` led by the child
/// manifest, keeping the two shapes structurally distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
    Null,
    Text(String),
    List(Vec<StateValue>),
    Map(Vec<(String, StateValue)>),
}

/// Errors raised while decoding or applying persisted state.
///
/// Both variants are fatal to the request: they imply state corruption
/// or a process restart that lost dynamic kind registrations, never a
/// transient condition.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Persisted state does not match the expected wire shape, e.g. a
    /// child manifest that is not a list of two-element string pairs
    #[error("persisted state does not match the expected shape")]
    MalformedState,

    /// Widget-level failure while rebuilding, e.g. an unknown kind tag
    #[error(transparent)]
    Widget(#[from] WidgetError),
}
