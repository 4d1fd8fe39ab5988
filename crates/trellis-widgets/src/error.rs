//! Widget tree errors

use thiserror::Error;

/// Errors surfaced by the widget tree API
///
/// Every variant is a programming or state error; none is transient, so
/// callers propagate rather than retry.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// No constructor registered for a widget kind tag.
    ///
    /// Fatal to the request: the tag was persisted by an earlier request
    /// but this process never saw the kind registered.
    #[error("unknown widget kind `{tag}`")]
    UnknownKind { tag: String },

    /// Element is not legal for the widget's flavor
    #[error("element `{element}` cannot be used for a {flavor} widget")]
    ForbiddenElement { element: String, flavor: String },

    /// Synthetic property is not available on the widget's flavor
    #[error("the `{name}` property is not available on a {flavor} widget")]
    ForbiddenProperty { name: String, flavor: String },

    /// Child operation on a widget that cannot hold children
    #[error("widget `{identifier}` cannot hold child widgets")]
    NotAContainer { identifier: String },

    /// The OS random source needed for id generation failed
    #[error("failed to generate a widget id: {0}")]
    IdGeneration(String),
}
