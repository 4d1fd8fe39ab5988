//! Widget kind registry
//!
//! Maps a stable kind tag to a constructor so widgets persisted by an
//! earlier request can be rebuilt without reflection. The registry
//! lives for the whole process and is populated lazily: the first
//! dynamic creation of a kind registers it, so any kind ever created
//! dynamically stays reconstructable for the life of the process.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::{Widget, WidgetError};

type Constructor = Arc<dyn Fn() -> Widget + Send + Sync>;

/// A declared widget kind: stable tag plus blank-widget constructor
#[derive(Clone)]
pub struct Kind {
    tag: String,
    build: Constructor,
}

impl Kind {
    /// Declare a kind with a custom constructor
    pub fn new(tag: impl Into<String>, construct: impl Fn() -> Widget + Send + Sync + 'static) -> Self {
        Self {
            tag: tag.into(),
            build: Arc::new(construct),
        }
    }

    /// Declare a container kind
    pub fn container(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let ctor_tag = tag.clone();
        Self::new(tag, move || Widget::container(ctor_tag.clone()))
    }

    /// Declare a literal kind
    pub fn literal(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let ctor_tag = tag.clone();
        Self::new(tag, move || Widget::literal(ctor_tag.clone()))
    }

    /// Declare a void kind
    pub fn void(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let ctor_tag = tag.clone();
        Self::new(tag, move || Widget::void(ctor_tag.clone()))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Build a blank widget; the kind tag always matches the declaration
    pub fn construct(&self) -> Widget {
        let mut widget = (self.build)();
        widget.kind = self.tag.clone();
        widget
    }
}

impl std::fmt::Debug for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kind").field("tag", &self.tag).finish()
    }
}

/// Process-lifetime factory map from kind tag to constructor.
///
/// Append-only. Registration is idempotent, so a race to register the
/// same tag twice is harmless: both writes produce an equivalent
/// constructor.
#[derive(Default)]
pub struct KindRegistry {
    creators: RwLock<HashMap<String, Constructor>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind; no-op if the tag is already present
    pub fn register(&self, kind: &Kind) {
        let mut creators = self
            .creators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        creators
            .entry(kind.tag.clone())
            .or_insert_with(|| Arc::clone(&kind.build));
    }

    /// Check whether a tag has been registered
    pub fn is_registered(&self, tag: &str) -> bool {
        self.creators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(tag)
    }

    /// Build a blank widget of a registered kind.
    ///
    /// Fails when the tag was never registered in this process; the
    /// caller reports the failure, it is never silently skipped.
    pub fn create(&self, tag: &str) -> Result<Widget, WidgetError> {
        let construct = self
            .creators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .cloned()
            .ok_or_else(|| WidgetError::UnknownKind {
                tag: tag.to_string(),
            })?;
        let mut widget = construct();
        widget.kind = tag.to_string();
        Ok(widget)
    }
}

impl std::fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let creators = self
            .creators
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut tags: Vec<_> = creators.keys().cloned().collect();
        tags.sort();
        f.debug_struct("KindRegistry").field("tags", &tags).finish()
    }
}
