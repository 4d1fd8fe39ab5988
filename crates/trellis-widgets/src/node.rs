//! Widget node model
//!
//! One node in the server-side widget tree. Containers hold children,
//! literals hold inner markup, voids render as empty elements, and raw
//! nodes carry the formatting text that sits between declared widgets.

use crate::{AttrMap, WidgetError, WidgetId};

/// Widget flavor (content model)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Holds child widgets
    Container,
    /// Holds inner markup text
    Literal,
    /// Empty element, no content
    Void,
    /// Anonymous formatting text; never persisted or diffed
    Raw,
}

impl Flavor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Literal => "literal",
            Self::Void => "void",
            Self::Raw => "raw",
        }
    }

    /// Element rendered when no override is set
    pub fn default_element(self) -> &'static str {
        match self {
            Self::Container => "div",
            Self::Literal => "p",
            Self::Void => "input",
            Self::Raw => "",
        }
    }
}

/// Elements that may never render a container.
///
/// Void elements cannot hold children; `textarea` is also denied so
/// callers are not misled into editing its text through child widgets.
const FORBIDDEN_CONTAINER_ELEMENTS: &[&str] = &[
    "textarea", "input", "br", "col", "hr", "link", "meta", "area", "base", "command", "embed",
    "img", "keygen", "param", "source", "track", "wbr",
];

/// Render mode for one widget during the current response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Normal rendering; incremental during partial requests
    #[default]
    Default,
    /// The entire subtree ships as complete markup this response
    ReRender,
}

/// A node in the widget tree
///
/// Owned by the arena; the parent handle is a non-owning back-reference
/// used for client-id computation.
#[derive(Debug)]
pub struct Widget {
    pub(crate) parent: WidgetId,
    pub(crate) children: Vec<WidgetId>,
    pub(crate) identifier: String,
    pub(crate) kind: String,
    flavor: Flavor,
    /// Element override; `None` renders the flavor default
    element: Option<String>,
    attrs: AttrMap,
    inner_value: String,
    pub(crate) render_mode: RenderMode,
    /// Children as they were when this request first mutated them
    pub(crate) original_children: Option<Vec<WidgetId>>,
}

impl Widget {
    fn blank(kind: impl Into<String>, flavor: Flavor) -> Self {
        Self {
            parent: WidgetId::NONE,
            children: Vec::new(),
            identifier: String::new(),
            kind: kind.into(),
            flavor,
            element: None,
            attrs: AttrMap::new(),
            inner_value: String::new(),
            render_mode: RenderMode::Default,
            original_children: None,
        }
    }

    /// Create a container widget of the given kind
    pub fn container(kind: impl Into<String>) -> Self {
        Self::blank(kind, Flavor::Container)
    }

    /// Create a literal widget of the given kind
    pub fn literal(kind: impl Into<String>) -> Self {
        Self::blank(kind, Flavor::Literal)
    }

    /// Create a void widget of the given kind
    pub fn void(kind: impl Into<String>) -> Self {
        Self::blank(kind, Flavor::Void)
    }

    /// Create an anonymous formatting node carrying raw text
    pub fn raw(text: impl Into<String>) -> Self {
        let mut widget = Self::blank("raw", Flavor::Raw);
        widget.inner_value = text.into();
        widget
    }

    /// Identifier, unique among siblings; empty for anonymous nodes
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Assign the identifier.
    ///
    /// The caller is responsible for keeping identifiers unique among
    /// siblings once non-empty.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
    }

    /// Stable kind tag used for registry lookup and persistence
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn is_container(&self) -> bool {
        self.flavor == Flavor::Container
    }

    /// Effective element: the override if set, the flavor default otherwise
    pub fn element(&self) -> &str {
        self.element
            .as_deref()
            .unwrap_or_else(|| self.flavor.default_element())
    }

    /// Element override as stored; `None` means the flavor default
    pub fn element_override(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// Choose the rendering element.
    ///
    /// Setting the flavor default clears the override. Illegal elements
    /// are rejected at the call site, not at render time.
    pub fn set_element(&mut self, element: &str) -> Result<(), WidgetError> {
        self.sanitize_element(element)?;
        if element == self.flavor.default_element() {
            self.element = None;
        } else {
            self.element = Some(element.to_string());
        }
        Ok(())
    }

    fn sanitize_element(&self, element: &str) -> Result<(), WidgetError> {
        let legal = !element.is_empty()
            && element
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        let denied = self.flavor == Flavor::Raw
            || (self.flavor == Flavor::Container && FORBIDDEN_CONTAINER_ELEMENTS.contains(&element));
        if !legal || denied {
            return Err(WidgetError::ForbiddenElement {
                element: element.to_string(),
                flavor: self.flavor.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Inner markup text (literal and raw nodes)
    pub fn inner_value(&self) -> &str {
        &self.inner_value
    }

    /// Set the inner markup text.
    ///
    /// Containers and voids have no inner value; the error surfaces
    /// immediately rather than at render time.
    pub fn set_inner_value(&mut self, value: impl Into<String>) -> Result<(), WidgetError> {
        match self.flavor {
            Flavor::Literal | Flavor::Raw => {
                self.inner_value = value.into();
                Ok(())
            }
            Flavor::Container | Flavor::Void => Err(WidgetError::ForbiddenProperty {
                name: "innerValue".to_string(),
                flavor: self.flavor.as_str().to_string(),
            }),
        }
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Raw attribute access, bypassing element-specific synthetic
    /// handling such as the `select` value surface. Semantic access goes
    /// through [`WidgetTree::set_attribute`](crate::WidgetTree::set_attribute).
    pub fn attrs_mut(&mut self) -> &mut AttrMap {
        &mut self.attrs
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Force this widget's whole subtree to re-render as complete markup
    /// for the current response
    pub fn re_render(&mut self) {
        self.render_mode = RenderMode::ReRender;
    }

    /// Children as captured at the first structural mutation of this
    /// request; `None` if the children were never mutated
    pub fn original_children(&self) -> Option<&[WidgetId]> {
        self.original_children.as_deref()
    }

    /// Whether the widget renders content between its tags
    pub fn has_content(&self) -> bool {
        match self.flavor {
            Flavor::Container => !self.children.is_empty(),
            Flavor::Literal | Flavor::Raw => !self.inner_value.is_empty(),
            Flavor::Void => false,
        }
    }
}
