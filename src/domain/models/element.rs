//! Element trees mounted into the host document.
//!
//! Only what the orchestration layer and the fallback panel need is modelled:
//! containers, labels and two kinds of controls. Controls may carry a change
//! listener that the host invokes when input is dispatched to them.

use std::fmt;
use std::sync::Arc;

/// Callback invoked with the new value after a control changes.
pub type ChangeListener = Arc<dyn Fn(&ControlValue) + Send + Sync>;

/// A value delivered to a control by user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlValue {
    Checked(bool),
    Text(String),
}

impl ControlValue {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Checked(_) => "checked",
            Self::Text(_) => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Container { title: String },
    Label { text: String },
    Toggle { label: String, checked: bool },
    TextArea { placeholder: String, value: String },
}

/// A node in a mounted element tree.
#[derive(Clone)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub children: Vec<Element>,
    pub on_change: Option<ChangeListener>,
}

impl Element {
    pub fn container(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Container { title: title.into() })
    }

    pub fn label(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Label { text: text.into() })
    }

    pub fn toggle(id: impl Into<String>, label: impl Into<String>, checked: bool) -> Self {
        Self::new(
            id,
            ElementKind::Toggle {
                label: label.into(),
                checked,
            },
        )
    }

    pub fn text_area(
        id: impl Into<String>,
        placeholder: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            ElementKind::TextArea {
                placeholder: placeholder.into(),
                value: value.into(),
            },
        )
    }

    fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            children: Vec::new(),
            on_change: None,
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn on_change(mut self, listener: impl Fn(&ControlValue) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(listener));
        self
    }

    /// Depth-first search for a descendant (or self) by id.
    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// All ids in this tree, depth first.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = vec![self.id.as_str()];
        for child in &self.children {
            ids.extend(child.ids());
        }
        ids
    }

    /// Count descendants (including self) matching `predicate`.
    pub fn count(&self, predicate: &impl Fn(&ElementKind) -> bool) -> usize {
        usize::from(predicate(&self.kind))
            + self
                .children
                .iter()
                .map(|child| child.count(predicate))
                .sum::<usize>()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("children", &self.children)
            .field("listening", &self.on_change.is_some())
            .finish()
    }
}
