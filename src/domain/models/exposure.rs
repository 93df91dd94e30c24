//! The host-global slot through which components can discover each other.

use std::collections::HashMap;

use uuid::Uuid;

use super::component::ComponentInstance;

/// Contents of the global exposure point.
///
/// `owner` is the runtime that last claimed the slot. A slot with entries
/// but no owner was filled by an uncoordinated writer.
#[derive(Debug, Clone, Default)]
pub struct ExposureSnapshot {
    pub owner: Option<Uuid>,
    pub entries: HashMap<String, ComponentInstance>,
}

impl ExposureSnapshot {
    /// An empty slot claimed by `owner`.
    pub fn owned_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            entries: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_none() && self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}
