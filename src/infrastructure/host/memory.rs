//! In-memory host document.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::errors::HostError;
use crate::domain::models::{
    ComponentInstance, ControlValue, Element, ElementKind, ExposureSnapshot,
};
use crate::domain::ports::HostEnvironment;

#[derive(Default)]
struct Document {
    /// Top-level artifacts in mount order.
    artifacts: Vec<Element>,
    exposure: ExposureSnapshot,
}

/// A host environment held entirely in memory.
///
/// Used by the test suite and the `run` simulation command.
#[derive(Default)]
pub struct MemoryHost {
    document: Mutex<Document>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Root ids of every mounted artifact, in document order.
    pub fn artifact_ids(&self) -> Vec<String> {
        self.document()
            .artifacts
            .iter()
            .map(|artifact| artifact.id.clone())
            .collect()
    }
}

impl HostEnvironment for MemoryHost {
    fn find_artifacts(&self, prefix: &str) -> Vec<String> {
        self.document()
            .artifacts
            .iter()
            .filter(|artifact| artifact.id.starts_with(prefix))
            .map(|artifact| artifact.id.clone())
            .collect()
    }

    fn remove_artifact(&self, id: &str) -> bool {
        let mut document = self.document();
        let before = document.artifacts.len();
        document.artifacts.retain(|artifact| artifact.id != id);
        document.artifacts.len() != before
    }

    fn mount(&self, element: Element) -> Result<(), HostError> {
        let mut document = self.document();
        let taken = element.ids().into_iter().find(|id| {
            document
                .artifacts
                .iter()
                .any(|artifact| artifact.find(id).is_some())
        });
        if let Some(id) = taken {
            return Err(HostError::DuplicateElement(id.to_string()));
        }
        document.artifacts.push(element);
        Ok(())
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document()
            .artifacts
            .iter()
            .find_map(|artifact| artifact.find(id))
            .cloned()
    }

    fn dispatch_input(&self, id: &str, value: ControlValue) -> Result<(), HostError> {
        let listener = {
            let mut document = self.document();
            let element = document
                .artifacts
                .iter_mut()
                .find_map(|artifact| artifact.find_mut(id))
                .ok_or_else(|| HostError::ElementNotFound(id.to_string()))?;

            match (&mut element.kind, &value) {
                (ElementKind::Toggle { checked, .. }, ControlValue::Checked(new)) => {
                    *checked = *new;
                }
                (ElementKind::TextArea { value: text, .. }, ControlValue::Text(new)) => {
                    text.clone_from(new);
                }
                _ => {
                    return Err(HostError::InputMismatch {
                        id: id.to_string(),
                        value: value.kind(),
                    })
                }
            }
            element.on_change.clone()
        };

        // Listeners run without the document lock so they may call back in.
        if let Some(listener) = listener {
            listener(&value);
        }
        Ok(())
    }

    fn exposure(&self) -> ExposureSnapshot {
        self.document().exposure.clone()
    }

    fn expose(&self, name: &str, instance: ComponentInstance) {
        self.document()
            .exposure
            .entries
            .insert(name.to_string(), instance);
    }

    fn replace_exposure(&self, snapshot: ExposureSnapshot) -> ExposureSnapshot {
        std::mem::replace(&mut self.document().exposure, snapshot)
    }
}
