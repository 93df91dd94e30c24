//! Port for the host page the sidebar is injected into.

use crate::domain::errors::HostError;
use crate::domain::models::{ComponentInstance, ControlValue, Element, ExposureSnapshot};

/// DOM and global-scope primitives the orchestration layer relies on.
///
/// The host is single-document: artifacts are top-level element trees kept
/// in mount order, identified by their root id. Implementations must be
/// cheap to call from timer ticks and must not block.
pub trait HostEnvironment: Send + Sync {
    /// Root ids of mounted artifacts starting with `prefix`, in document order.
    fn find_artifacts(&self, prefix: &str) -> Vec<String>;

    /// Remove a mounted artifact. Returns `false` if it was not mounted.
    fn remove_artifact(&self, id: &str) -> bool;

    /// Mount a new top-level element tree.
    fn mount(&self, element: Element) -> Result<(), HostError>;

    /// Snapshot of a mounted element (root or descendant).
    fn element(&self, id: &str) -> Option<Element>;

    /// Deliver user input to a control, updating it and invoking its listener.
    fn dispatch_input(&self, id: &str, value: ControlValue) -> Result<(), HostError>;

    /// Current contents of the global exposure point.
    fn exposure(&self) -> ExposureSnapshot;

    /// Bind a component into the global exposure point.
    fn expose(&self, name: &str, instance: ComponentInstance);

    /// Swap the whole exposure point, returning what was there before.
    fn replace_exposure(&self, snapshot: ExposureSnapshot) -> ExposureSnapshot;
}
