//! Port implemented by feature components that want to be initialized.

use async_trait::async_trait;

/// A feature component with a lifecycle entry point.
///
/// Components are loaded independently and hand themselves to the runtime
/// through [`Muster::register`](crate::services::Muster::register). The
/// orchestrator calls [`init`](Component::init) at most once per registered
/// instance.
#[async_trait]
pub trait Component: Send + Sync {
    /// Start the component.
    ///
    /// May assume the foundational components have already been started.
    /// An error, a panic or exceeding the init timeout marks the component
    /// failed without affecting any other component.
    async fn init(&self) -> anyhow::Result<()>;

    /// Self-healing hook invoked periodically by the health monitor, only
    /// while the component is initialized.
    ///
    /// Returns `None` when the component does not expose the hook.
    fn repair_layout(&self) -> Option<anyhow::Result<()>> {
        None
    }
}
