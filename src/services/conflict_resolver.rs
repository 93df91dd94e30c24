//! Detection and removal of competing sidebar instances.
//!
//! Anything in the host document whose id starts with the sidebar prefix
//! belongs to an authoritative UI. At startup this runtime has not built its
//! own UI yet, so every match is stale. Later, duplicates can still appear
//! (a second copy of the add-on, a late competing loader); [`dedupe`] keeps
//! the first one in document order and removes the rest.
//!
//! [`dedupe`]: ConflictResolver::dedupe

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::models::ExposureSnapshot;
use crate::domain::ports::HostEnvironment;

/// What the startup pass found.
#[derive(Debug, Default)]
pub struct ConflictReport {
    /// Ids of stale artifacts removed from the host.
    pub removed: Vec<String>,
    /// Prior exposure-point content, captured before it was cleared.
    pub captured: Option<ExposureSnapshot>,
}

impl ConflictReport {
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty() && self.captured.is_none()
    }
}

pub struct ConflictResolver {
    host: Arc<dyn HostEnvironment>,
    ui_prefix: String,
    owner: Uuid,
}

impl ConflictResolver {
    pub fn new(host: Arc<dyn HostEnvironment>, ui_prefix: impl Into<String>, owner: Uuid) -> Self {
        Self {
            host,
            ui_prefix: ui_prefix.into(),
            owner,
        }
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    /// Startup pass: remove every sidebar artifact and claim the exposure point.
    ///
    /// Capture-and-replace within one synchronous call; there is no lock.
    pub fn resolve(&self) -> ConflictReport {
        let removed: Vec<String> = self
            .host
            .find_artifacts(&self.ui_prefix)
            .into_iter()
            .filter(|id| self.host.remove_artifact(id))
            .collect();

        let previous = self
            .host
            .replace_exposure(ExposureSnapshot::owned_by(self.owner));
        let captured = if previous.is_empty() || previous.owner == Some(self.owner) {
            None
        } else {
            warn!(
                previous_owner = ?previous.owner,
                entries = previous.entries.len(),
                "Took over exposure point from an uncoordinated instance"
            );
            Some(previous)
        };

        if removed.is_empty() {
            debug!("No stale sidebar artifacts found");
        } else {
            info!(removed = removed.len(), ids = ?removed, "Removed stale sidebar artifacts");
        }

        ConflictReport { removed, captured }
    }

    /// Keep the first sidebar artifact and remove the others.
    ///
    /// Returns the ids that were removed.
    pub fn dedupe(&self) -> Vec<String> {
        let artifacts = self.host.find_artifacts(&self.ui_prefix);
        let removed: Vec<String> = artifacts
            .into_iter()
            .skip(1)
            .filter(|id| self.host.remove_artifact(id))
            .collect();

        if !removed.is_empty() {
            warn!(removed = removed.len(), ids = ?removed, "Removed duplicate sidebar artifacts");
        }
        removed
    }
}
