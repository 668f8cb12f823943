//! The hardware registry: the global catalog of provisioned hardware sets.
//!
//! The registry exclusively owns each set's `availability`. Project creation
//! debits it through the ledger; nothing else moves it except the explicit
//! clamped overwrite in [`Registry::set_availability`].

use tracing::instrument;

use crate::error::Result;
use crate::store::Store;
use crate::types::HardwareSet;

/// Typed facade over the store for catalog operations.
///
/// Cloning is cheap; clones share the underlying store.
#[derive(Clone)]
pub struct Registry<S> {
    store: S,
}

impl<S: Store> Registry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Provision a new hardware set with its full capacity available.
    #[instrument(skip(self), err)]
    pub async fn create_hardware_set(&self, name: &str, capacity: u64) -> Result<HardwareSet> {
        let set = HardwareSet::new(name, capacity);
        self.store.insert_hardware_set(set.clone()).await?;
        tracing::info!(name, capacity, "provisioned hardware set");
        Ok(set)
    }

    /// Look up one hardware set by name.
    pub async fn hardware_set(&self, name: &str) -> Result<HardwareSet> {
        self.store.hardware_set(name).await
    }

    /// All hardware sets in the catalog.
    pub async fn list_hardware_sets(&self) -> Result<Vec<HardwareSet>> {
        self.store.list_hardware_sets().await
    }

    /// Overwrite a set's availability.
    ///
    /// The stored value is clamped into `[0, capacity]` before the write;
    /// the returned value is what was written, not necessarily what was
    /// requested.
    #[instrument(skip(self), err)]
    pub async fn set_availability(&self, name: &str, availability: u64) -> Result<u64> {
        let written = self.store.set_availability(name, availability).await?;
        if written != availability {
            tracing::warn!(name, requested = availability, written, "availability clamped");
        }
        Ok(written)
    }
}
