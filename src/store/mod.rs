use std::collections::BTreeMap;
use std::future::Future;

use crate::error::Result;
use crate::types::{HardwareSet, Project};

pub mod in_memory;

/// Storage trait for the hardware catalog and the project ledger.
///
/// This trait provides the atomic operations the allocation model needs.
/// Implementations own the atomicity guarantees; the capacity arithmetic
/// itself lives on the domain types in [`crate::types`].
pub trait Store: Send + Sync {
    /// Insert a newly provisioned hardware set.
    ///
    /// # Errors
    /// - `HardwareSetExists` if the name is already taken
    fn insert_hardware_set(&self, set: HardwareSet) -> impl Future<Output = Result<()>> + Send;

    /// Fetch one hardware set by name.
    ///
    /// # Errors
    /// - `HardwareSetNotFound` if the set doesn't exist
    fn hardware_set(&self, name: &str) -> impl Future<Output = Result<HardwareSet>> + Send;

    /// All hardware sets. Ordering is implementation-defined and not part of
    /// the contract.
    fn list_hardware_sets(&self) -> impl Future<Output = Result<Vec<HardwareSet>>> + Send;

    /// Overwrite a set's availability, clamped into `[0, capacity]` before
    /// the write. Returns the value actually written, which may differ from
    /// the requested one.
    fn set_availability(
        &self,
        name: &str,
        availability: u64,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Atomically create a project, debiting every requested reservation
    /// from the global pool.
    ///
    /// Two-phase: every request is validated against current availability
    /// first, and any failure aborts the whole creation with zero registry
    /// mutation and every reason reported. The validate-then-commit sequence
    /// is atomic with respect to concurrent creations reserving from the
    /// same hardware sets.
    ///
    /// # Errors
    /// - `ProjectExists` if the name is already taken
    /// - `ReservationsRejected` if any request names an unknown set or
    ///   exceeds its availability
    fn create_project(
        &self,
        name: &str,
        description: &str,
        requested: &BTreeMap<String, u64>,
    ) -> impl Future<Output = Result<Project>> + Send;

    /// Fetch one project by name.
    ///
    /// # Errors
    /// - `ProjectNotFound` if the project doesn't exist
    fn project(&self, name: &str) -> impl Future<Output = Result<Project>> + Send;

    /// All projects. Ordering is implementation-defined and not part of the
    /// contract.
    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>>> + Send;

    /// Run `f` against the named project under its record lock.
    ///
    /// The read-check-write sequence inside `f` is serialized with respect
    /// to every other writer of the same project; operations on different
    /// projects proceed independently. An `Err` from `f` must leave the
    /// record unchanged, so closures check every precondition before
    /// mutating.
    ///
    /// # Errors
    /// - `ProjectNotFound` if the project doesn't exist
    /// - whatever `f` returns
    fn update_project<F, R>(&self, name: &str, f: F) -> impl Future<Output = Result<R>> + Send
    where
        F: FnOnce(&mut Project) -> Result<R> + Send,
        R: Send;
}
