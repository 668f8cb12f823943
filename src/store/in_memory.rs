//! In-memory implementation of the [`Store`] trait.
//!
//! State lives in concurrent maps: the hardware catalog behind a single
//! read-write lock, each project behind its own mutex so operations on
//! different projects never contend. Suitable for testing and
//! single-process deployments; records are lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::types::{HardwareSet, Project, Reservation};

use super::Store;

/// In-memory store.
///
/// Cloning is cheap; clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    hardware: Arc<RwLock<HashMap<String, HardwareSet>>>,
    projects: Arc<RwLock<HashMap<String, Arc<Mutex<Project>>>>>,
}

impl InMemoryStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    async fn insert_hardware_set(&self, set: HardwareSet) -> Result<()> {
        let mut hardware = self.hardware.write();
        if hardware.contains_key(&set.name) {
            return Err(Error::HardwareSetExists(set.name));
        }
        hardware.insert(set.name.clone(), set);
        Ok(())
    }

    async fn hardware_set(&self, name: &str) -> Result<HardwareSet> {
        self.hardware
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::HardwareSetNotFound(name.to_string()))
    }

    async fn list_hardware_sets(&self) -> Result<Vec<HardwareSet>> {
        let mut sets: Vec<HardwareSet> = self.hardware.read().values().cloned().collect();
        // Name order for deterministic output; ordering is not contractual
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sets)
    }

    async fn set_availability(&self, name: &str, availability: u64) -> Result<u64> {
        let mut hardware = self.hardware.write();
        let set = hardware
            .get_mut(name)
            .ok_or_else(|| Error::HardwareSetNotFound(name.to_string()))?;
        Ok(set.set_availability(availability))
    }

    async fn create_project(
        &self,
        name: &str,
        description: &str,
        requested: &BTreeMap<String, u64>,
    ) -> Result<Project> {
        // Lock order: projects map, then hardware catalog. This is the only
        // operation that holds both, so the order cannot deadlock.
        let mut projects = self.projects.write();
        if projects.contains_key(name) {
            return Err(Error::ProjectExists(name.to_string()));
        }

        let mut hardware = self.hardware.write();

        // Validation phase: every request is checked before anything is
        // debited, so a bad entry cannot leave a half-allocated project.
        let mut reasons = Vec::new();
        for (hw_name, qty) in requested {
            match hardware.get(hw_name) {
                None => reasons.push(format!("hardware set '{hw_name}' not found")),
                Some(set) if *qty > set.availability => reasons.push(format!(
                    "insufficient availability for '{hw_name}': requested {qty}, only {} left",
                    set.availability
                )),
                Some(_) => {}
            }
        }
        if !reasons.is_empty() {
            return Err(Error::ReservationsRejected { reasons });
        }

        // Commit phase. Validated under the same lock, so no debit can fail
        // partway through.
        let mut project = Project::new(name, description);
        for (hw_name, qty) in requested {
            let set = hardware
                .get_mut(hw_name)
                .ok_or_else(|| Error::HardwareSetNotFound(hw_name.clone()))?;
            set.debit(*qty)?;
            project
                .reservations
                .insert(hw_name.clone(), Reservation::new(*qty));
        }

        projects.insert(name.to_string(), Arc::new(Mutex::new(project.clone())));
        Ok(project)
    }

    async fn project(&self, name: &str) -> Result<Project> {
        let record = self
            .projects
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ProjectNotFound(name.to_string()))?;
        let project = record.lock().clone();
        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        // Snapshot the record handles first so the map lock is not held
        // while individual records are locked.
        let records: Vec<Arc<Mutex<Project>>> = self.projects.read().values().cloned().collect();
        let mut projects: Vec<Project> = records.iter().map(|r| r.lock().clone()).collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn update_project<F, R>(&self, name: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Project) -> Result<R> + Send,
        R: Send,
    {
        let record = self
            .projects
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ProjectNotFound(name.to_string()))?;
        let mut project = record.lock();
        f(&mut project)
    }
}
