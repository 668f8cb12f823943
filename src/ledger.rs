//! The allocation ledger: projects, their reservations, membership, and the
//! per-user checkout accounting inside each reservation.
//!
//! A project's reservations are debited from the registry once, at creation
//! time. After that the project's pool is self-contained: checkout and
//! check-in move units between a reservation's free and used portions and
//! never touch the global catalog.

use std::collections::BTreeMap;

use tracing::instrument;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::Project;

/// Typed facade over the store for project operations.
///
/// Cloning is cheap; clones share the underlying store.
#[derive(Clone)]
pub struct Ledger<S> {
    store: S,
}

impl<S: Store> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a project, reserving the requested quantity of each named
    /// hardware set from the global pool.
    ///
    /// All-or-nothing: every request is validated before any availability is
    /// debited, and a single bad entry (unknown set, or more than the pool
    /// has left) rejects the whole creation with every reason reported.
    #[instrument(skip(self, description, requested), fields(sets = requested.len()), err)]
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
        requested: &BTreeMap<String, u64>,
    ) -> Result<Project> {
        let project = self.store.create_project(name, description, requested).await?;
        tracing::info!(name, sets = requested.len(), "created project");
        Ok(project)
    }

    /// Look up one project by name.
    pub async fn project(&self, name: &str) -> Result<Project> {
        self.store.project(name).await
    }

    /// All projects in the ledger.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.store.list_projects().await
    }

    /// Add `user` to the project roster. Returns the updated project.
    #[instrument(skip(self), err)]
    pub async fn add_member(&self, project: &str, user: &str) -> Result<Project> {
        self.store
            .update_project(project, |p| {
                p.add_member(user)?;
                Ok(p.clone())
            })
            .await
    }

    /// Check out `qty` units of `hardware` for `user`.
    ///
    /// Preconditions, first failure wins: the project exists, `user` is a
    /// member, the project reserved `hardware`, and `qty` fits in the
    /// reservation's remaining pool. All-or-nothing on the requested
    /// quantity; the returned amount equals `qty` on success.
    #[instrument(skip(self), err)]
    pub async fn check_out(
        &self,
        project: &str,
        hardware: &str,
        qty: u64,
        user: &str,
    ) -> Result<u64> {
        if qty == 0 {
            return Err(Error::InvalidQuantity(
                "checkout quantity must be positive".to_string(),
            ));
        }
        self.store
            .update_project(project, |p| {
                if !p.is_member(user) {
                    return Err(Error::NotAMember {
                        project: p.name.clone(),
                        user: user.to_string(),
                    });
                }
                p.reservation_mut(hardware)?.check_out(hardware, user, qty)
            })
            .await
    }

    /// Check `qty` units of `hardware` back in for `user`.
    ///
    /// Same preconditions as checkout through the reservation lookup; then
    /// the user must hold a positive amount. Capped, not rejected, when
    /// `qty` exceeds what the user holds; the returned amount is what was
    /// actually returned to the reservation's pool.
    #[instrument(skip(self), err)]
    pub async fn check_in(
        &self,
        project: &str,
        hardware: &str,
        qty: u64,
        user: &str,
    ) -> Result<u64> {
        if qty == 0 {
            return Err(Error::InvalidQuantity(
                "check-in quantity must be positive".to_string(),
            ));
        }
        self.store
            .update_project(project, |p| {
                if !p.is_member(user) {
                    return Err(Error::NotAMember {
                        project: p.name.clone(),
                        user: user.to_string(),
                    });
                }
                p.reservation_mut(hardware)?.check_in(hardware, user, qty)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::store::in_memory::InMemoryStore;

    fn fixture() -> (Registry<InMemoryStore>, Ledger<InMemoryStore>) {
        let store = InMemoryStore::new();
        (Registry::new(store.clone()), Ledger::new(store))
    }

    fn requested(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries
            .iter()
            .map(|(name, qty)| (name.to_string(), *qty))
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_checkout_flow() {
        let (registry, ledger) = fixture();

        registry.create_hardware_set("HWSet1", 100).await.unwrap();

        let project = ledger
            .create_project("Proj", "demo project", &requested(&[("HWSet1", 20)]))
            .await
            .unwrap();
        assert_eq!(
            registry.hardware_set("HWSet1").await.unwrap().availability,
            80
        );
        assert_eq!(project.reservations["HWSet1"].capacity, 20);
        assert_eq!(project.reservations["HWSet1"].used, 0);

        ledger.add_member("Proj", "alice").await.unwrap();

        let processed = ledger.check_out("Proj", "HWSet1", 10, "alice").await.unwrap();
        assert_eq!(processed, 10);
        let project = ledger.project("Proj").await.unwrap();
        assert_eq!(project.reservations["HWSet1"].used, 10);

        // Check-in of 15 while holding 10 is capped, not rejected
        let processed = ledger.check_in("Proj", "HWSet1", 15, "alice").await.unwrap();
        assert_eq!(processed, 10);
        let project = ledger.project("Proj").await.unwrap();
        assert_eq!(project.reservations["HWSet1"].used, 0);
        assert!(!project.reservations["HWSet1"]
            .user_usage
            .contains_key("alice"));

        // The global pool never moved after creation
        assert_eq!(
            registry.hardware_set("HWSet1").await.unwrap().availability,
            80
        );
    }

    #[tokio::test]
    async fn test_checkout_precondition_order() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("HWSet1", 10).await.unwrap();
        ledger
            .create_project("Proj", "", &requested(&[("HWSet1", 10)]))
            .await
            .unwrap();

        // Missing project wins over everything else
        let err = ledger.check_out("Nope", "HWSet1", 1, "alice").await.unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));

        // Non-member wins over unknown hardware
        let err = ledger.check_out("Proj", "HWSetX", 1, "alice").await.unwrap_err();
        assert!(matches!(err, Error::NotAMember { .. }));

        ledger.add_member("Proj", "alice").await.unwrap();
        let err = ledger.check_out("Proj", "HWSetX", 1, "alice").await.unwrap_err();
        assert!(matches!(err, Error::HardwareNotInProject { .. }));
    }

    #[tokio::test]
    async fn test_checkout_is_all_or_nothing_at_the_boundary() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("HWSet1", 100).await.unwrap();
        ledger
            .create_project("Proj", "", &requested(&[("HWSet1", 10)]))
            .await
            .unwrap();
        ledger.add_member("Proj", "alice").await.unwrap();

        ledger.check_out("Proj", "HWSet1", 4, "alice").await.unwrap();

        // 7 > 6 remaining: rejected with zero state change
        let err = ledger.check_out("Proj", "HWSet1", 7, "alice").await.unwrap_err();
        assert!(matches!(err, Error::InsufficientAvailability { .. }));
        let project = ledger.project("Proj").await.unwrap();
        assert_eq!(project.reservations["HWSet1"].used, 4);

        // Exactly the remainder succeeds and fills the reservation
        assert_eq!(
            ledger.check_out("Proj", "HWSet1", 6, "alice").await.unwrap(),
            6
        );
        let project = ledger.project("Proj").await.unwrap();
        assert_eq!(project.reservations["HWSet1"].used, 10);
    }

    #[tokio::test]
    async fn test_check_in_requires_held_units() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("HWSet1", 10).await.unwrap();
        ledger
            .create_project("Proj", "", &requested(&[("HWSet1", 10)]))
            .await
            .unwrap();
        ledger.add_member("Proj", "alice").await.unwrap();
        ledger.add_member("Proj", "bob").await.unwrap();
        ledger.check_out("Proj", "HWSet1", 5, "alice").await.unwrap();

        // bob holds nothing, even though the reservation has units out
        let err = ledger.check_in("Proj", "HWSet1", 5, "bob").await.unwrap_err();
        assert!(matches!(err, Error::NothingCheckedOut { .. }));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("HWSet1", 10).await.unwrap();
        ledger
            .create_project("Proj", "", &requested(&[("HWSet1", 10)]))
            .await
            .unwrap();
        ledger.add_member("Proj", "alice").await.unwrap();

        let err = ledger.check_out("Proj", "HWSet1", 0, "alice").await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuantity(_)));
        let err = ledger.check_in("Proj", "HWSet1", 0, "alice").await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuantity(_)));
    }

    #[tokio::test]
    async fn test_projects_are_independent_after_creation() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("A", 100).await.unwrap();

        ledger
            .create_project("P1", "", &requested(&[("A", 30)]))
            .await
            .unwrap();
        assert_eq!(registry.hardware_set("A").await.unwrap().availability, 70);

        ledger
            .create_project("P2", "", &requested(&[("A", 70)]))
            .await
            .unwrap();
        assert_eq!(registry.hardware_set("A").await.unwrap().availability, 0);

        // P1 activity moves neither the global pool nor P2's snapshot
        ledger.add_member("P1", "alice").await.unwrap();
        ledger.check_out("P1", "A", 30, "alice").await.unwrap();
        ledger.check_in("P1", "A", 12, "alice").await.unwrap();

        assert_eq!(registry.hardware_set("A").await.unwrap().availability, 0);
        let p1 = ledger.project("P1").await.unwrap();
        let p2 = ledger.project("P2").await.unwrap();
        assert_eq!(p1.reservations["A"].capacity, 30);
        assert_eq!(p2.reservations["A"].capacity, 70);
        assert_eq!(p2.reservations["A"].used, 0);
    }

    #[tokio::test]
    async fn test_failed_creation_leaves_registry_unchanged() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("HWSet1", 100).await.unwrap();
        registry.create_hardware_set("HWSet2", 5).await.unwrap();

        let err = ledger
            .create_project("Proj", "", &requested(&[("HWSet1", 50), ("HWSet2", 6)]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReservationsRejected { .. }));

        assert_eq!(
            registry.hardware_set("HWSet1").await.unwrap().availability,
            100
        );
        assert_eq!(
            registry.hardware_set("HWSet2").await.unwrap().availability,
            5
        );
        assert!(ledger.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_capacity_reservation_is_allowed() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("HWSet1", 10).await.unwrap();

        let project = ledger
            .create_project("Proj", "", &requested(&[("HWSet1", 0)]))
            .await
            .unwrap();
        assert_eq!(project.reservations["HWSet1"].capacity, 0);
        assert_eq!(registry.hardware_set("HWSet1").await.unwrap().availability, 10);

        // Nothing can ever be checked out of it
        ledger.add_member("Proj", "alice").await.unwrap();
        let err = ledger.check_out("Proj", "HWSet1", 1, "alice").await.unwrap_err();
        assert!(matches!(err, Error::InsufficientAvailability { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_checkouts_respect_capacity() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("HWSet1", 1000).await.unwrap();
        ledger
            .create_project("Proj", "", &requested(&[("HWSet1", 25)]))
            .await
            .unwrap();
        for user in ["u0", "u1", "u2", "u3"] {
            ledger.add_member("Proj", user).await.unwrap();
        }

        // 40 concurrent single-unit checkouts against a reservation of 25
        let mut handles = Vec::new();
        for i in 0..40 {
            let ledger = ledger.clone();
            let user = format!("u{}", i % 4);
            handles.push(tokio::spawn(async move {
                ledger.check_out("Proj", "HWSet1", 1, &user).await.is_ok()
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 25);

        let project = ledger.project("Proj").await.unwrap();
        let reservation = &project.reservations["HWSet1"];
        assert_eq!(reservation.used, 25);
        let total: u64 = reservation.user_usage.values().sum();
        assert_eq!(total, reservation.used);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_mixed_traffic_keeps_invariants() {
        let (registry, ledger) = fixture();
        registry.create_hardware_set("HWSet1", 100).await.unwrap();
        ledger
            .create_project("Proj", "", &requested(&[("HWSet1", 50)]))
            .await
            .unwrap();
        ledger.add_member("Proj", "alice").await.unwrap();
        ledger.add_member("Proj", "bob").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..60 {
            let ledger = ledger.clone();
            let user = if i % 2 == 0 { "alice" } else { "bob" };
            handles.push(tokio::spawn(async move {
                if i % 3 == 0 {
                    let _ = ledger.check_in("Proj", "HWSet1", 2, user).await;
                } else {
                    let _ = ledger.check_out("Proj", "HWSet1", 3, user).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let project = ledger.project("Proj").await.unwrap();
        let reservation = &project.reservations["HWSet1"];
        assert!(reservation.used <= reservation.capacity);
        let total: u64 = reservation.user_usage.values().sum();
        assert_eq!(total, reservation.used);
        assert!(reservation.user_usage.values().all(|held| *held > 0));
    }
}
