//! Shared hardware inventory tracking for collaborative projects.
//!
//! This crate tracks a fixed global pool of named hardware sets, each
//! subdivided into per-project reservations, further tracked per-user
//! within a project:
//! - The **registry** owns the global catalog and each set's availability
//! - The **ledger** owns projects: reservations are debited from the
//!   registry once at creation time (two-phase, all-or-nothing), then
//!   checkout and check-in move units inside the project's own pool
//! - A **store** trait carries the atomic persistence operations; the
//!   bundled backend is in-memory
//! - A thin axum layer in [`api`] maps the operations onto HTTP
//!
//! # Example
//! ```ignore
//! use toolcrib::{InMemoryStore, Ledger, Registry};
//!
//! let store = InMemoryStore::new();
//! let registry = Registry::new(store.clone());
//! let ledger = Ledger::new(store);
//!
//! registry.create_hardware_set("HWSet1", 100).await?;
//! ledger.create_project("Proj", "demo", &reservations).await?;
//! ledger.add_member("Proj", "alice").await?;
//! let processed = ledger.check_out("Proj", "HWSet1", 10, "alice").await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use registry::Registry;
pub use store::in_memory::InMemoryStore;
pub use store::Store;
pub use types::{HardwareSet, Project, Reservation};
