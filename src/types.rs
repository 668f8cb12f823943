//! Domain records for the inventory system.
//!
//! The capacity arithmetic lives here as methods on the records themselves:
//! [`HardwareSet::debit`] for global-pool reservation,
//! [`Reservation::check_out`] and [`Reservation::check_in`] for the
//! per-project accounting. Storage implementations provide the atomic
//! envelope around these transitions but never reimplement them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A named pool of interchangeable hardware units.
///
/// `availability` counts the units not yet reserved by any project. It is
/// debited at project-creation time only; checkout and check-in operate on
/// project-local reservations and never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSet {
    /// Unique name of the set
    pub name: String,
    /// Total units ever provisioned (immutable after creation)
    pub capacity: u64,
    /// Units not currently reserved by any project
    pub availability: u64,
    /// When the set was provisioned
    pub created_at: DateTime<Utc>,
}

impl HardwareSet {
    /// Create a new set with its full capacity available.
    pub fn new(name: impl Into<String>, capacity: u64) -> Self {
        Self {
            name: name.into(),
            capacity,
            availability: capacity,
            created_at: Utc::now(),
        }
    }

    /// Overwrite availability, clamped into `[0, capacity]`.
    ///
    /// Returns the value actually written, which callers must not assume
    /// equals what they requested.
    pub fn set_availability(&mut self, requested: u64) -> u64 {
        self.availability = requested.min(self.capacity);
        self.availability
    }

    /// Remove `qty` units from availability for a project reservation.
    pub fn debit(&mut self, qty: u64) -> Result<()> {
        if qty > self.availability {
            return Err(Error::InsufficientAvailability {
                hardware: self.name.clone(),
                requested: qty,
                available: self.availability,
            });
        }
        self.availability -= qty;
        Ok(())
    }
}

/// The portion of one hardware set's capacity earmarked for a single project.
///
/// Invariants: `used <= capacity`, `sum(user_usage.values()) == used`, and
/// no zero-valued `user_usage` entry persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Units reserved from the global pool at project creation (immutable)
    pub capacity: u64,
    /// Units currently checked out by project members
    pub used: u64,
    /// Units held per member
    #[serde(default)]
    pub user_usage: HashMap<String, u64>,
}

impl Reservation {
    /// A fresh, unused reservation of `capacity` units.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            used: 0,
            user_usage: HashMap::new(),
        }
    }

    /// Units still available to check out.
    pub fn available(&self) -> u64 {
        self.capacity - self.used
    }

    /// Units `user` currently holds.
    pub fn held_by(&self, user: &str) -> u64 {
        self.user_usage.get(user).copied().unwrap_or(0)
    }

    /// Check out `qty` units for `user`.
    ///
    /// All-or-nothing: a request beyond the remaining pool fails without any
    /// state change. Returns the processed quantity, always `qty` on success.
    pub fn check_out(&mut self, hardware: &str, user: &str, qty: u64) -> Result<u64> {
        if qty > self.available() {
            return Err(Error::InsufficientAvailability {
                hardware: hardware.to_string(),
                requested: qty,
                available: self.available(),
            });
        }
        self.used += qty;
        *self.user_usage.entry(user.to_string()).or_insert(0) += qty;
        Ok(qty)
    }

    /// Check `qty` units back in for `user`.
    ///
    /// Capped, not rejected, when `qty` exceeds what the user holds. Returns
    /// the processed quantity, which may be less than requested. The user's
    /// usage entry is removed entirely once it reaches zero.
    pub fn check_in(&mut self, hardware: &str, user: &str, qty: u64) -> Result<u64> {
        let held = self.held_by(user);
        if held == 0 {
            return Err(Error::NothingCheckedOut {
                user: user.to_string(),
                hardware: hardware.to_string(),
            });
        }

        let processed = qty.min(held);
        self.used -= processed;
        if held - processed == 0 {
            self.user_usage.remove(user);
        } else {
            self.user_usage.insert(user.to_string(), held - processed);
        }
        Ok(processed)
    }
}

/// A collaborative project: a fixed set of reservations drawn from the
/// global pool at creation time, plus the roster of users allowed to
/// operate on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique name of the project
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Reservations keyed by hardware-set name
    pub reservations: HashMap<String, Reservation>,
    /// Member roster, insertion order, no duplicates
    pub members: Vec<String>,
    /// When the project was created
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// A new project with no reservations and an empty roster.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            reservations: HashMap::new(),
            members: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_member(&self, user: &str) -> bool {
        self.members.iter().any(|m| m == user)
    }

    /// Append `user` to the roster.
    pub fn add_member(&mut self, user: &str) -> Result<()> {
        if self.is_member(user) {
            return Err(Error::AlreadyMember {
                project: self.name.clone(),
                user: user.to_string(),
            });
        }
        self.members.push(user.to_string());
        Ok(())
    }

    /// Mutable handle on the reservation for `hardware`, if this project
    /// holds one.
    pub fn reservation_mut(&mut self, hardware: &str) -> Result<&mut Reservation> {
        let project = self.name.clone();
        self.reservations
            .get_mut(hardware)
            .ok_or_else(|| Error::HardwareNotInProject {
                project,
                hardware: hardware.to_string(),
            })
    }
}
