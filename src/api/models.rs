//! API request/response models for the inventory service.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::{HardwareSet, Project, Reservation};

/// Request body for provisioning a new hardware set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HardwareSetCreate {
    /// Unique name for the set
    #[schema(example = "HWSet1")]
    pub name: String,
    /// Total number of units provisioned; availability starts equal to this
    #[schema(example = 100)]
    pub capacity: u64,
}

/// Hardware set details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HardwareSetResponse {
    /// Unique name of the set
    pub name: String,
    /// Total units ever provisioned
    pub capacity: u64,
    /// Units not currently reserved by any project
    pub availability: u64,
    /// When the set was provisioned
    pub created_at: DateTime<Utc>,
}

impl From<HardwareSet> for HardwareSetResponse {
    fn from(set: HardwareSet) -> Self {
        Self {
            name: set.name,
            capacity: set.capacity,
            availability: set.availability,
            created_at: set.created_at,
        }
    }
}

/// Request body for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectCreate {
    /// Unique name for the project
    #[schema(example = "Proj")]
    pub name: String,
    /// Free-text description
    #[serde(default)]
    #[schema(example = "Sensor lab experiments")]
    pub description: String,
    /// Units to reserve from each named hardware set
    #[serde(default)]
    pub hardware: BTreeMap<String, u64>,
}

/// One reservation inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationResponse {
    /// Units reserved from the global pool at project creation
    pub capacity: u64,
    /// Units currently checked out by project members
    pub used: u64,
    /// Units still available to check out
    pub available: u64,
    /// Units held per member
    pub user_usage: HashMap<String, u64>,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            capacity: reservation.capacity,
            used: reservation.used,
            available: reservation.available(),
            user_usage: reservation.user_usage,
        }
    }
}

/// Full project details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    /// Unique name of the project
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Reservations keyed by hardware-set name
    pub reservations: BTreeMap<String, ReservationResponse>,
    /// Member roster in join order
    pub members: Vec<String>,
    /// When the project was created
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            name: project.name,
            description: project.description,
            reservations: project
                .reservations
                .into_iter()
                .map(|(name, reservation)| (name, reservation.into()))
                .collect(),
            members: project.members,
            created_at: project.created_at,
        }
    }
}

/// Request body for adding a member to a project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberAdd {
    /// User identifier to add to the roster
    #[schema(example = "alice")]
    pub user: String,
}

/// Request body for checkout and check-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuantityRequest {
    /// User performing the operation; must be a project member
    #[schema(example = "alice")]
    pub user: String,
    /// Units to move
    #[schema(example = 10)]
    pub quantity: u64,
}

/// Outcome of a checkout or check-in.
///
/// Check-in is capped at what the user holds, so `processed` can be lower
/// than `requested`; checkout is all-or-nothing and the two are always equal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessedResponse {
    /// Units the caller asked for
    pub requested: u64,
    /// Units actually moved
    pub processed: u64,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable reason
    pub message: String,
}
