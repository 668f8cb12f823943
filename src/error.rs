use thiserror::Error;

/// Result type for inventory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the inventory system.
///
/// Every failed operation leaves all state unchanged; errors are reported
/// synchronously and never retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Duplicate hardware set name on provisioning
    #[error("hardware set '{0}' already exists")]
    HardwareSetExists(String),

    /// Hardware set missing from the global catalog
    #[error("hardware set '{0}' not found")]
    HardwareSetNotFound(String),

    /// Duplicate project name on creation
    #[error("project '{0}' already exists")]
    ProjectExists(String),

    /// Project missing from the ledger
    #[error("project '{0}' not found")]
    ProjectNotFound(String),

    /// Operating user is not on the project roster
    #[error("user '{user}' is not part of project '{project}'")]
    NotAMember { project: String, user: String },

    /// User already on the project roster
    #[error("user '{user}' is already a member of project '{project}'")]
    AlreadyMember { project: String, user: String },

    /// Hardware set has no reservation in this project
    #[error("hardware set '{hardware}' not found in project '{project}'")]
    HardwareNotInProject { project: String, hardware: String },

    /// Request exceeds the remaining pool (global at creation time,
    /// reservation-local at checkout time)
    #[error("insufficient availability for '{hardware}': requested {requested}, only {available} left")]
    InsufficientAvailability {
        hardware: String,
        requested: u64,
        available: u64,
    },

    /// Check-in by a user with no units held for this set
    #[error("user '{user}' has nothing checked out for '{hardware}'")]
    NothingCheckedOut { user: String, hardware: String },

    /// Project creation rejected during the validation phase; carries every
    /// reason found, not just the first
    #[error("cannot create project: {}", .reasons.join("; "))]
    ReservationsRejected { reasons: Vec<String> },

    /// Quantity rejected before reaching the ledger
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
}
