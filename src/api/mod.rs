//! HTTP layer for the inventory service.
//!
//! Thin mapping from transport to the core operations: handlers parse the
//! request, call the registry or ledger, and serialize the result. All
//! allocation rules live below this layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::error::Error;
use crate::ledger::Ledger;
use crate::registry::Registry;
use crate::store::in_memory::InMemoryStore;

pub mod handlers;
pub mod models;


use models::ErrorBody;

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry<InMemoryStore>,
    pub ledger: Ledger<InMemoryStore>,
}

impl AppState {
    /// State backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            registry: Registry::new(store.clone()),
            ledger: Ledger::new(store),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "toolcrib",
        description = "Shared hardware inventory: global pools, per-project reservations, per-user checkout accounting"
    ),
    paths(
        handlers::create_hardware_set,
        handlers::list_hardware_sets,
        handlers::get_hardware_set,
        handlers::create_project,
        handlers::list_projects,
        handlers::get_project,
        handlers::add_member,
        handlers::check_out,
        handlers::check_in,
    ),
    components(
        schemas(
            models::HardwareSetCreate,
            models::HardwareSetResponse,
            models::ProjectCreate,
            models::ProjectResponse,
            models::ReservationResponse,
            models::MemberAdd,
            models::QuantityRequest,
            models::ProcessedResponse,
            models::ErrorBody,
        )
    ),
    tags(
        (name = "hardware", description = "Global hardware catalog"),
        (name = "projects", description = "Projects and membership"),
        (name = "usage", description = "Checkout and check-in accounting"),
    )
)]
struct ApiDoc;

impl Error {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::HardwareSetNotFound(_)
            | Error::ProjectNotFound(_)
            | Error::NotAMember { .. }
            | Error::HardwareNotInProject { .. } => StatusCode::NOT_FOUND,
            Error::HardwareSetExists(_) | Error::ProjectExists(_) | Error::AlreadyMember { .. } => {
                StatusCode::CONFLICT
            }
            Error::InsufficientAvailability { .. }
            | Error::ReservationsRejected { .. }
            | Error::NothingCheckedOut { .. }
            | Error::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::HardwareSetExists(_)
            | Error::ProjectExists(_)
            | Error::AlreadyMember { .. } => {
                tracing::warn!("conflict: {self}");
            }
            Error::ReservationsRejected { .. } => {
                tracing::warn!("project creation rejected: {self}");
            }
            _ => {
                tracing::debug!("client error: {self}");
            }
        }

        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/openapi.json", get(openapi))
        .route(
            "/api/v1/hardware",
            post(handlers::create_hardware_set).get(handlers::list_hardware_sets),
        )
        .route("/api/v1/hardware/{name}", get(handlers::get_hardware_set))
        .route(
            "/api/v1/projects",
            post(handlers::create_project).get(handlers::list_projects),
        )
        .route("/api/v1/projects/{name}", get(handlers::get_project))
        .route(
            "/api/v1/projects/{name}/members",
            post(handlers::add_member),
        )
        .route(
            "/api/v1/projects/{name}/hardware/{hardware}/checkout",
            post(handlers::check_out),
        )
        .route(
            "/api/v1/projects/{name}/hardware/{hardware}/checkin",
            post(handlers::check_in),
        )
        .layer(TraceLayer::new_for_http())
        // Browser clients are served from a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
