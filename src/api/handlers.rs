//! Axum route handlers for the inventory API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::models::{
    ErrorBody, HardwareSetCreate, HardwareSetResponse, MemberAdd, ProcessedResponse,
    ProjectCreate, ProjectResponse, QuantityRequest,
};
use crate::api::AppState;
use crate::error::Result;

#[utoipa::path(
    post,
    path = "/api/v1/hardware",
    tag = "hardware",
    summary = "Provision a hardware set",
    request_body = HardwareSetCreate,
    responses(
        (status = 201, description = "Hardware set created", body = HardwareSetResponse),
        (status = 409, description = "Name already in use", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(name = %payload.name))]
pub async fn create_hardware_set(
    State(state): State<AppState>,
    Json(payload): Json<HardwareSetCreate>,
) -> Result<(StatusCode, Json<HardwareSetResponse>)> {
    let set = state
        .registry
        .create_hardware_set(&payload.name, payload.capacity)
        .await?;
    Ok((StatusCode::CREATED, Json(set.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/hardware",
    tag = "hardware",
    summary = "List hardware sets",
    responses(
        (status = 200, description = "All hardware sets", body = Vec<HardwareSetResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_hardware_sets(
    State(state): State<AppState>,
) -> Result<Json<Vec<HardwareSetResponse>>> {
    let sets = state.registry.list_hardware_sets().await?;
    Ok(Json(sets.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/hardware/{name}",
    tag = "hardware",
    summary = "Query one hardware set",
    params(("name" = String, Path, description = "Hardware set name")),
    responses(
        (status = 200, description = "Hardware set details", body = HardwareSetResponse),
        (status = 404, description = "No such hardware set", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(name = %name))]
pub async fn get_hardware_set(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<HardwareSetResponse>> {
    let set = state.registry.hardware_set(&name).await?;
    Ok(Json(set.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "projects",
    summary = "Create a project",
    description = "Reserves the requested quantity of each named hardware set from the \
                   global pool. All-or-nothing: any invalid request rejects the whole \
                   creation and leaves the pool untouched.",
    request_body = ProjectCreate,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "One or more reservation requests invalid", body = ErrorBody),
        (status = 409, description = "Name already in use", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(name = %payload.name))]
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<ProjectCreate>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .ledger
        .create_project(&payload.name, &payload.description, &payload.hardware)
        .await?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "projects",
    summary = "List projects",
    responses(
        (status = 200, description = "All projects", body = Vec<ProjectResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<ProjectResponse>>> {
    let projects = state.ledger.list_projects().await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{name}",
    tag = "projects",
    summary = "Query one project",
    params(("name" = String, Path, description = "Project name")),
    responses(
        (status = 200, description = "Project details", body = ProjectResponse),
        (status = 404, description = "No such project", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(name = %name))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ProjectResponse>> {
    let project = state.ledger.project(&name).await?;
    Ok(Json(project.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{name}/members",
    tag = "projects",
    summary = "Add a member to a project",
    params(("name" = String, Path, description = "Project name")),
    request_body = MemberAdd,
    responses(
        (status = 200, description = "Updated project", body = ProjectResponse),
        (status = 404, description = "No such project", body = ErrorBody),
        (status = 409, description = "User already a member", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(project = %name, user = %payload.user))]
pub async fn add_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<MemberAdd>,
) -> Result<Json<ProjectResponse>> {
    let project = state.ledger.add_member(&name, &payload.user).await?;
    Ok(Json(project.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{name}/hardware/{hardware}/checkout",
    tag = "usage",
    summary = "Check out units from a project's reservation",
    description = "All-or-nothing: a request beyond the reservation's remaining pool \
                   fails without any state change.",
    params(
        ("name" = String, Path, description = "Project name"),
        ("hardware" = String, Path, description = "Hardware set name"),
    ),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Units checked out", body = ProcessedResponse),
        (status = 400, description = "Quantity invalid or exceeds remaining reservation", body = ErrorBody),
        (status = 404, description = "Project, membership, or reservation missing", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(project = %name, hardware = %hardware, user = %payload.user, qty = payload.quantity))]
pub async fn check_out(
    State(state): State<AppState>,
    Path((name, hardware)): Path<(String, String)>,
    Json(payload): Json<QuantityRequest>,
) -> Result<Json<ProcessedResponse>> {
    let processed = state
        .ledger
        .check_out(&name, &hardware, payload.quantity, &payload.user)
        .await?;
    Ok(Json(ProcessedResponse {
        requested: payload.quantity,
        processed,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{name}/hardware/{hardware}/checkin",
    tag = "usage",
    summary = "Check units back into a project's reservation",
    description = "Capped at what the user holds: the processed quantity in the response \
                   can be lower than the requested one.",
    params(
        ("name" = String, Path, description = "Project name"),
        ("hardware" = String, Path, description = "Hardware set name"),
    ),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Units checked in", body = ProcessedResponse),
        (status = 400, description = "Quantity invalid or user holds nothing", body = ErrorBody),
        (status = 404, description = "Project, membership, or reservation missing", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(project = %name, hardware = %hardware, user = %payload.user, qty = payload.quantity))]
pub async fn check_in(
    State(state): State<AppState>,
    Path((name, hardware)): Path<(String, String)>,
    Json(payload): Json<QuantityRequest>,
) -> Result<Json<ProcessedResponse>> {
    let processed = state
        .ledger
        .check_in(&name, &hardware, payload.quantity, &payload.user)
        .await?;
    Ok(Json(ProcessedResponse {
        requested: payload.quantity,
        processed,
    }))
}
