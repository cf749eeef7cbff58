use crate::auth::AuthActor;
use crate::routes::admin::{csv_response, require_staff};
use crate::routes::error::map_error;
use crate::routes::requests::PageQuery;
use crate::{AppState, build_civiq};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cq_core::types::AssistTicket;
use cq_core::types::enums::AssistStatus;
use cq_core::types::ids::{AssistId, UserId};
use cq_core::types::io::{AssistFilter, AssistStats, CreateAssistInput, PagedResult};
use utoipa::ToSchema;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct AssistAssignInput {
    assigned_to: UserId,
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct AssistStatusInput {
    status: AssistStatus,
    reason: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/assists", post(create_assist))
        .route("/assists/mine", get(my_assists))
        .route("/assists/{id}", get(get_assist))
        .route("/admin/assists", get(list_assists))
        .route("/admin/assists/export", get(export_assists))
        .route("/admin/assists/stats", get(assist_stats))
        .route("/admin/assists/{id}/assign", post(assign_assist))
        .route("/admin/assists/{id}/status", post(set_assist_status))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/assists",
    request_body = CreateAssistInput,
    responses((status = 200, body = AssistTicket))
)]
pub(crate) async fn create_assist(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Json(input): Json<CreateAssistInput>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.assists().create(&actor, input) {
        Ok(ticket) => Json(ticket).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/assists/mine",
    params(PageQuery),
    responses((status = 200, body = PagedResult<AssistTicket>))
)]
pub(crate) async fn my_assists(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(page): Query<PageQuery>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.assists().mine(&actor, page.to_page()) {
        Ok(result) => Json(result).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/assists/{id}",
    params(("id" = String, Path, description = "Assist ticket ID")),
    responses((status = 200, body = AssistTicket))
)]
pub(crate) async fn get_assist(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<AssistId>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.assists().get(&actor, &id) {
        Ok(ticket) => Json(ticket).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/assists",
    params(AssistFilter, PageQuery),
    responses((status = 200, body = PagedResult<AssistTicket>))
)]
pub(crate) async fn list_assists(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(filter): Query<AssistFilter>,
    Query(page): Query<PageQuery>,
) -> Response {
    if let Err(response) = require_staff(&actor) {
        return response;
    }
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.assists().list(&filter, page.to_page()) {
        Ok(result) => Json(result).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/assists/{id}/assign",
    params(("id" = String, Path, description = "Assist ticket ID")),
    request_body = AssistAssignInput,
    responses((status = 204))
)]
pub(crate) async fn assign_assist(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<AssistId>,
    Json(input): Json<AssistAssignInput>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.assists().assign(&actor, &id, input.assigned_to) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/assists/{id}/status",
    params(("id" = String, Path, description = "Assist ticket ID")),
    request_body = AssistStatusInput,
    responses((status = 204))
)]
pub(crate) async fn set_assist_status(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<AssistId>,
    Json(input): Json<AssistStatusInput>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq
        .assists()
        .change_status(&actor, &id, input.status, input.reason.as_deref())
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/assists/export",
    params(AssistFilter),
    responses((status = 200, description = "CSV export"))
)]
pub(crate) async fn export_assists(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(filter): Query<AssistFilter>,
) -> Response {
    if let Err(response) = require_staff(&actor) {
        return response;
    }
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.assists().export_csv(&filter) {
        Ok(export) => csv_response(export),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/assists/stats",
    responses((status = 200, body = AssistStats))
)]
pub(crate) async fn assist_stats(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
) -> Response {
    if let Err(response) = require_staff(&actor) {
        return response;
    }
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.assists().stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}
