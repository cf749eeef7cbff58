use crate::auth::AuthActor;
use crate::routes::error::{ErrorEnvelope, map_error};
use crate::routes::requests::PageQuery;
use crate::{AppState, build_civiq};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cq_core::Actor;
use cq_core::types::ids::{RequestId, UserId};
use cq_core::types::io::{
    AdminUpdateRequestInput, CsvExport, PagedResult, RequestDetail, RequestFilter, RequestStats,
};
use cq_core::types::Request;
use utoipa::ToSchema;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct AssignInput {
    assigned_to: Option<UserId>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/requests", get(list_requests))
        .route("/admin/requests/export", get(export_requests))
        .route("/admin/requests/stats", get(request_stats))
        .route(
            "/admin/requests/{id}",
            get(request_detail)
                .patch(patch_request)
                .delete(delete_request),
        )
        .route("/requests/{id}/assign", post(assign_request))
        .route("/requests/{id}/resolve", post(resolve_request))
        .route("/requests/{id}/reject", post(reject_request))
        .route("/requests/{id}/reopen", post(reopen_request))
        .route("/admin/requests/{id}/restore", post(restore_request))
        .with_state(state)
}

pub(crate) fn require_staff(actor: &Actor) -> Result<(), Response> {
    if actor.is_staff() {
        return Ok(());
    }
    Err((
        StatusCode::FORBIDDEN,
        Json(ErrorEnvelope {
            code: "forbidden",
            message: "staff only".to_string(),
        }),
    )
        .into_response())
}

pub(crate) fn csv_response(export: CsvExport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    (
        [
            (header::CONTENT_TYPE, cq_core::csv::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/admin/requests",
    params(RequestFilter, PageQuery),
    responses((status = 200, body = PagedResult<Request>))
)]
pub(crate) async fn list_requests(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(filter): Query<RequestFilter>,
    Query(page): Query<PageQuery>,
) -> Response {
    if let Err(response) = require_staff(&actor) {
        return response;
    }
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().list(&filter, page.to_page()) {
        Ok(result) => Json(result).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = RequestDetail))
)]
pub(crate) async fn request_detail(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
    if let Err(response) = require_staff(&actor) {
        return response;
    }
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().admin_get(&id) {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/admin/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    request_body = AdminUpdateRequestInput,
    responses((status = 204))
)]
pub(crate) async fn patch_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
    Json(input): Json<AdminUpdateRequestInput>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().admin_update(&actor, &id, input) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 204))
)]
pub(crate) async fn delete_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
    if let Err(response) = require_staff(&actor) {
        return response;
    }
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().soft_delete(&actor, &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/assign",
    params(("id" = String, Path, description = "Request ID")),
    request_body = AssignInput,
    responses((status = 204))
)]
pub(crate) async fn assign_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
    Json(input): Json<AssignInput>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().assign(&actor, &id, input.assigned_to) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/resolve",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 204))
)]
pub(crate) async fn resolve_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().resolve(&actor, &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/reject",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 204))
)]
pub(crate) async fn reject_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().reject(&actor, &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/reopen",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 204))
)]
pub(crate) async fn reopen_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().reopen(&actor, &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/requests/{id}/restore",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 204))
)]
pub(crate) async fn restore_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().restore(&actor, &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/requests/export",
    params(RequestFilter),
    responses((status = 200, description = "CSV export"))
)]
pub(crate) async fn export_requests(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(filter): Query<RequestFilter>,
) -> Response {
    if let Err(response) = require_staff(&actor) {
        return response;
    }
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().export_csv(&filter) {
        Ok(export) => csv_response(export),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/requests/stats",
    responses((status = 200, body = RequestStats))
)]
pub(crate) async fn request_stats(
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
    match civiq.requests().stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}
