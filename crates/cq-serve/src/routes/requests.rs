use crate::auth::AuthActor;
use crate::routes::error::{ErrorEnvelope, map_error};
use crate::{AppState, build_civiq};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use cq_core::types::enums::RequestStatus;
use cq_core::types::ids::{AttachmentId, CategoryId, CommentId, RequestId};
use cq_core::types::io::{
    CreateRequestInput, NearbyQuery, NearbyRequest, Page, PagedResult, RequestFilter,
    UpdateRequestInput,
};
use cq_core::types::{Attachment, Comment, Request};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn to_page(&self) -> Page {
        Page::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(Page::DEFAULT_SIZE),
        )
    }
}

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct MineQuery {
    status: Option<RequestStatus>,
}

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct NearbyParams {
    latitude: f64,
    longitude: f64,
    /// Kilometers; clamped into 0.1..=20.
    radius_km: Option<f64>,
    category_id: Option<CategoryId>,
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct CommentInput {
    text: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/mine", get(my_requests))
        .route("/requests/nearby", get(nearby))
        .route(
            "/requests/{id}",
            get(get_request).put(update_request).delete(delete_request),
        )
        .route(
            "/requests/{id}/comments",
            post(add_comment).get(list_comments),
        )
        .route(
            "/requests/{id}/comments/{comment_id}",
            delete(delete_comment),
        )
        .route(
            "/requests/{id}/attachments",
            post(upload_attachment).get(list_attachments),
        )
        .route(
            "/requests/{id}/attachments/{attachment_id}",
            delete(delete_attachment),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateRequestInput,
    responses((status = 200, body = Request))
)]
pub(crate) async fn create_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Json(input): Json<CreateRequestInput>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().create(&actor, input) {
        Ok(request) => Json(request).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests",
    params(RequestFilter, PageQuery),
    responses((status = 200, body = PagedResult<Request>))
)]
pub(crate) async fn list_requests(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(filter): Query<RequestFilter>,
    Query(page): Query<PageQuery>,
) -> Response {
    // The cross-user listing is operator tooling; citizens use /requests/mine.
    if let Err(response) = crate::routes::admin::require_staff(&actor) {
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
    path = "/api/requests/mine",
    params(MineQuery, PageQuery),
    responses((status = 200, body = PagedResult<Request>))
)]
pub(crate) async fn my_requests(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(mine): Query<MineQuery>,
    Query(page): Query<PageQuery>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().mine(&actor, mine.status, page.to_page()) {
        Ok(result) => Json(result).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/nearby",
    params(NearbyParams, PageQuery),
    responses((status = 200, body = PagedResult<NearbyRequest>))
)]
pub(crate) async fn nearby(
    State(state): State<AppState>,
    AuthActor(_actor): AuthActor,
    Query(params): Query<NearbyParams>,
    Query(page): Query<PageQuery>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    let query = NearbyQuery {
        latitude: params.latitude,
        longitude: params.longitude,
        radius_km: params.radius_km.unwrap_or(1.0),
        category_id: params.category_id,
        page: page.to_page(),
    };
    match civiq.requests().search_nearby(&query) {
        Ok(result) => Json(result).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = Request))
)]
pub(crate) async fn get_request(
    State(state): State<AppState>,
    AuthActor(_actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().get(&id) {
        Ok(request) => Json(request).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    request_body = UpdateRequestInput,
    responses((status = 200, body = Request))
)]
pub(crate) async fn update_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
    Json(input): Json<UpdateRequestInput>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.requests().update(&actor, &id, input) {
        Ok(request) => Json(request).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 204))
)]
pub(crate) async fn delete_request(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
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
    path = "/api/requests/{id}/comments",
    params(("id" = String, Path, description = "Request ID")),
    request_body = CommentInput,
    responses((status = 200, body = Comment))
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<RequestId>,
    Json(input): Json<CommentInput>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.comments().add(&actor, &id, input.text) {
        Ok(comment) => Json(comment).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}/comments",
    params(("id" = String, Path, description = "Request ID"), PageQuery),
    responses((status = 200, body = PagedResult<Comment>))
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    AuthActor(_actor): AuthActor,
    Path(id): Path<RequestId>,
    Query(page): Query<PageQuery>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.comments().list(&id, page.to_page()) {
        Ok(result) => Json(result).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/requests/{id}/comments/{comment_id}",
    params(
        ("id" = String, Path, description = "Request ID"),
        ("comment_id" = String, Path, description = "Comment ID")
    ),
    responses((status = 204))
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path((id, comment_id)): Path<(RequestId, CommentId)>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.comments().delete(&actor, &id, &comment_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/attachments",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = Attachment))
)]
pub(crate) async fn upload_attachment(
    State(state): State<AppState>,
    AuthActor(_actor): AuthActor,
    Path(id): Path<RequestId>,
    mut multipart: Multipart,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return bad_multipart(err.to_string()),
        };
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return bad_multipart(err.to_string()),
        };
        return match civiq
            .attachments()
            .add(&id, &original_name, &content_type, &bytes)
        {
            Ok(attachment) => Json(attachment).into_response(),
            Err(err) => map_error(&err).into_response(),
        };
    }

    bad_multipart("missing file field".to_string())
}

fn bad_multipart(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorEnvelope {
            code: "invalid_input",
            message,
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}/attachments",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = Vec<Attachment>))
)]
pub(crate) async fn list_attachments(
    State(state): State<AppState>,
    AuthActor(_actor): AuthActor,
    Path(id): Path<RequestId>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.attachments().list(&id) {
        Ok(attachments) => Json(attachments).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/requests/{id}/attachments/{attachment_id}",
    params(
        ("id" = String, Path, description = "Request ID"),
        ("attachment_id" = String, Path, description = "Attachment ID")
    ),
    responses((status = 204))
)]
pub(crate) async fn delete_attachment(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path((id, attachment_id)): Path<(RequestId, AttachmentId)>,
) -> Response {
    let civiq = match build_civiq(&state) {
        Ok(civiq) => civiq,
        Err(err) => return map_error(&err).into_response(),
    };
    match civiq.attachments().delete(&actor, &id, &attachment_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}
