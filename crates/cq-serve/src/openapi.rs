use utoipa::OpenApi;

use crate::routes::admin::AssignInput;
use crate::routes::assists::{AssistAssignInput, AssistStatusInput};
use crate::routes::error::ErrorEnvelope;
use crate::routes::requests::{CommentInput, MineQuery, NearbyParams, PageQuery};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use cq_core::geo::GeoPoint;
use cq_core::types::enums::{AssistKind, AssistStatus, CommentKind, RequestStatus, Role};
use cq_core::types::ids::{
    AssistId, AttachmentId, CategoryId, CommentId, RequestId, UserId,
};
use cq_core::types::io::{
    AdminUpdateRequestInput, AssistFilter, AssistStats, CategoryCount, CreateAssistInput,
    CreateRequestInput, DailyCount, KindCount, NearbyRequest, RequestDetail, RequestFilter,
    RequestStats, UpdateRequestInput,
};
use cq_core::types::{AssistTicket, Attachment, Comment, Request};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::requests::create_request,
        crate::routes::requests::list_requests,
        crate::routes::requests::my_requests,
        crate::routes::requests::nearby,
        crate::routes::requests::get_request,
        crate::routes::requests::update_request,
        crate::routes::requests::delete_request,
        crate::routes::requests::add_comment,
        crate::routes::requests::list_comments,
        crate::routes::requests::delete_comment,
        crate::routes::requests::upload_attachment,
        crate::routes::requests::list_attachments,
        crate::routes::requests::delete_attachment,
        crate::routes::admin::list_requests,
        crate::routes::admin::request_detail,
        crate::routes::admin::patch_request,
        crate::routes::admin::delete_request,
        crate::routes::admin::assign_request,
        crate::routes::admin::resolve_request,
        crate::routes::admin::reject_request,
        crate::routes::admin::reopen_request,
        crate::routes::admin::restore_request,
        crate::routes::admin::export_requests,
        crate::routes::admin::request_stats,
        crate::routes::assists::create_assist,
        crate::routes::assists::my_assists,
        crate::routes::assists::get_assist,
        crate::routes::assists::list_assists,
        crate::routes::assists::assign_assist,
        crate::routes::assists::set_assist_status,
        crate::routes::assists::export_assists,
        crate::routes::assists::assist_stats,
    ),
    components(schemas(
        Request,
        Comment,
        Attachment,
        AssistTicket,
        GeoPoint,
        RequestDetail,
        NearbyRequest,
        RequestStats,
        AssistStats,
        CategoryCount,
        KindCount,
        DailyCount,
        CreateRequestInput,
        UpdateRequestInput,
        AdminUpdateRequestInput,
        CreateAssistInput,
        RequestFilter,
        AssistFilter,
        CommentInput,
        AssignInput,
        AssistAssignInput,
        AssistStatusInput,
        PageQuery,
        MineQuery,
        NearbyParams,
        ErrorEnvelope,
        RequestId,
        CommentId,
        AttachmentId,
        AssistId,
        UserId,
        CategoryId,
        RequestStatus,
        CommentKind,
        AssistStatus,
        AssistKind,
        Role
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Civiq API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#;
    (axum::http::StatusCode::OK, axum::response::Html(html))
}
