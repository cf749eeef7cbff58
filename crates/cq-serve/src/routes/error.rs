use axum::Json;
use axum::http::StatusCode;
use cq_core::error::{AssistError, AttachmentError, CiviqError, CommentError, RequestError};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
}

pub fn map_error(err: &CiviqError) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        CiviqError::Request(request) => map_request_error(request),
        CiviqError::Comment(comment) => map_comment_error(comment),
        CiviqError::Attachment(attachment) => map_attachment_error(attachment),
        CiviqError::Assist(assist) => map_assist_error(assist),
        CiviqError::Internal { message } => {
            tracing::error!(%message, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "unexpected error".to_string(),
            )
        }
    };
    (status, Json(ErrorEnvelope { code, message }))
}

fn map_request_error(err: &RequestError) -> (StatusCode, &'static str, String) {
    match err {
        RequestError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        RequestError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        RequestError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        RequestError::Storage { message } => storage_error(message),
    }
}

fn map_comment_error(err: &CommentError) -> (StatusCode, &'static str, String) {
    match err {
        CommentError::RequestNotFound | CommentError::NotFound => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        CommentError::AlreadyDeleted => (StatusCode::CONFLICT, "conflict", err.to_string()),
        CommentError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        CommentError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        CommentError::Storage { message } => storage_error(message),
    }
}

fn map_attachment_error(err: &AttachmentError) -> (StatusCode, &'static str, String) {
    match err {
        AttachmentError::RequestNotFound | AttachmentError::NotFound => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        AttachmentError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        AttachmentError::UnsupportedType { .. } | AttachmentError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        AttachmentError::File { message } | AttachmentError::Storage { message } => {
            storage_error(message)
        }
    }
}

fn map_assist_error(err: &AssistError) -> (StatusCode, &'static str, String) {
    match err {
        AssistError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        AssistError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        AssistError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        AssistError::Storage { message } => storage_error(message),
    }
}

/// Storage details stay in the logs; the client gets a generic failure.
fn storage_error(message: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(%message, "storage error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "unexpected error".to_string(),
    )
}
