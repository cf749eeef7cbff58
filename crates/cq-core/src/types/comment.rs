use crate::types::enums::CommentKind;
use crate::types::ids::{CommentId, RequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A threaded comment on a request. System notes are synthesized on staff
/// status transitions; user comments come from the API. Never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: CommentId,
    pub request_id: RequestId,
    pub author: UserId,
    pub kind: CommentKind,
    pub text: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn user(request_id: RequestId, author: UserId, text: String) -> Self {
        Self::new(request_id, author, text, CommentKind::UserComment)
    }

    pub fn system_note(request_id: RequestId, author: UserId, text: String) -> Self {
        Self::new(request_id, author, text, CommentKind::SystemNote)
    }

    fn new(request_id: RequestId, author: UserId, text: String, kind: CommentKind) -> Self {
        Self {
            id: CommentId::generate(),
            request_id,
            author,
            kind,
            text,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }
}
