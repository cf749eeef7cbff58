use crate::types::ids::{AttachmentId, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An uploaded image attached to a request. The record exists only after the
/// bytes were persisted by the file-storage collaborator; deletion removes
/// the record even when the backing file could not be cleaned up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    pub id: AttachmentId,
    pub request_id: RequestId,
    pub stored_name: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn new(
        request_id: RequestId,
        stored_name: String,
        original_name: String,
        content_type: String,
        size_bytes: u64,
        url: String,
    ) -> Self {
        Self {
            id: AttachmentId::generate(),
            request_id,
            stored_name,
            original_name,
            content_type,
            size_bytes,
            url,
            created_at: Utc::now(),
        }
    }
}
