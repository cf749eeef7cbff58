use crate::error::AttachmentError;
use crate::types::attachment::Attachment;
use crate::types::ids::{AttachmentId, RequestId};

pub trait AttachmentRepository {
    fn insert(&self, attachment: &Attachment) -> Result<(), AttachmentError>;
    fn get(&self, id: &AttachmentId) -> Result<Option<Attachment>, AttachmentError>;
    /// Hard delete; the backing file is handled separately by the caller.
    fn delete(&self, id: &AttachmentId) -> Result<(), AttachmentError>;
    /// Attachments of a request, newest first.
    fn list_for_request(&self, request_id: &RequestId) -> Result<Vec<Attachment>, AttachmentError>;
}
