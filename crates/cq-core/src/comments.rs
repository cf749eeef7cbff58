use crate::error::CommentError;
use crate::types::comment::Comment;
use crate::types::ids::{CommentId, RequestId};
use crate::types::io::{Page, PagedResult};

pub trait CommentRepository {
    fn insert(&self, comment: &Comment) -> Result<(), CommentError>;
    fn get(&self, id: &CommentId) -> Result<Option<Comment>, CommentError>;
    fn update(&self, comment: &Comment) -> Result<(), CommentError>;
    /// Non-deleted comments of a request, newest first.
    fn list_for_request(
        &self,
        request_id: &RequestId,
        page: Page,
    ) -> Result<PagedResult<Comment>, CommentError>;
    /// Non-deleted comments oldest first, for the admin detail view.
    fn list_visible(&self, request_id: &RequestId) -> Result<Vec<Comment>, CommentError>;
}
