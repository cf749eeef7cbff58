use crate::error::RequestError;
use crate::types::ids::RequestId;
use crate::types::io::{Page, PagedResult, RequestFilter};
use crate::types::request::Request;

pub trait RequestRepository {
    fn insert(&self, request: &Request) -> Result<(), RequestError>;
    /// Returns the row regardless of its deleted flag; callers decide
    /// visibility.
    fn get(&self, id: &RequestId) -> Result<Option<Request>, RequestError>;
    fn update(&self, request: &Request) -> Result<(), RequestError>;
    /// Conjunction of the supplied predicates over non-deleted rows,
    /// ordered `created_at DESC, id ASC`, sliced to `page`.
    fn list(&self, filter: &RequestFilter, page: Page)
    -> Result<PagedResult<Request>, RequestError>;
    /// Same predicate composition without the page slice (export, proximity
    /// candidates, stats).
    fn list_all(&self, filter: &RequestFilter) -> Result<Vec<Request>, RequestError>;
}
