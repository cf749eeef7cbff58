use crate::error::AssistError;
use crate::types::assist::AssistTicket;
use crate::types::ids::AssistId;
use crate::types::io::{AssistFilter, Page, PagedResult};

pub trait AssistRepository {
    fn insert(&self, ticket: &AssistTicket) -> Result<(), AssistError>;
    fn get(&self, id: &AssistId) -> Result<Option<AssistTicket>, AssistError>;
    fn update(&self, ticket: &AssistTicket) -> Result<(), AssistError>;
    fn list(&self, filter: &AssistFilter, page: Page)
    -> Result<PagedResult<AssistTicket>, AssistError>;
    fn list_all(&self, filter: &AssistFilter) -> Result<Vec<AssistTicket>, AssistError>;
}
