use crate::types::attachment::Attachment;
use crate::types::comment::Comment;
use crate::types::enums::{AssistKind, AssistStatus, RequestStatus};
use crate::types::ids::{CategoryId, UserId};
use crate::types::request::Request;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateRequestInput {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpdateRequestInput {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// Admin patch: either field may be absent; present fields are applied
/// through the aggregate's own transition methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminUpdateRequestInput {
    pub status: Option<RequestStatus>,
    pub assigned_to: Option<UserId>,
}

/// Optional conjunctive predicates over non-deleted requests. Absent fields
/// are omitted from the query, not evaluated as always-true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub category_id: Option<CategoryId>,
    pub created_by: Option<UserId>,
    pub assigned_to: Option<UserId>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// Substring match over title/description.
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateAssistInput {
    pub kind: AssistKind,
    pub elder_name: String,
    pub elder_phone: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct AssistFilter {
    pub status: Option<AssistStatus>,
    pub kind: Option<AssistKind>,
    pub created_by: Option<UserId>,
    pub assigned_to: Option<UserId>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// Substring match over elder name/address.
    pub search: Option<String>,
}

/// 1-indexed page slice. Out-of-range values are normalized, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub const DEFAULT_SIZE: u32 = 20;

    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, page: Page, total_count: u64) -> Self {
        Self {
            items,
            page: page.page,
            page_size: page.page_size,
            total_count,
            total_pages: total_count.div_ceil(u64::from(page.page_size)),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub category_id: Option<CategoryId>,
    pub page: Page,
}

/// A proximity hit: the request plus its great-circle distance from the
/// query point, in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NearbyRequest {
    #[serde(flatten)]
    pub request: Request,
    pub distance_m: f64,
}

/// Admin detail view: the request with its visible comments (oldest first)
/// and attachments (newest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestDetail {
    pub request: Request,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    pub category_id: CategoryId,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KindCount {
    pub kind: AssistKind,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestStats {
    pub total: u64,
    pub by_status: Vec<StatusCount<RequestStatus>>,
    pub top_categories: Vec<CategoryCount>,
    pub last_7_days: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssistStats {
    pub total: u64,
    pub by_status: Vec<StatusCount<AssistStatus>>,
    pub top_kinds: Vec<KindCount>,
    pub last_7_days: Vec<DailyCount>,
}

/// A rendered CSV export plus the download metadata callers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_normalizes_zero_values() {
        let p = Page::new(0, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn paged_result_rounds_pages_up() {
        let r = PagedResult::new(vec![1, 2, 3], Page::new(1, 3), 7);
        assert_eq!(r.total_pages, 3);
        let empty: PagedResult<i32> = PagedResult::new(vec![], Page::new(5, 3), 7);
        assert_eq!(empty.total_count, 7);
        assert!(empty.items.is_empty());
    }
}
