use crate::geo::GeoPoint;
use crate::types::enums::RequestStatus;
use crate::types::ids::{CategoryId, RequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A citizen-submitted service request.
///
/// Status, assignment, and the deleted flag change only through the methods
/// below; the stored `location` always mirrors `latitude`/`longitude`.
/// The status graph is deliberately open: any status is reachable from any
/// other through the corresponding operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Request {
    pub id: RequestId,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub status: RequestStatus,
    pub created_by: UserId,
    pub assigned_to: Option<UserId>,
    pub latitude: f64,
    pub longitude: f64,
    pub location: Option<GeoPoint>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Request {
    pub fn new(
        created_by: UserId,
        title: String,
        description: Option<String>,
        category_id: Option<CategoryId>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RequestId::generate(),
            title,
            description,
            category_id,
            status: RequestStatus::Open,
            created_by,
            assigned_to: None,
            latitude,
            longitude,
            location: Some(GeoPoint::new(latitude, longitude)),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn assign_to(&mut self, user: Option<UserId>) {
        self.assigned_to = user;
        self.status = RequestStatus::Assigned;
        self.touch();
    }

    pub fn resolve(&mut self) {
        self.status = RequestStatus::Resolved;
        self.touch();
    }

    pub fn reject(&mut self) {
        self.status = RequestStatus::Rejected;
        self.touch();
    }

    pub fn reopen(&mut self) {
        self.status = RequestStatus::Open;
        self.touch();
    }

    pub fn apply_update(
        &mut self,
        title: String,
        description: Option<String>,
        category_id: Option<CategoryId>,
    ) {
        self.title = title;
        self.description = description;
        self.category_id = category_id;
        self.touch();
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.touch();
    }

    pub fn restore(&mut self) {
        self.is_deleted = false;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Request {
        Request::new(
            UserId::generate(),
            "Broken street light".to_string(),
            None,
            None,
            41.0,
            29.0,
        )
    }

    #[test]
    fn new_request_starts_open_with_location() {
        let r = sample();
        assert_eq!(r.status, RequestStatus::Open);
        assert!(!r.is_deleted);
        let loc = r.location.unwrap();
        assert_eq!(loc.latitude, r.latitude);
        assert_eq!(loc.longitude, r.longitude);
    }

    #[test]
    fn resolve_wins_from_any_status() {
        let mut r = sample();
        r.reject();
        r.resolve();
        assert_eq!(r.status, RequestStatus::Resolved);
        r.reopen();
        assert_eq!(r.status, RequestStatus::Open);
    }

    #[test]
    fn assign_sets_assignee_and_status() {
        let mut r = sample();
        let op = UserId::generate();
        r.assign_to(Some(op.clone()));
        assert_eq!(r.status, RequestStatus::Assigned);
        assert_eq!(r.assigned_to, Some(op));
    }
}
