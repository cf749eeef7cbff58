use crate::types::enums::{AssistKind, AssistStatus};
use crate::types::ids::{AssistId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A neighborly-assist ticket: structurally parallel to `Request` but with a
/// simpler two-operation lifecycle (assign, change-status).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssistTicket {
    pub id: AssistId,
    pub kind: AssistKind,
    pub status: AssistStatus,
    pub created_by: UserId,
    pub elder_name: String,
    pub elder_phone: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub assigned_to: Option<UserId>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssistTicket {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        created_by: UserId,
        kind: AssistKind,
        elder_name: String,
        elder_phone: Option<String>,
        address: String,
        latitude: f64,
        longitude: f64,
        scheduled_at: Option<DateTime<Utc>>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AssistId::generate(),
            kind,
            status: AssistStatus::Open,
            created_by,
            elder_name,
            elder_phone,
            address,
            latitude,
            longitude,
            assigned_to: None,
            scheduled_at,
            notes,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn assign(&mut self, user: UserId) {
        self.assigned_to = Some(user);
        self.status = AssistStatus::Assigned;
        self.updated_at = Utc::now();
    }

    /// Changes status; a non-empty reason is appended to the notes on its own
    /// line so the history of decisions stays on the ticket.
    pub fn change_status(&mut self, status: AssistStatus, reason: Option<&str>) {
        self.status = status;
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            self.notes = match self.notes.take() {
                Some(notes) if !notes.trim().is_empty() => Some(format!("{notes}\n{reason}")),
                _ => Some(reason.to_string()),
            };
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AssistTicket {
        AssistTicket::new(
            UserId::generate(),
            AssistKind::Grocery,
            "Ayse Yilmaz".to_string(),
            None,
            "12 Elm Street".to_string(),
            41.0,
            29.0,
            None,
            None,
        )
    }

    #[test]
    fn change_status_appends_reason_to_notes() {
        let mut t = sample();
        t.change_status(AssistStatus::Canceled, Some("duplicate ticket"));
        assert_eq!(t.status, AssistStatus::Canceled);
        assert_eq!(t.notes.as_deref(), Some("duplicate ticket"));

        t.change_status(AssistStatus::Open, Some("reopened by admin"));
        assert_eq!(t.notes.as_deref(), Some("duplicate ticket\nreopened by admin"));
    }

    #[test]
    fn blank_reason_leaves_notes_untouched() {
        let mut t = sample();
        t.change_status(AssistStatus::Resolved, Some("  "));
        assert!(t.notes.is_none());
    }
}
