use crate::assists::AssistRepository;
use crate::attachments::AttachmentRepository;
use crate::auth::{Actor, can_delete_comment, can_mutate};
use crate::comments::CommentRepository;
use crate::csv;
use crate::error::{AssistError, AttachmentError, CiviqError, CommentError, RequestError};
use crate::files::{FileStorage, extension_of, is_allowed_extension};
use crate::geo::{GeoPoint, clamp_radius_km, validate_coordinates};
use crate::requests::RequestRepository;
use crate::store::Store;
use crate::types::assist::AssistTicket;
use crate::types::attachment::Attachment;
use crate::types::comment::Comment;
use crate::types::enums::{AssistKind, AssistStatus, RequestStatus};
use crate::types::ids::{AssistId, AttachmentId, CategoryId, CommentId, RequestId, UserId};
use crate::types::request::Request;
use crate::types::io::{
    AdminUpdateRequestInput, AssistFilter, AssistStats, CategoryCount, CreateAssistInput,
    CreateRequestInput, CsvExport, DailyCount, KindCount, NearbyQuery, NearbyRequest, Page,
    PagedResult, RequestDetail, RequestFilter, RequestStats, StatusCount, UpdateRequestInput,
};
use crate::validation::{
    ORIGINAL_NAME_MAX, validate_comment_text, validate_create_assist, validate_create_request,
    validate_update_request,
};
use chrono::{Days, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// The service facade: every business operation of the tracker, grouped per
/// aggregate. One instance per inbound operation; the only shared state is
/// the backing store.
pub struct Civiq<S: Store> {
    store: S,
    files: Arc<dyn FileStorage>,
}

impl<S: Store> Civiq<S> {
    pub fn new(store: S, files: Arc<dyn FileStorage>) -> Self {
        Self { store, files }
    }

    pub fn requests(&self) -> RequestsApi<'_, S> {
        RequestsApi { core: self }
    }

    pub fn comments(&self) -> CommentsApi<'_, S> {
        CommentsApi { core: self }
    }

    pub fn attachments(&self) -> AttachmentsApi<'_, S> {
        AttachmentsApi { core: self }
    }

    pub fn assists(&self) -> AssistsApi<'_, S> {
        AssistsApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn visible_request<S: Store>(store: &S, id: &RequestId) -> Result<Request, RequestError> {
    match store.requests().get(id)? {
        Some(request) if !request.is_deleted => Ok(request),
        _ => Err(RequestError::NotFound),
    }
}

pub struct RequestsApi<'a, S: Store> {
    core: &'a Civiq<S>,
}

impl<'a, S: Store> RequestsApi<'a, S> {
    pub fn create(
        &self,
        actor: &Actor,
        input: CreateRequestInput,
    ) -> Result<Request, CiviqError> {
        validate_create_request(&input)?;
        let request = Request::new(
            actor.user_id.clone(),
            input.title,
            input.description,
            input.category_id,
            input.latitude,
            input.longitude,
        );
        self.core.store.with_tx(|store| {
            store.requests().insert(&request)?;
            Ok(())
        })?;
        Ok(request)
    }

    pub fn get(&self, id: &RequestId) -> Result<Request, CiviqError> {
        Ok(visible_request(&self.core.store, id)?)
    }

    pub fn list(
        &self,
        filter: &RequestFilter,
        page: Page,
    ) -> Result<PagedResult<Request>, CiviqError> {
        Ok(self.core.store.requests().list(filter, page)?)
    }

    pub fn mine(
        &self,
        actor: &Actor,
        status: Option<RequestStatus>,
        page: Page,
    ) -> Result<PagedResult<Request>, CiviqError> {
        let filter = RequestFilter {
            status,
            created_by: Some(actor.user_id.clone()),
            ..RequestFilter::default()
        };
        Ok(self.core.store.requests().list(&filter, page)?)
    }

    pub fn assign(
        &self,
        actor: &Actor,
        id: &RequestId,
        to: Option<UserId>,
    ) -> Result<(), CiviqError> {
        let note = match &to {
            Some(user) => format!("request assigned to {user}"),
            None => "request assignment cleared".to_string(),
        };
        self.transition(actor, id, note, |request| request.assign_to(to.clone()))
    }

    pub fn resolve(&self, actor: &Actor, id: &RequestId) -> Result<(), CiviqError> {
        self.transition(actor, id, "request resolved".to_string(), |request| {
            request.resolve();
        })
    }

    pub fn reject(&self, actor: &Actor, id: &RequestId) -> Result<(), CiviqError> {
        self.transition(actor, id, "request rejected".to_string(), |request| {
            request.reject();
        })
    }

    pub fn reopen(&self, actor: &Actor, id: &RequestId) -> Result<(), CiviqError> {
        self.transition(actor, id, "request reopened".to_string(), |request| {
            request.reopen();
        })
    }

    /// Staff status transition: mutate through the aggregate and record a
    /// system note in the same unit of work.
    fn transition(
        &self,
        actor: &Actor,
        id: &RequestId,
        note: String,
        apply: impl FnOnce(&mut Request),
    ) -> Result<(), CiviqError> {
        if !actor.is_staff() {
            return Err(RequestError::Forbidden.into());
        }
        self.core.store.with_tx(|store| {
            let mut request = visible_request(store, id)?;
            apply(&mut request);
            store.requests().update(&request)?;
            let comment = Comment::system_note(request.id.clone(), actor.user_id.clone(), note);
            store.comments().insert(&comment)?;
            Ok(())
        })
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: &RequestId,
        input: UpdateRequestInput,
    ) -> Result<Request, CiviqError> {
        validate_update_request(&input)?;
        self.core.store.with_tx(|store| {
            let mut request = visible_request(store, id)?;
            if !can_mutate(actor, &request.created_by) {
                return Err(RequestError::Forbidden.into());
            }
            if request.status == RequestStatus::Resolved {
                return Err(RequestError::InvalidInput {
                    message: "resolved requests cannot be updated".to_string(),
                }
                .into());
            }
            request.apply_update(input.title, input.description, input.category_id);
            store.requests().update(&request)?;
            Ok(request)
        })
    }

    pub fn soft_delete(&self, actor: &Actor, id: &RequestId) -> Result<(), CiviqError> {
        self.core.store.with_tx(|store| {
            let mut request = visible_request(store, id)?;
            if !can_mutate(actor, &request.created_by) {
                return Err(RequestError::Forbidden.into());
            }
            request.soft_delete();
            store.requests().update(&request)?;
            Ok(())
        })
    }

    pub fn restore(&self, actor: &Actor, id: &RequestId) -> Result<(), CiviqError> {
        if !actor.is_staff() {
            return Err(RequestError::Forbidden.into());
        }
        self.core.store.with_tx(|store| {
            let mut request = match store.requests().get(id)? {
                Some(request) if request.is_deleted => request,
                _ => return Err(RequestError::NotFound.into()),
            };
            request.restore();
            store.requests().update(&request)?;
            Ok(())
        })
    }

    pub fn admin_update(
        &self,
        actor: &Actor,
        id: &RequestId,
        input: AdminUpdateRequestInput,
    ) -> Result<(), CiviqError> {
        if !actor.is_staff() {
            return Err(RequestError::Forbidden.into());
        }
        self.core.store.with_tx(|store| {
            let mut request = visible_request(store, id)?;
            let mut notes = Vec::new();
            if let Some(user) = input.assigned_to.clone() {
                notes.push(format!("request assigned to {user}"));
                request.assign_to(Some(user));
            }
            if let Some(status) = input.status {
                match status {
                    RequestStatus::Open => request.reopen(),
                    RequestStatus::Assigned => {
                        let current = request.assigned_to.clone();
                        request.assign_to(current);
                    }
                    RequestStatus::Resolved => request.resolve(),
                    RequestStatus::Rejected => request.reject(),
                }
                notes.push(format!("status set to {status:?}"));
            }
            store.requests().update(&request)?;
            for note in notes {
                let comment =
                    Comment::system_note(request.id.clone(), actor.user_id.clone(), note);
                store.comments().insert(&comment)?;
            }
            Ok(())
        })
    }

    pub fn admin_get(&self, id: &RequestId) -> Result<RequestDetail, CiviqError> {
        let request = visible_request(&self.core.store, id)?;
        let comments = self.core.store.comments().list_visible(id)?;
        let attachments = self.core.store.attachments().list_for_request(id)?;
        Ok(RequestDetail {
            request,
            comments,
            attachments,
        })
    }

    pub fn search_nearby(
        &self,
        query: &NearbyQuery,
    ) -> Result<PagedResult<NearbyRequest>, CiviqError> {
        validate_coordinates(query.latitude, query.longitude)
            .map_err(|message| RequestError::InvalidInput { message })?;
        let radius_m = clamp_radius_km(query.radius_km) * 1000.0;
        let center = GeoPoint::new(query.latitude, query.longitude);

        let filter = RequestFilter {
            category_id: query.category_id.clone(),
            ..RequestFilter::default()
        };
        let candidates = self.core.store.requests().list_all(&filter)?;

        let mut hits: Vec<NearbyRequest> = candidates
            .into_iter()
            .filter_map(|request| {
                let distance_m = request.location.as_ref()?.distance_m(&center);
                (distance_m <= radius_m).then_some(NearbyRequest {
                    request,
                    distance_m,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.request.id.as_str().cmp(b.request.id.as_str()))
        });

        let total = hits.len() as u64;
        let start = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let items: Vec<NearbyRequest> = hits
            .into_iter()
            .skip(start)
            .take(query.page.page_size as usize)
            .collect();
        Ok(PagedResult::new(items, query.page, total))
    }

    pub fn export_csv(&self, filter: &RequestFilter) -> Result<CsvExport, CiviqError> {
        let rows = self.core.store.requests().list_all(filter)?;
        Ok(CsvExport {
            file_name: csv::export_file_name("requests", Utc::now()),
            content: csv::requests_csv(&rows),
        })
    }

    pub fn stats(&self) -> Result<RequestStats, CiviqError> {
        let rows = self
            .core
            .store
            .requests()
            .list_all(&RequestFilter::default())?;
        let today = Utc::now().date_naive();

        let by_status = [
            RequestStatus::Open,
            RequestStatus::Assigned,
            RequestStatus::Resolved,
            RequestStatus::Rejected,
        ]
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: rows.iter().filter(|r| r.status == status).count() as u64,
        })
        .collect();

        let mut per_category: HashMap<&CategoryId, u64> = HashMap::new();
        for row in &rows {
            if let Some(category) = &row.category_id {
                *per_category.entry(category).or_default() += 1;
            }
        }
        let mut top_categories: Vec<CategoryCount> = per_category
            .into_iter()
            .map(|(category_id, count)| CategoryCount {
                category_id: category_id.clone(),
                count,
            })
            .collect();
        top_categories.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.category_id.as_str().cmp(b.category_id.as_str()))
        });
        top_categories.truncate(5);

        let last_7_days = daily_counts(today, rows.iter().map(|r| r.created_at.date_naive()));

        Ok(RequestStats {
            total: rows.len() as u64,
            by_status,
            top_categories,
            last_7_days,
        })
    }
}

/// Zero-filled per-day counts for the 7 days ending today.
fn daily_counts(today: NaiveDate, days: impl Iterator<Item = NaiveDate>) -> Vec<DailyCount> {
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for day in days {
        *per_day.entry(day).or_default() += 1;
    }
    (0..7)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|day| DailyCount {
            day,
            count: per_day.get(&day).copied().unwrap_or(0),
        })
        .collect()
}

pub struct CommentsApi<'a, S: Store> {
    core: &'a Civiq<S>,
}

impl<'a, S: Store> CommentsApi<'a, S> {
    pub fn add(
        &self,
        actor: &Actor,
        request_id: &RequestId,
        text: String,
    ) -> Result<Comment, CiviqError> {
        validate_comment_text(&text)?;
        self.core.store.with_tx(|store| {
            if visible_request(store, request_id).is_err() {
                return Err(CommentError::RequestNotFound.into());
            }
            let comment = Comment::user(request_id.clone(), actor.user_id.clone(), text);
            store.comments().insert(&comment)?;
            Ok(comment)
        })
    }

    pub fn list(
        &self,
        request_id: &RequestId,
        page: Page,
    ) -> Result<PagedResult<Comment>, CiviqError> {
        if visible_request(&self.core.store, request_id).is_err() {
            return Err(CommentError::RequestNotFound.into());
        }
        Ok(self.core.store.comments().list_for_request(request_id, page)?)
    }

    pub fn delete(
        &self,
        actor: &Actor,
        request_id: &RequestId,
        comment_id: &CommentId,
    ) -> Result<(), CiviqError> {
        self.core.store.with_tx(|store| {
            if store.requests().get(request_id)?.is_none() {
                return Err(CommentError::RequestNotFound.into());
            }
            let mut comment = match store.comments().get(comment_id)? {
                Some(comment) if comment.request_id == *request_id => comment,
                _ => return Err(CommentError::NotFound.into()),
            };
            if !can_delete_comment(actor, &comment.author) {
                return Err(CommentError::Forbidden.into());
            }
            if comment.is_deleted {
                return Err(CommentError::AlreadyDeleted.into());
            }
            comment.soft_delete();
            store.comments().update(&comment)?;
            Ok(())
        })
    }
}

pub struct AttachmentsApi<'a, S: Store> {
    core: &'a Civiq<S>,
}

impl<'a, S: Store> AttachmentsApi<'a, S> {
    pub fn add(
        &self,
        request_id: &RequestId,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<Attachment, CiviqError> {
        if original_name.trim().is_empty() || original_name.chars().count() > ORIGINAL_NAME_MAX {
            return Err(AttachmentError::InvalidInput {
                message: "file name must be 1..=260 characters".to_string(),
            }
            .into());
        }
        if visible_request(&self.core.store, request_id).is_err() {
            return Err(AttachmentError::RequestNotFound.into());
        }
        let extension = extension_of(original_name).unwrap_or_default();
        if !is_allowed_extension(&extension) {
            return Err(AttachmentError::UnsupportedType { extension }.into());
        }

        // Bytes first: the record exists only for successfully persisted
        // files.
        let folder = format!("requests/{request_id}");
        let saved = self
            .core
            .files
            .save(&folder, original_name, content_type, bytes)
            .map_err(|err| AttachmentError::File {
                message: err.to_string(),
            })?;

        let attachment = Attachment::new(
            request_id.clone(),
            saved.stored_name,
            original_name.to_string(),
            saved.content_type,
            saved.size_bytes,
            saved.url,
        );
        self.core.store.with_tx(|store| {
            store.attachments().insert(&attachment)?;
            Ok(())
        })?;
        Ok(attachment)
    }

    pub fn list(&self, request_id: &RequestId) -> Result<Vec<Attachment>, CiviqError> {
        if visible_request(&self.core.store, request_id).is_err() {
            return Err(AttachmentError::RequestNotFound.into());
        }
        Ok(self.core.store.attachments().list_for_request(request_id)?)
    }

    pub fn delete(
        &self,
        actor: &Actor,
        request_id: &RequestId,
        attachment_id: &AttachmentId,
    ) -> Result<(), CiviqError> {
        if !actor.is_staff() {
            return Err(AttachmentError::Forbidden.into());
        }
        let attachment = match self.core.store.attachments().get(attachment_id)? {
            Some(attachment) if attachment.request_id == *request_id => attachment,
            _ => return Err(AttachmentError::NotFound.into()),
        };

        // Best effort: a missing or locked file never blocks record removal.
        let folder = format!("requests/{request_id}");
        if let Err(err) = self.core.files.delete(&folder, &attachment.stored_name) {
            tracing::warn!(
                attachment = %attachment.id,
                error = %err,
                "failed to delete attachment file"
            );
        }

        self.core.store.with_tx(|store| {
            store.attachments().delete(attachment_id)?;
            Ok(())
        })
    }
}

pub struct AssistsApi<'a, S: Store> {
    core: &'a Civiq<S>,
}

impl<'a, S: Store> AssistsApi<'a, S> {
    pub fn create(
        &self,
        actor: &Actor,
        input: CreateAssistInput,
    ) -> Result<AssistTicket, CiviqError> {
        validate_create_assist(&input)?;
        let ticket = AssistTicket::new(
            actor.user_id.clone(),
            input.kind,
            input.elder_name,
            input.elder_phone,
            input.address,
            input.latitude,
            input.longitude,
            input.scheduled_at,
            input.notes,
        );
        self.core.store.with_tx(|store| {
            store.assists().insert(&ticket)?;
            Ok(())
        })?;
        Ok(ticket)
    }

    pub fn get(&self, actor: &Actor, id: &AssistId) -> Result<AssistTicket, CiviqError> {
        let ticket = match self.core.store.assists().get(id)? {
            Some(ticket) if !ticket.is_deleted => ticket,
            _ => return Err(AssistError::NotFound.into()),
        };
        // Tickets carry contact details, so reads are creator-or-staff.
        if !actor.is_staff() && ticket.created_by != actor.user_id {
            return Err(AssistError::Forbidden.into());
        }
        Ok(ticket)
    }

    pub fn mine(
        &self,
        actor: &Actor,
        page: Page,
    ) -> Result<PagedResult<AssistTicket>, CiviqError> {
        let filter = AssistFilter {
            created_by: Some(actor.user_id.clone()),
            ..AssistFilter::default()
        };
        Ok(self.core.store.assists().list(&filter, page)?)
    }

    pub fn list(
        &self,
        filter: &AssistFilter,
        page: Page,
    ) -> Result<PagedResult<AssistTicket>, CiviqError> {
        Ok(self.core.store.assists().list(filter, page)?)
    }

    pub fn assign(&self, actor: &Actor, id: &AssistId, to: UserId) -> Result<(), CiviqError> {
        if !actor.is_staff() {
            return Err(AssistError::Forbidden.into());
        }
        self.core.store.with_tx(|store| {
            let mut ticket = match store.assists().get(id)? {
                Some(ticket) if !ticket.is_deleted => ticket,
                _ => return Err(AssistError::NotFound.into()),
            };
            ticket.assign(to.clone());
            store.assists().update(&ticket)?;
            Ok(())
        })
    }

    pub fn change_status(
        &self,
        actor: &Actor,
        id: &AssistId,
        status: AssistStatus,
        reason: Option<&str>,
    ) -> Result<(), CiviqError> {
        if !actor.is_staff() {
            return Err(AssistError::Forbidden.into());
        }
        self.core.store.with_tx(|store| {
            let mut ticket = match store.assists().get(id)? {
                Some(ticket) if !ticket.is_deleted => ticket,
                _ => return Err(AssistError::NotFound.into()),
            };
            ticket.change_status(status, reason);
            store.assists().update(&ticket)?;
            Ok(())
        })
    }

    pub fn export_csv(&self, filter: &AssistFilter) -> Result<CsvExport, CiviqError> {
        let rows = self.core.store.assists().list_all(filter)?;
        Ok(CsvExport {
            file_name: csv::export_file_name("assists", Utc::now()),
            content: csv::assists_csv(&rows),
        })
    }

    pub fn stats(&self) -> Result<AssistStats, CiviqError> {
        let rows = self
            .core
            .store
            .assists()
            .list_all(&AssistFilter::default())?;
        let today = Utc::now().date_naive();

        let by_status = [
            AssistStatus::Open,
            AssistStatus::Assigned,
            AssistStatus::Resolved,
            AssistStatus::Canceled,
        ]
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: rows.iter().filter(|t| t.status == status).count() as u64,
        })
        .collect();

        let mut per_kind: HashMap<AssistKind, u64> = HashMap::new();
        for row in &rows {
            *per_kind.entry(row.kind).or_default() += 1;
        }
        let mut top_kinds: Vec<KindCount> = per_kind
            .into_iter()
            .map(|(kind, count)| KindCount { kind, count })
            .collect();
        top_kinds.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| format!("{:?}", a.kind).cmp(&format!("{:?}", b.kind)))
        });
        top_kinds.truncate(5);

        let last_7_days = daily_counts(today, rows.iter().map(|t| t.created_at.date_naive()));

        Ok(AssistStats {
            total: rows.len() as u64,
            by_status,
            top_kinds,
            last_7_days,
        })
    }
}
