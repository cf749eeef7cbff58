use crate::schema::with_test_db;
use crate::store::DbStore;
use cq_core::error::{
    AssistError, AttachmentError, CiviqError, CommentError, RequestError,
};
use cq_core::files::{FileStorage, FileStorageError, SavedFile};
use cq_core::types::enums::{AssistKind, AssistStatus, CommentKind, RequestStatus, Role};
use cq_core::types::ids::{CategoryId, UserId};
use cq_core::types::io::{
    AdminUpdateRequestInput, CreateAssistInput, CreateRequestInput, NearbyQuery, Page,
    RequestFilter, UpdateRequestInput,
};
use cq_core::{Actor, Civiq};
use std::sync::{Arc, Mutex};
use ulid::Ulid;

#[derive(Default)]
struct MemFiles {
    saved: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<(String, String)>>,
}

impl FileStorage for MemFiles {
    fn save(
        &self,
        folder: &str,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<SavedFile, FileStorageError> {
        let extension = original_name.rsplit('.').next().unwrap_or("bin");
        let stored_name = format!("{}.{extension}", Ulid::new());
        self.saved
            .lock()
            .unwrap()
            .push((folder.to_string(), stored_name.clone()));
        Ok(SavedFile {
            url: format!("/uploads/{folder}/{stored_name}"),
            stored_name,
            size_bytes: bytes.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    fn delete(&self, folder: &str, stored_name: &str) -> Result<bool, FileStorageError> {
        self.deleted
            .lock()
            .unwrap()
            .push((folder.to_string(), stored_name.to_string()));
        Ok(true)
    }
}

fn civiq() -> (Civiq<DbStore>, Arc<MemFiles>) {
    let store = DbStore::new(with_test_db().unwrap());
    let files = Arc::new(MemFiles::default());
    (Civiq::new(store, files.clone()), files)
}

fn citizen() -> Actor {
    Actor::new(UserId::generate(), Role::Citizen)
}

fn operator() -> Actor {
    Actor::new(UserId::generate(), Role::Operator)
}

fn admin() -> Actor {
    Actor::new(UserId::generate(), Role::Admin)
}

fn create_input(title: &str, latitude: f64, longitude: f64) -> CreateRequestInput {
    CreateRequestInput {
        title: title.to_string(),
        description: Some("details".to_string()),
        category_id: None,
        latitude,
        longitude,
    }
}

#[test]
fn create_and_get_round_trips() {
    let (civiq, _) = civiq();
    let actor = citizen();
    let created = civiq
        .requests()
        .create(&actor, create_input("broken streetlight", 41.0, 29.0))
        .unwrap();

    assert_eq!(created.status, RequestStatus::Open);
    assert_eq!(created.created_by, actor.user_id);
    assert!(created.location.is_some());

    let fetched = civiq.requests().get(&created.id).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn create_rejects_blank_title_and_bad_coordinates() {
    let (civiq, _) = civiq();
    let actor = citizen();

    let err = civiq
        .requests()
        .create(&actor, create_input("   ", 41.0, 29.0))
        .unwrap_err();
    assert!(matches!(
        err,
        CiviqError::Request(RequestError::InvalidInput { .. })
    ));

    let err = civiq
        .requests()
        .create(&actor, create_input("pothole", 91.0, 29.0))
        .unwrap_err();
    assert!(matches!(
        err,
        CiviqError::Request(RequestError::InvalidInput { .. })
    ));
}

#[test]
fn any_status_can_reach_any_other() {
    let (civiq, _) = civiq();
    let staff = operator();
    let request = civiq
        .requests()
        .create(&citizen(), create_input("graffiti", 41.0, 29.0))
        .unwrap();

    civiq.requests().reject(&staff, &request.id).unwrap();
    civiq.requests().resolve(&staff, &request.id).unwrap();
    civiq.requests().reopen(&staff, &request.id).unwrap();
    civiq
        .requests()
        .assign(&staff, &request.id, Some(staff.user_id.clone()))
        .unwrap();

    let fetched = civiq.requests().get(&request.id).unwrap();
    assert_eq!(fetched.status, RequestStatus::Assigned);
    assert_eq!(fetched.assigned_to, Some(staff.user_id.clone()));

    // Every transition leaves a system note behind.
    let comments = civiq
        .comments()
        .list(&request.id, Page::default())
        .unwrap();
    assert_eq!(comments.total_count, 4);
    assert!(comments
        .items
        .iter()
        .all(|c| c.kind == CommentKind::SystemNote));
}

#[test]
fn status_transitions_are_staff_only() {
    let (civiq, _) = civiq();
    let owner = citizen();
    let request = civiq
        .requests()
        .create(&owner, create_input("noise", 41.0, 29.0))
        .unwrap();

    let err = civiq.requests().resolve(&owner, &request.id).unwrap_err();
    assert!(matches!(
        err,
        CiviqError::Request(RequestError::Forbidden)
    ));
}

#[test]
fn update_is_owner_or_admin_and_never_on_resolved() {
    let (civiq, _) = civiq();
    let owner = citizen();
    let request = civiq
        .requests()
        .create(&owner, create_input("fallen tree", 41.0, 29.0))
        .unwrap();
    let update = UpdateRequestInput {
        title: "fallen tree blocking road".to_string(),
        description: None,
        category_id: Some(CategoryId::generate()),
    };

    let err = civiq
        .requests()
        .update(&citizen(), &request.id, update.clone())
        .unwrap_err();
    assert!(matches!(
        err,
        CiviqError::Request(RequestError::Forbidden)
    ));

    let updated = civiq
        .requests()
        .update(&owner, &request.id, update.clone())
        .unwrap();
    assert_eq!(updated.title, "fallen tree blocking road");

    civiq.requests().resolve(&operator(), &request.id).unwrap();
    let err = civiq
        .requests()
        .update(&admin(), &request.id, update)
        .unwrap_err();
    assert!(matches!(
        err,
        CiviqError::Request(RequestError::InvalidInput { .. })
    ));
}

#[test]
fn soft_delete_hides_and_restore_brings_back() {
    let (civiq, _) = civiq();
    let owner = citizen();
    let request = civiq
        .requests()
        .create(&owner, create_input("litter", 41.0, 29.0))
        .unwrap();

    civiq.requests().soft_delete(&owner, &request.id).unwrap();
    assert!(matches!(
        civiq.requests().get(&request.id).unwrap_err(),
        CiviqError::Request(RequestError::NotFound)
    ));
    let listed = civiq
        .requests()
        .list(&RequestFilter::default(), Page::default())
        .unwrap();
    assert_eq!(listed.total_count, 0);

    // Deleting again surfaces as missing, same as reading.
    assert!(matches!(
        civiq.requests().soft_delete(&owner, &request.id).unwrap_err(),
        CiviqError::Request(RequestError::NotFound)
    ));

    // Restore is staff-only and only applies to deleted rows.
    assert!(matches!(
        civiq.requests().restore(&owner, &request.id).unwrap_err(),
        CiviqError::Request(RequestError::Forbidden)
    ));
    civiq.requests().restore(&admin(), &request.id).unwrap();
    assert_eq!(
        civiq.requests().get(&request.id).unwrap().status,
        RequestStatus::Open
    );
    assert!(matches!(
        civiq.requests().restore(&admin(), &request.id).unwrap_err(),
        CiviqError::Request(RequestError::NotFound)
    ));
}

#[test]
fn filters_compose_conjunctively() {
    let (civiq, _) = civiq();
    let alice = citizen();
    let bob = citizen();
    let roads = CategoryId::generate();
    let parks = CategoryId::generate();

    let mut input = create_input("pothole on main street", 41.0, 29.0);
    input.category_id = Some(roads.clone());
    let pothole = civiq.requests().create(&alice, input).unwrap();

    let mut input = create_input("pothole near the park", 41.0, 29.0);
    input.category_id = Some(parks.clone());
    civiq.requests().create(&alice, input).unwrap();

    let mut input = create_input("broken swing", 41.0, 29.0);
    input.category_id = Some(parks.clone());
    civiq.requests().create(&bob, input).unwrap();

    civiq.requests().resolve(&operator(), &pothole.id).unwrap();

    let filter = RequestFilter {
        status: Some(RequestStatus::Resolved),
        category_id: Some(roads.clone()),
        created_by: Some(alice.user_id.clone()),
        search: Some("pothole".to_string()),
        ..RequestFilter::default()
    };
    let result = civiq.requests().list(&filter, Page::default()).unwrap();
    assert_eq!(result.total_count, 1);
    assert_eq!(result.items[0].id, pothole.id);

    // Same predicates minus the status no longer exclude the park pothole.
    let filter = RequestFilter {
        search: Some("pothole".to_string()),
        ..RequestFilter::default()
    };
    let result = civiq.requests().list(&filter, Page::default()).unwrap();
    assert_eq!(result.total_count, 2);
}

#[test]
fn pagination_covers_every_row_exactly_once() {
    let (civiq, _) = civiq();
    let actor = citizen();
    for i in 0..5 {
        civiq
            .requests()
            .create(&actor, create_input(&format!("request {i}"), 41.0, 29.0))
            .unwrap();
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = civiq
            .requests()
            .list(&RequestFilter::default(), Page::new(page, 2))
            .unwrap();
        assert_eq!(result.total_count, 5);
        assert_eq!(result.total_pages, 3);
        seen.extend(result.items.into_iter().map(|r| r.id));
    }
    seen.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    seen.dedup();
    assert_eq!(seen.len(), 5);

    let past_the_end = civiq
        .requests()
        .list(&RequestFilter::default(), Page::new(4, 2))
        .unwrap();
    assert!(past_the_end.items.is_empty());
    assert_eq!(past_the_end.total_count, 5);
}

#[test]
fn nearby_filters_sorts_and_clamps() {
    let (civiq, _) = civiq();
    let actor = citizen();
    // ~420 m, ~8.4 km, and ~84 km east of the query point.
    let near = civiq
        .requests()
        .create(&actor, create_input("near", 41.0, 29.005))
        .unwrap();
    let mid = civiq
        .requests()
        .create(&actor, create_input("mid", 41.0, 29.1))
        .unwrap();
    civiq
        .requests()
        .create(&actor, create_input("far", 41.0, 30.0))
        .unwrap();

    let query = NearbyQuery {
        latitude: 41.0,
        longitude: 29.0,
        radius_km: 10.0,
        category_id: None,
        page: Page::default(),
    };
    let result = civiq.requests().search_nearby(&query).unwrap();
    assert_eq!(result.total_count, 2);
    assert_eq!(result.items[0].request.id, near.id);
    assert_eq!(result.items[1].request.id, mid.id);
    assert!(result.items[0].distance_m < result.items[1].distance_m);

    // 50 km clamps to the 20 km ceiling, still excluding the far row.
    let query = NearbyQuery {
        radius_km: 50.0,
        ..query.clone()
    };
    let result = civiq.requests().search_nearby(&query).unwrap();
    assert_eq!(result.total_count, 2);

    let query = NearbyQuery {
        latitude: 95.0,
        ..query
    };
    assert!(matches!(
        civiq.requests().search_nearby(&query).unwrap_err(),
        CiviqError::Request(RequestError::InvalidInput { .. })
    ));
}

#[test]
fn comment_lifecycle_and_authorization() {
    let (civiq, _) = civiq();
    let owner = citizen();
    let author = citizen();
    let request = civiq
        .requests()
        .create(&owner, create_input("stray dog", 41.0, 29.0))
        .unwrap();

    let comment = civiq
        .comments()
        .add(&author, &request.id, "seen near the bakery".to_string())
        .unwrap();
    assert_eq!(comment.kind, CommentKind::UserComment);

    let err = civiq
        .comments()
        .add(&author, &request.id, "x".repeat(1001))
        .unwrap_err();
    assert!(matches!(
        err,
        CiviqError::Comment(CommentError::InvalidInput { .. })
    ));

    // Neither a stranger nor the request owner may delete someone else's
    // comment; the author and staff may.
    assert!(matches!(
        civiq
            .comments()
            .delete(&citizen(), &request.id, &comment.id)
            .unwrap_err(),
        CiviqError::Comment(CommentError::Forbidden)
    ));
    civiq
        .comments()
        .delete(&author, &request.id, &comment.id)
        .unwrap();
    assert!(matches!(
        civiq
            .comments()
            .delete(&operator(), &request.id, &comment.id)
            .unwrap_err(),
        CiviqError::Comment(CommentError::AlreadyDeleted)
    ));

    let listed = civiq.comments().list(&request.id, Page::default()).unwrap();
    assert_eq!(listed.total_count, 0);
}

#[test]
fn comments_require_a_visible_request() {
    let (civiq, _) = civiq();
    let owner = citizen();
    let request = civiq
        .requests()
        .create(&owner, create_input("flooding", 41.0, 29.0))
        .unwrap();
    civiq.requests().soft_delete(&owner, &request.id).unwrap();

    assert!(matches!(
        civiq
            .comments()
            .add(&owner, &request.id, "still there".to_string())
            .unwrap_err(),
        CiviqError::Comment(CommentError::RequestNotFound)
    ));
    assert!(matches!(
        civiq.comments().list(&request.id, Page::default()).unwrap_err(),
        CiviqError::Comment(CommentError::RequestNotFound)
    ));
}

#[test]
fn attachment_upload_list_and_delete() {
    let (civiq, files) = civiq();
    let owner = citizen();
    let request = civiq
        .requests()
        .create(&owner, create_input("graffiti", 41.0, 29.0))
        .unwrap();

    let attachment = civiq
        .attachments()
        .add(&request.id, "photo.HEIC", "image/heic", &[1, 2, 3])
        .unwrap();
    assert_eq!(attachment.size_bytes, 3);
    assert!(attachment.url.contains(&attachment.stored_name));

    let err = civiq
        .attachments()
        .add(&request.id, "clip.gif", "image/gif", &[1])
        .unwrap_err();
    assert!(matches!(
        err,
        CiviqError::Attachment(AttachmentError::UnsupportedType { .. })
    ));

    assert_eq!(civiq.attachments().list(&request.id).unwrap().len(), 1);

    assert!(matches!(
        civiq
            .attachments()
            .delete(&owner, &request.id, &attachment.id)
            .unwrap_err(),
        CiviqError::Attachment(AttachmentError::Forbidden)
    ));
    civiq
        .attachments()
        .delete(&operator(), &request.id, &attachment.id)
        .unwrap();
    assert!(civiq.attachments().list(&request.id).unwrap().is_empty());
    assert_eq!(files.deleted.lock().unwrap().len(), 1);
}

#[test]
fn admin_update_applies_status_and_assignment_with_notes() {
    let (civiq, _) = civiq();
    let staff = admin();
    let assignee = UserId::generate();
    let request = civiq
        .requests()
        .create(&citizen(), create_input("sinkhole", 41.0, 29.0))
        .unwrap();

    civiq
        .requests()
        .admin_update(
            &staff,
            &request.id,
            AdminUpdateRequestInput {
                status: Some(RequestStatus::Resolved),
                assigned_to: Some(assignee.clone()),
            },
        )
        .unwrap();

    let detail = civiq.requests().admin_get(&request.id).unwrap();
    assert_eq!(detail.request.status, RequestStatus::Resolved);
    assert_eq!(detail.request.assigned_to, Some(assignee));
    assert_eq!(detail.comments.len(), 2);
}

#[test]
fn assist_lifecycle() {
    let (civiq, _) = civiq();
    let requester = citizen();
    let staff = operator();
    let helper = UserId::generate();

    let ticket = civiq
        .assists()
        .create(
            &requester,
            CreateAssistInput {
                kind: AssistKind::Grocery,
                elder_name: "Ayşe K.".to_string(),
                elder_phone: None,
                address: "12 Elm Street".to_string(),
                latitude: 41.0,
                longitude: 29.0,
                scheduled_at: None,
                notes: None,
            },
        )
        .unwrap();
    assert_eq!(ticket.status, AssistStatus::Open);

    assert!(matches!(
        civiq
            .assists()
            .assign(&requester, &ticket.id, helper.clone())
            .unwrap_err(),
        CiviqError::Assist(AssistError::Forbidden)
    ));

    civiq.assists().assign(&staff, &ticket.id, helper).unwrap();
    civiq
        .assists()
        .change_status(&staff, &ticket.id, AssistStatus::Canceled, Some("moved away"))
        .unwrap();

    let fetched = civiq.assists().get(&requester, &ticket.id).unwrap();
    assert_eq!(fetched.status, AssistStatus::Canceled);
    assert_eq!(fetched.notes.as_deref(), Some("moved away"));

    // Contact details stay between the creator and staff.
    civiq.assists().get(&staff, &ticket.id).unwrap();
    assert!(matches!(
        civiq.assists().get(&citizen(), &ticket.id).unwrap_err(),
        CiviqError::Assist(AssistError::Forbidden)
    ));

    let mine = civiq.assists().mine(&requester, Page::default()).unwrap();
    assert_eq!(mine.total_count, 1);
    let theirs = civiq.assists().mine(&citizen(), Page::default()).unwrap();
    assert_eq!(theirs.total_count, 0);
}

#[test]
fn csv_export_quotes_text_fields() {
    let (civiq, _) = civiq();
    let actor = citizen();
    civiq
        .requests()
        .create(
            &actor,
            create_input("pipe burst, \"urgent\"", 41.0, 29.0),
        )
        .unwrap();

    let export = civiq
        .requests()
        .export_csv(&RequestFilter::default())
        .unwrap();
    assert!(export.file_name.starts_with("requests_"));
    assert!(export.file_name.ends_with(".csv"));

    let mut lines = export.content.lines();
    assert_eq!(
        lines.next(),
        Some("id,title,description,categoryId,status,createdBy,assignedTo,latitude,longitude,createdAtUtc")
    );
    let row = lines.next().unwrap();
    assert!(row.contains("\"pipe burst, \"\"urgent\"\"\""));
    assert!(row.contains("Open"));
}

#[test]
fn stats_aggregate_by_status_and_day() {
    let (civiq, _) = civiq();
    let actor = citizen();
    let staff = operator();
    for i in 0..3 {
        let request = civiq
            .requests()
            .create(&actor, create_input(&format!("r{i}"), 41.0, 29.0))
            .unwrap();
        if i == 0 {
            civiq.requests().resolve(&staff, &request.id).unwrap();
        }
    }

    let stats = civiq.requests().stats().unwrap();
    assert_eq!(stats.total, 3);
    let resolved = stats
        .by_status
        .iter()
        .find(|c| c.status == RequestStatus::Resolved)
        .unwrap();
    assert_eq!(resolved.count, 1);
    assert_eq!(stats.last_7_days.len(), 7);
    let per_day_sum: u64 = stats.last_7_days.iter().map(|d| d.count).sum();
    assert_eq!(per_day_sum, 3);
}
