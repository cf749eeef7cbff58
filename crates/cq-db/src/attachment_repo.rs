use crate::util::{from_rfc3339, to_rfc3339};
use cq_core::attachments::AttachmentRepository;
use cq_core::error::AttachmentError;
use cq_core::types::attachment::Attachment;
use cq_core::types::ids::{AttachmentId, RequestId};
use rusqlite::{Connection, Row};

const COLUMNS: &str =
    "id, request_id, stored_name, original_name, content_type, size_bytes, url, created_at";

pub struct AttachmentRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> AttachmentRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn storage(err: impl std::fmt::Display) -> AttachmentError {
    AttachmentError::Storage {
        message: err.to_string(),
    }
}

fn map_attachment_row(row: &Row) -> Result<Attachment, AttachmentError> {
    let id: String = row.get(0).map_err(storage)?;
    let request_id: String = row.get(1).map_err(storage)?;
    let size_bytes: i64 = row.get(5).map_err(storage)?;
    let created_at: String = row.get(7).map_err(storage)?;

    Ok(Attachment {
        id: AttachmentId::new(id).map_err(storage)?,
        request_id: RequestId::new(request_id).map_err(storage)?,
        stored_name: row.get(2).map_err(storage)?,
        original_name: row.get(3).map_err(storage)?,
        content_type: row.get(4).map_err(storage)?,
        size_bytes: u64::try_from(size_bytes).map_err(storage)?,
        url: row.get(6).map_err(storage)?,
        created_at: from_rfc3339(&created_at).map_err(storage)?,
    })
}

impl<'a> AttachmentRepository for AttachmentRepo<'a> {
    fn insert(&self, attachment: &Attachment) -> Result<(), AttachmentError> {
        let sql = "INSERT INTO attachments (id, request_id, stored_name, original_name, content_type, size_bytes, url, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
        let size_bytes = i64::try_from(attachment.size_bytes).map_err(storage)?;
        let params = (
            attachment.id.as_str(),
            attachment.request_id.as_str(),
            attachment.stored_name.clone(),
            attachment.original_name.clone(),
            attachment.content_type.clone(),
            size_bytes,
            attachment.url.clone(),
            to_rfc3339(&attachment.created_at),
        );
        self.conn.execute(sql, params).map_err(storage)?;
        Ok(())
    }

    fn get(&self, id: &AttachmentId) -> Result<Option<Attachment>, AttachmentError> {
        let sql = format!("SELECT {COLUMNS} FROM attachments WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt.query([id.as_str()]).map_err(storage)?;
        let Some(row) = rows.next().map_err(storage)? else {
            return Ok(None);
        };
        map_attachment_row(row).map(Some)
    }

    fn delete(&self, id: &AttachmentId) -> Result<(), AttachmentError> {
        let changed = self
            .conn
            .execute("DELETE FROM attachments WHERE id = ?1", [id.as_str()])
            .map_err(storage)?;
        if changed == 0 {
            return Err(AttachmentError::NotFound);
        }
        Ok(())
    }

    fn list_for_request(&self, request_id: &RequestId) -> Result<Vec<Attachment>, AttachmentError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM attachments WHERE request_id = ?1 ORDER BY created_at DESC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt.query([request_id.as_str()]).map_err(storage)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            items.push(map_attachment_row(row)?);
        }
        Ok(items)
    }
}
