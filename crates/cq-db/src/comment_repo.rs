use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use cq_core::comments::CommentRepository;
use cq_core::error::CommentError;
use cq_core::types::comment::Comment;
use cq_core::types::ids::{CommentId, RequestId, UserId};
use cq_core::types::io::{Page, PagedResult};
use rusqlite::{Connection, Row};

const COLUMNS: &str = "id, request_id, author, kind, text, is_deleted, created_at";

pub struct CommentRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> CommentRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn storage(err: impl std::fmt::Display) -> CommentError {
    CommentError::Storage {
        message: err.to_string(),
    }
}

fn map_comment_row(row: &Row) -> Result<Comment, CommentError> {
    let id: String = row.get(0).map_err(storage)?;
    let request_id: String = row.get(1).map_err(storage)?;
    let author: String = row.get(2).map_err(storage)?;
    let kind: String = row.get(3).map_err(storage)?;
    let created_at: String = row.get(6).map_err(storage)?;

    Ok(Comment {
        id: CommentId::new(id).map_err(storage)?,
        request_id: RequestId::new(request_id).map_err(storage)?,
        author: UserId::new(author).map_err(storage)?,
        kind: decode_enum(&kind).map_err(storage)?,
        text: row.get(4).map_err(storage)?,
        is_deleted: row.get(5).map_err(storage)?,
        created_at: from_rfc3339(&created_at).map_err(storage)?,
    })
}

impl<'a> CommentRepository for CommentRepo<'a> {
    fn insert(&self, comment: &Comment) -> Result<(), CommentError> {
        let sql = "INSERT INTO comments (id, request_id, author, kind, text, is_deleted, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
        let params = (
            comment.id.as_str(),
            comment.request_id.as_str(),
            comment.author.as_str(),
            encode_enum(&comment.kind).map_err(storage)?,
            comment.text.clone(),
            comment.is_deleted,
            to_rfc3339(&comment.created_at),
        );
        self.conn.execute(sql, params).map_err(storage)?;
        Ok(())
    }

    fn get(&self, id: &CommentId) -> Result<Option<Comment>, CommentError> {
        let sql = format!("SELECT {COLUMNS} FROM comments WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt.query([id.as_str()]).map_err(storage)?;
        let Some(row) = rows.next().map_err(storage)? else {
            return Ok(None);
        };
        map_comment_row(row).map(Some)
    }

    fn update(&self, comment: &Comment) -> Result<(), CommentError> {
        let sql = "UPDATE comments SET text = ?2, is_deleted = ?3 WHERE id = ?1";
        let params = (comment.id.as_str(), comment.text.clone(), comment.is_deleted);
        let changed = self.conn.execute(sql, params).map_err(storage)?;
        if changed == 0 {
            return Err(CommentError::NotFound);
        }
        Ok(())
    }

    fn list_for_request(
        &self,
        request_id: &RequestId,
        page: Page,
    ) -> Result<PagedResult<Comment>, CommentError> {
        let total: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM comments WHERE request_id = ?1 AND is_deleted = 0",
                [request_id.as_str()],
                |row| row.get(0),
            )
            .map_err(storage)?;
        let total = u64::try_from(total).unwrap_or(0);

        let sql = format!(
            "SELECT {COLUMNS} FROM comments WHERE request_id = ?1 AND is_deleted = 0 ORDER BY created_at DESC, id ASC LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt
            .query((
                request_id.as_str(),
                i64::from(page.page_size),
                page.offset() as i64,
            ))
            .map_err(storage)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            items.push(map_comment_row(row)?);
        }
        Ok(PagedResult::new(items, page, total))
    }

    fn list_visible(&self, request_id: &RequestId) -> Result<Vec<Comment>, CommentError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM comments WHERE request_id = ?1 AND is_deleted = 0 ORDER BY created_at ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt.query([request_id.as_str()]).map_err(storage)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            items.push(map_comment_row(row)?);
        }
        Ok(items)
    }
}
