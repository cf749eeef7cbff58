use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use cq_core::error::RequestError;
use cq_core::geo::GeoPoint;
use cq_core::requests::RequestRepository;
use cq_core::types::ids::{CategoryId, RequestId, UserId};
use cq_core::types::io::{Page, PagedResult, RequestFilter};
use cq_core::types::request::Request;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};

const COLUMNS: &str = "id, title, description, category_id, status, created_by, assigned_to, latitude, longitude, point_latitude, point_longitude, is_deleted, created_at, updated_at";

pub struct RequestRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> RequestRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn storage(err: impl std::fmt::Display) -> RequestError {
    RequestError::Storage {
        message: err.to_string(),
    }
}

/// Translates the filter into a WHERE body: one clause per present
/// predicate, joined with AND, over non-deleted rows only.
fn filter_sql(filter: &RequestFilter) -> Result<(String, Vec<Value>), RequestError> {
    let mut clauses = vec!["is_deleted = 0".to_string()];
    let mut params: Vec<Value> = Vec::new();

    if let Some(status) = &filter.status {
        clauses.push("status = ?".to_string());
        params.push(Value::Text(encode_enum(status).map_err(storage)?));
    }
    if let Some(category) = &filter.category_id {
        clauses.push("category_id = ?".to_string());
        params.push(Value::Text(category.as_str().to_string()));
    }
    if let Some(creator) = &filter.created_by {
        clauses.push("created_by = ?".to_string());
        params.push(Value::Text(creator.as_str().to_string()));
    }
    if let Some(assignee) = &filter.assigned_to {
        clauses.push("assigned_to = ?".to_string());
        params.push(Value::Text(assignee.as_str().to_string()));
    }
    if let Some(from) = &filter.created_from {
        clauses.push("created_at >= ?".to_string());
        params.push(Value::Text(to_rfc3339(from)));
    }
    if let Some(to) = &filter.created_to {
        clauses.push("created_at <= ?".to_string());
        params.push(Value::Text(to_rfc3339(to)));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            clauses
                .push("(title LIKE '%' || ? || '%' OR description LIKE '%' || ? || '%')".to_string());
            params.push(Value::Text(search.to_string()));
            params.push(Value::Text(search.to_string()));
        }
    }

    Ok((clauses.join(" AND "), params))
}

fn map_request_row(row: &Row) -> Result<Request, RequestError> {
    let id: String = row.get(0).map_err(storage)?;
    let status: String = row.get(4).map_err(storage)?;
    let category_id: Option<String> = row.get(3).map_err(storage)?;
    let created_by: String = row.get(5).map_err(storage)?;
    let assigned_to: Option<String> = row.get(6).map_err(storage)?;
    let point_latitude: Option<f64> = row.get(9).map_err(storage)?;
    let point_longitude: Option<f64> = row.get(10).map_err(storage)?;
    let created_at: String = row.get(12).map_err(storage)?;
    let updated_at: String = row.get(13).map_err(storage)?;

    let location = match (point_latitude, point_longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
        _ => None,
    };

    Ok(Request {
        id: RequestId::new(id).map_err(storage)?,
        title: row.get(1).map_err(storage)?,
        description: row.get(2).map_err(storage)?,
        category_id: category_id.map(CategoryId::new).transpose().map_err(storage)?,
        status: decode_enum(&status).map_err(storage)?,
        created_by: UserId::new(created_by).map_err(storage)?,
        assigned_to: assigned_to.map(UserId::new).transpose().map_err(storage)?,
        latitude: row.get(7).map_err(storage)?,
        longitude: row.get(8).map_err(storage)?,
        location,
        is_deleted: row.get(11).map_err(storage)?,
        created_at: from_rfc3339(&created_at).map_err(storage)?,
        updated_at: from_rfc3339(&updated_at).map_err(storage)?,
    })
}

impl<'a> RequestRepository for RequestRepo<'a> {
    fn insert(&self, request: &Request) -> Result<(), RequestError> {
        let sql = "INSERT INTO requests (id, title, description, category_id, status, created_by, assigned_to, latitude, longitude, point_latitude, point_longitude, is_deleted, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";
        let params = (
            request.id.as_str(),
            request.title.clone(),
            request.description.clone(),
            request.category_id.as_ref().map(CategoryId::as_str),
            encode_enum(&request.status).map_err(storage)?,
            request.created_by.as_str(),
            request.assigned_to.as_ref().map(UserId::as_str),
            request.latitude,
            request.longitude,
            request.location.as_ref().map(|p| p.latitude),
            request.location.as_ref().map(|p| p.longitude),
            request.is_deleted,
            to_rfc3339(&request.created_at),
            to_rfc3339(&request.updated_at),
        );
        self.conn.execute(sql, params).map_err(storage)?;
        Ok(())
    }

    fn get(&self, id: &RequestId) -> Result<Option<Request>, RequestError> {
        let sql = format!("SELECT {COLUMNS} FROM requests WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt.query([id.as_str()]).map_err(storage)?;
        let Some(row) = rows.next().map_err(storage)? else {
            return Ok(None);
        };
        map_request_row(row).map(Some)
    }

    fn update(&self, request: &Request) -> Result<(), RequestError> {
        let sql = "UPDATE requests SET title = ?2, description = ?3, category_id = ?4, status = ?5, assigned_to = ?6, latitude = ?7, longitude = ?8, point_latitude = ?9, point_longitude = ?10, is_deleted = ?11, updated_at = ?12 WHERE id = ?1";
        let params = (
            request.id.as_str(),
            request.title.clone(),
            request.description.clone(),
            request.category_id.as_ref().map(CategoryId::as_str),
            encode_enum(&request.status).map_err(storage)?,
            request.assigned_to.as_ref().map(UserId::as_str),
            request.latitude,
            request.longitude,
            request.location.as_ref().map(|p| p.latitude),
            request.location.as_ref().map(|p| p.longitude),
            request.is_deleted,
            to_rfc3339(&request.updated_at),
        );
        let changed = self.conn.execute(sql, params).map_err(storage)?;
        if changed == 0 {
            return Err(RequestError::NotFound);
        }
        Ok(())
    }

    fn list(
        &self,
        filter: &RequestFilter,
        page: Page,
    ) -> Result<PagedResult<Request>, RequestError> {
        let (where_sql, params) = filter_sql(filter)?;

        let count_sql = format!("SELECT COUNT(*) FROM requests WHERE {where_sql}");
        let total: i64 = self
            .conn
            .query_row(&count_sql, params_from_iter(params.iter()), |row| {
                row.get(0)
            })
            .map_err(storage)?;
        let total = u64::try_from(total).unwrap_or(0);

        let sql = format!(
            "SELECT {COLUMNS} FROM requests WHERE {where_sql} ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?"
        );
        let mut page_params = params;
        page_params.push(Value::Integer(i64::from(page.page_size)));
        page_params.push(Value::Integer(page.offset() as i64));

        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt
            .query(params_from_iter(page_params.iter()))
            .map_err(storage)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            items.push(map_request_row(row)?);
        }
        Ok(PagedResult::new(items, page, total))
    }

    fn list_all(&self, filter: &RequestFilter) -> Result<Vec<Request>, RequestError> {
        let (where_sql, params) = filter_sql(filter)?;
        let sql = format!(
            "SELECT {COLUMNS} FROM requests WHERE {where_sql} ORDER BY created_at DESC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(storage)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            items.push(map_request_row(row)?);
        }
        Ok(items)
    }
}
