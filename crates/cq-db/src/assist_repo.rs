use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};
use cq_core::assists::AssistRepository;
use cq_core::error::AssistError;
use cq_core::types::assist::AssistTicket;
use cq_core::types::ids::{AssistId, UserId};
use cq_core::types::io::{AssistFilter, Page, PagedResult};
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};

const COLUMNS: &str = "id, kind, status, created_by, elder_name, elder_phone, address, latitude, longitude, assigned_to, scheduled_at, notes, is_deleted, created_at, updated_at";

pub struct AssistRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> AssistRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn storage(err: impl std::fmt::Display) -> AssistError {
    AssistError::Storage {
        message: err.to_string(),
    }
}

fn filter_sql(filter: &AssistFilter) -> Result<(String, Vec<Value>), AssistError> {
    let mut clauses = vec!["is_deleted = 0".to_string()];
    let mut params: Vec<Value> = Vec::new();

    if let Some(status) = &filter.status {
        clauses.push("status = ?".to_string());
        params.push(Value::Text(encode_enum(status).map_err(storage)?));
    }
    if let Some(kind) = &filter.kind {
        clauses.push("kind = ?".to_string());
        params.push(Value::Text(encode_enum(kind).map_err(storage)?));
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
                .push("(elder_name LIKE '%' || ? || '%' OR address LIKE '%' || ? || '%')".to_string());
            params.push(Value::Text(search.to_string()));
            params.push(Value::Text(search.to_string()));
        }
    }

    Ok((clauses.join(" AND "), params))
}

fn map_assist_row(row: &Row) -> Result<AssistTicket, AssistError> {
    let id: String = row.get(0).map_err(storage)?;
    let kind: String = row.get(1).map_err(storage)?;
    let status: String = row.get(2).map_err(storage)?;
    let created_by: String = row.get(3).map_err(storage)?;
    let assigned_to: Option<String> = row.get(9).map_err(storage)?;
    let scheduled_at: Option<String> = row.get(10).map_err(storage)?;
    let created_at: String = row.get(13).map_err(storage)?;
    let updated_at: String = row.get(14).map_err(storage)?;

    Ok(AssistTicket {
        id: AssistId::new(id).map_err(storage)?,
        kind: decode_enum(&kind).map_err(storage)?,
        status: decode_enum(&status).map_err(storage)?,
        created_by: UserId::new(created_by).map_err(storage)?,
        elder_name: row.get(4).map_err(storage)?,
        elder_phone: row.get(5).map_err(storage)?,
        address: row.get(6).map_err(storage)?,
        latitude: row.get(7).map_err(storage)?,
        longitude: row.get(8).map_err(storage)?,
        assigned_to: assigned_to.map(UserId::new).transpose().map_err(storage)?,
        scheduled_at: scheduled_at
            .as_deref()
            .map(from_rfc3339)
            .transpose()
            .map_err(storage)?,
        notes: row.get(11).map_err(storage)?,
        is_deleted: row.get(12).map_err(storage)?,
        created_at: from_rfc3339(&created_at).map_err(storage)?,
        updated_at: from_rfc3339(&updated_at).map_err(storage)?,
    })
}

impl<'a> AssistRepository for AssistRepo<'a> {
    fn insert(&self, ticket: &AssistTicket) -> Result<(), AssistError> {
        let sql = "INSERT INTO assists (id, kind, status, created_by, elder_name, elder_phone, address, latitude, longitude, assigned_to, scheduled_at, notes, is_deleted, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";
        let params = (
            ticket.id.as_str(),
            encode_enum(&ticket.kind).map_err(storage)?,
            encode_enum(&ticket.status).map_err(storage)?,
            ticket.created_by.as_str(),
            ticket.elder_name.clone(),
            ticket.elder_phone.clone(),
            ticket.address.clone(),
            ticket.latitude,
            ticket.longitude,
            ticket.assigned_to.as_ref().map(UserId::as_str),
            ticket.scheduled_at.map(|value| to_rfc3339(&value)),
            ticket.notes.clone(),
            ticket.is_deleted,
            to_rfc3339(&ticket.created_at),
            to_rfc3339(&ticket.updated_at),
        );
        self.conn.execute(sql, params).map_err(storage)?;
        Ok(())
    }

    fn get(&self, id: &AssistId) -> Result<Option<AssistTicket>, AssistError> {
        let sql = format!("SELECT {COLUMNS} FROM assists WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt.query([id.as_str()]).map_err(storage)?;
        let Some(row) = rows.next().map_err(storage)? else {
            return Ok(None);
        };
        map_assist_row(row).map(Some)
    }

    fn update(&self, ticket: &AssistTicket) -> Result<(), AssistError> {
        let sql = "UPDATE assists SET kind = ?2, status = ?3, elder_name = ?4, elder_phone = ?5, address = ?6, latitude = ?7, longitude = ?8, assigned_to = ?9, scheduled_at = ?10, notes = ?11, is_deleted = ?12, updated_at = ?13 WHERE id = ?1";
        let params = (
            ticket.id.as_str(),
            encode_enum(&ticket.kind).map_err(storage)?,
            encode_enum(&ticket.status).map_err(storage)?,
            ticket.elder_name.clone(),
            ticket.elder_phone.clone(),
            ticket.address.clone(),
            ticket.latitude,
            ticket.longitude,
            ticket.assigned_to.as_ref().map(UserId::as_str),
            ticket.scheduled_at.map(|value| to_rfc3339(&value)),
            ticket.notes.clone(),
            ticket.is_deleted,
            to_rfc3339(&ticket.updated_at),
        );
        let changed = self.conn.execute(sql, params).map_err(storage)?;
        if changed == 0 {
            return Err(AssistError::NotFound);
        }
        Ok(())
    }

    fn list(
        &self,
        filter: &AssistFilter,
        page: Page,
    ) -> Result<PagedResult<AssistTicket>, AssistError> {
        let (where_sql, params) = filter_sql(filter)?;

        let count_sql = format!("SELECT COUNT(*) FROM assists WHERE {where_sql}");
        let total: i64 = self
            .conn
            .query_row(&count_sql, params_from_iter(params.iter()), |row| {
                row.get(0)
            })
            .map_err(storage)?;
        let total = u64::try_from(total).unwrap_or(0);

        let sql = format!(
            "SELECT {COLUMNS} FROM assists WHERE {where_sql} ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?"
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
            items.push(map_assist_row(row)?);
        }
        Ok(PagedResult::new(items, page, total))
    }

    fn list_all(&self, filter: &AssistFilter) -> Result<Vec<AssistTicket>, AssistError> {
        let (where_sql, params) = filter_sql(filter)?;
        let sql = format!(
            "SELECT {COLUMNS} FROM assists WHERE {where_sql} ORDER BY created_at DESC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(storage)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            items.push(map_assist_row(row)?);
        }
        Ok(items)
    }
}
