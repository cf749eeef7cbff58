use crate::types::assist::AssistTicket;
use crate::types::request::Request;
use chrono::{DateTime, Utc};

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const REQUEST_HEADER: &str =
    "id,title,description,categoryId,status,createdBy,assignedTo,latitude,longitude,createdAtUtc";
const ASSIST_HEADER: &str = "id,kind,status,createdBy,elderName,elderPhone,address,latitude,\
                             longitude,assignedTo,scheduledAtUtc,createdAtUtc,notes";

/// Quote-wraps a text field, doubling embedded quotes. Applied to every
/// free-text field regardless of content; absent optionals become empty
/// strings.
pub fn escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn escape_opt(field: Option<&str>) -> String {
    field.map(escape).unwrap_or_default()
}

/// Enum columns use the wire form, so a serde rename shows up here too.
fn enum_text<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(text)) => text,
        _ => String::new(),
    }
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub fn export_file_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Renders filtered request rows. Callers supply rows already ordered by
/// creation time descending with soft-deleted rows excluded.
pub fn requests_csv(rows: &[Request]) -> String {
    let mut out = String::from(REQUEST_HEADER);
    out.push('\n');
    for r in rows {
        let line = [
            r.id.to_string(),
            escape(&r.title),
            escape_opt(r.description.as_deref()),
            r.category_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            enum_text(&r.status),
            r.created_by.to_string(),
            r.assigned_to
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            r.latitude.to_string(),
            r.longitude.to_string(),
            timestamp(&r.created_at),
        ]
        .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn assists_csv(rows: &[AssistTicket]) -> String {
    let mut out = String::from(ASSIST_HEADER);
    out.push('\n');
    for t in rows {
        let line = [
            t.id.to_string(),
            enum_text(&t.kind),
            enum_text(&t.status),
            t.created_by.to_string(),
            escape(&t.elder_name),
            escape_opt(t.elder_phone.as_deref()),
            escape(&t.address),
            t.latitude.to_string(),
            t.longitude.to_string(),
            t.assigned_to
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            t.scheduled_at.as_ref().map(timestamp).unwrap_or_default(),
            timestamp(&t.created_at),
            escape_opt(t.notes.as_deref()),
        ]
        .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}
