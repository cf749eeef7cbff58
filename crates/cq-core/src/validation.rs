use crate::error::{AssistError, CommentError, RequestError};
use crate::geo::validate_coordinates;
use crate::types::io::{CreateAssistInput, CreateRequestInput, UpdateRequestInput};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 2000;
pub const COMMENT_MAX: usize = 1000;
pub const ELDER_NAME_MAX: usize = 100;
pub const ADDRESS_MAX: usize = 400;
pub const ORIGINAL_NAME_MAX: usize = 260;

fn require_text(value: &str, field: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

fn optional_text(value: Option<&str>, field: &str, max: usize) -> Result<(), String> {
    match value {
        Some(text) if text.chars().count() > max => {
            Err(format!("{field} must be at most {max} characters"))
        }
        _ => Ok(()),
    }
}

pub fn validate_create_request(input: &CreateRequestInput) -> Result<(), RequestError> {
    let check = || -> Result<(), String> {
        require_text(&input.title, "title", TITLE_MAX)?;
        optional_text(input.description.as_deref(), "description", DESCRIPTION_MAX)?;
        validate_coordinates(input.latitude, input.longitude)
    };
    check().map_err(|message| RequestError::InvalidInput { message })
}

pub fn validate_update_request(input: &UpdateRequestInput) -> Result<(), RequestError> {
    let check = || -> Result<(), String> {
        require_text(&input.title, "title", TITLE_MAX)?;
        optional_text(input.description.as_deref(), "description", DESCRIPTION_MAX)
    };
    check().map_err(|message| RequestError::InvalidInput { message })
}

pub fn validate_comment_text(text: &str) -> Result<(), CommentError> {
    require_text(text, "text", COMMENT_MAX).map_err(|message| CommentError::InvalidInput { message })
}

pub fn validate_create_assist(input: &CreateAssistInput) -> Result<(), AssistError> {
    let check = || -> Result<(), String> {
        require_text(&input.elder_name, "elder_name", ELDER_NAME_MAX)?;
        require_text(&input.address, "address", ADDRESS_MAX)?;
        validate_coordinates(input.latitude, input.longitude)
    };
    check().map_err(|message| AssistError::InvalidInput { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::enums::AssistKind;

    fn request_input() -> CreateRequestInput {
        CreateRequestInput {
            title: "Pothole on main street".to_string(),
            description: None,
            category_id: None,
            latitude: 41.0,
            longitude: 29.0,
        }
    }

    #[test]
    fn accepts_valid_request_input() {
        assert!(validate_create_request(&request_input()).is_ok());
    }

    #[test]
    fn rejects_blank_and_oversized_title() {
        let mut input = request_input();
        input.title = "   ".to_string();
        assert!(validate_create_request(&input).is_err());

        input.title = "x".repeat(TITLE_MAX + 1);
        assert!(validate_create_request(&input).is_err());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let mut input = request_input();
        input.latitude = 91.0;
        let err = validate_create_request(&input).unwrap_err();
        assert!(matches!(err, RequestError::InvalidInput { .. }));
    }

    #[test]
    fn rejects_empty_comment_and_oversized_comment() {
        assert!(validate_comment_text("").is_err());
        assert!(validate_comment_text(&"y".repeat(COMMENT_MAX + 1)).is_err());
        assert!(validate_comment_text("looks fixed now").is_ok());
    }

    #[test]
    fn rejects_assist_without_address() {
        let input = CreateAssistInput {
            kind: AssistKind::Medicine,
            elder_name: "Mehmet Demir".to_string(),
            elder_phone: None,
            address: String::new(),
            latitude: 41.0,
            longitude: 29.0,
            scheduled_at: None,
            notes: None,
        };
        assert!(validate_create_assist(&input).is_err());
    }
}
