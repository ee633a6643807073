use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    db::fixtures,
    models::complaintmodel::{
        Complaint, ComplaintCategory, ComplaintMessage, ComplaintPriority, NewComplaint,
    },
};

pub const MIN_DESCRIPTION_LENGTH: usize = 20;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::from("Field cannot be blank"));
        return Err(error);
    }
    Ok(())
}

/// Bounds apply to the trimmed text, which is what gets stored.
fn validate_description(value: &str) -> Result<(), ValidationError> {
    let length = value.trim().chars().count();
    if !(MIN_DESCRIPTION_LENGTH..=MAX_DESCRIPTION_LENGTH).contains(&length) {
        let mut error = ValidationError::new("length");
        error.message = Some(Cow::from("Description must be between 20 and 2000 characters"));
        error.add_param(Cow::from("min"), &MIN_DESCRIPTION_LENGTH);
        error.add_param(Cow::from("max"), &MAX_DESCRIPTION_LENGTH);
        return Err(error);
    }
    Ok(())
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    value.parse::<ComplaintCategory>().map(|_| ()).map_err(|_| {
        let mut error = ValidationError::new("unknown_category");
        error.message = Some(Cow::from("Please select a category"));
        error
    })
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateComplaintDto {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom = "validate_not_blank"
    )]
    pub title: String,

    #[validate(custom = "validate_description")]
    pub description: String,

    #[validate(custom = "validate_category")]
    pub category: String,

    #[serde(default)]
    pub priority: ComplaintPriority,
}

impl CreateComplaintDto {
    /// Call after `validate()`.
    pub fn into_new_complaint(self) -> Result<NewComplaint, String> {
        Ok(NewComplaint {
            category: self.category.parse()?,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority,
        })
    }
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplaintStatusDto {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
    pub agent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignComplaintDto {
    pub agent_id: Option<Uuid>,
}

impl AssignComplaintDto {
    /// The one mock agent takes the complaint when none is named.
    pub fn agent_or_default(&self) -> Uuid {
        self.agent_id.unwrap_or(fixtures::AGENT_ID)
    }
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageDto {
    #[serde(alias = "message")]
    #[validate(
        length(min = 1, max = 2000, message = "Message must be between 1 and 2000 characters"),
        custom = "validate_not_blank"
    )]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplaintQueryParams {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintResponseDto {
    pub status: String,
    pub data: Complaint,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintListResponseDto {
    pub status: String,
    pub complaints: Vec<Complaint>,
    pub results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponseDto {
    pub status: String,
    pub data: ComplaintMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponseDto {
    pub status: String,
    pub messages: Vec<ComplaintMessage>,
    pub results: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(title: &str, description: &str, category: &str) -> CreateComplaintDto {
        CreateComplaintDto {
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            priority: ComplaintPriority::default(),
        }
    }

    #[test]
    fn valid_complaint_converts() {
        let dto = dto(
            " Billing Issue ",
            "I was charged twice for the same order.",
            "Billing",
        );
        assert!(dto.validate().is_ok());

        let complaint = dto.into_new_complaint().unwrap();
        assert_eq!(complaint.title, "Billing Issue");
        assert_eq!(complaint.category, ComplaintCategory::Billing);
        assert_eq!(complaint.priority, ComplaintPriority::Medium);
    }

    #[test]
    fn short_description_is_rejected() {
        let short = "x".repeat(MIN_DESCRIPTION_LENGTH - 1);
        let errors = dto("Title", &short, "Billing").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));

        let exact = "x".repeat(MIN_DESCRIPTION_LENGTH);
        assert!(dto("Title", &exact, "Billing").validate().is_ok());
    }

    #[test]
    fn padding_does_not_count_towards_description_length() {
        let padded = format!("   {}   ", "x".repeat(MIN_DESCRIPTION_LENGTH - 6));
        let errors = dto("Title", &padded, "Billing").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));

        let padded = format!("  {}  ", "x".repeat(MIN_DESCRIPTION_LENGTH));
        let dto = dto("Title", &padded, "Billing");
        assert!(dto.validate().is_ok());
        let complaint = dto.into_new_complaint().unwrap();
        assert_eq!(complaint.description.chars().count(), MIN_DESCRIPTION_LENGTH);
    }

    #[test]
    fn blank_title_and_unknown_category_are_rejected() {
        let errors = dto("   ", "A description that is long enough.", "Weather")
            .validate()
            .unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("category"));
    }

    #[test]
    fn priority_defaults_to_medium_when_missing() {
        let raw = serde_json::json!({
            "title": "Late parcel",
            "description": "My parcel is two weeks late already.",
            "category": "Delivery"
        });
        let dto: CreateComplaintDto = serde_json::from_value(raw).unwrap();
        assert_eq!(dto.priority, ComplaintPriority::Medium);
    }

    #[test]
    fn message_accepts_either_field_name() {
        let dto: CreateMessageDto = serde_json::from_value(serde_json::json!({"message": "hi"})).unwrap();
        assert_eq!(dto.text, "hi");
        let blank: CreateMessageDto = serde_json::from_value(serde_json::json!({"text": "  "})).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn assignment_defaults_to_mock_agent() {
        assert_eq!(AssignComplaintDto::default().agent_or_default(), fixtures::AGENT_ID);
    }
}
