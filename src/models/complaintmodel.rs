// src/models/complaintmodel.rs
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::usermodel::{Identity, UserRole};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ComplaintStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Closed,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.to_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown complaint status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ComplaintPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl ComplaintPriority {
    pub const ALL: [ComplaintPriority; 3] = [
        ComplaintPriority::Low,
        ComplaintPriority::Medium,
        ComplaintPriority::High,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            ComplaintPriority::Low => "Low",
            ComplaintPriority::Medium => "Medium",
            ComplaintPriority::High => "High",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComplaintPriority::Low => "Minor issue, not urgent",
            ComplaintPriority::Medium => "Moderate issue, needs attention",
            ComplaintPriority::High => "Urgent issue, requires immediate attention",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ComplaintCategory {
    #[serde(rename = "Product Quality")]
    ProductQuality,
    Billing,
    #[serde(rename = "Customer Service")]
    CustomerService,
    Delivery,
    #[serde(rename = "Technical Support")]
    TechnicalSupport,
    #[serde(rename = "Refund/Return")]
    RefundReturn,
    #[serde(rename = "Account Issues")]
    AccountIssues,
    Other,
}

impl ComplaintCategory {
    pub const ALL: [ComplaintCategory; 8] = [
        ComplaintCategory::ProductQuality,
        ComplaintCategory::Billing,
        ComplaintCategory::CustomerService,
        ComplaintCategory::Delivery,
        ComplaintCategory::TechnicalSupport,
        ComplaintCategory::RefundReturn,
        ComplaintCategory::AccountIssues,
        ComplaintCategory::Other,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            ComplaintCategory::ProductQuality => "Product Quality",
            ComplaintCategory::Billing => "Billing",
            ComplaintCategory::CustomerService => "Customer Service",
            ComplaintCategory::Delivery => "Delivery",
            ComplaintCategory::TechnicalSupport => "Technical Support",
            ComplaintCategory::RefundReturn => "Refund/Return",
            ComplaintCategory::AccountIssues => "Account Issues",
            ComplaintCategory::Other => "Other",
        }
    }
}

impl FromStr for ComplaintCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintCategory::ALL
            .into_iter()
            .find(|category| category.to_str() == s.trim())
            .ok_or_else(|| format!("Unknown complaint category: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    #[serde(alias = "message")]
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub agent_id: Option<Uuid>,
    pub agent_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<ComplaintMessage>,
}

impl Complaint {
    pub fn is_assigned_to(&self, agent_id: Uuid) -> bool {
        self.agent_id == Some(agent_id)
    }

    /// Bumps `updated_at`, never letting it fall behind `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at).max(self.updated_at);
    }
}

/// Validated input for a new complaint. Ownership fields come from the session.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentAssignment {
    pub agent_id: Uuid,
    pub agent_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintEventKind {
    Submitted,
    StatusChanged,
    MessageAdded,
}

impl ComplaintEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintEventKind::Submitted => "submitted",
            ComplaintEventKind::StatusChanged => "status_changed",
            ComplaintEventKind::MessageAdded => "message_added",
        }
    }
}

/// Published by the store after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintEvent {
    pub kind: ComplaintEventKind,
    pub complaint_id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub status: ComplaintStatus,
    pub at: DateTime<Utc>,
}

impl ComplaintEvent {
    pub fn new(kind: ComplaintEventKind, complaint: &Complaint) -> Self {
        ComplaintEvent {
            kind,
            complaint_id: complaint.id,
            user_id: complaint.user_id,
            agent_id: complaint.agent_id,
            status: complaint.status,
            at: complaint.updated_at,
        }
    }

    pub fn visible_to(&self, viewer: &Identity) -> bool {
        match viewer.role {
            UserRole::Admin => true,
            UserRole::Agent => self.agent_id == Some(viewer.id) || self.user_id == viewer.id,
            UserRole::User => self.user_id == viewer.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_human_labels() {
        let json = serde_json::to_string(&ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");

        let status: ComplaintStatus = serde_json::from_str("\"Resolved\"").unwrap();
        assert_eq!(status, ComplaintStatus::Resolved);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("in progress".parse::<ComplaintStatus>(), Ok(ComplaintStatus::InProgress));
        assert_eq!("Closed".parse::<ComplaintStatus>(), Ok(ComplaintStatus::Closed));
        assert!("Escalated".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn category_round_trips_display_names() {
        for category in ComplaintCategory::ALL {
            assert_eq!(category.to_str().parse::<ComplaintCategory>(), Ok(category));
        }
        assert!("".parse::<ComplaintCategory>().is_err());
    }

    #[test]
    fn message_accepts_legacy_field_name() {
        let raw = serde_json::json!({
            "id": Uuid::nil(),
            "senderId": Uuid::nil(),
            "senderName": "John Doe",
            "message": "Any update?",
            "timestamp": "2024-01-15T10:00:00Z"
        });
        let message: ComplaintMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(message.text, "Any update?");
    }
}
