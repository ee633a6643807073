// src/db/complaintdb.rs
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::db::DBClient;
use crate::{
    models::{
        complaintmodel::*,
        usermodel::Identity,
    },
    service::error::ServiceError,
};

/// Which slice of the complaint list a query returns. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintFilter {
    pub user_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub status: Option<ComplaintStatus>,
}

impl ComplaintFilter {
    pub fn all() -> Self {
        ComplaintFilter::default()
    }

    pub fn submitted_by(user_id: Uuid) -> Self {
        ComplaintFilter {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn assigned_to(agent_id: Uuid) -> Self {
        ComplaintFilter {
            agent_id: Some(agent_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: Option<ComplaintStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        self.user_id.map_or(true, |id| complaint.user_id == id)
            && self.agent_id.map_or(true, |id| complaint.agent_id == Some(id))
            && self.status.map_or(true, |status| complaint.status == status)
    }
}

#[async_trait]
pub trait ComplaintExt {
    async fn save_complaint(
        &self,
        owner: &Identity,
        complaint: NewComplaint,
    ) -> Result<Complaint, ServiceError>;

    async fn get_complaint(
        &self,
        complaint_id: Uuid,
    ) -> Result<Option<Complaint>, ServiceError>;

    /// Newest first.
    async fn get_complaints(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<Complaint>, ServiceError>;

    /// Replaces the status and, when given, the assignment. `check` sees the stored
    /// record while the write lock is held; an error leaves the record untouched.
    async fn update_complaint_status(
        &self,
        complaint_id: Uuid,
        status: ComplaintStatus,
        assignment: Option<AgentAssignment>,
        check: &(dyn for<'c> Fn(&'c Complaint) -> Result<(), ServiceError> + Send + Sync),
    ) -> Result<Complaint, ServiceError>;

    async fn add_complaint_message(
        &self,
        complaint_id: Uuid,
        sender: &Identity,
        text: String,
    ) -> Result<ComplaintMessage, ServiceError>;
}

#[async_trait]
impl ComplaintExt for DBClient {
    async fn save_complaint(
        &self,
        owner: &Identity,
        complaint: NewComplaint,
    ) -> Result<Complaint, ServiceError> {
        let now = Utc::now();
        let complaint = Complaint {
            id: Uuid::new_v4(),
            title: complaint.title,
            description: complaint.description,
            category: complaint.category,
            priority: complaint.priority,
            status: ComplaintStatus::Pending,
            user_id: owner.id,
            user_name: owner.name.clone(),
            user_email: owner.email.clone(),
            agent_id: None,
            agent_name: None,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };

        self.complaints.write().await.push(complaint.clone());
        self.publish(ComplaintEvent::new(ComplaintEventKind::Submitted, &complaint));

        Ok(complaint)
    }

    async fn get_complaint(
        &self,
        complaint_id: Uuid,
    ) -> Result<Option<Complaint>, ServiceError> {
        let complaints = self.complaints.read().await;
        Ok(complaints.iter().find(|c| c.id == complaint_id).cloned())
    }

    async fn get_complaints(
        &self,
        filter: &ComplaintFilter,
    ) -> Result<Vec<Complaint>, ServiceError> {
        let complaints = self.complaints.read().await;
        Ok(complaints
            .iter()
            .rev()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn update_complaint_status(
        &self,
        complaint_id: Uuid,
        status: ComplaintStatus,
        assignment: Option<AgentAssignment>,
        check: &(dyn for<'c> Fn(&'c Complaint) -> Result<(), ServiceError> + Send + Sync),
    ) -> Result<Complaint, ServiceError> {
        let updated = {
            let mut complaints = self.complaints.write().await;
            let complaint = complaints
                .iter_mut()
                .find(|c| c.id == complaint_id)
                .ok_or(ServiceError::ComplaintNotFound(complaint_id))?;

            check(complaint)?;

            complaint.status = status;
            if let Some(assignment) = assignment {
                complaint.agent_id = Some(assignment.agent_id);
                complaint.agent_name = Some(assignment.agent_name);
            }
            complaint.touch(Utc::now());
            complaint.clone()
        };

        self.publish(ComplaintEvent::new(ComplaintEventKind::StatusChanged, &updated));
        Ok(updated)
    }

    async fn add_complaint_message(
        &self,
        complaint_id: Uuid,
        sender: &Identity,
        text: String,
    ) -> Result<ComplaintMessage, ServiceError> {
        let (message, event) = {
            let mut complaints = self.complaints.write().await;
            let complaint = complaints
                .iter_mut()
                .find(|c| c.id == complaint_id)
                .ok_or(ServiceError::ComplaintNotFound(complaint_id))?;

            let now = Utc::now();
            let timestamp = complaint
                .messages
                .last()
                .map_or(now, |last| now.max(last.timestamp));

            let message = ComplaintMessage {
                id: Uuid::new_v4(),
                sender_id: sender.id,
                sender_name: sender.name.clone(),
                text,
                timestamp,
            };

            complaint.messages.push(message.clone());
            complaint.touch(timestamp);
            (message, ComplaintEvent::new(ComplaintEventKind::MessageAdded, complaint))
        };

        self.publish(event);
        Ok(message)
    }
}
