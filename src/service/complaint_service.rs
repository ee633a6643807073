// src/service/complaint_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{fixtures, ComplaintExt, ComplaintFilter, DBClient},
    models::{
        complaintmodel::*,
        usermodel::{Identity, UserRole},
    },
    service::{
        error::ServiceError,
        latency::{LatencyPolicy, Operation},
        workflow,
    },
};

#[derive(Debug, Clone)]
pub struct ComplaintService {
    db_client: Arc<DBClient>,
    latency: LatencyPolicy,
}

impl ComplaintService {
    pub fn new(db_client: Arc<DBClient>, latency: LatencyPolicy) -> Self {
        Self { db_client, latency }
    }

    pub async fn submit(
        &self,
        actor: &Identity,
        complaint: NewComplaint,
    ) -> Result<Complaint, ServiceError> {
        self.latency.simulate(Operation::Submit).await?;

        let complaint = self.db_client.save_complaint(actor, complaint).await?;
        tracing::info!(
            "Complaint {} submitted by {} ({})",
            complaint.id,
            actor.email,
            complaint.category.to_str()
        );
        Ok(complaint)
    }

    /// Complaints the actor submitted.
    pub async fn user_complaints(
        &self,
        actor: &Identity,
        status: Option<ComplaintStatus>,
    ) -> Result<Vec<Complaint>, ServiceError> {
        let filter = ComplaintFilter::submitted_by(actor.id).with_status(status);
        self.db_client.get_complaints(&filter).await
    }

    /// Complaints assigned to the actor; empty for anyone who is not an agent.
    pub async fn agent_complaints(
        &self,
        actor: &Identity,
        status: Option<ComplaintStatus>,
    ) -> Result<Vec<Complaint>, ServiceError> {
        if actor.role != UserRole::Agent {
            return Ok(Vec::new());
        }

        let filter = ComplaintFilter::assigned_to(actor.id).with_status(status);
        self.db_client.get_complaints(&filter).await
    }

    /// Every complaint; empty for anyone who is not an admin.
    pub async fn all_complaints(
        &self,
        actor: &Identity,
        status: Option<ComplaintStatus>,
    ) -> Result<Vec<Complaint>, ServiceError> {
        if !actor.is_admin() {
            return Ok(Vec::new());
        }

        let filter = ComplaintFilter::all().with_status(status);
        self.db_client.get_complaints(&filter).await
    }

    /// A complaint the actor takes part in. Complaints outside the actor's reach are
    /// reported as missing.
    pub async fn complaint_for(
        &self,
        actor: &Identity,
        complaint_id: Uuid,
    ) -> Result<Complaint, ServiceError> {
        match self.db_client.get_complaint(complaint_id).await? {
            Some(complaint) if workflow::can_view(actor, &complaint) => Ok(complaint),
            Some(_) => {
                tracing::debug!("{} cannot view complaint {}", actor.email, complaint_id);
                Err(ServiceError::ComplaintNotFound(complaint_id))
            }
            None => Err(ServiceError::ComplaintNotFound(complaint_id)),
        }
    }

    /// Moves a complaint along the workflow and, when `agent_id` is given, (re)assigns it.
    /// The checks run once up front and again against the stored record under the write lock.
    pub async fn update_status(
        &self,
        actor: &Identity,
        complaint_id: Uuid,
        status: ComplaintStatus,
        agent_id: Option<Uuid>,
    ) -> Result<Complaint, ServiceError> {
        let complaint = self.complaint_for(actor, complaint_id).await?;
        let assignment = authorize_update(actor, &complaint, status, agent_id)?;

        self.latency.simulate(Operation::UpdateStatus).await?;

        let check = |current: &Complaint| -> Result<(), ServiceError> {
            if !workflow::can_view(actor, current) {
                return Err(ServiceError::ComplaintNotFound(complaint_id));
            }
            authorize_update(actor, current, status, agent_id).map(|_| ())
        };

        let updated = self
            .db_client
            .update_complaint_status(complaint_id, status, assignment, &check)
            .await?;

        tracing::info!(
            "Complaint {} moved to {} by {}",
            complaint_id,
            updated.status,
            actor.email
        );
        Ok(updated)
    }

    pub async fn assign_agent(
        &self,
        actor: &Identity,
        complaint_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Complaint, ServiceError> {
        self.update_status(actor, complaint_id, ComplaintStatus::InProgress, Some(agent_id))
            .await
    }

    pub async fn add_message(
        &self,
        actor: &Identity,
        complaint_id: Uuid,
        text: String,
    ) -> Result<ComplaintMessage, ServiceError> {
        self.complaint_for(actor, complaint_id).await?;
        self.latency.simulate(Operation::AddMessage).await?;

        let message = self
            .db_client
            .add_complaint_message(complaint_id, actor, text)
            .await?;

        tracing::debug!("{} wrote on complaint {}", actor.email, complaint_id);
        Ok(message)
    }

    pub async fn messages(
        &self,
        actor: &Identity,
        complaint_id: Uuid,
    ) -> Result<Vec<ComplaintMessage>, ServiceError> {
        Ok(self.complaint_for(actor, complaint_id).await?.messages)
    }
}

/// Permission and transition checks for a status update against `complaint` as it
/// currently stands. Returns the assignment to apply, if any.
fn authorize_update(
    actor: &Identity,
    complaint: &Complaint,
    status: ComplaintStatus,
    agent_id: Option<Uuid>,
) -> Result<Option<AgentAssignment>, ServiceError> {
    let assignment = match agent_id {
        Some(agent_id) => {
            workflow::may_assign(actor, complaint)?;
            if status != ComplaintStatus::InProgress {
                return Err(ServiceError::IllegalTransition {
                    from: complaint.status,
                    to: status,
                });
            }
            Some(fixtures::agent_assignment(agent_id).ok_or(ServiceError::UnknownAgent(agent_id))?)
        }
        None => {
            if !workflow::may_change_status(actor, complaint, status) {
                return Err(ServiceError::ActionNotPermitted(actor.role, complaint.id));
            }
            None
        }
    };

    // Re-assigning a complaint that is already being worked keeps its status.
    let reassignment = assignment.is_some() && complaint.status == ComplaintStatus::InProgress;
    if !reassignment {
        workflow::check_transition(complaint.status, status)?;
    }

    Ok(assignment)
}
