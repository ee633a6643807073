// src/service/workflow.rs
//! Complaint lifecycle: Pending -> In Progress -> Resolved -> Closed.
//!
//! Every status change goes through [`check_transition`]. The store applies it through
//! the check it is handed, so the decision and the write happen under one lock.

use serde::Serialize;

use crate::{
    models::{
        complaintmodel::{Complaint, ComplaintStatus},
        usermodel::{Identity, UserRole},
    },
    service::error::ServiceError,
};

const TRANSITIONS: &[(ComplaintStatus, ComplaintStatus)] = &[
    (ComplaintStatus::Pending, ComplaintStatus::InProgress),
    (ComplaintStatus::InProgress, ComplaintStatus::Resolved),
    (ComplaintStatus::Resolved, ComplaintStatus::Closed),
];

impl ComplaintStatus {
    pub fn can_transition_to(&self, target: ComplaintStatus) -> bool {
        TRANSITIONS
            .iter()
            .any(|(from, to)| from == self && *to == target)
    }

    pub fn next(&self) -> Option<ComplaintStatus> {
        TRANSITIONS
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, to)| *to)
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintAction {
    AssignAgent,
    StartWorking,
    MarkResolved,
    Close,
}

impl ComplaintAction {
    pub fn label(&self) -> &'static str {
        match self {
            ComplaintAction::AssignAgent => "Assign Agent",
            ComplaintAction::StartWorking => "Start Working",
            ComplaintAction::MarkResolved => "Mark Resolved",
            ComplaintAction::Close => "Close",
        }
    }

    pub fn target(&self) -> ComplaintStatus {
        match self {
            ComplaintAction::AssignAgent | ComplaintAction::StartWorking => ComplaintStatus::InProgress,
            ComplaintAction::MarkResolved => ComplaintStatus::Resolved,
            ComplaintAction::Close => ComplaintStatus::Closed,
        }
    }
}

pub fn check_transition(from: ComplaintStatus, to: ComplaintStatus) -> Result<(), ServiceError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ServiceError::IllegalTransition { from, to })
    }
}

/// Whether `actor` may move `complaint` to `target`. Only checks who is acting; the
/// transition itself is validated by [`check_transition`].
pub fn may_change_status(actor: &Identity, complaint: &Complaint, target: ComplaintStatus) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Agent => {
            complaint.is_assigned_to(actor.id) && target != ComplaintStatus::Closed
        }
        UserRole::User => false,
    }
}

/// Complaints accept a (re)assignment while nobody has finished working them.
pub fn may_assign(actor: &Identity, complaint: &Complaint) -> Result<(), ServiceError> {
    if !actor.is_admin() {
        return Err(ServiceError::ActionNotPermitted(actor.role, complaint.id));
    }

    match complaint.status {
        ComplaintStatus::Pending | ComplaintStatus::InProgress => Ok(()),
        ComplaintStatus::Resolved | ComplaintStatus::Closed => Err(ServiceError::IllegalTransition {
            from: complaint.status,
            to: ComplaintStatus::InProgress,
        }),
    }
}

/// Whether `actor` is a participant of the complaint's conversation.
pub fn can_view(actor: &Identity, complaint: &Complaint) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Agent => complaint.is_assigned_to(actor.id) || complaint.user_id == actor.id,
        UserRole::User => complaint.user_id == actor.id,
    }
}

/// Buttons the views offer for a complaint, in display order.
pub fn available_actions(actor: &Identity, complaint: &Complaint) -> Vec<ComplaintAction> {
    let mut actions = Vec::new();

    match actor.role {
        UserRole::Admin => {
            match complaint.status {
                ComplaintStatus::Pending => actions.push(ComplaintAction::AssignAgent),
                ComplaintStatus::InProgress => actions.push(ComplaintAction::MarkResolved),
                ComplaintStatus::Resolved => actions.push(ComplaintAction::Close),
                ComplaintStatus::Closed => {}
            }
        }
        UserRole::Agent if complaint.is_assigned_to(actor.id) => {
            match complaint.status {
                ComplaintStatus::Pending => actions.push(ComplaintAction::StartWorking),
                ComplaintStatus::InProgress => actions.push(ComplaintAction::MarkResolved),
                ComplaintStatus::Resolved | ComplaintStatus::Closed => {}
            }
        }
        UserRole::Agent | UserRole::User => {}
    }

    actions
}
