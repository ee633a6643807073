// src/db/fixtures.rs
//! Mock identities and the two complaints every fresh store starts with.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{
    complaintmodel::{
        AgentAssignment, Complaint, ComplaintCategory, ComplaintMessage, ComplaintPriority,
        ComplaintStatus,
    },
    usermodel::{Identity, UserRole},
};

pub const ADMIN_EMAIL: &str = "admin@resolvenow.com";
pub const AGENT_EMAIL: &str = "agent@resolvenow.com";
pub const JOHN_EMAIL: &str = "john@example.com";

pub const ADMIN_ID: Uuid = Uuid::from_u128(1);
pub const AGENT_ID: Uuid = Uuid::from_u128(2);
pub const JOHN_ID: Uuid = Uuid::from_u128(3);

pub fn admin() -> Identity {
    Identity::new(ADMIN_ID, "Admin User", ADMIN_EMAIL, UserRole::Admin)
}

pub fn agent() -> Identity {
    Identity::new(AGENT_ID, "Agent Sarah", AGENT_EMAIL, UserRole::Agent)
}

pub fn john() -> Identity {
    Identity::new(JOHN_ID, "John Doe", JOHN_EMAIL, UserRole::User)
}

/// Fixed identity for a known email, compared case-insensitively.
pub fn identity_for_email(email: &str) -> Option<Identity> {
    let email = email.trim().to_lowercase();
    match email.as_str() {
        ADMIN_EMAIL => Some(admin()),
        AGENT_EMAIL => Some(agent()),
        JOHN_EMAIL => Some(john()),
        _ => None,
    }
}

/// Agents an admin can hand complaints to.
pub fn agents() -> Vec<Identity> {
    vec![agent()]
}

pub fn agent_assignment(agent_id: Uuid) -> Option<AgentAssignment> {
    agents()
        .into_iter()
        .find(|agent| agent.id == agent_id)
        .map(|agent| AgentAssignment {
            agent_id: agent.id,
            agent_name: agent.name,
        })
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn seed_complaints() -> Vec<Complaint> {
    let john = john();
    let sarah = agent();

    vec![
        Complaint {
            id: Uuid::from_u128(0x101),
            title: "Defective Product".to_string(),
            description: "The product I received has a manufacturing defect. The screen is cracked and the device won't turn on properly.".to_string(),
            category: ComplaintCategory::ProductQuality,
            priority: ComplaintPriority::High,
            status: ComplaintStatus::InProgress,
            user_id: john.id,
            user_name: john.name.clone(),
            user_email: john.email.clone(),
            agent_id: Some(sarah.id),
            agent_name: Some(sarah.name.clone()),
            created_at: at(2024, 1, 15, 0, 0),
            updated_at: at(2024, 1, 16, 0, 0),
            messages: vec![
                ComplaintMessage {
                    id: Uuid::from_u128(0x201),
                    sender_id: john.id,
                    sender_name: john.name.clone(),
                    text: "I received a defective product and need a replacement.".to_string(),
                    timestamp: at(2024, 1, 15, 10, 0),
                },
                ComplaintMessage {
                    id: Uuid::from_u128(0x202),
                    sender_id: sarah.id,
                    sender_name: sarah.name.clone(),
                    text: "Thank you for reporting this issue. I've escalated this to our quality team and we'll arrange a replacement for you.".to_string(),
                    timestamp: at(2024, 1, 16, 9, 30),
                },
            ],
        },
        Complaint {
            id: Uuid::from_u128(0x102),
            title: "Billing Issue".to_string(),
            description: "I was charged twice for the same order. Please refund the duplicate charge.".to_string(),
            category: ComplaintCategory::Billing,
            priority: ComplaintPriority::Medium,
            status: ComplaintStatus::Pending,
            user_id: john.id,
            user_name: john.name,
            user_email: john.email,
            agent_id: None,
            agent_name: None,
            created_at: at(2024, 1, 18, 0, 0),
            updated_at: at(2024, 1, 18, 0, 0),
            messages: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_emails_resolve_to_fixed_roles() {
        assert_eq!(identity_for_email(ADMIN_EMAIL).map(|i| i.role), Some(UserRole::Admin));
        assert_eq!(identity_for_email(AGENT_EMAIL).map(|i| i.role), Some(UserRole::Agent));
        assert_eq!(identity_for_email(JOHN_EMAIL).map(|i| i.role), Some(UserRole::User));
        assert_eq!(identity_for_email(" Admin@ResolveNow.com ").map(|i| i.id), Some(ADMIN_ID));
        assert!(identity_for_email("someone@else.com").is_none());
    }

    #[test]
    fn seeds_respect_timestamp_invariants() {
        for complaint in seed_complaints() {
            assert!(complaint.updated_at >= complaint.created_at);
            let stamps: Vec<_> = complaint.messages.iter().map(|m| m.timestamp).collect();
            assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn only_fixture_agents_can_be_assigned() {
        let assignment = agent_assignment(AGENT_ID).unwrap();
        assert_eq!(assignment.agent_name, "Agent Sarah");
        assert!(agent_assignment(JOHN_ID).is_none());
    }
}
