// src/service/views.rs
//! View models behind the page routes: what each screen shows, already filtered.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    dtos::complaintdtos::MIN_DESCRIPTION_LENGTH,
    models::{
        complaintmodel::*,
        usermodel::{Identity, UserRole},
    },
    service::{
        error::ServiceError,
        workflow::{self, ComplaintAction},
    },
};

pub const ALL_STATUSES: &str = "All";

/// `None` and `"All"` select everything.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<ComplaintStatus>, ServiceError> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some(value) if value.is_empty() || value.eq_ignore_ascii_case(ALL_STATUSES) => Ok(None),
        Some(value) => value
            .parse::<ComplaintStatus>()
            .map(Some)
            .map_err(ServiceError::Validation),
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
    pub unassigned: usize,
    pub high_priority: usize,
}

impl DashboardStats {
    pub fn from_complaints(complaints: &[Complaint]) -> Self {
        let count = |status: ComplaintStatus| complaints.iter().filter(|c| c.status == status).count();

        DashboardStats {
            total: complaints.len(),
            pending: count(ComplaintStatus::Pending),
            in_progress: count(ComplaintStatus::InProgress),
            resolved: count(ComplaintStatus::Resolved),
            closed: count(ComplaintStatus::Closed),
            unassigned: complaints.iter().filter(|c| c.agent_id.is_none()).count(),
            high_priority: complaints
                .iter()
                .filter(|c| c.priority == ComplaintPriority::High)
                .count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionView {
    pub action: ComplaintAction,
    pub label: &'static str,
    pub target: ComplaintStatus,
}

impl From<ComplaintAction> for ActionView {
    fn from(action: ComplaintAction) -> Self {
        ActionView {
            action,
            label: action.label(),
            target: action.target(),
        }
    }
}

fn actions_for(viewer: &Identity, complaint: &Complaint) -> Vec<ActionView> {
    workflow::available_actions(viewer, complaint)
        .into_iter()
        .map(ActionView::from)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub status: ComplaintStatus,
    pub next_status: Option<ComplaintStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub agent_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
    pub link: String,
    pub actions: Vec<ActionView>,
}

impl ComplaintCard {
    fn build(viewer: &Identity, complaint: &Complaint, show_user: bool) -> Self {
        ComplaintCard {
            id: complaint.id,
            title: complaint.title.clone(),
            description: complaint.description.clone(),
            category: complaint.category,
            priority: complaint.priority,
            status: complaint.status,
            next_status: complaint.status.next(),
            user_name: show_user.then(|| complaint.user_name.clone()),
            agent_name: complaint.agent_name.clone(),
            created_at: complaint.created_at,
            updated_at: complaint.updated_at,
            message_count: complaint.messages.len(),
            link: format!("/complaint/{}", complaint.id),
            actions: actions_for(viewer, complaint),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub view: &'static str,
    pub heading: String,
    pub stats: DashboardStats,
    pub selected_status: String,
    pub showing: usize,
    pub total: usize,
    pub notices: Vec<String>,
    pub complaints: Vec<ComplaintCard>,
}

fn list_view(
    view: &'static str,
    heading: String,
    viewer: &Identity,
    complaints: &[Complaint],
    selected: Option<ComplaintStatus>,
    show_user: bool,
    notices: Vec<String>,
) -> ListView {
    let cards: Vec<ComplaintCard> = complaints
        .iter()
        .filter(|c| selected.map_or(true, |status| c.status == status))
        .map(|c| ComplaintCard::build(viewer, c, show_user))
        .collect();

    ListView {
        view,
        heading,
        stats: DashboardStats::from_complaints(complaints),
        selected_status: selected.map_or(ALL_STATUSES, |s| s.to_str()).to_string(),
        showing: cards.len(),
        total: complaints.len(),
        notices,
        complaints: cards,
    }
}

/// `complaints` is everything the viewer submitted; the status filter is applied here so
/// the stats still cover the whole list.
pub fn user_dashboard(
    viewer: &Identity,
    complaints: &[Complaint],
    selected: Option<ComplaintStatus>,
) -> ListView {
    list_view(
        "dashboard",
        format!("Welcome back, {}!", viewer.name),
        viewer,
        complaints,
        selected,
        false,
        Vec::new(),
    )
}

pub fn agent_dashboard(
    viewer: &Identity,
    complaints: &[Complaint],
    selected: Option<ComplaintStatus>,
) -> ListView {
    let stats = DashboardStats::from_complaints(complaints);
    let mut summary = format!(
        "You have resolved {} out of {} assigned complaints.",
        stats.resolved, stats.total
    );
    if stats.in_progress > 0 {
        summary.push_str(&format!(" {} cases are currently in progress.", stats.in_progress));
    }

    list_view(
        "agent",
        "Agent Dashboard".to_string(),
        viewer,
        complaints,
        selected,
        true,
        vec![summary],
    )
}

pub fn admin_dashboard(
    viewer: &Identity,
    complaints: &[Complaint],
    selected: Option<ComplaintStatus>,
) -> ListView {
    let stats = DashboardStats::from_complaints(complaints);
    let mut notices = Vec::new();
    if stats.unassigned > 0 {
        notices.push(format!("{} complaints need agent assignment", stats.unassigned));
    }
    if stats.high_priority > 0 {
        notices.push(format!(
            "{} urgent complaints require immediate attention",
            stats.high_priority
        ));
    }

    list_view(
        "admin",
        "Admin Dashboard".to_string(),
        viewer,
        complaints,
        selected,
        true,
        notices,
    )
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub label: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub view: &'static str,
    pub complaint: Complaint,
    pub timeline: Vec<TimelineEntry>,
    pub actions: Vec<ActionView>,
    pub is_final: bool,
}

pub fn complaint_detail(viewer: &Identity, complaint: Complaint) -> DetailView {
    let mut timeline = vec![TimelineEntry {
        label: "Complaint Submitted",
        detail: format!("by {}", complaint.user_name),
        at: Some(complaint.created_at),
    }];

    if let Some(agent_name) = &complaint.agent_name {
        timeline.push(TimelineEntry {
            label: "Agent Assigned",
            detail: agent_name.clone(),
            at: None,
        });
    }

    match complaint.status {
        ComplaintStatus::Pending => {}
        ComplaintStatus::InProgress => timeline.push(TimelineEntry {
            label: "Under Investigation",
            detail: "Currently being processed".to_string(),
            at: Some(complaint.updated_at),
        }),
        ComplaintStatus::Resolved => timeline.push(TimelineEntry {
            label: "Complaint Resolved",
            detail: "Issue has been resolved".to_string(),
            at: Some(complaint.updated_at),
        }),
        ComplaintStatus::Closed => timeline.push(TimelineEntry {
            label: "Complaint Closed",
            detail: "No further action required".to_string(),
            at: Some(complaint.updated_at),
        }),
    }

    DetailView {
        view: "complaint",
        actions: actions_for(viewer, &complaint),
        is_final: complaint.status.is_terminal(),
        complaint,
        timeline,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundView {
    pub view: &'static str,
    pub title: &'static str,
    pub message: String,
    pub back: &'static str,
}

pub fn not_found(message: String) -> NotFoundView {
    NotFoundView {
        view: "not_found",
        title: "Complaint Not Found",
        message,
        back: "/dashboard",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityOption {
    pub value: ComplaintPriority,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormView {
    pub view: &'static str,
    pub categories: Vec<&'static str>,
    pub priorities: Vec<PriorityOption>,
    pub default_priority: ComplaintPriority,
    pub min_description_length: usize,
}

pub fn submit_form() -> SubmitFormView {
    SubmitFormView {
        view: "submit_complaint",
        categories: ComplaintCategory::ALL.iter().map(|c| c.to_str()).collect(),
        priorities: ComplaintPriority::ALL
            .iter()
            .map(|p| PriorityOption {
                value: *p,
                label: p.to_str(),
                description: p.description(),
            })
            .collect(),
        default_priority: ComplaintPriority::default(),
        min_description_length: MIN_DESCRIPTION_LENGTH,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavLink {
    pub path: &'static str,
    pub label: &'static str,
}

pub fn nav_links(viewer: Option<&Identity>) -> Vec<NavLink> {
    let Some(viewer) = viewer else {
        return vec![
            NavLink { path: "/", label: "Home" },
            NavLink { path: "/login", label: "Login" },
            NavLink { path: "/register", label: "Register" },
        ];
    };

    let mut links = vec![
        NavLink { path: "/dashboard", label: "Dashboard" },
        NavLink { path: "/submit-complaint", label: "Submit Complaint" },
    ];
    match viewer.role {
        UserRole::Admin => links.push(NavLink { path: "/admin", label: "Admin Panel" }),
        UserRole::Agent => links.push(NavLink { path: "/agent", label: "Agent Panel" }),
        UserRole::User => {}
    }
    links
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicView {
    pub view: &'static str,
    pub app: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_in_as: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub nav: Vec<NavLink>,
}

pub fn public_view(view: &'static str, viewer: Option<&Identity>, from: Option<String>) -> PublicView {
    PublicView {
        view,
        app: "ResolveNow",
        signed_in_as: viewer.cloned(),
        from,
        nav: nav_links(viewer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    #[test]
    fn status_filter_accepts_all() {
        assert_eq!(parse_status_filter(None), Ok(None));
        assert_eq!(parse_status_filter(Some("All")), Ok(None));
        assert_eq!(
            parse_status_filter(Some("In Progress")),
            Ok(Some(ComplaintStatus::InProgress))
        );
        assert!(matches!(
            parse_status_filter(Some("Lost")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn stats_cover_whole_list() {
        let stats = DashboardStats::from_complaints(&fixtures::seed_complaints());
        assert_eq!(
            stats,
            DashboardStats {
                total: 2,
                pending: 1,
                in_progress: 1,
                resolved: 0,
                closed: 0,
                unassigned: 1,
                high_priority: 1,
            }
        );
    }

    #[test]
    fn filtered_list_keeps_full_stats() {
        let john = fixtures::john();
        let view = user_dashboard(&john, &fixtures::seed_complaints(), Some(ComplaintStatus::Pending));

        assert_eq!(view.selected_status, "Pending");
        assert_eq!(view.showing, 1);
        assert_eq!(view.total, 2);
        assert_eq!(view.stats.total, 2);
        assert!(view.complaints.iter().all(|c| c.user_name.is_none()));
    }

    #[test]
    fn admin_sees_notices_and_assign_action() {
        let admin = fixtures::admin();
        let view = admin_dashboard(&admin, &fixtures::seed_complaints(), None);

        assert_eq!(
            view.notices,
            vec![
                "1 complaints need agent assignment".to_string(),
                "1 urgent complaints require immediate attention".to_string(),
            ]
        );
        let billing = view.complaints.iter().find(|c| c.title == "Billing Issue").unwrap();
        assert_eq!(billing.actions[0].action, ComplaintAction::AssignAgent);
        assert_eq!(billing.user_name.as_deref(), Some("John Doe"));
    }

    #[test]
    fn agent_summary_mentions_progress() {
        let agent = fixtures::agent();
        let assigned: Vec<Complaint> = fixtures::seed_complaints()
            .into_iter()
            .filter(|c| c.is_assigned_to(agent.id))
            .collect();
        let view = agent_dashboard(&agent, &assigned, None);

        assert_eq!(
            view.notices[0],
            "You have resolved 0 out of 1 assigned complaints. 1 cases are currently in progress."
        );
        assert_eq!(view.complaints[0].actions[0].action, ComplaintAction::MarkResolved);
    }

    #[test]
    fn detail_timeline_tracks_progress() {
        let complaint = fixtures::seed_complaints().remove(0);
        let view = complaint_detail(&fixtures::john(), complaint);

        let labels: Vec<_> = view.timeline.iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["Complaint Submitted", "Agent Assigned", "Under Investigation"]);
        assert!(view.actions.is_empty());
        assert!(!view.is_final);
    }

    #[test]
    fn nav_depends_on_role() {
        assert_eq!(nav_links(None).len(), 3);
        let admin_links = nav_links(Some(&fixtures::admin()));
        assert!(admin_links.iter().any(|l| l.path == "/admin"));
        assert!(!nav_links(Some(&fixtures::john())).iter().any(|l| l.path == "/admin"));
        assert!(nav_links(Some(&fixtures::agent())).iter().any(|l| l.path == "/agent"));
    }

    #[test]
    fn form_lists_every_category() {
        let form = submit_form();
        assert_eq!(form.categories.len(), 8);
        assert_eq!(form.default_priority, ComplaintPriority::Medium);
        assert_eq!(form.min_description_length, 20);
    }
}
