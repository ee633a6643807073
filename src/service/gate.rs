// src/service/gate.rs
use crate::{
    models::usermodel::UserRole,
    service::session::SessionState,
};

/// Client-side route table served by the view endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    SubmitComplaint,
    ComplaintDetails(String),
    Admin,
    Agent,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(UserRole),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The session has not been restored yet.
    Pending,
    Allow,
    RedirectToLogin { from: String },
    RedirectToDashboard,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["submit-complaint"] => Route::SubmitComplaint,
            ["complaint", id] => Route::ComplaintDetails((*id).to_string()),
            ["admin"] => Route::Admin,
            ["agent"] => Route::Agent,
            _ => Route::Unknown(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::SubmitComplaint => "/submit-complaint".to_string(),
            Route::ComplaintDetails(id) => format!("/complaint/{}", id),
            Route::Admin => "/admin".to_string(),
            Route::Agent => "/agent".to_string(),
            Route::Unknown(path) => path.clone(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::Login | Route::Register | Route::Unknown(_) => Access::Public,
            Route::Dashboard | Route::SubmitComplaint | Route::ComplaintDetails(_) => {
                Access::Authenticated
            }
            Route::Admin => Access::Role(UserRole::Admin),
            Route::Agent => Access::Role(UserRole::Agent),
        }
    }
}

pub fn check(state: &SessionState, route: &Route) -> GateDecision {
    let access = route.access();
    if access == Access::Public {
        return GateDecision::Allow;
    }

    match state {
        SessionState::Loading => GateDecision::Pending,
        SessionState::Anonymous => GateDecision::RedirectToLogin { from: route.path() },
        SessionState::Authenticated(identity) => match access {
            Access::Role(required) if identity.role != required => GateDecision::RedirectToDashboard,
            Access::Public | Access::Authenticated | Access::Role(_) => GateDecision::Allow,
        },
    }
}
