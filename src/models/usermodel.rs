//1
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Agent,
    Admin,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::User => "user",
            UserRole::Agent => "agent",
            UserRole::Admin => "admin",
        }
    }

    /// Landing view for the role after login.
    pub fn home_path(&self) -> &'static str {
        match self {
            UserRole::User => "/dashboard",
            UserRole::Agent => "/agent",
            UserRole::Admin => "/admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// The logged-in person. There is no server-side user table: an identity lives in the
/// client's session token and is rebuilt from it on every request.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl Identity {
    pub fn new(id: Uuid, name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Identity {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&UserRole::Agent).unwrap();
        assert_eq!(json, "\"agent\"");

        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn home_path_per_role() {
        assert_eq!(UserRole::User.home_path(), "/dashboard");
        assert_eq!(UserRole::Agent.home_path(), "/agent");
        assert_eq!(UserRole::Admin.home_path(), "/admin");
    }
}
