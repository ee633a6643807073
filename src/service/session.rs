// src/service/session.rs
//! The logged-in identity of one client.
//!
//! A session starts out `Loading` until [`SessionStore::restore`] has looked at the
//! durable storage. Login and registration are mocked: no password is ever checked and
//! both always succeed unless the latency policy injects a failure.

use uuid::Uuid;

use crate::{
    db::fixtures,
    models::usermodel::{Identity, UserRole},
    service::{
        error::ServiceError,
        latency::{LatencyPolicy, Operation},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Anonymous,
    Authenticated(Identity),
}

/// Where a session keeps its identity between requests.
pub trait IdentityStorage {
    fn load(&self) -> Option<Identity>;
    fn save(&mut self, identity: &Identity) -> Result<(), ServiceError>;
    fn clear(&mut self);
}

#[derive(Debug, Clone)]
pub struct RegisterProfile {
    pub name: String,
    pub email: String,
}

pub struct SessionStore<S> {
    state: SessionState,
    storage: S,
    latency: LatencyPolicy,
}

impl<S: IdentityStorage> SessionStore<S> {
    pub fn new(storage: S, latency: LatencyPolicy) -> Self {
        SessionStore {
            state: SessionState::Loading,
            storage,
            latency,
        }
    }

    pub fn restore(&mut self) -> &SessionState {
        self.state = match self.storage.load() {
            Some(identity) => SessionState::Authenticated(identity),
            None => SessionState::Anonymous,
        };
        &self.state
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Loading | SessionState::Anonymous => None,
        }
    }

    pub async fn login(&mut self, email: &str, _password: &str) -> Result<Identity, ServiceError> {
        self.latency.simulate(Operation::Login).await?;

        let identity = resolve_login(email);
        tracing::info!("Login as {} ({})", identity.email, identity.role);
        self.persist(identity)
    }

    pub async fn register(&mut self, profile: RegisterProfile) -> Result<Identity, ServiceError> {
        self.latency.simulate(Operation::Register).await?;

        let identity = Identity::new(
            Uuid::new_v4(),
            profile.name.trim(),
            profile.email.trim(),
            UserRole::User,
        );
        tracing::info!("Registered {} as {}", identity.email, identity.id);
        self.persist(identity)
    }

    pub fn logout(&mut self) {
        if let Some(identity) = self.current() {
            tracing::info!("Logout {}", identity.email);
        }
        self.storage.clear();
        self.state = SessionState::Anonymous;
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self, identity: Identity) -> Result<Identity, ServiceError> {
        self.storage.save(&identity)?;
        self.state = SessionState::Authenticated(identity.clone());
        Ok(identity)
    }
}

/// Fixture emails map to their fixed identities; anyone else becomes a new `user`.
pub fn resolve_login(email: &str) -> Identity {
    fixtures::identity_for_email(email).unwrap_or_else(|| {
        Identity::new(
            Uuid::new_v4(),
            display_name_from_email(email),
            email.trim(),
            UserRole::User,
        )
    })
}

fn display_name_from_email(email: &str) -> String {
    let local = email.trim().split('@').next().unwrap_or_default();
    let words: Vec<String> = local
        .split(|c: char| c == '.' || c == '_' || c == '-' || c == '+')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "User".to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MemoryStorage {
        slot: Option<Identity>,
    }

    impl IdentityStorage for MemoryStorage {
        fn load(&self) -> Option<Identity> {
            self.slot.clone()
        }

        fn save(&mut self, identity: &Identity) -> Result<(), ServiceError> {
            self.slot = Some(identity.clone());
            Ok(())
        }

        fn clear(&mut self) {
            self.slot = None;
        }
    }

    fn store() -> SessionStore<MemoryStorage> {
        SessionStore::new(MemoryStorage::default(), LatencyPolicy::none())
    }

    #[test]
    fn starts_loading_then_restores_anonymous() {
        let mut session = store();
        assert_eq!(session.state(), &SessionState::Loading);
        assert_eq!(session.restore(), &SessionState::Anonymous);
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn fixture_emails_get_fixed_roles() {
        let cases = [
            (fixtures::ADMIN_EMAIL, UserRole::Admin, fixtures::ADMIN_ID),
            (fixtures::AGENT_EMAIL, UserRole::Agent, fixtures::AGENT_ID),
            (fixtures::JOHN_EMAIL, UserRole::User, fixtures::JOHN_ID),
        ];

        for (email, role, id) in cases {
            let mut session = store();
            let identity = session.login(email, "ignored").await.unwrap();
            assert_eq!(identity.role, role);
            assert_eq!(identity.id, id);
        }
    }

    #[tokio::test]
    async fn unknown_email_is_a_fresh_user() {
        let mut session = store();
        let first = session.login("mary.jane@example.com", "x").await.unwrap();
        assert_eq!(first.role, UserRole::User);
        assert_eq!(first.name, "Mary Jane");
        assert_eq!(first.email, "mary.jane@example.com");

        let second = store().login("mary.jane@example.com", "x").await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn login_persists_and_restore_reads_it_back() {
        let mut session = store();
        let identity = session.login(fixtures::AGENT_EMAIL, "pw").await.unwrap();

        let mut reloaded = SessionStore::new(session.into_storage(), LatencyPolicy::none());
        assert_eq!(reloaded.restore(), &SessionState::Authenticated(identity));
    }

    #[tokio::test]
    async fn register_always_creates_a_user() {
        let mut session = store();
        let identity = session
            .register(RegisterProfile {
                name: " Ada Lovelace ".to_string(),
                email: "admin@resolvenow.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(identity.role, UserRole::User);
        assert_eq!(identity.name, "Ada Lovelace");
        assert_ne!(identity.id, fixtures::ADMIN_ID);
        assert_eq!(session.current(), Some(&identity));
    }

    #[tokio::test]
    async fn logout_clears_storage() {
        let mut session = store();
        session.login(fixtures::JOHN_EMAIL, "pw").await.unwrap();
        session.logout();

        assert_eq!(session.state(), &SessionState::Anonymous);
        assert!(session.into_storage().load().is_none());
    }

    #[tokio::test]
    async fn injected_failure_leaves_session_untouched() {
        let mut session = SessionStore::new(
            MemoryStorage::default(),
            LatencyPolicy::none().with_failure_rate(1.0),
        );
        session.restore();

        let err = session.login(fixtures::ADMIN_EMAIL, "pw").await.unwrap_err();
        assert_eq!(err, ServiceError::SimulatedFailure("Login failed".to_string()));
        assert_eq!(session.state(), &SessionState::Anonymous);
    }

    #[test]
    fn display_names_fall_back_to_user() {
        assert_eq!(display_name_from_email("@nowhere"), "User");
        assert_eq!(display_name_from_email("sam_o-neil@x.io"), "Sam O Neil");
    }
}
