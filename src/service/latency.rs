use std::time::Duration;

use crate::service::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    Submit,
    UpdateStatus,
    AddMessage,
}

impl Operation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Login => "Login failed",
            Operation::Register => "Registration failed",
            Operation::Submit => "Failed to submit complaint",
            Operation::UpdateStatus => "Failed to update complaint",
            Operation::AddMessage => "Failed to send message",
        }
    }
}

/// Simulated backend round-trip applied before mock operations take effect.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyPolicy {
    pub auth: Duration,
    pub submit: Duration,
    pub update: Duration,
    pub message: Duration,
    /// Probability in `[0, 1]` that an operation fails after its delay.
    pub failure_rate: f64,
}

impl LatencyPolicy {
    pub fn none() -> Self {
        LatencyPolicy {
            auth: Duration::ZERO,
            submit: Duration::ZERO,
            update: Duration::ZERO,
            message: Duration::ZERO,
            failure_rate: 0.0,
        }
    }

    /// Delays the browser client used to fake its network calls.
    pub fn parity() -> Self {
        LatencyPolicy {
            auth: Duration::from_millis(1000),
            submit: Duration::from_millis(1000),
            update: Duration::from_millis(500),
            message: Duration::ZERO,
            failure_rate: 0.0,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "none" | "off" | "" => Some(LatencyPolicy::none()),
            "parity" => Some(LatencyPolicy::parity()),
            _ => None,
        }
    }

    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn delay_for(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Login | Operation::Register => self.auth,
            Operation::Submit => self.submit,
            Operation::UpdateStatus => self.update,
            Operation::AddMessage => self.message,
        }
    }

    pub async fn simulate(&self, operation: Operation) -> Result<(), ServiceError> {
        let delay = self.delay_for(operation);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failure_rate > 0.0 && rand::random::<f64>() < self.failure_rate {
            tracing::warn!("Simulated failure for {:?}", operation);
            return Err(ServiceError::SimulatedFailure(operation.failure_message().to_string()));
        }

        Ok(())
    }
}

impl Default for LatencyPolicy {
    fn default() -> Self {
        LatencyPolicy::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_matches_client_delays() {
        let policy = LatencyPolicy::parity();
        assert_eq!(policy.delay_for(Operation::Login), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(Operation::UpdateStatus), Duration::from_millis(500));
        assert_eq!(policy.delay_for(Operation::AddMessage), Duration::ZERO);
    }

    #[test]
    fn names_resolve() {
        assert_eq!(LatencyPolicy::from_name("Parity"), Some(LatencyPolicy::parity()));
        assert_eq!(LatencyPolicy::from_name("none"), Some(LatencyPolicy::none()));
        assert!(LatencyPolicy::from_name("slow").is_none());
    }

    #[test]
    fn failure_rate_is_clamped() {
        assert_eq!(LatencyPolicy::none().with_failure_rate(3.0).failure_rate, 1.0);
        assert_eq!(LatencyPolicy::none().with_failure_rate(-1.0).failure_rate, 0.0);
    }

    #[tokio::test]
    async fn certain_failure_reports_operation_message() {
        let policy = LatencyPolicy::none().with_failure_rate(1.0);
        let err = policy.simulate(Operation::Submit).await.unwrap_err();
        assert_eq!(err, ServiceError::SimulatedFailure("Failed to submit complaint".to_string()));
    }

    #[tokio::test]
    async fn delays_are_awaited() {
        let policy = LatencyPolicy {
            update: Duration::from_millis(20),
            ..LatencyPolicy::none()
        };
        let started = std::time::Instant::now();
        policy.simulate(Operation::UpdateStatus).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
