pub mod complaint_service;
pub mod error;
pub mod gate;
pub mod latency;
pub mod session;
pub mod views;
pub mod workflow;
