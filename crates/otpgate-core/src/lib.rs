//! Shared plumbing for otpgate services: tracing setup, env configuration,
//! the JSON response envelope, health probes and request-id middleware.

pub mod config;
pub mod health;
pub mod middleware;
pub mod response;
pub mod timestamp;
pub mod tracing;
