//! HTTP surface: liveness, health and device token registration.

pub mod routes;
pub mod state;
