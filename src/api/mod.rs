// src/api/mod.rs

//! Gremlin management API seam.
//!
//! The orchestrator only ever talks to `GremlinApi`. Production uses the reqwest
//! client in `http`; tests swap in an in-memory double.

use crate::error::ApiError;
use crate::model::{HealthCheck, Integration, Scenario};
use async_trait::async_trait;

#[cfg(test)]
pub mod fake;
pub mod http;

pub use http::HttpGremlinClient;

pub const DEFAULT_BASE_URL: &str = "https://api.gremlin.com/v1";

/// Team-scoped operations on health checks, scenarios and external integrations.
///
/// One instance is bound to one API key; the team is passed per call.
#[async_trait]
pub trait GremlinApi: Send + Sync {
    async fn list_health_checks(&self, team_id: &str) -> Result<Vec<HealthCheck>, ApiError>;

    /// Create a health check and return its new identifier.
    async fn create_health_check(
        &self,
        team_id: &str,
        check: &HealthCheck,
    ) -> Result<String, ApiError>;

    /// Re-send a health check body to an existing identifier.
    async fn update_health_check(
        &self,
        team_id: &str,
        id: &str,
        check: &HealthCheck,
    ) -> Result<(), ApiError>;

    async fn delete_health_check(&self, team_id: &str, id: &str) -> Result<(), ApiError>;

    async fn list_scenarios(&self, team_id: &str) -> Result<Vec<Scenario>, ApiError>;

    async fn create_scenario(&self, team_id: &str, scenario: &Scenario) -> Result<(), ApiError>;

    async fn delete_scenario(&self, team_id: &str, id: &str) -> Result<(), ApiError>;

    async fn list_integrations(&self, team_id: &str) -> Result<Vec<Integration>, ApiError>;

    async fn create_integration(
        &self,
        team_id: &str,
        integration: &Integration,
    ) -> Result<(), ApiError>;
}
