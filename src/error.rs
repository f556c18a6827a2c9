// src/error.rs

//! Error taxonomy.
//!
//! Two layers:
//! - `ApiError`: what went wrong talking to the Gremlin API (transport, status, body)
//! - `MigrateError`: what the orchestrator was doing when it happened
//!
//! Only `MigrateError::Authentication` is fatal to a run. Everything else is
//! recorded in the report and the migration moves on.

use std::fmt;
use thiserror::Error;

/// Failure of a single Gremlin API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("create succeeded but no identifier was returned")]
    MissingIdentifier,
}

impl ApiError {
    /// True when the API rejected the key itself (401 / 403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

/// The kinds of object a migration moves around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    HealthCheck,
    Scenario,
    Integration,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::HealthCheck => "health check",
            ObjectKind::Scenario => "scenario",
            ObjectKind::Integration => "integration",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("failed to list {kind}s for team {team_id}: {source}")]
    List {
        kind: ObjectKind,
        team_id: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to create {kind} '{name}': {source}")]
    Create {
        kind: ObjectKind,
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to delete {kind} '{name}': {source}")]
    Delete {
        kind: ObjectKind,
        name: String,
        #[source]
        source: ApiError,
    },
}

impl MigrateError {
    /// The API failure behind this error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            MigrateError::Authentication(_) => None,
            MigrateError::List { source, .. }
            | MigrateError::Create { source, .. }
            | MigrateError::Delete { source, .. } => Some(source),
        }
    }

    /// Promote an unauthorized API response to a fatal error, pass anything else through.
    pub(crate) fn escalate(self) -> Result<MigrateError, MigrateError> {
        match self {
            MigrateError::Authentication(_) => Err(self),
            _ if self.api_error().is_some_and(ApiError::is_unauthorized) => {
                Err(MigrateError::Authentication(self.to_string()))
            }
            _ => Ok(self),
        }
    }
}
