// src/api/fake.rs

//! In-memory `GremlinApi` used by orchestrator tests.
//!
//! Holds objects per team, hands out sequential identifiers on create and
//! records every call in order so tests can assert on sequencing.

use super::GremlinApi;
use crate::error::{ApiError, ObjectKind};
use crate::model::{HealthCheck, Integration, JsonMap, Scenario};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(ObjectKind, String),
    Create(ObjectKind, String, String),
    Update(String),
    Delete(ObjectKind, String),
}

impl Call {
    pub fn is_delete(&self) -> bool {
        matches!(self, Call::Delete(..))
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Call::Create(..))
    }
}

#[derive(Default)]
struct State {
    health_checks: BTreeMap<String, Vec<HealthCheck>>,
    scenarios: BTreeMap<String, Vec<Scenario>>,
    integrations: BTreeMap<String, Vec<Integration>>,
    calls: Vec<Call>,
    failing_creates: BTreeSet<String>,
    failing_lists: BTreeMap<String, u16>,
    failing_deletes: BTreeSet<String>,
    reject_status: Option<u16>,
    next_id: usize,
}

#[derive(Default)]
pub struct FakeGremlin {
    state: Mutex<State>,
}

fn object(v: Value) -> JsonMap {
    v.as_object().cloned().expect("fixture must be a JSON object")
}

fn name_of(obj: &JsonMap) -> String {
    obj.get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("Unnamed")
        .to_string()
}

impl FakeGremlin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_health_check(self, team: &str, check: Value) -> Self {
        self.with(|s| {
            s.health_checks
                .entry(team.to_string())
                .or_default()
                .push(HealthCheck(object(check)))
        })
    }

    pub fn with_scenario(self, team: &str, scenario: Value) -> Self {
        self.with(|s| {
            s.scenarios
                .entry(team.to_string())
                .or_default()
                .push(Scenario(object(scenario)))
        })
    }

    pub fn with_integration(self, team: &str, integration: Value) -> Self {
        self.with(|s| {
            s.integrations
                .entry(team.to_string())
                .or_default()
                .push(Integration(object(integration)))
        })
    }

    /// Creates of objects with this name answer HTTP 500.
    pub fn failing_create(self, name: &str) -> Self {
        self.with(|s| {
            s.failing_creates.insert(name.to_string());
        })
    }

    /// Every listing for this team answers HTTP 500.
    pub fn failing_list(self, team: &str) -> Self {
        self.rejecting_list(team, 500)
    }

    /// Every listing for this team answers with `status`.
    pub fn rejecting_list(self, team: &str, status: u16) -> Self {
        self.with(|s| {
            s.failing_lists.insert(team.to_string(), status);
        })
    }

    /// Deletes of the object with this identifier answer HTTP 500.
    pub fn failing_delete(self, id: &str) -> Self {
        self.with(|s| {
            s.failing_deletes.insert(id.to_string());
        })
    }

    /// Every call answers with `status`.
    pub fn rejecting(self, status: u16) -> Self {
        self.with(|s| s.reject_status = Some(status))
    }

    fn with(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut *self.state.lock().unwrap());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn health_checks(&self, team: &str) -> Vec<HealthCheck> {
        let s = self.state.lock().unwrap();
        s.health_checks.get(team).cloned().unwrap_or_default()
    }

    pub fn scenarios(&self, team: &str) -> Vec<Scenario> {
        let s = self.state.lock().unwrap();
        s.scenarios.get(team).cloned().unwrap_or_default()
    }

    pub fn integrations(&self, team: &str) -> Vec<Integration> {
        let s = self.state.lock().unwrap();
        s.integrations.get(team).cloned().unwrap_or_default()
    }

    fn list<T: Clone>(
        &self,
        kind: ObjectKind,
        team: &str,
        pick: impl FnOnce(&State) -> Option<&Vec<T>>,
    ) -> Result<Vec<T>, ApiError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::List(kind, team.to_string()));
        check_reject(&s)?;
        if let Some(&status) = s.failing_lists.get(team) {
            return Err(ApiError::Status {
                status,
                body: "simulated failure".to_string(),
            });
        }
        Ok(pick(&*s).cloned().unwrap_or_default())
    }

    /// Record a create, fail it if configured, otherwise return a fresh identifier.
    fn begin_delete(s: &mut State, kind: ObjectKind, id: &str) -> Result<(), ApiError> {
        s.calls.push(Call::Delete(kind, id.to_string()));
        check_reject(s)?;
        if s.failing_deletes.contains(id) {
            return Err(server_error());
        }
        Ok(())
    }

    fn begin_create(s: &mut State, kind: ObjectKind, team: &str, name: String) -> Result<String, ApiError> {
        s.calls.push(Call::Create(kind, team.to_string(), name.clone()));
        check_reject(s)?;
        if s.failing_creates.contains(&name) {
            return Err(server_error());
        }
        s.next_id += 1;
        Ok(format!("new-{}", s.next_id))
    }
}

fn check_reject(s: &State) -> Result<(), ApiError> {
    match s.reject_status {
        Some(status) => Err(ApiError::Status {
            status,
            body: "rejected".to_string(),
        }),
        None => Ok(()),
    }
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        body: "simulated failure".to_string(),
    }
}

#[async_trait]
impl GremlinApi for FakeGremlin {
    async fn list_health_checks(&self, team_id: &str) -> Result<Vec<HealthCheck>, ApiError> {
        self.list(ObjectKind::HealthCheck, team_id, |s| s.health_checks.get(team_id))
    }

    async fn create_health_check(
        &self,
        team_id: &str,
        check: &HealthCheck,
    ) -> Result<String, ApiError> {
        let mut s = self.state.lock().unwrap();
        let id = Self::begin_create(&mut *s, ObjectKind::HealthCheck, team_id, name_of(&check.0))?;

        let mut stored = check.0.clone();
        stored.insert("identifier".to_string(), Value::String(id.clone()));
        s.health_checks
            .entry(team_id.to_string())
            .or_default()
            .push(HealthCheck(stored));
        Ok(id)
    }

    async fn update_health_check(
        &self,
        _team_id: &str,
        id: &str,
        _check: &HealthCheck,
    ) -> Result<(), ApiError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(Call::Update(id.to_string()));
        check_reject(&s)
    }

    async fn delete_health_check(&self, team_id: &str, id: &str) -> Result<(), ApiError> {
        let mut s = self.state.lock().unwrap();
        Self::begin_delete(&mut *s, ObjectKind::HealthCheck, id)?;
        if let Some(checks) = s.health_checks.get_mut(team_id) {
            checks.retain(|c| c.identifier() != Some(id));
        }
        Ok(())
    }

    async fn list_scenarios(&self, team_id: &str) -> Result<Vec<Scenario>, ApiError> {
        self.list(ObjectKind::Scenario, team_id, |s| s.scenarios.get(team_id))
    }

    async fn create_scenario(&self, team_id: &str, scenario: &Scenario) -> Result<(), ApiError> {
        let mut s = self.state.lock().unwrap();
        let id = Self::begin_create(&mut *s, ObjectKind::Scenario, team_id, name_of(&scenario.0))?;

        let mut stored = scenario.0.clone();
        stored.insert("guid".to_string(), Value::String(id));
        s.scenarios
            .entry(team_id.to_string())
            .or_default()
            .push(Scenario(stored));
        Ok(())
    }

    async fn delete_scenario(&self, team_id: &str, id: &str) -> Result<(), ApiError> {
        let mut s = self.state.lock().unwrap();
        Self::begin_delete(&mut *s, ObjectKind::Scenario, id)?;
        if let Some(scenarios) = s.scenarios.get_mut(team_id) {
            scenarios.retain(|c| c.identifier() != Some(id));
        }
        Ok(())
    }

    async fn list_integrations(&self, team_id: &str) -> Result<Vec<Integration>, ApiError> {
        self.list(ObjectKind::Integration, team_id, |s| s.integrations.get(team_id))
    }

    async fn create_integration(
        &self,
        team_id: &str,
        integration: &Integration,
    ) -> Result<(), ApiError> {
        let mut s = self.state.lock().unwrap();
        Self::begin_create(&mut *s, ObjectKind::Integration, team_id, name_of(&integration.0))?;
        s.integrations
            .entry(team_id.to_string())
            .or_default()
            .push(integration.clone());
        Ok(())
    }
}
