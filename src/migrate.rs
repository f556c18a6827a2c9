// src/migrate.rs

//! Migration orchestration.
//!
//! For each source team, in order:
//! 1. Delete destination health checks (first team only, opt-in)
//! 2. Delete destination scenarios (first team only, opt-in)
//! 3. Copy health checks, building the source → destination ID map
//! 4. Copy scenarios, remapping their health-check references
//! 5. Copy external integrations not already present at the destination
//!
//! Failure policy:
//! - One object failing to copy or delete is logged, counted, and skipped
//! - A source listing failure aborts that source team only
//! - A 401/403 anywhere aborts the run

use crate::api::GremlinApi;
use crate::error::{MigrateError, ObjectKind};
use crate::model::Integration;
use crate::remap::{remap_scenario, IdMap};
use crate::report::{MigrationReport, Phase, PhaseReport, TeamReport};
use crate::run_id::RunId;

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::Instrument;

/// What to migrate, resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub source_team_ids: Vec<String>,
    pub target_team_id: String,
    pub delete_health_checks: bool,
    pub delete_scenarios: bool,
}

/// A run stopped by a fatal error, with everything reported up to that point.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunAborted {
    pub error: MigrateError,
    pub partial: MigrationReport,
}

/// Copies objects from source teams (via `source`) into the target team (via `dest`).
pub struct Migrator<S, D> {
    source: S,
    dest: D,
}

/// Record a per-object failure, unless it is fatal to the whole run.
fn record_failure(phase: &mut PhaseReport, err: MigrateError) -> Result<(), MigrateError> {
    let err = err.escalate()?;
    tracing::warn!(error = %err, "{} step failed", phase.phase.label());
    phase.failure(err);
    Ok(())
}

impl<S: GremlinApi, D: GremlinApi> Migrator<S, D> {
    pub fn new(source: S, dest: D) -> Self {
        Self { source, dest }
    }

    pub async fn run(&self, plan: &MigrationPlan) -> Result<MigrationReport, RunAborted> {
        let mut report = MigrationReport::new(RunId::new(), &plan.target_team_id);

        for (index, source_team) in plan.source_team_ids.iter().enumerate() {
            let span = tracing::info_span!(
                "source_team",
                run = %report.run_id,
                team = %source_team
            );
            let outcome = self
                .migrate_team(plan, source_team, index == 0)
                .instrument(span)
                .await;

            match outcome {
                Ok(team) => report.teams.push(team),
                Err(error) => {
                    report.finish();
                    tracing::error!(
                        error = %error,
                        completed = report.teams.len(),
                        "run aborted; returning partial report"
                    );
                    return Err(RunAborted {
                        error,
                        partial: report,
                    });
                }
            }
        }

        report.finish();
        Ok(report)
    }

    async fn migrate_team(
        &self,
        plan: &MigrationPlan,
        source_team: &str,
        first: bool,
    ) -> Result<TeamReport, MigrateError> {
        let target = plan.target_team_id.as_str();
        let mut team = TeamReport::new(source_team);

        tracing::info!("processing source team {}", source_team);

        // Later teams would otherwise delete what earlier teams just copied.
        if first {
            if plan.delete_health_checks {
                team.phases.push(self.delete_health_checks(target).await?);
            }
            if plan.delete_scenarios {
                team.phases.push(self.delete_scenarios(target).await?);
            }
        }

        let ids = match self.copy_health_checks(source_team, target).await {
            Ok((phase, ids)) => {
                team.phases.push(phase);
                ids
            }
            Err(err) => return abort_team(team, err),
        };

        match self.copy_scenarios(source_team, target, &ids).await {
            Ok((phase, dangling)) => {
                team.phases.push(phase);
                team.dangling_references = dangling;
            }
            Err(err) => return abort_team(team, err),
        }

        match self.copy_integrations(source_team, target).await {
            Ok(phase) => team.phases.push(phase),
            Err(err) => return abort_team(team, err),
        }

        Ok(team)
    }

    /* ---------------- delete phase ---------------- */

    async fn delete_health_checks(&self, target: &str) -> Result<PhaseReport, MigrateError> {
        let mut phase = PhaseReport::new(Phase::DeleteHealthChecks);
        tracing::info!("deleting existing health checks from destination team {}", target);

        let checks = match self.dest.list_health_checks(target).await {
            Ok(checks) => checks,
            Err(source) => {
                record_failure(&mut phase, list_error(ObjectKind::HealthCheck, target, source))?;
                phase.log(target);
                return Ok(phase);
            }
        };

        if checks.is_empty() {
            tracing::info!("no existing health checks found in destination team");
        }

        for check in &checks {
            let Some(id) = check.identifier() else {
                phase.skip();
                continue;
            };

            match self.dest.delete_health_check(target, id).await {
                Ok(()) => {
                    tracing::info!(id, "deleted health check: {}", check.name());
                    phase.success();
                }
                Err(source) => {
                    let err = MigrateError::Delete {
                        kind: ObjectKind::HealthCheck,
                        name: check.name().to_string(),
                        source,
                    };
                    record_failure(&mut phase, err)?;
                }
            }
        }

        phase.log(target);
        Ok(phase)
    }

    async fn delete_scenarios(&self, target: &str) -> Result<PhaseReport, MigrateError> {
        let mut phase = PhaseReport::new(Phase::DeleteScenarios);
        tracing::info!("deleting existing scenarios from destination team {}", target);

        let scenarios = match self.dest.list_scenarios(target).await {
            Ok(scenarios) => scenarios,
            Err(source) => {
                record_failure(&mut phase, list_error(ObjectKind::Scenario, target, source))?;
                phase.log(target);
                return Ok(phase);
            }
        };

        if scenarios.is_empty() {
            tracing::info!("no scenarios found in destination team");
        }

        for scenario in &scenarios {
            let Some(id) = scenario.identifier() else {
                phase.skip();
                continue;
            };

            match self.dest.delete_scenario(target, id).await {
                Ok(()) => {
                    tracing::info!(id, "deleted scenario: {}", scenario.name());
                    phase.success();
                }
                Err(source) => {
                    let err = MigrateError::Delete {
                        kind: ObjectKind::Scenario,
                        name: scenario.name().to_string(),
                        source,
                    };
                    record_failure(&mut phase, err)?;
                }
            }
        }

        phase.log(target);
        Ok(phase)
    }

    /* ---------------- copy phases ---------------- */

    async fn copy_health_checks(
        &self,
        source_team: &str,
        target: &str,
    ) -> Result<(PhaseReport, IdMap), MigrateError> {
        let mut phase = PhaseReport::new(Phase::HealthChecks);
        let mut ids = IdMap::new();

        let checks = self
            .source
            .list_health_checks(source_team)
            .await
            .map_err(|source| list_error(ObjectKind::HealthCheck, source_team, source))?;

        tracing::info!("found {} health checks in source team", checks.len());

        let dest_integrations = if checks.iter().any(|c| c.integration_name().is_some()) {
            self.destination_integrations(target).await?
        } else {
            Vec::new()
        };

        for check in &checks {
            let prepared = check.prepare_for(target, &dest_integrations);

            let new_id = match self.dest.create_health_check(target, &prepared).await {
                Ok(new_id) => new_id,
                Err(source) => {
                    let err = MigrateError::Create {
                        kind: ObjectKind::HealthCheck,
                        name: check.name().to_string(),
                        source,
                    };
                    record_failure(&mut phase, err)?;
                    continue;
                }
            };

            match check.identifier() {
                Some(source_id) => ids.insert(source_id, new_id.as_str()),
                None => tracing::warn!(
                    "source health check '{}' has no identifier; scenarios cannot reference it",
                    check.name()
                ),
            }

            // Some fields are only honoured on update, so replay the body once more.
            if let Err(err) = self.dest.update_health_check(target, &new_id, &prepared).await {
                tracing::warn!(
                    id = %new_id,
                    error = %err,
                    "copied health check '{}' but failed to update it",
                    check.name()
                );
            }

            tracing::info!(source_id = ?check.identifier(), id = %new_id, "copied health check: {}", check.name());
            phase.success();
        }

        tracing::debug!("mapped {} health check identifiers", ids.len());
        phase.log(source_team);
        Ok((phase, ids))
    }

    async fn copy_scenarios(
        &self,
        source_team: &str,
        target: &str,
        ids: &IdMap,
    ) -> Result<(PhaseReport, Vec<String>), MigrateError> {
        let mut phase = PhaseReport::new(Phase::Scenarios);
        let mut dangling_all = Vec::new();

        let scenarios = self
            .source
            .list_scenarios(source_team)
            .await
            .map_err(|source| list_error(ObjectKind::Scenario, source_team, source))?;

        tracing::info!("found {} scenarios in source team", scenarios.len());
        if ids.is_empty() && !scenarios.is_empty() {
            tracing::debug!("no health checks were mapped; every scenario reference will be dropped");
        }

        for scenario in &scenarios {
            let remapped = remap_scenario(&scenario.sanitized(), ids);

            for missing in &remapped.dangling {
                tracing::warn!(
                    health_check = %missing,
                    "health check not migrated; dropping reference from scenario '{}'",
                    scenario.name()
                );
            }
            dangling_all.extend(remapped.dangling);

            let mut replay = remapped.scenario;
            replay.set_team(target);

            match self.dest.create_scenario(target, &replay).await {
                Ok(()) => {
                    tracing::info!("copied scenario: {}", scenario.name());
                    phase.success();
                }
                Err(source) => {
                    let err = MigrateError::Create {
                        kind: ObjectKind::Scenario,
                        name: scenario.name().to_string(),
                        source,
                    };
                    record_failure(&mut phase, err)?;
                }
            }
        }

        phase.log(source_team);
        Ok((phase, dangling_all))
    }

    async fn copy_integrations(
        &self,
        source_team: &str,
        target: &str,
    ) -> Result<PhaseReport, MigrateError> {
        let mut phase = PhaseReport::new(Phase::Integrations);

        let integrations = self
            .source
            .list_integrations(source_team)
            .await
            .map_err(|source| list_error(ObjectKind::Integration, source_team, source))?;

        tracing::info!("found {} external integrations in source team", integrations.len());

        if integrations.is_empty() {
            phase.log(source_team);
            return Ok(phase);
        }

        let mut existing: BTreeSet<String> = self
            .destination_integrations(target)
            .await?
            .iter()
            .filter_map(|i| i.name().map(str::to_string))
            .collect();

        for integration in &integrations {
            // Nameless integrations cannot be matched, so they are always created.
            let name = integration.name();
            let label = name.unwrap_or("Unnamed");

            if name.is_some_and(|n| existing.contains(n)) {
                tracing::info!("destination already has integration '{}'", label);
                phase.skip();
                continue;
            }

            match self.dest.create_integration(target, integration).await {
                Ok(()) => {
                    tracing::info!("created integration '{}' in destination team", label);
                    if let Some(name) = name {
                        existing.insert(name.to_string());
                    }
                    phase.success();
                }
                Err(source) => {
                    let err = MigrateError::Create {
                        kind: ObjectKind::Integration,
                        name: label.to_string(),
                        source,
                    };
                    record_failure(&mut phase, err)?;
                }
            }
        }

        phase.log(source_team);
        Ok(phase)
    }

    /// Integrations already in the destination team.
    ///
    /// A listing failure degrades to an empty list: health checks lose their
    /// integration link and integrations are created without the duplicate check.
    async fn destination_integrations(&self, target: &str) -> Result<Vec<Integration>, MigrateError> {
        match self.dest.list_integrations(target).await {
            Ok(integrations) => Ok(integrations),
            Err(source) => {
                let err = list_error(ObjectKind::Integration, target, source).escalate()?;
                tracing::warn!(error = %err, "continuing without destination integrations");
                Ok(Vec::new())
            }
        }
    }
}

fn list_error(kind: ObjectKind, team_id: &str, source: crate::error::ApiError) -> MigrateError {
    MigrateError::List {
        kind,
        team_id: team_id.to_string(),
        source,
    }
}

/// Stop processing a source team after a listing failure.
fn abort_team(mut team: TeamReport, err: MigrateError) -> Result<TeamReport, MigrateError> {
    let err = err.escalate()?;
    tracing::error!(error = %err, "aborting source team {}", team.source_team_id);
    team.aborted = Some(err.to_string());
    Ok(team)
}
