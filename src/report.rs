// src/report.rs

//! Migration outcome reporting.
//!
//! Each phase (delete / copy, per object kind) produces a `PhaseReport`.
//! Phases roll up into a `TeamReport` per source team, and teams into the
//! `MigrationReport` for the whole run.
//!
//! The report is printed as a human-readable summary, or as JSON with `--json`.

use crate::run_id::RunId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DeleteHealthChecks,
    DeleteScenarios,
    HealthChecks,
    Scenarios,
    Integrations,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::DeleteHealthChecks => "delete health checks",
            Phase::DeleteScenarios => "delete scenarios",
            Phase::HealthChecks => "health checks",
            Phase::Scenarios => "scenarios",
            Phase::Integrations => "integrations",
        }
    }
}

/// Outcome of one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl PhaseReport {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    pub fn success(&mut self) {
        self.succeeded += 1;
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn failure(&mut self, error: impl ToString) {
        self.failed += 1;
        self.errors.push(error.to_string());
    }

    /// Log the phase summary.
    pub fn log(&self, team_id: &str) {
        if self.failed == 0 {
            tracing::info!(
                team = team_id,
                succeeded = self.succeeded,
                skipped = self.skipped,
                "{} finished",
                self.phase.label()
            );
        } else {
            tracing::warn!(
                team = team_id,
                succeeded = self.succeeded,
                failed = self.failed,
                skipped = self.skipped,
                "{} finished with failures",
                self.phase.label()
            );
        }
    }
}

/// Everything that happened for one source team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamReport {
    pub source_team_id: String,

    /// Set when a listing failure stopped this team early.
    pub aborted: Option<String>,

    pub phases: Vec<PhaseReport>,

    /// Health-check references dropped from scenarios because they had no mapping.
    pub dangling_references: Vec<String>,
}

impl TeamReport {
    pub fn new(source_team_id: &str) -> Self {
        Self {
            source_team_id: source_team_id.to_string(),
            aborted: None,
            phases: Vec::new(),
            dangling_references: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    pub fn failures(&self) -> usize {
        self.phases.iter().map(|p| p.failed).sum::<usize>() + usize::from(self.aborted.is_some())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: RunId,
    pub target_team_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub teams: Vec<TeamReport>,
}

impl MigrationReport {
    pub fn new(run_id: RunId, target_team_id: &str) -> Self {
        Self {
            run_id,
            target_team_id: target_team_id.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            teams: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total_failures(&self) -> usize {
        self.teams.iter().map(TeamReport::failures).sum()
    }

    pub fn is_success(&self) -> bool {
        self.total_failures() == 0
    }

    /// Human-readable summary of the whole run.
    #[must_use]
    pub fn render_summary(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "\n=== Migration Summary ({}) ===", self.run_id);
        let _ = writeln!(output, "Destination team: {}", self.target_team_id);

        for team in &self.teams {
            let _ = writeln!(output, "\nSource team {}:", team.source_team_id);
            for p in &team.phases {
                let _ = writeln!(
                    output,
                    "  {:<22} ok {:>4}  failed {:>4}  skipped {:>4}",
                    p.phase.label(),
                    p.succeeded,
                    p.failed,
                    p.skipped
                );
            }
            if let Some(reason) = &team.aborted {
                let _ = writeln!(output, "  aborted: {reason}");
            }
            if !team.dangling_references.is_empty() {
                let _ = writeln!(
                    output,
                    "  dropped health-check references: {}",
                    team.dangling_references.join(", ")
                );
            }

            let errors: Vec<&String> = team.phases.iter().flat_map(|p| &p.errors).collect();
            if !errors.is_empty() {
                let _ = writeln!(output, "  Errors ({}):", errors.len());
                for error in errors {
                    let _ = writeln!(output, "    - {error}");
                }
            }
        }

        let _ = writeln!(output);
        if self.is_success() {
            output.push_str("Status: ✓ Success\n");
        } else {
            let _ = writeln!(
                output,
                "Status: ✗ Completed with {} failure(s)",
                self.total_failures()
            );
        }

        output
    }
}
