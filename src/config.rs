// src/config.rs

//! Run settings resolved from the command line.
//!
//! clap already folds in the environment fallbacks. This layer only
//! validates and normalises:
//! - both API keys must be present and non-blank (authentication error otherwise)
//! - team IDs are trimmed, blank ones rejected, order preserved

use crate::cli::Cli;
use crate::error::MigrateError;
use crate::migrate::MigrationPlan;

use anyhow::{bail, Result};

#[derive(Debug)]
pub struct Settings {
    pub source_api_key: String,
    pub dest_api_key: String,
    pub base_url: String,
    pub plan: MigrationPlan,
    pub json: bool,
}

fn required_key(value: Option<String>, flag: &str, env: &str) -> Result<String, MigrateError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            MigrateError::Authentication(format!(
                "no API key provided; pass {} or set {}",
                flag, env
            ))
        })
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let source_api_key = required_key(
            cli.source_api_key,
            "--source-api-key",
            "GREMLIN_SOURCE_API_KEY",
        )?;
        let dest_api_key =
            required_key(cli.dest_api_key, "--dest-api-key", "GREMLIN_DEST_API_KEY")?;

        let target_team_id = cli.target_team_id.trim().to_string();
        if target_team_id.is_empty() {
            bail!("--target-team-id must not be empty");
        }

        let source_team_ids: Vec<String> = cli
            .source_team_ids
            .iter()
            .map(|id| id.trim().to_string())
            .collect();
        if source_team_ids.iter().any(String::is_empty) {
            bail!("--source-team-ids must not contain empty team IDs");
        }

        if cli.base_url.trim().is_empty() {
            bail!("--base-url must not be empty");
        }

        Ok(Self {
            source_api_key,
            dest_api_key,
            base_url: cli.base_url.trim().to_string(),
            plan: MigrationPlan {
                source_team_ids,
                target_team_id,
                delete_health_checks: cli.delete_health_checks,
                delete_scenarios: cli.delete_scenarios,
            },
            json: cli.json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_BASE_URL;

    fn cli() -> Cli {
        Cli {
            source_api_key: Some("src-key".to_string()),
            dest_api_key: Some(" dst-key ".to_string()),
            source_team_ids: vec!["a".to_string(), " b ".to_string()],
            target_team_id: "dst".to_string(),
            delete_health_checks: true,
            delete_scenarios: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            json: false,
        }
    }

    #[test]
    fn settings_are_normalised() {
        let s = Settings::from_cli(cli()).unwrap();

        assert_eq!(s.dest_api_key, "dst-key");
        assert_eq!(s.plan.source_team_ids, vec!["a", "b"]);
        assert_eq!(s.plan.target_team_id, "dst");
        assert!(s.plan.delete_health_checks);
        assert!(!s.plan.delete_scenarios);
    }

    #[test]
    fn missing_key_is_an_authentication_error() {
        let err = Settings::from_cli(Cli {
            source_api_key: None,
            ..cli()
        })
        .unwrap_err();

        let err = err.downcast::<MigrateError>().unwrap();
        assert!(matches!(err, MigrateError::Authentication(_)));
        assert!(err.to_string().contains("GREMLIN_SOURCE_API_KEY"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let err = Settings::from_cli(Cli {
            dest_api_key: Some("   ".to_string()),
            ..cli()
        })
        .unwrap_err();

        assert!(err.to_string().contains("GREMLIN_DEST_API_KEY"));
    }

    #[test]
    fn blank_team_ids_are_rejected() {
        assert!(Settings::from_cli(Cli {
            source_team_ids: vec!["a".to_string(), "".to_string()],
            ..cli()
        })
        .is_err());

        assert!(Settings::from_cli(Cli {
            target_team_id: " ".to_string(),
            ..cli()
        })
        .is_err());
    }
}
