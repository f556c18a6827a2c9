// src/cli.rs

use clap::Parser;

use crate::api::DEFAULT_BASE_URL;

/// Gremlin health checks, integrations, and scenarios replicator.
///
/// Copies everything from each source team into the target team, in the order
/// the source teams are given. API keys fall back to environment variables
/// (a `.env` file in the working directory is honoured).
#[derive(Parser, Debug)]
#[command(name = "gremlin-replicate", version)]
pub struct Cli {
    /// Source API key
    #[arg(long, env = "GREMLIN_SOURCE_API_KEY", hide_env_values = true)]
    pub source_api_key: Option<String>,

    /// Destination API key
    #[arg(long, env = "GREMLIN_DEST_API_KEY", hide_env_values = true)]
    pub dest_api_key: Option<String>,

    /// One or more source team IDs (space-separated)
    #[arg(long, required = true, num_args = 1..)]
    pub source_team_ids: Vec<String>,

    /// Destination team ID
    #[arg(long)]
    pub target_team_id: String,

    /// Delete existing health checks in the destination team first
    #[arg(long)]
    pub delete_health_checks: bool,

    /// Delete existing scenarios in the destination team first
    #[arg(long)]
    pub delete_scenarios: bool,

    /// Gremlin API base URL
    #[arg(long, env = "GREMLIN_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
