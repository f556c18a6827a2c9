// src/model.rs

//! Payload model for the objects being migrated.
//!
//! Gremlin objects are treated as opaque JSON documents. Each wrapper keeps the
//! full object it was received with and only exposes the handful of fields the
//! migration needs to read or rewrite:
//! - `identifier` / `guid` (identity at the source)
//! - `name` (logging, integration matching)
//! - `teamId` (rewritten to the destination team)
//!
//! Anything else round-trips untouched.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub type JsonMap = Map<String, Value>;

const UNNAMED: &str = "Unnamed";

/// Server-managed fields stripped from a health check before it is replayed.
const HEALTH_CHECK_SYSTEM_FIELDS: &[&str] = &[
    "teamId",
    "identifier",
    "createdBy",
    "createdAt",
    "updatedBy",
    "updatedAt",
    "thirdPartyPresets",
    "rawEndpointConfiguration",
];

/// Server-managed and shared-linkage fields stripped from a scenario, so the copy
/// lands as a standalone scenario in the destination team.
const SCENARIO_SYSTEM_FIELDS: &[&str] = &[
    "teamId",
    "identifier",
    "createdBy",
    "createdAt",
    "updatedBy",
    "updatedAt",
    "sharedScenario",
    "sharedScenarioGuid",
    "baseScenarioId",
    "created_from_type",
    "created_from_id",
    "org_id",
];

fn str_field<'a>(obj: &'a JsonMap, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

fn strip(obj: &mut JsonMap, fields: &[&str]) {
    for field in fields {
        obj.remove(*field);
    }
}

/* ---------------- health checks ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthCheck(pub JsonMap);

impl HealthCheck {
    pub fn identifier(&self) -> Option<&str> {
        str_field(&self.0, "identifier")
    }

    pub fn name(&self) -> &str {
        str_field(&self.0, "name").unwrap_or(UNNAMED)
    }

    /// Name of the external integration this check is attached to, if any.
    pub fn integration_name(&self) -> Option<&str> {
        self.0
            .get("teamExternalIntegration")
            .and_then(|v| v.as_object())
            .and_then(|o| str_field(o, "name"))
    }

    /// Build the body used to create this check in `target_team_id`.
    ///
    /// - Endpoint headers fall back to `rawEndpointConfiguration.headers`
    /// - System fields are removed
    /// - `teamExternalIntegration` is re-pointed at the destination integration
    ///   with the same name, or dropped when there is none
    pub fn prepare_for(&self, target_team_id: &str, dest_integrations: &[Integration]) -> HealthCheck {
        let mut out = self.0.clone();

        let raw_headers = out
            .get("rawEndpointConfiguration")
            .and_then(|v| v.as_object())
            .filter(|raw| !raw.is_empty())
            .map(|raw| raw.get("headers").cloned().unwrap_or_else(|| json!({})));

        if let Some(raw_headers) = raw_headers {
            let mut endpoint = out
                .get("endpointConfiguration")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();

            let has_headers = endpoint.get("headers").is_some_and(is_truthy);
            if !has_headers {
                endpoint.insert("headers".to_string(), raw_headers);
                out.insert("endpointConfiguration".to_string(), Value::Object(endpoint));
            }
        }

        strip(&mut out, HEALTH_CHECK_SYSTEM_FIELDS);

        if out.contains_key("teamExternalIntegration") {
            let linked = self.integration_name().and_then(|name| {
                dest_integrations
                    .iter()
                    .find(|i| i.name() == Some(name))
                    .map(Integration::link_reference)
            });

            match linked {
                Some(link) => {
                    out.insert("teamExternalIntegration".to_string(), link);
                }
                None => {
                    out.remove("teamExternalIntegration");
                }
            }
        }

        out.insert(
            "teamId".to_string(),
            Value::String(target_team_id.to_string()),
        );
        HealthCheck(out)
    }
}

/// Loose truthiness for JSON: null, false, 0, "" and empty containers are false.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/* ---------------- scenarios ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scenario(pub JsonMap);

impl Scenario {
    /// Identity used for deletion: `guid`, falling back to `identifier`.
    pub fn identifier(&self) -> Option<&str> {
        str_field(&self.0, "guid").or_else(|| str_field(&self.0, "identifier"))
    }

    pub fn name(&self) -> &str {
        str_field(&self.0, "name").unwrap_or(UNNAMED)
    }

    /// Copy with server-managed and shared-linkage fields removed.
    ///
    /// `teamId` is stripped here and set by the orchestrator after remapping.
    pub fn sanitized(&self) -> Scenario {
        let mut out = self.0.clone();
        strip(&mut out, SCENARIO_SYSTEM_FIELDS);
        Scenario(out)
    }

    pub fn set_team(&mut self, team_id: &str) {
        self.0
            .insert("teamId".to_string(), Value::String(team_id.to_string()));
    }
}

/* ---------------- integrations ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Integration(pub JsonMap);

/// Query parameters and body for creating an integration.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationRequest {
    pub query: Vec<(&'static str, String)>,
    pub body: Value,
}

impl Integration {
    pub fn name(&self) -> Option<&str> {
        str_field(&self.0, "name")
    }

    /// Integration type, upper-cased. Missing or empty types are `CUSTOM`.
    pub fn kind(&self) -> String {
        str_field(&self.0, "type")
            .map(str::to_uppercase)
            .unwrap_or_else(|| "CUSTOM".to_string())
    }

    pub fn is_custom(&self) -> bool {
        self.kind() == "CUSTOM"
    }

    fn domain(&self) -> Option<&Value> {
        self.0.get("domain").filter(|v| !v.is_null())
    }

    /// Reference embedded in a health check's `teamExternalIntegration`.
    pub fn link_reference(&self) -> Value {
        let domain = self.domain().cloned().unwrap_or(Value::Null);
        if self.is_custom() {
            json!({
                "observabilityToolType": "CUSTOM",
                "domain": domain,
                "name": self.name(),
            })
        } else {
            json!({
                "type": self.0.get("type").cloned().unwrap_or(Value::Null),
                "domain": domain,
                "name": self.name(),
            })
        }
    }

    /// Shape the create call. `teamId` is added by the client.
    pub fn create_request(&self) -> IntegrationRequest {
        let mut query = Vec::new();
        if self.is_custom() {
            query.push(("observabilityToolType", "CUSTOM".to_string()));
        } else {
            query.push(("type", self.kind()));
        }
        if let Some(domain) = self.domain() {
            let domain = match domain {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            query.push(("domain", domain));
        }

        let field = |key: &str, default: Value| self.0.get(key).cloned().unwrap_or(default);

        let body = json!({
            "name": self.name(),
            "url": self.0.get("url").cloned().unwrap_or(Value::Null),
            "headers": field("headers", json!({})),
            "integrationSpecificValues": field("integrationSpecificValues", json!({})),
            "lastAuthenticationStatus": field("lastAuthenticationStatus", json!("AUTHENTICATED")),
            "privateNetwork": field("privateNetwork", json!(false)),
        });

        IntegrationRequest { query, body }
    }
}
