// src/api/http.rs

//! reqwest implementation of `GremlinApi`.
//!
//! Every call is a single awaited request: no retries, no explicit timeouts
//! beyond the reqwest defaults. Any 2xx is success; anything else becomes
//! `ApiError::Status` carrying the response body for diagnostics.

use super::GremlinApi;
use crate::error::{ApiError, MigrateError};
use crate::model::{HealthCheck, Integration, JsonMap, Scenario};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde_json::Value;

pub struct HttpGremlinClient {
    client: reqwest::Client,
    headers: HeaderMap,
    base_url: String,
}

impl HttpGremlinClient {
    /// Build a client bound to one API key.
    ///
    /// A key that cannot be carried in a header is an authentication error.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, MigrateError> {
        Ok(Self {
            client: reqwest::Client::new(),
            headers: gremlin_headers(api_key)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, req: RequestBuilder, url: &str) -> Result<String, ApiError> {
        let resp = req
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!(%url, status = status.as_u16(), "gremlin api response");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    async fn get_list(&self, path: &str, team_id: &str) -> Result<Vec<JsonMap>, ApiError> {
        let url = self.url(path);
        let req = self.client.get(&url).query(&[("teamId", team_id)]);
        let text = self.send(req, &url).await?;
        decode_list(&text)
    }

    async fn delete(&self, path: &str, id: &str, team_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("{}/{}", path, id));
        let req = self.client.delete(&url).query(&[("teamId", team_id)]);
        self.send(req, &url).await.map(|_| ())
    }
}

/* ---------------- headers ---------------- */

fn gremlin_headers(api_key: &str) -> Result<HeaderMap, MigrateError> {
    let mut headers = HeaderMap::new();

    let auth_val = format!("Key {}", api_key);
    let auth_val = HeaderValue::from_str(&auth_val).map_err(|_| {
        MigrateError::Authentication(
            "API key contains characters that are not valid in an HTTP header".to_string(),
        )
    })?;
    headers.insert(AUTHORIZATION, auth_val);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/* ---------------- response decoding ---------------- */

/// Decode a list response into objects.
///
/// Accepts a bare array or an object wrapping it under `integrations`. An empty
/// body or `null` is an empty list. Entries that are not objects are skipped.
fn decode_list(text: &str) -> Result<Vec<JsonMap>, ApiError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed: Value =
        serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))?;

    let items = match parsed {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(mut wrapper) => match wrapper.remove("integrations") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(ApiError::Decode(format!(
                    "expected 'integrations' to be an array, got {}",
                    other
                )))
            }
        },
        other => {
            return Err(ApiError::Decode(format!(
                "expected a JSON array, got {}",
                other
            )))
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(obj),
            other => {
                tracing::debug!(entry = %other, "skipping non-object list entry");
                None
            }
        })
        .collect())
}

/// Extract the new identifier from a create response.
///
/// JSON objects must carry `identifier`; anything else is taken as the
/// identifier in plain text.
fn created_identifier(text: &str) -> Result<String, ApiError> {
    let id = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => obj
            .get("identifier")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        Ok(Value::String(s)) => Some(s),
        _ => Some(text.trim().to_string()),
    };

    id.filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::MissingIdentifier)
}

/* ---------------- GremlinApi ---------------- */

#[async_trait]
impl GremlinApi for HttpGremlinClient {
    async fn list_health_checks(&self, team_id: &str) -> Result<Vec<HealthCheck>, ApiError> {
        let items = self.get_list("status-checks", team_id).await?;
        Ok(items.into_iter().map(HealthCheck).collect())
    }

    async fn create_health_check(
        &self,
        team_id: &str,
        check: &HealthCheck,
    ) -> Result<String, ApiError> {
        let url = self.url("status-checks");
        let req = self
            .client
            .post(&url)
            .query(&[("teamId", team_id)])
            .json(check);
        let text = self.send(req, &url).await?;
        created_identifier(&text)
    }

    async fn update_health_check(
        &self,
        team_id: &str,
        id: &str,
        check: &HealthCheck,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("status-checks/{}", id));
        let req = self
            .client
            .put(&url)
            .query(&[("teamId", team_id)])
            .json(check);
        self.send(req, &url).await.map(|_| ())
    }

    async fn delete_health_check(&self, team_id: &str, id: &str) -> Result<(), ApiError> {
        self.delete("status-checks", id, team_id).await
    }

    async fn list_scenarios(&self, team_id: &str) -> Result<Vec<Scenario>, ApiError> {
        let items = self.get_list("scenarios", team_id).await?;
        Ok(items.into_iter().map(Scenario).collect())
    }

    async fn create_scenario(&self, team_id: &str, scenario: &Scenario) -> Result<(), ApiError> {
        let url = self.url("scenarios");
        let req = self
            .client
            .post(&url)
            .query(&[("teamId", team_id)])
            .json(scenario);
        self.send(req, &url).await.map(|_| ())
    }

    async fn delete_scenario(&self, team_id: &str, id: &str) -> Result<(), ApiError> {
        self.delete("scenarios", id, team_id).await
    }

    async fn list_integrations(&self, team_id: &str) -> Result<Vec<Integration>, ApiError> {
        let items = self
            .get_list("external-integrations/status-check", team_id)
            .await?;
        Ok(items.into_iter().map(Integration).collect())
    }

    async fn create_integration(
        &self,
        team_id: &str,
        integration: &Integration,
    ) -> Result<(), ApiError> {
        let request = integration.create_request();

        let mut query: Vec<(&str, String)> = vec![("teamId", team_id.to_string())];
        query.extend(request.query);

        let url = self.url("external-integrations/status-check");
        let req = self.client.post(&url).query(&query).json(&request.body);
        self.send(req, &url).await.map(|_| ())
    }
}
