//! Databricks SQL statement execution client.
//!
//! Provides [`WarehouseClient`] for executing SQL statements through the
//! Databricks SQL Statement Execution REST API, with exponential-backoff
//! polling, timeout enforcement, and structured result parsing into
//! [`QueryResult`]. Handlers depend on the [`QueryExecutor`] trait so tests
//! can substitute a stub executor.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::config::WarehouseConfig;
use crate::result::{QueryResult, ResultColumn, StatementMetadata};
use crate::statement::Statement;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors that can occur during warehouse operations.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// Required configuration variables are absent.
    #[error("Missing environment variables: {0}")]
    MissingConfig(String),

    /// The statement execution failed on the warehouse side.
    #[error("Statement {statement_id} failed: {reason}")]
    QueryFailed { statement_id: String, reason: String },

    /// The statement was cancelled (by the user or by the warehouse).
    #[error("Statement {statement_id} was cancelled")]
    QueryCancelled { statement_id: String },

    /// The statement exceeded the configured timeout.
    #[error("Statement {statement_id} timed out after {seconds}s")]
    QueryTimeout { statement_id: String, seconds: u32 },

    /// The warehouse API returned a non-success HTTP status.
    #[error("Warehouse API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The HTTP request itself failed.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Failed to interpret the warehouse response.
    #[error("Parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Executor seam
// ---------------------------------------------------------------------------

/// A statement-execution backend.
///
/// The HTTP layer only ever talks to this trait; production uses
/// [`WarehouseClient`], tests use capturing stubs.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, statement: &Statement) -> Result<QueryResult, WarehouseError>;
}

// ---------------------------------------------------------------------------
// Wire types (statement execution API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StatementResponse {
    statement_id: String,
    status: StatementStatus,
    #[serde(default)]
    manifest: Option<ResultManifest>,
    #[serde(default)]
    result: Option<ResultData>,
}

#[derive(Debug, Deserialize)]
struct StatementStatus {
    state: String,
    #[serde(default)]
    error: Option<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultManifest {
    schema: ResultSchema,
    #[serde(default)]
    total_row_count: u64,
}

#[derive(Debug, Deserialize)]
struct ResultSchema {
    #[serde(default)]
    columns: Vec<SchemaColumn>,
}

#[derive(Debug, Deserialize)]
struct SchemaColumn {
    name: String,
    type_name: String,
}

#[derive(Debug, Deserialize)]
struct ResultData {
    #[serde(default)]
    data_array: Vec<Vec<Option<String>>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for executing statements against a Databricks SQL warehouse.
///
/// Wraps a `reqwest::Client` and adds:
/// - Statement submission with named bind parameters
/// - Exponential-backoff polling with jitter
/// - Timeout enforcement with best-effort cancellation
/// - Structured result parsing into [`QueryResult`]
pub struct WarehouseClient {
    config: WarehouseConfig,
    http: reqwest::Client,
}

impl WarehouseClient {
    /// Create a new [`WarehouseClient`] from the given configuration.
    pub fn new(config: WarehouseConfig) -> Self {
        info!(
            hostname = %config.server_hostname,
            warehouse_id = %config.warehouse_id(),
            "WarehouseClient initialised"
        );
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn statements_url(&self) -> String {
        format!(
            "https://{}/api/2.0/sql/statements",
            self.config.server_hostname
        )
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Submit the statement and return the initial execution state.
    ///
    /// Small results come back inline here; longer-running statements return
    /// PENDING/RUNNING and are picked up by the polling loop.
    async fn submit(&self, statement: &Statement) -> Result<StatementResponse, WarehouseError> {
        let body = json!({
            "statement": statement.text,
            "warehouse_id": self.config.warehouse_id(),
            "parameters": statement.params,
            "format": "JSON_ARRAY",
            "disposition": "INLINE",
            "wait_timeout": "10s",
            "on_wait_timeout": "CONTINUE",
        });

        let response = self
            .http
            .post(self.statements_url())
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn get_status(&self, statement_id: &str) -> Result<StatementResponse, WarehouseError> {
        let response = self
            .http
            .get(format!("{}/{}", self.statements_url(), statement_id))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Request cancellation of a running statement.
    pub async fn cancel(&self, statement_id: &str) -> Result<(), WarehouseError> {
        info!(statement_id = %statement_id, "Cancelling statement");

        let response = self
            .http
            .post(format!("{}/{}/cancel", self.statements_url(), statement_id))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api { status, body });
        }
        Ok(())
    }

    async fn decode(response: reqwest::Response) -> Result<StatementResponse, WarehouseError> {
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api { status, body });
        }
        response
            .json::<StatementResponse>()
            .await
            .map_err(|e| WarehouseError::ParseError(e.to_string()))
    }

    /// Poll statement status with exponential backoff until a terminal state
    /// (SUCCEEDED, FAILED, CANCELED, CLOSED) or the configured timeout.
    async fn poll_until_complete(
        &self,
        mut resp: StatementResponse,
    ) -> Result<StatementResponse, WarehouseError> {
        let start = Instant::now();
        let timeout = Duration::from_secs(self.config.timeout_seconds as u64);

        let initial_delay_ms: u64 = 200;
        let max_delay_ms: u64 = 2000;
        let backoff_factor: f64 = 1.5;

        let mut delay_ms = initial_delay_ms;

        loop {
            let statement_id = resp.statement_id.clone();
            let state = resp.status.state.clone();

            debug!(
                statement_id = %statement_id,
                state = %state,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Statement status"
            );

            match state.as_str() {
                "SUCCEEDED" => return Ok(resp),

                "FAILED" => {
                    let reason = resp
                        .status
                        .error
                        .map(|e| e.message)
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "unknown".to_string());

                    error!(statement_id = %statement_id, reason = %reason, "Statement failed");
                    return Err(WarehouseError::QueryFailed {
                        statement_id,
                        reason,
                    });
                }

                "CANCELED" => {
                    warn!(statement_id = %statement_id, "Statement was cancelled");
                    return Err(WarehouseError::QueryCancelled { statement_id });
                }

                // Results evicted before we fetched them.
                "CLOSED" => {
                    return Err(WarehouseError::QueryFailed {
                        statement_id,
                        reason: "statement closed before results were fetched".to_string(),
                    });
                }

                // PENDING | RUNNING | unknown future variant
                _ => {}
            }

            if start.elapsed() > timeout {
                warn!(
                    statement_id = %statement_id,
                    timeout_seconds = self.config.timeout_seconds,
                    "Statement timed out, cancelling"
                );
                // Best-effort cancel — ignore errors from the cancel itself
                let _ = self.cancel(&statement_id).await;
                return Err(WarehouseError::QueryTimeout {
                    statement_id,
                    seconds: self.config.timeout_seconds,
                });
            }

            // Compute jitter without rand: use nanosecond fraction of current time
            let jitter_ms = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
                % 100;

            tokio::time::sleep(Duration::from_millis(delay_ms + jitter_ms as u64)).await;
            delay_ms = ((delay_ms as f64 * backoff_factor) as u64).min(max_delay_ms);

            resp = self.get_status(&statement_id).await?;
        }
    }
}

/// Convert a terminal SUCCEEDED response into a [`QueryResult`].
fn parse_response(resp: StatementResponse) -> Result<QueryResult, WarehouseError> {
    let manifest = resp
        .manifest
        .ok_or_else(|| WarehouseError::ParseError("no manifest in succeeded statement".into()))?;

    let columns: Vec<ResultColumn> = manifest
        .schema
        .columns
        .into_iter()
        .map(|c| ResultColumn {
            name: c.name,
            type_name: c.type_name,
        })
        .collect();

    // A SELECT with zero matching rows still carries a (possibly empty)
    // result block; treat a missing block the same as empty.
    let rows = resp.result.map(|r| r.data_array).unwrap_or_default();

    debug!(
        columns = columns.len(),
        rows = rows.len(),
        statement_id = %resp.statement_id,
        "Parsed statement results"
    );

    Ok(QueryResult {
        columns,
        rows,
        metadata: StatementMetadata {
            statement_id: resp.statement_id,
            state: resp.status.state,
            total_row_count: manifest.total_row_count,
        },
    })
}

#[async_trait]
impl QueryExecutor for WarehouseClient {
    /// Execute a statement and return the parsed results.
    ///
    /// Performs the full lifecycle: submit, poll until a terminal state,
    /// parse the inline result set.
    async fn execute(&self, statement: &Statement) -> Result<QueryResult, WarehouseError> {
        info!(sql = %statement.text, params = statement.params.len(), "Submitting statement");

        let submitted = self.submit(statement).await?;
        info!(statement_id = %submitted.statement_id, "Statement accepted");

        let finished = self.poll_until_complete(submitted).await?;
        parse_response(finished)
    }
}

// ---------------------------------------------------------------------------
// Tests — wire parsing only, no network calls
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn succeeded_json() -> &'static str {
        r#"{
            "statement_id": "stmt-1",
            "status": { "state": "SUCCEEDED" },
            "manifest": {
                "schema": {
                    "columns": [
                        { "name": "FECHA", "type_name": "DATE", "position": 0 },
                        { "name": "stock", "type_name": "DECIMAL", "position": 1 }
                    ]
                },
                "total_row_count": 2
            },
            "result": {
                "data_array": [
                    ["2024-01-01", "12.5"],
                    ["2024-01-02", null]
                ]
            }
        }"#
    }

    #[test]
    fn deserialize_succeeded_response() {
        let resp: StatementResponse = serde_json::from_str(succeeded_json()).unwrap();
        assert_eq!(resp.statement_id, "stmt-1");
        assert_eq!(resp.status.state, "SUCCEEDED");
        assert!(resp.manifest.is_some());
    }

    #[test]
    fn parse_response_builds_query_result() {
        let resp: StatementResponse = serde_json::from_str(succeeded_json()).unwrap();
        let result = parse_response(resp).unwrap();

        assert_eq!(result.column_count(), 2);
        assert_eq!(result.columns[0].name, "FECHA");
        assert_eq!(result.columns[1].type_name, "DECIMAL");
        assert_eq!(result.row_count(), 2);
        assert_eq!(result.get_value(0, "stock"), Some("12.5"));
        assert_eq!(result.get_value(1, "stock"), None);
        assert_eq!(result.metadata.total_row_count, 2);
    }

    #[test]
    fn parse_response_without_result_block_is_empty() {
        let json = r#"{
            "statement_id": "stmt-2",
            "status": { "state": "SUCCEEDED" },
            "manifest": { "schema": { "columns": [] }, "total_row_count": 0 }
        }"#;
        let resp: StatementResponse = serde_json::from_str(json).unwrap();
        let result = parse_response(resp).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.column_count(), 0);
    }

    #[test]
    fn parse_response_without_manifest_is_error() {
        let json = r#"{
            "statement_id": "stmt-3",
            "status": { "state": "SUCCEEDED" }
        }"#;
        let resp: StatementResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parse_response(resp),
            Err(WarehouseError::ParseError(_))
        ));
    }

    #[test]
    fn failed_status_carries_message() {
        let json = r#"{
            "statement_id": "stmt-4",
            "status": {
                "state": "FAILED",
                "error": { "error_code": "SYNTAX_ERROR", "message": "mismatched input" }
            }
        }"#;
        let resp: StatementResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status.state, "FAILED");
        assert_eq!(resp.status.error.unwrap().message, "mismatched input");
    }

    #[test]
    fn error_display_messages() {
        let err = WarehouseError::MissingConfig("DATABRICKS_ACCESS_TOKEN".into());
        assert!(err.to_string().contains("DATABRICKS_ACCESS_TOKEN"));

        let err = WarehouseError::QueryFailed {
            statement_id: "abc-123".into(),
            reason: "syntax error".into(),
        };
        assert!(err.to_string().contains("abc-123"));
        assert!(err.to_string().contains("syntax error"));

        let err = WarehouseError::QueryTimeout {
            statement_id: "t-1".into(),
            seconds: 60,
        };
        assert!(err.to_string().contains("60s"));

        let err = WarehouseError::Api {
            status: 403,
            body: "permission denied".into(),
        };
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn jitter_is_bounded() {
        for _ in 0..1000 {
            let jitter = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .subsec_nanos()
                % 100;
            assert!(jitter < 100);
        }
    }
}
