//! Client for the college attendance feed.
//!
//! The feed is best-effort: when it is disabled, unreachable, or slow, the
//! caller falls back to the attendance snapshots stored on the request.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::AttendanceConfig;

/// One row from the attendance feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceRecord {
    register_number: String,
    percentage: f64,
}

/// HTTP client for the live attendance feed.
#[derive(Clone)]
pub struct AttendanceClient {
    client: reqwest::Client,
    base_url: String,
    enabled: bool,
}

impl AttendanceClient {
    /// Creates a client from configuration. An unreachable feed never fails
    /// construction; failures surface as empty lookups at call time.
    pub fn new(config: &AttendanceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled && !config.base_url.is_empty(),
        }
    }

    /// Fetch live attendance percentages for the given register numbers.
    ///
    /// Returns a map keyed by register number. Any failure degrades to an
    /// empty map so callers can fall back to stored snapshots.
    pub async fn fetch_percentages(&self, register_numbers: &[String]) -> HashMap<String, f64> {
        if !self.enabled || register_numbers.is_empty() {
            return HashMap::new();
        }

        let url = format!("{}/api/attendance", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[("registerNumbers", register_numbers.join(","))])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "Attendance feed unreachable, using snapshots");
                return HashMap::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "Attendance feed returned an error, using snapshots"
            );
            return HashMap::new();
        }

        let records: Vec<AttendanceRecord> = match response.json().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Attendance feed returned malformed data");
                return HashMap::new();
            }
        };

        records
            .into_iter()
            .map(|r| (r.register_number.to_uppercase(), r.percentage))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool, base_url: &str) -> AttendanceConfig {
        AttendanceConfig {
            enabled,
            base_url: base_url.to_string(),
            timeout_ms: 100,
        }
    }

    #[tokio::test]
    async fn test_disabled_client_returns_empty() {
        let client = AttendanceClient::new(&config(false, "http://localhost:9"));
        let result = client.fetch_percentages(&["21CSE042".to_string()]).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_returns_empty() {
        let client = AttendanceClient::new(&config(true, "http://localhost:9"));
        let result = client.fetch_percentages(&[]).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_feed_degrades_to_empty() {
        // Port 9 (discard) is not listening; the request fails fast.
        let client = AttendanceClient::new(&config(true, "http://127.0.0.1:9"));
        let result = client.fetch_percentages(&["21CSE042".to_string()]).await;
        assert!(result.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AttendanceClient::new(&config(true, "http://feed.college.edu/"));
        assert_eq!(client.base_url, "http://feed.college.edu");
    }

    #[test]
    fn test_record_parsing() {
        let json = r#"[{"registerNumber":"21CSE042","percentage":87.5}]"#;
        let records: Vec<AttendanceRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].register_number, "21CSE042");
        assert!((records[0].percentage - 87.5).abs() < f64::EPSILON);
    }
}
