//! OAuth-backed HTTP probe for Gemini quota.
//!
//! The Gemini CLI stores its OAuth credentials in `~/.gemini/oauth_creds.json`.
//! When the CLI path fails, this probe reuses that token against the Cloud
//! Code quota endpoint -- the same data the CLI itself would show, without
//! driving a terminal. A best-effort billing request attaches cost figures
//! when the account exposes them.

use quotabar_core::{ProbeError, UsageSnapshot};
use quotabar_fetch::{HttpApi, HttpRequest};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::parser::parse_quota_response;
use crate::cost::parse_billing_report;

/// Quota endpoint of the Cloud Code private API.
const QUOTA_URL: &str = "https://cloudcode-pa.googleapis.com/v1internal:retrieveQuota";

/// Billing endpoint for cost figures.
const BILLING_URL: &str = "https://cloudcode-pa.googleapis.com/v1internal:retrieveBilling";

// ============================================================================
// Credentials
// ============================================================================

/// OAuth credentials written by the Gemini CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiCredentials {
    /// Bearer token.
    pub access_token: String,
    /// Expiry as epoch milliseconds.
    #[serde(default)]
    pub expiry_date: Option<i64>,
}

impl GeminiCredentials {
    /// Default credential file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".gemini/oauth_creds.json"))
    }

    /// Returns true if a credential file exists at the given or default path.
    pub fn exists(override_path: Option<&PathBuf>) -> bool {
        override_path
            .cloned()
            .or_else(Self::default_path)
            .is_some_and(|p| p.is_file())
    }

    /// Loads credentials from the given or default path.
    pub fn load(override_path: Option<&PathBuf>) -> Result<Self, ProbeError> {
        let path = override_path
            .cloned()
            .or_else(Self::default_path)
            .ok_or_else(|| {
                ProbeError::AuthenticationRequired("no home directory for credentials".into())
            })?;

        let raw = std::fs::read_to_string(&path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "Credential file unreadable");
            ProbeError::AuthenticationRequired("Gemini CLI login not found".into())
        })?;

        let creds: Self = serde_json::from_str(&raw).map_err(|e| {
            warn!(error = %e, "Credential file is malformed");
            ProbeError::AuthenticationRequired("Gemini credentials are malformed".into())
        })?;

        if creds.is_expired() {
            return Err(ProbeError::AuthenticationRequired(
                "Gemini OAuth token has expired".into(),
            ));
        }
        Ok(creds)
    }

    /// Returns true if the stored expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expiry_date
            .is_some_and(|ms| ms <= chrono::Utc::now().timestamp_millis())
    }
}

// ============================================================================
// API probe
// ============================================================================

/// HTTP quota probe over the injected network capability.
#[derive(Clone)]
pub struct GeminiApiProbe {
    http: Arc<dyn HttpApi>,
    credential_path: Option<PathBuf>,
}

impl GeminiApiProbe {
    /// Creates a probe with an optional credential path override.
    pub fn new(http: Arc<dyn HttpApi>, credential_path: Option<PathBuf>) -> Self {
        Self {
            http,
            credential_path,
        }
    }

    /// Returns true if a credential file is present.
    pub fn is_available(&self) -> bool {
        GeminiCredentials::exists(self.credential_path.as_ref())
    }

    /// Fetches quota (and best-effort cost) via the API.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<UsageSnapshot, ProbeError> {
        let creds = GeminiCredentials::load(self.credential_path.as_ref())?;

        let request = HttpRequest::post_json(QUOTA_URL, &serde_json::json!({}))
            .bearer(&creds.access_token);
        let response = self
            .http
            .request(request)
            .await
            .map_err(ProbeError::from)?
            .error_for_status()
            .map_err(ProbeError::from)?;

        let mut snapshot = parse_quota_response(&response.body_text())?;

        // Cost figures are a bonus; their absence never fails the probe.
        match self.fetch_billing(&creds).await {
            Ok(Some(cost)) => snapshot = snapshot.with_cost(cost),
            Ok(None) => {}
            Err(e) => debug!(error = %e, "Billing request failed, continuing without cost"),
        }

        Ok(snapshot)
    }

    async fn fetch_billing(
        &self,
        creds: &GeminiCredentials,
    ) -> Result<Option<quotabar_core::CostUsage>, ProbeError> {
        let request = HttpRequest::post_json(BILLING_URL, &serde_json::json!({}))
            .bearer(&creds.access_token);
        let response = self.http.request(request).await.map_err(ProbeError::from)?;
        if !response.is_success() {
            return Ok(None);
        }
        Ok(parse_billing_report(&response.body_text()).ok())
    }
}

impl std::fmt::Debug for GeminiApiProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiApiProbe")
            .field("credential_path", &self.credential_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quotabar_fetch::{HttpError, HttpResponse};
    use std::sync::Mutex;

    /// Hand-written double: serves queued responses and records URLs.
    struct MockHttp {
        responses: Mutex<Vec<HttpResponse>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockHttp {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpApi for MockHttp {
        async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.requests.lock().unwrap().push(request.url.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(HttpResponse {
                    status: 500,
                    body: b"exhausted".to_vec(),
                });
            }
            Ok(responses.remove(0))
        }
    }

    fn write_creds(dir: &std::path::Path, expiry: Option<i64>) -> PathBuf {
        let path = dir.join("oauth_creds.json");
        let creds = match expiry {
            Some(ms) => format!(r#"{{"access_token": "tok", "expiry_date": {ms}}}"#),
            None => r#"{"access_token": "tok"}"#.to_string(),
        };
        std::fs::write(&path, creds).unwrap();
        path
    }

    #[tokio::test]
    async fn fetch_parses_quota_and_attaches_cost() {
        let dir = std::env::temp_dir().join("quotabar-gemini-test-ok");
        std::fs::create_dir_all(&dir).unwrap();
        let creds = write_creds(&dir, None);

        let quota_body = br#"{"buckets":[{"model":"gemini-2.5-pro","remainingPercent":70.0}]}"#;
        let billing_body = br#"{"spent":"1.25","budget":"10.00"}"#;
        let http = Arc::new(MockHttp::new(vec![
            HttpResponse {
                status: 200,
                body: quota_body.to_vec(),
            },
            HttpResponse {
                status: 200,
                body: billing_body.to_vec(),
            },
        ]));

        let probe = GeminiApiProbe::new(http.clone(), Some(creds));
        let snapshot = probe.fetch().await.unwrap();

        assert_eq!(snapshot.quotas.len(), 1);
        assert!(snapshot.cost.is_some());
        assert_eq!(http.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn expired_token_is_authentication_error() {
        let dir = std::env::temp_dir().join("quotabar-gemini-test-expired");
        std::fs::create_dir_all(&dir).unwrap();
        let creds = write_creds(&dir, Some(1_000));

        let http = Arc::new(MockHttp::new(vec![]));
        let probe = GeminiApiProbe::new(http, Some(creds));
        assert!(matches!(
            probe.fetch().await.unwrap_err(),
            ProbeError::AuthenticationRequired(_)
        ));
    }

    #[tokio::test]
    async fn missing_credentials_is_authentication_error() {
        let http = Arc::new(MockHttp::new(vec![]));
        let probe = GeminiApiProbe::new(http, Some(PathBuf::from("/nonexistent/creds.json")));
        assert!(!probe.is_available());
        assert!(matches!(
            probe.fetch().await.unwrap_err(),
            ProbeError::AuthenticationRequired(_)
        ));
    }

    #[tokio::test]
    async fn unauthorized_response_classifies_as_authentication() {
        let dir = std::env::temp_dir().join("quotabar-gemini-test-401");
        std::fs::create_dir_all(&dir).unwrap();
        let creds = write_creds(&dir, None);

        let http = Arc::new(MockHttp::new(vec![HttpResponse {
            status: 401,
            body: b"token revoked".to_vec(),
        }]));
        let probe = GeminiApiProbe::new(http, Some(creds));
        assert!(matches!(
            probe.fetch().await.unwrap_err(),
            ProbeError::AuthenticationRequired(_)
        ));
    }
}
