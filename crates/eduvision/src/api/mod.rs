//! Client for the EduVision REST API.
//!
//! Every call is a single GET against the configured base URL: no retries,
//! no timeout, no caching. Success bodies are validated against the schemas
//! in [`types`]; failure bodies are read as an [`ErrorEnvelope`] and turned
//! into [`Error::Request`].

pub mod types;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result, GENERIC_REQUEST_FAILURE};
use crate::session::Prn;

pub use types::{
    DashboardPayload, ErrorEnvelope, HealthStatus, ImprovementPayload, ProgressPayload,
    ReportsPayload, StudentDirectory,
};

/// Server message that triggers the suggestion hint.
const NOT_FOUND_MESSAGE: &str = "Student not found";

/// A response as seen by the client: status code and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one GET request.
///
/// Production code uses [`HttpTransport`]; tests substitute canned responses.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Fetch `url` once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when no response could be obtained.
    async fn get(&self, url: &Url) -> Result<RawResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// A validated API base URL without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(Url);

impl ApiBase {
    /// Parse a base URL, stripping one trailing `/`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiBase`] for unparseable or non-http(s) URLs.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let url = Url::parse(trimmed).map_err(|e| Error::InvalidApiBase {
            base: raw.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidApiBase {
                base: raw.to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.cannot_be_a_base() {
            return Err(Error::InvalidApiBase {
                base: raw.to_string(),
                message: "URL cannot be used as a base".to_string(),
            });
        }
        Ok(Self(url))
    }

    /// The base as a string, without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    /// Join path segments onto the base, percent-encoding each segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiBase`] if the base cannot take segments.
    pub fn join(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.0.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidApiBase {
                base: self.as_str().to_string(),
                message: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The endpoints the client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `/student/{prn}/dashboard`
    Dashboard(&'a Prn),
    /// `/student/{prn}/progress`
    Progress(&'a Prn),
    /// `/student/{prn}/improvement`
    Improvement(&'a Prn),
    /// `/student/{prn}/reports`
    Reports(&'a Prn),
    /// `/health`
    Health,
    /// `/students`
    Students,
}

impl Endpoint<'_> {
    /// Short name used in logs and validation errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dashboard(_) => "dashboard",
            Self::Progress(_) => "progress",
            Self::Improvement(_) => "improvement",
            Self::Reports(_) => "reports",
            Self::Health => "health",
            Self::Students => "students",
        }
    }

    /// Path segments below the API base (unencoded).
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Dashboard(prn)
            | Self::Progress(prn)
            | Self::Improvement(prn)
            | Self::Reports(prn) => vec!["student", prn.as_str(), self.name()],
            Self::Health => vec!["health"],
            Self::Students => vec!["students"],
        }
    }
}

/// Build the user-facing message for a failure envelope.
///
/// The server's `error` string (or a generic fallback) is extended with the
/// suggested PRNs when the server says the student was not found.
#[must_use]
pub fn failure_message(envelope: &ErrorEnvelope) -> String {
    let error = envelope.error.as_deref().filter(|e| !e.is_empty());
    let mut message = error.unwrap_or(GENERIC_REQUEST_FAILURE).to_string();

    if error == Some(NOT_FOUND_MESSAGE) {
        let suggestions: Vec<&str> = envelope
            .suggestions
            .iter()
            .map(|s| s.prn.as_str())
            .filter(|prn| !prn.is_empty())
            .collect();
        if !suggestions.is_empty() {
            message = format!("{message}. Try one of: {}", suggestions.join(", "));
        }
    }

    message
}

/// Turn a raw response into a JSON value or a request error.
///
/// # Errors
///
/// Returns [`Error::Request`] for non-success statuses and
/// [`Error::Validation`] for success bodies that are not JSON.
pub fn interpret(endpoint: &str, response: &RawResponse) -> Result<Value> {
    if !response.is_success() {
        let envelope = serde_json::from_str::<ErrorEnvelope>(&response.body).unwrap_or_else(|e| {
            warn!(
                "{} returned HTTP {} with an unreadable error body: {}",
                endpoint, response.status, e
            );
            ErrorEnvelope::default()
        });
        if let Some(details) = &envelope.details {
            debug!("{} failure details: {}", endpoint, details);
        }
        return Err(Error::request(response.status, failure_message(&envelope)));
    }

    if response.body.trim().is_empty() {
        return Err(Error::validation(endpoint, "empty response body"));
    }

    serde_json::from_str(&response.body).map_err(|e| Error::validation(endpoint, e.to_string()))
}

/// Validate a JSON value against an endpoint schema.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the value does not match `T`.
pub fn validate<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T> {
    if !value.is_object() {
        return Err(Error::validation(endpoint, "expected a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| Error::validation(endpoint, e.to_string()))
}

/// Client for the EduVision API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: ApiBase,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client that talks HTTP to `base`.
    #[must_use]
    pub fn new(base: ApiBase) -> Self {
        Self::with_transport(base, Arc::new(HttpTransport::new()))
    }

    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(base: ApiBase, transport: Arc<dyn Transport>) -> Self {
        Self { base, transport }
    }

    /// Fetch an endpoint and return its raw JSON.
    ///
    /// # Errors
    ///
    /// Returns a transport, request or validation error.
    pub async fn fetch_value(&self, endpoint: Endpoint<'_>) -> Result<Value> {
        let url = self.base.join(&endpoint.segments())?;
        debug!("GET {}", url);

        let response = self.transport.get(&url).await.map_err(|e| {
            warn!("GET {} failed: {}", url, e);
            e
        })?;
        debug!("GET {} -> {}", url, response.status);

        interpret(endpoint.name(), &response)
    }

    /// Fetch an endpoint and validate it against `T`.
    ///
    /// # Errors
    ///
    /// Returns a transport, request or validation error.
    pub async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> Result<T> {
        let value = self.fetch_value(endpoint).await?;
        validate(endpoint.name(), value)
    }

    /// `GET /student/{prn}/dashboard`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn dashboard(&self, prn: &Prn) -> Result<DashboardPayload> {
        self.fetch(Endpoint::Dashboard(prn)).await
    }

    /// `GET /student/{prn}/progress`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn progress(&self, prn: &Prn) -> Result<ProgressPayload> {
        self.fetch(Endpoint::Progress(prn)).await
    }

    /// `GET /student/{prn}/improvement`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn improvement(&self, prn: &Prn) -> Result<ImprovementPayload> {
        self.fetch(Endpoint::Improvement(prn)).await
    }

    /// `GET /student/{prn}/reports`, keeping the raw JSON for export.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn reports(&self, prn: &Prn) -> Result<(ReportsPayload, Value)> {
        let endpoint = Endpoint::Reports(prn);
        let raw = self.fetch_value(endpoint).await?;
        let payload = validate(endpoint.name(), raw.clone())?;
        Ok((payload, raw))
    }

    /// `GET /health`
    ///
    /// An unhealthy service answers 503 with the same body shape, which is
    /// returned as a status rather than an error.
    ///
    /// # Errors
    ///
    /// Returns a transport error, or a request/validation error for any
    /// other failure.
    pub async fn health(&self) -> Result<HealthStatus> {
        let endpoint = Endpoint::Health;
        let url = self.base.join(&endpoint.segments())?;
        debug!("GET {}", url);
        let response = self.transport.get(&url).await?;

        if response.status == 503 {
            if let Ok(status) = serde_json::from_str::<HealthStatus>(&response.body) {
                return Ok(status);
            }
        }
        let value = interpret(endpoint.name(), &response)?;
        validate(endpoint.name(), value)
    }

    /// `GET /students`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn students(&self) -> Result<StudentDirectory> {
        self.fetch(Endpoint::Students).await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::ScriptedTransport;
    use super::*;

    fn prn(raw: &str) -> Prn {
        Prn::parse(raw).unwrap()
    }

    fn client(transport: &Arc<ScriptedTransport>) -> ApiClient {
        ApiClient::with_transport(
            ApiBase::parse("http://127.0.0.1:5000/api").unwrap(),
            transport.clone(),
        )
    }

    #[test]
    fn test_api_base_strips_trailing_slash() {
        let base = ApiBase::parse("http://127.0.0.1:5000/api/").unwrap();
        assert_eq!(base.as_str(), "http://127.0.0.1:5000/api");
        assert_eq!(base.to_string(), "http://127.0.0.1:5000/api");
    }

    #[test]
    fn test_api_base_rejects_bad_urls() {
        assert!(matches!(
            ApiBase::parse("ftp://host/api"),
            Err(Error::InvalidApiBase { .. })
        ));
        assert!(matches!(
            ApiBase::parse("not a url"),
            Err(Error::InvalidApiBase { .. })
        ));
    }

    #[test]
    fn test_join_encodes_segments() {
        let base = ApiBase::parse("http://h:5000/api").unwrap();
        let url = base.join(&["student", "A B/1", "dashboard"]).unwrap();
        assert_eq!(url.as_str(), "http://h:5000/api/student/A%20B%2F1/dashboard");
    }

    #[test]
    fn test_join_on_bare_host() {
        let base = ApiBase::parse("http://h:5000").unwrap();
        let url = base.join(&["health"]).unwrap();
        assert_eq!(url.as_str(), "http://h:5000/health");
    }

    #[test]
    fn test_endpoint_segments() {
        let id = prn("prn01");
        assert_eq!(
            Endpoint::Reports(&id).segments(),
            vec!["student", "PRN01", "reports"]
        );
        assert_eq!(Endpoint::Students.segments(), vec!["students"]);
    }

    #[test]
    fn test_failure_message_with_suggestions() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error":"Student not found","suggestions":[{"prn":"X1"},{"prn":"X2"}]}"#,
        )
        .unwrap();
        let message = failure_message(&envelope);
        assert!(message.contains("Try one of: X1, X2"));
        assert_eq!(message, "Student not found. Try one of: X1, X2");
    }

    #[test]
    fn test_failure_message_without_suggestions() {
        let envelope: ErrorEnvelope =
            serde_json::from_str(r#"{"error":"Student not found","suggestions":[]}"#).unwrap();
        assert_eq!(failure_message(&envelope), "Student not found");
    }

    #[test]
    fn test_failure_message_suggestions_only_for_not_found() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error":"Unable to load dashboard","suggestions":[{"prn":"X1"}]}"#,
        )
        .unwrap();
        assert_eq!(failure_message(&envelope), "Unable to load dashboard");
    }

    #[test]
    fn test_failure_message_generic_fallback() {
        assert_eq!(failure_message(&ErrorEnvelope::default()), "Request failed");
    }

    #[test]
    fn test_interpret_non_json_failure_body() {
        let err = interpret("dashboard", &RawResponse::new(502, "<html>bad gateway</html>"))
            .unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "Request failed");
    }

    #[test]
    fn test_interpret_success_non_json_is_validation_error() {
        let err = interpret("reports", &RawResponse::new(200, "oops")).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err = interpret("reports", &RawResponse::new(200, "  ")).unwrap_err();
        assert!(err.to_string().contains("empty response body"));
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let err = validate::<DashboardPayload>("dashboard", serde_json::json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[tokio::test]
    async fn test_not_found_with_suggestions() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            404,
            r#"{"error":"Student not found","suggestions":[{"prn":"X1"},{"prn":"X2"}]}"#,
        ));
        let err = client(&transport).dashboard(&prn("x")).await.unwrap_err();

        assert!(err.to_string().contains("Try one of: X1, X2"));
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            transport.requests(),
            vec!["http://127.0.0.1:5000/api/student/X/dashboard"]
        );
    }

    #[tokio::test]
    async fn test_case_insensitive_lookup_hits_same_url() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(200, r#"{"student":{"prn":"ABC123"}}"#)
                .respond(200, r#"{"student":{"prn":"ABC123"}}"#),
        );
        let api = client(&transport);
        api.progress(&prn("abc123")).await.unwrap();
        api.progress(&prn("ABC123")).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_validation_error() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, r#"{"goals": 5}"#));
        let err = client(&transport).progress(&prn("p1")).await.unwrap_err();
        assert!(matches!(err, Error::Validation { ref endpoint, .. } if endpoint == "progress"));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = Arc::new(ScriptedTransport::new().fail("connection refused"));
        let err = client(&transport).improvement(&prn("p1")).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test]
    async fn test_reports_keeps_raw_payload() {
        let body = r#"{"student":{"prn":"P1","name":"Riya"},"reports":[],"extra":{"kept":true}}"#;
        let transport = Arc::new(ScriptedTransport::new().respond(200, body));
        let (payload, raw) = client(&transport).reports(&prn("p1")).await.unwrap();

        assert!(payload.reports.is_empty());
        assert_eq!(raw["extra"]["kept"], true);
    }

    #[tokio::test]
    async fn test_health_unhealthy_is_status() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            503,
            r#"{"ok":false,"service":"eduvision-student-api","database":"error","details":"refused"}"#,
        ));
        let status = client(&transport).health().await.unwrap();
        assert!(!status.ok);
        assert_eq!(status.database.as_deref(), Some("error"));
        assert_eq!(
            transport.requests(),
            vec!["http://127.0.0.1:5000/api/health"]
        );
    }

    #[tokio::test]
    async fn test_students_directory() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            200,
            r#"{"students":[{"prn":"P1","name":"Riya"},{"prn":"P2","name":"Aarav"}],"count":2}"#,
        ));
        let directory = client(&transport).students().await.unwrap();
        assert_eq!(directory.count, 2);
        assert_eq!(directory.students[1].prn, "P2");
    }
}
