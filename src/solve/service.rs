use crate::settings::Settings;
use crate::solve::error::SolveError;
use crate::solve::SolveResult;
use anyhow::Result;
use base64::Engine;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const ERROR_BODY_LIMIT: usize = 200;

/// One bitmap plus the bindings known at the time it was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRequest {
    pub image_png: Vec<u8>,
    pub bindings: HashMap<String, String>,
}

impl SolveRequest {
    pub fn image_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.image_png)
        )
    }
}

/// Recognition/solving backend. Called from a worker thread.
pub trait SolveService: Send + Sync {
    fn solve(&self, request: &SolveRequest) -> Result<Vec<SolveResult>, SolveError>;
}

impl<F> SolveService for F
where
    F: Fn(&SolveRequest) -> Result<Vec<SolveResult>, SolveError> + Send + Sync,
{
    fn solve(&self, request: &SolveRequest) -> Result<Vec<SolveResult>, SolveError> {
        self(request)
    }
}

/// Wraps a closure as a shareable [`SolveService`].
pub fn from_fn<F>(f: F) -> Arc<dyn SolveService>
where
    F: Fn(&SolveRequest) -> Result<Vec<SolveResult>, SolveError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Stand-in used when no endpoint could be resolved. Every solve fails with
/// [`SolveError::Config`], so the problem surfaces as a notice on trigger.
#[derive(Debug, Clone)]
pub struct UnconfiguredService {
    reason: String,
}

impl UnconfiguredService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SolveService for UnconfiguredService {
    fn solve(&self, _request: &SolveRequest) -> Result<Vec<SolveResult>, SolveError> {
        Err(SolveError::Config(self.reason.clone()))
    }
}

/// Builds the HTTP service for the configured endpoint.
///
/// A missing or invalid endpoint is not fatal here; only failing to build the
/// HTTP client is.
pub fn service_from_settings(settings: &Settings) -> Result<Arc<dyn SolveService>> {
    match settings.solve_endpoint() {
        Ok(endpoint) => {
            tracing::info!(%endpoint, "using solve service");
            Ok(Arc::new(HttpSolveService::new(endpoint, settings.request_timeout())?))
        }
        Err(err) => {
            tracing::warn!("solve service unavailable: {err:#}");
            Ok(Arc::new(UnconfiguredService::new(format!("{err:#}"))))
        }
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    image: String,
    dict_of_vars: &'a HashMap<String, String>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    message: Option<String>,
    data: Vec<WireResult>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct WireResult {
    expr: Value,
    result: Value,
    #[serde(default)]
    assign: bool,
}

/// JSON-over-HTTP client for the `/calculate` endpoint.
pub struct HttpSolveService {
    client: Client,
    endpoint: Url,
}

impl HttpSolveService {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("sketch-solver")
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl SolveService for HttpSolveService {
    fn solve(&self, request: &SolveRequest) -> Result<Vec<SolveResult>, SolveError> {
        let body = WireRequest {
            image: request.image_data_url(),
            dict_of_vars: &request.bindings,
        };
        tracing::debug!(
            endpoint = %self.endpoint,
            image_bytes = request.image_png.len(),
            bindings = request.bindings.len(),
            "posting solve request"
        );

        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .map_err(|err| SolveError::Network(err.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .map_err(|err| SolveError::Network(err.to_string()))?;
        parse_response(status, &text)
    }
}

/// Maps an HTTP status and body onto the result list or a [`SolveError`].
pub fn parse_response(status: u16, body: &str) -> Result<Vec<SolveResult>, SolveError> {
    if !(200..300).contains(&status) {
        return Err(SolveError::Service {
            status,
            message: truncate(body.trim(), ERROR_BODY_LIMIT),
        });
    }

    let wire: WireResponse = serde_json::from_str(body)
        .map_err(|err| SolveError::MalformedResponse(err.to_string()))?;

    if let Some(state) = wire.status.as_deref() {
        if state != "success" {
            return Err(SolveError::Service {
                status,
                message: wire.message.unwrap_or_else(|| state.to_owned()),
            });
        }
    }

    wire.data
        .into_iter()
        .map(|item| {
            Ok(SolveResult {
                expression: value_text(item.expr, "expr")?,
                answer: value_text(item.result, "result")?,
                assign: item.assign,
            })
        })
        .collect()
}

fn value_text(value: Value, field: &str) -> Result<String, SolveError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(SolveError::MalformedResponse(format!(
            "field `{field}` must be text or a number, got {other}"
        ))),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}
