//! Registry client
//!
//! Owns the HTTP session and the token lifecycle, and implements the batched
//! fetch pipeline: chunking, the one-time rate-limit pause, per-batch retry
//! with backoff, response cleaning and aggregation.

use crate::config::{AppConfig, AuthConfig};
use crate::error::handlers::{describe_status, describe_transport};
use crate::error::{CheckerError, QueryError, Result};
use crate::logging::Logger;
use crate::record::{clean_record, merge_records};
use crate::registry::auth::Auth;
use crate::registry::batch::BatchPlan;
use crate::registry::retry::{RetryPolicy, Sleeper, TokioSleeper, retry_with_backoff};
use crate::registry::token_manager::TokenManager;
use crate::types::{HealthStatus, Identifier, RecordMap};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("nit-checker/", env!("CARGO_PKG_VERSION"));

/// Services recognized when none are configured
pub const DEFAULT_SERVICES: [&str; 2] = ["inscription", "padron"];

pub struct RegistryClientBuilder {
    base_url: String,
    credentials: AuthConfig,
    chunk_size: usize,
    max_calls: usize,
    pause: Duration,
    max_retries: u32,
    retry_delay: Duration,
    services: Vec<String>,
    timeout: Option<Duration>,
    sleeper: Arc<dyn Sleeper>,
    output: Logger,
}

impl RegistryClientBuilder {
    pub fn new(base_url: impl Into<String>, credentials: AuthConfig) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            chunk_size: 100,
            max_calls: 10,
            pause: Duration::from_secs(60),
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            services: DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect(),
            timeout: None,
            sleeper: Arc::new(TokioSleeper),
            output: Logger::new(false),
        }
    }

    /// Builder pre-filled from the loaded application config
    pub fn from_config(config: &AppConfig) -> Self {
        let mut builder = Self::new(config.base_url.clone(), config.auth.clone())
            .with_chunk_size(config.chunk_size)
            .with_max_calls(config.max_calls)
            .with_pause(Duration::from_secs(config.pause_duration))
            .with_max_retries(config.max_retries)
            .with_retry_delay(Duration::from_secs(config.retry_delay))
            .with_services(config.services.clone());
        if let Some(secs) = config.request_timeout {
            builder = builder.with_timeout(Duration::from_secs(secs));
        }
        builder
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_calls(mut self, max_calls: usize) -> Self {
        self.max_calls = max_calls;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Recognized service names; an empty list keeps the defaults
    pub fn with_services(mut self, services: Vec<String>) -> Self {
        if !services.is_empty() {
            self.services = services;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_logger(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    /// Build the client and authenticate right away.
    ///
    /// A failed authentication is not an error here: the client is returned
    /// without a token and every service reports itself unavailable.
    pub async fn build(self) -> Result<RegistryClient> {
        if self.chunk_size == 0 {
            return Err(CheckerError::Validation(
                "chunk size must be greater than 0".to_string(),
            ));
        }

        let mut http = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|e| CheckerError::Client(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = self.base_url.trim_end_matches('/').to_string();
        let auth = Auth::new(http.clone(), &base_url, self.credentials, self.output.clone());
        let tokens = TokenManager::new(auth, self.output.clone());
        tokens.login().await;

        Ok(RegistryClient {
            http,
            base_url,
            plan: BatchPlan {
                chunk_size: self.chunk_size,
                max_calls: self.max_calls,
                pause: self.pause,
            },
            retry: RetryPolicy::new(self.max_retries, self.retry_delay),
            services: self.services,
            tokens,
            sleeper: self.sleeper,
            output: self.output,
        })
    }
}

#[derive(Clone)]
pub struct RegistryClient {
    http: Client,
    base_url: String,
    plan: BatchPlan,
    retry: RetryPolicy,
    services: Vec<String>,
    tokens: TokenManager,
    sleeper: Arc<dyn Sleeper>,
    output: Logger,
}

impl RegistryClient {
    pub fn builder(base_url: impl Into<String>, credentials: AuthConfig) -> RegistryClientBuilder {
        RegistryClientBuilder::new(base_url, credentials)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Recognized service names
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// Token currently in use, if authentication succeeded
    pub fn token(&self) -> Option<String> {
        self.tokens.current()
    }

    /// Re-authenticate; the stored token is kept when this fails
    pub async fn refresh_token(&self) -> bool {
        self.tokens.refresh().await
    }

    /// True iff `service` is recognized and a token is held
    pub fn is_service_available(&self, service: &str) -> bool {
        if !self.services.iter().any(|s| s == service) {
            self.output.error(&format!("Unknown service: {}", service));
            return false;
        }
        if !self.tokens.has_token() {
            self.output.error("No valid token available.");
            return false;
        }
        true
    }

    fn ensure_available(&self, service: &str) -> std::result::Result<(), QueryError> {
        if self.is_service_available(service) {
            Ok(())
        } else {
            Err(QueryError::ServiceUnavailable {
                service: service.to_string(),
            })
        }
    }

    fn service_url(&self, service: &str) -> String {
        format!("{}/{}", self.base_url, service)
    }

    /// Send one batch, refreshing the token once on 401
    pub async fn query_once(
        &self,
        service: &str,
        batch: &[Identifier],
    ) -> std::result::Result<Vec<Value>, QueryError> {
        self.ensure_available(service)?;

        let url = self.service_url(service);
        let payload = json!({ "persona_ids": batch });

        let mut response = self.post_json(&url, &payload, service).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.output.warning(&format!(
                "Received 401 Unauthorized for service '{}'. Attempting token refresh...",
                service
            ));
            if !self.tokens.refresh().await {
                self.output
                    .error(&format!("Token refresh failed for service '{}'.", service));
                return Err(QueryError::Unauthorized {
                    service: service.to_string(),
                });
            }
            response = self.post_json(&url, &payload, service).await?;
        }

        self.read_records(service, response).await
    }

    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
        service: &str,
    ) -> std::result::Result<Response, QueryError> {
        let mut request = self.http.post(url).json(payload);
        if let Some(token) = self.tokens.current() {
            request = request.bearer_auth(token);
        }
        request.send().await.map_err(|e| {
            let message = describe_transport(&e, service);
            self.output.error(&format!(
                "Request error while querying service '{}': {}",
                service, message
            ));
            QueryError::Transport(message)
        })
    }

    async fn read_records(
        &self,
        service: &str,
        response: Response,
    ) -> std::result::Result<Vec<Value>, QueryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            self.output.error(&format!(
                "Error querying service: {}",
                describe_status(status, &body, service)
            ));
            return Err(QueryError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| QueryError::InvalidResponse(format!("{}: {}", service, e)))?;

        match body.get("data") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.iter().map(clean_record).collect()),
            Some(other) => Err(QueryError::InvalidResponse(format!(
                "{}: expected 'data' to be a list, got {}",
                service, other
            ))),
        }
    }

    /// Query one batch with exponential backoff between attempts
    pub async fn query_with_retry(
        &self,
        service: &str,
        batch: &[Identifier],
    ) -> std::result::Result<Vec<Value>, QueryError> {
        retry_with_backoff(
            self.retry,
            service,
            self.sleeper.as_ref(),
            &self.output,
            |_| self.query_once(service, batch),
        )
        .await
    }

    /// Fetch every identifier in batches and merge the cleaned records.
    ///
    /// A batch that exhausts its retries is logged and left out; the others
    /// are still merged.
    pub async fn fetch_batched(
        &self,
        service: &str,
        identifiers: &[Identifier],
    ) -> std::result::Result<RecordMap, QueryError> {
        if !self.is_service_available(service) {
            self.output
                .error(&format!("Service instance check failed for '{}'.", service));
            return Err(QueryError::ServiceUnavailable {
                service: service.to_string(),
            });
        }

        let batches = self.plan.partition(identifiers);
        if batches.len() > 1 {
            self.output
                .info(&format!("Split person IDs into {} chunks.", batches.len()));
        }

        let mut collected: Vec<Value> = Vec::new();
        let mut failed = 0usize;

        for (index, batch) in batches.iter().enumerate() {
            if let Some(pause) = self.plan.pause_before(index) {
                self.output.info(&format!(
                    "Reached maximum consecutive calls ({}). Pausing for {} seconds...",
                    self.plan.max_calls,
                    pause.as_secs()
                ));
                self.sleeper.sleep(pause).await;
            }
            self.output.detail(&format!(
                "Chunk {}/{}: {} identifiers",
                index + 1,
                batches.len(),
                batch.len()
            ));

            match self.query_with_retry(service, batch).await {
                Ok(records) => {
                    self.output.debug(&format!(
                        "Chunk {} returned {} records",
                        index + 1,
                        records.len()
                    ));
                    collected.extend(records);
                }
                Err(e) => {
                    failed += 1;
                    self.output.error(&format!(
                        "Failed to retrieve data for chunk {} of service '{}': {}",
                        index + 1,
                        service,
                        e
                    ));
                }
            }
        }

        if failed > 0 {
            self.output.warning(&format!(
                "{} of {} chunks for service '{}' returned no data",
                failed,
                batches.len(),
                service
            ));
        }

        Ok(merge_records(collected, &self.output))
    }

    /// Probe `{base}/{service}/health` and return the raw answer
    pub async fn check_health(
        &self,
        service: &str,
    ) -> std::result::Result<HealthStatus, QueryError> {
        self.ensure_available(service)?;

        let url = format!("{}/health", self.service_url(service));
        let mut request = self.http.get(&url);
        if let Some(token) = self.tokens.current() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            let message = describe_transport(&e, "health check");
            self.output.error(&format!(
                "Exception checking health for service '{}': {}",
                service, message
            ));
            QueryError::Transport(message)
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Transport(describe_transport(&e, "health check")))?;
        Ok(HealthStatus { status, body })
    }
}
