use super::history::ReplayHistoryStore;
use super::model::{EnvironmentMapping, OutgoingRequest, ReplayConfig, ReplayResult, ReplayTarget};
use super::target::{resolve_target, validate_target};
use crate::common::error::ReplayError;
use crate::common::utils::{format_timestamp, generate_id, now_millis};
use crate::logging;
use crate::traffic::HttpCaller;
use std::sync::Arc;
use std::time::Instant;

/// Sends single replays through an injected `HttpCaller` and records each
/// outcome in a `ReplayHistoryStore`.
pub struct ReplayExecutor {
    caller: Arc<dyn HttpCaller>,
    history: Arc<ReplayHistoryStore>,
    environments: EnvironmentMapping,
}

impl ReplayExecutor {
    pub fn new(caller: Arc<dyn HttpCaller>, history: Arc<ReplayHistoryStore>) -> Self {
        Self {
            caller,
            history,
            environments: EnvironmentMapping::new(),
        }
    }

    /// Default mapping for configs that do not bring their own
    pub fn with_environments(mut self, environments: EnvironmentMapping) -> Self {
        self.environments = environments;
        self
    }

    pub fn history(&self) -> &Arc<ReplayHistoryStore> {
        &self.history
    }

    fn environments_for<'a>(&'a self, config: &'a ReplayConfig) -> &'a EnvironmentMapping {
        config
            .environment_mapping
            .as_ref()
            .unwrap_or(&self.environments)
    }

    /// Check a target against the default mapping
    pub fn check_target(&self, target: &ReplayTarget) -> Result<(), ReplayError> {
        validate_target(target, &self.environments, None)
    }

    /// Build the request a replay would send.
    ///
    /// Headers layer as captured, then environment headers, then the config's
    /// overrides; a later layer wins per key as written.
    pub fn build_request(&self, config: &ReplayConfig) -> Result<OutgoingRequest, ReplayError> {
        let captured = &config.captured_request;
        let resolved = resolve_target(
            &captured.url,
            &config.target,
            self.environments_for(config),
            config.custom_url.as_deref(),
        )?;

        let mut headers = captured.headers.clone();
        headers.extend(resolved.headers);
        if let Some(overrides) = &config.header_overrides {
            headers.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok(OutgoingRequest {
            method: captured.method.clone(),
            url: resolved.url,
            headers,
            body: config
                .body_override
                .clone()
                .or_else(|| captured.body.clone()),
        })
    }

    /// Replay one captured request.
    ///
    /// Only target resolution errors are returned as `Err`, and no call is
    /// made in that case. Transport failures come back as an unsuccessful
    /// `ReplayResult`. Every attempt that reaches the caller is recorded.
    pub async fn replay(&self, config: &ReplayConfig) -> Result<ReplayResult, ReplayError> {
        let request = self.build_request(config)?;
        let id = generate_id("replay");
        let started_at = now_millis();
        let clock = Instant::now();

        log::info!(
            "Replay {}: {} {} ({})",
            id,
            request.method,
            request.url,
            config.target
        );

        let outcome = self.caller.call(&request).await;
        let duration_ms = clock.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(response) => {
                log::debug!("Replay {} returned {}", id, response.status);
                ReplayResult::succeeded(
                    id,
                    config,
                    request,
                    response.into_snapshot(),
                    started_at,
                    duration_ms,
                )
            }
            Err(e) => {
                log::warn!("Replay {} failed: {}", id, e);
                ReplayResult::failed(id, config, request, e.message, started_at, duration_ms)
            }
        };

        self.record(&result);
        Ok(result)
    }

    /// Record a replay that could not be sent because its URL did not resolve
    pub(crate) fn reject(&self, config: &ReplayConfig, error: &ReplayError) -> ReplayResult {
        let captured = &config.captured_request;
        let request = OutgoingRequest {
            method: captured.method.clone(),
            url: captured.url.clone(),
            headers: captured.headers.clone(),
            body: captured.body.clone(),
        };
        let result = ReplayResult::failed(
            generate_id("replay"),
            config,
            request,
            error.to_string(),
            now_millis(),
            0,
        );
        log::warn!("Replay {} rejected: {}", result.id, error);
        self.record(&result);
        result
    }

    fn record(&self, result: &ReplayResult) {
        self.history.append(result.clone());
        let _ = logging::write_domain_log("replay", &replay_log_line(result));
    }
}

fn replay_log_line(result: &ReplayResult) -> String {
    format!(
        "{} capture={} target={} url={} started={} success={} duration={}ms{}",
        result.id,
        result.capture_id,
        result.target,
        result.request.url,
        format_timestamp(result.started_at),
        result.success,
        result.duration_ms,
        result
            .error
            .as_ref()
            .map(|e| format!(" error={}", e))
            .unwrap_or_default()
    )
}
