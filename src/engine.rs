use crate::common::error::ReplayError;
use crate::common::models::ResponseSnapshot;
use crate::config::EnvDiffConfig;
use crate::diff::{self, DiffOptions, DiffResult};
use crate::logging;
use crate::replay::{
    CapturedRequest, ReplayConfig, ReplayExecutor, ReplayHistoryStore, ReplayResult,
    ReplaySequencer, ReplayTarget, SequenceOptions,
};
use crate::traffic::HttpCaller;
use std::sync::Arc;

/// Entry point tying replay and diff together.
///
/// Each engine owns its own history; build several for isolated logs.
pub struct ReplayDiffEngine {
    history: Arc<ReplayHistoryStore>,
    executor: Arc<ReplayExecutor>,
    sequencer: ReplaySequencer,
    diff_options: DiffOptions,
    sequence_options: SequenceOptions,
}

impl ReplayDiffEngine {
    pub fn new(caller: Arc<dyn HttpCaller>) -> Self {
        Self::from_config(&EnvDiffConfig::default(), caller)
    }

    /// Build an engine using the defaults and environments from `config`.
    ///
    /// Installs the console logger at the level `verbose_logging` selects
    /// (a logger installed earlier is kept), and starts the domain log writer
    /// and crash hook when `config.log_dir` is set.
    pub fn from_config(config: &EnvDiffConfig, caller: Arc<dyn HttpCaller>) -> Self {
        logging::init_console_logger(config.verbose_logging);
        if let Some(dir) = &config.log_dir {
            logging::init_log_dir(dir.clone());
            logging::setup_panic_hook();
        }

        let history = Arc::new(ReplayHistoryStore::new());
        let executor = Arc::new(
            ReplayExecutor::new(caller, Arc::clone(&history))
                .with_environments(config.environments.clone()),
        );
        let sequencer = ReplaySequencer::new(Arc::clone(&executor));

        Self {
            history,
            executor,
            sequencer,
            diff_options: config.diff.clone(),
            sequence_options: config.sequence.clone(),
        }
    }

    /// Compare two snapshots, using the engine's default options when none are given
    pub fn diff(
        &self,
        left: &ResponseSnapshot,
        right: &ResponseSnapshot,
        options: Option<&DiffOptions>,
    ) -> DiffResult {
        diff::diff(left, right, options.unwrap_or(&self.diff_options))
    }

    pub fn summarize(&self, result: &DiffResult) -> String {
        diff::summarize(result)
    }

    pub async fn replay(&self, config: &ReplayConfig) -> Result<ReplayResult, ReplayError> {
        self.executor.replay(config).await
    }

    pub async fn replay_multiple(
        &self,
        requests: &[CapturedRequest],
        target: &ReplayTarget,
        options: Option<&SequenceOptions>,
    ) -> Result<Vec<ReplayResult>, ReplayError> {
        self.sequencer
            .replay_multiple(requests, target, options.unwrap_or(&self.sequence_options))
            .await
    }

    /// Replay a captured request and diff its recorded response against the
    /// new one. The diff is `None` when either side has no response.
    pub async fn replay_and_diff(
        &self,
        config: &ReplayConfig,
        options: Option<&DiffOptions>,
    ) -> Result<(ReplayResult, Option<DiffResult>), ReplayError> {
        let result = self.replay(config).await?;
        let diff = match (&config.captured_request.response, result.snapshot()) {
            (Some(before), Some(after)) => Some(self.diff(before, after, options)),
            _ => None,
        };
        Ok((result, diff))
    }

    /// Interrupt the delay of any running `replay_multiple`
    pub fn cancel(&self) {
        self.sequencer.cancel();
    }

    pub fn get_history(&self) -> Vec<ReplayResult> {
        self.history.get_all()
    }

    pub fn get_by_id(&self, id: &str) -> Option<ReplayResult> {
        self.history.get_by_id(id)
    }

    pub fn clear_history(&self) {
        let count = self.history.len();
        self.history.clear();
        log::info!("Replay history cleared ({} entries)", count);
        let _ = logging::write_domain_log("audit", &format!("Cleared {} replay result(s)", count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::models::ResponseTiming;
    use crate::replay::executor::tests::{captured, FakeCaller};
    use crate::replay::EnvironmentConfig;

    fn engine(caller: Arc<FakeCaller>) -> ReplayDiffEngine {
        let mut config = EnvDiffConfig::default();
        config.environments.insert(
            "staging".into(),
            EnvironmentConfig::new("https://staging.example.com"),
        );
        ReplayDiffEngine::from_config(&config, caller)
    }

    #[tokio::test]
    async fn test_history_operations() {
        let caller = Arc::new(FakeCaller::failing_on(vec![1]));
        let engine = engine(caller);

        let ok = engine
            .replay(&ReplayConfig::new(captured("c1", "https://api.example.com/a"), ReplayTarget::Original))
            .await
            .unwrap();
        let failed = engine
            .replay(&ReplayConfig::new(captured("c2", "https://api.example.com/b"), ReplayTarget::Original))
            .await
            .unwrap();

        assert_eq!(engine.get_history().len(), 2);
        assert!(engine.get_by_id(&ok.id).unwrap().success);
        assert!(!engine.get_by_id(&failed.id).unwrap().success);
        assert!(engine.get_by_id("replay_unknown").is_none());

        engine.clear_history();
        assert!(engine.get_history().is_empty());
    }

    #[test]
    fn test_from_config_installs_console_logger() {
        let config = EnvDiffConfig {
            verbose_logging: true,
            ..Default::default()
        };
        let _engine = ReplayDiffEngine::from_config(&config, Arc::new(FakeCaller::default()));
        assert_ne!(log::max_level(), log::LevelFilter::Off);
    }

    #[tokio::test]
    async fn test_engines_have_isolated_history() {
        let first = engine(Arc::new(FakeCaller::default()));
        let second = engine(Arc::new(FakeCaller::default()));

        first
            .replay(&ReplayConfig::new(captured("c1", "https://api.example.com/a"), ReplayTarget::Original))
            .await
            .unwrap();

        assert_eq!(first.get_history().len(), 1);
        assert!(second.get_history().is_empty());
    }

    #[tokio::test]
    async fn test_replay_and_diff_against_environment() {
        let caller = Arc::new(FakeCaller::default());
        let engine = engine(caller);

        let mut request = captured("c1", "https://api.example.com/v1/users/123?x=1");
        request.response = Some(
            ResponseSnapshot::new(200, "OK", r#"{"name":"ann"}"#)
                .with_header("X-Url", "https://api.example.com/v1/users/123?x=1")
                .with_timing(ResponseTiming::total(12.0)),
        );

        let config = ReplayConfig::new(request, ReplayTarget::NamedEnvironment("staging".into()));
        let (result, diff) = engine.replay_and_diff(&config, None).await.unwrap();

        assert!(result.success);
        let diff = diff.unwrap();
        assert_eq!(diff.body_diff.kind, crate::diff::BodyDiffKind::Identical);
        assert_eq!(diff.header_diff.len(), 1);
        assert_eq!(
            diff.header_diff[0].right_value.as_deref(),
            Some("https://staging.example.com/v1/users/123?x=1")
        );
        assert!(engine.summarize(&diff).contains("~ x-url:"));
    }

    #[tokio::test]
    async fn test_replay_multiple_uses_configured_defaults() {
        let caller = Arc::new(FakeCaller::failing_on(vec![0]));
        let mut config = EnvDiffConfig::default();
        config.sequence.continue_on_error = false;
        let engine = ReplayDiffEngine::from_config(&config, caller.clone());

        let requests = vec![
            captured("c1", "https://api.example.com/a"),
            captured("c2", "https://api.example.com/b"),
        ];
        let results = engine
            .replay_multiple(&requests, &ReplayTarget::Original, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(caller.call_count(), 1);

        let all = engine
            .replay_multiple(&requests, &ReplayTarget::Original, Some(&SequenceOptions::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
