use super::executor::ReplayExecutor;
use super::model::{CapturedRequest, ReplayConfig, ReplayResult, ReplayTarget, SequenceOptions};
use crate::common::error::ReplayError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Replays batches of captured requests strictly one after another, so
/// dependent chains (login, then fetch) see their effects in order.
pub struct ReplaySequencer {
    executor: Arc<ReplayExecutor>,
    cancel: Mutex<CancellationToken>,
}

impl ReplaySequencer {
    pub fn new(executor: Arc<ReplayExecutor>) -> Self {
        Self {
            executor,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn executor(&self) -> &Arc<ReplayExecutor> {
        &self.executor
    }

    fn current_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop the batches currently running.
    ///
    /// A pending inter-request delay is cut short and no further request is
    /// started; a call already in flight still runs to completion. Batches
    /// started afterwards are unaffected.
    pub fn cancel(&self) {
        let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
    }

    /// Replay `requests` in order against one target.
    ///
    /// Returns one result per attempt. With `continue_on_error` off the batch
    /// stops right after the first failed attempt. Fails up front, before any
    /// call, when the target itself cannot be resolved.
    pub async fn replay_multiple(
        &self,
        requests: &[CapturedRequest],
        target: &ReplayTarget,
        options: &SequenceOptions,
    ) -> Result<Vec<ReplayResult>, ReplayError> {
        self.executor.check_target(target)?;

        let token = self.current_token();
        let delay = Duration::from_millis(options.delay_ms);
        let mut results = Vec::with_capacity(requests.len());

        log::info!(
            "Replaying {} request(s) against {} (continue_on_error={}, delay={}ms)",
            requests.len(),
            target,
            options.continue_on_error,
            options.delay_ms
        );

        for (idx, captured) in requests.iter().enumerate() {
            if idx > 0 {
                if token.is_cancelled() {
                    log::info!("Sequence cancelled after {} replay(s)", results.len());
                    break;
                }
                if !delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            log::info!("Sequence cancelled during delay after {} replay(s)", results.len());
                            break;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }

            let config = ReplayConfig::new(captured.clone(), target.clone());
            let result = match self.executor.replay(&config).await {
                Ok(result) => result,
                // The target was checked above, so only this request's URL is at fault
                Err(e) => self.executor.reject(&config, &e),
            };

            let failed = !result.success;
            results.push(result);

            if failed && !options.continue_on_error {
                log::warn!(
                    "Stopping sequence at request {} of {}: replay failed",
                    idx + 1,
                    requests.len()
                );
                break;
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::executor::tests::{captured, FakeCaller};
    use crate::replay::history::ReplayHistoryStore;

    fn sequencer(caller: Arc<FakeCaller>) -> ReplaySequencer {
        let executor = ReplayExecutor::new(caller, Arc::new(ReplayHistoryStore::new()));
        ReplaySequencer::new(Arc::new(executor))
    }

    fn batch(n: usize) -> Vec<CapturedRequest> {
        (0..n)
            .map(|i| captured(&format!("c{}", i), &format!("https://api.example.com/step/{}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let caller = Arc::new(FakeCaller::default());
        let sequencer = sequencer(caller.clone());

        let results = sequencer
            .replay_multiple(&batch(3), &ReplayTarget::Original, &SequenceOptions::default())
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.capture_id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2"]);

        let urls: Vec<String> = caller.seen.lock().unwrap().iter().map(|r| r.url.clone()).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.example.com/step/0",
                "https://api.example.com/step/1",
                "https://api.example.com/step/2",
            ]
        );
        let history: Vec<String> = sequencer
            .executor()
            .history()
            .get_all()
            .into_iter()
            .map(|r| r.id)
            .collect();
        let returned: Vec<String> = results.into_iter().map(|r| r.id).collect();
        assert_eq!(history, returned);
    }

    #[tokio::test]
    async fn test_halts_on_error() {
        let caller = Arc::new(FakeCaller::failing_on(vec![1]));
        let sequencer = sequencer(caller.clone());
        let options = SequenceOptions {
            continue_on_error: false,
            delay_ms: 0,
        };

        let results = sequencer
            .replay_multiple(&batch(3), &ReplayTarget::Original, &options)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(caller.call_count(), 2);
    }

    #[tokio::test]
    async fn test_continues_on_error_by_default() {
        let caller = Arc::new(FakeCaller::failing_on(vec![1]));
        let sequencer = sequencer(caller.clone());

        let results = sequencer
            .replay_multiple(&batch(3), &ReplayTarget::Original, &SequenceOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.success).count(), 2);
        assert_eq!(caller.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_environment_fails_before_any_call() {
        let caller = Arc::new(FakeCaller::default());
        let sequencer = sequencer(caller.clone());

        let err = sequencer
            .replay_multiple(
                &batch(2),
                &ReplayTarget::NamedEnvironment("prod".into()),
                &SequenceOptions::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ReplayError::UnknownEnvironment("prod".into()));
        assert_eq!(caller.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_requests() {
        let caller = Arc::new(FakeCaller::default());
        let sequencer = sequencer(caller);
        let options = SequenceOptions {
            continue_on_error: true,
            delay_ms: 500,
        };

        let started = tokio::time::Instant::now();
        let results = sequencer
            .replay_multiple(&batch(3), &ReplayTarget::Original, &options)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        // Two gaps for three requests
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_delay() {
        let caller = Arc::new(FakeCaller::default());
        let sequencer = Arc::new(sequencer(caller.clone()));
        let options = SequenceOptions {
            continue_on_error: true,
            delay_ms: 60_000,
        };

        let runner = {
            let sequencer = Arc::clone(&sequencer);
            tokio::spawn(async move {
                sequencer
                    .replay_multiple(&batch(3), &ReplayTarget::Original, &options)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        sequencer.cancel();

        let results = runner.await.unwrap().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(caller.call_count(), 1);

        // A fresh batch is not affected by the earlier cancel
        let results = sequencer
            .replay_multiple(&batch(1), &ReplayTarget::Original, &SequenceOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_unresolvable_capture_is_recorded_as_failure() {
        let caller = Arc::new(FakeCaller::default());
        let executor = ReplayExecutor::new(caller.clone(), Arc::new(ReplayHistoryStore::new()))
            .with_environments(std::collections::HashMap::from([(
                "staging".to_string(),
                crate::replay::model::EnvironmentConfig::new("https://staging.example.com"),
            )]));
        let sequencer = ReplaySequencer::new(Arc::new(executor));

        let mut requests = batch(2);
        requests[0].url = "not-a-url".into();

        let results = sequencer
            .replay_multiple(
                &requests,
                &ReplayTarget::NamedEnvironment("staging".into()),
                &SequenceOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[0].error.as_ref().unwrap().contains("Invalid captured URL"));
        assert!(results[1].success);
        assert_eq!(caller.call_count(), 1);
        assert_eq!(sequencer.executor().history().len(), 2);
    }
}
