//! Fire-and-forget execution of decision cycles.

use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::alert::ResourceIdentity;
use crate::breaker::engine::{BreakerError, CycleOutcome};
use crate::breaker::Breaker;
use crate::observability::metrics;

/// Run one cycle in the background.
///
/// The cycle runs in its own task, watched by a supervisor task that logs
/// panics. The caller may drop the returned handle; the outcome only ever
/// reaches the logs and metrics.
pub fn spawn_cycle(
    breaker: Arc<dyn Breaker>,
    target: ResourceIdentity,
    cycle_id: Uuid,
) -> JoinHandle<()> {
    let span = tracing::info_span!(
        "breaker_cycle",
        cycle_id = %cycle_id,
        profile = %target.profile_name,
        resource_group = %target.resource_group,
    );

    let cycle = tokio::spawn(
        async move {
            tracing::debug!("Entered decision cycle");
            let started = Instant::now();
            let result = breaker.run_cycle(target).await;
            report(&result);
            metrics::record_cycle(result_label(&result), started);
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Finished decision cycle"
            );
        }
        .instrument(span.clone()),
    );

    tokio::spawn(
        async move {
            if let Err(e) = cycle.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "Decision cycle panicked");
                    metrics::record_cycle_panic();
                } else {
                    tracing::warn!(error = %e, "Decision cycle was cancelled");
                }
            }
        }
        .instrument(span),
    )
}

fn report(result: &Result<CycleOutcome, BreakerError>) {
    match result {
        Ok(CycleOutcome::Skipped(reason)) => {
            tracing::warn!(reason = %reason, "Breaker will not trip");
        }
        Ok(CycleOutcome::Completed { disabled, primary }) => match primary {
            Some(primary) => tracing::info!(
                primary = %primary,
                disabled = ?disabled,
                "Found an online and currently highest priority endpoint; stopped disabling endpoints"
            ),
            None => tracing::warn!(
                disabled = ?disabled,
                "Reached the end of the endpoint list without an online endpoint"
            ),
        },
        Err(BreakerError::Disable { endpoint, disabled, source }) => {
            tracing::error!(
                endpoint = %endpoint,
                already_disabled = ?disabled,
                code = source.code().unwrap_or("none"),
                error = %source,
                "Failed to disable endpoint"
            );
        }
        Err(e) => {
            tracing::error!(code = e.code().unwrap_or("none"), error = %e, "Decision cycle failed");
        }
    }
}

fn result_label(result: &Result<CycleOutcome, BreakerError>) -> &'static str {
    match result {
        Ok(CycleOutcome::Skipped(reason)) => reason.label(),
        Ok(CycleOutcome::Completed { disabled, .. }) if disabled.is_empty() => "no_change",
        Ok(CycleOutcome::Completed { .. }) => "tripped",
        Err(e) => e.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::SkipReason;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct ChannelBreaker {
        tx: mpsc::UnboundedSender<ResourceIdentity>,
        panic: bool,
    }

    #[async_trait]
    impl Breaker for ChannelBreaker {
        async fn run_cycle(&self, target: ResourceIdentity) -> Result<CycleOutcome, BreakerError> {
            if self.panic {
                panic!("boom");
            }
            let _ = self.tx.send(target);
            Ok(CycleOutcome::Skipped(SkipReason::NoOnlineEndpoint))
        }
    }

    fn target() -> ResourceIdentity {
        "/subscriptions/SUB/resourcegroups/RG/providers/microsoft.network/trafficmanagerprofiles/NAME"
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_spawned_cycle_runs() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let breaker = Arc::new(ChannelBreaker { tx, panic: false });

        spawn_cycle(breaker, target(), Uuid::new_v4()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().profile_name, "NAME");
    }

    #[tokio::test]
    async fn test_panicking_cycle_is_contained() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let breaker = Arc::new(ChannelBreaker { tx, panic: true });

        // The supervisor absorbs the panic and completes normally.
        assert!(spawn_cycle(breaker, target(), Uuid::new_v4()).await.is_ok());
    }

    #[test]
    fn test_result_labels() {
        let tripped: Result<CycleOutcome, BreakerError> = Ok(CycleOutcome::Completed {
            disabled: vec!["a".into()],
            primary: Some("b".into()),
        });
        assert_eq!(result_label(&tripped), "tripped");

        let unchanged: Result<CycleOutcome, BreakerError> = Ok(CycleOutcome::Completed {
            disabled: Vec::new(),
            primary: Some("b".into()),
        });
        assert_eq!(result_label(&unchanged), "no_change");

        let timed_out: Result<CycleOutcome, BreakerError> =
            Err(BreakerError::Timeout(std::time::Duration::from_secs(1)));
        assert_eq!(result_label(&timed_out), "timeout");
    }
}
