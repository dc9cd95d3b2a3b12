use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{IntoTrackerError, Operation, TrackerError};

/// Run one collaborator call under a time budget, abandoning it on cancellation.
pub(crate) async fn bounded<T, E, F>(
    cancel: &CancellationToken,
    operation: Operation,
    budget: Duration,
    call: F,
) -> Result<T, TrackerError>
where
    F: Future<Output = Result<T, E>>,
    E: IntoTrackerError,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(TrackerError::Cancelled { operation }),
        outcome = tokio::time::timeout(budget, call) => match outcome {
            Ok(result) => result.map_err(|err| err.into_tracker(operation)),
            Err(_) => Err(TrackerError::Timeout { operation, after: budget }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::StorageError;

    #[tokio::test]
    async fn passes_through_success() {
        let token = CancellationToken::new();
        let value = bounded(&token, Operation::SaveTasks, Duration::from_secs(1), async {
            Ok::<_, StorageError>(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_call_times_out() {
        let token = CancellationToken::new();
        let err = bounded(
            &token,
            Operation::FetchTrainer,
            Duration::from_millis(50),
            std::future::pending::<Result<(), StorageError>>(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Timeout {
                operation: Operation::FetchTrainer,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn cancelled_token_wins() {
        let token = CancellationToken::new();
        token.cancel();
        let err = bounded(&token, Operation::LoadProgress, Duration::from_secs(1), async {
            Ok::<_, StorageError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, TrackerError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn errors_carry_the_operation() {
        let token = CancellationToken::new();
        let err = bounded(&token, Operation::SaveStreak, Duration::from_secs(1), async {
            Err::<(), _>(StorageError::Conflict)
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Storage {
                operation: Operation::SaveStreak,
                source: StorageError::Conflict
            }
        ));
    }
}
