//! Deadline-bounded polling against a flaky environment.
//!
//! Each attempt yields a [`LocateOutcome`]. `AttemptError` is treated
//! exactly like `NotFound`: logged and retried. Only the deadline (or a
//! cancelled token) ends an unsuccessful poll.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Pause between two attempts.
pub const DEFAULT_ATTEMPT_GAP: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome<T> {
    Found(T),
    NotFound,
    AttemptError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollReport<T> {
    pub found: Option<T>,
    pub attempts: u32,
    /// The token fired before a match or the deadline.
    pub cancelled: bool,
}

/// Call `locate` until it finds something or `wait` has elapsed.
///
/// The deadline is fixed before the first attempt. `locate` receives the
/// 1-based attempt number.
pub async fn poll_until_found<T, F, Fut>(
    wait: Duration,
    gap: Duration,
    cancel: &CancellationToken,
    mut locate: F,
) -> PollReport<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = LocateOutcome<T>>,
{
    let deadline = Instant::now() + wait;
    let mut attempts = 0;

    while Instant::now() < deadline {
        if cancel.is_cancelled() {
            return PollReport {
                found: None,
                attempts,
                cancelled: true,
            };
        }

        attempts += 1;
        match locate(attempts).await {
            LocateOutcome::Found(value) => {
                return PollReport {
                    found: Some(value),
                    attempts,
                    cancelled: false,
                };
            }
            LocateOutcome::NotFound => {}
            LocateOutcome::AttemptError(message) => {
                debug!(attempt = attempts, "locate attempt failed: {message}");
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return PollReport {
                    found: None,
                    attempts,
                    cancelled: true,
                };
            }
            _ = tokio::time::sleep(gap) => {}
        }
    }

    PollReport {
        found: None,
        attempts,
        cancelled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn test_returns_on_nth_attempt() {
        let calls = Cell::new(0);
        let cancel = CancellationToken::new();

        let report = poll_until_found(
            Duration::from_secs(3600),
            Duration::ZERO,
            &cancel,
            |attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt == 4 {
                        LocateOutcome::Found((7, 9))
                    } else {
                        LocateOutcome::NotFound
                    }
                }
            },
        )
        .await;

        assert_eq!(report.found, Some((7, 9)));
        assert_eq!(report.attempts, 4);
        assert_eq!(calls.get(), 4);
        assert!(!report.cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_deadline() {
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let report: PollReport<()> = poll_until_found(
            Duration::from_secs(1),
            Duration::from_millis(200),
            &cancel,
            |_| async { LocateOutcome::NotFound },
        )
        .await;

        let elapsed = started.elapsed();
        assert_eq!(report.found, None);
        assert_eq!(report.attempts, 5);
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_errors_are_retried() {
        let cancel = CancellationToken::new();

        let report = poll_until_found(
            Duration::from_secs(10),
            Duration::from_millis(100),
            &cancel,
            |attempt| async move {
                match attempt {
                    1 | 2 => LocateOutcome::AttemptError("screen grab failed".into()),
                    3 => LocateOutcome::NotFound,
                    _ => LocateOutcome::Found("here"),
                }
            },
        )
        .await;

        assert_eq!(report.found, Some("here"));
        assert_eq!(report.attempts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_wait_never_attempts() {
        let cancel = CancellationToken::new();
        let report: PollReport<()> =
            poll_until_found(Duration::ZERO, Duration::ZERO, &cancel, |_| async {
                LocateOutcome::Found(())
            })
            .await;

        assert_eq!(report.attempts, 0);
        assert_eq!(report.found, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let report: PollReport<()> = poll_until_found(
            Duration::from_secs(60),
            Duration::from_millis(500),
            &cancel,
            move |attempt| {
                if attempt == 2 {
                    trigger.cancel();
                }
                async { LocateOutcome::NotFound }
            },
        )
        .await;

        assert!(report.cancelled);
        assert_eq!(report.attempts, 2);
        assert_eq!(report.found, None);
    }
}
