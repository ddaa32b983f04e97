use crate::config::Config;
use crate::error::GarageResult;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Tuning for a bounded poll
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Attempts before giving up
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each round
    pub initial_interval: Duration,
    /// Ceiling for the backed-off delay
    pub max_interval: Duration,
}

impl PollOptions {
    pub fn from_config(config: &Config) -> Self {
        let initial = Duration::from_secs(config.poll_interval_secs);
        Self {
            max_attempts: config.poll_max_attempts,
            initial_interval: initial,
            max_interval: initial * 8,
        }
    }
}

/// How a poll ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The condition was met
    Ready(T),
    /// The attempt budget ran out before the condition was met
    Exhausted,
    /// The token was cancelled while waiting
    Cancelled,
}

/// Poll `check` until it yields a value, the attempt budget runs out, or
/// the token is cancelled. Errors from `check` abort the poll; the delay
/// between attempts doubles up to the configured ceiling.
pub async fn poll_until<T, F, Fut>(
    options: &PollOptions,
    token: &CancellationToken,
    mut check: F,
) -> GarageResult<PollOutcome<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = GarageResult<Option<T>>>,
{
    let mut interval = options.initial_interval;

    for attempt in 0..options.max_attempts {
        if token.is_cancelled() {
            return Ok(PollOutcome::Cancelled);
        }

        if let Some(value) = check(attempt).await? {
            return Ok(PollOutcome::Ready(value));
        }

        if attempt + 1 == options.max_attempts {
            break;
        }

        debug!(
            "Poll attempt {} of {} not ready, waiting {:?}",
            attempt + 1,
            options.max_attempts,
            interval
        );
        tokio::select! {
            _ = token.cancelled() => return Ok(PollOutcome::Cancelled),
            _ = sleep(interval) => {}
        }
        interval = (interval * 2).min(options.max_interval);
    }

    Ok(PollOutcome::Exhausted)
}

/// A spawned poll with its cancellation handle. Dropping the task does not
/// cancel the poll; call `cancel` or let it run out of attempts.
pub struct PollTask<T> {
    token: CancellationToken,
    task: JoinHandle<GarageResult<PollOutcome<T>>>,
}

impl<T: Send + 'static> PollTask<T> {
    /// Spawn the poll as a background task under a child of `parent`
    pub fn spawn<F, Fut>(options: PollOptions, parent: &CancellationToken, mut check: F) -> Self
    where
        F: FnMut(u32) -> Fut + Send + 'static,
        Fut: Future<Output = GarageResult<Option<T>>> + Send,
    {
        let token = parent.child_token();
        let task_token = token.clone();
        let task = tokio::spawn(async move {
            poll_until(&options, &task_token, move |attempt| check(attempt)).await
        });
        Self { token, task }
    }

    /// Stop the poll at the next suspension point
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the poll to finish
    pub async fn join(self) -> GarageResult<PollOutcome<T>> {
        self.task
            .await
            .map_err(|e| crate::error::Error::Other(format!("Poll task panicked: {}", e)))?
    }
}
