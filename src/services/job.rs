use std::future::Future;

use thiserror::Error;
use tracing::warn;

use crate::services::cancel::CancelToken;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("sync worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
pub struct JobCompletion<T> {
    pub value: T,
    pub interrupted: bool,
}

/// Runs blocking `work` on a background thread until it returns or
/// `interrupt` resolves.
///
/// On interrupt the token is cancelled and the worker is still awaited, so
/// whatever it built so far is handed back. Both paths end in a single
/// [`JobCompletion`].
///
/// Awaiting the worker has no deadline. A worker blocked in a rate-limit
/// wait returns only once that wait is over, which can take up to a full
/// limiter window.
pub async fn run_job<T, F, I>(
    work: F,
    cancel: CancelToken,
    interrupt: I,
) -> Result<JobCompletion<T>, JobError>
where
    T: Send + 'static,
    F: FnOnce(CancelToken) -> T + Send + 'static,
    I: Future<Output = ()>,
{
    let worker_token = cancel.clone();
    let mut handle = tokio::task::spawn_blocking(move || work(worker_token));

    tokio::select! {
        biased;

        res = &mut handle => Ok(JobCompletion {
            value: res?,
            interrupted: false,
        }),

        _ = interrupt => {
            warn!("interrupt received, finishing current component (a pending rate-limit wait delays this)");
            cancel.cancel();
            let value = handle.await?;
            Ok(JobCompletion {
                value,
                interrupted: true,
            })
        }
    }
}
