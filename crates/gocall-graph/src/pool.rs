//! Worker pool selection.

use crate::error::GraphError;

/// Runs `work` on a dedicated pool of `threads` workers, or on rayon's
/// global pool when no count is given.
///
/// # Errors
///
/// Returns [`GraphError::WorkerPool`] when the dedicated pool cannot start.
pub(crate) fn run_in_pool<T, F>(threads: Option<usize>, work: F) -> Result<T, GraphError>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match threads {
        None => Ok(work()),
        Some(count) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(count)
                .thread_name(|index| format!("gocall-worker-{index}"))
                .build()
                .map_err(|error| GraphError::worker_pool(error.to_string()))?;
            Ok(pool.install(work))
        }
    }
}
