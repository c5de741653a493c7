/// Thread pool setup for rewriting many test units at once.
/// Each unit is rewritten independently, so the pool only bounds CPU use.

use anyhow::Result;
use tracing::info;

/// Initialize the global rayon thread pool.
/// Defaults to half the available cores, minimum 1 worker.
pub fn init_thread_pool(workers: Option<usize>) -> Result<usize> {
    let cores = num_cpus::get();
    let workers = workers.unwrap_or(cores / 2).max(1);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    info!(workers, cores, "initialized rewrite thread pool");
    Ok(workers)
}
