//! Parallel processing configuration for the cell assembly stage.

use serde::{Deserialize, Serialize};

/// Controls how cell text assembly is distributed across worker threads.
///
/// Assembly is the only stage of the pipeline that parallelizes: each cell's
/// crop→detect→recognize sequence is independent, so cells are spread over a
/// bounded pool. Small grids stay on the calling thread because the pool
/// handoff costs more than it saves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of worker threads for cell assembly.
    /// If None, rayon's default pool size is used (typically the core count).
    /// Default: None
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Minimum number of cells before assembly goes parallel (fewer than
    /// this runs sequentially on the caller's thread).
    /// Default: 4
    #[serde(default = "ParallelPolicy::default_min_cells_for_parallel")]
    pub min_cells_for_parallel: usize,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of worker threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the minimum cell count before assembly goes parallel.
    pub fn with_min_cells_for_parallel(mut self, threshold: usize) -> Self {
        self.min_cells_for_parallel = threshold;
        self
    }

    /// Build an owned rayon thread pool sized by this policy.
    ///
    /// The pool is owned by the extractor that built it, never installed
    /// globally, so two extractors with different policies can coexist in
    /// one process. Returns `None` when `max_threads` is `None`, in which
    /// case callers fall back to rayon's shared default pool.
    pub fn build_thread_pool(&self) -> Result<Option<rayon::ThreadPool>, rayon::ThreadPoolBuildError> {
        match self.max_threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()?;
                Ok(Some(pool))
            }
            None => Ok(None),
        }
    }

    /// Whether a grid of `cell_count` cells should be assembled in parallel.
    pub fn should_parallelize(&self, cell_count: usize) -> bool {
        cell_count >= self.min_cells_for_parallel
    }

    /// Default minimum cell count for parallel assembly.
    fn default_min_cells_for_parallel() -> usize {
        4
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            min_cells_for_parallel: Self::default_min_cells_for_parallel(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = ParallelPolicy::default();
        assert_eq!(policy.max_threads, None);
        assert_eq!(policy.min_cells_for_parallel, 4);
    }

    #[test]
    fn test_builder_methods() {
        let policy = ParallelPolicy::new()
            .with_max_threads(Some(2))
            .with_min_cells_for_parallel(16);
        assert_eq!(policy.max_threads, Some(2));
        assert_eq!(policy.min_cells_for_parallel, 16);
    }

    #[test]
    fn test_should_parallelize_threshold() {
        let policy = ParallelPolicy::default();
        assert!(!policy.should_parallelize(3));
        assert!(policy.should_parallelize(4));
        assert!(policy.should_parallelize(100));
    }

    #[test]
    fn test_build_thread_pool_none_without_max_threads() {
        let policy = ParallelPolicy::default();
        let pool = policy.build_thread_pool().expect("build should succeed");
        assert!(pool.is_none());
    }

    #[test]
    fn test_build_thread_pool_bounded() {
        let policy = ParallelPolicy::new().with_max_threads(Some(2));
        let pool = policy
            .build_thread_pool()
            .expect("build should succeed")
            .expect("pool should exist");
        assert_eq!(pool.current_num_threads(), 2);
    }
}
