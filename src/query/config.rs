//! Query engine configuration.

/// Default collection size from which evaluators are applied in parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Number of partitions handed to the rayon pool when applying an evaluator
    pub workers: usize,
    /// Minimum number of records before the collection is partitioned
    pub parallel_threshold: usize,
}

impl QueryConfig {
    /// Configuration that always applies evaluators on the calling thread
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            parallel_threshold: usize::MAX,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Number of partitions to split `len` records into; 1 means sequential
    pub fn partitions_for(&self, len: usize) -> usize {
        if self.workers <= 1 || len < self.parallel_threshold || len < 2 {
            1
        } else {
            self.workers.min(len)
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            workers: rayon::current_num_threads().max(1),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_never_partitions() {
        let config = QueryConfig::sequential();
        assert_eq!(config.partitions_for(0), 1);
        assert_eq!(config.partitions_for(10_000_000), 1);
    }

    #[test]
    fn test_partitions_respect_threshold() {
        let config = QueryConfig::sequential()
            .with_workers(4)
            .with_parallel_threshold(100);
        assert_eq!(config.partitions_for(99), 1);
        assert_eq!(config.partitions_for(100), 4);
        assert_eq!(config.partitions_for(1_000), 4);
    }

    #[test]
    fn test_partitions_capped_by_len() {
        let config = QueryConfig::sequential()
            .with_workers(8)
            .with_parallel_threshold(0);
        assert_eq!(config.partitions_for(3), 3);
        assert_eq!(config.partitions_for(1), 1);
    }

    #[test]
    fn test_zero_workers_clamped() {
        let config = QueryConfig::default().with_workers(0);
        assert_eq!(config.workers, 1);
        assert!(QueryConfig::default().workers >= 1);
    }
}
