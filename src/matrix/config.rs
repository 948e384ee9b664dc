//! Configuration and system parameters for batched CSR routines
//!
//! Only the config-taking routines (sampling, top-k) honor these settings.
//! Queries, slicing and sorting run on the ambient rayon pool with the fixed
//! thresholds in [`crate::constants`].

use tracing::warn;

use crate::constants::DEFAULT_PARALLEL_ROW_THRESHOLD;

/// System parameters for performance tuning
#[derive(Debug, Clone)]
pub struct SystemParameters {
    /// Size of the rayon pool used by [`CsrConfig::install`]
    pub n_threads: usize,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            n_threads: num_cpus::get(), // Use all available cores
        }
    }
}

/// Configuration for per-row batched routines (sampling, top-k)
#[derive(Debug, Clone)]
pub struct CsrConfig {
    /// System parameters for performance tuning
    pub system_params: SystemParameters,

    /// Minimum number of requested rows before work is spread over rayon
    pub parallel_threshold: usize,

    /// Seed for row-wise sampling
    /// If None, a fresh seed is drawn per call
    pub seed: Option<u64>,
}

impl Default for CsrConfig {
    fn default() -> Self {
        Self {
            system_params: SystemParameters::default(),
            parallel_threshold: DEFAULT_PARALLEL_ROW_THRESHOLD,
            seed: None,
        }
    }
}

impl CsrConfig {
    /// Create a config that never runs in parallel
    pub fn sequential() -> Self {
        Self {
            system_params: SystemParameters { n_threads: 1 },
            parallel_threshold: usize::MAX,
            seed: None,
        }
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of rows at which work goes parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Set the number of worker threads
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.system_params.n_threads = n_threads;
        self
    }

    /// Run `op` on a rayon pool with `n_threads` workers
    ///
    /// The ambient pool is reused when it already has that size. With a
    /// single thread `op` runs on the caller.
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        let n_threads = self.system_params.n_threads;
        if n_threads <= 1 || n_threads == rayon::current_num_threads() {
            return op();
        }
        match rayon::ThreadPoolBuilder::new().num_threads(n_threads).build() {
            Ok(pool) => pool.install(op),
            Err(err) => {
                warn!(%err, n_threads, "failed to build thread pool, using the ambient one");
                op()
            }
        }
    }

    /// Whether a batch of `n_rows` rows should run on the thread pool
    pub fn use_parallel(&self, n_rows: usize) -> bool {
        self.system_params.n_threads > 1 && n_rows >= self.parallel_threshold
    }
}
