//! Parallel processing configuration
//!
//! Statistics run on Rayon's global thread pool; this module configures it.

use crate::errors::{ClimDiagError, Result};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    #[must_use]
    pub const fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Create a configuration that uses all available CPU cores
    #[must_use]
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    #[must_use]
    pub const fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global Rayon thread pool with the specified configuration
    ///
    /// # Errors
    ///
    /// Fails if the global pool was already initialised.
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    ClimDiagError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {num_threads} threads: {e}"
                    ))
                })?;
            log::debug!("Configured parallel processing with {num_threads} threads");
        } else {
            log::debug!(
                "Using default thread pool with {} threads",
                rayon::current_num_threads()
            );
        }
        Ok(())
    }

    /// Number of threads in the current pool
    #[must_use]
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}
