//! Execution contexts
//!
//! A [`StandardContext`] plays the role of one device: kernels launched on it
//! run as a grid of cooperative blocks on a `rayon` pool, and every launch has
//! returned by the time the host observes its results. A [`MultiContext`]
//! groups contexts and is shared by `Arc` among enactors; operators only
//! accept a single-context group.

use crate::EngineError;
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Launch geometry for a block-cooperative kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Number of blocks in the grid
    pub grid_dim: usize,
    /// Threads per block
    pub block_dim: usize,
}

impl LaunchConfig {
    /// One thread per work item, `block_dim` threads per block
    #[must_use]
    pub fn for_items(num_items: usize, block_dim: usize) -> Self {
        Self {
            grid_dim: num_items.div_ceil(block_dim.max(1)),
            block_dim,
        }
    }
}

/// Wall-clock timer bound to a context
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    started: Option<Instant>,
}

impl Timer {
    /// Start (or restart) timing
    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Elapsed time since `begin`; zero if never started
    #[must_use]
    pub fn end(&self) -> Duration {
        self.started.map_or(Duration::ZERO, |t| t.elapsed())
    }
}

/// A single execution context ("device")
#[derive(Debug)]
pub struct StandardContext {
    device_id: usize,
    pool: Option<rayon::ThreadPool>,
    launches: AtomicU64,
}

impl StandardContext {
    /// Context that runs kernels on the global rayon pool
    #[must_use]
    pub fn new(device_id: usize) -> Self {
        Self {
            device_id,
            pool: None,
            launches: AtomicU64::new(0),
        }
    }

    /// Context with a dedicated pool of `num_threads` workers
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ContextBuild` if the pool cannot be created
    pub fn with_threads(device_id: usize, num_threads: usize) -> Result<Self, EngineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(move |i| format!("trueno-frontier-{device_id}-{i}"))
            .build()
            .map_err(|e| EngineError::ContextBuild(e.to_string()))?;

        Ok(Self {
            device_id,
            pool: Some(pool),
            launches: AtomicU64::new(0),
        })
    }

    /// Device ordinal
    #[must_use]
    pub const fn device_id(&self) -> usize {
        self.device_id
    }

    /// Number of workers kernels are spread over
    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }

    /// New timer for this context
    #[must_use]
    pub const fn timer(&self) -> Timer {
        Timer { started: None }
    }

    /// Run a kernel body on this context's workers and wait for it
    pub fn launch<R, F>(&self, kernel: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.launches.fetch_add(1, Ordering::Relaxed);
        match &self.pool {
            Some(pool) => pool.install(kernel),
            None => kernel(),
        }
    }

    /// Host fence after a launch: all writes made by the launch are visible
    pub fn synchronize(&self) {
        fence(Ordering::SeqCst);
    }

    /// Number of kernels launched so far
    #[must_use]
    pub fn launch_count(&self) -> u64 {
        self.launches.load(Ordering::Relaxed)
    }
}

/// A group of execution contexts
#[derive(Debug)]
pub struct MultiContext {
    contexts: Vec<Arc<StandardContext>>,
}

impl MultiContext {
    /// Single context on device 0 (the supported configuration)
    #[must_use]
    pub fn single() -> Self {
        Self {
            contexts: vec![Arc::new(StandardContext::new(0))],
        }
    }

    /// One context per device ordinal
    #[must_use]
    pub fn new(devices: &[usize]) -> Self {
        Self {
            contexts: devices
                .iter()
                .map(|&id| Arc::new(StandardContext::new(id)))
                .collect(),
        }
    }

    /// Wrap an existing context
    #[must_use]
    pub fn from_context(context: StandardContext) -> Self {
        Self {
            contexts: vec![Arc::new(context)],
        }
    }

    /// Number of contexts
    #[must_use]
    pub fn size(&self) -> usize {
        self.contexts.len()
    }

    /// Context `index`
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ContextOutOfRange` for a bad index
    pub fn get_context(&self, index: usize) -> Result<&Arc<StandardContext>, EngineError> {
        self.contexts.get(index).ok_or(EngineError::ContextOutOfRange {
            index,
            size: self.contexts.len(),
        })
    }

    /// The only context, failing fast on anything but a single-context group
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MultiContext` unless `size() == 1`
    pub fn single_context(&self) -> Result<&Arc<StandardContext>, EngineError> {
        match self.contexts.as_slice() {
            [only] => Ok(only),
            _ => Err(EngineError::MultiContext(self.contexts.len())),
        }
    }
}

impl Default for MultiContext {
    fn default() -> Self {
        Self::single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_config_rounds_up() {
        assert_eq!(LaunchConfig::for_items(0, 128).grid_dim, 0);
        assert_eq!(LaunchConfig::for_items(1, 128).grid_dim, 1);
        assert_eq!(LaunchConfig::for_items(128, 128).grid_dim, 1);
        assert_eq!(LaunchConfig::for_items(129, 128).grid_dim, 2);
    }

    #[test]
    fn test_single_context() {
        let context = MultiContext::single();
        assert_eq!(context.size(), 1);
        assert_eq!(context.single_context().unwrap().device_id(), 0);
        assert!(context.get_context(1).is_err());
    }

    #[test]
    fn test_multi_context_fails_fast() {
        let context = MultiContext::new(&[0, 1]);
        assert_eq!(context.size(), 2);
        assert_eq!(
            context.single_context().unwrap_err(),
            EngineError::MultiContext(2)
        );
        assert_eq!(context.get_context(1).unwrap().device_id(), 1);
    }

    #[test]
    fn test_dedicated_pool_launch() {
        let context = StandardContext::with_threads(3, 2).unwrap();
        assert_eq!(context.num_threads(), 2);

        let sum: u64 = context.launch(|| {
            use rayon::prelude::*;
            (0..100_u64).into_par_iter().sum()
        });
        context.synchronize();

        assert_eq!(sum, 4950);
        assert_eq!(context.launch_count(), 1);
    }

    #[test]
    fn test_timer_measures_elapsed() {
        let context = StandardContext::new(0);
        let mut timer = context.timer();
        assert_eq!(timer.end(), Duration::ZERO);

        timer.begin();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.end() >= Duration::from_millis(2));
    }
}
