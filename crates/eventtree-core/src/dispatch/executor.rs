use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use log::{error, warn};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use crate::config::{DispatchConfig, ExecutorKind};

/// One asynchronous delivery, owning its event
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where asynchronous deliveries run
///
/// Submission is fire-and-forget: the publisher never joins the job.
pub trait AsyncExecutor: Send + Sync + fmt::Debug {
    fn submit(&self, job: Job);
}

/// One detached OS thread per delivery
#[derive(Debug, Default)]
pub struct ThreadExecutor {
    spawned: AtomicU64,
}

impl ThreadExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AsyncExecutor for ThreadExecutor {
    fn submit(&self, job: Job) {
        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        let builder = thread::Builder::new().name(format!("eventtree-async-{n}"));
        if let Err(e) = builder.spawn(job) {
            error!("Failed to spawn delivery thread: {}", e);
        }
    }
}

/// Deliveries on a tokio runtime
///
/// Handlers are blocking calls, so each job runs on the blocking pool. An
/// optional semaphore caps how many deliveries are in flight; jobs beyond the
/// cap wait for a permit.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
    permits: Option<Arc<Semaphore>>,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle, permits: None }
    }

    /// Executor on the runtime of the calling context, if any
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.permits = Some(Arc::new(Semaphore::new(max.max(1))));
        self
    }

    /// Free delivery slots, `None` when unbounded
    pub fn available_permits(&self) -> Option<usize> {
        self.permits.as_ref().map(|s| s.available_permits())
    }
}

impl AsyncExecutor for TokioExecutor {
    fn submit(&self, job: Job) {
        let permits = self.permits.clone();
        self.handle.spawn(async move {
            let _permit = match permits {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        warn!("Delivery semaphore closed, dropping asynchronous event");
                        return;
                    }
                },
                None => None,
            };
            if let Err(e) = tokio::task::spawn_blocking(job).await {
                error!("Asynchronous delivery task failed: {}", e);
            }
        });
    }
}

/// Tokio when called inside a runtime, threads otherwise
pub fn default_executor() -> Arc<dyn AsyncExecutor> {
    match TokioExecutor::current() {
        Some(executor) => Arc::new(executor),
        None => Arc::new(ThreadExecutor::new()),
    }
}

/// Build the executor a configuration asks for
pub fn executor_from_config(config: &DispatchConfig) -> Arc<dyn AsyncExecutor> {
    let tokio = match config.executor {
        ExecutorKind::Thread => None,
        ExecutorKind::Auto => TokioExecutor::current(),
        ExecutorKind::Tokio => {
            let current = TokioExecutor::current();
            if current.is_none() {
                warn!("Tokio executor requested outside a runtime, falling back to threads");
            }
            current
        }
    };

    match (tokio, config.max_in_flight) {
        (Some(executor), Some(max)) => Arc::new(executor.with_max_in_flight(max)),
        (Some(executor), None) => Arc::new(executor),
        (None, max) => {
            if max.is_some() {
                warn!("max_in_flight only applies to the tokio executor; thread deliveries are unbounded");
            }
            Arc::new(ThreadExecutor::new())
        }
    }
}
