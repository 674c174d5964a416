//! Cascade engine
//!
//! Drives a [`CascadeRun`] against the shared store until it converges or
//! the wall-clock bound runs out.

use crate::config::CascadeConfig;
use crate::error::{CascadeError, CascadeResult};
use crate::machine::{CascadeRun, StepOutcome};
use crate::path::CascadePath;
use std::sync::Arc;
use tokio::time::{sleep, timeout_at, Instant};
use treeline_tree::{NodeId, TreeStore};

/// Idempotent path resolver
///
/// Holds no per-call state; every call builds its own [`CascadeRun`], so
/// one engine can serve any number of concurrent callers. It does not
/// serialize those callers: two calls racing on the same missing path can
/// each create it.
#[derive(Clone)]
pub struct CascadeEngine {
    store: Arc<dyn TreeStore>,
    config: CascadeConfig,
}

impl CascadeEngine {
    /// Create engine over a store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn TreeStore>, config: CascadeConfig) -> Self {
        Self { store, config }
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Ensure `segments` exists as a path and return the leaf id
    ///
    /// # Errors
    /// - `CascadeError::InvalidPath` for an empty path or blank segment
    /// - `CascadeError::Timeout` if the path did not converge in time
    pub async fn cascade<I, S>(&self, segments: I) -> CascadeResult<NodeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = CascadePath::from_segments(segments)?;
        self.cascade_to_path(&path).await
    }

    /// Ensure `path` exists and return the leaf id
    ///
    /// Store errors inside the loop are logged and retried. A second call
    /// with the same path and no interference issues no writes.
    ///
    /// # Errors
    /// `CascadeError::Timeout` (with the last claim) if no pass from root to
    /// leaf completes before the configured timeout
    pub async fn cascade_to_path(&self, path: &CascadePath) -> CascadeResult<NodeId> {
        let started = Instant::now();
        let deadline = started + self.config.timeout;
        let mut run = CascadeRun::new(self.store.as_ref(), path);

        loop {
            if Instant::now() >= deadline {
                return Err(Self::timed_out(&run, started, path));
            }

            match timeout_at(deadline, run.step()).await {
                Err(_) => return Err(Self::timed_out(&run, started, path)),
                Ok(Ok(StepOutcome::Converged(id))) => {
                    tracing::info!(
                        %path,
                        %id,
                        passes = run.passes(),
                        creates = run.creates(),
                        "cascade converged"
                    );
                    return Ok(id);
                }
                Ok(Ok(StepOutcome::Advanced)) => {}
                Ok(Ok(StepOutcome::Pending)) => {
                    tracing::debug!(%path, passes = run.passes(), "cascade pending, retrying from root");
                    sleep(self.config.retry_interval).await;
                }
                Ok(Err(e)) => {
                    tracing::warn!(%path, error = %e, "store error during cascade, retrying");
                    run.restart();
                    sleep(self.config.retry_interval).await;
                }
            }
        }
    }

    fn timed_out(run: &CascadeRun<'_>, started: Instant, path: &CascadePath) -> CascadeError {
        let elapsed = started.elapsed();
        let last_claim = run.last_claim().cloned();
        tracing::error!(
            %path,
            ?elapsed,
            passes = run.passes(),
            last_claim = ?last_claim,
            "cascade timed out"
        );
        CascadeError::Timeout {
            elapsed,
            passes: run.passes(),
            last_claim,
        }
    }
}

impl std::fmt::Debug for CascadeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
