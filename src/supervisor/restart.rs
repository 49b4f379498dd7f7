// src/supervisor/restart.rs

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::errors::Result;

/// Runs a blocking run loop on its own thread and restarts it, after a
/// cooldown, every time it dies.
///
/// Each generation gets a fresh OS thread. The thread reports how it ended
/// through a oneshot channel; a panic drops the sender, which counts as a
/// death too. There is no retry ceiling.
#[derive(Debug, Clone)]
pub struct Supervisor {
    restart_interval: Duration,
}

impl Supervisor {
    pub fn new(restart_interval: Duration) -> Self {
        Self { restart_interval }
    }

    pub fn restart_interval(&self) -> Duration {
        self.restart_interval
    }

    /// Keep `run_loop` alive.
    ///
    /// Resolves with `Ok(())` when a generation returns `Ok(())` (e.g. there
    /// was nothing to watch). Only fails if a thread cannot be spawned.
    pub async fn supervise<F>(&self, run_loop: F) -> Result<()>
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        let run_loop = Arc::new(run_loop);
        let mut generation: u64 = 0;

        loop {
            generation += 1;
            let body = Arc::clone(&run_loop);
            let done_rx = spawn_run_loop(format!("lesswatch-run-{generation}"), move || body())?;

            info!(generation, "run loop started");

            match done_rx.await {
                Ok(Ok(())) => {
                    info!(generation, "run loop finished");
                    return Ok(());
                }
                Ok(Err(err)) => {
                    error!(generation, error = %err, "run loop is dead");
                }
                Err(_) => {
                    error!(generation, "run loop panicked");
                }
            }

            tokio::time::sleep(self.restart_interval).await;
            warn!(
                generation = generation + 1,
                "restarting run loop after {} ms",
                self.restart_interval.as_millis()
            );
        }
    }
}

/// Start `body` on a new named OS thread.
///
/// The returned receiver resolves with the body's result, or with a
/// `RecvError` if the thread panicked.
pub fn spawn_run_loop<F>(name: String, body: F) -> Result<oneshot::Receiver<Result<()>>>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let (done_tx, done_rx) = oneshot::channel();
    thread::Builder::new().name(name).spawn(move || {
        let _ = done_tx.send(body());
    })?;
    Ok(done_rx)
}
