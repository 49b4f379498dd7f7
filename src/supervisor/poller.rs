// src/supervisor/poller.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::compile::BatchReport;
use crate::errors::Result;

/// Handle for a running poll loop. Dropping it leaves the loop running;
/// call [`PollerHandle::stop`] to end it.
#[derive(Debug)]
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PollerHandle {
    /// Ask the loop to stop and wait for it. A pass already in progress is
    /// allowed to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.join.await {
            warn!(error = %err, "poll loop ended abnormally");
        }
    }
}

/// Run `pass` now and then every `interval` until stopped.
///
/// Each pass runs on the blocking pool. A failed pass is logged and the
/// loop keeps going, as does a pass whose blocking task was cancelled or
/// panicked.
pub fn spawn_poller<F>(interval: Duration, pass: F) -> PollerHandle
where
    F: Fn() -> Result<BatchReport> + Send + Sync + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let pass = Arc::new(pass);

    let join = tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "poll loop started");

        loop {
            if *stop_rx.borrow() {
                break;
            }

            let body = Arc::clone(&pass);
            match tokio::task::spawn_blocking(move || body()).await {
                Ok(Ok(report)) => {
                    debug!(
                        compiled = report.compiled_count(),
                        failed = report.failed_count(),
                        "poll pass finished"
                    );
                }
                Ok(Err(err)) => error!(error = %err, "poll pass failed"),
                Err(err) => warn!(error = %err, "poll pass interrupted"),
            }

            tokio::select! {
                changed = stop_rx.changed() => match changed {
                    Ok(()) if *stop_rx.borrow() => break,
                    Ok(()) => {}
                    // Handle dropped without `stop`: keep polling.
                    Err(_) => tokio::time::sleep(interval).await,
                },
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!("poll loop stopped");
    });

    PollerHandle { stop_tx, join }
}
