// tests/supervisor.rs

mod common;
use crate::common::{fake_compiler, init_tracing, with_timeout, FakeBackend, Fixture};

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use lesswatch::compile::BatchReport;
use lesswatch::errors::LesswatchError;
use lesswatch::supervisor::{spawn_poller, spawn_run_loop, Supervisor};
use lesswatch::watch::initial_pass;

const COOLDOWN: Duration = Duration::from_millis(40);

#[tokio::test]
async fn restarts_after_each_failure_with_cooldown() {
    init_tracing();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    let supervisor = Supervisor::new(COOLDOWN);
    let started = Instant::now();

    with_timeout(supervisor.supervise(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= 3 {
            Err(LesswatchError::WatchClosed)
        } else {
            Ok(())
        }
    }))
    .await
    .unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert!(
        started.elapsed() >= COOLDOWN * 3,
        "expected three cooldowns, took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn restarted_session_does_not_force_again() {
    init_tracing();
    let fx = Fixture::new();
    fx.source("a.less", "", 10);
    fx.output("a.css", "", 20);

    let cfg = fx.config().force(true).build();
    let backend = FakeBackend::new();
    let compiler = fake_compiler(&cfg, &backend);
    let files = vec!["a.less".to_string()];

    let compiled = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&compiled);

    let supervisor = Supervisor::new(COOLDOWN);
    with_timeout(supervisor.supervise(move || {
        let report = initial_pass(&cfg, &compiler, &files)?;
        let mut seen = seen.lock().unwrap();
        seen.push(report.compiled_count());
        if seen.len() == 1 {
            Err(LesswatchError::WatchClosed)
        } else {
            Ok(())
        }
    }))
    .await
    .unwrap();

    // Up-to-date output: only the first generation's forced pass compiles.
    assert_eq!(*compiled.lock().unwrap(), vec![1, 0]);
    assert_eq!(backend.call_count(), 1);
}

#[test]
fn initial_force_is_granted_once_per_compiler() {
    let fx = Fixture::new();
    let compiler = fake_compiler(&fx.config().build(), &FakeBackend::new());

    assert!(compiler.claim_initial_force(true));
    assert!(!compiler.claim_initial_force(true));
    assert!(!compiler.claim_initial_force(false));
    assert!(compiler.run_state().initial_pass_done);
}

#[tokio::test]
async fn panicking_run_loop_is_restarted() {
    init_tracing();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    let supervisor = Supervisor::new(COOLDOWN);
    with_timeout(supervisor.supervise(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("watcher thread blew up");
        }
        Ok(())
    }))
    .await
    .unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn run_loop_reports_its_result_and_thread_name() {
    let done = spawn_run_loop("lesswatch-test".to_string(), || {
        assert_eq!(std::thread::current().name(), Some("lesswatch-test"));
        Err(LesswatchError::config("boom"))
    })
    .unwrap();

    let result = with_timeout(done).await.expect("sender dropped");
    assert!(matches!(result, Err(LesswatchError::ConfigError(msg)) if msg == "boom"));
}

#[tokio::test]
async fn poller_repeats_until_stopped() {
    init_tracing();
    let passes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&passes);

    let handle = spawn_poller(Duration::from_millis(20), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(BatchReport::default())
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    with_timeout(handle.stop()).await;

    let after_stop = passes.load(Ordering::SeqCst);
    assert!(after_stop >= 3, "only {after_stop} passes");

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(passes.load(Ordering::SeqCst), after_stop);
}

#[tokio::test]
async fn poller_keeps_going_after_a_failed_pass() {
    let passes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&passes);

    let handle = spawn_poller(Duration::from_millis(10), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(LesswatchError::config("source directory vanished"))
    });

    tokio::time::sleep(Duration::from_millis(80)).await;
    with_timeout(handle.stop()).await;

    assert!(passes.load(Ordering::SeqCst) >= 2);
}
