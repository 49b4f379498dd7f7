// tests/change_detection.rs

mod common;
use crate::common::{epoch_plus, Fixture};

use std::time::SystemTime;

use lesswatch::compile::{needs_compile, CompileTarget};
use proptest::prelude::*;

const NEVER_FAILED: SystemTime = SystemTime::UNIX_EPOCH;

#[test]
fn missing_output_always_compiles() {
    assert!(needs_compile(epoch_plus(10), None, false, NEVER_FAILED));
    // Even when the source has not changed since the last failure.
    assert!(needs_compile(epoch_plus(10), None, false, epoch_plus(10)));
}

#[test]
fn stale_output_compiles() {
    assert!(needs_compile(
        epoch_plus(20),
        Some(epoch_plus(10)),
        false,
        NEVER_FAILED
    ));
}

#[test]
fn up_to_date_output_is_bypassed() {
    assert!(!needs_compile(
        epoch_plus(10),
        Some(epoch_plus(10)),
        false,
        NEVER_FAILED
    ));
    assert!(!needs_compile(
        epoch_plus(10),
        Some(epoch_plus(30)),
        false,
        NEVER_FAILED
    ));
}

#[test]
fn force_compiles_up_to_date_output() {
    assert!(needs_compile(
        epoch_plus(10),
        Some(epoch_plus(30)),
        true,
        NEVER_FAILED
    ));
}

#[test]
fn unchanged_source_after_failure_is_not_retried_even_when_forced() {
    let src = epoch_plus(20);
    assert!(!needs_compile(src, Some(epoch_plus(10)), false, src));
    assert!(!needs_compile(src, Some(epoch_plus(10)), true, src));

    // Touching the source past the failure re-enables compilation.
    assert!(needs_compile(epoch_plus(21), Some(epoch_plus(10)), false, src));
}

#[test]
fn probe_reports_missing_and_existing_outputs() {
    let fx = Fixture::new();

    let missing = CompileTarget::probe(fx.out.join("nope.css")).unwrap();
    assert!(!missing.exists());
    assert_eq!(missing.modified, None);

    let path = fx.output("main.css", "a{}", 42);
    let present = CompileTarget::probe(&path).unwrap();
    assert!(present.exists());
    assert_eq!(present.modified, Some(epoch_plus(42)));
    assert_eq!(present.path(), path.as_path());
}

fn time() -> impl Strategy<Value = SystemTime> {
    (0u64..10_000).prop_map(epoch_plus)
}

proptest! {
    #[test]
    fn up_to_date_outputs_are_never_recompiled(
        src in time(),
        extra in 0u64..10_000,
        last_failure in time(),
    ) {
        let out = src + std::time::Duration::from_secs(extra);
        prop_assert!(!needs_compile(src, Some(out), false, last_failure));
    }

    #[test]
    fn missing_output_compiles_regardless_of_other_inputs(
        src in time(),
        force in any::<bool>(),
        last_failure in time(),
    ) {
        prop_assert!(needs_compile(src, None, force, last_failure));
    }

    #[test]
    fn failure_guard_suppresses_existing_outputs(
        src in time(),
        out in time(),
        force in any::<bool>(),
        after in 0u64..10_000,
    ) {
        let last_failure = src + std::time::Duration::from_secs(after);
        prop_assert!(!needs_compile(src, Some(out), force, last_failure));
    }

    #[test]
    fn force_compiles_whenever_source_changed_since_failure(
        src in time(),
        out in time(),
        before in 1u64..10_000,
    ) {
        let last_failure = src - std::time::Duration::from_secs(before);
        prop_assert!(needs_compile(src, Some(out), true, last_failure));
    }
}
