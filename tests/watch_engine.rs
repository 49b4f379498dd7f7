// tests/watch_engine.rs

mod common;
use crate::common::{fake_compiler, init_tracing, FakeBackend, FakeDirWatcher, Fixture};

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;

use lesswatch::config::ConfigFile;
use lesswatch::errors::LesswatchError;
use lesswatch::types::CreatePolicy;
use lesswatch::watch::{
    coalesce, EventOutcome, FsEvent, FsEventKind, WatchEngine, WatchOptions,
};
use notify::event::{
    AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode,
};
use notify::{Event, EventKind};

fn engine(
    fx: &Fixture,
    cfg: &ConfigFile,
    backend: &FakeBackend,
    tracked: &[&str],
    options: WatchOptions,
) -> WatchEngine<FakeDirWatcher> {
    WatchEngine::new(
        &fx.src,
        tracked.iter().map(|s| s.to_string()),
        fake_compiler(cfg, backend),
        FakeDirWatcher::new(),
        options,
    )
}

fn event(kind: FsEventKind, path: PathBuf) -> FsEvent {
    FsEvent::new(kind, path)
}

#[test]
fn register_all_watches_every_directory() {
    let fx = Fixture::new();
    fx.source("a/b/c.less", "", 1);
    fx.source("d/e.less", "", 1);

    let backend = FakeBackend::new();
    let mut engine = engine(&fx, &fx.config().build(), &backend, &[], WatchOptions::default());
    assert_eq!(engine.source_dir(), fx.src.as_path());
    assert!(engine.registry().is_empty());

    assert_eq!(engine.register_all().unwrap(), 4);
    for dir in ["", "a", "a/b", "d"] {
        assert!(engine.registry().contains(&fx.src.join(dir)), "missing {dir}");
    }
    // Registering again adds nothing.
    assert_eq!(engine.register_all().unwrap(), 0);
}

#[test]
fn create_then_modify_compiles_exactly_twice() {
    init_tracing();
    let fx = Fixture::new();
    let path = fx.source("main.less", "", 1);

    let backend = FakeBackend::new();
    let mut engine = engine(
        &fx,
        &fx.config().build(),
        &backend,
        &["main.less"],
        WatchOptions::default(),
    );

    let created = engine.handle_event(&event(FsEventKind::Create, path.clone())).unwrap();
    assert_eq!(created, EventOutcome::Compiled("main.less".into()));
    assert_eq!(backend.call_count(), 1);

    let modified = engine.handle_event(&event(FsEventKind::Modify, path)).unwrap();
    assert_eq!(modified, EventOutcome::Compiled("main.less".into()));
    assert_eq!(backend.call_count(), 2);
}

#[test]
fn modify_compiles_even_when_output_looks_up_to_date() {
    let fx = Fixture::new();
    let path = fx.source("main.less", "", 1);
    fx.output("main.css", "", 100);

    let backend = FakeBackend::new();
    let mut engine = engine(
        &fx,
        &fx.config().build(),
        &backend,
        &["main.less"],
        WatchOptions::default(),
    );

    engine.handle_event(&event(FsEventKind::Modify, path)).unwrap();
    assert_eq!(backend.call_count(), 1);
}

#[test]
fn create_policy_if_output_missing_skips_existing_outputs() {
    let fx = Fixture::new();
    let existing = fx.source("old.less", "", 1);
    let fresh = fx.source("new.less", "", 1);
    fx.output("old.css", "", 100);

    let backend = FakeBackend::new();
    let options = WatchOptions {
        on_create: CreatePolicy::IfOutputMissing,
        ..WatchOptions::default()
    };
    let mut engine = engine(
        &fx,
        &fx.config().build(),
        &backend,
        &["old.less", "new.less"],
        options,
    );

    assert_eq!(
        engine.handle_event(&event(FsEventKind::Create, existing)).unwrap(),
        EventOutcome::Ignored
    );
    assert_eq!(
        engine.handle_event(&event(FsEventKind::Create, fresh)).unwrap(),
        EventOutcome::Compiled("new.less".into())
    );
    assert_eq!(backend.calls_for("new.less"), 1);
    assert_eq!(backend.call_count(), 1);
}

#[test]
fn delete_with_follow_delete_removes_the_output() {
    let fx = Fixture::new();
    let src = fx.source("main.less", "", 1);
    let out = fx.output("main-x.css", "", 2);
    fs::remove_file(&src).unwrap();

    let cfg = fx.config().output_file_format("{fileName}-x").build();
    let backend = FakeBackend::new();
    let options = WatchOptions {
        follow_delete: true,
        ..WatchOptions::default()
    };
    let mut engine = engine(&fx, &cfg, &backend, &["main.less"], options);

    assert_eq!(
        engine.handle_event(&event(FsEventKind::Delete, src.clone())).unwrap(),
        EventOutcome::DeletedOutput("main.less".into())
    );
    assert!(!out.exists());

    // Nothing left to delete the second time.
    assert_eq!(
        engine.handle_event(&event(FsEventKind::Delete, src)).unwrap(),
        EventOutcome::Ignored
    );
    assert_eq!(backend.call_count(), 0);
}

#[test]
fn delete_without_follow_delete_leaves_the_output() {
    let fx = Fixture::new();
    let src = fx.source("main.less", "", 1);
    let out = fx.output("main.css", "", 2);
    fs::remove_file(&src).unwrap();

    let backend = FakeBackend::new();
    let mut engine = engine(
        &fx,
        &fx.config().build(),
        &backend,
        &["main.less"],
        WatchOptions::default(),
    );

    assert_eq!(
        engine.handle_event(&event(FsEventKind::Delete, src)).unwrap(),
        EventOutcome::Ignored
    );
    assert!(out.exists());
}

#[test]
fn new_directory_tree_is_registered() {
    let fx = Fixture::new();
    let backend = FakeBackend::new();
    let mut engine = engine(&fx, &fx.config().build(), &backend, &[], WatchOptions::default());
    engine.register_all().unwrap();

    let new_dir = fx.src.join("added");
    fs::create_dir_all(new_dir.join("nested")).unwrap();

    assert_eq!(
        engine.handle_event(&event(FsEventKind::Create, new_dir.clone())).unwrap(),
        EventOutcome::WatchedDirectory(new_dir.clone())
    );
    assert!(engine.registry().contains(&new_dir));
    assert!(engine.registry().contains(&new_dir.join("nested")));
    assert_eq!(engine.registry().len(), 3);
    assert_eq!(backend.call_count(), 0);
}

#[test]
fn failing_directory_registration_is_fatal() {
    let fx = Fixture::new();
    let bad = fx.src.join("bad");
    fs::create_dir_all(&bad).unwrap();

    let backend = FakeBackend::new();
    let mut engine = WatchEngine::new(
        &fx.src,
        Vec::new(),
        fake_compiler(&fx.config().build(), &backend),
        FakeDirWatcher::failing_on(&bad),
        WatchOptions::default(),
    );

    let err = engine.handle_event(&event(FsEventKind::Create, bad.clone())).unwrap_err();
    match err {
        LesswatchError::WatchRegistration { path, .. } => assert_eq!(path, bad),
        other => panic!("expected WatchRegistration, got {other:?}"),
    }
}

#[test]
fn untracked_files_are_ignored() {
    let fx = Fixture::new();
    let partial = fx.source("_vars.less", "", 1);
    let outside = fx.root.join("elsewhere.less");
    fs::write(&outside, "").unwrap();

    let backend = FakeBackend::new();
    let mut engine = engine(
        &fx,
        &fx.config().build(),
        &backend,
        &["main.less"],
        WatchOptions::default(),
    );

    for path in [partial, outside] {
        assert_eq!(
            engine.handle_event(&event(FsEventKind::Modify, path)).unwrap(),
            EventOutcome::Ignored
        );
    }
    assert_eq!(backend.call_count(), 0);
}

#[test]
fn failed_compile_is_reported_but_not_fatal() {
    let fx = Fixture::new();
    let path = fx.source("broken.less", "", 1);

    let backend = FakeBackend::new();
    backend.break_file("broken.less");
    let mut engine = engine(
        &fx,
        &fx.config().build(),
        &backend,
        &["broken.less"],
        WatchOptions::default(),
    );

    assert_eq!(
        engine.handle_event(&event(FsEventKind::Modify, path)).unwrap(),
        EventOutcome::CompileFailed("broken.less".into())
    );
}

#[test]
fn drain_collapses_back_to_back_repeats() {
    let fx = Fixture::new();
    let a = fx.source("a.less", "", 1);
    let b = fx.source("b.less", "", 1);

    let backend = FakeBackend::new();
    let mut engine = engine(
        &fx,
        &fx.config().build(),
        &backend,
        &["a.less", "b.less"],
        WatchOptions::default(),
    );

    let outcomes = engine
        .drain(vec![
            event(FsEventKind::Modify, a.clone()),
            event(FsEventKind::Modify, a.clone()),
            event(FsEventKind::Modify, b),
            event(FsEventKind::Modify, a),
        ])
        .unwrap();

    assert_eq!(
        outcomes,
        vec![
            EventOutcome::Compiled("a.less".into()),
            EventOutcome::Compiled("b.less".into()),
            EventOutcome::Compiled("a.less".into()),
        ]
    );
    assert_eq!(backend.call_count(), 3);
}

#[test]
fn recreated_source_keeps_its_output_within_one_batch() {
    let fx = Fixture::new();
    let src = fx.source("main.less", "", 1);
    let out = fx.out.join("main.css");

    let backend = FakeBackend::new();
    let options = WatchOptions {
        follow_delete: true,
        ..WatchOptions::default()
    };
    let mut engine = engine(&fx, &fx.config().build(), &backend, &["main.less"], options);

    // Saved, removed and written back while the previous batch was busy.
    let outcomes = engine
        .drain(vec![
            event(FsEventKind::Create, src.clone()),
            event(FsEventKind::Delete, src.clone()),
            event(FsEventKind::Create, src.clone()),
        ])
        .unwrap();

    assert_eq!(
        outcomes,
        vec![
            EventOutcome::Compiled("main.less".into()),
            EventOutcome::DeletedOutput("main.less".into()),
            EventOutcome::Compiled("main.less".into()),
        ]
    );
    assert!(src.exists());
    assert!(out.is_file());
}

#[test]
fn coalesce_keeps_non_adjacent_repeats_in_order() {
    let a = PathBuf::from("/x/a.less");
    let events = vec![
        event(FsEventKind::Create, a.clone()),
        event(FsEventKind::Create, a.clone()),
        event(FsEventKind::Delete, a.clone()),
        event(FsEventKind::Create, a.clone()),
    ];
    assert_eq!(
        coalesce(events),
        vec![
            event(FsEventKind::Create, a.clone()),
            event(FsEventKind::Delete, a.clone()),
            event(FsEventKind::Create, a),
        ]
    );
}

#[test]
fn run_handles_queued_events_then_reports_closed_stream() {
    init_tracing();
    let fx = Fixture::new();
    let path = fx.source("main.less", "", 1);

    let backend = FakeBackend::new();
    let engine = engine(
        &fx,
        &fx.config().build(),
        &backend,
        &["main.less"],
        WatchOptions::default(),
    );

    let (tx, rx) = mpsc::channel();
    tx.send(Err(notify::Error::generic("transient"))).unwrap();
    tx.send(Ok(Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(path.clone())))
    .unwrap();
    tx.send(Ok(Event::new(EventKind::Access(AccessKind::Read)).add_path(path)))
        .unwrap();
    drop(tx);

    let err = engine.run(rx).unwrap_err();
    assert!(matches!(err, LesswatchError::WatchClosed));
    assert_eq!(backend.call_count(), 1);
}

#[test]
fn notify_events_map_to_create_modify_delete() {
    let p = PathBuf::from("/x/a.less");
    let q = PathBuf::from("/x/b.less");

    assert_eq!(
        FsEvent::from_notify(Event::new(EventKind::Create(CreateKind::File)).add_path(p.clone())),
        vec![event(FsEventKind::Create, p.clone())]
    );
    assert_eq!(
        FsEvent::from_notify(Event::new(EventKind::Remove(RemoveKind::File)).add_path(p.clone())),
        vec![event(FsEventKind::Delete, p.clone())]
    );
    assert_eq!(
        FsEvent::from_notify(
            Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
                .add_path(p.clone())
                .add_path(q.clone())
        ),
        vec![event(FsEventKind::Delete, p.clone()), event(FsEventKind::Create, q)]
    );
    assert_eq!(
        FsEvent::from_notify(
            Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From))).add_path(p.clone())
        ),
        vec![event(FsEventKind::Delete, p.clone())]
    );
    assert!(
        FsEvent::from_notify(
            Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))).add_path(p)
        )
        .is_empty()
    );
}
