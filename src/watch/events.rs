// src/watch/events.rs

//! Filesystem events as the watch engine sees them.

use std::path::PathBuf;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsEventKind {
    Create,
    Modify,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub path: PathBuf,
}

impl FsEvent {
    pub fn new(kind: FsEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Translate a `notify` event.
    ///
    /// Renames become a delete of the old name and a create of the new one.
    /// Access and metadata-only events are dropped.
    pub fn from_notify(event: Event) -> Vec<FsEvent> {
        let kind = match event.kind {
            EventKind::Create(_) => FsEventKind::Create,
            EventKind::Remove(_) => FsEventKind::Delete,
            EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
            EventKind::Modify(ModifyKind::Name(mode)) => return from_rename(mode, event.paths),
            EventKind::Modify(_) => FsEventKind::Modify,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
        };

        event
            .paths
            .into_iter()
            .map(|path| FsEvent { kind, path })
            .collect()
    }
}

fn from_rename(mode: RenameMode, paths: Vec<PathBuf>) -> Vec<FsEvent> {
    match mode {
        RenameMode::From => paths
            .into_iter()
            .map(|p| FsEvent::new(FsEventKind::Delete, p))
            .collect(),
        RenameMode::To => paths
            .into_iter()
            .map(|p| FsEvent::new(FsEventKind::Create, p))
            .collect(),
        RenameMode::Both => {
            let mut iter = paths.into_iter();
            let mut events = Vec::with_capacity(2);
            if let Some(from) = iter.next() {
                events.push(FsEvent::new(FsEventKind::Delete, from));
            }
            if let Some(to) = iter.next() {
                events.push(FsEvent::new(FsEventKind::Create, to));
            }
            events
        }
        // Backends that cannot tell which side of the rename a path is
        // report `Any`/`Other`: treat it as a change to that path.
        RenameMode::Any | RenameMode::Other => paths
            .into_iter()
            .map(|p| FsEvent::new(FsEventKind::Modify, p))
            .collect(),
    }
}

/// Collapse runs of identical events (same kind and path) within one drained
/// batch. Non-adjacent repeats are kept, so `create, delete, create` still
/// ends with the file compiled.
pub fn coalesce(mut events: Vec<FsEvent>) -> Vec<FsEvent> {
    events.dedup();
    events
}
