// src/watch/mod.rs

//! File watching and event-driven recompilation.
//!
//! This module is responsible for:
//! - Registering non-recursive `notify` watches on every directory of the
//!   source tree, including directories created later ([`registry`]).
//! - Translating `notify` events into create/modify/delete events
//!   ([`events`]).
//! - Mapping events back to tracked sources and recompiling or deleting
//!   outputs ([`engine`]).
//! - Wiring all of that into one blocking session ([`session`]).

pub mod engine;
pub mod events;
pub mod path_utils;
pub mod registry;
pub mod session;

pub use engine::{EventOutcome, WatchEngine, WatchOptions};
pub use events::{coalesce, FsEvent, FsEventKind};
pub use registry::{DirWatcher, WatchRegistry};
pub use session::{initial_pass, run_session};
