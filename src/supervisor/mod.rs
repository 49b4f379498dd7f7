// src/supervisor/mod.rs

//! Long-running execution models for `lesswatch watch`.
//!
//! - [`poller`]: re-run the batch pass every fixed interval until stopped.
//! - [`restart`]: run the event-driven watch session on a background thread
//!   and restart it after a cooldown whenever it dies.

pub mod poller;
pub mod restart;

pub use poller::{spawn_poller, PollerHandle};
pub use restart::{spawn_run_loop, Supervisor};
