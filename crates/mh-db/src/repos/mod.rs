//! Repository modules for every mhouse entity and the audit history.
//!
//! Each module adds methods to `MhService` via `impl MhService` blocks.
//! Reads query the connection directly; writes build a `ChangeTracker` and
//! go through `save_changes`, so every write is audited.

pub mod audit;
pub mod history;
pub mod house;
pub mod post;
pub mod week_info;
pub mod week_mark;
