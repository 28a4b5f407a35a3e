//! Task lifecycle management for Bitacora.
//!
//! This module owns the mutable task record and the immutable trail derived
//! from it: creating, updating, deleting, and restoring user-owned tasks;
//! appending a history entry for every observable transition; snapshotting
//! task state on completion so the "completed tasks" view survives later
//! edits; and the scheduled sweep that reclassifies overdue tasks. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
