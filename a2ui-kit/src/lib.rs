//! # Description
//!
//! A2UI Kit is the rendering core for agent-authored user interfaces
//! described with the A2UI JSON protocol. It keeps every surface's component
//! table and data model, resolves data-bound values, and dispatches user
//! actions, leaving the actual drawing to a host renderer.
//!
//! # Features
//!
//! - Accepts both the current and the older (v0.8) message vocabulary.
//! - Validated data-model paths and a bounded, timeout-guarded regex engine.
//! - Atomic per-message commits readers can observe without locking.
//! - Snapshot and restore of the complete state.

pub mod a2ui;

pub mod prelude;
