//! Reconciles a live directory tree against the record of its previous scan.
//!
//! The core ([`filesystem`] and [`reconcile`]) only reads and diffs: it builds
//! one tree from disk, one from persisted records, and reports what was added,
//! removed, moved, or left stale under an excluded directory. Persisting the
//! result is up to the caller; [`store`] offers a snapshot file for that.

#![allow(clippy::enum_variant_names)]

pub mod config;
pub mod ext;
pub mod filesystem;
pub mod reconcile;
pub mod report;
pub mod store;
