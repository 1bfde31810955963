#![cfg_attr(test, allow(unused_crate_dependencies))]
// Reconciliation runs on the editor's idle path - diagnostics go through tracing
#![deny(clippy::print_stderr)]

//! Incremental highlighting of a whole document.
//!
//! A [`Document`] caches one [`ParsedLine`](synline_engine::ParsedLine) per
//! line. Edits mark the touched lines dirty; [`Document::reconcile`] then
//! re-parses forward from the first dirty line and stops as soon as a
//! re-parsed line ends in the same [`LineState`](synline_engine::LineState)
//! it ended in before, because every later line would parse identically.
//!
//! Reconciliation is budgeted and resumable: a large paste is worked off in
//! slices, and lines before the resume point always hold final results.

mod budget;
mod document;

pub use budget::{ReconcileBudget, ReconcileReport, ReconcileStatus};
pub use document::Document;
