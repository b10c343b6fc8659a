//! High-level scan pipeline.
//!
//! This module is the internal glue layer that wires the stages together:
//! region location -> circle detection + dedup -> row/column recovery ->
//! scoring -> decision -> result assembly.
//!
//! Algorithmic primitives live in `crate::region`, `crate::mark`,
//! `crate::grid`, `crate::score` and `crate::decide`. The pipeline layer
//! focuses on stage boundaries, call order, and per-page isolation: one
//! page is fully pipelined before the next begins, and a failing page
//! never aborts its siblings.

mod read_region;
mod result;
mod run;

pub use result::{AnswerEntry, PageEntry, PageFailure, SheetResult, UNKNOWN_SLOT};

pub(crate) use run::{scan_batch, scan_page};
