//! markgrid — pure-Rust optical mark recognition for bubble answer sheets.
//!
//! Converts a scanned page of a filled-in answer sheet into a structured
//! record: an identifier digit sequence, a group digit sequence, and a
//! per-question selected option. The pipeline stages are:
//!
//! 1. **Locate** – locally-normalized binarization, external contours,
//!    quadrilateral reference frames assigned to roles by position.
//! 2. **Detect** – gradient-voting circle proposals per region, radius
//!    recovery from the radial gradient profile, overlap dedup by
//!    cluster averaging.
//! 3. **Grid** – row clustering by vertical gaps, column indices by
//!    linear interpolation, synthesized candidates for empty slots.
//! 4. **Score** – contrast-normalized fill confidence from local dark
//!    ratio and mean intensity inside a circular mask.
//! 5. **Decide** – per-row winner under a configurable acceptance policy
//!    (unconditional argmax or margin-gated).
//! 6. **Assemble** – dense identifier/group strings with explicit unknown
//!    placeholders, sparse 1-based answer list.
//!
//! # Public API
//! The stable surface is intentionally small:
//! - [`SheetScanner`] and [`SheetLayout`] as primary entry points
//! - [`ScanConfig`] for advanced tuning
//! - [`DigitRecognizer`] as the injected identification capability
//! - result structures ([`SheetResult`], [`PageEntry`])
//!
//! Pixel-level primitives and pipeline internals are not part of the
//! public surface.

mod api;
mod config;
mod decide;
mod grid;
mod mark;
mod page;
mod pipeline;
mod preprocess;
mod recognize;
mod region;
mod score;
mod sheet_layout;
#[cfg(test)]
mod test_utils;

pub use api::SheetScanner;
pub use config::{
    CircleParams, DecisionPolicy, DetectStrategy, DigitBoxConfig, FixedOffsetParams,
    IdentifierSource, LocateConfig, ScanConfig, ScoreConfig,
};
pub use mark::{detect_circles, merge_overlapping, Circle};
pub use page::{pages_from_paths, RasterizedPage, ScanError};
pub use pipeline::{AnswerEntry, PageEntry, PageFailure, SheetResult, UNKNOWN_SLOT};
pub use recognize::{DigitPrediction, DigitRecognizer};
pub use region::{LocateStats, RegionBox, SheetRegions};
pub use score::{score_mark, ScoredCandidate};
pub use sheet_layout::{Alphabet, GridSpec, RegionKind, SheetLayout};
