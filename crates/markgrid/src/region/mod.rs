//! Reference-frame location primitives.

pub(crate) mod locate;

pub use locate::{LocateStats, RegionBox, SheetRegions};
