//! Pipeline configuration.
//!
//! Every tuning constant of the pipeline lives here, enumerated per region
//! class, so a scan is reproducible from one explicit structure instead of
//! module-level state. `ScanConfig::from_layout` is the recommended
//! constructor; individual fields can be overridden afterwards.

use crate::sheet_layout::{RegionKind, SheetLayout};

/// Circle-detection parameters for one region class.
///
/// Identifier/group bubbles are printed smaller than answer bubbles, so the
/// two classes carry distinct radius ranges and separation distances.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CircleParams {
    /// Minimum bubble radius (pixels).
    pub r_min: f32,
    /// Maximum bubble radius (pixels).
    pub r_max: f32,
    /// Minimum center separation between distinct bubbles (pixels).
    /// Doubles as the NMS radius for accumulator peak extraction.
    pub min_separation: f32,
    /// Gradient magnitude threshold (fraction of max gradient).
    pub grad_threshold: f32,
    /// Minimum accumulator value for a candidate (fraction of max).
    pub min_vote_frac: f32,
    /// Gaussian sigma for accumulator smoothing.
    pub accum_sigma: f32,
    /// Gaussian sigma applied to the region crop before gradient voting.
    pub blur_sigma: f32,
    /// Optional cap on candidates returned (after score sorting).
    #[serde(default)]
    pub max_candidates: Option<usize>,
}

impl CircleParams {
    /// Parameters for the identifier/group digit blocks.
    pub fn digit_block() -> Self {
        Self {
            r_min: 5.0,
            r_max: 20.0,
            min_separation: 15.0,
            ..Self::base()
        }
    }

    /// Parameters for the answer block (larger printed bubbles).
    pub fn answer_block() -> Self {
        Self {
            r_min: 8.0,
            r_max: 25.0,
            min_separation: 20.0,
            ..Self::base()
        }
    }

    /// Parameters for a region kind.
    pub fn for_kind(kind: RegionKind) -> Self {
        match kind {
            RegionKind::Identifier | RegionKind::Group => Self::digit_block(),
            RegionKind::AnswerBlock => Self::answer_block(),
        }
    }

    fn base() -> Self {
        Self {
            r_min: 5.0,
            r_max: 20.0,
            min_separation: 15.0,
            grad_threshold: 0.05,
            min_vote_frac: 0.15,
            accum_sigma: 2.0,
            blur_sigma: 1.0,
            max_candidates: None,
        }
    }
}

impl Default for CircleParams {
    fn default() -> Self {
        Self::digit_block()
    }
}

/// Region-frame location parameters.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocateConfig {
    /// Gaussian sigma applied to the page before binarization.
    pub blur_sigma: f32,
    /// Half-width of the local-mean window used for adaptive binarization.
    /// A radius of 9 gives the 19×19 neighborhood the printed frames need
    /// to survive uneven illumination.
    pub block_radius: u32,
    /// Offset subtracted from the local mean; pixels darker than
    /// `mean - offset` become foreground.
    pub offset: u8,
    /// Minimum enclosed area for a candidate reference frame (pixels²).
    pub min_quad_area: f64,
    /// Polygon-simplification tolerance as a fraction of contour perimeter.
    pub approx_eps_frac: f64,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.2,
            block_radius: 9,
            offset: 3,
            min_quad_area: 100.0,
            approx_eps_frac: 0.02,
        }
    }
}

/// Fill-score parameters.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Fraction of the candidate radius covered by the scoring mask.
    /// Kept below 1.0 so the printed ring itself is not counted as ink.
    pub mask_radius_frac: f32,
    /// Weight of the dark-pixel ratio term.
    pub dark_weight: f32,
    /// Weight of the inverse mean-intensity term.
    pub intensity_weight: f32,
}

impl ScoreConfig {
    pub const DEFAULT_MASK_RADIUS_FRAC: f32 = 0.7;
    pub const DEFAULT_DARK_WEIGHT: f32 = 3000.0;
    pub const DEFAULT_INTENSITY_WEIGHT: f32 = 5.0;
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            mask_radius_frac: Self::DEFAULT_MASK_RADIUS_FRAC,
            dark_weight: Self::DEFAULT_DARK_WEIGHT,
            intensity_weight: Self::DEFAULT_INTENSITY_WEIGHT,
        }
    }
}

/// Mark-detection strategy selector.
///
/// The two strategies disagree on how bubble positions are recovered:
/// `CircleGrid` detects circles and rebuilds the grid from them, tolerating
/// print drift; `FixedOffset` samples at positions derived purely from the
/// region frame, tolerating faint or unprinted bubbles. Both feed the same
/// scorer and decider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectStrategy {
    /// Gradient-voting circle detection plus row/column recovery.
    #[default]
    CircleGrid,
    /// Uniform coordinate sampling inside the region frame.
    FixedOffset,
}

/// Parameters for the fixed-offset sampling strategy.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FixedOffsetParams {
    /// Fraction of the region frame kept as margin on each side before the
    /// uniform grid is laid out.
    pub margin_frac: f32,
    /// Sampled radius as a fraction of the smaller grid spacing.
    pub radius_frac: f32,
}

impl Default for FixedOffsetParams {
    fn default() -> Self {
        Self {
            margin_frac: 0.12,
            radius_frac: 0.35,
        }
    }
}

/// Winner-acceptance policy applied per row.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPolicy {
    /// The maximum-score candidate always wins.
    #[default]
    ArgMax,
    /// The winner must clear an absolute score floor and lead the
    /// runner-up by a minimum gap, otherwise the row is unknown.
    MarginGated { min_score: f32, min_margin: f32 },
}

impl DecisionPolicy {
    pub const DEFAULT_MIN_SCORE: f32 = 500.0;
    pub const DEFAULT_MIN_MARGIN: f32 = 50.0;

    /// Margin-gated policy with the default floor and gap.
    pub fn margin_gated() -> Self {
        Self::MarginGated {
            min_score: Self::DEFAULT_MIN_SCORE,
            min_margin: Self::DEFAULT_MIN_MARGIN,
        }
    }
}

/// Where identifier digits come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierSource {
    /// The geometric bubble pipeline (default).
    #[default]
    Bubbles,
    /// Handwritten digit boxes read through an injected [`crate::DigitRecognizer`].
    DigitBoxes,
}

/// Digit-box detection parameters for the [`IdentifierSource::DigitBoxes`] path.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DigitBoxConfig {
    /// Fraction of the page height (from the top) searched for boxes.
    pub top_fraction: f32,
    /// Minimum enclosed box area (pixels²).
    pub min_area: f64,
    /// Minimum box side length (pixels).
    pub min_side: u32,
    /// Accepted width/height aspect-ratio range.
    pub aspect_min: f32,
    pub aspect_max: f32,
    /// Vertical tolerance when grouping boxes into reading-order lines.
    pub line_tolerance_y: f32,
    /// Side length of the square patch handed to the recognizer.
    pub patch_size: u32,
    /// Margin added around a box before cropping its patch.
    pub patch_margin: u32,
    /// Predictions below this confidence become unknown digits.
    pub min_confidence: f32,
}

impl Default for DigitBoxConfig {
    fn default() -> Self {
        Self {
            top_fraction: 0.25,
            min_area: 1000.0,
            min_side: 30,
            aspect_min: 0.5,
            aspect_max: 2.0,
            line_tolerance_y: 30.0,
            patch_size: 64,
            patch_margin: 5,
            min_confidence: 0.5,
        }
    }
}

/// Top-level scan configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Logical sheet layout (grid shapes and value alphabets).
    pub layout: SheetLayout,
    /// Region-frame location controls.
    pub locate: LocateConfig,
    /// Circle detection for the identifier/group digit blocks.
    pub digit_circles: CircleParams,
    /// Circle detection for the answer block.
    pub answer_circles: CircleParams,
    /// Dedup merge distance as a multiple of the mean detected radius.
    pub merge_dist_factor: f32,
    /// Mean-radius fallback when a region yields no detections.
    pub fallback_radius: f32,
    /// Row-split gap as a multiple of the mean detected radius.
    pub row_gap_factor: f32,
    /// Fill-score weights.
    pub score: ScoreConfig,
    /// Mark-detection strategy.
    pub strategy: DetectStrategy,
    /// Fixed-offset sampling controls (used when `strategy` selects it).
    pub fixed_offset: FixedOffsetParams,
    /// Winner-acceptance policy.
    pub decision: DecisionPolicy,
    /// Identifier digit source.
    pub identifier_source: IdentifierSource,
    /// Digit-box detection controls (used when `identifier_source` selects them).
    pub digit_boxes: DigitBoxConfig,
}

impl ScanConfig {
    pub const DEFAULT_MERGE_DIST_FACTOR: f32 = 1.5;
    pub const DEFAULT_FALLBACK_RADIUS: f32 = 10.0;
    pub const DEFAULT_ROW_GAP_FACTOR: f32 = 1.8;

    /// Build a configuration for a sheet layout with default tuning.
    ///
    /// This is the recommended constructor for library users. After calling
    /// it, individual fields can be overridden as needed.
    pub fn from_layout(layout: SheetLayout) -> Self {
        Self {
            layout,
            locate: LocateConfig::default(),
            digit_circles: CircleParams::digit_block(),
            answer_circles: CircleParams::answer_block(),
            merge_dist_factor: Self::DEFAULT_MERGE_DIST_FACTOR,
            fallback_radius: Self::DEFAULT_FALLBACK_RADIUS,
            row_gap_factor: Self::DEFAULT_ROW_GAP_FACTOR,
            score: ScoreConfig::default(),
            strategy: DetectStrategy::default(),
            fixed_offset: FixedOffsetParams::default(),
            decision: DecisionPolicy::default(),
            identifier_source: IdentifierSource::default(),
            digit_boxes: DigitBoxConfig::default(),
        }
    }

    /// Circle-detection parameters for a region kind.
    pub fn circles_for(&self, kind: RegionKind) -> &CircleParams {
        match kind {
            RegionKind::Identifier | RegionKind::Group => &self.digit_circles,
            RegionKind::AnswerBlock => &self.answer_circles,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from_layout(SheetLayout::default())
    }
}
