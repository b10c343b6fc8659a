//! Fixed-offset slot sampling: the detection-free strategy.
//!
//! Instead of recovering bubble positions from the scan, slot centers are
//! laid out uniformly inside the region frame from the grid shape alone.
//! Every slot is synthesized, so faint or unprinted bubbles cost nothing;
//! the trade-off is zero tolerance for print drift inside the frame, which
//! is why deployments of this strategy pair it with a margin-gated decision
//! policy.

use crate::config::FixedOffsetParams;
use crate::region::RegionBox;
use crate::sheet_layout::GridSpec;

use super::Circle;

/// Compute one row of slot centers inside the region frame.
///
/// Rows and columns are spaced uniformly over the frame minus the
/// configured margin; the sampled radius is a fraction of the smaller
/// spacing so neighbouring slots never overlap.
pub(crate) fn row_slots(
    region: &RegionBox,
    grid: &GridSpec,
    row: usize,
    params: &FixedOffsetParams,
) -> Vec<Circle> {
    let margin_x = region.w as f32 * params.margin_frac;
    let margin_y = region.h as f32 * params.margin_frac;
    let x0 = region.x as f32 + margin_x;
    let y0 = region.y as f32 + margin_y;
    let span_x = (region.w as f32 - 2.0 * margin_x).max(0.0);
    let span_y = (region.h as f32 - 2.0 * margin_y).max(0.0);

    let spacing_x = if grid.cols > 1 {
        span_x / (grid.cols - 1) as f32
    } else {
        0.0
    };
    let spacing_y = if grid.rows > 1 {
        span_y / (grid.rows - 1) as f32
    } else {
        0.0
    };

    let spacing_min = match (spacing_x > 0.0, spacing_y > 0.0) {
        (true, true) => spacing_x.min(spacing_y),
        (true, false) => spacing_x,
        (false, true) => spacing_y,
        (false, false) => span_x.max(span_y).max(1.0),
    };
    let radius = (spacing_min * params.radius_frac).max(1.0);

    let y = y0 + row as f32 * spacing_y;
    (0..grid.cols)
        .map(|col| Circle {
            center: [x0 + col as f32 * spacing_x, y],
            radius,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet_layout::Alphabet;

    fn grid(rows: usize, cols: usize) -> GridSpec {
        GridSpec {
            rows,
            cols,
            alphabet: Alphabet::Letters { count: cols },
        }
    }

    #[test]
    fn slots_are_uniform_and_inside_the_frame() {
        let region = RegionBox { x: 100, y: 200, w: 300, h: 150 };
        let params = FixedOffsetParams::default();
        let slots = row_slots(&region, &grid(5, 5), 0, &params);
        assert_eq!(slots.len(), 5);

        let spacing = slots[1].center[0] - slots[0].center[0];
        for pair in slots.windows(2) {
            let gap = pair[1].center[0] - pair[0].center[0];
            assert!((gap - spacing).abs() < 1e-3, "columns must be uniform");
        }
        for s in &slots {
            assert!(s.center[0] >= region.x as f32);
            assert!(s.center[0] <= (region.x + region.w) as f32);
            assert!(s.center[1] >= region.y as f32);
        }
    }

    #[test]
    fn rows_advance_vertically() {
        let region = RegionBox { x: 0, y: 0, w: 200, h: 200 };
        let params = FixedOffsetParams::default();
        let top = row_slots(&region, &grid(4, 3), 0, &params);
        let below = row_slots(&region, &grid(4, 3), 1, &params);
        assert!(below[0].center[1] > top[0].center[1]);
        assert!((below[0].center[0] - top[0].center[0]).abs() < 1e-3);
    }

    #[test]
    fn radius_never_reaches_a_neighbouring_slot() {
        let region = RegionBox { x: 0, y: 0, w: 400, h: 100 };
        let params = FixedOffsetParams::default();
        let slots = row_slots(&region, &grid(2, 10), 0, &params);
        let spacing = slots[1].center[0] - slots[0].center[0];
        assert!(slots[0].radius * 2.0 < spacing);
    }
}
