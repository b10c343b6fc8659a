//! Recovering the logical rows × columns structure from detections.
//!
//! Rows are recovered by vertical clustering (physically aligned bubbles
//! jitter by less than a bubble diameter), columns by linear interpolation
//! over the region-wide horizontal span. Both are pure functions from
//! geometry to indices so they stay independently testable.

use std::collections::HashMap;

use crate::mark::Circle;

/// One grid slot handed to the scorer: a detected bubble, or a candidate
/// synthesized at the interpolated position when nothing was detected
/// there. An expected-but-blank bubble is evidence of "unmarked", while a
/// truly absent row is evidence of "undetectable", so empty slots are
/// scored rather than skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub circle: Circle,
    pub synthesized: bool,
}

/// Cluster circles into `expected_rows` top-to-bottom rows.
///
/// Circles are sorted by y; a new row starts whenever the vertical gap to
/// the previous circle exceeds `row_gap`. Excess rows (noise artifacts)
/// are dropped keeping the most populous ones, re-sorted by vertical
/// position; missing rows are padded as empty.
pub(crate) fn group_rows(circles: &[Circle], expected_rows: usize, row_gap: f32) -> Vec<Vec<Circle>> {
    if circles.is_empty() {
        return vec![Vec::new(); expected_rows];
    }

    let mut sorted = circles.to_vec();
    sorted.sort_by(|a, b| a.center[1].partial_cmp(&b.center[1]).unwrap());

    let mut rows: Vec<Vec<Circle>> = Vec::new();
    let mut current = vec![sorted[0]];
    for c in sorted.into_iter().skip(1) {
        let last_y = current.last().expect("row never empty").center[1];
        if (c.center[1] - last_y).abs() < row_gap {
            current.push(c);
        } else {
            rows.push(sort_row(current));
            current = vec![c];
        }
    }
    rows.push(sort_row(current));

    if rows.len() > expected_rows {
        rows.sort_by_key(|r| std::cmp::Reverse(r.len()));
        rows.truncate(expected_rows);
        rows.sort_by(|a, b| mean_y(a).partial_cmp(&mean_y(b)).unwrap());
    }

    while rows.len() < expected_rows {
        rows.push(Vec::new());
    }

    rows
}

fn sort_row(mut row: Vec<Circle>) -> Vec<Circle> {
    row.sort_by(|a, b| a.center[0].partial_cmp(&b.center[0]).unwrap());
    row
}

fn mean_y(row: &[Circle]) -> f32 {
    row.iter().map(|c| c.center[1]).sum::<f32>() / row.len().max(1) as f32
}

/// Horizontal span of a region's detections, shared by all of its rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ColumnSpan {
    pub min_x: f32,
    pub max_x: f32,
}

impl ColumnSpan {
    /// Span over a detection set, or `None` when empty.
    pub(crate) fn of(circles: &[Circle]) -> Option<Self> {
        let mut iter = circles.iter();
        let first = iter.next()?.center[0];
        let mut min_x = first;
        let mut max_x = first;
        for c in iter {
            min_x = min_x.min(c.center[0]);
            max_x = max_x.max(c.center[0]);
        }
        Some(Self { min_x, max_x })
    }

    /// Uniform column spacing for `cols` columns.
    pub(crate) fn spacing(&self, cols: usize) -> f32 {
        if cols > 1 {
            (self.max_x - self.min_x) / (cols - 1) as f32
        } else {
            0.0
        }
    }
}

/// Map one row of detections onto column indices 0..cols, synthesizing a
/// candidate for every column with no detection.
///
/// An empty row maps to no slots at all: there is nothing to anchor the
/// interpolation vertically, and the row decodes as unknown.
pub(crate) fn map_columns(
    row: &[Circle],
    span: &ColumnSpan,
    cols: usize,
    mean_radius: f32,
) -> Vec<Slot> {
    if row.is_empty() || cols == 0 {
        return Vec::new();
    }

    let spacing = span.spacing(cols);
    let mut by_col: HashMap<usize, Circle> = HashMap::new();
    for c in row {
        let col = if spacing > 0.0 {
            ((c.center[0] - span.min_x) / (spacing + 1e-9)).round() as i64
        } else {
            0
        };
        if (0..cols as i64).contains(&col) {
            by_col.insert(col as usize, *c);
        }
    }

    let row_y = mean_y(row);
    (0..cols)
        .map(|col| match by_col.get(&col) {
            Some(&circle) => Slot {
                circle,
                synthesized: false,
            },
            None => Slot {
                circle: Circle {
                    center: [span.min_x + col as f32 * spacing, row_y],
                    radius: mean_radius,
                },
                synthesized: true,
            },
        })
        .collect()
}
