//! Collapsing overlapping detections of one physical bubble.

use super::Circle;

/// Merge detections that represent the same printed bubble.
///
/// Detections are sorted by x and greedily clustered: any detection within
/// `merge_dist` of a cluster seed joins that cluster, and each cluster is
/// replaced by the coordinate and radius average of its members. Circle
/// detection frequently emits several near-identical matches for a single
/// printed ring, so this pass is not optional.
pub fn merge_overlapping(circles: Vec<Circle>, merge_dist: f32) -> Vec<Circle> {
    if circles.is_empty() {
        return circles;
    }

    let mut circles = circles;
    circles.sort_by(|a, b| a.center[0].partial_cmp(&b.center[0]).unwrap());

    let mut merged = Vec::new();
    let mut processed = vec![false; circles.len()];
    let dist_sq = merge_dist * merge_dist;

    for i in 0..circles.len() {
        if processed[i] {
            continue;
        }
        processed[i] = true;

        let mut sum_x = circles[i].center[0];
        let mut sum_y = circles[i].center[1];
        let mut sum_r = circles[i].radius;
        let mut count = 1.0f32;

        for j in (i + 1)..circles.len() {
            if processed[j] {
                continue;
            }
            let dx = circles[i].center[0] - circles[j].center[0];
            let dy = circles[i].center[1] - circles[j].center[1];
            if dx * dx + dy * dy < dist_sq {
                processed[j] = true;
                sum_x += circles[j].center[0];
                sum_y += circles[j].center[1];
                sum_r += circles[j].radius;
                count += 1.0;
            }
        }

        merged.push(Circle {
            center: [sum_x / count, sum_y / count],
            radius: sum_r / count,
        });
    }

    merged
}
