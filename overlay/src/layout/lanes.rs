//! Lane assignment shared by the scrolling layouts.
//!
//! Lanes run parallel to the scroll axis. Lane 0 is the center line and
//! further lanes alternate around it (`0, +1, -1, +2, -2, ...`). Members of one
//! group always take distinct lanes; across groups a lane is reused once the
//! previous marker in it has moved at least one icon away.

use cadence_core::grouping::MarkerGroup;
use cadence_core::marker::Marker;

/// Signed perpendicular slot for a lane index
pub(crate) fn lane_slot(lane: usize) -> i32 {
    let step = lane.div_ceil(2) as i32;
    if lane % 2 == 1 { step } else { -step }
}

/// Greedily give every grouped marker a slot.
///
/// `min_gap_secs` is the time an icon needs to clear its own width along the
/// scroll axis. Returns markers in group order with their slot.
pub(crate) fn assign_lanes<'a>(
    groups: &[MarkerGroup<'a>],
    max_lanes: usize,
    min_gap_secs: f32,
) -> Vec<(&'a Marker, i32)> {
    let max_lanes = max_lanes.max(1);
    let mut busy_until = vec![f32::NEG_INFINITY; max_lanes];
    let mut placed = Vec::new();

    for group in groups {
        let mut taken: Vec<usize> = Vec::with_capacity(group.len());
        for (i, marker) in group.markers.iter().enumerate() {
            let ts = marker.timestamp_secs;
            let free = (0..max_lanes).find(|l| !taken.contains(l) && busy_until[*l] <= ts);
            let lane = free
                .or_else(|| {
                    // Everything is busy: take the lane that frees up first
                    (0..max_lanes)
                        .filter(|l| !taken.contains(l))
                        .min_by(|a, b| busy_until[*a].total_cmp(&busy_until[*b]))
                })
                .unwrap_or(i % max_lanes);

            taken.push(lane);
            busy_until[lane] = busy_until[lane].max(ts + min_gap_secs);
            placed.push((*marker, lane_slot(lane)));
        }
    }
    placed
}
