//! Marker grouping and cast deduplication.
//!
//! Grouping clusters near-simultaneous markers at render time so the layouts
//! can spread them perpendicular to the scroll axis. Deduplication collapses
//! rapid repeats of the same action when converting raw usage streams
//! (recordings, log imports) into markers.

use crate::marker::Marker;

/// Markers within this distance of a group's anchor join that group
pub const GROUP_THRESHOLD_SECS: f32 = 0.5;

/// Repeats of the same action closer than this to the last retained one are dropped
pub const DEDUP_WINDOW_SECS: f32 = 2.5;

/// A cluster of near-simultaneous markers
#[derive(Debug, Clone)]
pub struct MarkerGroup<'a> {
    /// Timestamp of the first marker that opened the group
    pub anchor_secs: f32,
    pub markers: Vec<&'a Marker>,
}

impl MarkerGroup<'_> {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Greedily cluster markers.
///
/// Markers are visited in the order given (store order, i.e. ascending
/// timestamp). A marker joins the first existing group whose anchor is within
/// `threshold_secs` (inclusive), otherwise it opens a new group anchored at its
/// own timestamp. Anchors never move, so `[12.0, 12.3, 12.9]` yields
/// `{12.0, 12.3}` and `{12.9}`.
pub fn group_markers<'a>(
    markers: impl IntoIterator<Item = &'a Marker>,
    threshold_secs: f32,
) -> Vec<MarkerGroup<'a>> {
    let mut groups: Vec<MarkerGroup<'a>> = Vec::new();

    for marker in markers {
        let ts = marker.timestamp_secs;
        match groups
            .iter_mut()
            .find(|g| (ts - g.anchor_secs).abs() <= threshold_secs)
        {
            Some(group) => group.markers.push(marker),
            None => groups.push(MarkerGroup {
                anchor_secs: ts,
                markers: vec![marker],
            }),
        }
    }

    groups
}

/// Collapse rapid repeats in one source's ordered usage sequence.
///
/// `key` returns `(action_id, timestamp_secs)` for an item. An item is dropped
/// when its action id equals that of the immediately preceding *retained*
/// item and it is less than `window_secs` after it. Items without an action id
/// are always retained and never suppress later items.
pub fn dedupe_rapid_casts<T>(
    usages: impl IntoIterator<Item = T>,
    window_secs: f32,
    key: impl Fn(&T) -> (Option<u32>, f32),
) -> Vec<T> {
    let mut retained: Vec<T> = Vec::new();
    let mut last: Option<(Option<u32>, f32)> = None;

    for usage in usages {
        let (action_id, ts) = key(&usage);
        if let (Some(id), Some((Some(last_id), last_ts))) = (action_id, last)
            && id == last_id
            && ts - last_ts < window_secs
        {
            continue;
        }
        last = Some((action_id, ts));
        retained.push(usage);
    }

    retained
}

/// Apply [`dedupe_rapid_casts`] separately to each source, preserving the
/// relative order of everything that survives.
///
/// `source` names the source of an item; sources are compared exactly.
pub fn dedupe_by_source<T>(
    usages: Vec<T>,
    window_secs: f32,
    source: impl Fn(&T) -> &str,
    key: impl Fn(&T) -> (Option<u32>, f32) + Copy,
) -> Vec<T> {
    // Tag each item with its original position so the merged output keeps it
    let mut by_source: Vec<(String, Vec<(usize, T)>)> = Vec::new();
    for (index, usage) in usages.into_iter().enumerate() {
        let name = source(&usage);
        match by_source.iter_mut().find(|(s, _)| s == name) {
            Some((_, items)) => items.push((index, usage)),
            None => by_source.push((name.to_string(), vec![(index, usage)])),
        }
    }

    let mut merged: Vec<(usize, T)> = by_source
        .into_iter()
        .flat_map(|(_, items)| dedupe_rapid_casts(items, window_secs, |(_, item)| key(item)))
        .collect();
    merged.sort_by_key(|(index, _)| *index);
    merged.into_iter().map(|(_, item)| item).collect()
}
