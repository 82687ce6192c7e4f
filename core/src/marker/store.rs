//! Sorted marker storage.
//!
//! Every mutation keeps the markers ordered ascending by timestamp; markers
//! with equal timestamps keep their insertion order. The visibility window
//! and grouping code rely on this ordering.

use serde::{Deserialize, Serialize};

use super::Marker;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Marker>", into = "Vec<Marker>")]
pub struct MarkerStore {
    markers: Vec<Marker>,
}

/// Clamp a timestamp to the storable range (finite, non-negative)
fn sanitize_timestamp(secs: f32) -> f32 {
    if secs.is_finite() { secs.max(0.0) } else { 0.0 }
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    /// Timestamp of the last marker, if any
    pub fn last_timestamp(&self) -> Option<f32> {
        self.markers.last().map(|m| m.timestamp_secs)
    }

    /// Latest time any marker (including duration bands) is still visible
    pub fn last_end(&self) -> Option<f32> {
        self.markers.iter().map(Marker::end_secs).reduce(f32::max)
    }

    /// Insert a marker at its sorted position and return that position.
    ///
    /// Equal timestamps are placed after existing ones.
    pub fn insert_sorted(&mut self, mut marker: Marker) -> usize {
        marker.timestamp_secs = sanitize_timestamp(marker.timestamp_secs);
        let ts = marker.timestamp_secs;
        let index = self.markers.partition_point(|m| m.timestamp_secs <= ts);
        self.markers.insert(index, marker);
        index
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Marker> {
        if index < self.markers.len() {
            Some(self.markers.remove(index))
        } else {
            None
        }
    }

    /// Edit a marker in place and move it to its new sorted position.
    ///
    /// Returns the new index, or `None` if `index` is out of range.
    pub fn update_at(&mut self, index: usize, edit: impl FnOnce(&mut Marker)) -> Option<usize> {
        let mut marker = self.remove_at(index)?;
        edit(&mut marker);
        Some(self.insert_sorted(marker))
    }

    /// Move a marker to a new timestamp, returning its new index
    pub fn move_to(&mut self, index: usize, timestamp_secs: f32) -> Option<usize> {
        self.update_at(index, |m| m.timestamp_secs = timestamp_secs)
    }

    /// Shift every marker by `delta_secs`, clamping at zero.
    ///
    /// A monotonic shift followed by clamping never reorders markers.
    pub fn shift_all(&mut self, delta_secs: f32) {
        for marker in &mut self.markers {
            marker.timestamp_secs = sanitize_timestamp(marker.timestamp_secs + delta_secs);
        }
    }

    pub fn retain(&mut self, keep: impl FnMut(&Marker) -> bool) {
        self.markers.retain(keep);
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Markers with `from <= timestamp <= to`, in order
    pub fn window(&self, from: f32, to: f32) -> &[Marker] {
        if to < from {
            return &[];
        }
        let start = self.markers.partition_point(|m| m.timestamp_secs < from);
        let end = self.markers.partition_point(|m| m.timestamp_secs <= to);
        &self.markers[start..end.max(start)]
    }

    /// Check the ordering invariant (used by tests and document validation)
    pub fn is_sorted(&self) -> bool {
        self.markers
            .windows(2)
            .all(|pair| pair[0].timestamp_secs <= pair[1].timestamp_secs)
    }
}

impl From<Vec<Marker>> for MarkerStore {
    fn from(mut markers: Vec<Marker>) -> Self {
        for marker in &mut markers {
            marker.timestamp_secs = sanitize_timestamp(marker.timestamp_secs);
        }
        markers.sort_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs));
        Self { markers }
    }
}

impl From<MarkerStore> for Vec<Marker> {
    fn from(store: MarkerStore) -> Self {
        store.markers
    }
}

impl FromIterator<Marker> for MarkerStore {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a MarkerStore {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}
