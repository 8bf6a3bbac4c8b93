//! Ordered track storage with a single selection cursor.
//!
//! Index-based operations never fail: an index outside the current list is a
//! documented no-op, reported through the return value, so callers holding a
//! stale index cannot corrupt the list.

use std::collections::HashSet;

use super::model::Track;

#[derive(Debug, Default, Clone)]
pub struct PlaylistStore {
    tracks: Vec<Track>,
    selected: Option<usize>,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Current cursor; `None` when nothing is selected.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.selected.and_then(|i| self.tracks.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Track ids in playlist order.
    pub fn ids(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.id.clone()).collect()
    }

    /// Replace the whole list with a confirmed server list.
    ///
    /// The cursor follows the previously selected track if it is still present,
    /// otherwise the selection is cleared.
    pub fn replace_all(&mut self, tracks: Vec<Track>) {
        let selected_id = self.selected_track().map(|t| t.id.clone());

        let mut seen = HashSet::new();
        self.tracks = tracks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();

        self.selected = selected_id.and_then(|id| self.position_of(&id));
    }

    /// Append tracks in the given order and select the first one appended.
    ///
    /// Ids already in the list are skipped. Returns how many tracks were added.
    pub fn append(&mut self, tracks: Vec<Track>) -> usize {
        let first_new = self.tracks.len();
        for track in tracks {
            if self.position_of(&track.id).is_none() {
                self.tracks.push(track);
            }
        }

        let added = self.tracks.len() - first_new;
        if added > 0 {
            self.selected = Some(first_new);
        }
        added
    }

    /// Remove the track at `index`.
    ///
    /// If the removed track was selected, the cursor stays on the same slot
    /// (now holding the next track), clamped to the new end of the list.
    pub fn remove_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }

        let removed = self.tracks.remove(index);
        let len = self.tracks.len();

        self.selected = match self.selected {
            _ if len == 0 => None,
            Some(s) if s > index => Some(s - 1),
            Some(s) if s == index => Some(s.min(len - 1)),
            Some(s) if s >= len => Some(len - 1),
            other => other,
        };

        Some(removed)
    }

    /// Move the track at `from` so that it ends up at index `to`.
    ///
    /// `to` is a slot in the list after the track has been taken out, so any
    /// value in `0..len` is valid. Out-of-range input or `from == to` is a no-op
    /// and returns `false`. The cursor follows the moved track.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len || from == to {
            return false;
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        self.selected = Some(to);
        true
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.selected = None;
    }

    /// Put the cursor on `index`; out-of-range input is ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn select_next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        let next = match self.selected {
            Some(s) => (s + 1).min(self.tracks.len() - 1),
            None => 0,
        };
        self.selected = Some(next);
    }

    pub fn select_prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        let prev = match self.selected {
            Some(s) => s.saturating_sub(1),
            None => 0,
        };
        self.selected = Some(prev);
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.tracks.len().checked_sub(1) {
            self.select(last);
        }
    }
}
