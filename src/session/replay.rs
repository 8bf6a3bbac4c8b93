//! Local playlist edits kept around until every full-list request issued
//! before them has been answered.
//!
//! The server answers `GET /tracks` and `POST /randomize` with the list as it
//! stood when the request reached it. Edits the user made after that request
//! went out are applied again to the answer, the same way the server applies
//! them, so a late list never undoes them.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::playlist::Track;

use super::event::Mutation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LocalEdit {
    Delete(String),
    /// Full id order sent to the server; ids missing from it are dropped.
    Reorder(Vec<String>),
    Clear,
}

impl LocalEdit {
    fn mutation(&self) -> Mutation {
        match self {
            Self::Delete(_) => Mutation::Delete,
            Self::Reorder(_) => Mutation::Reorder,
            Self::Clear => Mutation::Clear,
        }
    }

    fn apply(&self, tracks: &mut Vec<Track>) {
        match self {
            Self::Delete(id) => tracks.retain(|t| &t.id != id),
            Self::Reorder(order) => {
                let mut by_id: HashMap<String, Track> =
                    tracks.drain(..).map(|t| (t.id.clone(), t)).collect();
                tracks.extend(order.iter().filter_map(|id| by_id.remove(id)));
            }
            Self::Clear => tracks.clear(),
        }
    }
}

#[derive(Debug)]
struct PendingEdit {
    seq: u64,
    edit: LocalEdit,
    acked: bool,
}

/// Edit log plus the full-list requests still waiting for an answer.
///
/// Requests run one at a time in issue order, so acknowledgments arrive in
/// the order the edits were made and a list requested after edit `n`
/// already reflects edits `1..=n`.
#[derive(Debug, Default)]
pub(crate) struct EditLog {
    seq: u64,
    edits: VecDeque<PendingEdit>,
    waiting: Vec<u64>,
}

impl EditLog {
    /// Token for a new full-list request: the number of edits issued so far.
    pub fn list_requested(&mut self) -> u64 {
        self.waiting.push(self.seq);
        self.seq
    }

    pub fn record(&mut self, edit: LocalEdit) {
        self.seq += 1;
        self.edits.push_back(PendingEdit {
            seq: self.seq,
            edit,
            acked: false,
        });
    }

    /// Match an acknowledgment to the oldest unacknowledged edit. A refused
    /// edit never happened on the server, so it is not replayed.
    pub fn acknowledged(&mut self, mutation: Mutation, accepted: bool) {
        let Some(index) = self.edits.iter().position(|e| !e.acked) else {
            debug!(mutation = mutation.label(), "acknowledgment without a pending edit");
            return;
        };
        if self.edits[index].edit.mutation() != mutation {
            debug!(
                expected = self.edits[index].edit.mutation().label(),
                got = mutation.label(),
                "acknowledgment out of order"
            );
        }
        if accepted {
            self.edits[index].acked = true;
        } else {
            self.edits.remove(index);
        }
        self.prune();
    }

    /// Bring a server list answered for `token` up to date with the edits
    /// made after it was requested.
    pub fn settle(&mut self, token: u64, mut tracks: Vec<Track>) -> Vec<Track> {
        self.stop_waiting(token);
        let mut replayed = 0;
        for pending in self.edits.iter().filter(|e| e.seq > token) {
            pending.edit.apply(&mut tracks);
            replayed += 1;
        }
        if replayed > 0 {
            debug!(token, replayed, "replayed local edits onto server list");
        }
        self.prune();
        tracks
    }

    /// The request for `token` failed; nothing will be replayed for it.
    pub fn abandon(&mut self, token: u64) {
        self.stop_waiting(token);
        self.prune();
    }

    fn stop_waiting(&mut self, token: u64) {
        if let Some(pos) = self.waiting.iter().position(|&t| t == token) {
            self.waiting.swap_remove(pos);
        }
    }

    fn prune(&mut self) {
        let oldest = self.waiting.iter().min().copied();
        while let Some(front) = self.edits.front() {
            let still_needed = !front.acked || oldest.is_some_and(|t| front.seq > t);
            if still_needed {
                break;
            }
            self.edits.pop_front();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.edits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track {
                id: id.to_string(),
                name: format!("{id}.mp3"),
                duration: 1.0,
            })
            .collect()
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn reorder_keeps_listed_ids_only() {
        let mut list = tracks(&["a", "b", "c"]);
        LocalEdit::Reorder(vec!["c".into(), "a".into(), "zz".into()]).apply(&mut list);
        assert_eq!(ids(&list), vec!["c", "a"]);
    }

    #[test]
    fn edits_after_the_request_are_replayed() {
        let mut log = EditLog::default();
        let token = log.list_requested();
        log.record(LocalEdit::Delete("a".into()));

        let settled = log.settle(token, tracks(&["c", "a", "b"]));
        assert_eq!(ids(&settled), vec!["c", "b"]);
    }

    #[test]
    fn edits_before_the_request_are_not_replayed_again() {
        let mut log = EditLog::default();
        log.record(LocalEdit::Clear);
        let token = log.list_requested();

        // A download finished on the server after the clear.
        let settled = log.settle(token, tracks(&["n"]));
        assert_eq!(ids(&settled), vec!["n"]);
    }

    #[test]
    fn refused_edit_is_dropped_from_replay() {
        let mut log = EditLog::default();
        let token = log.list_requested();
        log.record(LocalEdit::Delete("a".into()));
        log.acknowledged(Mutation::Delete, false);

        let settled = log.settle(token, tracks(&["a", "b"]));
        assert_eq!(ids(&settled), vec!["a", "b"]);
    }

    #[test]
    fn log_is_pruned_once_nothing_can_need_it() {
        let mut log = EditLog::default();
        let token = log.list_requested();
        log.record(LocalEdit::Delete("a".into()));
        log.acknowledged(Mutation::Delete, true);
        assert_eq!(log.len(), 1);

        log.settle(token, tracks(&["a"]));
        assert_eq!(log.len(), 0);

        log.record(LocalEdit::Clear);
        log.acknowledged(Mutation::Clear, true);
        assert_eq!(log.len(), 0);
    }
}
