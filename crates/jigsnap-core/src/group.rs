//! Connectivity and grouping.
//!
//! A group is the transitive closure of recorded connections. Groups are
//! not stored; they are recomputed by breadth-first traversal over each
//! piece's connected set. After a merge every member's connected set holds
//! the whole group, so traversal from any member finishes in one hop.

use crate::board::Board;
use crate::piece::PieceId;
use std::collections::{BTreeSet, HashSet, VecDeque};

impl Board {
    /// Every piece transitively connected to `start`, including itself.
    ///
    /// Returns an empty list for an unknown id.
    pub fn group_of(&self, start: PieceId) -> Vec<PieceId> {
        if !self.contains(start) {
            return Vec::new();
        }
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut group = Vec::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            group.push(id);
            let Some(piece) = self.get(id) else { continue };
            for &neighbor in piece.connected_pieces() {
                if self.contains(neighbor) && visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        group
    }

    pub fn group_size(&self, id: PieceId) -> usize {
        self.group_of(id).len()
    }

    /// Record a symmetric link between `a` and `b` and merge their groups.
    ///
    /// Returns `false` when either id is unknown, `a == b`, or the two were
    /// already directly linked (in which case nothing changes).
    pub fn connect(&mut self, a: PieceId, b: PieceId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        let already = self
            .get(a)
            .is_some_and(|p| p.connected_pieces().contains(&b));
        if already {
            return false;
        }
        if let Some(piece) = self.get_mut(a) {
            piece.connected_mut().insert(b);
        }
        if let Some(piece) = self.get_mut(b) {
            piece.connected_mut().insert(a);
        }
        self.merge_groups(a, b);
        true
    }

    /// Flatten the union of both closures onto one shared connected set.
    pub fn merge_groups(&mut self, a: PieceId, b: PieceId) {
        let mut members: BTreeSet<PieceId> = self.group_of(a).into_iter().collect();
        members.extend(self.group_of(b));
        let Some(&group_id) = members.first() else { return };

        for &id in &members {
            if let Some(piece) = self.get_mut(id) {
                let connected = piece.connected_mut();
                connected.extend(members.iter().copied().filter(|&other| other != id));
                piece.set_group_id(group_id);
            }
        }
    }

    /// All groups, each listed once. Order follows draw order of the first
    /// member encountered.
    pub fn groups(&self) -> Vec<Vec<PieceId>> {
        let mut seen = HashSet::new();
        let mut groups = Vec::new();
        for &id in self.z_order() {
            if seen.contains(&id) {
                continue;
            }
            let group = self.group_of(id);
            seen.extend(group.iter().copied());
            groups.push(group);
        }
        groups
    }

    pub fn largest_group_size(&self) -> usize {
        self.groups().iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether any two pieces have been joined.
    pub fn has_connected_pieces(&self) -> bool {
        self.pieces_ordered().any(|p| !p.connected_pieces().is_empty())
    }

    /// Every piece belongs to one group.
    pub fn is_complete(&self) -> bool {
        !self.is_empty() && self.largest_group_size() == self.len()
    }

    /// Repair connectivity of a restored piece list: drop links to unknown
    /// ids, make links symmetric and flatten every group.
    pub fn normalize_connectivity(&mut self) {
        let links: Vec<(PieceId, PieceId)> = self
            .pieces_ordered()
            .flat_map(|p| p.connected_pieces().iter().map(move |&other| (p.id, other)))
            .collect();
        for piece in self.pieces_mut() {
            piece.connected_mut().clear();
        }
        for (a, b) in links {
            if a != b && self.contains(a) && self.contains(b) {
                if let Some(piece) = self.get_mut(a) {
                    piece.connected_mut().insert(b);
                }
                if let Some(piece) = self.get_mut(b) {
                    piece.connected_mut().insert(a);
                }
            }
        }
        for group in self.groups() {
            if let [first, rest @ ..] = group.as_slice() {
                match rest.first() {
                    Some(&second) => self.merge_groups(*first, second),
                    None => {
                        if let Some(piece) = self.get_mut(*first) {
                            piece.set_group_id(*first);
                        }
                    }
                }
            }
        }
    }
}
