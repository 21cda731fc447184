/*!
 * Process Queues
 * Ordered PID queues shared by the ready queue and resource wait lists
 */

use crate::core::types::Pid;
use serde::Serialize;
use std::collections::VecDeque;

/// FIFO of PIDs with scan-based selection
///
/// Selection helpers break ties by queue order: the first entry with the
/// best key wins, which keeps every policy deterministic under replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProcessQueue {
    entries: VecDeque<Pid>,
}

impl ProcessQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push_back(&mut self, pid: Pid) {
        self.entries.push_back(pid);
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<Pid> {
        self.entries.pop_front()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Pid> {
        self.entries.get(index).copied()
    }

    /// Detach the entry at `index`, keeping the order of the rest
    #[inline]
    pub fn remove_at(&mut self, index: usize) -> Option<Pid> {
        self.entries.remove(index)
    }

    /// Detach `pid` wherever it sits. Returns true if it was queued.
    pub fn remove(&mut self, pid: Pid) -> bool {
        match self.entries.iter().position(|&p| p == pid) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Position of the first entry with the greatest key
    pub fn max_position_by_key<K, F>(&self, mut key: F) -> Option<usize>
    where
        K: Ord,
        F: FnMut(Pid) -> K,
    {
        let mut best: Option<(usize, K)> = None;
        for (index, &pid) in self.entries.iter().enumerate() {
            let candidate = key(pid);
            match &best {
                Some((_, current)) if candidate <= *current => {}
                _ => best = Some((index, candidate)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Position of the first entry with the smallest key
    pub fn min_position_by_key<K, F>(&self, mut key: F) -> Option<usize>
    where
        K: Ord,
        F: FnMut(Pid) -> K,
    {
        let mut best: Option<(usize, K)> = None;
        for (index, &pid) in self.entries.iter().enumerate() {
            let candidate = key(pid);
            match &best {
                Some((_, current)) if candidate >= *current => {}
                _ => best = Some((index, candidate)),
            }
        }
        best.map(|(index, _)| index)
    }

    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Pid> {
        self.entries.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
