/*!
 * Process Table
 * Arena of live processes addressed by stable PID
 */

use super::types::Process;
use crate::core::errors::{SchedResult, SchedulerError};
use crate::core::limits::FIRST_PID;
use crate::core::types::{Pid, Priority, Tick};

/// Slot-per-PID arena
///
/// PIDs are handed out in creation order and index straight into `slots`.
/// A reaped process leaves an empty slot behind, so a PID is never reused
/// and stale PIDs resolve to `None` instead of to a different process.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    slots: Vec<Option<Process>>,
    live: usize,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a PID and store a fresh READY process under it
    pub fn insert(&mut self, name: Option<String>, lifespan: Tick, priority: Priority) -> Pid {
        let pid = FIRST_PID + self.slots.len() as Pid;
        let name = name.unwrap_or_else(|| format!("P{pid}"));
        self.slots.push(Some(Process::new(pid, name, lifespan, priority)));
        self.live += 1;
        pid
    }

    #[inline]
    fn slot(pid: Pid) -> Option<usize> {
        pid.checked_sub(FIRST_PID).map(|index| index as usize)
    }

    pub fn get(&self, pid: Pid) -> Option<&Process> {
        Self::slot(pid)
            .and_then(|index| self.slots.get(index))
            .and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        Self::slot(pid)
            .and_then(|index| self.slots.get_mut(index))
            .and_then(Option::as_mut)
    }

    /// Like [`get`](Self::get) but a missing PID is an error
    pub fn require(&self, pid: Pid) -> SchedResult<&Process> {
        self.get(pid).ok_or(SchedulerError::ProcessNotFound(pid))
    }

    /// Like [`get_mut`](Self::get_mut) but a missing PID is an error
    pub fn require_mut(&mut self, pid: Pid) -> SchedResult<&mut Process> {
        self.get_mut(pid).ok_or(SchedulerError::ProcessNotFound(pid))
    }

    /// Take a process out of the arena for good
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        let removed = Self::slot(pid)
            .and_then(|index| self.slots.get_mut(index))
            .and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Live processes in PID order
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
