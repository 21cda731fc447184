/*!
 * Scheduling Context
 * The mutable simulation state every policy callback operates on
 */

use super::stats::SchedulerStats;
use crate::core::config::SchedulerConfig;
use crate::core::errors::{SchedResult, SchedulerError};
use crate::core::types::{Pid, Priority, ResourceId};
use crate::process::queue::ProcessQueue;
use crate::process::resources::ResourceTable;
use crate::process::table::ProcessTable;
use crate::process::types::{Process, ProcessState};

/// Current process, ready queue and resource table of one run
///
/// Every structure is owned here and mutated only through `&mut` access
/// from the active scheduling step. Queues store PIDs; the process data
/// itself lives in `processes`, so moving a process between queues never
/// touches the process record beyond its `state`.
#[derive(Debug, Clone)]
pub struct SchedContext {
    pub(super) processes: ProcessTable,
    pub(super) ready: ProcessQueue,
    pub(super) resources: ResourceTable,
    pub(super) current: Option<Pid>,
    pub(super) max_prio: Priority,
    pub(super) restore_priority_on_release: bool,
    pub(super) stats: SchedulerStats,
}

impl SchedContext {
    pub(super) fn new(config: &SchedulerConfig) -> Self {
        Self {
            processes: ProcessTable::new(),
            ready: ProcessQueue::new(),
            resources: ResourceTable::new(config.nr_resources),
            current: None,
            max_prio: config.max_prio,
            restore_priority_on_release: config.restore_priority_on_release,
            stats: SchedulerStats::new(config.policy),
        }
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    pub fn ready(&self) -> &ProcessQueue {
        &self.ready
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    pub fn max_prio(&self) -> Priority {
        self.max_prio
    }

    /// The process on whose behalf `operation` is invoked
    pub(super) fn running_pid(&self, operation: &str) -> SchedResult<Pid> {
        let no_current = || SchedulerError::NoCurrentProcess {
            operation: operation.to_string(),
        };
        let pid = self.current.ok_or_else(no_current)?;
        if self.processes.require(pid)?.is_running() {
            Ok(pid)
        } else {
            Err(no_current())
        }
    }

    /// The previous process, if it may keep the CPU: it exists, did not
    /// block, and has lifespan left
    pub(super) fn runnable_current(&self) -> Option<Pid> {
        let pid = self.current?;
        let process = self.processes.get(pid)?;
        (process.is_running() && !process.is_finished()).then_some(pid)
    }

    #[inline]
    pub(super) fn process(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(pid)
    }

    pub(super) fn priority_of(&self, pid: Pid) -> Priority {
        self.processes.get(pid).map_or(0, |p| p.priority)
    }

    /// Put a process back at the ready-queue tail
    pub(super) fn requeue(&mut self, pid: Pid) {
        if let Some(process) = self.processes.get_mut(pid) {
            process.state = ProcessState::Ready;
        }
        self.ready.push_back(pid);
    }

    /// Detach the ready-queue entry at `index`
    #[inline]
    pub(super) fn take_ready(&mut self, index: usize) -> Option<Pid> {
        self.ready.remove_at(index)
    }

    /// Park `pid` at the tail of a resource's wait list
    pub(super) fn block_on(&mut self, pid: Pid, resource: ResourceId) -> SchedResult<()> {
        self.processes.require_mut(pid)?.state = ProcessState::Blocked;
        self.resources.get_mut(resource)?.waitqueue.push_back(pid);
        self.stats.blocked += 1;
        Ok(())
    }

    /// Move a waiter that was already detached from its wait list to the
    /// ready-queue tail
    pub(super) fn wake(&mut self, pid: Pid) -> SchedResult<()> {
        let process = self.processes.require_mut(pid)?;
        if !process.is_blocked() {
            return Err(SchedulerError::InvariantViolation(format!(
                "woke process {pid} in state {:?}",
                process.state
            )));
        }
        process.state = ProcessState::Ready;
        self.ready.push_back(pid);
        self.stats.wakeups += 1;
        Ok(())
    }

    pub(super) fn grant(&mut self, resource: ResourceId, pid: Pid) -> SchedResult<()> {
        self.resources.get_mut(resource)?.owner = Some(pid);
        self.stats.acquisitions += 1;
        Ok(())
    }

    /// Clear ownership of `resource`, which the running process must hold
    pub(super) fn disown(&mut self, resource: ResourceId) -> SchedResult<Pid> {
        let caller = self.running_pid("release")?;
        let entry = self.resources.get_mut(resource)?;
        if entry.owner != Some(caller) {
            return Err(SchedulerError::NotOwner {
                resource,
                caller,
                owner: entry.owner,
            });
        }
        entry.owner = None;
        self.stats.releases += 1;
        Ok(caller)
    }

    /// Earliest-inserted waiter
    pub(super) fn take_first_waiter(&mut self, resource: ResourceId) -> SchedResult<Option<Pid>> {
        Ok(self.resources.get_mut(resource)?.waitqueue.pop_front())
    }

    /// Highest-priority waiter, earliest-inserted among equals
    pub(super) fn take_top_waiter(&mut self, resource: ResourceId) -> SchedResult<Option<Pid>> {
        let processes = &self.processes;
        let waitqueue = &mut self.resources.get_mut(resource)?.waitqueue;
        let position =
            waitqueue.max_position_by_key(|pid| processes.get(pid).map_or(0, |p| p.priority));
        Ok(position.and_then(|index| waitqueue.remove_at(index)))
    }

    /// Raise `pid` to `priority`; never lowers
    pub(super) fn elevate(&mut self, pid: Pid, priority: Priority) -> SchedResult<()> {
        let process = self.processes.require_mut(pid)?;
        if priority > process.priority {
            process.priority = priority;
            self.stats.priority_boosts += 1;
        }
        Ok(())
    }

    pub(super) fn reset_priority(&mut self, pid: Pid) -> SchedResult<()> {
        self.processes.require_mut(pid)?.reset_priority();
        Ok(())
    }
}
