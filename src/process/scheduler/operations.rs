/*!
 * Scheduler Core Operations
 * Lifecycle hooks, process creation, schedule, acquire/release, tick and exit
 */

use super::traits::PolicyOps;
use super::Scheduler;
use crate::core::errors::{SchedResult, SchedulerError};
use crate::core::types::{Pid, Priority, ResourceId, Tick};
use crate::process::types::{Process, ProcessState};
use tracing::{debug, info};

impl Scheduler {
    /// Run the policy's setup hook; call once before the first tick
    pub fn initialize(&mut self) -> SchedResult<()> {
        self.policy.initialize(&mut self.ctx)?;
        self.initialized = true;
        Ok(())
    }

    /// Run the policy's teardown hook
    pub fn finalize(&mut self) {
        if !self.initialized {
            return;
        }
        self.policy.finalize(&mut self.ctx);
        self.initialized = false;
        let stats = self.ctx.stats;
        info!(
            policy = %self.policy.name(),
            scheduled = stats.total_scheduled,
            context_switches = stats.context_switches,
            preemptions = stats.preemptions,
            blocked = stats.blocked,
            "Scheduler finalized"
        );
    }

    /// Add an unnamed process to the ready-queue tail
    pub fn spawn(&mut self, lifespan: Tick, priority: Priority) -> SchedResult<Pid> {
        self.fork(None, lifespan, priority)
    }

    /// Add a named process to the ready-queue tail
    pub fn create_process(
        &mut self,
        name: impl Into<String>,
        lifespan: Tick,
        priority: Priority,
    ) -> SchedResult<Pid> {
        self.fork(Some(name.into()), lifespan, priority)
    }

    fn fork(&mut self, name: Option<String>, lifespan: Tick, priority: Priority) -> SchedResult<Pid> {
        if lifespan == 0 {
            return Err(SchedulerError::InvalidWorkload(
                "lifespan must be at least one tick".to_string(),
            ));
        }
        if priority >= self.ctx.max_prio {
            return Err(SchedulerError::InvalidPriority {
                priority,
                max: self.ctx.max_prio,
            });
        }

        let pid = self.ctx.processes.insert(name, lifespan, priority);
        self.ctx.ready.push_back(pid);
        self.ctx.stats.created += 1;
        info!(pid, lifespan, priority, "Process forked");
        Ok(pid)
    }

    /// Pick the process to run this tick
    ///
    /// Returns `None` when nothing is runnable. A previous process that
    /// finished its lifespan and was not reaped yet is marked terminated here
    /// and never returned again.
    pub fn schedule(&mut self) -> Option<Pid> {
        let previous = self.ctx.current;
        let continuing = self.ctx.runnable_current();
        let next = self.policy.schedule(&mut self.ctx);

        if let Some(prev) = previous.filter(|&prev| Some(prev) != next) {
            if let Some(process) = self.ctx.processes.get_mut(prev) {
                if process.is_running() && process.is_finished() {
                    process.state = ProcessState::Terminated;
                }
            }
        }
        if continuing.is_some_and(|prev| Some(prev) != next) {
            self.ctx.stats.preemptions += 1;
        }

        self.ctx.current = next;
        let pid = match next {
            Some(pid) => pid,
            None => {
                debug!(policy = %self.policy, "No runnable process");
                return None;
            }
        };

        if let Some(process) = self.ctx.processes.get_mut(pid) {
            process.state = ProcessState::Running;
        }
        self.ctx.stats.total_scheduled += 1;
        if previous != Some(pid) {
            self.ctx.stats.context_switches += 1;
        }
        debug!(pid, previous = ?previous, policy = %self.policy, "Scheduled");
        Some(pid)
    }

    /// Request `resource` for the running process
    ///
    /// `Ok(false)` leaves the caller BLOCKED; call [`schedule`](Self::schedule)
    /// again to pick a replacement.
    pub fn acquire(&mut self, resource: ResourceId) -> SchedResult<bool> {
        let pid = self.ctx.running_pid("acquire")?;
        let owner = self.ctx.resources.get(resource)?.owner;

        let granted = self.policy.acquire(&mut self.ctx, resource)?;
        if granted {
            debug!(pid, resource, "Resource acquired");
        } else {
            debug!(pid, resource, owner = ?owner, "Blocked on resource");
        }
        Ok(granted)
    }

    /// Release `resource`, which the running process must own
    ///
    /// Returns the waiter promoted to the ready queue, if any.
    pub fn release(&mut self, resource: ResourceId) -> SchedResult<Option<Pid>> {
        let woken = self.policy.release(&mut self.ctx, resource)?;
        debug!(pid = ?self.ctx.current, resource, woken = ?woken, "Resource released");
        Ok(woken)
    }

    /// Charge one tick to the running process. Returns its new age.
    pub fn tick(&mut self) -> SchedResult<Tick> {
        let pid = self.ctx.running_pid("tick")?;
        let process = self.ctx.processes.require_mut(pid)?;
        if process.is_finished() {
            return Err(SchedulerError::LifespanExceeded {
                pid,
                lifespan: process.lifespan,
            });
        }
        process.age += 1;
        Ok(process.age)
    }

    /// Reap a finished process, removing it from every structure
    pub fn exit(&mut self, pid: Pid) -> SchedResult<Process> {
        let process = self.ctx.processes.require(pid)?;
        if !process.is_finished() {
            return Err(SchedulerError::InvariantViolation(format!(
                "process {pid} reaped at age {} of {}",
                process.age, process.lifespan
            )));
        }
        if !matches!(
            process.state,
            ProcessState::Running | ProcessState::Terminated
        ) {
            return Err(SchedulerError::InvariantViolation(format!(
                "process {pid} reaped while {:?}",
                process.state
            )));
        }

        let held = self.ctx.resources.held_by(pid);
        if !held.is_empty() {
            return Err(SchedulerError::StillHoldingResources {
                pid,
                resources: held,
            });
        }

        if self.ctx.current == Some(pid) {
            self.ctx.current = None;
        }
        let mut process = self
            .ctx
            .processes
            .remove(pid)
            .ok_or(SchedulerError::ProcessNotFound(pid))?;
        process.state = ProcessState::Terminated;
        self.ctx.stats.terminated += 1;
        info!(pid, lifespan = process.lifespan, "Process exited");
        Ok(process)
    }

    /// Currently running (or just blocked) process
    pub fn current(&self) -> Option<Pid> {
        self.ctx.current
    }

    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.ctx.processes.get(pid)
    }

    /// Live processes in PID order
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.ctx.processes.iter()
    }

    /// Ready-queue contents, head first
    pub fn ready_pids(&self) -> Vec<Pid> {
        self.ctx.ready.to_vec()
    }

    /// Wait list of `resource`, earliest request first
    pub fn waiters(&self, resource: ResourceId) -> SchedResult<Vec<Pid>> {
        Ok(self.ctx.resources.get(resource)?.waitqueue.to_vec())
    }

    pub fn owner(&self, resource: ResourceId) -> SchedResult<Option<Pid>> {
        Ok(self.ctx.resources.get(resource)?.owner)
    }

    pub fn held_by(&self, pid: Pid) -> Vec<ResourceId> {
        self.ctx.resources.held_by(pid)
    }

    pub fn blocked_pids(&self) -> Vec<Pid> {
        self.ctx
            .processes
            .iter()
            .filter(|p| p.is_blocked())
            .map(|p| p.pid)
            .collect()
    }

    /// Number of live processes
    pub fn len(&self) -> usize {
        self.ctx.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctx.processes.is_empty()
    }
}
