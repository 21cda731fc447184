/*!
 * Simulation Engine
 * Deterministic tick loop driving a scheduler through a workload
 */

use super::trace::{Trace, TraceKind};
use super::workload::{ProcessSpec, ResourceRequest, Workload};
use crate::core::config::SchedulerConfig;
use crate::core::errors::{SchedResult, SchedulerError};
use crate::core::types::{Pid, ResourceId, Tick};
use crate::monitoring::{span_run, span_tick};
use crate::process::{Scheduler, SchedulerStats, SchedulingPolicy};
use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every process ran to completion
    Completed,
    /// Nothing runnable, nothing left to arrive, and these processes wait
    /// on resources forever
    Deadlocked { blocked: Vec<Pid> },
    /// `max_ticks` elapsed with this many processes still live or pending
    TickLimit { remaining: usize },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

/// Result of one simulation run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub policy: SchedulingPolicy,
    pub outcome: RunOutcome,
    /// Ticks simulated, idle ones included
    pub ticks: Tick,
    pub idle_ticks: Tick,
    pub stats: SchedulerStats,
    pub timeline: Vec<Option<Pid>>,
    #[serde(skip)]
    pub trace: Trace,
}

/// Per-process request cursor
#[derive(Debug)]
struct Script {
    requests: Vec<ResourceRequest>,
    next: usize,
    /// Held resources with the age at which each is released
    held: Vec<(ResourceId, Tick)>,
}

impl Script {
    fn new(spec: &ProcessSpec) -> Self {
        let mut requests = spec.requests.clone();
        requests.sort_by_key(|r| r.at);
        Self {
            requests,
            next: 0,
            held: Vec::new(),
        }
    }

    /// Next request that is due at `age`
    fn due(&self, age: Tick) -> Option<ResourceRequest> {
        self.requests.get(self.next).copied().filter(|r| r.at <= age)
    }

    /// Held resources whose release age has been reached, in acquire order
    fn take_expired(&mut self, age: Tick) -> Vec<ResourceId> {
        let mut expired = Vec::new();
        self.held.retain(|&(resource, release_at)| {
            if release_at <= age {
                expired.push(resource);
                false
            } else {
                true
            }
        });
        expired
    }
}

/// Drives a [`Scheduler`] through a [`Workload`]
///
/// Each tick: fork arrivals, schedule, perform due acquires (scheduling
/// again whenever one blocks), run the chosen process for one tick, perform
/// due releases and reap it if finished.
pub struct Simulator {
    config: SchedulerConfig,
    scheduler: Scheduler,
    /// Specs sorted by arrival; forked in that order
    pending: Vec<ProcessSpec>,
    next_arrival: usize,
    scripts: AHashMap<Pid, Script>,
    trace: Trace,
    idle_ticks: Tick,
}

impl Simulator {
    /// Validate `config` and `workload` and build a fresh scheduler
    pub fn new(config: SchedulerConfig, workload: Workload) -> SchedResult<Self> {
        config.validate()?;
        workload.validate(&config)?;

        let mut pending = workload.processes;
        pending.sort_by_key(|spec| spec.arrival);

        Ok(Self {
            scheduler: Scheduler::with_config(config.clone())?,
            config,
            scripts: AHashMap::with_capacity(pending.len()),
            pending,
            next_arrival: 0,
            trace: Trace::new(),
            idle_ticks: 0,
        })
    }

    /// Run until completion, deadlock or the tick limit
    pub fn run(mut self) -> SchedResult<RunReport> {
        let policy = self.scheduler.policy();
        let run_span = span_run(policy, self.pending.len());
        let _entered = run_span.enter();

        self.scheduler.initialize()?;
        let mut tick: Tick = 0;
        let outcome = loop {
            if tick >= self.config.max_ticks {
                let remaining = self.scheduler.len() + self.pending.len() - self.next_arrival;
                warn!(tick, remaining, "Tick limit reached");
                break RunOutcome::TickLimit { remaining };
            }

            self.fork_arrivals(tick)?;
            if self.scheduler.is_empty() && !self.has_pending() {
                break RunOutcome::Completed;
            }

            if let Some(outcome) = self.step(tick)? {
                break outcome;
            }
            if self.config.check_invariants {
                self.scheduler.check_invariants()?;
            }
            tick += 1;
        };
        self.scheduler.finalize();

        run_span.record("outcome", tracing::field::debug(&outcome));
        info!(policy = %policy, ticks = tick, idle = self.idle_ticks, outcome = ?outcome, "Simulation finished");

        Ok(RunReport {
            policy,
            outcome,
            ticks: tick,
            idle_ticks: self.idle_ticks,
            stats: self.scheduler.stats(),
            timeline: self.trace.timeline(),
            trace: self.trace,
        })
    }

    /// Simulate one tick; `Some` ends the run
    fn step(&mut self, tick: Tick) -> SchedResult<Option<RunOutcome>> {
        let span = span_tick(tick);
        let _entered = span.enter();

        let Some(pid) = self.dispatch(tick)? else {
            if !self.has_pending() {
                let blocked = self.scheduler.blocked_pids();
                warn!(tick, blocked = ?blocked, "Deadlock: every remaining process is blocked");
                return Ok(Some(RunOutcome::Deadlocked { blocked }));
            }
            debug!(tick, "Idle");
            self.trace.record(tick, TraceKind::Idle);
            self.idle_ticks += 1;
            return Ok(None);
        };
        span.record("pid", pid);

        let priority = self
            .scheduler
            .process(pid)
            .map(|p| p.priority)
            .ok_or(SchedulerError::ProcessNotFound(pid))?;
        let age = self.scheduler.tick()?;
        self.trace.record(tick, TraceKind::Ran { pid, priority });

        self.release_expired(tick, pid, age)?;
        if self.scheduler.process(pid).is_some_and(|p| p.is_finished()) {
            self.scheduler.exit(pid)?;
            self.scripts.remove(&pid);
            self.trace.record(tick, TraceKind::Exited { pid });
        }
        Ok(None)
    }

    /// Schedule until a process is picked whose due acquires all succeed
    fn dispatch(&mut self, tick: Tick) -> SchedResult<Option<Pid>> {
        while let Some(pid) = self.scheduler.schedule() {
            if self.acquire_due(tick, pid)? {
                return Ok(Some(pid));
            }
        }
        Ok(None)
    }

    /// `false` when `pid` blocked on one of its due requests
    fn acquire_due(&mut self, tick: Tick, pid: Pid) -> SchedResult<bool> {
        let age = self.scheduler.process(pid).map_or(0, |p| p.age);
        let script = self
            .scripts
            .get_mut(&pid)
            .ok_or(SchedulerError::ProcessNotFound(pid))?;

        while let Some(request) = script.due(age) {
            let resource = request.resource;
            let owner = self.scheduler.owner(resource)?;
            if !self.scheduler.acquire(resource)? {
                self.trace.record(
                    tick,
                    TraceKind::Blocked {
                        pid,
                        resource,
                        owner,
                    },
                );
                return Ok(false);
            }
            let release_at = request.release_at().ok_or_else(|| {
                SchedulerError::InvalidWorkload(format!(
                    "process {pid}: release age of resource {resource} overflows"
                ))
            })?;
            script.next += 1;
            script.held.push((resource, release_at));
            self.trace.record(tick, TraceKind::Acquired { pid, resource });
        }
        Ok(true)
    }

    fn release_expired(&mut self, tick: Tick, pid: Pid, age: Tick) -> SchedResult<()> {
        let expired = match self.scripts.get_mut(&pid) {
            Some(script) => script.take_expired(age),
            None => return Ok(()),
        };
        for resource in expired {
            let woken = self.scheduler.release(resource)?;
            self.trace.record(
                tick,
                TraceKind::Released {
                    pid,
                    resource,
                    woken,
                },
            );
        }
        Ok(())
    }

    fn fork_arrivals(&mut self, tick: Tick) -> SchedResult<()> {
        while let Some(spec) = self.pending.get(self.next_arrival) {
            if spec.arrival > tick {
                break;
            }
            let pid = match &spec.name {
                Some(name) => {
                    self.scheduler
                        .create_process(name.clone(), spec.lifespan, spec.priority)?
                }
                None => self.scheduler.spawn(spec.lifespan, spec.priority)?,
            };
            self.scripts.insert(pid, Script::new(spec));
            self.trace.record(
                tick,
                TraceKind::Forked {
                    pid,
                    lifespan: spec.lifespan,
                    priority: spec.priority,
                },
            );
            self.next_arrival += 1;
        }
        Ok(())
    }

    fn has_pending(&self) -> bool {
        self.next_arrival < self.pending.len()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(policy: SchedulingPolicy, workload: Workload) -> RunReport {
        let config = SchedulerConfig {
            check_invariants: true,
            ..SchedulerConfig::with_policy(policy)
        };
        Simulator::new(config, workload).unwrap().run().unwrap()
    }

    #[test]
    fn test_empty_workload_completes_immediately() {
        let report = run(SchedulingPolicy::Fcfs, Workload::new());
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.ticks, 0);
        assert!(report.trace.is_empty());
    }

    #[test]
    fn test_idle_until_arrival() {
        let workload = Workload::new().with_process(ProcessSpec::new(2).arriving(3));
        let report = run(SchedulingPolicy::Fcfs, workload);

        assert_eq!(report.timeline, vec![None, None, None, Some(1), Some(1)]);
        assert_eq!(report.idle_ticks, 3);
        assert_eq!(report.ticks, 5);
    }

    #[test]
    fn test_deadlock_is_reported() {
        // A holds R0 and wants R1; B holds R1 and wants R0.
        let workload = Workload::new()
            .with_process(ProcessSpec::new(4).request(0, 0, 4).request(1, 1, 2))
            .with_process(ProcessSpec::new(4).request(1, 0, 4).request(0, 1, 2));
        let report = run(SchedulingPolicy::RoundRobin, workload);

        assert_eq!(report.outcome, RunOutcome::Deadlocked { blocked: vec![1, 2] });
        assert_eq!(report.timeline, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_tick_limit() {
        let config = SchedulerConfig {
            max_ticks: 3,
            ..SchedulerConfig::default()
        };
        let workload = Workload::new()
            .with_process(ProcessSpec::new(5))
            .with_process(ProcessSpec::new(1).arriving(10));
        let report = Simulator::new(config, workload).unwrap().run().unwrap();

        assert_eq!(report.outcome, RunOutcome::TickLimit { remaining: 2 });
        assert_eq!(report.ticks, 3);
    }

    #[test]
    fn test_invalid_workload_is_rejected() {
        let workload = Workload::new().with_process(ProcessSpec::new(2).request(40, 0, 1));
        let err = Simulator::new(SchedulerConfig::default(), workload)
            .err()
            .unwrap();
        assert!(matches!(err, SchedulerError::InvalidWorkload(_)));
    }

    #[test]
    fn test_report_serializes_outcome() {
        let report = run(
            SchedulingPolicy::Sjf,
            Workload::new().with_process(ProcessSpec::new(1)),
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["outcome"]["status"], "completed");
        assert_eq!(value["policy"], "sjf");
        assert_eq!(value["timeline"], serde_json::json!([1]));
        assert!(value.get("trace").is_none());
    }
}
