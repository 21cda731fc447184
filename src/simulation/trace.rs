/*!
 * Simulation Trace
 * Ordered record of every scheduling and resource event in a run
 */

use crate::core::types::{Pid, Priority, ResourceId, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single event, stamped with the tick it happened in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub tick: Tick,
    #[serde(flatten)]
    pub kind: TraceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceKind {
    /// A process arrived and joined the ready queue
    Forked {
        pid: Pid,
        lifespan: Tick,
        priority: Priority,
    },
    /// A process executed this tick at the given effective priority
    Ran { pid: Pid, priority: Priority },
    /// Nothing was runnable
    Idle,
    Acquired { pid: Pid, resource: ResourceId },
    /// An acquire failed; the process now waits on `resource`
    Blocked {
        pid: Pid,
        resource: ResourceId,
        owner: Option<Pid>,
    },
    Released {
        pid: Pid,
        resource: ResourceId,
        woken: Option<Pid>,
    },
    Exited { pid: Pid },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tick {:>6}] ", self.tick)?;
        match &self.kind {
            TraceKind::Forked {
                pid,
                lifespan,
                priority,
            } => write!(f, "FORK     pid={pid} lifespan={lifespan} prio={priority}"),
            TraceKind::Ran { pid, priority } => write!(f, "RUN      pid={pid} prio={priority}"),
            TraceKind::Idle => write!(f, "IDLE"),
            TraceKind::Acquired { pid, resource } => {
                write!(f, "ACQUIRE  pid={pid} resource={resource}")
            }
            TraceKind::Blocked {
                pid,
                resource,
                owner,
            } => match owner {
                Some(owner) => write!(f, "BLOCK    pid={pid} resource={resource} owner={owner}"),
                None => write!(f, "BLOCK    pid={pid} resource={resource}"),
            },
            TraceKind::Released {
                pid,
                resource,
                woken,
            } => match woken {
                Some(woken) => write!(f, "RELEASE  pid={pid} resource={resource} woke={woken}"),
                None => write!(f, "RELEASE  pid={pid} resource={resource}"),
            },
            TraceKind::Exited { pid } => write!(f, "EXIT     pid={pid}"),
        }
    }
}

/// A complete run trace in chronological order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, tick: Tick, kind: TraceKind) {
        self.events.push(TraceEvent { tick, kind });
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Who ran on each tick; `None` for idle ticks
    pub fn timeline(&self) -> Vec<Option<Pid>> {
        self.events
            .iter()
            .filter_map(|event| match event.kind {
                TraceKind::Ran { pid, .. } => Some(Some(pid)),
                TraceKind::Idle => Some(None),
                _ => None,
            })
            .collect()
    }

    /// Effective priority of `pid` on each tick it ran
    pub fn priorities(&self, pid: Pid) -> Vec<(Tick, Priority)> {
        self.events
            .iter()
            .filter_map(|event| match event.kind {
                TraceKind::Ran { pid: p, priority } if p == pid => Some((event.tick, priority)),
                _ => None,
            })
            .collect()
    }

    /// Ticks executed by `pid`
    pub fn run_count(&self, pid: Pid) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Ran { pid: p, .. } if p == pid))
            .count()
    }

    pub fn idle_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Idle))
            .count()
    }

    /// Pretty-print the trace to stderr
    pub fn dump(&self) {
        eprint!("{self}");
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{event}")?;
        }
        Ok(())
    }
}
