/*!
 * Workload Model
 * Serde-loadable process scripts fed to the simulator
 */

use crate::core::config::SchedulerConfig;
use crate::core::errors::{SchedResult, SchedulerError};
use crate::core::types::{Priority, ResourceId, Tick};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One resource request in a process script
///
/// The process asks for `resource` when its age reaches `at` and gives it
/// back once its age reaches `at + duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub resource: ResourceId,
    pub at: Tick,
    pub duration: Tick,
}

impl ResourceRequest {
    /// Age at which the resource is released; `None` if it overflows `Tick`
    #[inline]
    pub const fn release_at(&self) -> Option<Tick> {
        self.at.checked_add(self.duration)
    }

    /// An unrepresentable end is treated as never releasing
    fn overlaps(&self, other: &ResourceRequest) -> bool {
        let end = |r: &ResourceRequest| r.release_at().unwrap_or(Tick::MAX);
        self.resource == other.resource && self.at < end(other) && other.at < end(self)
    }
}

/// A process to fork at `arrival`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub arrival: Tick,
    pub lifespan: Tick,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requests: Vec<ResourceRequest>,
}

impl ProcessSpec {
    pub fn new(lifespan: Tick) -> Self {
        Self {
            name: None,
            arrival: 0,
            lifespan,
            priority: 0,
            requests: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn arriving(mut self, arrival: Tick) -> Self {
        self.arrival = arrival;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn request(mut self, resource: ResourceId, at: Tick, duration: Tick) -> Self {
        self.requests.push(ResourceRequest {
            resource,
            at,
            duration,
        });
        self
    }

    fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => format!("process {index} ({name})"),
            None => format!("process {index}"),
        }
    }

    fn validate(&self, index: usize, config: &SchedulerConfig) -> SchedResult<()> {
        let invalid = |reason: String| {
            Err(SchedulerError::InvalidWorkload(format!(
                "{}: {reason}",
                self.label(index)
            )))
        };

        if self.lifespan == 0 {
            return invalid("lifespan must be at least one tick".to_string());
        }
        if self.priority >= config.max_prio {
            return invalid(format!(
                "priority {} must be below {}",
                self.priority, config.max_prio
            ));
        }

        for (i, request) in self.requests.iter().enumerate() {
            if request.resource >= config.nr_resources {
                return invalid(format!(
                    "resource {} out of range (system has {})",
                    request.resource, config.nr_resources
                ));
            }
            if request.duration == 0 {
                return invalid(format!(
                    "request for resource {} holds it for zero ticks",
                    request.resource
                ));
            }
            let Some(release_at) = request.release_at() else {
                return invalid(format!(
                    "request for resource {} at age {} for {} ticks overflows",
                    request.resource, request.at, request.duration
                ));
            };
            if release_at > self.lifespan {
                return invalid(format!(
                    "request for resource {} ends at age {release_at} past lifespan {}",
                    request.resource, self.lifespan
                ));
            }
            if let Some(other) = self.requests[..i].iter().find(|o| o.overlaps(request)) {
                return invalid(format!(
                    "requests for resource {} overlap at ages {} and {}",
                    request.resource, other.at, request.at
                ));
            }
        }
        Ok(())
    }
}

/// Processes fed to one simulation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub processes: Vec<ProcessSpec>,
}

impl Workload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(mut self, spec: ProcessSpec) -> Self {
        self.processes.push(spec);
        self
    }

    /// Parse a workload from JSON text
    pub fn from_json(text: &str) -> SchedResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| SchedulerError::InvalidWorkload(format!("malformed JSON: {e}")))
    }

    /// Read and parse a workload file
    pub fn load(path: impl AsRef<Path>) -> SchedResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SchedulerError::InvalidWorkload(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> SchedResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SchedulerError::InvalidWorkload(format!("cannot encode workload: {e}")))
    }

    /// Check every process against the limits of `config`
    pub fn validate(&self, config: &SchedulerConfig) -> SchedResult<()> {
        self.processes
            .iter()
            .enumerate()
            .try_for_each(|(index, spec)| spec.validate(index, config))
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Last arrival tick, if any process is listed
    pub fn last_arrival(&self) -> Option<Tick> {
        self.processes.iter().map(|p| p.arrival).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            nr_resources: 4,
            max_prio: 10,
            ..SchedulerConfig::default()
        }
    }

    #[test]
    fn test_parse_with_defaults() {
        let workload = Workload::from_json(
            r#"{"processes": [
                {"lifespan": 3},
                {"name": "H", "arrival": 2, "lifespan": 4, "priority": 5,
                 "requests": [{"resource": 1, "at": 0, "duration": 2}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            workload,
            Workload::new()
                .with_process(ProcessSpec::new(3))
                .with_process(
                    ProcessSpec::new(4)
                        .named("H")
                        .arriving(2)
                        .priority(5)
                        .request(1, 0, 2)
                )
        );
        assert_eq!(workload.last_arrival(), Some(2));
        assert!(workload.validate(&config()).is_ok());
    }

    #[test]
    fn test_malformed_json() {
        let err = Workload::from_json("{\"processes\": [{}]}").unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidWorkload(_)));
    }

    #[test]
    fn test_rejects_zero_lifespan() {
        let workload = Workload::new().with_process(ProcessSpec::new(0));
        assert!(workload.validate(&config()).is_err());
    }

    #[test]
    fn test_rejects_ceiling_priority() {
        let workload = Workload::new().with_process(ProcessSpec::new(1).priority(10));
        assert!(workload.validate(&config()).is_err());
    }

    #[test]
    fn test_rejects_request_past_lifespan() {
        let workload = Workload::new().with_process(ProcessSpec::new(3).request(0, 2, 2));
        assert!(workload.validate(&config()).is_err());

        let fits = Workload::new().with_process(ProcessSpec::new(4).request(0, 2, 2));
        assert!(fits.validate(&config()).is_ok());
    }

    #[test]
    fn test_release_age_is_checked() {
        let request = ResourceRequest {
            resource: 0,
            at: Tick::MAX,
            duration: 1,
        };
        assert_eq!(request.release_at(), None);
        assert!(request.overlaps(&ResourceRequest {
            resource: 0,
            at: Tick::MAX - 1,
            duration: 2,
        }));

        let workload = Workload::new().with_process(ProcessSpec::new(5).request(0, Tick::MAX, 1));
        let err = workload.validate(&config()).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_rejects_unknown_resource() {
        let workload = Workload::new().with_process(ProcessSpec::new(3).request(4, 0, 1));
        let err = workload.validate(&config()).unwrap_err();
        assert!(err.to_string().contains("resource 4 out of range"));
    }

    #[test]
    fn test_rejects_overlapping_requests() {
        let overlapping = ProcessSpec::new(6).request(0, 0, 3).request(0, 2, 2);
        assert!(Workload::new()
            .with_process(overlapping)
            .validate(&config())
            .is_err());

        let back_to_back = ProcessSpec::new(6).request(0, 0, 3).request(0, 3, 2);
        assert!(Workload::new()
            .with_process(back_to_back)
            .validate(&config())
            .is_ok());

        let nested_distinct = ProcessSpec::new(6).request(0, 0, 4).request(1, 1, 2);
        assert!(Workload::new()
            .with_process(nested_distinct)
            .validate(&config())
            .is_ok());
    }
}
