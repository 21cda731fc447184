/*!
 * Resource Table
 * Exclusively-owned resources with per-resource wait lists
 */

use super::queue::ProcessQueue;
use crate::core::errors::{SchedResult, SchedulerError};
use crate::core::types::{Pid, ResourceId};
use serde::Serialize;

/// A single exclusive resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub id: ResourceId,
    /// Back-reference to the holder; the table never owns processes
    pub owner: Option<Pid>,
    /// BLOCKED processes in request order
    pub waitqueue: ProcessQueue,
}

impl Resource {
    fn new(id: ResourceId) -> Self {
        Self {
            id,
            owner: None,
            waitqueue: ProcessQueue::new(),
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }
}

/// Fixed-size table of `NR_RESOURCES` resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResourceTable {
    resources: Vec<Resource>,
}

impl ResourceTable {
    pub fn new(nr_resources: usize) -> Self {
        Self {
            resources: (0..nr_resources).map(Resource::new).collect(),
        }
    }

    pub fn get(&self, id: ResourceId) -> SchedResult<&Resource> {
        let limit = self.resources.len();
        self.resources
            .get(id)
            .ok_or(SchedulerError::ResourceOutOfRange { resource: id, limit })
    }

    pub fn get_mut(&mut self, id: ResourceId) -> SchedResult<&mut Resource> {
        let limit = self.resources.len();
        self.resources
            .get_mut(id)
            .ok_or(SchedulerError::ResourceOutOfRange { resource: id, limit })
    }

    /// Resource ids currently owned by `pid`, ascending
    pub fn held_by(&self, pid: Pid) -> Vec<ResourceId> {
        self.resources
            .iter()
            .filter(|r| r.owner == Some(pid))
            .map(|r| r.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
