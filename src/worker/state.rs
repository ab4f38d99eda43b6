//! Shared state container.
//!
//! One instance per worker, created by the `init` event and owned by the
//! worker thread for the rest of its life. Pure storage: the handlers mutate
//! it, the step loop reads it. The consumer never holds a reference to any of
//! this, only the string/numeric identifiers used as keys.

use std::collections::HashMap;

use rapier3d::prelude::RigidBodyHandle;

use crate::physics::{ConstraintEntry, PhysicsWorld, Spring, VehicleInstance};
use crate::protocol::{
    Broadphase, InitParams, MaterialParams, RayParams, SubscriptionTarget,
};

/// Simulation parameters. Fixed at init, except for the handful of values the
/// protocol exposes setters for (gravity, timestep, tolerance, broadphase,
/// axis index).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub gravity: [f32; 3],
    pub delta: f32,
    pub max_sub_steps: u32,
    pub broadphase: Broadphase,
    pub solver_iterations: u32,
    pub tolerance: f32,
    pub allow_sleep: bool,
    pub axis_index: u32,
    pub default_contact_material: MaterialParams,
}

impl From<&InitParams> for WorkerConfig {
    fn from(params: &InitParams) -> Self {
        Self {
            gravity: params.gravity,
            delta: params.delta,
            max_sub_steps: params.max_sub_steps,
            broadphase: params.broadphase,
            solver_iterations: params.solver_iterations,
            tolerance: params.tolerance,
            allow_sleep: params.allow_sleep,
            axis_index: params.axis_index,
            default_contact_material: params.default_contact_material,
        }
    }
}

/// Identifier-keyed body registry with stable creation order.
///
/// The order defines each body's slot in the transfer buffers, so removal
/// keeps the remaining entries in sequence instead of swapping the tail in.
#[derive(Default)]
pub struct BodyRegistry {
    order: Vec<String>,
    map: HashMap<String, RigidBodyHandle>,
}

impl BodyRegistry {
    pub fn insert(&mut self, uuid: String, handle: RigidBodyHandle) {
        if self.map.insert(uuid.clone(), handle).is_none() {
            self.order.push(uuid);
        }
    }

    pub fn remove(&mut self, uuid: &str) -> Option<RigidBodyHandle> {
        let handle = self.map.remove(uuid)?;
        self.order.retain(|existing| existing != uuid);
        Some(handle)
    }

    pub fn get(&self, uuid: &str) -> Option<RigidBodyHandle> {
        self.map.get(uuid).copied()
    }

    pub fn uuid_of(&self, handle: RigidBodyHandle) -> Option<&str> {
        self.map
            .iter()
            .find(|(_, &existing)| existing == handle)
            .map(|(uuid, _)| uuid.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate `(uuid, handle)` in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RigidBodyHandle)> + '_ {
        self.order.iter().map(move |uuid| (uuid.as_str(), self.map[uuid]))
    }

    /// Current index-to-identifier mapping, in buffer order.
    pub fn uuids(&self) -> Vec<String> {
        self.order.clone()
    }
}

/// One registered observation request.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub uuid: String,
    pub property: String,
    pub target: SubscriptionTarget,
}

/// Everything a worker owns.
pub struct SharedState {
    pub config: WorkerConfig,
    pub world: PhysicsWorld,
    pub bodies: BodyRegistry,
    pub constraints: HashMap<String, ConstraintEntry>,
    pub springs: HashMap<String, Spring>,
    pub vehicles: HashMap<String, VehicleInstance>,
    pub rays: HashMap<String, RayParams>,
    pub subscriptions: HashMap<u32, Subscription>,
    /// Set when the identifier-to-index mapping changes; cleared once the
    /// roster has been reported in a frame.
    pub bodies_need_syncing: bool,
}

impl SharedState {
    pub fn new(params: &InitParams) -> Self {
        Self {
            config: WorkerConfig::from(params),
            world: PhysicsWorld::new(params),
            bodies: BodyRegistry::default(),
            constraints: HashMap::new(),
            springs: HashMap::new(),
            vehicles: HashMap::new(),
            rays: HashMap::new(),
            subscriptions: HashMap::new(),
            bodies_need_syncing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: u32) -> RigidBodyHandle {
        RigidBodyHandle::from_raw_parts(index, 0)
    }

    #[test]
    fn registry_preserves_creation_order_across_removal() {
        let mut registry = BodyRegistry::default();
        registry.insert("a".into(), handle(0));
        registry.insert("b".into(), handle(1));
        registry.insert("c".into(), handle(2));

        registry.remove("b");
        let order: Vec<&str> = registry.iter().map(|(uuid, _)| uuid).collect();
        assert_eq!(order, ["a", "c"]);
    }

    #[test]
    fn reinserting_an_identifier_keeps_its_slot() {
        let mut registry = BodyRegistry::default();
        registry.insert("a".into(), handle(0));
        registry.insert("b".into(), handle(1));
        registry.insert("a".into(), handle(2));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a"), Some(handle(2)));
        let order: Vec<&str> = registry.iter().map(|(uuid, _)| uuid).collect();
        assert_eq!(order, ["a", "b"]);
    }
}
