//! The fixed set of arbitrated resources.

use crate::arbiter::Arbiter;
use crate::types::{OwnerId, Priority, Rotation, Ticks};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Runtime name of an arbitrated resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceId {
    /// Where the client looks
    Aim,
    /// Simulation speed multiplier
    TimeDilation,
    /// Active equipment slot
    EquipmentSlot,
}

impl ResourceId {
    pub const ALL: [ResourceId; 3] = [
        ResourceId::Aim,
        ResourceId::TimeDilation,
        ResourceId::EquipmentSlot,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aim" => Some(ResourceId::Aim),
            "time_dilation" => Some(ResourceId::TimeDilation),
            "equipment_slot" => Some(ResourceId::EquipmentSlot),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Aim => write!(f, "aim"),
            ResourceId::TimeDilation => write!(f, "time_dilation"),
            ResourceId::EquipmentSlot => write!(f, "equipment_slot"),
        }
    }
}

/// Compile-time identity of a resource and the type of value it carries.
pub trait Resource {
    type Value;
    const ID: ResourceId;

    fn arbiter(set: &Arbiters) -> &Arbiter<Self::Value>;
    fn arbiter_mut(set: &mut Arbiters) -> &mut Arbiter<Self::Value>;
}

pub struct Aim;
pub struct TimeDilation;
pub struct EquipmentSlot;

impl Resource for Aim {
    type Value = Rotation;
    const ID: ResourceId = ResourceId::Aim;

    fn arbiter(set: &Arbiters) -> &Arbiter<Rotation> {
        &set.aim
    }

    fn arbiter_mut(set: &mut Arbiters) -> &mut Arbiter<Rotation> {
        &mut set.aim
    }
}

impl Resource for TimeDilation {
    type Value = f32;
    const ID: ResourceId = ResourceId::TimeDilation;

    fn arbiter(set: &Arbiters) -> &Arbiter<f32> {
        &set.time_dilation
    }

    fn arbiter_mut(set: &mut Arbiters) -> &mut Arbiter<f32> {
        &mut set.time_dilation
    }
}

impl Resource for EquipmentSlot {
    type Value = u8;
    const ID: ResourceId = ResourceId::EquipmentSlot;

    fn arbiter(set: &Arbiters) -> &Arbiter<u8> {
        &set.equipment_slot
    }

    fn arbiter_mut(set: &mut Arbiters) -> &mut Arbiter<u8> {
        &mut set.equipment_slot
    }
}

/// One arbiter per resource, ticked together.
#[derive(Default)]
pub struct Arbiters {
    aim: Arbiter<Rotation>,
    time_dilation: Arbiter<f32>,
    equipment_slot: Arbiter<u8>,
}

impl Arbiters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit<R: Resource>(
        &mut self,
        owner: &OwnerId,
        value: R::Value,
        priority: Priority,
        ttl: Ticks,
    ) {
        R::arbiter_mut(self).submit(owner, value, priority, ttl);
    }

    pub fn current<R: Resource>(&self) -> Option<&R::Value> {
        R::arbiter(self).current_value()
    }

    pub fn release<R: Resource>(&mut self, owner: &OwnerId) -> bool {
        R::arbiter_mut(self).release(owner)
    }

    pub fn is_owned_by<R: Resource>(&self, owner: &OwnerId) -> bool {
        R::arbiter(self).is_owned_by(owner)
    }

    pub fn get<R: Resource>(&self) -> &Arbiter<R::Value> {
        R::arbiter(self)
    }

    pub fn release_by_id(&mut self, id: ResourceId, owner: &OwnerId) -> bool {
        match id {
            ResourceId::Aim => self.aim.release(owner),
            ResourceId::TimeDilation => self.time_dilation.release(owner),
            ResourceId::EquipmentSlot => self.equipment_slot.release(owner),
        }
    }

    pub fn is_claimed(&self, id: ResourceId) -> bool {
        match id {
            ResourceId::Aim => self.aim.is_claimed(),
            ResourceId::TimeDilation => self.time_dilation.is_claimed(),
            ResourceId::EquipmentSlot => self.equipment_slot.is_claimed(),
        }
    }

    /// Withdraw every claim held by `owner`, e.g. when its module stops running.
    /// Returns how many resources it released.
    pub fn release_all(&mut self, owner: &OwnerId) -> usize {
        let released = ResourceId::ALL
            .into_iter()
            .filter(|id| self.release_by_id(*id, owner))
            .count();
        if released > 0 {
            debug!(owner = %owner, released, "owner retired");
        }
        released
    }

    /// The eviction phase. Must run once per tick before anyone reads a value.
    pub fn tick(&mut self) -> usize {
        let evicted = self.aim.tick() + self.time_dilation.tick() + self.equipment_slot.tick();
        if evicted > 0 {
            debug!(evicted, "expired requests evicted");
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.aim.clear();
        self.time_dilation.clear();
        self.equipment_slot.clear();
    }
}
