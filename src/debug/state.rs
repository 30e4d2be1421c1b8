//! Debug domain: state and command definitions for debug tooling.

use bevy::ecs::message::Message;
use bevy::prelude::*;

/// Resource tracking debug tooling state
#[derive(Resource, Debug, Default)]
pub struct DebugState {
    /// Message to display temporarily, with seconds left
    pub status_message: Option<(String, f32)>,
    /// Latest JSON snapshot per boss
    pub snapshots: Vec<(Entity, String)>,
    /// Commands a boss refused (dead, transition running, latch spent)
    pub dropped_commands: u32,
}

impl DebugState {
    /// Set a status message that will fade after a duration
    pub fn set_message(&mut self, message: impl Into<String>, duration: f32) {
        self.status_message = Some((message.into(), duration));
    }

    pub fn snapshot_for(&self, boss: Entity) -> Option<&str> {
        self.snapshots
            .iter()
            .find(|(entity, _)| *entity == boss)
            .map(|(_, json)| json.as_str())
    }

    pub(crate) fn store_snapshot(&mut self, boss: Entity, json: String) {
        match self.snapshots.iter_mut().find(|(entity, _)| *entity == boss) {
            Some(slot) => slot.1 = json,
            None => self.snapshots.push((boss, json)),
        }
    }
}

/// Actions that can be triggered on a boss for scripted testing and QA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugAction {
    ForceRetreat,
    ForcePhaseTransition,
    ForceShieldPattern,
    Kill,
    FullHeal,
    Snapshot,
}

/// Debug request; `boss: None` targets every boss.
#[derive(Debug, Clone, Copy)]
pub struct DebugCommand {
    pub boss: Option<Entity>,
    pub action: DebugAction,
}

impl Message for DebugCommand {}
