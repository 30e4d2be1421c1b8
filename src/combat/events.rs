//! Combat domain: controller events and the messages the plugin publishes.

use bevy::ecs::message::Message;
use bevy::prelude::*;
use serde::Serialize;

use crate::combat::attacks::ActionKind;
use crate::combat::bridge::HostCommand;
use crate::combat::phase::Phase;

/// What dealt damage to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HitSource {
    Volume,
    DangerZone,
    LandingSlam,
}

/// Recorded by the controller and drained by the host once per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BossEvent {
    ActionStarted(ActionKind),
    ActionFinished(ActionKind),
    ActionAborted(ActionKind),
    RotationGaveUp,
    PhaseTransitionStarted,
    PhaseChanged(Phase),
    DamageTaken { amount: f32, health: f32 },
    TargetHit { source: HitSource, damage: f32 },
    TargetAcquired,
    TargetLost,
    Died,
    DespawnReady,
}

/// Damage dealt to a boss by any source.
#[derive(Debug)]
pub struct BossDamageMessage {
    pub boss: Entity,
    pub amount: f32,
}

impl Message for BossDamageMessage {}

/// Every controller event, tagged with its boss.
#[derive(Debug)]
pub struct BossEventMessage {
    pub boss: Entity,
    pub event: BossEvent,
}

impl Message for BossEventMessage {}

/// Outgoing navigation, animation and effect command for the host game.
#[derive(Debug)]
pub struct BossIntentMessage {
    pub boss: Entity,
    pub command: HostCommand,
}

impl Message for BossIntentMessage {}

#[derive(Debug)]
pub struct BossPhaseChangeEvent {
    pub boss: Entity,
    pub new_phase: Phase,
}

impl Message for BossPhaseChangeEvent {}

#[derive(Debug)]
pub struct BossDefeatedEvent {
    pub boss: Entity,
}

impl Message for BossDefeatedEvent {}
