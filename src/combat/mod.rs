//! Combat domain: the boss controller, its building blocks and the ECS glue.

mod attacks;
mod bridge;
mod collaborators;
mod components;
mod controller;
mod damage;
mod events;
mod patterns;
mod phase;
mod range;
mod selector;
mod sequence;
mod state;
mod systems;
#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;
mod timers;
mod tracker;

pub use attacks::{ActionKind, AttackDefinition, AttackVolume, VolumeHit};
pub use bridge::{HostCommand, HostFrame, HostLink};
pub use collaborators::{
    Animation, Collaborators, DamageTarget, EffectHandle, EffectKind, EffectSpawner, Navigation,
};
pub use components::{BossAgent, BossBody, TargetBody};
pub use controller::{BossController, BossSnapshot, DropReason, SafeZone, StepError};
pub use damage::{AppliedDamage, DamageGate, DamageIgnored};
pub use events::{
    BossDamageMessage, BossDefeatedEvent, BossEvent, BossEventMessage, BossIntentMessage,
    BossPhaseChangeEvent, HitSource,
};
pub use phase::{Phase, PhaseController};
pub use range::{Band, BandTracker, RangeClassifier};
pub use selector::{ActionSelector, Aggression, SelectionContext};
pub use sequence::{
    SequenceEnd, SequenceLabel, SequenceOutcome, SequenceOutput, SequenceRunner, SequenceStatus,
    SequenceStep, StepEffect, StepMarker, TimedSequence,
};
pub use state::CombatState;
pub use timers::{CooldownTimer, TimerBank, TimerKey};
pub use tracker::{TargetFix, TargetTracker, facing_error_degrees};

use bevy::prelude::*;

use crate::combat::systems::{
    apply_incoming_damage, flush_host_commands, move_boss_bodies, publish_boss_events,
    sync_host_frames, tick_bosses,
};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<BossDamageMessage>()
            .add_message::<BossEventMessage>()
            .add_message::<BossIntentMessage>()
            .add_message::<BossPhaseChangeEvent>()
            .add_message::<BossDefeatedEvent>()
            .add_systems(
                Update,
                (
                    move_boss_bodies,
                    sync_host_frames,
                    apply_incoming_damage,
                    tick_bosses,
                    flush_host_commands,
                    publish_boss_events,
                )
                    .chain(),
            );
    }
}
