//! Combat domain: systems bridging boss controllers and the ECS world.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::combat::bridge::{HostCommand, rotate_towards};
use crate::combat::components::{BossAgent, BossBody, TargetBody};
use crate::combat::events::{
    BossDamageMessage, BossDefeatedEvent, BossEvent, BossEventMessage, BossIntentMessage,
    BossPhaseChangeEvent,
};

pub(crate) fn move_boss_bodies(time: Res<Time>, mut query: Query<&mut BossBody>) {
    let dt = time.delta_secs();
    for mut body in &mut query {
        body.step(dt);
    }
}

/// Copy body and target state into each boss's frame.
pub(crate) fn sync_host_frames(
    boss_query: Query<(&BossAgent, &BossBody)>,
    target_query: Query<&TargetBody>,
) {
    for (agent, body) in &boss_query {
        let target_position = agent
            .target
            .and_then(|entity| target_query.get(entity).ok())
            .filter(|target| target.is_alive())
            .map(|target| target.position);

        agent.link.with_frame(|frame| {
            frame.position = body.position;
            frame.facing = body.facing;
            frame.velocity = body.velocity;
            frame.on_nav_mesh = body.on_nav_mesh;
            frame.target_position = target_position;
        });
    }
}

/// Queue incoming damage; it is applied at the start of the next controller tick.
pub(crate) fn apply_incoming_damage(
    mut damage_events: MessageReader<BossDamageMessage>,
    mut boss_query: Query<&mut BossAgent>,
) {
    for event in damage_events.read() {
        if let Ok(mut agent) = boss_query.get_mut(event.boss) {
            agent.controller.enqueue_damage(event.amount);
        }
    }
}

pub(crate) fn tick_bosses(time: Res<Time>, mut boss_query: Query<&mut BossAgent>) {
    let dt = time.delta_secs();
    for mut agent in &mut boss_query {
        agent.controller.tick(dt);
    }
}

/// Apply buffered controller commands to bodies and targets, then republish them.
pub(crate) fn flush_host_commands(
    mut boss_query: Query<(Entity, &BossAgent, &mut BossBody)>,
    mut target_query: Query<&mut TargetBody>,
    mut intents: MessageWriter<BossIntentMessage>,
) {
    for (entity, agent, mut body) in &mut boss_query {
        for command in agent.link.take_commands() {
            match &command {
                HostCommand::SetDestination(point) => body.destination = Some(*point),
                HostCommand::Stop => body.moving = false,
                HostCommand::Resume => body.moving = true,
                HostCommand::SetSpeed(speed) => body.speed = speed.max(0.0),
                HostCommand::FaceTowards { point, max_degrees } => {
                    let direction = *point - body.position;
                    body.facing = rotate_towards(body.facing, direction, *max_degrees);
                }
                HostCommand::DamageTarget(amount) => {
                    if let Some(mut target) = agent
                        .target
                        .and_then(|target| target_query.get_mut(target).ok())
                    {
                        target.take_damage(*amount);
                    }
                }
                _ => {}
            }
            intents.write(BossIntentMessage {
                boss: entity,
                command,
            });
        }
    }
}

/// Republish controller events and despawn bosses whose death linger is over.
pub(crate) fn publish_boss_events(
    mut commands: Commands,
    mut boss_query: Query<(Entity, &mut BossAgent)>,
    mut boss_events: MessageWriter<BossEventMessage>,
    mut phase_events: MessageWriter<BossPhaseChangeEvent>,
    mut defeated_events: MessageWriter<BossDefeatedEvent>,
) {
    for (entity, mut agent) in &mut boss_query {
        for event in agent.controller.drain_events() {
            match &event {
                BossEvent::PhaseChanged(phase) => {
                    phase_events.write(BossPhaseChangeEvent {
                        boss: entity,
                        new_phase: *phase,
                    });
                }
                BossEvent::Died => {
                    defeated_events.write(BossDefeatedEvent { boss: entity });
                }
                BossEvent::DespawnReady => {
                    commands.entity(entity).despawn();
                }
                _ => {}
            }
            boss_events.write(BossEventMessage {
                boss: entity,
                event,
            });
        }
    }
}
