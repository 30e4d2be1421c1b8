//! Debug domain: systems routing debug commands to bosses.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::combat::{BossAgent, BossSnapshot, DropReason};
use crate::debug::state::{DebugAction, DebugCommand, DebugState};

/// Render a snapshot as pretty JSON for the overlay and logs.
pub fn snapshot_json(snapshot: &BossSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

fn apply_action(agent: &mut BossAgent, action: DebugAction) -> Result<String, DropReason> {
    let controller = &mut agent.controller;
    let id = controller.def().id.clone();
    match action {
        DebugAction::ForceRetreat => controller
            .force_retreat()
            .map(|()| format!("{id}: retreating")),
        DebugAction::ForcePhaseTransition => controller
            .force_phase_transition()
            .map(|()| format!("{id}: phase transition")),
        DebugAction::ForceShieldPattern => controller
            .force_shield_pattern()
            .map(|()| format!("{id}: shield pattern")),
        DebugAction::Kill => {
            if controller.kill() {
                Ok(format!("{id}: killed"))
            } else {
                Err(DropReason::Dead)
            }
        }
        DebugAction::FullHeal => {
            let max = controller.max_health();
            let restored = controller.heal(max);
            Ok(format!("{id}: healed {restored:.0}"))
        }
        DebugAction::Snapshot => Ok(format!("{id}: snapshot")),
    }
}

/// Apply queued debug commands to the addressed bosses
pub(crate) fn handle_debug_commands(
    mut debug_commands: MessageReader<DebugCommand>,
    mut boss_query: Query<(Entity, &mut BossAgent)>,
    mut debug_state: ResMut<DebugState>,
) {
    for command in debug_commands.read() {
        for (entity, mut agent) in &mut boss_query {
            if command.boss.is_some_and(|boss| boss != entity) {
                continue;
            }

            match apply_action(&mut agent, command.action) {
                Ok(message) => {
                    info!("Debug: {}", message);
                    debug_state.set_message(message, 3.0);
                }
                Err(reason) => {
                    debug_state.dropped_commands += 1;
                    debug_state.set_message(format!("{:?} dropped: {}", command.action, reason), 3.0);
                }
            }

            if command.action == DebugAction::Snapshot {
                match snapshot_json(&agent.controller.snapshot()) {
                    Ok(json) => {
                        debug!("Boss snapshot:\n{}", json);
                        debug_state.store_snapshot(entity, json);
                    }
                    Err(e) => warn!("Failed to serialize boss snapshot: {}", e),
                }
            }
        }
    }
}

/// Fade the status message
pub(crate) fn update_status_message(time: Res<Time>, mut debug_state: ResMut<DebugState>) {
    if let Some((_, ref mut duration)) = debug_state.status_message {
        *duration -= time.delta_secs();
        if *duration <= 0.0 {
            debug_state.status_message = None;
        }
    }
}
