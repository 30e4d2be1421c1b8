//! Recording collaborators for controller tests.

use std::sync::{Arc, Mutex, PoisonError};

use bevy::math::Vec2;

use crate::combat::bridge::{HostCommand, HostLink};
use crate::combat::collaborators::{Collaborators, EffectHandle, EffectKind};
use crate::combat::controller::BossController;
use crate::content::BossDef;

/// Host fake: the world state is set by the test, every command is recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    link: HostLink,
    log: Arc<Mutex<Vec<HostCommand>>>,
}

impl RecordingHost {
    pub fn new(boss: Vec2, target: Option<Vec2>) -> Self {
        let host = Self::default();
        host.link.with_frame(|frame| {
            frame.position = boss;
            frame.target_position = target;
        });
        host
    }

    pub fn collaborators(&self) -> Collaborators {
        self.link.collaborators()
    }

    pub fn set_target(&self, target: Option<Vec2>) {
        self.link.with_frame(|frame| frame.target_position = target);
    }

    pub fn set_position(&self, position: Vec2) {
        self.link.with_frame(|frame| frame.position = position);
    }

    pub fn set_facing(&self, facing: Vec2) {
        self.link.with_frame(|frame| frame.facing = facing);
    }

    pub fn set_on_nav_mesh(&self, on_nav_mesh: bool) {
        self.link.with_frame(|frame| frame.on_nav_mesh = on_nav_mesh);
    }

    /// Every command issued so far.
    pub fn commands(&self) -> Vec<HostCommand> {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.extend(self.link.take_commands());
        log.clone()
    }

    pub fn clear(&self) {
        self.commands();
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn target_damage(&self) -> Vec<f32> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                HostCommand::DamageTarget(amount) => Some(amount),
                _ => None,
            })
            .collect()
    }

    pub fn triggers(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                HostCommand::AnimTrigger(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn projectiles(&self) -> usize {
        self.commands()
            .iter()
            .filter(|command| matches!(command, HostCommand::SpawnProjectile { .. }))
            .count()
    }

    pub fn spawned(&self, kind: EffectKind) -> Vec<(EffectHandle, Vec2, f32)> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                HostCommand::SpawnArea {
                    handle,
                    kind: spawned,
                    position,
                    radius,
                    ..
                } if spawned == kind => Some((handle, position, radius)),
                _ => None,
            })
            .collect()
    }

    /// Spawned area effects not yet destroyed.
    pub fn live_effects(&self) -> Vec<EffectHandle> {
        let commands = self.commands();
        let destroyed: Vec<EffectHandle> = commands
            .iter()
            .filter_map(|command| match command {
                HostCommand::Destroy(handle) => Some(*handle),
                _ => None,
            })
            .collect();
        commands
            .iter()
            .filter_map(|command| match command {
                HostCommand::SpawnArea { handle, .. } if !destroyed.contains(handle) => {
                    Some(*handle)
                }
                _ => None,
            })
            .collect()
    }

    pub fn last_destination(&self) -> Option<Vec2> {
        self.commands()
            .into_iter()
            .rev()
            .find_map(|command| match command {
                HostCommand::SetDestination(point) => Some(point),
                _ => None,
            })
    }

    pub fn navigation_calls(&self) -> usize {
        self.commands()
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    HostCommand::SetDestination(_)
                        | HostCommand::Stop
                        | HostCommand::Resume
                        | HostCommand::SetSpeed(_)
                )
            })
            .count()
    }
}

/// Deterministic hound with a fixed seed.
pub fn seeded_def(seed: u64) -> BossDef {
    let mut def = BossDef::default();
    def.selector.seed = Some(seed);
    def
}

/// Controller and host with the target straight ahead at `distance`.
pub fn boss_facing_target(def: BossDef, distance: f32) -> (BossController, RecordingHost) {
    let host = RecordingHost::new(Vec2::ZERO, Some(Vec2::new(distance, 0.0)));
    let controller = BossController::new(def, host.collaborators());
    (controller, host)
}

/// Tick `controller` `steps` times with a fixed `dt`.
pub fn run(controller: &mut BossController, steps: usize, dt: f32) {
    for _ in 0..steps {
        controller.tick(dt);
    }
}
