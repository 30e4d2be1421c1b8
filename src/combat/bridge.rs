//! Combat domain: collaborator implementations backed by a shared per-boss frame.
//!
//! Systems copy ECS state into the frame before the controller ticks and drain the
//! buffered commands afterwards.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::math::Vec2;

use crate::combat::collaborators::{
    Animation, Collaborators, DamageTarget, EffectHandle, EffectKind, EffectSpawner, Navigation,
};

/// A request from the controller to the host game.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    SetDestination(Vec2),
    Stop,
    Resume,
    SetSpeed(f32),
    FaceTowards {
        point: Vec2,
        max_degrees: f32,
    },
    AnimTrigger(String),
    AnimFloat {
        param: String,
        value: f32,
    },
    AnimBool {
        param: String,
        value: bool,
    },
    SpawnArea {
        handle: EffectHandle,
        kind: EffectKind,
        position: Vec2,
        radius: f32,
        duration: f32,
        damage: f32,
    },
    SpawnProjectile {
        origin: Vec2,
        direction: Vec2,
        speed: f32,
        damage: f32,
    },
    Destroy(EffectHandle),
    DamageTarget(f32),
}

/// World state seen by one controller during a tick, plus its outgoing commands.
#[derive(Debug, Clone)]
pub struct HostFrame {
    pub position: Vec2,
    pub facing: Vec2,
    pub velocity: Vec2,
    pub on_nav_mesh: bool,
    pub target_position: Option<Vec2>,
    pub commands: Vec<HostCommand>,
    next_handle: u64,
}

impl Default for HostFrame {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            facing: Vec2::X,
            velocity: Vec2::ZERO,
            on_nav_mesh: true,
            target_position: None,
            commands: Vec::new(),
            next_handle: 1,
        }
    }
}

/// Shared handle to a boss's frame.
#[derive(Debug, Clone, Default)]
pub struct HostLink {
    frame: Arc<Mutex<HostFrame>>,
}

impl HostLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HostFrame> {
        // The frame holds plain data; a poisoned lock is still usable.
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_frame<R>(&self, f: impl FnOnce(&mut HostFrame) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn take_commands(&self) -> Vec<HostCommand> {
        std::mem::take(&mut self.lock().commands)
    }

    fn push(&self, command: HostCommand) {
        self.lock().commands.push(command);
    }

    /// Collaborators for a controller, all writing into this link.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            Box::new(LinkedNavigation(self.clone())),
            Box::new(LinkedAnimation(self.clone())),
            Box::new(LinkedEffects(self.clone())),
            Some(Box::new(LinkedTarget(self.clone()))),
        )
    }
}

struct LinkedNavigation(HostLink);

impl Navigation for LinkedNavigation {
    fn position(&self) -> Vec2 {
        self.0.lock().position
    }

    fn facing(&self) -> Vec2 {
        self.0.lock().facing
    }

    fn set_destination(&mut self, point: Vec2) {
        self.0.push(HostCommand::SetDestination(point));
    }

    fn stop(&mut self) {
        self.0.push(HostCommand::Stop);
    }

    fn resume(&mut self) {
        self.0.push(HostCommand::Resume);
    }

    fn current_velocity(&self) -> Vec2 {
        self.0.lock().velocity
    }

    fn is_on_nav_mesh(&self) -> bool {
        self.0.lock().on_nav_mesh
    }

    fn face_towards(&mut self, point: Vec2, max_degrees: f32) {
        self.0.push(HostCommand::FaceTowards { point, max_degrees });
    }

    fn set_speed(&mut self, speed: f32) {
        self.0.push(HostCommand::SetSpeed(speed));
    }
}

struct LinkedAnimation(HostLink);

impl Animation for LinkedAnimation {
    fn set_trigger(&mut self, name: &str) {
        self.0.push(HostCommand::AnimTrigger(name.to_string()));
    }

    fn set_float(&mut self, param: &str, value: f32) {
        self.0.push(HostCommand::AnimFloat {
            param: param.to_string(),
            value,
        });
    }

    fn set_bool(&mut self, param: &str, value: bool) {
        self.0.push(HostCommand::AnimBool {
            param: param.to_string(),
            value,
        });
    }
}

struct LinkedEffects(HostLink);

impl EffectSpawner for LinkedEffects {
    fn spawn_area_effect(
        &mut self,
        kind: EffectKind,
        position: Vec2,
        radius: f32,
        duration: f32,
        damage: f32,
    ) -> EffectHandle {
        let mut frame = self.0.lock();
        let handle = EffectHandle(frame.next_handle);
        frame.next_handle += 1;
        frame.commands.push(HostCommand::SpawnArea {
            handle,
            kind,
            position,
            radius,
            duration,
            damage,
        });
        handle
    }

    fn spawn_projectile(&mut self, origin: Vec2, direction: Vec2, speed: f32, damage: f32) {
        self.0.push(HostCommand::SpawnProjectile {
            origin,
            direction,
            speed,
            damage,
        });
    }

    fn destroy(&mut self, handle: EffectHandle) {
        self.0.push(HostCommand::Destroy(handle));
    }
}

struct LinkedTarget(HostLink);

impl DamageTarget for LinkedTarget {
    fn position(&self) -> Option<Vec2> {
        self.0.lock().target_position
    }

    fn take_damage(&mut self, amount: f32) {
        self.0.push(HostCommand::DamageTarget(amount));
    }
}

/// Turn `facing` toward `direction` by at most `max_degrees`.
pub fn rotate_towards(facing: Vec2, direction: Vec2, max_degrees: f32) -> Vec2 {
    let Some(desired) = direction.try_normalize() else {
        return facing;
    };
    let current = facing.try_normalize().unwrap_or(desired);
    let angle = current.angle_to(desired);
    let step = max_degrees.max(0.0).to_radians();
    if angle.abs() <= step {
        desired
    } else {
        Vec2::from_angle(step * angle.signum()).rotate(current)
    }
}
