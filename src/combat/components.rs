//! Combat domain: ECS components for bosses and their targets.

use bevy::prelude::*;

use crate::combat::bridge::{HostLink, rotate_towards};
use crate::combat::controller::BossController;
use crate::content::BossDef;

/// A boss driven by a controller; its collaborators write into `link`.
#[derive(Component)]
pub struct BossAgent {
    pub controller: BossController,
    pub link: HostLink,
    /// Entity carrying the tracked `TargetBody`
    pub target: Option<Entity>,
}

impl BossAgent {
    pub fn new(def: BossDef, target: Option<Entity>) -> Self {
        let link = HostLink::new();
        let controller = BossController::new(def, link.collaborators());
        Self {
            controller,
            link,
            target,
        }
    }
}

/// Kinematic stand-in for the host's navigation agent.
#[derive(Component, Debug, Clone)]
pub struct BossBody {
    pub position: Vec2,
    pub facing: Vec2,
    pub velocity: Vec2,
    pub destination: Option<Vec2>,
    pub speed: f32,
    pub moving: bool,
    pub on_nav_mesh: bool,
}

impl BossBody {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            facing: Vec2::X,
            velocity: Vec2::ZERO,
            destination: None,
            speed: 0.0,
            moving: false,
            on_nav_mesh: true,
        }
    }

    /// Move toward the destination at the current speed.
    pub fn step(&mut self, dt: f32) {
        self.velocity = Vec2::ZERO;
        let Some(destination) = self.destination else {
            return;
        };
        if !self.moving || !self.on_nav_mesh || self.speed <= 0.0 {
            return;
        }

        let to_destination = destination - self.position;
        let distance = to_destination.length();
        let travel = self.speed * dt;
        if distance <= travel {
            self.position = destination;
            self.destination = None;
        } else {
            let direction = to_destination / distance;
            self.position += direction * travel;
            self.velocity = direction * self.speed;
            self.facing = rotate_towards(self.facing, direction, 360.0);
        }
    }
}

/// The entity a boss fights.
#[derive(Component, Debug, Clone)]
pub struct TargetBody {
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
}

impl TargetBody {
    pub fn new(position: Vec2, max_health: f32) -> Self {
        Self {
            position,
            health: max_health,
            max_health,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.health);
        self.health -= actual;
        actual
    }
}
