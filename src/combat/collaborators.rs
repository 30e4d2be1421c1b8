//! Combat domain: interfaces consumed from the host engine.
//!
//! The controller never locates these at runtime; they are injected once at construction.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Path-finding and locomotion of the boss body.
pub trait Navigation: Send + Sync {
    fn position(&self) -> Vec2;
    /// Unit vector the boss is facing.
    fn facing(&self) -> Vec2;
    fn set_destination(&mut self, point: Vec2);
    fn stop(&mut self);
    fn resume(&mut self);
    fn current_velocity(&self) -> Vec2;
    fn is_on_nav_mesh(&self) -> bool;
    /// Turn toward `point` by at most `max_degrees` this tick.
    fn face_towards(&mut self, point: Vec2, max_degrees: f32);
    fn set_speed(&mut self, speed: f32);
}

/// Fire-and-forget animator parameters.
pub trait Animation: Send + Sync {
    fn set_trigger(&mut self, name: &str);
    fn set_float(&mut self, param: &str, value: f32);
    fn set_bool(&mut self, param: &str, value: bool);
}

/// The tracked target.
pub trait DamageTarget: Send + Sync {
    /// `None` once the target has been destroyed or left the scene.
    fn position(&self) -> Option<Vec2>;
    fn take_damage(&mut self, amount: f32);
}

/// Opaque handle to a spawned world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Shield,
    SafeZone,
    DangerZone,
    LandingSlam,
}

pub trait EffectSpawner: Send + Sync {
    fn spawn_area_effect(
        &mut self,
        kind: EffectKind,
        position: Vec2,
        radius: f32,
        duration: f32,
        damage: f32,
    ) -> EffectHandle;
    fn spawn_projectile(&mut self, origin: Vec2, direction: Vec2, speed: f32, damage: f32);
    fn destroy(&mut self, handle: EffectHandle);
}

/// Everything a controller talks to.
pub struct Collaborators {
    pub navigation: Box<dyn Navigation>,
    pub animation: Box<dyn Animation>,
    pub effects: Box<dyn EffectSpawner>,
    pub target: Option<Box<dyn DamageTarget>>,
}

impl Collaborators {
    pub fn new(
        navigation: Box<dyn Navigation>,
        animation: Box<dyn Animation>,
        effects: Box<dyn EffectSpawner>,
        target: Option<Box<dyn DamageTarget>>,
    ) -> Self {
        Self {
            navigation,
            animation,
            effects,
            target,
        }
    }

    pub fn target_position(&self) -> Option<Vec2> {
        self.target.as_ref().and_then(|target| target.position())
    }

    // Navigation calls are skipped while the body is off the navmesh.

    pub fn nav_set_destination(&mut self, point: Vec2) {
        if self.navigation.is_on_nav_mesh() {
            self.navigation.set_destination(point);
        }
    }

    pub fn nav_stop(&mut self) {
        if self.navigation.is_on_nav_mesh() {
            self.navigation.stop();
        }
    }

    pub fn nav_resume(&mut self) {
        if self.navigation.is_on_nav_mesh() {
            self.navigation.resume();
        }
    }

    pub fn nav_set_speed(&mut self, speed: f32) {
        if self.navigation.is_on_nav_mesh() {
            self.navigation.set_speed(speed);
        }
    }
}
