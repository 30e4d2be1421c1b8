//! Combat domain: health-gated, one-shot phase transition.

use serde::{Deserialize, Serialize};

/// Behavioural phase. Only ever moves from `Phase1` to `Phase2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Phase1,
    Phase2,
}

/// Watches the health ratio and fires the phase transition at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseController {
    phase: Phase,
    fired: bool,
    threshold: f32,
    movement_multiplier: f32,
    attack_speed_multiplier: f32,
}

impl PhaseController {
    pub fn new(threshold: f32, movement_multiplier: f32, attack_speed_multiplier: f32) -> Self {
        Self {
            phase: Phase::Phase1,
            fired: false,
            threshold,
            movement_multiplier,
            attack_speed_multiplier,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the transition has already been triggered (it may still be playing out).
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Returns true exactly once, when the ratio first reaches the threshold in phase 1.
    pub fn on_damage_applied(&mut self, new_health: f32, max_health: f32) -> bool {
        if self.fired || self.phase != Phase::Phase1 || max_health <= 0.0 || new_health <= 0.0 {
            return false;
        }
        if new_health / max_health <= self.threshold {
            self.fired = true;
            return true;
        }
        false
    }

    /// Trigger regardless of health. Returns false if the latch is already spent.
    pub fn force(&mut self) -> bool {
        if self.fired || self.phase != Phase::Phase1 {
            return false;
        }
        self.fired = true;
        true
    }

    /// Called when the transition sequence has completed. Applies phase 2.
    pub fn complete(&mut self) -> bool {
        if !self.fired || self.phase == Phase::Phase2 {
            return false;
        }
        self.phase = Phase::Phase2;
        true
    }

    pub fn movement_multiplier(&self) -> f32 {
        match self.phase {
            Phase::Phase1 => 1.0,
            Phase::Phase2 => self.movement_multiplier,
        }
    }

    /// Multiplier on attack cadence; cooldowns and swing timings are divided by it.
    pub fn attack_speed_multiplier(&self) -> f32 {
        match self.phase {
            Phase::Phase1 => 1.0,
            Phase::Phase2 => self.attack_speed_multiplier,
        }
    }
}
