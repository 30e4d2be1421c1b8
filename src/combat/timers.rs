//! Combat domain: timer bank owning every cooldown and duration countdown.

use std::collections::HashMap;

use crate::combat::attacks::ActionKind;

/// A named countdown, decremented once per tick and clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CooldownTimer {
    pub remaining: f32,
    pub duration: f32,
}

impl CooldownTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Restart with a new duration, which becomes the configured one.
    pub fn start_with(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.remaining = self.duration;
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Fraction of the countdown already elapsed, 1.0 when ready.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            1.0 - self.remaining / self.duration
        }
    }
}

/// Keys of the countdowns a boss owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Global gate between two selected actions
    AttackCooldown,
    /// Per-action cooldown started on selection
    Action(ActionKind),
    /// Hard limit on turning to face the target
    RotationTimeout,
    /// Linger between death and despawn
    Despawn,
}

/// Owns all countdowns of one combatant; advanced once per tick.
#[derive(Debug, Default, Clone)]
pub struct TimerBank {
    timers: HashMap<TimerKey, CooldownTimer>,
}

impl TimerBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        for timer in self.timers.values_mut() {
            timer.tick(dt);
        }
    }

    pub fn start(&mut self, key: TimerKey, duration: f32) {
        self.timers
            .entry(key)
            .or_insert_with(|| CooldownTimer::new(duration))
            .start_with(duration);
    }

    pub fn clear(&mut self, key: TimerKey) {
        if let Some(timer) = self.timers.get_mut(&key) {
            timer.clear();
        }
    }

    /// Unknown keys have never been started and are therefore ready.
    pub fn is_ready(&self, key: TimerKey) -> bool {
        self.timers.get(&key).is_none_or(CooldownTimer::is_ready)
    }

    pub fn remaining(&self, key: TimerKey) -> f32 {
        self.timers.get(&key).map_or(0.0, |timer| timer.remaining)
    }

    pub fn get(&self, key: TimerKey) -> Option<&CooldownTimer> {
        self.timers.get(&key)
    }

    /// True while a started timer is still counting down.
    pub fn is_running(&self, key: TimerKey) -> bool {
        !self.is_ready(key)
    }
}
