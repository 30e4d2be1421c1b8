//! Combat domain: damage gate with immunity window.

use std::fmt;

/// A hit that went through the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedDamage {
    pub amount: f32,
    pub health_before: f32,
    pub health_after: f32,
    pub lethal: bool,
}

/// Why a hit was ignored. Ignored hits never change state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageIgnored {
    Dead,
    /// Arrived `since` seconds after the last applied hit, inside the window
    Immune { since: f64 },
    /// Negative, zero or non-finite amount
    InvalidAmount(f32),
}

impl fmt::Display for DamageIgnored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DamageIgnored::Dead => write!(f, "combatant is already dead"),
            DamageIgnored::Immune { since } => {
                write!(f, "inside immunity window ({since:.3}s since last hit)")
            }
            DamageIgnored::InvalidAmount(amount) => write!(f, "invalid damage amount {amount}"),
        }
    }
}

impl std::error::Error for DamageIgnored {}

/// Health pool guarded by an immunity window.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageGate {
    health: f32,
    max_health: f32,
    immunity_window: f64,
    last_damage_at: Option<f64>,
}

impl DamageGate {
    pub fn new(max_health: f32, immunity_window: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            health: max_health,
            max_health,
            immunity_window: f64::from(immunity_window.max(0.0)),
            last_damage_at: None,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn last_damage_at(&self) -> Option<f64> {
        self.last_damage_at
    }

    /// Apply `amount` at simulation time `now`.
    pub fn take_damage(&mut self, amount: f32, now: f64) -> Result<AppliedDamage, DamageIgnored> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DamageIgnored::InvalidAmount(amount));
        }
        if self.is_dead() {
            return Err(DamageIgnored::Dead);
        }
        if let Some(last) = self.last_damage_at {
            let since = now - last;
            if since < self.immunity_window {
                return Err(DamageIgnored::Immune { since });
            }
        }

        let health_before = self.health;
        self.health = (self.health - amount).max(0.0);
        self.last_damage_at = Some(now);

        Ok(AppliedDamage {
            amount: health_before - self.health,
            health_before,
            health_after: self.health,
            lethal: self.health <= 0.0,
        })
    }

    /// Restore up to `amount`, clamped at max health. Returns the amount restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_dead() || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let actual = amount.min(self.max_health - self.health);
        self.health += actual;
        actual
    }

    /// Drop health to zero regardless of the immunity window.
    pub fn kill(&mut self, now: f64) -> Option<AppliedDamage> {
        if self.is_dead() {
            return None;
        }
        let health_before = self.health;
        self.health = 0.0;
        self.last_damage_at = Some(now);
        Some(AppliedDamage {
            amount: health_before,
            health_before,
            health_after: 0.0,
            lethal: true,
        })
    }
}
