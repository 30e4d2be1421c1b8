//! Combat domain: boss actions, attack definitions and attack volumes.

use serde::{Deserialize, Serialize};

/// Every action the selector can hand to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Basic melee swing, the building block of attack strings
    Melee,
    /// Slower, harder swing
    Heavy,
    /// Lunging strike through the target (phase 2)
    Dash,
    /// Leap onto the target with a landing slam
    Jump,
    /// Stationary ranged volley (phase 2)
    Barrage,
    /// Shield with safe/danger zones
    ShieldPattern,
    /// Back away, then fire a ranged barrage
    Retreat,
}

impl ActionKind {
    /// Swings that count toward an attack string.
    pub fn is_strike(self) -> bool {
        matches!(self, ActionKind::Melee | ActionKind::Heavy | ActionKind::Dash)
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Melee => "melee",
            ActionKind::Heavy => "heavy",
            ActionKind::Dash => "dash",
            ActionKind::Jump => "jump",
            ActionKind::Barrage => "barrage",
            ActionKind::ShieldPattern => "shield_pattern",
            ActionKind::Retreat => "retreat",
        }
    }
}

/// Static data for one strike. Immutable after load.
///
/// The active window is measured from the end of the windup, so a swing runs
/// `windup`, then `active_start` of startup, then the active window, then recovery.
///
/// Range-band eligibility is not stored here: an attack may be picked in every band
/// whose selector pool lists its `action` (`SelectorDef::pools`). Load-time
/// validation rejects pool strikes with no matching definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub name: String,
    pub action: ActionKind,
    pub damage: f32,
    pub windup: f32,
    pub active_start: f32,
    pub active_end: f32,
    pub recovery: f32,
    pub cooldown: f32,
    /// Reach of the damage volume in front of the boss
    pub reach: f32,
    /// Half-angle of the volume arc, degrees
    pub arc_degrees: f32,
    /// Distance covered while the volume is open (dash attacks)
    pub lunge: f32,
    /// Animator trigger fired at the start of the windup
    pub animation: String,
}

impl AttackDefinition {
    pub fn active_duration(&self) -> f32 {
        (self.active_end - self.active_start).max(0.0)
    }

    pub fn total_duration(&self) -> f32 {
        self.windup + self.active_end.max(self.active_start) + self.recovery
    }
}

/// A single hit produced by an open volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeHit {
    pub damage: f32,
}

/// Damage-dealing collider proxy bound to one attack.
///
/// Deals at most one hit per enable; the latch resets on the next enable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackVolume {
    binding: Option<VolumeBinding>,
    enabled: bool,
    latched: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct VolumeBinding {
    damage: f32,
    reach: f32,
    arc_degrees: f32,
}

impl AttackVolume {
    pub fn enable(&mut self, attack: &AttackDefinition) {
        self.binding = Some(VolumeBinding {
            damage: attack.damage,
            reach: attack.reach,
            arc_degrees: attack.arc_degrees,
        });
        self.enabled = true;
        self.latched = false;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_hit(&self) -> bool {
        self.latched
    }

    /// Whether a target at `distance` and `angle_degrees` off the boss facing is inside the volume.
    pub fn covers(&self, distance: f32, angle_degrees: f32) -> bool {
        match &self.binding {
            Some(binding) if self.enabled => {
                distance <= binding.reach && angle_degrees.abs() <= binding.arc_degrees
            }
            _ => false,
        }
    }

    /// Claim the single hit of this swing.
    pub fn try_hit(&mut self) -> Option<VolumeHit> {
        if !self.enabled || self.latched {
            return None;
        }
        let binding = self.binding.as_ref()?;
        self.latched = true;
        Some(VolumeHit {
            damage: binding.damage,
        })
    }
}
