//! Data definitions for boss content files.
//!
//! These structs mirror assets/data/bosses.ron and are used for deserialization.
//! The BossRegistry provides lookup by id.

use serde::{Deserialize, Serialize};

use crate::combat::{ActionKind, AttackDefinition, Band, Phase};

// ============================================================================
// Common wrapper for RON files with schema_version and items
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataFile<T> {
    pub schema_version: u32,
    pub items: Vec<T>,
}

// ============================================================================
// Bosses (bosses.ron)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BossDef {
    pub id: String,
    pub name: String,
    pub max_health: f32,
    /// Seconds after an applied hit during which further hits are ignored
    pub immunity_window: f32,
    /// Seconds between death and despawn
    pub death_linger: f32,
    pub bands: BandsDef,
    pub facing: FacingDef,
    pub movement: MovementDef,
    pub selector: SelectorDef,
    pub attacks: Vec<AttackDefinition>,
    pub retreat: RetreatDef,
    pub barrage: BarrageDef,
    pub shield: ShieldDef,
    pub jump: JumpDef,
    pub phase: PhaseDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BandsDef {
    pub melee_edge: f32,
    pub mid_edge: f32,
    pub far_edge: f32,
    /// Hysteresis buffer around every edge
    pub buffer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FacingDef {
    /// Largest facing error (degrees) that still counts as facing the target
    pub angle_threshold: f32,
    /// Seconds of turning before the attempt is given up
    pub rotation_timeout: f32,
    /// Degrees per second while turning in place
    pub turn_rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MovementDef {
    pub chase_speed: f32,
    pub retreat_speed: f32,
    /// Chasing stops once the target is this close
    pub stop_distance: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectorDef {
    /// Gate between any two selected actions
    pub global_cooldown: f32,
    /// Chance of a basic melee swing while an attack string is running
    pub aggression_bias: f32,
    pub max_consecutive_attacks: u32,
    /// Fixed RNG seed for reproducible fights
    pub seed: Option<u64>,
    pub pools: Vec<BandPoolDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BandPoolDef {
    pub band: Band,
    pub entries: Vec<PoolEntryDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PoolEntryDef {
    pub action: ActionKind,
    pub weight: f32,
    /// First phase in which the entry is eligible
    pub unlock: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct VolleyDef {
    pub count: u32,
    pub interval: f32,
    pub damage: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RetreatDef {
    /// Seconds spent backing away before the barrage
    pub duration: f32,
    pub distance: f32,
    /// Minimum seconds between two retreats
    pub cooldown: f32,
    pub volley: VolleyDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BarrageDef {
    pub windup: f32,
    pub cooldown: f32,
    pub volley: VolleyDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ShieldDef {
    pub shield_duration: f32,
    pub shield_radius: f32,
    /// Seconds the shield stays up after the safety check
    pub linger: f32,
    pub safe_zone_radius: f32,
    pub arena_radius: f32,
    pub danger_damage: f32,
    pub cooldown: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct JumpDef {
    pub windup: f32,
    pub airtime: f32,
    pub landing_radius: f32,
    pub landing_damage: f32,
    pub recovery: f32,
    pub cooldown: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PhaseDef {
    /// Health ratio at or below which phase 2 is triggered
    pub phase2_threshold: f32,
    pub movement_multiplier: f32,
    pub attack_speed_multiplier: f32,
    /// Shield duration of the forced transition sequence
    pub transition_duration: f32,
    /// Health ratio below which a one-shot panic retreat fires
    pub panic_retreat_below: Option<f32>,
}

impl BossDef {
    /// First attack definition bound to `action`.
    pub fn attack_for(&self, action: ActionKind) -> Option<&AttackDefinition> {
        self.attacks.iter().find(|attack| attack.action == action)
    }

    /// Cooldown started when `action` is selected.
    pub fn action_cooldown(&self, action: ActionKind) -> f32 {
        match action {
            ActionKind::Melee | ActionKind::Heavy | ActionKind::Dash => {
                self.attack_for(action).map_or(0.0, |attack| attack.cooldown)
            }
            ActionKind::Jump => self.jump.cooldown,
            ActionKind::Barrage => self.barrage.cooldown,
            ActionKind::ShieldPattern => self.shield.cooldown,
            ActionKind::Retreat => self.retreat.cooldown,
        }
    }

    pub fn pool(&self, band: Band) -> Option<&BandPoolDef> {
        self.selector.pools.iter().find(|pool| pool.band == band)
    }
}

fn entry(action: ActionKind, weight: f32, unlock: Phase) -> PoolEntryDef {
    PoolEntryDef {
        action,
        weight,
        unlock,
    }
}

impl Default for BossDef {
    /// The built-in "hound" archetype.
    fn default() -> Self {
        Self {
            id: "boss_hound".to_string(),
            name: "Hound".to_string(),
            max_health: 600.0,
            immunity_window: 0.2,
            death_linger: 3.0,
            bands: BandsDef {
                melee_edge: 2.5,
                mid_edge: 6.0,
                far_edge: 14.0,
                buffer: 0.3,
            },
            facing: FacingDef {
                angle_threshold: 20.0,
                rotation_timeout: 1.5,
                turn_rate: 240.0,
            },
            movement: MovementDef {
                chase_speed: 4.0,
                retreat_speed: 6.0,
                stop_distance: 2.0,
            },
            selector: SelectorDef {
                global_cooldown: 1.2,
                aggression_bias: 0.9,
                max_consecutive_attacks: 3,
                seed: None,
                pools: vec![
                    BandPoolDef {
                        band: Band::Melee,
                        entries: vec![
                            entry(ActionKind::Melee, 0.70, Phase::Phase1),
                            entry(ActionKind::Heavy, 0.18, Phase::Phase1),
                            entry(ActionKind::ShieldPattern, 0.10, Phase::Phase1),
                            entry(ActionKind::Retreat, 0.02, Phase::Phase1),
                            entry(ActionKind::Dash, 0.15, Phase::Phase2),
                        ],
                    },
                    BandPoolDef {
                        band: Band::Mid,
                        entries: vec![
                            entry(ActionKind::Jump, 0.2, Phase::Phase1),
                            entry(ActionKind::ShieldPattern, 0.1, Phase::Phase1),
                            entry(ActionKind::Dash, 0.4, Phase::Phase2),
                            entry(ActionKind::Barrage, 0.3, Phase::Phase2),
                        ],
                    },
                    BandPoolDef {
                        band: Band::Far,
                        entries: vec![
                            entry(ActionKind::Jump, 0.7, Phase::Phase1),
                            entry(ActionKind::Barrage, 0.3, Phase::Phase2),
                        ],
                    },
                ],
            },
            attacks: vec![
                AttackDefinition {
                    name: "bite".to_string(),
                    action: ActionKind::Melee,
                    damage: 12.0,
                    windup: 0.35,
                    active_start: 0.05,
                    active_end: 0.25,
                    recovery: 0.4,
                    cooldown: 0.8,
                    reach: 2.8,
                    arc_degrees: 60.0,
                    lunge: 0.0,
                    animation: "Bite".to_string(),
                },
                AttackDefinition {
                    name: "maul".to_string(),
                    action: ActionKind::Heavy,
                    damage: 24.0,
                    windup: 0.7,
                    active_start: 0.1,
                    active_end: 0.35,
                    recovery: 0.7,
                    cooldown: 3.0,
                    reach: 3.0,
                    arc_degrees: 75.0,
                    lunge: 0.0,
                    animation: "Maul".to_string(),
                },
                AttackDefinition {
                    name: "lunge".to_string(),
                    action: ActionKind::Dash,
                    damage: 18.0,
                    windup: 0.5,
                    active_start: 0.0,
                    active_end: 0.35,
                    recovery: 0.6,
                    cooldown: 4.0,
                    reach: 2.5,
                    arc_degrees: 45.0,
                    lunge: 7.0,
                    animation: "Lunge".to_string(),
                },
            ],
            retreat: RetreatDef {
                duration: 2.0,
                distance: 8.0,
                cooldown: 8.0,
                volley: VolleyDef {
                    count: 5,
                    interval: 0.3,
                    damage: 6.0,
                    speed: 12.0,
                },
            },
            barrage: BarrageDef {
                windup: 0.4,
                cooldown: 6.0,
                volley: VolleyDef {
                    count: 3,
                    interval: 0.25,
                    damage: 8.0,
                    speed: 14.0,
                },
            },
            shield: ShieldDef {
                shield_duration: 5.0,
                shield_radius: 1.5,
                linger: 1.0,
                safe_zone_radius: 2.5,
                arena_radius: 12.0,
                danger_damage: 40.0,
                cooldown: 15.0,
            },
            jump: JumpDef {
                windup: 0.6,
                airtime: 0.8,
                landing_radius: 3.5,
                landing_damage: 25.0,
                recovery: 0.9,
                cooldown: 6.0,
            },
            phase: PhaseDef {
                phase2_threshold: 0.5,
                movement_multiplier: 1.3,
                attack_speed_multiplier: 1.25,
                transition_duration: 3.0,
                panic_retreat_below: None,
            },
        }
    }
}
