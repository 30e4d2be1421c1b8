//! Validation of boss tuning values.

use super::data::*;
use super::registry::BossRegistry;
use crate::combat::AttackDefinition;

/// A validation error with context about what failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub boss_id: String,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Boss '{}' has invalid '{}': {}",
            self.boss_id, self.field, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Helper macro for recording a failed check
macro_rules! check {
    ($errors:expr, $cond:expr, $boss_id:expr, $field:expr, $($message:tt)+) => {
        if !$cond {
            $errors.push(ValidationError {
                boss_id: $boss_id.to_string(),
                field: $field,
                message: format!($($message)+),
            });
        }
    };
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn check_attack(errors: &mut Vec<ValidationError>, id: &str, a: &AttackDefinition) {
    check!(errors, positive(a.damage), id, "attacks.damage", "'{}' damage must be > 0", a.name);
    check!(
        errors,
        non_negative(a.windup) && non_negative(a.recovery) && non_negative(a.cooldown),
        id,
        "attacks.timing",
        "'{}' windup, recovery and cooldown must be >= 0",
        a.name
    );
    check!(
        errors,
        non_negative(a.active_start) && a.active_end.is_finite() && a.active_end > a.active_start,
        id,
        "attacks.active_window",
        "'{}' active window {}..{} is empty",
        a.name,
        a.active_start,
        a.active_end
    );
    check!(errors, positive(a.reach), id, "attacks.reach", "'{}' reach must be > 0", a.name);
    check!(
        errors,
        positive(a.arc_degrees) && a.arc_degrees <= 180.0,
        id,
        "attacks.arc_degrees",
        "'{}' arc must be in (0, 180]",
        a.name
    );
    check!(
        errors,
        a.action.is_strike(),
        id,
        "attacks.action",
        "'{}' is bound to non-strike action {}",
        a.name,
        a.action.label()
    );
}

fn check_volley(errors: &mut Vec<ValidationError>, id: &str, field: &'static str, volley: &VolleyDef) {
    check!(errors, volley.count > 0, id, field, "volley count must be > 0");
    check!(errors, non_negative(volley.interval), id, field, "volley interval must be >= 0");
    check!(errors, positive(volley.speed), id, field, "projectile speed must be > 0");
    check!(errors, non_negative(volley.damage), id, field, "projectile damage must be >= 0");
}

/// Validate one boss definition.
/// Returns a list of validation errors, empty if the definition is usable.
pub fn validate_boss(def: &BossDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let id = def.id.as_str();

    check!(errors, !def.id.is_empty(), "<unnamed>", "id", "id must not be empty");
    check!(errors, positive(def.max_health), id, "max_health", "must be > 0, got {}", def.max_health);
    check!(errors, non_negative(def.immunity_window), id, "immunity_window", "must be >= 0");
    check!(errors, non_negative(def.death_linger), id, "death_linger", "must be >= 0");

    // Bands
    let bands = &def.bands;
    check!(
        errors,
        positive(bands.melee_edge) && bands.melee_edge < bands.mid_edge && bands.mid_edge < bands.far_edge,
        id,
        "bands",
        "edges must satisfy 0 < melee {} < mid {} < far {}",
        bands.melee_edge,
        bands.mid_edge,
        bands.far_edge
    );
    let narrowest = bands
        .melee_edge
        .min(bands.mid_edge - bands.melee_edge)
        .min(bands.far_edge - bands.mid_edge);
    check!(
        errors,
        non_negative(bands.buffer) && bands.buffer * 2.0 < narrowest,
        id,
        "bands.buffer",
        "buffer {} must be >= 0 and under half the narrowest band ({})",
        bands.buffer,
        narrowest
    );

    // Facing
    check!(
        errors,
        positive(def.facing.angle_threshold) && def.facing.angle_threshold <= 180.0,
        id,
        "facing.angle_threshold",
        "must be in (0, 180]"
    );
    check!(errors, positive(def.facing.rotation_timeout), id, "facing.rotation_timeout", "must be > 0");
    check!(errors, positive(def.facing.turn_rate), id, "facing.turn_rate", "must be > 0");

    // Movement
    check!(
        errors,
        non_negative(def.movement.chase_speed) && non_negative(def.movement.retreat_speed),
        id,
        "movement",
        "speeds must be >= 0"
    );
    check!(errors, non_negative(def.movement.stop_distance), id, "movement.stop_distance", "must be >= 0");

    // Selector
    let selector = &def.selector;
    check!(errors, non_negative(selector.global_cooldown), id, "selector.global_cooldown", "must be >= 0");
    check!(
        errors,
        selector.aggression_bias.is_finite() && (0.0..=1.0).contains(&selector.aggression_bias),
        id,
        "selector.aggression_bias",
        "must be in [0, 1], got {}",
        selector.aggression_bias
    );
    check!(
        errors,
        selector.max_consecutive_attacks >= 1,
        id,
        "selector.max_consecutive_attacks",
        "must be >= 1"
    );
    for pool in &selector.pools {
        for entry in &pool.entries {
            check!(
                errors,
                non_negative(entry.weight),
                id,
                "selector.pools.weight",
                "{} in {:?} band has weight {}",
                entry.action.label(),
                pool.band,
                entry.weight
            );
            let has_definition = !entry.action.is_strike() || def.attack_for(entry.action).is_some();
            check!(
                errors,
                has_definition,
                id,
                "selector.pools.action",
                "{} in {:?} band has no attack definition",
                entry.action.label(),
                pool.band
            );
        }
    }

    // Attacks
    for attack in &def.attacks {
        check_attack(&mut errors, id, attack);
    }

    // Patterns
    check!(errors, non_negative(def.retreat.duration), id, "retreat.duration", "must be >= 0");
    check!(errors, non_negative(def.retreat.distance), id, "retreat.distance", "must be >= 0");
    check!(errors, non_negative(def.retreat.cooldown), id, "retreat.cooldown", "must be >= 0");
    check_volley(&mut errors, id, "retreat.volley", &def.retreat.volley);

    check!(errors, non_negative(def.barrage.windup), id, "barrage.windup", "must be >= 0");
    check!(errors, non_negative(def.barrage.cooldown), id, "barrage.cooldown", "must be >= 0");
    check_volley(&mut errors, id, "barrage.volley", &def.barrage.volley);

    let shield = &def.shield;
    check!(
        errors,
        non_negative(shield.shield_duration) && non_negative(shield.linger) && non_negative(shield.cooldown),
        id,
        "shield.timing",
        "durations must be >= 0"
    );
    check!(errors, positive(shield.shield_radius), id, "shield.shield_radius", "must be > 0");
    check!(
        errors,
        positive(shield.safe_zone_radius) && shield.arena_radius >= shield.safe_zone_radius,
        id,
        "shield.safe_zone_radius",
        "safe zone {} must be > 0 and fit the arena {}",
        shield.safe_zone_radius,
        shield.arena_radius
    );
    check!(errors, non_negative(shield.danger_damage), id, "shield.danger_damage", "must be >= 0");

    let jump = &def.jump;
    check!(
        errors,
        non_negative(jump.windup)
            && non_negative(jump.airtime)
            && non_negative(jump.recovery)
            && non_negative(jump.cooldown),
        id,
        "jump.timing",
        "durations must be >= 0"
    );
    check!(
        errors,
        non_negative(jump.landing_radius) && non_negative(jump.landing_damage),
        id,
        "jump.landing",
        "radius and damage must be >= 0"
    );

    // Phase
    let phase = &def.phase;
    check!(
        errors,
        phase.phase2_threshold > 0.0 && phase.phase2_threshold < 1.0,
        id,
        "phase.phase2_threshold",
        "must be in (0, 1), got {}",
        phase.phase2_threshold
    );
    check!(
        errors,
        positive(phase.movement_multiplier) && positive(phase.attack_speed_multiplier),
        id,
        "phase.multipliers",
        "must be > 0"
    );
    check!(
        errors,
        non_negative(phase.transition_duration),
        id,
        "phase.transition_duration",
        "must be >= 0"
    );
    if let Some(below) = phase.panic_retreat_below {
        check!(
            errors,
            below > 0.0 && below < 1.0,
            id,
            "phase.panic_retreat_below",
            "must be in (0, 1), got {}",
            below
        );
    }

    errors
}

/// Validate every boss in the registry.
pub fn validate_registry(registry: &BossRegistry) -> Vec<ValidationError> {
    registry.iter().flat_map(validate_boss).collect()
}
