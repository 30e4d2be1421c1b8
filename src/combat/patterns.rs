//! Combat domain: sequence builders for every boss action.
//!
//! Swing timings are divided by the attack cadence of the current phase.

use crate::combat::attacks::{ActionKind, AttackDefinition};
use crate::combat::collaborators::EffectKind;
use crate::combat::sequence::{
    SequenceLabel, SequenceStep, StepEffect, StepMarker, TimedSequence,
};
use crate::content::{BossDef, ShieldDef, VolleyDef};

fn scaled(seconds: f32, cadence: f32) -> f32 {
    if cadence > 0.0 {
        seconds / cadence
    } else {
        seconds
    }
}

/// Windup, startup, active window with the volume open, recovery.
pub fn strike(attack: &AttackDefinition, cadence: f32) -> TimedSequence {
    let mut active = vec![StepEffect::OpenVolume(attack.clone())];
    if attack.lunge > 0.0 {
        active.push(StepEffect::Lunge {
            distance: attack.lunge,
        });
    }

    TimedSequence::new(
        SequenceLabel::Action(attack.action),
        vec![
            SequenceStep::new(
                scaled(attack.windup, cadence),
                StepMarker::Windup,
                vec![
                    StepEffect::StopMoving,
                    StepEffect::FaceTarget,
                    StepEffect::AnimTrigger(attack.animation.clone()),
                ],
            ),
            SequenceStep::new(
                scaled(attack.active_start, cadence),
                StepMarker::Startup,
                Vec::new(),
            ),
            SequenceStep::new(
                scaled(attack.active_duration(), cadence),
                StepMarker::Active,
                active,
            ),
            SequenceStep::new(
                scaled(attack.recovery, cadence),
                StepMarker::Recovery,
                vec![StepEffect::CloseVolume, StepEffect::StopMoving],
            ),
            SequenceStep::instant(vec![StepEffect::ResumeMoving]),
        ],
    )
}

fn volley(volley: &VolleyDef, cadence: f32) -> impl Iterator<Item = SequenceStep> + '_ {
    (0..volley.count).map(move |_| {
        SequenceStep::new(
            scaled(volley.interval, cadence),
            StepMarker::Other,
            vec![
                StepEffect::FaceTarget,
                StepEffect::FireProjectile {
                    damage: volley.damage,
                    speed: volley.speed,
                },
            ],
        )
    })
}

/// Back away for a fixed time, stop, then fire the volley.
pub fn retreat_barrage(def: &BossDef, cadence: f32) -> TimedSequence {
    let retreat = &def.retreat;
    let mut steps = vec![SequenceStep::new(
        retreat.duration,
        StepMarker::Other,
        vec![
            StepEffect::AnimTrigger("Retreat".to_string()),
            StepEffect::MoveAway {
                distance: retreat.distance,
                speed: def.movement.retreat_speed,
            },
        ],
    )];
    steps.push(SequenceStep::instant(vec![
        StepEffect::StopMoving,
        StepEffect::FaceTarget,
        StepEffect::AnimTrigger("Barrage".to_string()),
    ]));
    steps.extend(volley(&retreat.volley, cadence));
    steps.push(SequenceStep::instant(vec![StepEffect::ResumeMoving]));

    TimedSequence::new(SequenceLabel::Action(ActionKind::Retreat), steps)
}

/// Stationary volley.
pub fn barrage(def: &BossDef, cadence: f32) -> TimedSequence {
    let barrage = &def.barrage;
    let mut steps = vec![SequenceStep::new(
        scaled(barrage.windup, cadence),
        StepMarker::Windup,
        vec![
            StepEffect::StopMoving,
            StepEffect::FaceTarget,
            StepEffect::AnimTrigger("Barrage".to_string()),
        ],
    )];
    steps.extend(volley(&barrage.volley, cadence));
    steps.push(SequenceStep::instant(vec![StepEffect::ResumeMoving]));

    TimedSequence::new(SequenceLabel::Action(ActionKind::Barrage), steps)
}

fn shielded(label: SequenceLabel, shield: &ShieldDef, hold: f32, animation: &str) -> TimedSequence {
    TimedSequence::new(
        label,
        vec![
            SequenceStep::instant(vec![
                StepEffect::StopMoving,
                StepEffect::AnimTrigger(animation.to_string()),
                StepEffect::SpawnAround {
                    kind: EffectKind::Shield,
                    radius: shield.shield_radius,
                    duration: hold + shield.linger,
                    damage: 0.0,
                },
                StepEffect::SpawnZones {
                    safe_radius: shield.safe_zone_radius,
                    arena_radius: shield.arena_radius,
                    duration: hold,
                    damage: shield.danger_damage,
                },
            ]),
            SequenceStep::wait(hold),
            SequenceStep::instant(vec![StepEffect::ResolveZones {
                damage: shield.danger_damage,
            }]),
            SequenceStep::wait(shield.linger),
            SequenceStep::instant(vec![StepEffect::ReleaseOwned, StepEffect::ResumeMoving]),
        ],
    )
}

/// Shield up, safe and danger zones placed, danger resolved after the hold.
pub fn shield_pattern(def: &BossDef) -> TimedSequence {
    shielded(
        SequenceLabel::Action(ActionKind::ShieldPattern),
        &def.shield,
        def.shield.shield_duration,
        "Shield",
    )
}

/// Forced shield variant played once at the phase threshold.
pub fn phase_transition(def: &BossDef) -> TimedSequence {
    shielded(
        SequenceLabel::PhaseTransition,
        &def.shield,
        def.phase.transition_duration,
        "PhaseTransition",
    )
}

/// Telegraph, leap to the predicted target position, landing slam, recovery.
pub fn jump(def: &BossDef, cadence: f32) -> TimedSequence {
    let jump = &def.jump;
    TimedSequence::new(
        SequenceLabel::Action(ActionKind::Jump),
        vec![
            SequenceStep::new(
                scaled(jump.windup, cadence),
                StepMarker::Windup,
                vec![
                    StepEffect::StopMoving,
                    StepEffect::FaceTarget,
                    StepEffect::AnimTrigger("Jump".to_string()),
                ],
            ),
            SequenceStep::new(
                jump.airtime,
                StepMarker::Startup,
                vec![StepEffect::LeapToTarget { lead: jump.airtime }],
            ),
            SequenceStep::new(
                scaled(jump.recovery, cadence),
                StepMarker::Recovery,
                vec![
                    StepEffect::StopMoving,
                    StepEffect::LandingSlam {
                        radius: jump.landing_radius,
                        damage: jump.landing_damage,
                    },
                ],
            ),
            SequenceStep::instant(vec![StepEffect::ResumeMoving]),
        ],
    )
}

/// The sequence for a selected action, or `None` when its strike data is missing.
pub fn for_action(def: &BossDef, action: ActionKind, cadence: f32) -> Option<TimedSequence> {
    match action {
        ActionKind::Melee | ActionKind::Heavy | ActionKind::Dash => {
            def.attack_for(action).map(|attack| strike(attack, cadence))
        }
        ActionKind::Jump => Some(jump(def, cadence)),
        ActionKind::Barrage => Some(barrage(def, cadence)),
        ActionKind::ShieldPattern => Some(shield_pattern(def)),
        ActionKind::Retreat => Some(retreat_barrage(def, cadence)),
    }
}
