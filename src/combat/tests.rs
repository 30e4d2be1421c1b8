//! Combat domain: unit tests for the controller and its building blocks.

use std::time::Duration;

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use super::bridge::rotate_towards;
use super::patterns;
use super::testing::{RecordingHost, boss_facing_target, run, seeded_def};
use super::{
    ActionKind, ActionSelector, Aggression, AttackVolume, Band, BandTracker, BossAgent, BossBody,
    BossController, BossDamageMessage, BossDefeatedEvent, BossEvent, CombatPlugin, CombatState,
    DamageGate, DamageIgnored, DropReason, EffectHandle, EffectKind, HostCommand, Phase,
    PhaseController, RangeClassifier, SelectionContext, SequenceLabel, SequenceOutcome,
    SequenceRunner, SequenceStatus, SequenceStep, StepEffect, StepMarker, TargetBody,
    TargetTracker, TimedSequence, TimerBank, TimerKey, facing_error_degrees,
};
use crate::content::{BossDef, PoolEntryDef};

const DT: f32 = 0.1;

/// Hound whose melee pool only holds the basic swing.
fn melee_only_def(reach: f32) -> BossDef {
    let mut def = seeded_def(11);
    for pool in &mut def.selector.pools {
        if pool.band == Band::Melee {
            pool.entries = vec![PoolEntryDef {
                action: ActionKind::Melee,
                weight: 1.0,
                unlock: Phase::Phase1,
            }];
        }
    }
    for attack in &mut def.attacks {
        attack.reach = reach;
    }
    def
}

fn count(events: &[BossEvent], wanted: &BossEvent) -> usize {
    events.iter().filter(|event| *event == wanted).count()
}

fn ctx(band: Band, phase: Phase) -> SelectionContext {
    SelectionContext {
        band,
        phase,
        facing: true,
        cadence: 1.0,
    }
}

// ============================================================================
// Timers
// ============================================================================

#[test]
fn test_timer_bank_counts_down_and_clamps() {
    let mut timers = TimerBank::new();
    assert!(timers.is_ready(TimerKey::AttackCooldown));

    timers.start(TimerKey::AttackCooldown, 1.0);
    assert!(timers.is_running(TimerKey::AttackCooldown));

    timers.tick(0.25);
    assert!((timers.remaining(TimerKey::AttackCooldown) - 0.75).abs() < 1e-6);

    timers.tick(5.0);
    assert_eq!(timers.remaining(TimerKey::AttackCooldown), 0.0);
    assert!(timers.is_ready(TimerKey::AttackCooldown));
}

#[test]
fn test_timer_bank_ignores_invalid_dt() {
    let mut timers = TimerBank::new();
    timers.start(TimerKey::Despawn, 2.0);
    timers.tick(-1.0);
    timers.tick(f32::NAN);
    assert_eq!(timers.remaining(TimerKey::Despawn), 2.0);

    timers.clear(TimerKey::Despawn);
    assert!(timers.is_ready(TimerKey::Despawn));
    assert_eq!(timers.get(TimerKey::Despawn).map(|t| t.progress()), Some(1.0));
}

// ============================================================================
// Range bands
// ============================================================================

#[test]
fn test_raw_band_edges() {
    let classifier = RangeClassifier::new(2.5, 6.0, 14.0, 0.3);
    assert_eq!(classifier.raw_band(0.0), Band::Melee);
    assert_eq!(classifier.raw_band(2.5), Band::Melee);
    assert_eq!(classifier.raw_band(2.51), Band::Mid);
    assert_eq!(classifier.raw_band(14.0), Band::Far);
    assert_eq!(classifier.raw_band(14.1), Band::OutOfRange);
    assert_eq!(classifier.raw_band(f32::NAN), Band::OutOfRange);
}

#[test]
fn test_band_hysteresis_does_not_flicker() {
    let mut bands = BandTracker::new(RangeClassifier::new(2.5, 6.0, 14.0, 0.3));

    assert_eq!(bands.update(2.0), (Band::Melee, true));
    // Jitter around the melee edge stays inside the buffer.
    for distance in [2.6, 2.4, 2.75, 2.45, 2.79, 2.3] {
        assert_eq!(bands.update(distance), (Band::Melee, false));
    }

    assert_eq!(bands.update(2.9), (Band::Mid, true));
    for distance in [2.6, 2.3, 2.7] {
        assert_eq!(bands.update(distance), (Band::Mid, false));
    }
    assert_eq!(bands.update(2.1), (Band::Melee, true));

    bands.reset();
    assert_eq!(bands.current(), None);
    assert_eq!(bands.update(2.7), (Band::Mid, true));
}

// ============================================================================
// Tracker
// ============================================================================

#[test]
fn test_tracker_velocity_and_prediction() {
    let mut tracker = TargetTracker::new();
    let first = tracker.update(Vec2::ZERO, Vec2::X, Some(Vec2::new(1.0, 0.0)), 0.5);
    assert_eq!(first.map(|fix| fix.velocity), Some(Vec2::ZERO));

    let second = tracker
        .update(Vec2::ZERO, Vec2::X, Some(Vec2::new(2.0, 0.0)), 0.5)
        .unwrap();
    assert_eq!(second.velocity, Vec2::new(2.0, 0.0));
    assert_eq!(second.distance, 2.0);
    assert_eq!(second.predict(1.0), Vec2::new(4.0, 0.0));
    assert!(second.is_facing(1.0));

    assert!(tracker.update(Vec2::ZERO, Vec2::X, None, 0.5).is_none());
    assert!(tracker.last().is_none());
}

#[test]
fn test_facing_error_degrees() {
    assert!((facing_error_degrees(Vec2::X, Vec2::Y) - 90.0).abs() < 1e-3);
    assert!((facing_error_degrees(Vec2::X, -Vec2::Y) - 90.0).abs() < 1e-3);
    assert!((facing_error_degrees(Vec2::X, -Vec2::X) - 180.0).abs() < 1e-3);
    assert_eq!(facing_error_degrees(Vec2::X, Vec2::ZERO), 0.0);
}

#[test]
fn test_rotate_towards_limits_turn() {
    let turned = rotate_towards(Vec2::X, Vec2::Y, 45.0);
    assert!((facing_error_degrees(turned, Vec2::X) - 45.0).abs() < 1e-3);

    let snapped = rotate_towards(Vec2::X, Vec2::new(1.0, 0.1), 45.0);
    assert!((snapped - Vec2::new(1.0, 0.1).normalize()).length() < 1e-5);

    assert_eq!(rotate_towards(Vec2::X, Vec2::ZERO, 45.0), Vec2::X);
}

// ============================================================================
// Damage and phase
// ============================================================================

#[test]
fn test_damage_gate_clamps_at_zero() {
    let mut gate = DamageGate::new(100.0, 0.0);

    let applied = gate.take_damage(30.0, 0.0).unwrap();
    assert_eq!(applied.health_after, 70.0);
    assert!(!applied.lethal);

    let applied = gate.take_damage(500.0, 1.0).unwrap();
    assert_eq!(applied.amount, 70.0);
    assert_eq!(gate.health(), 0.0);
    assert!(applied.lethal);

    assert_eq!(gate.take_damage(5.0, 2.0), Err(DamageIgnored::Dead));
}

#[test]
fn test_damage_gate_immunity_window() {
    let mut gate = DamageGate::new(100.0, 0.5);
    assert!(gate.take_damage(10.0, 1.0).is_ok());

    let ignored = gate.take_damage(10.0, 1.25);
    assert!(matches!(ignored, Err(DamageIgnored::Immune { .. })));
    assert_eq!(gate.health(), 90.0);

    assert!(gate.take_damage(10.0, 1.5).is_ok());
    assert_eq!(gate.health(), 80.0);
}

#[test]
fn test_damage_gate_rejects_invalid_amounts() {
    let mut gate = DamageGate::new(100.0, 0.0);
    for amount in [0.0, -5.0, f32::NAN, f32::INFINITY] {
        assert!(matches!(
            gate.take_damage(amount, 0.0),
            Err(DamageIgnored::InvalidAmount(_))
        ));
    }
    assert_eq!(gate.health(), 100.0);
    assert_eq!(gate.last_damage_at(), None);
}

#[test]
fn test_phase_controller_fires_once() {
    let mut phase = PhaseController::new(0.5, 1.3, 1.25);
    assert!(!phase.on_damage_applied(60.0, 100.0));
    assert!(phase.on_damage_applied(50.0, 100.0));
    assert!(!phase.on_damage_applied(10.0, 100.0));
    assert!(!phase.force());

    assert_eq!(phase.phase(), Phase::Phase1);
    assert_eq!(phase.movement_multiplier(), 1.0);
    assert!(phase.complete());
    assert!(!phase.complete());
    assert_eq!(phase.phase(), Phase::Phase2);
    assert_eq!(phase.attack_speed_multiplier(), 1.25);
}

// ============================================================================
// Selector
// ============================================================================

#[test]
fn test_pool_actions_respect_phase_unlock() {
    let selector = ActionSelector::from_def(&seeded_def(1));
    assert_eq!(selector.pool_actions(Band::Far, Phase::Phase1), vec![ActionKind::Jump]);
    assert_eq!(
        selector.pool_actions(Band::Far, Phase::Phase2),
        vec![ActionKind::Jump, ActionKind::Barrage]
    );
    assert!(selector.pool_actions(Band::OutOfRange, Phase::Phase2).is_empty());
}

#[test]
fn test_selector_gates_and_cooldowns() {
    let mut selector = ActionSelector::from_def(&seeded_def(3));
    let mut aggression = Aggression::default();
    let mut timers = TimerBank::new();

    let not_facing = SelectionContext {
        facing: false,
        ..ctx(Band::Melee, Phase::Phase1)
    };
    assert_eq!(selector.select_action(&not_facing, &mut aggression, &mut timers), None);

    let action = selector
        .select_action(&ctx(Band::Melee, Phase::Phase1), &mut aggression, &mut timers)
        .unwrap();
    assert!(timers.is_running(TimerKey::AttackCooldown));
    assert!(timers.is_running(TimerKey::Action(action)));
    assert!((timers.remaining(TimerKey::AttackCooldown) - 1.2).abs() < 1e-6);

    // The global gate blocks the next pick.
    assert_eq!(
        selector.select_action(&ctx(Band::Melee, Phase::Phase1), &mut aggression, &mut timers),
        None
    );
}

#[test]
fn test_selector_never_picks_locked_actions() {
    let mut selector = ActionSelector::from_def(&seeded_def(5));
    let mut aggression = Aggression::default();
    let mut saw_dash = false;

    for _ in 0..200 {
        let mut timers = TimerBank::new();
        let action = selector
            .select_action(&ctx(Band::Melee, Phase::Phase1), &mut aggression, &mut timers)
            .unwrap();
        assert_ne!(action, ActionKind::Dash);
    }
    for _ in 0..200 {
        let mut timers = TimerBank::new();
        let action = selector
            .select_action(&ctx(Band::Melee, Phase::Phase2), &mut aggression, &mut timers)
            .unwrap();
        saw_dash |= action == ActionKind::Dash;
    }
    assert!(saw_dash);
}

#[test]
fn test_selector_skips_actions_on_cooldown() {
    let mut selector = ActionSelector::from_def(&seeded_def(9));
    let mut aggression = Aggression::default();

    for _ in 0..50 {
        let mut timers = TimerBank::new();
        timers.start(TimerKey::Action(ActionKind::Jump), 10.0);
        assert_eq!(
            selector.select_action(&ctx(Band::Far, Phase::Phase1), &mut aggression, &mut timers),
            None
        );
    }
}

#[test]
fn test_aggression_strings_melee_then_calms() {
    let mut def = seeded_def(2);
    def.selector.aggression_bias = 1.0;
    def.selector.max_consecutive_attacks = 3;
    let mut selector = ActionSelector::from_def(&def);
    let mut aggression = Aggression::default();
    aggression.provoke();

    for swing in 1..=3 {
        let mut timers = TimerBank::new();
        let action =
            selector.select_action(&ctx(Band::Melee, Phase::Phase1), &mut aggression, &mut timers);
        assert_eq!(action, Some(ActionKind::Melee), "swing {swing}");
    }
    assert!(!aggression.active);
    assert_eq!(aggression.consecutive_attacks, 0);
}

#[test]
fn test_attack_bands_follow_selector_pools() {
    let mut def = seeded_def(3);
    let selector = ActionSelector::from_def(&def);
    assert!(selector.pool_actions(Band::Melee, Phase::Phase1).contains(&ActionKind::Heavy));
    assert!(!selector.pool_actions(Band::Far, Phase::Phase1).contains(&ActionKind::Heavy));

    for pool in &mut def.selector.pools {
        if pool.band == Band::Far {
            pool.entries = vec![PoolEntryDef {
                action: ActionKind::Heavy,
                weight: 1.0,
                unlock: Phase::Phase1,
            }];
        }
    }
    let mut selector = ActionSelector::from_def(&def);
    let mut timers = TimerBank::new();
    let action = selector.select_action(
        &ctx(Band::Far, Phase::Phase1),
        &mut Aggression::default(),
        &mut timers,
    );
    assert_eq!(action, Some(ActionKind::Heavy));
}

#[test]
fn test_calm_swings_do_not_shorten_a_later_string() {
    let mut def = seeded_def(5);
    def.selector.aggression_bias = 1.0;
    def.selector.max_consecutive_attacks = 3;
    let mut selector = ActionSelector::from_def(&def);
    let mut aggression = Aggression::default();

    for _ in 0..5 {
        let mut timers = TimerBank::new();
        let action =
            selector.select_action(&ctx(Band::Melee, Phase::Phase1), &mut aggression, &mut timers);
        assert!(action.is_some());
    }
    assert_eq!(aggression.consecutive_attacks, 0);

    aggression.provoke();
    let picks: Vec<_> = (0..3)
        .map(|_| {
            let mut timers = TimerBank::new();
            selector.select_action(&ctx(Band::Melee, Phase::Phase1), &mut aggression, &mut timers)
        })
        .collect();
    assert_eq!(picks, vec![Some(ActionKind::Melee); 3]);
    assert!(!aggression.active);
}

// ============================================================================
// Attack volume and sequence runner
// ============================================================================

#[test]
fn test_attack_volume_hits_once_per_enable() {
    let def = BossDef::default();
    let bite = def.attack_for(ActionKind::Melee).unwrap();
    let mut volume = AttackVolume::default();
    assert!(volume.try_hit().is_none());

    volume.enable(bite);
    assert!(volume.covers(2.0, 10.0));
    assert!(!volume.covers(2.0, 90.0));
    assert_eq!(volume.try_hit().map(|hit| hit.damage), Some(12.0));
    assert!(volume.try_hit().is_none());

    volume.disable();
    assert!(!volume.covers(1.0, 0.0));
    volume.enable(bite);
    assert!(volume.try_hit().is_some());
}

#[test]
fn test_runner_cascades_zero_length_steps() {
    let mut runner = SequenceRunner::new();
    let out = runner.start(TimedSequence::new(
        SequenceLabel::Action(ActionKind::Barrage),
        vec![
            SequenceStep::instant(vec![StepEffect::AnimTrigger("a".to_string())]),
            SequenceStep::instant(vec![StepEffect::AnimTrigger("b".to_string())]),
            SequenceStep::wait(1.0),
        ],
    ));
    assert_eq!(
        out.effects,
        vec![
            StepEffect::AnimTrigger("a".to_string()),
            StepEffect::AnimTrigger("b".to_string()),
        ]
    );
    assert_eq!(runner.cursor(), Some(2));

    let out = runner.tick(0.5);
    assert!(out.finished.is_none());
    let out = runner.tick(0.6);
    assert_eq!(out.finished.map(|end| end.outcome), Some(SequenceOutcome::Completed));
    assert_eq!(runner.status(), SequenceStatus::Completed);
    assert!(!runner.is_running());
}

#[test]
fn test_runner_cancel_closes_volume_and_releases() {
    let def = BossDef::default();
    let bite = def.attack_for(ActionKind::Melee).unwrap();
    let mut runner = SequenceRunner::new();
    runner.start(patterns::strike(bite, 1.0));
    assert!(runner.adopt(EffectHandle(7)));

    runner.tick(0.36);
    runner.tick(0.06);
    assert_eq!(runner.current_marker(), Some(StepMarker::Active));
    assert_eq!(runner.open_volumes(), 1);

    let out = runner.cancel();
    assert_eq!(runner.open_volumes(), 0);
    assert_eq!(out.released, vec![EffectHandle(7)]);
    assert_eq!(out.finished.map(|end| end.outcome), Some(SequenceOutcome::Aborted));
    assert_eq!(runner.status(), SequenceStatus::Aborted);
    assert!(!runner.adopt(EffectHandle(8)));
}

#[test]
fn test_runner_start_replaces_running_sequence() {
    let def = BossDef::default();
    let mut runner = SequenceRunner::new();
    runner.start(patterns::jump(&def, 1.0));
    runner.adopt(EffectHandle(3));

    let out = runner.start(patterns::barrage(&def, 1.0));
    assert_eq!(out.replaced, Some(SequenceLabel::Action(ActionKind::Jump)));
    assert_eq!(out.released, vec![EffectHandle(3)]);
    assert_eq!(runner.label(), Some(SequenceLabel::Action(ActionKind::Barrage)));
}

#[test]
fn test_runner_skip_requires_matching_marker() {
    let def = BossDef::default();
    let bite = def.attack_for(ActionKind::Melee).unwrap();
    let mut runner = SequenceRunner::new();
    runner.start(patterns::strike(bite, 1.0));

    assert!(runner.skip_step(&[StepMarker::Active]).is_none());
    assert!(runner.skip_to(StepMarker::Active).is_some());
    assert_eq!(runner.open_volumes(), 1);
    assert!(runner.skip_to(StepMarker::Windup).is_none());
}

#[test]
fn test_cadence_shortens_strikes() {
    let def = BossDef::default();
    let maul = def.attack_for(ActionKind::Heavy).unwrap();
    let normal = patterns::strike(maul, 1.0).total_duration();
    let fast = patterns::strike(maul, 2.0).total_duration();
    assert!((normal - maul.total_duration()).abs() < 1e-5);
    assert!((fast * 2.0 - normal).abs() < 1e-5);
}

// ============================================================================
// Controller
// ============================================================================

#[test]
fn test_controller_damage_reduces_health() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(1), host.collaborators());

    let applied = controller.take_damage(37.5).unwrap();
    assert_eq!(applied.health_after, 562.5);
    assert_eq!(controller.health(), 562.5);
    assert!(controller.aggression().active);

    let events = controller.drain_events();
    assert_eq!(
        count(&events, &BossEvent::DamageTaken { amount: 37.5, health: 562.5 }),
        1
    );
}

#[test]
fn test_controller_immunity_window_uses_tick_clock() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(1), host.collaborators());

    assert!(controller.take_damage(10.0).is_ok());
    assert!(matches!(
        controller.take_damage(10.0),
        Err(DamageIgnored::Immune { .. })
    ));
    assert_eq!(controller.health(), 590.0);

    controller.tick(0.25);
    assert!(controller.take_damage(10.0).is_ok());
    assert_eq!(controller.health(), 580.0);
}

#[test]
fn test_queued_damage_applies_on_next_tick() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(1), host.collaborators());

    controller.enqueue_damage(25.0);
    assert_eq!(controller.health(), 600.0);
    controller.tick(DT);
    assert_eq!(controller.health(), 575.0);
}

#[test]
fn test_phase_transition_completes_into_phase_two() {
    let mut def = seeded_def(4);
    def.max_health = 100.0;
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(def, host.collaborators());

    controller.take_damage(55.0).unwrap();
    assert_eq!(controller.health(), 45.0);
    assert_eq!(controller.state(), CombatState::PhaseTransition);
    assert_eq!(controller.phase(), Phase::Phase1);
    assert!(controller.phase_fired());

    run(&mut controller, 20, DT);
    assert_eq!(controller.state(), CombatState::PhaseTransition);
    assert_eq!(controller.phase(), Phase::Phase1);

    run(&mut controller, 25, DT);
    assert_eq!(controller.state(), CombatState::Idle);
    assert_eq!(controller.phase(), Phase::Phase2);
    assert_eq!(controller.cadence(), 1.25);

    let events = controller.drain_events();
    assert_eq!(count(&events, &BossEvent::PhaseTransitionStarted), 1);
    assert_eq!(count(&events, &BossEvent::PhaseChanged(Phase::Phase2)), 1);
    assert!(host.live_effects().is_empty());
}

#[test]
fn test_heal_does_not_rearm_phase_latch() {
    let mut def = seeded_def(4);
    def.max_health = 100.0;
    def.immunity_window = 0.0;
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(def, host.collaborators());

    controller.take_damage(55.0).unwrap();
    // Further hits during the transition neither restart it nor fire it again.
    controller.take_damage(5.0).unwrap();
    run(&mut controller, 45, DT);
    assert_eq!(controller.phase(), Phase::Phase2);

    assert_eq!(controller.heal(1000.0), 60.0);
    assert_eq!(controller.health(), 100.0);
    controller.drain_events();

    controller.take_damage(60.0).unwrap();
    assert_eq!(controller.state(), CombatState::Idle);
    let events = controller.drain_events();
    assert_eq!(count(&events, &BossEvent::PhaseTransitionStarted), 0);
    assert_eq!(controller.force_phase_transition(), Err(DropReason::AlreadyFired));
}

#[test]
fn test_forced_phase_transition_drops_other_requests() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(1), host.collaborators());

    assert_eq!(controller.force_phase_transition(), Ok(()));
    assert_eq!(controller.state(), CombatState::PhaseTransition);
    assert_eq!(controller.force_retreat(), Err(DropReason::TransitionRunning));
    assert_eq!(controller.force_shield_pattern(), Err(DropReason::TransitionRunning));
    assert_eq!(controller.force_phase_transition(), Err(DropReason::AlreadyFired));
}

#[test]
fn test_strike_volume_deals_a_single_hit() {
    let (mut controller, host) = boss_facing_target(melee_only_def(2.8), 2.0);

    controller.tick(DT);
    assert_eq!(controller.state(), CombatState::Executing(ActionKind::Melee));
    assert_eq!(host.triggers(), vec!["Bite".to_string()]);

    run(&mut controller, 5, DT);
    assert_eq!(host.target_damage(), vec![12.0]);
    assert_eq!(controller.report_volume_contact(), None);

    run(&mut controller, 3, DT);
    assert_eq!(host.target_damage(), vec![12.0]);
}

#[test]
fn test_animation_events_drive_the_strike() {
    let (mut controller, _host) = boss_facing_target(melee_only_def(1.0), 2.0);
    controller.tick(DT);
    assert_eq!(controller.runner().current_marker(), Some(StepMarker::Windup));

    controller.on_active_start();
    assert_eq!(controller.runner().current_marker(), Some(StepMarker::Active));
    assert_eq!(controller.open_volumes(), 1);

    controller.on_active_end();
    assert_eq!(controller.runner().current_marker(), Some(StepMarker::Recovery));
    assert_eq!(controller.open_volumes(), 0);

    controller.on_sequence_end();
    assert_eq!(controller.state(), CombatState::Idle);
    let events = controller.drain_events();
    assert_eq!(count(&events, &BossEvent::ActionFinished(ActionKind::Melee)), 1);
}

#[test]
fn test_force_retreat_mid_active_closes_volume() {
    let (mut controller, host) = boss_facing_target(melee_only_def(1.0), 2.0);
    run(&mut controller, 6, DT);
    assert_eq!(controller.runner().current_marker(), Some(StepMarker::Active));
    assert_eq!(controller.open_volumes(), 1);

    assert_eq!(controller.force_retreat(), Ok(()));
    assert_eq!(controller.state(), CombatState::Retreating);
    assert_eq!(controller.open_volumes(), 0);
    assert_eq!(host.last_destination(), Some(Vec2::new(-8.0, 0.0)));

    // The swing's late animation events must not touch the retreat.
    controller.on_active_end();
    controller.on_sequence_end();
    assert_eq!(controller.state(), CombatState::Retreating);
    assert_eq!(controller.report_volume_contact(), None);

    run(&mut controller, 5, DT);
    assert!(host.target_damage().is_empty());

    let events = controller.drain_events();
    assert_eq!(count(&events, &BossEvent::ActionAborted(ActionKind::Melee)), 1);
    assert_eq!(count(&events, &BossEvent::ActionStarted(ActionKind::Retreat)), 1);
}

#[test]
fn test_target_lost_mid_retreat_returns_to_idle() {
    let (mut controller, host) = boss_facing_target(seeded_def(1), 10.0);
    controller.force_retreat().unwrap();
    controller.tick(DT);
    assert_eq!(controller.state(), CombatState::Retreating);

    host.set_target(None);
    controller.tick(DT);
    assert_eq!(controller.state(), CombatState::Idle);
    assert!(!controller.runner().is_running());
    assert_eq!(host.projectiles(), 0);

    let events = controller.drain_events();
    assert_eq!(count(&events, &BossEvent::TargetLost), 1);
    assert_eq!(count(&events, &BossEvent::ActionFinished(ActionKind::Retreat)), 1);
}

#[test]
fn test_rotation_gives_up_after_timeout() {
    let host = RecordingHost::new(Vec2::ZERO, Some(Vec2::new(0.0, 5.0)));
    let mut controller = BossController::new(seeded_def(1), host.collaborators());

    controller.tick(DT);
    assert_eq!(controller.state(), CombatState::RotatingToFace);

    run(&mut controller, 19, DT);
    assert_eq!(controller.state(), CombatState::Idle);
    assert!(controller.timers().is_running(TimerKey::AttackCooldown));
    let events = controller.drain_events();
    assert_eq!(count(&events, &BossEvent::RotationGaveUp), 1);
    assert!(
        host.commands()
            .iter()
            .any(|command| matches!(command, HostCommand::FaceTowards { .. }))
    );
}

#[test]
fn test_rotation_engages_once_facing() {
    let host = RecordingHost::new(Vec2::ZERO, Some(Vec2::new(0.0, 5.0)));
    let mut controller = BossController::new(seeded_def(1), host.collaborators());

    run(&mut controller, 3, DT);
    assert_eq!(controller.state(), CombatState::RotatingToFace);

    host.set_facing(Vec2::Y);
    controller.tick(DT);
    assert!(controller.state().is_busy());
    assert_eq!(count(&controller.drain_events(), &BossEvent::RotationGaveUp), 0);
}

#[test]
fn test_out_of_range_target_is_ignored() {
    let (mut controller, _host) = boss_facing_target(seeded_def(1), 30.0);
    run(&mut controller, 10, DT);
    assert_eq!(controller.state(), CombatState::Idle);
    assert_eq!(controller.band(), Some(Band::OutOfRange));
    assert!(controller.timers().is_ready(TimerKey::AttackCooldown));
}

#[test]
fn test_death_emits_despawn_once() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(1), host.collaborators());

    assert!(controller.kill());
    assert!(!controller.kill());
    assert!(controller.is_dead());
    assert!(host.triggers().contains(&"Die".to_string()));
    assert_eq!(controller.take_damage(5.0), Err(DamageIgnored::Dead));
    assert_eq!(controller.force_retreat(), Err(DropReason::Dead));
    assert_eq!(controller.force_phase_transition(), Err(DropReason::Dead));

    run(&mut controller, 20, 0.5);
    let events = controller.drain_events();
    assert_eq!(count(&events, &BossEvent::Died), 1);
    assert_eq!(count(&events, &BossEvent::DespawnReady), 1);
}

#[test]
fn test_lethal_hit_mid_swing_closes_volume() {
    let (mut controller, host) = boss_facing_target(melee_only_def(1.0), 2.0);
    run(&mut controller, 6, DT);
    assert_eq!(controller.open_volumes(), 1);

    controller.take_damage(10_000.0).unwrap();
    assert_eq!(controller.state(), CombatState::Dead);
    assert_eq!(controller.open_volumes(), 0);
    assert_eq!(controller.health(), 0.0);

    run(&mut controller, 5, DT);
    assert!(host.target_damage().is_empty());
}

#[test]
fn test_shield_pattern_releases_every_zone() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(6), host.collaborators());

    controller.force_shield_pattern().unwrap();
    assert_eq!(controller.state(), CombatState::ShieldPattern);
    assert_eq!(controller.runner().owned_effects().len(), 3);
    assert_eq!(host.spawned(EffectKind::Shield).len(), 1);
    assert_eq!(host.spawned(EffectKind::DangerZone).len(), 1);

    let (_, center, radius) = host.spawned(EffectKind::SafeZone)[0];
    assert_eq!(radius, 2.5);
    assert!(center.length() <= 12.0 - 2.5 + 1e-4);
    assert!(controller.safe_zone().is_some());

    run(&mut controller, 70, DT);
    assert_eq!(controller.state(), CombatState::Idle);
    assert!(host.live_effects().is_empty());
}

#[test]
fn test_shield_pattern_abort_releases_zones() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(6), host.collaborators());

    controller.force_shield_pattern().unwrap();
    run(&mut controller, 5, DT);
    controller.force_retreat().unwrap();

    assert!(host.live_effects().is_empty());
    assert!(controller.safe_zone().is_none());
}

#[test]
fn test_danger_zone_hits_target_outside_safe_zone() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(8), host.collaborators());
    controller.force_shield_pattern().unwrap();

    let zone = controller.safe_zone().unwrap();
    host.set_target(Some(zone.center + Vec2::new(zone.radius + 3.0, 0.0)));

    run(&mut controller, 55, DT);
    assert_eq!(controller.state(), CombatState::ShieldPattern);
    assert_eq!(host.target_damage(), vec![40.0]);
}

#[test]
fn test_safe_zone_protects_target() {
    let host = RecordingHost::new(Vec2::ZERO, None);
    let mut controller = BossController::new(seeded_def(8), host.collaborators());
    controller.force_shield_pattern().unwrap();

    let zone = controller.safe_zone().unwrap();
    host.set_target(Some(zone.center));

    run(&mut controller, 55, DT);
    assert!(host.target_damage().is_empty());
}

#[test]
fn test_panic_retreat_fires_once_after_transition() {
    let mut def = seeded_def(4);
    def.max_health = 100.0;
    def.immunity_window = 0.0;
    def.phase.panic_retreat_below = Some(0.2);
    let (mut controller, _host) = boss_facing_target(def, 30.0);

    controller.take_damage(85.0).unwrap();
    assert_eq!(controller.state(), CombatState::PhaseTransition);
    controller.take_damage(1.0).unwrap();
    assert_eq!(controller.state(), CombatState::PhaseTransition);

    run(&mut controller, 45, DT);
    assert_eq!(controller.state(), CombatState::Idle);

    controller.take_damage(1.0).unwrap();
    assert_eq!(controller.state(), CombatState::Retreating);

    controller.force_shield_pattern().unwrap();
    controller.take_damage(1.0).unwrap();
    assert_eq!(controller.state(), CombatState::ShieldPattern);
}

#[test]
fn test_jump_leaps_to_target_and_slams_on_landing() {
    let (mut controller, host) = boss_facing_target(seeded_def(2), 10.0);

    // Far band in phase one only offers the jump.
    controller.tick(DT);
    assert_eq!(controller.state(), CombatState::JumpSequence);

    run(&mut controller, 9, DT);
    assert!(host.triggers().contains(&"Jump".to_string()));
    assert_eq!(host.last_destination(), Some(Vec2::new(10.0, 0.0)));
    assert!(host.target_damage().is_empty());

    host.set_position(Vec2::new(9.0, 0.0));
    run(&mut controller, 10, DT);
    assert_eq!(host.target_damage(), vec![25.0]);
    assert_eq!(host.spawned(EffectKind::LandingSlam).len(), 1);
    assert!(host.triggers().contains(&"Land".to_string()));
}

#[test]
fn test_off_nav_mesh_skips_navigation() {
    let (mut controller, host) = boss_facing_target(seeded_def(1), 10.0);
    host.set_on_nav_mesh(false);

    run(&mut controller, 10, DT);
    controller.force_retreat().unwrap();
    run(&mut controller, 5, DT);

    assert_eq!(host.navigation_calls(), 0);
    assert!(!host.triggers().is_empty());
}

#[test]
fn test_idle_boss_chases_target_in_range() {
    let mut def = seeded_def(1);
    def.selector.pools.retain(|pool| pool.band != Band::Far);
    let (mut controller, host) = boss_facing_target(def, 20.0);

    // Out of range: hold position.
    controller.tick(DT);
    assert_eq!(host.last_destination(), None);

    // Far band with nothing to pick: close the distance.
    host.set_target(Some(Vec2::new(10.0, 0.0)));
    controller.tick(DT);
    assert_eq!(controller.state(), CombatState::Idle);
    assert_eq!(controller.band(), Some(Band::Far));
    assert_eq!(host.last_destination(), Some(Vec2::new(10.0, 0.0)));
    assert!(host.commands().contains(&HostCommand::SetSpeed(4.0)));
    assert!(host.commands().contains(&HostCommand::Resume));
}

#[test]
fn test_snapshot_reflects_state() {
    let (mut controller, _host) = boss_facing_target(melee_only_def(1.0), 2.0);
    run(&mut controller, 6, DT);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.id, "boss_hound");
    assert_eq!(snapshot.state, CombatState::Executing(ActionKind::Melee));
    assert!(snapshot.busy);
    assert_eq!(snapshot.band, Some(Band::Melee));
    assert_eq!(snapshot.open_volumes, 1);
    assert_eq!(snapshot.target_distance, Some(2.0));
    assert!(snapshot.attack_cooldown > 0.0);
}

// ============================================================================
// ECS integration
// ============================================================================

#[derive(Resource, Default)]
struct Defeated(Vec<Entity>);

fn record_defeats(mut reader: MessageReader<BossDefeatedEvent>, mut defeated: ResMut<Defeated>) {
    defeated.0.extend(reader.read().map(|event| event.boss));
}

fn combat_app() -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .init_resource::<Defeated>()
        .add_plugins(CombatPlugin)
        .add_systems(PostUpdate, record_defeats);
    app
}

fn step(app: &mut App, seconds: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(seconds));
    app.update();
}

fn spawn_fight(app: &mut App, def: BossDef) -> (Entity, Entity) {
    let target = app
        .world_mut()
        .spawn(TargetBody::new(Vec2::new(2.0, 0.0), 400.0))
        .id();
    let boss = app
        .world_mut()
        .spawn((BossAgent::new(def, Some(target)), BossBody::new(Vec2::ZERO)))
        .id();
    (boss, target)
}

#[test]
fn test_plugin_applies_damage_messages() {
    let mut app = combat_app();
    let (boss, _) = spawn_fight(&mut app, melee_only_def(1.0));

    app.world_mut()
        .write_message(BossDamageMessage { boss, amount: 50.0 });
    step(&mut app, DT);

    let health = app
        .world()
        .get::<BossAgent>(boss)
        .map(|agent| agent.controller.health());
    assert_eq!(health, Some(550.0));
}

#[test]
fn test_plugin_swing_damages_target_body() {
    let mut app = combat_app();
    let (_, target) = spawn_fight(&mut app, melee_only_def(2.8));

    for _ in 0..8 {
        step(&mut app, DT);
    }

    let health = app.world().get::<TargetBody>(target).map(|body| body.health);
    assert_eq!(health, Some(388.0));
}

#[test]
fn test_plugin_despawns_defeated_boss() {
    let mut app = combat_app();
    let mut def = melee_only_def(1.0);
    def.death_linger = 0.3;
    let (boss, _) = spawn_fight(&mut app, def);

    app.world_mut()
        .write_message(BossDamageMessage { boss, amount: 10_000.0 });
    for _ in 0..8 {
        step(&mut app, DT);
    }

    assert!(app.world().get::<BossAgent>(boss).is_none());
    assert_eq!(app.world().resource::<Defeated>().0, vec![boss]);
}

#[test]
fn test_plugin_runs_on_minimal_plugins() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(CombatPlugin);
    let (boss, _) = spawn_fight(&mut app, melee_only_def(1.0));

    app.world_mut()
        .write_message(BossDamageMessage { boss, amount: 50.0 });
    for _ in 0..3 {
        app.update();
    }

    let health = app
        .world()
        .get::<BossAgent>(boss)
        .map(|agent| agent.controller.health());
    assert_eq!(health, Some(550.0));
}
