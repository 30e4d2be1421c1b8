//! Combat domain: the boss controller.
//!
//! `tick` runs in a fixed order: timers, queued damage, target tracking with band and
//! state evaluation, the active sequence, then movement and animation intents. A lethal
//! hit applied in the second step is observed before the sequence advances.

use std::f32::consts::TAU;
use std::fmt;

use bevy::math::Vec2;
use bevy::prelude::{debug, info, warn};
use serde::Serialize;

use crate::combat::attacks::ActionKind;
use crate::combat::collaborators::{Collaborators, DamageTarget, EffectHandle, EffectKind};
use crate::combat::damage::{AppliedDamage, DamageGate, DamageIgnored};
use crate::combat::events::{BossEvent, HitSource};
use crate::combat::patterns;
use crate::combat::phase::{Phase, PhaseController};
use crate::combat::range::{Band, BandTracker, RangeClassifier};
use crate::combat::selector::{ActionSelector, Aggression, SelectionContext};
use crate::combat::sequence::{
    SequenceEnd, SequenceLabel, SequenceOutcome, SequenceOutput, SequenceRunner, StepEffect,
    StepMarker, TimedSequence,
};
use crate::combat::state::CombatState;
use crate::combat::timers::{TimerBank, TimerKey};
use crate::combat::tracker::{TargetFix, TargetTracker};
use crate::content::BossDef;

/// How long the landing-slam marker stays in the world.
const SLAM_MARKER_SECONDS: f32 = 0.4;

/// A sequence step that could not be applied. The sequence is aborted and the boss idles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepError {
    TargetLost,
    InvalidDestination(Vec2),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::TargetLost => write!(f, "target lost"),
            StepError::InvalidDestination(point) => write!(f, "non-finite destination {point}"),
        }
    }
}

impl std::error::Error for StepError {}

/// Why a forced request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Dead,
    TransitionRunning,
    /// The phase transition has already fired once
    AlreadyFired,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Dead => write!(f, "boss is dead"),
            DropReason::TransitionRunning => write!(f, "phase transition in progress"),
            DropReason::AlreadyFired => write!(f, "phase transition already fired"),
        }
    }
}

impl std::error::Error for DropReason {}

/// Safe zone of the running shield pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeZone {
    pub center: Vec2,
    pub radius: f32,
}

impl SafeZone {
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) <= self.radius
    }
}

/// Read-only view of a controller, serialised for the debug overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossSnapshot {
    pub id: String,
    pub state: CombatState,
    pub busy: bool,
    pub phase: Phase,
    pub phase_fired: bool,
    pub health: f32,
    pub max_health: f32,
    pub band: Option<Band>,
    pub target_distance: Option<f32>,
    pub aggression: Aggression,
    pub sequence_step: Option<usize>,
    pub open_volumes: usize,
    pub owned_effects: usize,
    pub attack_cooldown: f32,
    pub clock: f64,
}

/// Drives one boss through the fight.
pub struct BossController {
    host: Collaborators,
    state: CombatState,
    timers: TimerBank,
    tracker: TargetTracker,
    bands: BandTracker,
    selector: ActionSelector,
    aggression: Aggression,
    runner: SequenceRunner,
    phase: PhaseController,
    gate: DamageGate,
    clock: f64,
    tick_count: u64,
    started_on_tick: Option<u64>,
    inbox: Vec<f32>,
    events: Vec<BossEvent>,
    safe_zone: Option<SafeZone>,
    target_present: bool,
    panic_fired: bool,
    despawn_sent: bool,
    def: BossDef,
}

impl BossController {
    pub fn new(def: BossDef, host: Collaborators) -> Self {
        let bands = &def.bands;
        let classifier =
            RangeClassifier::new(bands.melee_edge, bands.mid_edge, bands.far_edge, bands.buffer);

        Self {
            host,
            state: CombatState::Idle,
            timers: TimerBank::new(),
            tracker: TargetTracker::new(),
            bands: BandTracker::new(classifier),
            selector: ActionSelector::from_def(&def),
            aggression: Aggression::default(),
            runner: SequenceRunner::new(),
            phase: PhaseController::new(
                def.phase.phase2_threshold,
                def.phase.movement_multiplier,
                def.phase.attack_speed_multiplier,
            ),
            gate: DamageGate::new(def.max_health, def.immunity_window),
            clock: 0.0,
            tick_count: 0,
            started_on_tick: None,
            inbox: Vec::new(),
            events: Vec::new(),
            safe_zone: None,
            target_present: false,
            panic_fired: false,
            despawn_sent: false,
            def,
        }
    }

    pub fn def(&self) -> &BossDef {
        &self.def
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    pub fn phase_fired(&self) -> bool {
        self.phase.has_fired()
    }

    pub fn health(&self) -> f32 {
        self.gate.health()
    }

    pub fn max_health(&self) -> f32 {
        self.gate.max_health()
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_dead()
    }

    pub fn band(&self) -> Option<Band> {
        self.bands.current()
    }

    pub fn aggression(&self) -> Aggression {
        self.aggression
    }

    pub fn timers(&self) -> &TimerBank {
        &self.timers
    }

    pub fn runner(&self) -> &SequenceRunner {
        &self.runner
    }

    pub fn open_volumes(&self) -> usize {
        self.runner.open_volumes()
    }

    pub fn safe_zone(&self) -> Option<SafeZone> {
        self.safe_zone
    }

    /// Simulation time in seconds, advanced by `tick`.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn movement_multiplier(&self) -> f32 {
        self.phase.movement_multiplier()
    }

    /// Attack cadence of the current phase.
    pub fn cadence(&self) -> f32 {
        self.phase.attack_speed_multiplier()
    }

    /// Swap the tracked target; `None` leaves the boss idling.
    pub fn set_target(&mut self, target: Option<Box<dyn DamageTarget>>) {
        self.host.target = target;
    }

    pub fn drain_events(&mut self) -> Vec<BossEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> BossSnapshot {
        BossSnapshot {
            id: self.def.id.clone(),
            state: self.state,
            busy: self.state.is_busy(),
            phase: self.phase.phase(),
            phase_fired: self.phase.has_fired(),
            health: self.gate.health(),
            max_health: self.gate.max_health(),
            band: self.bands.current(),
            target_distance: self.tracker.last().map(|fix| fix.distance),
            aggression: self.aggression,
            sequence_step: self.runner.cursor(),
            open_volumes: self.runner.open_volumes(),
            owned_effects: self.runner.owned_effects().len(),
            attack_cooldown: self.timers.remaining(TimerKey::AttackCooldown),
            clock: self.clock,
        }
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        self.tick_count += 1;
        self.clock += f64::from(dt);
        self.timers.tick(dt);

        if self.state.is_dead() {
            self.tick_dead();
            return;
        }

        self.drain_inbox();
        if self.state.is_dead() {
            return;
        }

        let fix = self.refresh_target(dt);
        self.evaluate(fix, dt);

        // A sequence started during this tick begins advancing on the next one.
        if self.runner.is_running() && self.started_on_tick != Some(self.tick_count) {
            let out = self.runner.tick(dt);
            self.apply_output(out);
        }
        self.check_volume_contact();

        self.emit_intents(dt);
    }

    fn tick_dead(&mut self) {
        if !self.despawn_sent && self.timers.is_ready(TimerKey::Despawn) {
            self.despawn_sent = true;
            info!("Boss {} ready to despawn", self.def.id);
            self.events.push(BossEvent::DespawnReady);
        }
    }

    fn refresh_target(&mut self, dt: f32) -> Option<TargetFix> {
        let origin = self.host.navigation.position();
        let facing = self.host.navigation.facing();
        let target = self.host.target_position();
        let fix = self.tracker.update(origin, facing, target, dt);

        match (fix.is_some(), self.target_present) {
            (true, false) => {
                info!("Boss {} acquired target", self.def.id);
                self.events.push(BossEvent::TargetAcquired);
            }
            (false, true) => {
                info!("Boss {} lost target", self.def.id);
                self.events.push(BossEvent::TargetLost);
                self.bands.reset();
            }
            _ => {}
        }
        self.target_present = fix.is_some();
        fix
    }

    fn evaluate(&mut self, fix: Option<TargetFix>, dt: f32) {
        let Some(fix) = fix else {
            self.without_target();
            return;
        };

        let (band, changed) = self.bands.update(fix.distance);
        if changed {
            debug!(
                "Boss {} band -> {:?} at distance {:.2}",
                self.def.id, band, fix.distance
            );
        }

        match self.state {
            CombatState::Idle => self.engage(fix, band),
            CombatState::RotatingToFace => self.rotate(fix, band, dt),
            CombatState::Executing(action) if action.is_strike() => {
                if self.runner.current_marker() == Some(StepMarker::Windup) {
                    self.host
                        .navigation
                        .face_towards(fix.position, self.def.facing.turn_rate * dt);
                }
            }
            _ => {}
        }
    }

    fn without_target(&mut self) {
        match self.state {
            CombatState::Retreating => {
                info!("Boss {} lost its target mid-retreat, finishing early", self.def.id);
                let out = self.runner.finish_now();
                self.apply_output(out);
            }
            CombatState::Executing(action) => {
                info!(
                    "Boss {} lost its target, aborting {}",
                    self.def.id,
                    action.label()
                );
                self.abort_sequence();
                self.return_to_idle();
            }
            CombatState::JumpSequence => {
                info!("Boss {} lost its target, aborting jump", self.def.id);
                self.abort_sequence();
                self.return_to_idle();
            }
            CombatState::RotatingToFace => {
                self.timers.clear(TimerKey::RotationTimeout);
                self.set_state(CombatState::Idle);
            }
            _ => {}
        }
    }

    fn engage(&mut self, fix: TargetFix, band: Band) {
        if band == Band::OutOfRange {
            return;
        }

        let facing = fix.is_facing(self.def.facing.angle_threshold);
        if !facing {
            let has_actions = !self
                .selector
                .pool_actions(band, self.phase.phase())
                .is_empty();
            if has_actions && self.timers.is_ready(TimerKey::AttackCooldown) {
                debug!(
                    "Boss {} turning to face target ({:.0} deg off)",
                    self.def.id, fix.facing_error
                );
                self.timers
                    .start(TimerKey::RotationTimeout, self.def.facing.rotation_timeout);
                self.set_state(CombatState::RotatingToFace);
                self.host.nav_stop();
            }
            return;
        }

        let ctx = SelectionContext {
            band,
            phase: self.phase.phase(),
            facing,
            cadence: self.cadence(),
        };
        if let Some(action) =
            self.selector
                .select_action(&ctx, &mut self.aggression, &mut self.timers)
        {
            self.begin_action(action);
        }
    }

    fn rotate(&mut self, fix: TargetFix, band: Band, dt: f32) {
        if fix.is_facing(self.def.facing.angle_threshold) {
            self.timers.clear(TimerKey::RotationTimeout);
            self.set_state(CombatState::Idle);
            self.engage(fix, band);
            return;
        }

        if self.timers.is_ready(TimerKey::RotationTimeout) {
            warn!(
                "Boss {} gave up turning to face target after {:.1}s",
                self.def.id, self.def.facing.rotation_timeout
            );
            self.events.push(BossEvent::RotationGaveUp);
            self.timers.start(
                TimerKey::AttackCooldown,
                self.def.selector.global_cooldown / self.cadence(),
            );
            self.set_state(CombatState::Idle);
            return;
        }

        self.host
            .navigation
            .face_towards(fix.position, self.def.facing.turn_rate * dt);
    }

    fn check_volume_contact(&mut self) {
        let Some(fix) = self.tracker.last().copied() else {
            return;
        };
        let in_reach = self
            .runner
            .volume()
            .is_some_and(|volume| !volume.has_hit() && volume.covers(fix.distance, fix.facing_error));
        if in_reach {
            self.report_volume_contact();
        }
    }

    fn emit_intents(&mut self, dt: f32) {
        let speed = self.host.navigation.current_velocity().length();
        self.host.animation.set_float("Speed", speed);

        if self.state != CombatState::Idle {
            return;
        }

        let Some(fix) = self.tracker.last().copied() else {
            self.host.nav_stop();
            return;
        };

        let in_range = self.bands.current().is_some_and(|band| band != Band::OutOfRange);
        if in_range && fix.distance > self.def.movement.stop_distance {
            self.host
                .nav_set_speed(self.def.movement.chase_speed * self.phase.movement_multiplier());
            self.host.nav_set_destination(fix.position);
            self.host.nav_resume();
        } else {
            self.host.nav_stop();
            if in_range {
                self.host
                    .navigation
                    .face_towards(fix.position, self.def.facing.turn_rate * dt);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Damage
    // ------------------------------------------------------------------------

    /// Apply damage immediately at the current simulation time.
    pub fn take_damage(&mut self, amount: f32) -> Result<AppliedDamage, DamageIgnored> {
        self.apply_damage(amount)
    }

    /// Queue damage for the next tick, where it is applied before state evaluation.
    pub fn enqueue_damage(&mut self, amount: f32) {
        self.inbox.push(amount);
    }

    fn drain_inbox(&mut self) {
        for amount in std::mem::take(&mut self.inbox) {
            // Ignored hits are already logged.
            let _ = self.apply_damage(amount);
        }
    }

    fn apply_damage(&mut self, amount: f32) -> Result<AppliedDamage, DamageIgnored> {
        let applied = match self.gate.take_damage(amount, self.clock) {
            Ok(applied) => applied,
            Err(reason) => {
                match reason {
                    DamageIgnored::Immune { .. } => {
                        debug!("Boss {} ignored damage: {}", self.def.id, reason)
                    }
                    _ => warn!("Boss {} rejected damage: {}", self.def.id, reason),
                }
                return Err(reason);
            }
        };

        debug!(
            "Boss {} took {:.1} damage ({:.1} -> {:.1})",
            self.def.id, applied.amount, applied.health_before, applied.health_after
        );
        self.events.push(BossEvent::DamageTaken {
            amount: applied.amount,
            health: applied.health_after,
        });
        self.aggression.provoke();

        if applied.lethal {
            self.enter_dead();
        } else if self
            .phase
            .on_damage_applied(applied.health_after, self.gate.max_health())
        {
            self.enter_phase_transition();
        } else {
            self.check_panic_retreat();
        }
        Ok(applied)
    }

    fn check_panic_retreat(&mut self) {
        let Some(below) = self.def.phase.panic_retreat_below else {
            return;
        };
        if self.panic_fired
            || self.gate.ratio() >= below
            || matches!(self.state, CombatState::PhaseTransition | CombatState::Dead)
        {
            return;
        }
        self.panic_fired = true;
        info!(
            "Boss {} panics at {:.0}% health",
            self.def.id,
            self.gate.ratio() * 100.0
        );
        self.begin_forced(ActionKind::Retreat);
    }

    /// Restore health, clamped at max. The phase latch is never re-armed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let restored = self.gate.heal(amount);
        if restored > 0.0 {
            debug!("Boss {} healed {:.1}", self.def.id, restored);
        }
        restored
    }

    /// Drop health to zero, bypassing the immunity window.
    pub fn kill(&mut self) -> bool {
        let Some(applied) = self.gate.kill(self.clock) else {
            return false;
        };
        self.events.push(BossEvent::DamageTaken {
            amount: applied.amount,
            health: 0.0,
        });
        self.enter_dead();
        true
    }

    fn enter_dead(&mut self) {
        if self.state.is_dead() {
            return;
        }
        self.abort_sequence();
        self.set_state(CombatState::Dead);
        self.aggression.calm();
        self.host.nav_stop();
        self.host.animation.set_bool("Dead", true);
        self.host.animation.set_trigger("Die");
        self.timers.start(TimerKey::Despawn, self.def.death_linger);
        self.events.push(BossEvent::Died);
        info!("Boss {} defeated", self.def.id);
    }

    // ------------------------------------------------------------------------
    // Forced transitions
    // ------------------------------------------------------------------------

    fn check_forceable(&self, request: &str) -> Result<(), DropReason> {
        let reason = match self.state {
            CombatState::Dead => DropReason::Dead,
            CombatState::PhaseTransition => DropReason::TransitionRunning,
            _ => return Ok(()),
        };
        warn!("Boss {} dropped forced {}: {}", self.def.id, request, reason);
        Err(reason)
    }

    /// Cancel whatever is running and back away, then fire the retreat volley.
    pub fn force_retreat(&mut self) -> Result<(), DropReason> {
        self.check_forceable("retreat")?;
        info!("Boss {} forced to retreat", self.def.id);
        self.begin_forced(ActionKind::Retreat);
        Ok(())
    }

    pub fn force_shield_pattern(&mut self) -> Result<(), DropReason> {
        self.check_forceable("shield pattern")?;
        info!("Boss {} forced into shield pattern", self.def.id);
        self.begin_forced(ActionKind::ShieldPattern);
        Ok(())
    }

    /// Fire the phase transition now. Spends the one-shot latch.
    pub fn force_phase_transition(&mut self) -> Result<(), DropReason> {
        if self.state.is_dead() {
            warn!("Boss {} dropped forced phase transition: {}", self.def.id, DropReason::Dead);
            return Err(DropReason::Dead);
        }
        if !self.phase.force() {
            warn!(
                "Boss {} dropped forced phase transition: {}",
                self.def.id,
                DropReason::AlreadyFired
            );
            return Err(DropReason::AlreadyFired);
        }
        self.enter_phase_transition();
        Ok(())
    }

    fn begin_forced(&mut self, action: ActionKind) {
        self.abort_sequence();
        self.timers.start(
            TimerKey::Action(action),
            self.def.action_cooldown(action) / self.cadence(),
        );
        self.begin_action(action);
    }

    fn enter_phase_transition(&mut self) {
        self.abort_sequence();
        info!(
            "Boss {} entering phase transition at {:.0}% health",
            self.def.id,
            self.gate.ratio() * 100.0
        );
        self.events.push(BossEvent::PhaseTransitionStarted);
        self.set_state(CombatState::PhaseTransition);
        let sequence = patterns::phase_transition(&self.def);
        self.start_sequence(sequence);
    }

    // ------------------------------------------------------------------------
    // Sequences
    // ------------------------------------------------------------------------

    fn begin_action(&mut self, action: ActionKind) {
        let Some(sequence) = patterns::for_action(&self.def, action, self.cadence()) else {
            warn!(
                "Boss {} has no attack definition for {}",
                self.def.id,
                action.label()
            );
            self.return_to_idle();
            return;
        };
        debug!("Boss {} starts {}", self.def.id, action.label());
        self.set_state(CombatState::for_action(action));
        self.events.push(BossEvent::ActionStarted(action));
        self.start_sequence(sequence);
    }

    fn start_sequence(&mut self, sequence: TimedSequence) {
        self.safe_zone = None;
        self.started_on_tick = Some(self.tick_count);
        let out = self.runner.start(sequence);
        self.apply_output(out);
    }

    /// Cancel the running sequence; the caller decides the next state.
    fn abort_sequence(&mut self) {
        let out = self.runner.cancel();
        self.safe_zone = None;
        self.release(out.released);
        if let Some(end) = out.finished {
            self.report_end(end);
        }
    }

    fn return_to_idle(&mut self) {
        self.set_state(CombatState::Idle);
        self.host.nav_resume();
    }

    fn set_state(&mut self, next: CombatState) {
        if self.state != next {
            debug!(
                "Boss {} state {} -> {}",
                self.def.id,
                self.state.label(),
                next.label()
            );
            self.state = next;
        }
    }

    fn release(&mut self, handles: Vec<EffectHandle>) {
        for handle in handles {
            self.host.effects.destroy(handle);
        }
    }

    fn own(&mut self, handle: EffectHandle) {
        if !self.runner.adopt(handle) {
            self.host.effects.destroy(handle);
        }
    }

    fn apply_output(&mut self, out: SequenceOutput) {
        self.release(out.released);
        if let Some(SequenceLabel::Action(action)) = out.replaced {
            self.events.push(BossEvent::ActionAborted(action));
        }

        for effect in out.effects {
            if let Err(err) = self.apply_effect(effect) {
                let label = self
                    .runner
                    .label()
                    .or(out.finished.map(|end| end.label));
                warn!("Boss {} aborted {:?}: {}", self.def.id, label, err);
                let cancelled = self.runner.cancel();
                self.safe_zone = None;
                self.release(cancelled.released);
                if let Some(SequenceLabel::Action(action)) = label {
                    self.events.push(BossEvent::ActionAborted(action));
                }
                if !self.state.is_dead() {
                    self.return_to_idle();
                }
                return;
            }
        }

        if let Some(end) = out.finished {
            self.report_end(end);
            if !self.state.is_dead() {
                self.return_to_idle();
            }
        }
    }

    fn report_end(&mut self, end: SequenceEnd) {
        self.safe_zone = None;
        match (end.label, end.outcome) {
            (SequenceLabel::Action(action), SequenceOutcome::Completed) => {
                debug!("Boss {} finished {}", self.def.id, action.label());
                self.events.push(BossEvent::ActionFinished(action));
            }
            (SequenceLabel::Action(action), SequenceOutcome::Aborted) => {
                debug!("Boss {} aborted {}", self.def.id, action.label());
                self.events.push(BossEvent::ActionAborted(action));
            }
            (SequenceLabel::PhaseTransition, SequenceOutcome::Completed) => {
                if self.phase.complete() {
                    info!("Boss {} entered {:?}", self.def.id, self.phase.phase());
                    self.events.push(BossEvent::PhaseChanged(self.phase.phase()));
                }
            }
            (SequenceLabel::PhaseTransition, SequenceOutcome::Aborted) => {
                debug!("Boss {} phase transition interrupted", self.def.id);
            }
        }
    }

    fn hit_target(&mut self, source: HitSource, damage: f32) {
        if let Some(target) = self.host.target.as_mut() {
            target.take_damage(damage);
            debug!("Boss {} hit target for {:.1} ({:?})", self.def.id, damage, source);
            self.events.push(BossEvent::TargetHit { source, damage });
        }
    }

    fn apply_effect(&mut self, effect: StepEffect) -> Result<(), StepError> {
        let origin = self.host.navigation.position();
        let facing = self.host.navigation.facing();
        let target = self.host.target_position();

        match effect {
            StepEffect::AnimTrigger(name) => self.host.animation.set_trigger(&name),
            StepEffect::StopMoving => self.host.nav_stop(),
            StepEffect::ResumeMoving => self.host.nav_resume(),
            StepEffect::FaceTarget => {
                if let Some(point) = target {
                    self.host.navigation.face_towards(point, 180.0);
                }
            }
            StepEffect::MoveAway { distance, speed } => {
                let point = target.ok_or(StepError::TargetLost)?;
                let away = (origin - point).try_normalize().unwrap_or(-facing);
                let destination = finite(origin + away * distance)?;
                self.host
                    .nav_set_speed(speed * self.phase.movement_multiplier());
                self.host.nav_set_destination(destination);
                self.host.nav_resume();
            }
            StepEffect::Lunge { distance } => {
                let point = target.ok_or(StepError::TargetLost)?;
                let toward = (point - origin).try_normalize().unwrap_or(facing);
                let destination = finite(origin + toward * distance)?;
                self.host.nav_set_destination(destination);
                self.host.nav_resume();
            }
            StepEffect::LeapToTarget { lead } => {
                let fix = self.tracker.last().copied().ok_or(StepError::TargetLost)?;
                let destination = finite(fix.predict(lead))?;
                self.host.animation.set_bool("Airborne", true);
                self.host.nav_set_destination(destination);
                self.host.nav_resume();
            }
            StepEffect::FireProjectile { damage, speed } => {
                let direction = target
                    .and_then(|point| (point - origin).try_normalize())
                    .unwrap_or(facing);
                self.host
                    .effects
                    .spawn_projectile(origin, direction, speed, damage);
            }
            StepEffect::SpawnAround {
                kind,
                radius,
                duration,
                damage,
            } => {
                let handle = self
                    .host
                    .effects
                    .spawn_area_effect(kind, origin, radius, duration, damage);
                self.own(handle);
            }
            StepEffect::SpawnZones {
                safe_radius,
                arena_radius,
                duration,
                damage,
            } => {
                let angle = self.selector.unit() * TAU;
                let reach = (arena_radius - safe_radius).max(0.0) * self.selector.unit().sqrt();
                let center = origin + Vec2::from_angle(angle) * reach;

                let danger = self.host.effects.spawn_area_effect(
                    EffectKind::DangerZone,
                    origin,
                    arena_radius,
                    duration,
                    damage,
                );
                self.own(danger);
                let safe = self.host.effects.spawn_area_effect(
                    EffectKind::SafeZone,
                    center,
                    safe_radius,
                    duration,
                    0.0,
                );
                self.own(safe);
                self.safe_zone = Some(SafeZone {
                    center,
                    radius: safe_radius,
                });
            }
            StepEffect::ResolveZones { damage } => {
                let Some(zone) = self.safe_zone.take() else {
                    return Ok(());
                };
                match target {
                    Some(point) if !zone.contains(point) => {
                        self.hit_target(HitSource::DangerZone, damage)
                    }
                    Some(_) => debug!("Boss {} target reached the safe zone", self.def.id),
                    None => {}
                }
            }
            StepEffect::LandingSlam { radius, damage } => {
                self.host.animation.set_bool("Airborne", false);
                self.host.animation.set_trigger("Land");
                let handle = self.host.effects.spawn_area_effect(
                    EffectKind::LandingSlam,
                    origin,
                    radius,
                    SLAM_MARKER_SECONDS,
                    damage,
                );
                self.own(handle);
                if target.is_some_and(|point| point.distance(origin) <= radius) {
                    self.hit_target(HitSource::LandingSlam, damage);
                }
            }
            // Volume and ownership effects are consumed by the runner.
            StepEffect::OpenVolume(_) | StepEffect::CloseVolume | StepEffect::ReleaseOwned => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Engine hooks
    // ------------------------------------------------------------------------

    fn strike_running(&self) -> bool {
        matches!(self.state, CombatState::Executing(action) if action.is_strike())
    }

    fn run_hook(&mut self, hook: &str, out: Option<SequenceOutput>) {
        match out {
            Some(out) => self.apply_output(out),
            None => debug!("Boss {} ignored late {} event", self.def.id, hook),
        }
    }

    /// Animation event: the telegraph is over.
    pub fn on_windup_end(&mut self) {
        let out = if self.strike_running() {
            self.runner.skip_step(&[StepMarker::Windup])
        } else {
            None
        };
        self.run_hook("windup_end", out);
    }

    /// Animation event: open the attack volume now.
    pub fn on_active_start(&mut self) {
        let early = matches!(
            self.runner.current_marker(),
            Some(StepMarker::Windup | StepMarker::Startup)
        );
        let out = if self.strike_running() && early {
            self.runner.skip_to(StepMarker::Active)
        } else {
            None
        };
        self.run_hook("active_start", out);
    }

    /// Animation event: close the attack volume now.
    pub fn on_active_end(&mut self) {
        let out = if self.strike_running() {
            self.runner.skip_step(&[StepMarker::Active])
        } else {
            None
        };
        self.run_hook("active_end", out);
    }

    /// Animation event: the swing animation has finished.
    pub fn on_sequence_end(&mut self) {
        let out = if self.strike_running() {
            self.runner.skip_step(&[StepMarker::Recovery])
        } else {
            None
        };
        self.run_hook("sequence_end", out);
    }

    /// An engine collider touched the target while the attack volume is open.
    /// Returns the damage dealt, `None` if the volume is closed or already spent.
    pub fn report_volume_contact(&mut self) -> Option<f32> {
        if self.state.is_dead() || self.host.target_position().is_none() {
            return None;
        }
        let hit = self.runner.volume_mut()?.try_hit()?;
        self.hit_target(HitSource::Volume, hit.damage);
        Some(hit.damage)
    }
}

fn finite(point: Vec2) -> Result<Vec2, StepError> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(StepError::InvalidDestination(point))
    }
}
