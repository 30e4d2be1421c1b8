//! Combat domain: timed sequence runner.
//!
//! A sequence is an ordered list of time-delimited steps. Entering a step fires its
//! effects; the cursor moves on once the step's duration has elapsed. The runner owns
//! the attack volume and every transient world object the sequence spawned, so a
//! cancel or completion releases all of them at once.

use crate::combat::attacks::{ActionKind, AttackDefinition, AttackVolume};
use crate::combat::collaborators::{EffectHandle, EffectKind};

/// Where a step sits inside its sequence, used by animation events to skip ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Windup,
    Startup,
    Active,
    Recovery,
    Other,
}

/// Effects fired when a step is entered.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEffect {
    AnimTrigger(String),
    StopMoving,
    ResumeMoving,
    FaceTarget,
    /// Back away from the target
    MoveAway { distance: f32, speed: f32 },
    /// Drive through the target's current position
    Lunge { distance: f32 },
    /// Jump to where the target will be after `lead` seconds
    LeapToTarget { lead: f32 },
    /// Handled by the runner
    OpenVolume(AttackDefinition),
    /// Handled by the runner
    CloseVolume,
    FireProjectile { damage: f32, speed: f32 },
    /// Spawn an area effect around the boss, owned by the sequence
    SpawnAround {
        kind: EffectKind,
        radius: f32,
        duration: f32,
        damage: f32,
    },
    /// Place a safe zone and a danger zone for the shield pattern
    SpawnZones {
        safe_radius: f32,
        arena_radius: f32,
        duration: f32,
        damage: f32,
    },
    /// One-shot check: hurt the target unless it stands in the safe zone
    ResolveZones { damage: f32 },
    /// Landing slam: area marker plus a one-shot radius check
    LandingSlam { radius: f32, damage: f32 },
    /// Handled by the runner: destroy every object the sequence owns
    ReleaseOwned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStep {
    pub duration: f32,
    pub marker: StepMarker,
    pub on_enter: Vec<StepEffect>,
}

impl SequenceStep {
    pub fn new(duration: f32, marker: StepMarker, on_enter: Vec<StepEffect>) -> Self {
        Self {
            duration: duration.max(0.0),
            marker,
            on_enter,
        }
    }

    pub fn instant(on_enter: Vec<StepEffect>) -> Self {
        Self::new(0.0, StepMarker::Other, on_enter)
    }

    pub fn wait(duration: f32) -> Self {
        Self::new(duration, StepMarker::Other, Vec::new())
    }
}

/// What a sequence was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceLabel {
    Action(ActionKind),
    PhaseTransition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedSequence {
    pub label: SequenceLabel,
    pub steps: Vec<SequenceStep>,
}

impl TimedSequence {
    pub fn new(label: SequenceLabel, steps: Vec<SequenceStep>) -> Self {
        Self { label, steps }
    }

    pub fn total_duration(&self) -> f32 {
        self.steps.iter().map(|step| step.duration).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceEnd {
    pub label: SequenceLabel,
    pub outcome: SequenceOutcome,
}

/// Result of driving the runner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceOutput {
    /// Effects to apply, in order; volume and release effects are already handled
    pub effects: Vec<StepEffect>,
    /// Owned objects to destroy now
    pub released: Vec<EffectHandle>,
    /// A sequence that was replaced by `start`
    pub replaced: Option<SequenceLabel>,
    pub finished: Option<SequenceEnd>,
}

impl SequenceOutput {
    fn merge(&mut self, other: SequenceOutput) {
        self.effects.extend(other.effects);
        self.released.extend(other.released);
        if other.finished.is_some() {
            self.finished = other.finished;
        }
        if other.replaced.is_some() {
            self.replaced = other.replaced;
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveSequence {
    sequence: TimedSequence,
    cursor: usize,
    elapsed: f32,
    volume: AttackVolume,
    owned: Vec<EffectHandle>,
}

impl ActiveSequence {
    fn current(&self) -> Option<&SequenceStep> {
        self.sequence.steps.get(self.cursor)
    }

    fn enter_current(&mut self, out: &mut SequenceOutput) {
        let Some(step) = self.sequence.steps.get(self.cursor) else {
            return;
        };
        for effect in &step.on_enter {
            match effect {
                StepEffect::OpenVolume(attack) => self.volume.enable(attack),
                StepEffect::CloseVolume => self.volume.disable(),
                StepEffect::ReleaseOwned => out.released.append(&mut self.owned),
                other => out.effects.push(other.clone()),
            }
        }
    }

    fn release_all(&mut self, out: &mut SequenceOutput) {
        self.volume.disable();
        out.released.append(&mut self.owned);
    }
}

/// Runs at most one sequence per combatant.
#[derive(Debug, Clone, Default)]
pub struct SequenceRunner {
    active: Option<ActiveSequence>,
    status: SequenceStatus,
}

impl SequenceRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SequenceStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn label(&self) -> Option<SequenceLabel> {
        self.active.as_ref().map(|active| active.sequence.label)
    }

    pub fn current_marker(&self) -> Option<StepMarker> {
        self.active
            .as_ref()
            .and_then(|active| active.current())
            .map(|step| step.marker)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.cursor)
    }

    pub fn volume(&self) -> Option<&AttackVolume> {
        self.active.as_ref().map(|active| &active.volume)
    }

    pub fn volume_mut(&mut self) -> Option<&mut AttackVolume> {
        self.active.as_mut().map(|active| &mut active.volume)
    }

    /// Number of attack volumes currently dealing damage (0 or 1).
    pub fn open_volumes(&self) -> usize {
        self.volume().is_some_and(AttackVolume::is_enabled) as usize
    }

    pub fn owned_effects(&self) -> &[EffectHandle] {
        self.active
            .as_ref()
            .map_or(&[], |active| active.owned.as_slice())
    }

    /// Hand ownership of a spawned object to the running sequence.
    /// Returns false when nothing is running; the caller must then destroy it.
    pub fn adopt(&mut self, handle: EffectHandle) -> bool {
        match self.active.as_mut() {
            Some(active) => {
                active.owned.push(handle);
                true
            }
            None => false,
        }
    }

    /// Start `sequence`, cancelling whatever was running.
    pub fn start(&mut self, sequence: TimedSequence) -> SequenceOutput {
        let mut out = SequenceOutput::default();
        if let Some(mut previous) = self.active.take() {
            previous.release_all(&mut out);
            out.replaced = Some(previous.sequence.label);
        }

        let mut active = ActiveSequence {
            sequence,
            cursor: 0,
            elapsed: 0.0,
            volume: AttackVolume::default(),
            owned: Vec::new(),
        };
        active.enter_current(&mut out);
        self.active = Some(active);
        self.status = SequenceStatus::Running;

        let advanced = self.advance(0.0);
        out.merge(advanced);
        out
    }

    /// Advance the running sequence by `dt`.
    pub fn tick(&mut self, dt: f32) -> SequenceOutput {
        self.advance(dt.max(0.0))
    }

    fn advance(&mut self, dt: f32) -> SequenceOutput {
        let mut out = SequenceOutput::default();
        let Some(active) = self.active.as_mut() else {
            return out;
        };
        active.elapsed += dt;

        loop {
            let Some(step) = active.current() else {
                break;
            };
            let duration = step.duration;
            if active.elapsed < duration {
                break;
            }
            active.elapsed -= duration;
            active.cursor += 1;
            if active.cursor >= active.sequence.steps.len() {
                break;
            }
            active.enter_current(&mut out);
        }

        if active.cursor >= active.sequence.steps.len() {
            self.finish(SequenceOutcome::Completed, &mut out);
        }
        out
    }

    fn finish(&mut self, outcome: SequenceOutcome, out: &mut SequenceOutput) {
        if let Some(mut active) = self.active.take() {
            active.release_all(out);
            out.finished = Some(SequenceEnd {
                label: active.sequence.label,
                outcome,
            });
            self.status = match outcome {
                SequenceOutcome::Completed => SequenceStatus::Completed,
                SequenceOutcome::Aborted => SequenceStatus::Aborted,
            };
        }
    }

    /// Abort immediately: the volume closes and owned objects are released. No damage is owed.
    pub fn cancel(&mut self) -> SequenceOutput {
        let mut out = SequenceOutput::default();
        self.finish(SequenceOutcome::Aborted, &mut out);
        out
    }

    /// End the running sequence as completed without running its remaining steps.
    pub fn finish_now(&mut self) -> SequenceOutput {
        let mut out = SequenceOutput::default();
        self.finish(SequenceOutcome::Completed, &mut out);
        out
    }

    /// Leave the current step early if its marker is one of `markers`.
    pub fn skip_step(&mut self, markers: &[StepMarker]) -> Option<SequenceOutput> {
        let active = self.active.as_mut()?;
        let marker = active.current()?.marker;
        if !markers.contains(&marker) {
            return None;
        }

        let mut out = SequenceOutput::default();
        active.elapsed = 0.0;
        active.cursor += 1;
        if active.cursor < active.sequence.steps.len() {
            active.enter_current(&mut out);
        }
        out.merge(self.advance(0.0));
        Some(out)
    }

    /// Skip forward until the current step carries `target`, firing the entry effects
    /// of every step passed on the way. Returns `None` if no later step has the marker.
    pub fn skip_to(&mut self, target: StepMarker) -> Option<SequenceOutput> {
        let active = self.active.as_mut()?;
        let found = active.sequence.steps[active.cursor..]
            .iter()
            .position(|step| step.marker == target)?;
        if found == 0 {
            return Some(SequenceOutput::default());
        }

        let mut out = SequenceOutput::default();
        for _ in 0..found {
            active.elapsed = 0.0;
            active.cursor += 1;
            active.enter_current(&mut out);
        }
        out.merge(self.advance(0.0));
        Some(out)
    }
}
