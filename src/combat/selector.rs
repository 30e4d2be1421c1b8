//! Combat domain: weighted action selection per band and phase.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::combat::attacks::ActionKind;
use crate::combat::phase::Phase;
use crate::combat::range::Band;
use crate::combat::timers::{TimerBank, TimerKey};
use crate::content::{BossDef, PoolEntryDef};

/// Attack-string bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Aggression {
    pub active: bool,
    pub consecutive_attacks: u32,
}

impl Aggression {
    /// Start (or keep) an attack string. A fresh string counts from zero.
    pub fn provoke(&mut self) {
        if !self.active {
            self.consecutive_attacks = 0;
        }
        self.active = true;
    }

    pub fn calm(&mut self) {
        self.active = false;
        self.consecutive_attacks = 0;
    }
}

/// Inputs of one selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionContext {
    pub band: Band,
    pub phase: Phase,
    pub facing: bool,
    /// Attack cadence multiplier; cooldowns are divided by it
    pub cadence: f32,
}

/// Picks the next action among the eligible entries of a band.
#[derive(Debug, Clone)]
pub struct ActionSelector {
    pools: HashMap<Band, Vec<PoolEntryDef>>,
    cooldowns: HashMap<ActionKind, f32>,
    global_cooldown: f32,
    aggression_bias: f32,
    max_consecutive: u32,
    rng: ChaCha8Rng,
}

impl ActionSelector {
    pub fn from_def(def: &BossDef) -> Self {
        let pools = def
            .selector
            .pools
            .iter()
            .map(|pool| (pool.band, pool.entries.clone()))
            .collect();

        let cooldowns = def
            .selector
            .pools
            .iter()
            .flat_map(|pool| pool.entries.iter())
            .map(|entry| (entry.action, def.action_cooldown(entry.action)))
            .collect();

        let seed = def.selector.seed.unwrap_or_else(rand::random::<u64>);

        Self {
            pools,
            cooldowns,
            global_cooldown: def.selector.global_cooldown,
            aggression_bias: def.selector.aggression_bias.clamp(0.0, 1.0),
            max_consecutive: def.selector.max_consecutive_attacks,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Actions unlocked in `band` for `phase`, ignoring cooldowns.
    pub fn pool_actions(&self, band: Band, phase: Phase) -> Vec<ActionKind> {
        self.pools
            .get(&band)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.unlock <= phase)
                    .map(|entry| entry.action)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn eligible(&self, ctx: &SelectionContext, timers: &TimerBank) -> Vec<PoolEntryDef> {
        self.pools
            .get(&ctx.band)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.unlock <= ctx.phase && entry.weight > 0.0)
                    .filter(|entry| timers.is_ready(TimerKey::Action(entry.action)))
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pick the next action, or `None` if a global gate fails or nothing is eligible.
    ///
    /// On selection the global and per-action cooldowns start and the attack-string
    /// counter is updated.
    pub fn select_action(
        &mut self,
        ctx: &SelectionContext,
        aggression: &mut Aggression,
        timers: &mut TimerBank,
    ) -> Option<ActionKind> {
        if !ctx.facing || !timers.is_ready(TimerKey::AttackCooldown) {
            return None;
        }

        let eligible = self.eligible(ctx, timers);
        if eligible.is_empty() {
            return None;
        }

        let stringing = aggression.active && aggression.consecutive_attacks < self.max_consecutive;
        let melee_ready = eligible.iter().any(|e| e.action == ActionKind::Melee);
        let action = if stringing && melee_ready && self.rng.random::<f32>() < self.aggression_bias {
            ActionKind::Melee
        } else {
            self.weighted_pick(&eligible)?
        };

        self.commit(action, ctx.cadence, aggression, timers);
        Some(action)
    }

    fn weighted_pick(&mut self, eligible: &[PoolEntryDef]) -> Option<ActionKind> {
        let total: f32 = eligible.iter().map(|e| e.weight).sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.rng.random::<f32>() * total;
        for entry in eligible {
            if roll < entry.weight {
                return Some(entry.action);
            }
            roll -= entry.weight;
        }
        eligible.last().map(|e| e.action)
    }

    fn commit(
        &mut self,
        action: ActionKind,
        cadence: f32,
        aggression: &mut Aggression,
        timers: &mut TimerBank,
    ) {
        let cadence = if cadence > 0.0 { cadence } else { 1.0 };
        timers.start(TimerKey::AttackCooldown, self.global_cooldown / cadence);
        let action_cooldown = self.cooldowns.get(&action).copied().unwrap_or(0.0);
        timers.start(TimerKey::Action(action), action_cooldown / cadence);

        // Only strikes inside a string count towards the cap.
        if !aggression.active {
            return;
        }
        if action.is_strike() {
            aggression.consecutive_attacks += 1;
            if aggression.consecutive_attacks >= self.max_consecutive {
                aggression.calm();
            }
        } else {
            aggression.consecutive_attacks = 0;
        }
    }

    /// Uniform value in `[0, 1)` from the selector's RNG.
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}
