//! One sitting at the keyboard: fighters, projectiles, held keys, names and
//! the phase machine that drives them.
//!
//! All state lives on `Session` and is only touched through its methods, one
//! call at a time. The frame loop calls `tick` once per display frame; key
//! handlers call `key_down` / `key_up` in between.
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::audio::SoundCue;
use crate::compute;
use crate::entities::{Arena, PlayerId};
use crate::input::{InputState, Key};
use crate::tuning::Tuning;

pub const DEFAULT_P1_NAME: &str = "Player 1";
pub const DEFAULT_P2_NAME: &str = "Player 2";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropStage {
    /// Fighters are still being lowered into the field.
    Lowering,
    /// Fighters have landed; the instruction overlay is up until the clock
    /// reaches `until_ms`.
    Briefing { until_ms: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dropping(DropStage),
    Running,
    Paused,
    GameOver { winner: PlayerId },
}

/// Names as typed; blanks fall back to the defaults when a match starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameInputs {
    pub player1: String,
    pub player2: String,
}

fn resolve_name(typed: &str, fallback: &str) -> String {
    if typed.trim().is_empty() {
        fallback.to_string()
    } else {
        typed.to_string()
    }
}

#[derive(Debug)]
pub struct Session {
    arena: Arena,
    input: InputState,
    tuning: Tuning,
    name_inputs: NameInputs,
    names: [String; 2],
    /// Rounds won this sitting. Not consulted by the win check.
    scores: [u32; 2],
    phase: Phase,
    /// Milliseconds of dropping and running time. Stands still while paused.
    clock_ms: u64,
    /// Pause pressed during the drop. The drop carries on and the round
    /// opens paused.
    drop_paused: bool,
    cues: Vec<SoundCue>,
}

fn slot(id: PlayerId) -> usize {
    match id {
        PlayerId::Player1 => 0,
        PlayerId::Player2 => 1,
    }
}

impl Session {
    pub fn new(tuning: Tuning, name_inputs: NameInputs) -> Self {
        Self {
            arena: Arena::new(&tuning),
            input: InputState::default(),
            tuning,
            name_inputs,
            names: [DEFAULT_P1_NAME.to_string(), DEFAULT_P2_NAME.to_string()],
            scores: [0, 0],
            phase: Phase::Idle,
            clock_ms: 0,
            drop_paused: false,
            cues: Vec::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Direct access for scenario setup and tests.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn name(&self, id: PlayerId) -> &str {
        &self.names[slot(id)]
    }

    pub fn score(&self, id: PlayerId) -> u32 {
        self.scores[slot(id)]
    }

    pub fn winner_name(&self) -> Option<&str> {
        match self.phase {
            Phase::GameOver { winner } => Some(self.name(winner)),
            _ => None,
        }
    }

    /// The pause overlay is up, either mid-round or queued during the drop.
    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused || self.drop_paused
    }

    /// Fire and shield are accepted: a match is under way and not paused.
    fn accepts_actions(&self) -> bool {
        match self.phase {
            Phase::Running => true,
            Phase::Dropping(_) => !self.drop_paused,
            _ => false,
        }
    }

    /// A match is under way (dropping in, playing or paused).
    pub fn is_running(&self) -> bool {
        matches!(
            self.phase,
            Phase::Dropping(_) | Phase::Running | Phase::Paused
        )
    }

    /// Hand over every cue raised since the last call.
    pub fn take_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }

    // ── Entry points ─────────────────────────────────────────────────────────

    /// Idle → Dropping. Names are read from the inputs at this point.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            trace!(phase = ?self.phase, "start ignored");
            return;
        }
        self.names = [
            resolve_name(&self.name_inputs.player1, DEFAULT_P1_NAME),
            resolve_name(&self.name_inputs.player2, DEFAULT_P2_NAME),
        ];
        self.cues.push(SoundCue::Music);
        info!(player1 = %self.names[0], player2 = %self.names[1], "match starting");
        self.begin_drop();
    }

    /// Any → Idle, discarding everything except the typed names and tuning.
    pub fn restart(&mut self) {
        info!("session restarted");
        *self = Session::new(self.tuning, self.name_inputs.clone());
    }

    /// Running ⇄ Paused. During the drop the pause is queued for the start
    /// of the round. Ignored in every other phase.
    pub fn toggle_pause(&mut self) {
        if let Phase::Dropping(_) = self.phase {
            self.drop_paused = !self.drop_paused;
            info!(paused = self.drop_paused, "pause toggled during drop");
            return;
        }
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => {
                trace!(phase = ?other, "pause ignored");
                return;
            }
        };
        info!(phase = ?self.phase, "pause toggled");
    }

    /// GameOver → Dropping with full bars and an empty sky.
    pub fn play_again(&mut self) {
        if !matches!(self.phase, Phase::GameOver { .. }) {
            trace!(phase = ?self.phase, "play again ignored");
            return;
        }
        info!("rematch");
        self.begin_drop();
    }

    fn begin_drop(&mut self) {
        self.arena.player1.reset_for_round();
        self.arena.player2.reset_for_round();
        self.arena.projectiles.clear();
        self.drop_paused = false;
        self.phase = Phase::Dropping(DropStage::Lowering);
    }

    // ── Keys ─────────────────────────────────────────────────────────────────

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Move(id, dir) => {
                self.input.press(id, dir);
                self.input.apply_facing(&mut self.arena);
            }
            Key::Fire(id) => {
                if !self.accepts_actions() {
                    trace!(player = ?id, "fire outside play");
                    return;
                }
                compute::fire(&mut self.arena, id, &self.tuning, &mut self.cues);
            }
            Key::Shield(id) => {
                if !self.accepts_actions() {
                    trace!(player = ?id, "shield outside play");
                    return;
                }
                let now = self.clock_ms;
                if compute::activate_shield(self.arena.player_mut(id), now, &self.tuning) {
                    debug!(player = ?id, until_ms = now + self.tuning.shield_duration_ms, "shield up");
                }
            }
            Key::Pause => self.toggle_pause(),
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Move(id, dir) => {
                self.input.release(id, dir);
                self.input.apply_facing(&mut self.arena);
            }
            Key::Fire(id) => compute::rearm(&mut self.arena, id),
            Key::Shield(_) | Key::Pause => {}
        }
    }

    // ── Frame ────────────────────────────────────────────────────────────────

    /// Advance one display frame. `elapsed` only feeds the timers; movement
    /// and projectiles step a fixed distance per call.
    ///
    /// Returns the winner on the frame the match is decided.
    pub fn tick(&mut self, elapsed: Duration) -> Option<PlayerId> {
        match self.phase {
            Phase::Idle | Phase::Paused | Phase::GameOver { .. } => None,
            Phase::Dropping(stage) => {
                self.advance_clock(elapsed);
                self.tick_drop(stage);
                None
            }
            Phase::Running => {
                self.advance_clock(elapsed);
                self.tick_running()
            }
        }
    }

    fn advance_clock(&mut self, elapsed: Duration) {
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.clock_ms = self.clock_ms.saturating_add(ms);
    }

    /// Shots fired during the drop hang where they spawned until the round
    /// opens. Shield timers keep running.
    fn tick_drop(&mut self, stage: DropStage) {
        compute::expire_shields(&mut self.arena, self.clock_ms);
        match stage {
            DropStage::Lowering => {
                if compute::drop_step(&mut self.arena, &self.tuning) {
                    compute::place_for_round(&mut self.arena, &self.tuning);
                    let until_ms = self.clock_ms + self.tuning.briefing_ms;
                    self.phase = Phase::Dropping(DropStage::Briefing { until_ms });
                    debug!(until_ms, "fighters landed");
                }
            }
            DropStage::Briefing { until_ms } => {
                if self.clock_ms >= until_ms {
                    self.phase = if self.drop_paused {
                        Phase::Paused
                    } else {
                        Phase::Running
                    };
                    self.drop_paused = false;
                    info!(phase = ?self.phase, "fight");
                }
            }
        }
    }

    fn tick_running(&mut self) -> Option<PlayerId> {
        compute::expire_shields(&mut self.arena, self.clock_ms);
        compute::resolve_projectiles(&mut self.arena, &self.tuning, &mut self.cues);
        compute::move_players(&mut self.arena, &self.input, &self.tuning);

        let winner = compute::winner(&self.arena)?;
        self.scores[slot(winner)] += 1;
        self.phase = Phase::GameOver { winner };
        info!(winner = %self.name(winner), "game over");
        Some(winner)
    }
}
