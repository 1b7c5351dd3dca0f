use crate::MIN_TIME;

/*
ADSR Envelope
=============

A linear attack/decay/sustain/release ramp generator. The graph-level ADSR
node feeds it triggers from the control graph; this struct only knows about
levels, stages and the sample rate.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
          A     D       S       R

Retriggering
------------

`trigger(false)` always restarts from zero, so two triggers in a row both
produce a full attack. `trigger(true)` (legato) starts the attack from the
current level instead, which avoids a click when a note is re-struck while
still sounding.

`release()` starts the release ramp from whatever level the envelope is at,
so releasing half-way through the attack does not jump.

Zero-length stages
------------------

Stage times are clamped to `MIN_TIME`, one sample at 48 kHz. At common
rates up to 48 kHz an attack of 0 therefore reaches full level on the very
first rendered sample.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,

    attack_start_level: f32,
    decay_start_level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::adsr(0.01, 0.1, 0.7, 0.3)
    }
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self {
            attack_time: MIN_TIME,
            decay_time: MIN_TIME,
            sustain_level: 0.0,
            release_time: MIN_TIME,

            stage: EnvelopeState::Idle,
            level: 0.0,
            attack_start_level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        };
        env.set_params(attack, decay, sustain, release);
        env
    }

    /// Update the stage times (seconds) and sustain level. Safe to call every block.
    ///
    /// NaN times become `MIN_TIME` and a NaN sustain becomes 0, so the level
    /// always stays inside `[0, 1]`.
    pub fn set_params(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        // f32::max returns the non-NaN operand.
        self.attack_time = attack.max(MIN_TIME);
        self.decay_time = decay.max(MIN_TIME);
        self.sustain_level = if sustain.is_nan() {
            0.0
        } else {
            sustain.clamp(0.0, 1.0)
        };
        self.release_time = release.max(MIN_TIME);
    }

    /// Start the attack stage.
    pub fn trigger(&mut self, legato: bool) {
        if !legato || self.stage == EnvelopeState::Idle {
            self.level = 0.0;
        }
        self.attack_start_level = self.level;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Start the release stage from the current level.
    pub fn release(&mut self, sample_rate: f32) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let rise = 1.0 - self.attack_start_level;
                let increment = rise.max(MIN_TIME) / (self.attack_time * sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                let decrement = total_drop / (self.decay_time * sample_rate);
                self.level -= decrement;

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.attack_start_level = 0.0;
        self.decay_start_level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
