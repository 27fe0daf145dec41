use crate::{graph::node::RenderCtx, MIN_TIME};

/*
Gate Envelope
=============

Every sounding note is multiplied by a gain envelope. A plucked tone that
starts or stops at a non-zero sample produces a click, so the gain always
ramps: up from zero when the note starts, down to zero when it ends.

Vocabulary
----------

  level       Current gain, 0.0 to 1.0. Multiplies the oscillator output.

  stage       Idle, Attack, Hold or Release.

  gate        Note on/off. Gate high starts Attack, gate low starts Release
              from wherever the level currently is.

  fade        A forced release, used when playback is stopped. It never
              lengthens a release already under way, only shortens it.


Shape
-----

    level
     1.0 ┤      ┌──────────────────────┐
         │     ╱                        ╲
         │    ╱                          ╲
     0.0 ┼───┘                            └────
         note_on                   note_off
         |attack|                        |release|

Both ramps are linear. The release snapshots the starting level and its
length in samples at gate-off, then interpolates, so it lands on exactly
0.0 regardless of where the attack was interrupted.
*/

/// Stage of the gate envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Hold,
    Release,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    /// Attack/release gate envelope. Times in seconds.
    pub fn new(attack: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            release_time: release.max(MIN_TIME),

            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: ramp up from zero.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: ramp from the current level to zero over the release time.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }
        self.begin_release(self.release_samples(self.release_time, ctx.sample_rate));
    }

    /// Force the level to zero within `seconds`.
    ///
    /// Works from any stage. A release that would end sooner is left alone.
    pub fn fade_out(&mut self, seconds: f32, sample_rate: f32) {
        let fade = self.release_samples(seconds, sample_rate);
        match self.stage {
            EnvelopeState::Idle => {}
            EnvelopeState::Release => {
                let remaining = self
                    .release_total_samples
                    .saturating_sub(self.release_elapsed_samples);
                if fade < remaining {
                    self.begin_release(fade);
                }
            }
            EnvelopeState::Attack | EnvelopeState::Hold => self.begin_release(fade),
        }
    }

    fn release_samples(&self, seconds: f32, sample_rate: f32) -> u32 {
        (seconds * sample_rate).round().max(1.0) as u32
    }

    fn begin_release(&mut self, total_samples: u32) {
        self.release_start_level = self.level;
        self.release_total_samples = total_samples.max(1);
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * ctx.sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Hold;
                }
            }

            EnvelopeState::Hold => {
                self.level = 1.0;
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
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            self.next_sample(ctx);
            *sample = self.level;
        }
    }

    /// True until the release has fully decayed.
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    pub fn release_time(&self) -> f32 {
        self.release_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0)
    }

    fn render_samples(env: &mut Envelope, samples: usize) {
        let ctx = ctx();
        for _ in 0..samples {
            env.next_sample(&ctx);
        }
    }

    #[test]
    fn test_attack_reaches_full_level() {
        let mut env = Envelope::new(0.01, 0.05);
        env.note_on();
        render_samples(&mut env, 11);

        assert!(env.level() > 0.99);
        assert_eq!(env.state(), EnvelopeState::Hold);
    }

    #[test]
    fn test_first_sample_is_not_a_jump() {
        let mut env = Envelope::new(0.01, 0.05);
        env.note_on();
        let mut buffer = [0.0; 4];
        env.render(&mut buffer, &ctx());
        assert!(buffer[0] <= 0.1 + 1e-6);
        assert!(buffer.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_release_falls_back_to_idle() {
        let mut env = Envelope::new(0.005, 0.03);
        env.note_on();
        render_samples(&mut env, 20);

        env.note_off(&ctx());
        render_samples(&mut env, 30);

        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn test_release_from_mid_attack_starts_at_current_level() {
        let mut env = Envelope::new(0.1, 0.02);
        env.note_on();
        render_samples(&mut env, 50);
        let level = env.level();
        assert!(level > 0.4 && level < 0.6);

        env.note_off(&ctx());
        render_samples(&mut env, 1);
        assert!(env.level() < level);
    }

    #[test]
    fn test_fade_shortens_a_long_release() {
        let mut env = Envelope::new(0.001, 1.0);
        env.note_on();
        render_samples(&mut env, 5);
        env.note_off(&ctx());
        render_samples(&mut env, 1);

        env.fade_out(0.005, SAMPLE_RATE);
        render_samples(&mut env, 5);
        assert!(!env.is_active());
    }

    #[test]
    fn test_fade_never_lengthens_release() {
        let mut env = Envelope::new(0.001, 0.004);
        env.note_on();
        render_samples(&mut env, 5);
        env.note_off(&ctx());
        env.fade_out(1.0, SAMPLE_RATE);
        render_samples(&mut env, 4);
        assert!(!env.is_active());
    }

    #[test]
    fn test_fade_on_idle_is_noop() {
        let mut env = Envelope::new(0.01, 0.01);
        env.fade_out(0.005, SAMPLE_RATE);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }
}
