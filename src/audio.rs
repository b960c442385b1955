//! Sound effects, synthesized once at start-up and played fire-and-forget.

use fundsp::prelude::{AudioUnit, saw_hz, sine_hz, square_hz};
use rodio::{OutputStream, OutputStreamHandle, Sink, buffer::SamplesBuffer};

const SAMPLE_RATE: u32 = 44_100;
const GAIN: f32 = 0.25;
/// Fade-in length, avoids a click at the start of a clip
const ATTACK: f32 = 0.004;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Jump,
    Drop,
    Collision,
    Score,
}

impl Sound {
    pub const ALL: [Sound; 4] = [Sound::Jump, Sound::Drop, Sound::Collision, Sound::Score];
}

/// Anything that can play the game's sound effects.
pub trait AudioSink {
    fn play(&mut self, sound: Sound);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;
}

// ── Synthesis ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Wave {
    Sine,
    Square,
    Saw,
}

/// Steps of `(wave, frequency Hz, seconds)` for each effect.
fn recipe(sound: Sound) -> &'static [(Wave, f32, f32)] {
    match sound {
        Sound::Jump => &[(Wave::Square, 520.0, 0.03), (Wave::Square, 660.0, 0.03), (Wave::Square, 780.0, 0.04)],
        Sound::Drop => &[(Wave::Square, 420.0, 0.03), (Wave::Square, 300.0, 0.03), (Wave::Square, 220.0, 0.04)],
        Sound::Collision => &[
            (Wave::Saw, 300.0, 0.06),
            (Wave::Saw, 220.0, 0.06),
            (Wave::Saw, 160.0, 0.08),
            (Wave::Saw, 110.0, 0.10),
            (Wave::Saw, 80.0, 0.12),
        ],
        Sound::Score => &[(Wave::Sine, 880.0, 0.08), (Wave::Sine, 1320.0, 0.14)],
    }
}

fn oscillator(wave: Wave, freq: f32) -> Box<dyn AudioUnit> {
    match wave {
        Wave::Sine => Box::new(sine_hz::<f32>(freq)),
        Wave::Square => Box::new(square_hz(freq)),
        Wave::Saw => Box::new(saw_hz(freq)),
    }
}

/// Render `sound` to mono samples with a linear decay envelope.
pub fn synthesize(sound: Sound) -> Vec<f32> {
    let steps = recipe(sound);
    let total: f32 = steps.iter().map(|&(_, _, secs)| secs).sum();
    let total_samples = (total * SAMPLE_RATE as f32) as usize;
    let mut samples = Vec::with_capacity(total_samples);

    for &(wave, freq, secs) in steps {
        let mut osc = oscillator(wave, freq);
        osc.set_sample_rate(SAMPLE_RATE as f64);
        for _ in 0..(secs * SAMPLE_RATE as f32) as usize {
            let t = samples.len() as f32 / SAMPLE_RATE as f32;
            let attack = (t / ATTACK).min(1.0);
            let decay = (1.0 - t / total).max(0.0);
            samples.push(osc.get_mono().clamp(-1.0, 1.0) * attack * decay * GAIN);
        }
    }
    samples
}

// ── Playback ────────────────────────────────────────────────────────────────

pub struct Audio {
    /// `None` once audio has been found unavailable
    output: Option<(OutputStream, OutputStreamHandle)>,
    clips: Vec<Vec<f32>>,
    volume: f32,
    muted: bool,
}

impl Audio {
    /// Open the default output device. Never fails: without a device the
    /// game just runs silent.
    pub fn open(volume: f32, muted: bool) -> Self {
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(err) => {
                log::warn!("no audio output, sound disabled: {err}");
                None
            }
        };
        Self::with_output(output, volume, muted)
    }

    fn with_output(output: Option<(OutputStream, OutputStreamHandle)>, volume: f32, muted: bool) -> Self {
        let clips = if output.is_some() {
            Sound::ALL.iter().map(|&sound| synthesize(sound)).collect()
        } else {
            Vec::new()
        };
        Self {
            output,
            clips,
            volume: volume.clamp(0.0, 1.0),
            muted,
        }
    }

    pub fn is_available(&self) -> bool {
        self.output.is_some()
    }

    fn disable(&mut self) {
        self.output = None;
        self.clips.clear();
    }
}

impl AudioSink for Audio {
    fn play(&mut self, sound: Sound) {
        if self.muted {
            return;
        }
        let Some((_, handle)) = &self.output else {
            return;
        };
        let Some(clip) = self.clips.get(sound as usize) else {
            return;
        };

        match Sink::try_new(handle) {
            Ok(sink) => {
                sink.set_volume(self.volume);
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, clip.clone()));
                sink.detach();
            }
            Err(err) => {
                log::warn!("audio playback failed, sound disabled: {err}");
                self.disable();
            }
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clips_have_expected_length() {
        for sound in Sound::ALL {
            let total: f32 = recipe(sound).iter().map(|&(_, _, secs)| secs).sum();
            let expected = (total * SAMPLE_RATE as f32) as usize;
            let clip = synthesize(sound);
            // Per-step truncation may lose a sample or two
            assert!(clip.len() <= expected + 1);
            assert!(clip.len() + recipe(sound).len() >= expected);
        }
    }

    #[test]
    fn test_clips_stay_within_gain_and_fade_out() {
        for sound in Sound::ALL {
            let clip = synthesize(sound);
            assert!(clip.iter().all(|s| s.abs() <= GAIN + 1e-6));
            assert!(clip.iter().any(|s| s.abs() > 0.01));
            let tail = &clip[clip.len() - 10..];
            assert!(tail.iter().all(|s| s.abs() < 0.01));
        }
    }

    #[test]
    fn test_score_chime_is_a_pure_tone() {
        let clip = synthesize(Sound::Score);
        let first_note = &clip[..(0.08 * SAMPLE_RATE as f32) as usize];
        // A sine swings smoothly, unlike the square and saw steps
        let max_step = first_note
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0, f32::max);
        assert!(max_step < 0.1);
        assert!(first_note.iter().any(|s| *s > 0.1));
        assert!(first_note.iter().any(|s| *s < -0.1));
    }

    #[test]
    fn test_silent_audio_tracks_mute() {
        let mut audio = Audio::with_output(None, 0.5, false);
        assert!(!audio.is_available());
        audio.play(Sound::Jump);
        audio.set_muted(true);
        assert!(audio.is_muted());
        audio.set_muted(false);
        assert!(!audio.is_muted());
    }
}
