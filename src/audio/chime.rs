use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;

/// Two falling notes with an exponential decay, played when a countdown ends.
pub struct Chime {
    notes: [f32; 2],
    note_samples: usize,
    num_sample: usize,
}

impl Chime {
    pub fn new() -> Self {
        Self {
            notes: [880.0, 660.0],
            note_samples: (SAMPLE_RATE as f32 * 0.45) as usize,
            num_sample: 0,
        }
    }
}

impl Default for Chime {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let note = self.notes.get(self.num_sample / self.note_samples)?;
        let within = self.num_sample % self.note_samples;
        self.num_sample += 1;

        let t = within as f32 / SAMPLE_RATE as f32;
        let envelope = (-6.0 * t).exp();
        Some((2.0 * PI * note * t).sin() * envelope * 0.3)
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.notes.len() * self.note_samples - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        let samples = (self.notes.len() * self.note_samples) as f32;
        Some(Duration::from_secs_f32(samples / SAMPLE_RATE as f32))
    }
}
