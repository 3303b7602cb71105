use etude_ports::samples::SampleData;
use etude_ports::types::Volume01;
use rtrb::Consumer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared between a playback handle and the voice it controls.
#[derive(Debug, Default)]
pub struct VoiceFlags {
    stopped: AtomicBool,
    finished: AtomicBool,
}

impl VoiceFlags {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

/// One sample being played back, resampled to the output rate.
#[derive(Debug)]
pub struct Voice {
    sample: SampleData,
    gain: f32,
    position: f64,
    step: f64,
    flags: Arc<VoiceFlags>,
}

impl Voice {
    pub fn new(
        sample: SampleData,
        volume: Volume01,
        output_rate_hz: u32,
        flags: Arc<VoiceFlags>,
    ) -> Self {
        let step = if output_rate_hz == 0 {
            1.0
        } else {
            sample.sample_rate_hz as f64 / output_rate_hz as f64
        };
        Self {
            sample,
            gain: volume.get(),
            position: 0.0,
            step,
            flags,
        }
    }

    /// Adds this voice into the buffers. Returns false once the sample is exhausted.
    fn mix_into(&mut self, out_l: &mut [f32], out_r: &mut [f32]) -> bool {
        let len = self.sample.frames();
        for (l, r) in out_l.iter_mut().zip(out_r.iter_mut()) {
            let index = self.position as usize;
            if index >= len {
                return false;
            }
            let frac = (self.position - index as f64) as f32;
            *l += lerp(&self.sample.left, index, frac) * self.gain;
            *r += lerp(&self.sample.right, index, frac) * self.gain;
            self.position += self.step;
        }
        (self.position as usize) < len
    }
}

fn lerp(data: &[f32], index: usize, frac: f32) -> f32 {
    let a = data[index];
    let b = data.get(index + 1).copied().unwrap_or(a);
    a + (b - a) * frac
}

/// Real-time side of the device: receives voices over a ring buffer and sums them.
pub struct SampleMixer {
    consumer: Consumer<Voice>,
    voices: Vec<Voice>,
    paused: Arc<AtomicBool>,
    limiter_gain: f32,
}

impl SampleMixer {
    pub fn new(consumer: Consumer<Voice>, paused: Arc<AtomicBool>) -> Self {
        Self {
            consumer,
            voices: Vec::with_capacity(64),
            paused,
            limiter_gain: 1.0,
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn render(&mut self, out_l: &mut [f32], out_r: &mut [f32]) {
        let frames = out_l.len().min(out_r.len());
        let out_l = &mut out_l[..frames];
        let out_r = &mut out_r[..frames];
        out_l.fill(0.0);
        out_r.fill(0.0);

        while let Ok(voice) = self.consumer.pop() {
            self.voices.push(voice);
        }
        self.voices.retain(|voice| {
            if voice.flags.is_stopped() {
                voice.flags.finish();
                false
            } else {
                true
            }
        });

        if self.paused.load(Ordering::Relaxed) {
            return;
        }

        self.voices.retain_mut(|voice| {
            let alive = voice.mix_into(out_l, out_r);
            if !alive {
                voice.flags.finish();
            }
            alive
        });

        self.limit(out_l, out_r);
    }

    fn limit(&mut self, out_l: &mut [f32], out_r: &mut [f32]) {
        let limit = 0.98_f32;
        let peak = out_l
            .iter()
            .chain(out_r.iter())
            .fold(0.0_f32, |peak, value| peak.max(value.abs()));

        let target_gain = if peak > limit { limit / peak } else { 1.0 };
        let current_gain = self.limiter_gain;
        let coeff = if target_gain < current_gain { 0.25 } else { 0.01 };
        let new_gain = (current_gain + coeff * (target_gain - current_gain)).clamp(0.0, 1.0);
        self.limiter_gain = new_gain;

        if new_gain < 0.999 {
            for value in out_l.iter_mut().chain(out_r.iter_mut()) {
                *value *= new_gain;
            }
        }
    }
}
