pub mod mixer;

pub use mixer::*;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange};
use etude_ports::audio::{AudioDevice, AudioError, PlaybackHandle};
use etude_ports::samples::{SampleData, SampleStore};
use etude_ports::types::{NoteId, Volume01};
use parking_lot::Mutex;
use rtrb::{Producer, RingBuffer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Weak};
use std::thread;

/// Voices that may be queued between two audio callbacks.
const VOICE_QUEUE: usize = 256;

struct SelectedStreamConfig {
    config: StreamConfig,
    sample_format: SampleFormat,
}

struct StreamThread {
    stop_tx: mpsc::Sender<()>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl StreamThread {
    fn close(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Sample playback on the default output device.
///
/// The cpal stream lives on its own thread; voices reach it through a ring buffer
/// and are controlled afterwards through atomic flags only.
pub struct CpalAudioDevice {
    samples: Arc<dyn SampleStore>,
    cache: Mutex<HashMap<NoteId, SampleData>>,
    producer: Mutex<Producer<Voice>>,
    live: Mutex<Vec<Weak<VoiceFlags>>>,
    paused: Arc<AtomicBool>,
    output_rate_hz: u32,
    stream: Mutex<Option<StreamThread>>,
}

impl CpalAudioDevice {
    pub fn open(samples: Arc<dyn SampleStore>) -> Result<Self, AudioError> {
        let (producer, consumer) = RingBuffer::<Voice>::new(VOICE_QUEUE);
        let paused = Arc::new(AtomicBool::new(false));
        let mixer = SampleMixer::new(consumer, paused.clone());

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (stop_tx, stop_rx) = mpsc::channel();

        let join_handle = thread::spawn(move || {
            let host = cpal::default_host();
            let Some(device) = host.default_output_device() else {
                let _ = ready_tx.send(Err(AudioError::DeviceNotFound(
                    "no default output device".to_string(),
                )));
                return;
            };

            let selected = match select_stream_config(&device) {
                Ok(selected) => selected,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            let rate = selected.config.sample_rate.0;
            log::debug!(
                "output {} at {rate} Hz, {} channels, {:?}",
                device.name().unwrap_or_else(|_| "unknown".to_string()),
                selected.config.channels,
                selected.sample_format
            );

            let stream = match build_stream(&device, &selected, mixer) {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            if let Err(err) = stream.play() {
                let _ = ready_tx.send(Err(AudioError::Backend(err.to_string())));
                return;
            }

            let _ = ready_tx.send(Ok(rate));
            let _ = stop_rx.recv();
            drop(stream);
        });

        let output_rate_hz = ready_rx
            .recv()
            .map_err(|e| AudioError::Backend(e.to_string()))??;

        Ok(Self {
            samples,
            cache: Mutex::new(HashMap::new()),
            producer: Mutex::new(producer),
            live: Mutex::new(Vec::new()),
            paused,
            output_rate_hz,
            stream: Mutex::new(Some(StreamThread {
                stop_tx,
                join_handle: Some(join_handle),
            })),
        })
    }

    pub fn output_rate_hz(&self) -> u32 {
        self.output_rate_hz
    }

    /// Stops the output stream. Later calls to `play` queue voices nobody renders.
    pub fn close(&self) {
        if let Some(stream) = self.stream.lock().take() {
            stream.close();
        }
    }

    fn sample(&self, note: &NoteId) -> Result<SampleData, AudioError> {
        if let Some(sample) = self.cache.lock().get(note) {
            return Ok(sample.clone());
        }
        let sample = self
            .samples
            .load(note)
            .map_err(|e| AudioError::SampleUnavailable(e.to_string()))?;
        self.cache.lock().insert(note.clone(), sample.clone());
        Ok(sample)
    }
}

impl Drop for CpalAudioDevice {
    fn drop(&mut self) {
        self.close();
    }
}

struct CpalPlayback {
    flags: Arc<VoiceFlags>,
    paused: Arc<AtomicBool>,
}

impl PlaybackHandle for CpalPlayback {
    fn stop(&self) {
        self.flags.stop();
    }

    fn is_playing(&self) -> bool {
        !self.flags.is_stopped()
            && !self.flags.is_finished()
            && !self.paused.load(Ordering::Relaxed)
    }
}

impl AudioDevice for CpalAudioDevice {
    fn play(&self, note: &NoteId, volume: Volume01) -> Result<Box<dyn PlaybackHandle>, AudioError> {
        let sample = self.sample(note)?;
        let flags = Arc::new(VoiceFlags::default());
        let voice = Voice::new(sample, volume, self.output_rate_hz, flags.clone());

        self.producer
            .lock()
            .push(voice)
            .map_err(|_| AudioError::Backend("voice queue full".to_string()))?;

        let mut live = self.live.lock();
        live.retain(|weak| weak.upgrade().is_some_and(|flags| !flags.is_finished()));
        live.push(Arc::downgrade(&flags));

        Ok(Box::new(CpalPlayback {
            flags,
            paused: self.paused.clone(),
        }))
    }

    fn pause_all(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    fn resume_all(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    fn stop_all(&self) {
        for flags in self.live.lock().drain(..).filter_map(|weak| weak.upgrade()) {
            flags.stop();
        }
    }
}

fn select_stream_config(device: &cpal::Device) -> Result<SelectedStreamConfig, AudioError> {
    let default = device
        .default_output_config()
        .map_err(|e| AudioError::UnsupportedConfig(e.to_string()))?;
    let mut supported = device
        .supported_output_configs()
        .map_err(|e| AudioError::Backend(e.to_string()))?;

    let chosen =
        select_supported_config(&mut supported, default.channels(), default.sample_rate().0)
            .unwrap_or(default);

    Ok(SelectedStreamConfig {
        sample_format: chosen.sample_format(),
        config: chosen.config(),
    })
}

/// Prefers float output at the device's own rate and channel count.
fn select_supported_config(
    supported: &mut dyn Iterator<Item = SupportedStreamConfigRange>,
    channels: u16,
    sample_rate_hz: u32,
) -> Option<cpal::SupportedStreamConfig> {
    let mut best: Option<cpal::SupportedStreamConfig> = None;
    let mut best_score: i32 = -1;

    for config_range in supported {
        if config_range.channels() != channels {
            continue;
        }
        let min = config_range.min_sample_rate().0;
        let max = config_range.max_sample_rate().0;
        if sample_rate_hz < min || sample_rate_hz > max {
            continue;
        }

        let score = match config_range.sample_format() {
            SampleFormat::F32 => 3,
            SampleFormat::I16 => 2,
            SampleFormat::U16 => 1,
            _ => continue,
        };

        if score > best_score {
            best = Some(config_range.with_sample_rate(SampleRate(sample_rate_hz)));
            best_score = score;
        }
    }

    best
}

/// Mixer plus the planar scratch buffers it renders into.
struct RenderState {
    mixer: SampleMixer,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl RenderState {
    fn new(mixer: SampleMixer) -> Self {
        Self {
            mixer,
            left: vec![0.0; 4096],
            right: vec![0.0; 4096],
        }
    }

    fn render(&mut self, frames: usize) -> (&[f32], &[f32]) {
        if frames > self.left.len() {
            self.left.resize(frames, 0.0);
            self.right.resize(frames, 0.0);
        }
        self.mixer
            .render(&mut self.left[..frames], &mut self.right[..frames]);
        (&self.left[..frames], &self.right[..frames])
    }
}

fn build_stream(
    device: &cpal::Device,
    selected: &SelectedStreamConfig,
    mixer: SampleMixer,
) -> Result<cpal::Stream, AudioError> {
    let channels = (selected.config.channels as usize).max(1);
    let error_callback = |err| log::error!("cpal stream error: {err}");

    let stream = match (selected.sample_format, RenderState::new(mixer)) {
        (SampleFormat::F32, mut state) => device.build_output_stream(
            &selected.config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                let (left, right) = state.render(data.len() / channels);
                write_interleaved_f32(data, channels, left, right);
            },
            error_callback,
            None,
        ),
        (SampleFormat::I16, mut state) => device.build_output_stream(
            &selected.config,
            move |data: &mut [i16], _info: &cpal::OutputCallbackInfo| {
                let (left, right) = state.render(data.len() / channels);
                write_interleaved_i16(data, channels, left, right);
            },
            error_callback,
            None,
        ),
        (SampleFormat::U16, mut state) => device.build_output_stream(
            &selected.config,
            move |data: &mut [u16], _info: &cpal::OutputCallbackInfo| {
                let (left, right) = state.render(data.len() / channels);
                write_interleaved_u16(data, channels, left, right);
            },
            error_callback,
            None,
        ),
        _ => Err(cpal::BuildStreamError::StreamConfigNotSupported),
    };
    stream.map_err(|e| AudioError::Backend(e.to_string()))
}

fn write_interleaved_f32(data: &mut [f32], channels: usize, left: &[f32], right: &[f32]) {
    for (frame, out) in data.chunks_exact_mut(channels).enumerate() {
        let l = left.get(frame).copied().unwrap_or(0.0);
        let r = right.get(frame).copied().unwrap_or(0.0);
        write_frame(out, l, r, 0.0, |v| v);
    }
}

fn write_interleaved_i16(data: &mut [i16], channels: usize, left: &[f32], right: &[f32]) {
    for (frame, out) in data.chunks_exact_mut(channels).enumerate() {
        let l = left.get(frame).copied().unwrap_or(0.0);
        let r = right.get(frame).copied().unwrap_or(0.0);
        write_frame(out, l, r, 0, f32_to_i16);
    }
}

fn write_interleaved_u16(data: &mut [u16], channels: usize, left: &[f32], right: &[f32]) {
    for (frame, out) in data.chunks_exact_mut(channels).enumerate() {
        let l = left.get(frame).copied().unwrap_or(0.0);
        let r = right.get(frame).copied().unwrap_or(0.0);
        write_frame(out, l, r, u16::MAX / 2, f32_to_u16);
    }
}

/// Mono gets the average; extra channels get silence.
fn write_frame<T: Copy>(out: &mut [T], l: f32, r: f32, silence: T, convert: impl Fn(f32) -> T) {
    match out {
        [] => {}
        [mono] => *mono = convert((l + r) * 0.5),
        [first, second, rest @ ..] => {
            *first = convert(l);
            *second = convert(r);
            rest.fill(silence);
        }
    }
}

fn f32_to_i16(value: f32) -> i16 {
    let v = value.clamp(-1.0, 1.0);
    (v * i16::MAX as f32) as i16
}

fn f32_to_u16(value: f32) -> u16 {
    let v = value.clamp(-1.0, 1.0);
    let scaled = (v * 0.5 + 0.5) * u16::MAX as f32;
    scaled.round().clamp(0.0, u16::MAX as f32) as u16
}
