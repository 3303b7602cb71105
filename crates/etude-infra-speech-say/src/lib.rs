use etude_ports::speech::{SpeechError, Speaker};
use etude_ports::types::Volume01;
use std::process::Command;

/// Used when the current output volume cannot be read.
const FALLBACK_VOLUME: u8 = 50;

/// macOS `say`. The system output volume is set for the utterance and restored after.
/// On other platforms every call is a no-op.
pub struct SaySpeaker {
    supported: bool,
}

impl SaySpeaker {
    pub fn new() -> Self {
        Self {
            supported: cfg!(target_os = "macos"),
        }
    }

    /// A speaker that never speaks.
    pub fn silent() -> Self {
        Self { supported: false }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    fn output_volume() -> Option<u8> {
        let output = Command::new("osascript")
            .args(["-e", "output volume of (get volume settings)"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_output_volume(&String::from_utf8_lossy(&output.stdout))
    }

    fn set_output_volume(percent: u8) -> Result<(), SpeechError> {
        let status = Command::new("osascript")
            .args(["-e", &format!("set volume output volume {percent}")])
            .status()
            .map_err(|e| SpeechError::Backend(e.to_string()))?;
        if !status.success() {
            return Err(SpeechError::Backend(format!("osascript exited with {status}")));
        }
        Ok(())
    }
}

impl Default for SaySpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl Speaker for SaySpeaker {
    fn say(&self, text: &str, volume: Volume01) -> Result<(), SpeechError> {
        if !self.supported {
            return Ok(());
        }

        let saved = Self::output_volume().unwrap_or_else(|| {
            log::debug!("could not read output volume, restoring to {FALLBACK_VOLUME}");
            FALLBACK_VOLUME
        });
        if let Err(err) = Self::set_output_volume(volume.percent()) {
            log::warn!("could not set speech volume: {err}");
        }

        let spoken = Command::new("say")
            .arg(text)
            .status()
            .map_err(|e| SpeechError::Unavailable(e.to_string()))
            .and_then(|status| {
                if status.success() {
                    Ok(())
                } else {
                    Err(SpeechError::Backend(format!("say exited with {status}")))
                }
            });

        if let Err(err) = Self::set_output_volume(saved) {
            log::warn!("could not restore output volume: {err}");
        }
        spoken
    }
}

/// Reads the reply of `output volume of (get volume settings)`.
pub fn parse_output_volume(text: &str) -> Option<u8> {
    let value: u16 = text.trim().parse().ok()?;
    Some(value.min(100) as u8)
}
