use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use etude_ports::input::{ControlCallback, ControlSignal, InputError, InputListener, InputStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Space or `p` toggles pause; `q`, Esc or Ctrl-C quits.
pub fn map_key(key: &KeyEvent) -> Option<ControlSignal> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ControlSignal::Quit)
        }
        KeyCode::Char(' ' | 'p' | 'P') => Some(ControlSignal::Toggle),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(ControlSignal::Quit),
        _ => None,
    }
}

/// Keyboard controls read from the terminal in raw mode on a background thread.
pub struct TerminalInput {
    poll: Duration,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            poll: Duration::from_millis(50),
        }
    }

    pub fn with_poll(poll: Duration) -> Self {
        Self { poll }
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TerminalInputStream {
    stop: Arc<AtomicBool>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl InputStream for TerminalInputStream {
    fn close(mut self: Box<Self>) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
        if let Err(err) = disable_raw_mode() {
            log::warn!("could not leave raw mode: {err}");
        }
    }
}

impl InputListener for TerminalInput {
    fn listen(&self, cb: ControlCallback) -> Result<Box<dyn InputStream>, InputError> {
        enable_raw_mode().map_err(|e| InputError::Unavailable(e.to_string()))?;

        let stop = Arc::new(AtomicBool::new(false));
        let poll = self.poll;
        let join_handle = {
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    match event::poll(poll) {
                        Ok(false) => continue,
                        Ok(true) => {}
                        Err(err) => {
                            log::warn!("terminal input failed: {err}");
                            break;
                        }
                    }
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if let Some(signal) = map_key(&key) {
                                cb(signal);
                            }
                        }
                        Ok(_) => {}
                        Err(err) => {
                            log::warn!("terminal input failed: {err}");
                            break;
                        }
                    }
                }
            })
        };

        Ok(Box::new(TerminalInputStream {
            stop,
            join_handle: Some(join_handle),
        }))
    }
}
