use etude_core::{EventCallback, PracticeMode, SessionEvent, SessionOutcome};
use etude_domain_scale::Note;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Writes one line. Lines end in `\r\n` because the terminal is in raw mode during a session.
pub fn print_line(line: &str) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "{line}\r\n");
    let _ = out.flush();
}

pub fn printer() -> EventCallback {
    Arc::new(|event: &SessionEvent| {
        if let Some(line) = render(event) {
            print_line(&line);
        }
    })
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn degree_with_name(degree: usize, note: &Note, show_name: bool) -> String {
    if show_name {
        format!("{} ({note})", degree + 1)
    } else {
        (degree + 1).to_string()
    }
}

/// Text shown for an event, if any. Degrees are printed 1-based.
pub fn render(event: &SessionEvent) -> Option<String> {
    let line = match event {
        SessionEvent::Started {
            mode,
            key,
            signature,
            tonality,
            progression,
        } => {
            let mut line = format!("Key: {key} [{signature}], {tonality}");
            if let (PracticeMode::Progression, Some(name)) = (mode, progression) {
                line.push_str(&format!(", progression {name}"));
            }
            line
        }
        SessionEvent::ScaleWalk => "Scale:".to_string(),
        SessionEvent::FreePlay => "Free play:".to_string(),
        SessionEvent::Cadence { .. } => "  cadence".to_string(),
        SessionEvent::Chunk { index, shape, len } => {
            format!("#{} {shape} ({len} notes)", index + 1)
        }
        SessionEvent::Note {
            note,
            degree,
            show_name,
        } => format!("  {}", degree_with_name(*degree, note, *show_name)),
        SessionEvent::Chord {
            notes,
            degrees,
            show_names,
        } => {
            let parts: Vec<String> = degrees
                .iter()
                .zip(notes)
                .map(|(degree, note)| degree_with_name(*degree, note, *show_names))
                .collect();
            format!("  [{}]", parts.join(" "))
        }
        SessionEvent::ProgressionChord { name, notes } => {
            let notes: Vec<String> = notes.iter().map(Note::to_string).collect();
            format!("{name}: {}", notes.join(" "))
        }
        SessionEvent::ChordAndMelody { melody, .. } => format!("  chord + {melody}"),
        SessionEvent::MelodyAlone { note } => format!("  {note}"),
        SessionEvent::Label { text } => format!("  -> {text}"),
        SessionEvent::MissingSample { note } => format!("  (no sample for {note})"),
        SessionEvent::Paused => "Paused, press space to resume".to_string(),
        SessionEvent::Resumed => "Resumed".to_string(),
        SessionEvent::Finished(summary) => match summary.outcome {
            SessionOutcome::Completed(_) => "Session complete".to_string(),
            SessionOutcome::Quit => return None,
        },
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use etude_domain_drill::ChunkShape;
    use pretty_assertions::assert_eq;

    fn note(text: &str) -> Note {
        text.parse().unwrap()
    }

    #[test]
    fn degrees_are_one_based() {
        let event = SessionEvent::Note {
            note: note("E4"),
            degree: 2,
            show_name: false,
        };
        assert_eq!(render(&event).as_deref(), Some("  3"));
    }

    #[test]
    fn chords_show_names_on_request() {
        let event = SessionEvent::Chord {
            notes: vec![note("C3"), note("E3"), note("G3")],
            degrees: vec![0, 2, 4],
            show_names: true,
        };
        assert_eq!(
            render(&event).as_deref(),
            Some("  [1 (C3) 3 (E3) 5 (G3)]")
        );
    }

    #[test]
    fn chunks_are_numbered_from_one() {
        let event = SessionEvent::Chunk {
            index: 0,
            shape: ChunkShape::ChordMelody,
            len: 3,
        };
        assert_eq!(
            render(&event).as_deref(),
            Some("#1 chord-melody (3 notes)")
        );
    }

    #[test]
    fn elapsed_is_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(605)), "10:05");
        assert_eq!(format_elapsed(Duration::from_millis(59_900)), "0:59");
    }
}
