//! Synthesized fallback tones.
//!
//! Used when no platform sound file is available or it fails to decode.
//! Each alert is two short sine notes played back to back.

use std::time::Duration;

use rodio::source::{SineWave, Source};

use super::source::AlertSound;

/// One note of a synthesized tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency_hz: f32,
    pub duration: Duration,
}

const fn note(frequency_hz: f32, millis: u64) -> Note {
    Note {
        frequency_hz,
        duration: Duration::from_millis(millis),
    }
}

/// Peak amplitude of synthesized notes before the sink volume applies.
const NOTE_AMPLITUDE: f32 = 0.3;

/// Returns the notes of the tone standing in for `sound`.
#[must_use]
pub fn notes_for(sound: AlertSound) -> [Note; 2] {
    match sound {
        AlertSound::Chime => [note(880.0, 120), note(1318.5, 220)],
        AlertSound::Reminder => [note(659.3, 180), note(440.0, 320)],
    }
}

/// Builds rodio sources for the notes of `sound`, in playback order.
pub fn tone_sources(sound: AlertSound) -> impl Iterator<Item = impl Source<Item = f32> + Send> {
    notes_for(sound).into_iter().map(|n| {
        SineWave::new(n.frequency_hz)
            .take_duration(n.duration)
            .amplify(NOTE_AMPLITUDE)
    })
}

/// Total length of the tone for `sound`.
#[must_use]
pub fn tone_duration(sound: AlertSound) -> Duration {
    notes_for(sound).iter().map(|n| n.duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_notes_per_tone() {
        for sound in [AlertSound::Chime, AlertSound::Reminder] {
            let notes = notes_for(sound);
            assert!(notes.iter().all(|n| n.frequency_hz > 0.0));
            assert!(notes.iter().all(|n| !n.duration.is_zero()));
        }
    }

    #[test]
    fn test_chime_rises_reminder_falls() {
        let chime = notes_for(AlertSound::Chime);
        assert!(chime[1].frequency_hz > chime[0].frequency_hz);

        let reminder = notes_for(AlertSound::Reminder);
        assert!(reminder[1].frequency_hz < reminder[0].frequency_hz);
    }

    #[test]
    fn test_chime_shorter_than_chime_spacing() {
        assert!(tone_duration(AlertSound::Chime) < Duration::from_millis(500));
    }

    #[test]
    fn test_tone_sources_one_per_note() {
        assert_eq!(tone_sources(AlertSound::Chime).count(), 2);
        assert_eq!(tone_sources(AlertSound::Reminder).count(), 2);
    }
}
