//! Sound playback for alert chimes.
//!
//! This module provides audio alerts, including:
//!
//! - Platform sound discovery ("Ping" and "Submarine" on macOS,
//!   freedesktop theme sounds on Linux)
//! - A synthesized fallback tone when no file is usable
//! - Non-blocking, volume-aware playback
//! - Graceful degradation when audio is unavailable or turned off
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SoundPlayer    │ ← play(source, volume)
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   SoundSource    │────▶│  Sound files     │
//! │                  │     │  (platform dirs) │
//! │                  │     ├──────────────────┤
//! │                  │────▶│ Synthesized tone │
//! └──────────────────┘     │  (fallback)      │
//!                          └──────────────────┘
//! ```

mod error;
mod player;
mod source;
mod synth;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{resolve_alert, resolve_alert_in, AlertSound, AlertSounds, SoundSource};
pub use synth::{notes_for, tone_duration, Note};

/// One deferred alert playback: which sound, and how loud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertCue {
    pub sound: AlertSound,
    pub volume: f32,
}

impl AlertCue {
    #[must_use]
    pub fn new(sound: AlertSound, volume: f32) -> Self {
        Self { sound, volume }
    }
}

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, mock for testing).
pub trait SoundPlayer {
    /// Plays a sound at `volume` (0.0 to 1.0) without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, source: &SoundSource, volume: f32) -> Result<(), SoundError>;
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, source: &SoundSource, volume: f32) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, source, volume)
    }
}

/// Plays the source for `cue`, logging failures instead of returning them.
pub fn play_cue<P: SoundPlayer + ?Sized>(player: &P, sounds: &AlertSounds, cue: AlertCue) {
    let source = sounds.source_for(cue.sound);
    if let Err(e) = player.play(source, cue.volume) {
        tracing::warn!("Alert sound failed: {}. {}", e, e.suggestion());
    }
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<(SoundSource, f32)>>,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    /// Returns every recorded `(source, volume)` pair in play order.
    #[must_use]
    pub fn get_play_calls(&self) -> Vec<(SoundSource, f32)> {
        self.play_calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.play_calls.lock().unwrap().clear();
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource, volume: f32) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.play_calls
            .lock()
            .unwrap()
            .push((source.clone(), volume));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_cue_uses_resolved_source_and_volume() {
        let player = MockSoundPlayer::new();
        let sounds = AlertSounds::synthesized();

        play_cue(&player, &sounds, AlertCue::new(AlertSound::Reminder, 0.8));

        let calls = player.get_play_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SoundSource::synth(AlertSound::Reminder));
        assert!((calls[0].1 - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_play_cue_swallows_errors() {
        let player = MockSoundPlayer::new();
        player.set_should_fail(true);

        play_cue(&player, &AlertSounds::synthesized(), AlertCue::new(AlertSound::Chime, 0.5));

        assert_eq!(player.play_count(), 0);
    }

    #[test]
    fn test_mock_records_and_clears() {
        let player = MockSoundPlayer::new();

        player
            .play(&SoundSource::synth(AlertSound::Chime), 0.5)
            .unwrap();
        assert_eq!(player.play_count(), 1);

        player.clear_calls();
        assert_eq!(player.play_count(), 0);
    }
}
