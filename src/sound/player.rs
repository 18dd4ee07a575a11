//! Sound player implementation using rodio.
//!
//! This module provides the `RodioSoundPlayer` which uses the rodio v0.20
//! audio library for cross-platform sound playback.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::{AlertSound, SoundSource};
use super::synth::tone_sources;

/// A sound player that uses rodio for audio playback.
///
/// Playback is non-blocking: each sound gets its own detached sink and
/// releases itself when finished.
pub struct RodioSoundPlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
}

impl RodioSoundPlayer {
    /// Creates a new sound player.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }

    /// Plays a sound at `volume` (0.0 to 1.0).
    ///
    /// A sound file that cannot be opened or decoded is replaced by the
    /// synthesized tone of the same alert.
    pub fn play(&self, source: &SoundSource, volume: f32) -> Result<(), SoundError> {
        let volume = volume.clamp(0.0, 1.0);

        match source {
            SoundSource::File { path, name, .. } => {
                debug!(name = %name, volume, "Playing sound file");
                match self.play_file(path, volume) {
                    Ok(()) => Ok(()),
                    Err(e) if e.should_fallback_to_synth() => {
                        warn!("Failed to play '{}': {}, using synthesized tone", name, e);
                        self.play_synth(source.alert(), volume)
                    }
                    Err(e) => Err(e),
                }
            }
            SoundSource::Synth { sound } => {
                debug!(?sound, volume, "Playing synthesized tone");
                self.play_synth(*sound, volume)
            }
        }
    }

    fn new_sink(&self, volume: f32) -> Result<Sink, SoundError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;
        sink.set_volume(volume);
        Ok(sink)
    }

    /// Plays a sound file from the filesystem.
    fn play_file(&self, path: &Path, volume: f32) -> Result<(), SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| SoundError::DecodeError(e.to_string()))?;

        let sink = self.new_sink(volume)?;
        sink.append(decoder);
        sink.detach();
        Ok(())
    }

    /// Plays the synthesized tone for `sound`.
    fn play_synth(&self, sound: AlertSound, volume: f32) -> Result<(), SoundError> {
        let sink = self.new_sink(volume)?;
        for note in tone_sources(sound) {
            sink.append(note);
        }
        sink.detach();
        Ok(())
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer").finish_non_exhaustive()
    }
}

/// Creates a sound player, returning None if sound is turned off or audio
/// is unavailable.
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<RodioSoundPlayer> {
    if disabled {
        debug!("Sound disabled by --no-sound");
        return None;
    }
    match RodioSoundPlayer::new() {
        Ok(player) => Some(player),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            None
        }
    }
}
