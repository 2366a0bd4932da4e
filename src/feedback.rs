use crate::config::Config;
use rodio::OutputStreamBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Vote,
    Undo,
    Finalize,
    Applause,
}

/// Best-effort audio cues for tally events.
///
/// Playback runs on a blocking thread and never stalls the caller; a missing
/// sound file or audio device degrades to a warning.
pub struct AudioFeedback {
    paths: HashMap<Cue, PathBuf>,
    enabled: bool,
}

impl AudioFeedback {
    pub fn from_config(config: &Config) -> Self {
        let paths = HashMap::from([
            (Cue::Vote, PathBuf::from(&config.vote_sound_path)),
            (Cue::Undo, PathBuf::from(&config.undo_sound_path)),
            (Cue::Finalize, PathBuf::from(&config.finalize_sound_path)),
            (Cue::Applause, PathBuf::from(&config.applause_sound_path)),
        ]);

        Self {
            paths,
            enabled: config.audio_feedback,
        }
    }

    pub fn play(&self, cue: Cue) {
        if !self.enabled {
            return;
        }

        let Some(path) = self.paths.get(&cue) else {
            return;
        };

        let path = path.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = play_sound_blocking(&path) {
                tracing::warn!("Failed to play sound {}: {}", path.display(), e);
            }
        });
    }
}

fn play_sound_blocking(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(path)
        .or_else(|_| File::open(PathBuf::from("assets").join(path)))
        .or_else(|_| File::open(PathBuf::from("/usr/share/rekap/assets").join(path)))?;

    let stream_handle = OutputStreamBuilder::open_default_stream()?;
    let sink = rodio::play(stream_handle.mixer(), BufReader::new(file))?;
    sink.sleep_until_end();

    Ok(())
}
