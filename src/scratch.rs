//! Per-item scratch directories for model collaborators.
//!
//! External diarization and ASR tools tend to want files: a WAV to read, a directory to
//! drop RTTMs into. Sharing one fixed directory across requests breaks as soon as two
//! requests overlap, so every audio item gets its own [`ScratchDir`]: a uniquely named
//! temporary directory that is removed when the handle drops, whether the item succeeded
//! or not.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::audio::AudioData;

/// A scoped temporary directory, cleaned up on drop.
pub struct ScratchDir {
    dir: tempfile::TempDir,
}

impl ScratchDir {
    /// Create a fresh scratch directory under the system temp root.
    pub fn new() -> crate::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("diarist-{}-", Uuid::new_v4().simple()))
            .tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Spill audio samples to `<scratch>/audio.wav` (mono PCM16) and return the path.
    ///
    /// Collaborators that shell out to file-based tools call this; in-process
    /// collaborators work from the samples directly and never touch the disk.
    pub fn write_wav(&self, audio: &AudioData) -> crate::Result<PathBuf> {
        let path = self.dir.path().join("audio.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: audio.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(&path, spec)?;
        for sample in &audio.samples {
            let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(clamped)?;
        }
        writer.finalize()?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_dirs_are_unique_and_cleaned_up() -> anyhow::Result<()> {
        let first = ScratchDir::new()?;
        let second = ScratchDir::new()?;
        assert_ne!(first.path(), second.path());

        let kept = first.path().to_path_buf();
        assert!(kept.is_dir());
        drop(first);
        assert!(!kept.exists());
        Ok(())
    }

    #[test]
    fn write_wav_round_trips_through_hound() -> anyhow::Result<()> {
        let scratch = ScratchDir::new()?;
        let audio = AudioData {
            samples: vec![0.0, 0.5, -0.5],
            sample_rate: 16_000,
        };

        let path = scratch.write_wav(&audio)?;
        let mut reader = hound::WavReader::open(&path)?;
        assert_eq!(reader.spec().sample_rate, 16_000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.samples::<i16>().count(), 3);
        Ok(())
    }
}
