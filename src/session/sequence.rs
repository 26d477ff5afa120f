use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{CanvasSize, Fps, FrameIndex};
use crate::foundation::error::{SawcutError, SawcutResult};
use crate::render::frame::FrameRGBA;

/// Ordered frames `0..len`, held in memory or spooled to disk.
///
/// Spooled frames are PNG files named `frame_{i:05}.png` inside a private temporary directory. The
/// PNGs carry the premultiplied bytes unchanged so a reload is lossless. The directory is removed
/// when the sequence is dropped, whether it was encoded or not.
#[derive(Debug)]
pub struct FrameSequence {
    size: CanvasSize,
    fps: Fps,
    store: FrameStore,
}

#[derive(Debug)]
enum FrameStore {
    Memory(Vec<FrameRGBA>),
    Spool { dir: TempDir, paths: Vec<PathBuf> },
}

impl FrameSequence {
    pub(crate) fn in_memory(size: CanvasSize, fps: Fps) -> Self {
        Self {
            size,
            fps,
            store: FrameStore::Memory(Vec::new()),
        }
    }

    /// Spool into a fresh temporary directory under `parent` (the system temp dir when `None`).
    pub(crate) fn spooled(size: CanvasSize, fps: Fps, parent: Option<&Path>) -> SawcutResult<Self> {
        use anyhow::Context as _;
        let mut builder = tempfile::Builder::new();
        builder.prefix("sawcut-frames-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent).with_context(|| {
                format!("failed to create spool directory in '{}'", parent.display())
            })?,
            None => builder
                .tempdir()
                .context("failed to create spool directory")?,
        };
        tracing::debug!(dir = %dir.path().display(), "spooling frames");
        Ok(Self {
            size,
            fps,
            store: FrameStore::Spool {
                dir,
                paths: Vec::new(),
            },
        })
    }

    /// Append the next frame.
    pub(crate) fn push(&mut self, frame: FrameRGBA) -> SawcutResult<()> {
        if frame.width != self.size.width || frame.height != self.size.height {
            return Err(SawcutError::validation(format!(
                "frame size {}x{} does not match sequence size {}x{}",
                frame.width, frame.height, self.size.width, self.size.height
            )));
        }
        match &mut self.store {
            FrameStore::Memory(frames) => frames.push(frame),
            FrameStore::Spool { dir, paths } => {
                let path = dir.path().join(format!("frame_{:05}.png", paths.len()));
                image::save_buffer(
                    &path,
                    &frame.data,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| {
                    SawcutError::Other(anyhow::anyhow!(
                        "failed to write spooled frame '{}': {e}",
                        path.display()
                    ))
                })?;
                paths.push(path);
            }
        }
        Ok(())
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        match &self.store {
            FrameStore::Memory(frames) => frames.len(),
            FrameStore::Spool { paths, .. } => paths.len(),
        }
    }

    /// Whether the sequence has no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frame size.
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Playback rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Spool directory, when frames live on disk.
    pub fn spool_dir(&self) -> Option<&Path> {
        match &self.store {
            FrameStore::Memory(_) => None,
            FrameStore::Spool { dir, .. } => Some(dir.path()),
        }
    }

    /// Load frame `idx`.
    pub fn frame(&self, idx: usize) -> SawcutResult<FrameRGBA> {
        let found = match &self.store {
            FrameStore::Memory(frames) => frames.get(idx).cloned(),
            FrameStore::Spool { paths, .. } => {
                paths.get(idx).map(|p| load_spooled(p)).transpose()?
            }
        };
        found.ok_or_else(|| SawcutError::validation(format!("frame {idx} is not in the sequence")))
    }

    /// Consume the sequence into in-memory frames.
    pub fn into_frames(self) -> SawcutResult<Vec<FrameRGBA>> {
        match self.store {
            FrameStore::Memory(frames) => Ok(frames),
            FrameStore::Spool { dir, paths } => {
                let frames = paths
                    .iter()
                    .map(|p| load_spooled(p))
                    .collect::<SawcutResult<Vec<_>>>();
                drop(dir);
                frames
            }
        }
    }

    /// Stream every frame into `sink` in order, then finish it.
    ///
    /// Any failure, including one from the sink, is reported as a video encode error. The sequence
    /// is consumed and its spool directory removed either way.
    #[tracing::instrument(skip_all, fields(frames = self.len()))]
    pub fn encode_into(self, sink: &mut dyn FrameSink) -> SawcutResult<Option<PathBuf>> {
        let cfg = SinkConfig {
            width: self.size.width,
            height: self.size.height,
            fps: self.fps,
        };
        self.stream(sink, cfg).map_err(into_encode_error)
    }

    fn stream(&self, sink: &mut dyn FrameSink, cfg: SinkConfig) -> SawcutResult<Option<PathBuf>> {
        sink.begin(cfg)?;
        for idx in 0..self.len() {
            let frame = self.frame(idx)?;
            sink.push_frame(FrameIndex(idx as u64), &frame)?;
        }
        sink.end()
    }
}

fn load_spooled(path: &Path) -> SawcutResult<FrameRGBA> {
    let img = image::open(path)
        .map_err(|e| {
            SawcutError::Other(anyhow::anyhow!(
                "failed to read spooled frame '{}': {e}",
                path.display()
            ))
        })?
        .into_rgba8();
    let (width, height) = img.dimensions();
    Ok(FrameRGBA {
        width,
        height,
        data: img.into_raw(),
        premultiplied: true,
    })
}

fn into_encode_error(err: SawcutError) -> SawcutError {
    match err {
        SawcutError::VideoEncode(_) => err,
        other => SawcutError::video_encode(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/sequence.rs"]
mod tests;
