use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::effects::composite::over;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, Rgba8Premul};
use crate::foundation::error::{SawcutError, SawcutResult};
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Colour translucent pixels are flattened onto; should be opaque.
    pub background: Rgba8Premul,
    /// `ffmpeg` executable; defaults to `ffmpeg` on `PATH`.
    pub program: PathBuf,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgba8Premul::opaque(0, 0, 0),
            program: PathBuf::from("ffmpeg"),
        }
    }

    /// Command-line arguments for an h264/yuv420p encode of raw RGBA frames read from stdin.
    pub fn encoder_args(&self, cfg: SinkConfig) -> Vec<OsString> {
        let overwrite = if self.overwrite { "-y" } else { "-n" };
        let size = format!("{}x{}", cfg.width, cfg.height);
        // `-r` before `-i` is the rawvideo input rate.
        let rate = format!("{}/{}", cfg.fps.num, cfg.fps.den);
        let mut args: Vec<OsString> = [
            overwrite,
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            size.as_str(),
            "-r",
            rate.as_str(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(self.out_path.clone().into_os_string());
        args
    }
}

/// A running `ffmpeg` process.
struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl Encoder {
    fn spawn(opts: &FfmpegSinkOpts, cfg: SinkConfig) -> SawcutResult<Self> {
        let mut child = Command::new(&opts.program)
            .args(opts.encoder_args(cfg))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SawcutError::video_encode(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    opts.program.display()
                ))
            })?;

        let stdin = child.stdin.take();
        let mut pipe = child
            .stderr
            .take()
            .ok_or_else(|| SawcutError::video_encode("ffmpeg stderr was not captured"))?;
        // ffmpeg blocks once its stderr pipe fills, so drain it concurrently.
        let stderr = std::thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        });
        Ok(Self {
            child,
            stdin,
            stderr,
        })
    }

    fn write(&mut self, bytes: &[u8]) -> SawcutResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SawcutError::video_encode("ffmpeg stdin is closed"))?;
        stdin.write_all(bytes).map_err(|e| {
            SawcutError::video_encode(format!("failed to write frame to ffmpeg: {e}"))
        })
    }

    fn finish(mut self) -> SawcutResult<()> {
        drop(self.stdin.take());
        let status = self.child.wait().map_err(|e| {
            SawcutError::video_encode(format!("failed to wait for ffmpeg: {e}"))
        })?;
        let log = self
            .stderr
            .join()
            .map_err(|_| SawcutError::video_encode("ffmpeg stderr reader panicked"))?
            .map_err(|e| {
                SawcutError::video_encode(format!("ffmpeg stderr read failed: {e}"))
            })?;
        if status.success() {
            return Ok(());
        }
        Err(SawcutError::video_encode(format!(
            "ffmpeg exited with {status}: {}",
            String::from_utf8_lossy(&log).trim()
        )))
    }
}

/// Sink that spawns `ffmpeg` and streams raw frames to its stdin. Video only (h264, yuv420p).
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    scratch: Vec<u8>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            cfg: None,
            last_idx: None,
            scratch: Vec::new(),
        }
    }
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(skip(self), fields(out = %self.opts.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> SawcutResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(SawcutError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SawcutError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(SawcutError::validation(format!(
                "yuv420p output needs even dimensions, got {}x{}",
                cfg.width, cfg.height
            )));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(SawcutError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        self.encoder = Some(Encoder::spawn(&self.opts, cfg)?);
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.cfg = Some(cfg);
        self.last_idx = None;
        tracing::debug!("ffmpeg started");
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SawcutResult<()> {
        let (Some(cfg), Some(encoder)) = (self.cfg, self.encoder.as_mut()) else {
            return Err(SawcutError::video_encode("ffmpeg sink not started"));
        };
        if self.last_idx.is_some_and(|last| idx <= last) {
            return Err(SawcutError::video_encode(format!(
                "frame {} arrived out of order",
                idx.0
            )));
        }
        if frame.width != cfg.width
            || frame.height != cfg.height
            || frame.data.len() != self.scratch.len()
        {
            return Err(SawcutError::validation(format!(
                "frame size mismatch: got {}x{} ({} bytes), expected {}x{}",
                frame.width,
                frame.height,
                frame.data.len(),
                cfg.width,
                cfg.height
            )));
        }
        self.last_idx = Some(idx);

        if frame.premultiplied {
            flatten_onto(&mut self.scratch, &frame.data, self.opts.background);
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }
        encoder.write(&self.scratch)
    }

    fn end(&mut self) -> SawcutResult<Option<PathBuf>> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| SawcutError::video_encode("ffmpeg sink not started"))?;
        self.cfg = None;
        encoder.finish()?;
        tracing::info!(out = %self.opts.out_path.display(), "video written");
        Ok(Some(self.opts.out_path.clone()))
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Some(mut encoder) = self.encoder.take() {
            drop(encoder.stdin.take());
            let _ = encoder.child.kill();
            let _ = encoder.child.wait();
        }
    }
}

/// Source-over every premultiplied pixel of `src` onto `background`.
fn flatten_onto(dst: &mut [u8], src: &[u8], background: Rgba8Premul) {
    let bg = background.to_array();
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        d.copy_from_slice(&over(bg, [s[0], s[1], s[2], s[3]], 1.0));
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SawcutResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
