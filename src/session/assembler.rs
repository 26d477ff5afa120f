use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::animation::director::FrameComposer;
use crate::encode::sink::FrameSink;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{SawcutError, SawcutResult};
use crate::foundation::math::frame_seed;
use crate::render::frame::FrameRGBA;
use crate::session::sequence::FrameSequence;

const MAX_CHUNK_BYTES: u64 = 128 * 1024 * 1024;

/// Shared flag for cooperative cancellation, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Frames already being composed still finish.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Cancel once `trigger` resolves to `true`.
    ///
    /// The trigger runs on its own thread with a single-threaded tokio runtime, so callers stay
    /// synchronous.
    pub fn cancel_when<F>(&self, trigger: F) -> SawcutResult<JoinHandle<()>>
    where
        F: Future<Output = bool> + Send + 'static,
    {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                SawcutError::Other(anyhow::anyhow!("failed to build signal runtime: {e}"))
            })?;
        let token = self.clone();
        std::thread::Builder::new()
            .name("sawcut-cancel".to_owned())
            .spawn(move || {
                if rt.block_on(trigger) {
                    token.cancel();
                }
            })
            .map_err(|e| {
                SawcutError::Other(anyhow::anyhow!("failed to spawn cancel watcher: {e}"))
            })
    }

    /// Cancel on the first Ctrl-C, letting the run stop between frames and clean up its spool.
    pub fn cancel_on_ctrl_c(&self) -> SawcutResult<()> {
        self.cancel_when(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::warn!("interrupt received, cancelling after the current frame");
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ctrl-c handler unavailable");
                    false
                }
            }
        })?;
        Ok(())
    }
}

/// Options controlling how a sequence is assembled.
#[derive(Clone, Debug)]
pub struct AssemblerOpts {
    /// Base seed; frame `i` uses `frame_seed(seed, i)`.
    pub seed: u64,
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames per parallel chunk.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Spool frames to PNG files instead of keeping them in memory.
    pub spool_frames: bool,
    /// Parent of the spool directory. `None` uses the system temp dir.
    pub temp_root: Option<PathBuf>,
    /// Cancellation flag.
    pub cancel: CancelToken,
}

impl Default for AssemblerOpts {
    fn default() -> Self {
        Self {
            seed: 0,
            parallel: false,
            chunk_size: 64,
            threads: None,
            spool_frames: false,
            temp_root: None,
            cancel: CancelToken::default(),
        }
    }
}

/// Run statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the sequence.
    pub frames_total: u64,
    /// Frames composed.
    pub frames_rendered: u64,
    /// Artifact reported by the sink.
    pub output: Option<PathBuf>,
}

/// Drives a [`FrameComposer`] over every frame and hands the result to a sink.
///
/// All frames are composed before any reaches the sink; a failure anywhere leaves nothing behind.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    opts: AssemblerOpts,
}

impl Assembler {
    /// Create an assembler.
    pub fn new(opts: AssemblerOpts) -> Self {
        Self { opts }
    }

    /// Options in use.
    pub fn opts(&self) -> &AssemblerOpts {
        &self.opts
    }

    /// Compose one frame with its per-frame RNG.
    pub fn render_frame(
        &self,
        composer: &dyn FrameComposer,
        frame: FrameIndex,
    ) -> SawcutResult<FrameRGBA> {
        compose_one(composer, self.opts.seed, frame.0)
    }

    /// Compose frames `0..total` into a [`FrameSequence`].
    ///
    /// Errors carry the failing frame index; in parallel mode that is the lowest failing index of
    /// the first failing chunk.
    #[tracing::instrument(
        skip_all,
        fields(frames = composer.total_frames(), parallel = self.opts.parallel)
    )]
    pub fn assemble(&self, composer: &dyn FrameComposer) -> SawcutResult<FrameSequence> {
        let size = composer.size();
        let fps = composer.fps();
        let total = composer.total_frames();
        if total == 0 {
            return Err(SawcutError::validation("nothing to render: zero frames"));
        }

        let mut seq = if self.opts.spool_frames {
            FrameSequence::spooled(size, fps, self.opts.temp_root.as_deref())?
        } else {
            FrameSequence::in_memory(size, fps)
        };

        if self.opts.parallel {
            self.assemble_parallel(composer, &mut seq)?;
        } else {
            for f in 0..total {
                self.check_cancelled(f)?;
                let frame = compose_one(composer, self.opts.seed, f)?;
                seq.push(frame).map_err(|e| e.at_frame(f))?;
                tracing::debug!(frame = f, "composed frame");
            }
        }

        tracing::info!(
            frames = seq.len(),
            spooled = seq.spool_dir().is_some(),
            "sequence assembled"
        );
        Ok(seq)
    }

    /// Assemble the sequence, then encode it into `sink`.
    pub fn render(
        &self,
        composer: &dyn FrameComposer,
        sink: &mut dyn FrameSink,
    ) -> SawcutResult<RenderStats> {
        let seq = self.assemble(composer)?;
        let frames = seq.len() as u64;
        let output = seq.encode_into(sink)?;
        tracing::info!(frames, output = ?output, "render finished");
        Ok(RenderStats {
            frames_total: composer.total_frames(),
            frames_rendered: frames,
            output,
        })
    }

    fn assemble_parallel(
        &self,
        composer: &dyn FrameComposer,
        seq: &mut FrameSequence,
    ) -> SawcutResult<()> {
        let total = composer.total_frames();
        let pool = build_thread_pool(self.opts.threads)?;
        let size = composer.size();
        let bytes_per_frame = u64::from(size.width)
            .saturating_mul(u64::from(size.height))
            .saturating_mul(4)
            .max(1);
        let max_chunk_by_mem = (MAX_CHUNK_BYTES / bytes_per_frame).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size).min(max_chunk_by_mem);
        let seed = self.opts.seed;
        let cancel = &self.opts.cancel;

        let mut chunk_start = 0;
        while chunk_start < total {
            self.check_cancelled(chunk_start)?;
            let chunk_end = (chunk_start + chunk_size).min(total);
            let rendered: Vec<SawcutResult<FrameRGBA>> = pool.install(|| {
                (chunk_start..chunk_end)
                    .into_par_iter()
                    .map(|f| {
                        if cancel.is_cancelled() {
                            return Err(SawcutError::Cancelled { frame: f });
                        }
                        compose_one(composer, seed, f)
                    })
                    .collect()
            });

            for (f, frame) in (chunk_start..chunk_end).zip(rendered) {
                seq.push(frame?).map_err(|e| e.at_frame(f))?;
            }
            tracing::debug!(start = chunk_start, end = chunk_end, "composed chunk");
            chunk_start = chunk_end;
        }
        Ok(())
    }

    fn check_cancelled(&self, frame: u64) -> SawcutResult<()> {
        if self.opts.cancel.is_cancelled() {
            tracing::warn!(frame, "render cancelled");
            return Err(SawcutError::Cancelled { frame });
        }
        Ok(())
    }
}

fn compose_one(composer: &dyn FrameComposer, seed: u64, f: u64) -> SawcutResult<FrameRGBA> {
    let mut rng = StdRng::seed_from_u64(frame_seed(seed, f));
    let canvas = composer
        .compose(FrameIndex(f), &mut rng)
        .map_err(|e| e.at_frame(f))?;
    let size = composer.size();
    if canvas.width() != size.width || canvas.height() != size.height {
        return Err(SawcutError::Composition {
            frame: f,
            message: format!(
                "composer produced {}x{}, expected {}x{}",
                canvas.width(),
                canvas.height(),
                size.width,
                size.height
            ),
        });
    }
    Ok(canvas.into_frame())
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> SawcutResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SawcutError::validation("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        SawcutError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/assembler.rs"]
mod tests;
