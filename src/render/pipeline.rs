use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::{
    foundation::core::{Canvas, Rgb8},
    foundation::error::{MorphError, MorphResult},
    foundation::math::Fnv1a64,
    mesh::triangulate::TriangleMesh,
    morph::barycentric::EdgeRule,
    morph::interpolate::{interpolate_points, validate_t},
    morph::rasterize::{RasterStats, WarpSources, rasterize_mesh},
    points::correspondence::{CorrespondenceSet, MorphPoints},
    render::frame::RasterImage,
};

/// Number of intermediate frames to render between the source and target bookends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MorphRequest {
    intermediate_frames: u32,
}

impl MorphRequest {
    pub fn new(intermediate_frames: u32) -> MorphResult<Self> {
        if intermediate_frames < 1 {
            return Err(MorphError::invalid_parameter(
                "intermediate frame count must be >= 1",
            ));
        }
        Ok(Self {
            intermediate_frames,
        })
    }

    pub fn intermediate_frames(self) -> u32 {
        self.intermediate_frames
    }

    /// `t = i / (n + 1)` for intermediate frame `i` in `1..=n`; strictly inside `(0, 1)`.
    pub fn t_at(self, i: u32) -> f64 {
        f64::from(i) / (f64::from(self.intermediate_frames) + 1.0)
    }

    pub fn t_values(self) -> impl Iterator<Item = f64> {
        (1..=self.intermediate_frames).map(move |i| self.t_at(i))
    }
}

/// Frame- and triangle-level parallelism settings.
#[derive(Clone, Debug)]
pub struct RenderThreading {
    /// Render intermediate frames concurrently.
    pub parallel: bool,
    /// Frames per parallel chunk; cancellation and progress are also observed per chunk.
    pub chunk_size: usize,
    /// Worker count for the rayon pool (rayon's default when unset).
    pub threads: Option<usize>,
    /// Horizontal bands per frame, each rasterized by one task.
    pub row_bands: usize,
}

impl RenderThreading {
    /// `threads == Some(0)` is rejected whether or not a pool is needed.
    pub fn validate(&self) -> MorphResult<()> {
        if self.threads == Some(0) {
            return Err(MorphError::invalid_parameter(
                "render threading 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 16,
            threads: None,
            row_bands: 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MorphOptions {
    /// Fill color of every intermediate frame before triangles are drawn.
    pub background: Rgb8,
    pub edge_rule: EdgeRule,
    pub threading: RenderThreading,
}

impl Default for MorphOptions {
    fn default() -> Self {
        Self {
            background: Rgb8::WHITE,
            edge_rule: EdgeRule::default(),
            threading: RenderThreading::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the output sequence, bookends included.
    pub frames_total: u64,
    /// Intermediate frames rasterized.
    pub frames_rendered: u64,
    /// Rasterization counters summed over all intermediate frames.
    pub raster: RasterStats,
}

/// Receives one notification per completed intermediate frame, in order.
pub trait ProgressObserver {
    fn on_frame(&mut self, completed: u32, total: u32);
}

impl<F: FnMut(u32, u32)> ProgressObserver for F {
    fn on_frame(&mut self, completed: u32, total: u32) {
        self(completed, total)
    }
}

/// Observer that ignores progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_frame(&mut self, _completed: u32, _total: u32) {}
}

/// Cooperative cancellation flag, checked once per frame boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A complete morph: `[source, frame_1, ..., frame_n, target]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSequence {
    frames: Vec<RasterImage>,
    stats: RenderStats,
}

impl FrameSequence {
    pub fn frames(&self) -> &[RasterImage] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<RasterImage> {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Order-sensitive digest of every frame; equal for bit-identical sequences.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u64(self.frames.len() as u64);
        for frame in &self.frames {
            frame.hash_into(&mut h);
        }
        h.finish()
    }
}

/// Everything a render needs, owned by one request: the image pair, the frozen points and
/// the mesh built over the source points.
#[derive(Clone, Debug)]
pub struct MorphContext {
    source: RasterImage,
    target: RasterImage,
    points: MorphPoints,
    mesh: TriangleMesh,
}

impl MorphContext {
    pub fn new(
        source: RasterImage,
        target: RasterImage,
        points: MorphPoints,
        mesh: TriangleMesh,
    ) -> MorphResult<Self> {
        source.canvas().validate()?;
        if !source.is_well_formed() || !target.is_well_formed() {
            return Err(MorphError::validation(
                "source and target rasters must be non-empty with width * height * 3 bytes",
            ));
        }
        if source.canvas() != target.canvas() {
            return Err(MorphError::validation(format!(
                "source ({}x{}) and target ({}x{}) images must share dimensions",
                source.width, source.height, target.width, target.height
            )));
        }
        if mesh.is_empty() {
            return Err(MorphError::validation("mesh has no triangles"));
        }
        Ok(Self {
            source,
            target,
            points,
            mesh,
        })
    }

    /// Anchor the canvas corners, freeze the table and Delaunay-triangulate the source points.
    pub fn prepare(
        source: RasterImage,
        target: RasterImage,
        points: &CorrespondenceSet,
    ) -> MorphResult<Self> {
        let canvas: Canvas = source.canvas();
        canvas.validate()?;
        let mut points = points.clone();
        let added = points.ensure_corners(canvas);
        let frozen = points.freeze()?;
        let mesh = TriangleMesh::triangulate(frozen.source())?;
        tracing::debug!(
            points = frozen.len(),
            corners_added = added,
            triangles = mesh.len(),
            "prepared morph context"
        );
        Self::new(source, target, frozen, mesh)
    }

    pub fn source(&self) -> &RasterImage {
        &self.source
    }

    pub fn target(&self) -> &RasterImage {
        &self.target
    }

    pub fn points(&self) -> &MorphPoints {
        &self.points
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    Rendering { completed: u32, total: u32 },
    Complete,
    Failed,
}

/// Renders morph sequences from a [`MorphContext`].
///
/// Output depends only on the context, the options' edge rule and background, and the
/// request: threading settings never change pixels.
#[derive(Debug)]
pub struct FrameSequenceGenerator {
    ctx: MorphContext,
    opts: MorphOptions,
    state: GeneratorState,
}

impl FrameSequenceGenerator {
    pub fn new(ctx: MorphContext, opts: MorphOptions) -> Self {
        Self {
            ctx,
            opts,
            state: GeneratorState::Idle,
        }
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn context(&self) -> &MorphContext {
        &self.ctx
    }

    pub fn options(&self) -> &MorphOptions {
        &self.opts
    }

    /// Render a single frame at `t` in `[0, 1]`.
    pub fn render_frame(&self, t: f64) -> MorphResult<(RasterImage, RasterStats)> {
        validate_t(t)?;
        let (src, tgt) = (self.ctx.points.source(), self.ctx.points.target());
        let dest = interpolate_points(src, tgt, t)?;

        let mut frame = RasterImage::filled(
            self.ctx.source.width,
            self.ctx.source.height,
            self.opts.background,
        );
        let warp = WarpSources {
            source: &self.ctx.source,
            target: &self.ctx.target,
            t,
            edge_rule: self.opts.edge_rule,
        };
        let stats = rasterize_mesh(
            &mut frame,
            &self.ctx.mesh,
            src,
            tgt,
            &dest,
            &warp,
            self.opts.threading.row_bands,
        );
        tracing::debug!(
            t,
            drawn = stats.triangles_drawn,
            degenerate = stats.triangles_degenerate,
            out_of_range = stats.triangles_out_of_range,
            pixels = stats.pixels_written,
            "rendered frame"
        );
        Ok((frame, stats))
    }

    pub fn generate(&mut self, request: MorphRequest) -> MorphResult<FrameSequence> {
        self.generate_with(request, &mut NoProgress, None)
    }

    /// Render `[source, frame_1, ..., frame_n, target]`.
    ///
    /// Progress is reported once per intermediate frame. On error (including cancellation)
    /// the generator ends in [`GeneratorState::Failed`] and no frames are returned.
    #[tracing::instrument(skip(self, progress, cancel), fields(n = request.intermediate_frames))]
    pub fn generate_with(
        &mut self,
        request: MorphRequest,
        progress: &mut dyn ProgressObserver,
        cancel: Option<&CancelToken>,
    ) -> MorphResult<FrameSequence> {
        let total = request.intermediate_frames();
        self.state = GeneratorState::Rendering {
            completed: 0,
            total,
        };
        tracing::info!(
            total,
            triangles = self.ctx.mesh.len(),
            parallel = self.opts.threading.parallel,
            "morph render started"
        );

        match self.render_intermediates(request, progress, cancel) {
            Ok((intermediates, raster)) => {
                let mut frames = Vec::with_capacity(intermediates.len() + 2);
                frames.push(self.ctx.source.clone());
                frames.extend(intermediates);
                frames.push(self.ctx.target.clone());

                let seq = FrameSequence {
                    stats: RenderStats {
                        frames_total: frames.len() as u64,
                        frames_rendered: u64::from(total),
                        raster,
                    },
                    frames,
                };
                self.state = GeneratorState::Complete;
                tracing::info!(
                    frames = seq.len(),
                    fingerprint = format_args!("{:016x}", seq.fingerprint()),
                    "morph render complete"
                );
                Ok(seq)
            }
            Err(e) => {
                self.state = GeneratorState::Failed;
                tracing::warn!(error = %e, "morph render failed");
                Err(e)
            }
        }
    }

    fn render_intermediates(
        &mut self,
        request: MorphRequest,
        progress: &mut dyn ProgressObserver,
        cancel: Option<&CancelToken>,
    ) -> MorphResult<(Vec<RasterImage>, RasterStats)> {
        let total = request.intermediate_frames();
        let threading = self.opts.threading.clone();
        threading.validate()?;
        let needs_pool = threading.parallel || threading.row_bands > 1;
        let pool = if needs_pool {
            Some(build_thread_pool(threading.threads)?)
        } else {
            None
        };

        let mut out = Vec::with_capacity(total as usize);
        let mut raster = RasterStats::default();

        if !threading.parallel {
            for i in 1..=total {
                check_cancel(cancel, i - 1, total)?;
                let t = request.t_at(i);
                let (frame, stats) = match pool.as_ref() {
                    Some(pool) => pool.install(|| self.render_frame(t))?,
                    None => self.render_frame(t)?,
                };
                out.push(frame);
                raster.merge(&stats);
                self.advance(i, total, progress);
            }
            return Ok((out, raster));
        }

        let pool = match pool {
            Some(pool) => pool,
            None => build_thread_pool(threading.threads)?,
        };
        let chunk_size = normalized_chunk_size(threading.chunk_size);
        let mut chunk_start = 1u32;
        while chunk_start <= total {
            check_cancel(cancel, chunk_start - 1, total)?;
            let chunk_end = chunk_start.saturating_add(chunk_size - 1).min(total);

            let this = &*self;
            let rendered = pool.install(|| {
                (chunk_start..=chunk_end)
                    .into_par_iter()
                    .map(|i| {
                        check_cancel(cancel, chunk_start - 1, total)?;
                        this.render_frame(request.t_at(i))
                    })
                    .collect::<Vec<_>>()
            });

            for (offset, item) in rendered.into_iter().enumerate() {
                let (frame, stats) = item?;
                out.push(frame);
                raster.merge(&stats);
                self.advance(chunk_start + offset as u32, total, progress);
            }
            chunk_start = chunk_end + 1;
        }
        Ok((out, raster))
    }

    fn advance(&mut self, completed: u32, total: u32, progress: &mut dyn ProgressObserver) {
        self.state = GeneratorState::Rendering { completed, total };
        progress.on_frame(completed, total);
    }
}

fn check_cancel(cancel: Option<&CancelToken>, completed: u32, total: u32) -> MorphResult<()> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(MorphError::Cancelled { completed, total }),
        _ => Ok(()),
    }
}

fn build_thread_pool(threads: Option<usize>) -> MorphResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MorphError::invalid_parameter(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MorphError::validation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u32 {
    chunk_size.clamp(1, u32::MAX as usize) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
