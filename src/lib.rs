//! meshmorph is a triangle-mesh image morphing engine.
//!
//! A morph is driven by matched correspondence points on a source and a target image:
//!
//! - Collect a [`CorrespondenceSet`] (canvas corners are anchored automatically)
//! - Build a [`MorphContext`], which Delaunay-triangulates the source points
//! - Render the sequence with a [`FrameSequenceGenerator`]; each intermediate frame warps both
//!   images onto the interpolated mesh and cross-dissolves them
//! - Stream the result into a [`FrameSink`] (GIF, PNG sequence, MP4 or memory)
//!
//! Rendering is deterministic: the same inputs produce bit-identical frames with or without
//! parallelism.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod encode;
pub(crate) mod mesh;
pub(crate) mod morph;
pub(crate) mod points;
pub(crate) mod project;
pub(crate) mod render;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rgb8};
pub use crate::foundation::error::{MorphError, MorphResult};

pub use crate::assets::decode::{decode_image, load_image, normalize_pair, resize_image, save_png};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::gif::GifSink;
pub use crate::encode::{ensure_parent_dir, is_ffmpeg_on_path};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, write_sequence};
pub use crate::mesh::triangulate::{DelaunayTriangulator, TriangleMesh, Triangulator};
pub use crate::morph::barycentric::{Barycentric, BarycentricSolver, EdgeRule, barycentric};
pub use crate::morph::interpolate::{interpolate_points, lerp_point, validate_t};
pub use crate::morph::rasterize::{
    RasterStats, SkipReason, WarpSources, WarpTriangle, cross_dissolve, rasterize_mesh,
    warp_triangle,
};
pub use crate::points::correspondence::{CorrespondencePoint, CorrespondenceSet, MorphPoints};
pub use crate::project::file::MorphProject;
pub use crate::render::frame::RasterImage;
pub use crate::render::pipeline::{
    CancelToken, FrameSequence, FrameSequenceGenerator, GeneratorState, MorphContext,
    MorphOptions, MorphRequest, NoProgress, ProgressObserver, RenderStats, RenderThreading,
};
