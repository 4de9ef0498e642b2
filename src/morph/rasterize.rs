//! Per-triangle inverse warp and cross-dissolve.
//!
//! Every destination pixel covered by the interpolated triangle is mapped back into the
//! source and target triangles with the same barycentric weights, sampled at the nearest
//! pixel (round, then clamp to the image), and blended by `t`.

use rayon::prelude::*;

use crate::foundation::core::{Point, Rgb8};
use crate::foundation::math::{lerp, round_clamp_index, round_clamp_u8};
use crate::mesh::triangulate::TriangleMesh;
use crate::morph::barycentric::{BarycentricSolver, EdgeRule};
use crate::render::frame::RasterImage;

/// Why a triangle contributed no pixels. Neither reason fails the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Collinear (or non-finite) interpolated vertices.
    Degenerate,
    /// A mesh index points past the end of the point lists.
    OutOfRangeIndex,
}

/// Rasterization counters for one frame (or summed over a sequence).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub triangles_drawn: u64,
    pub triangles_degenerate: u64,
    pub triangles_out_of_range: u64,
    /// Pixel writes, counting shared-edge pixels once per claiming triangle.
    pub pixels_written: u64,
}

impl RasterStats {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Degenerate => self.triangles_degenerate += 1,
            SkipReason::OutOfRangeIndex => self.triangles_out_of_range += 1,
        }
    }

    pub fn merge(&mut self, other: &RasterStats) {
        self.triangles_drawn += other.triangles_drawn;
        self.triangles_degenerate += other.triangles_degenerate;
        self.triangles_out_of_range += other.triangles_out_of_range;
        self.pixels_written += other.pixels_written;
    }
}

/// One mesh triangle in source, target and destination (interpolated) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpTriangle {
    pub source: [Point; 3],
    pub target: [Point; 3],
    pub dest: [Point; 3],
}

impl WarpTriangle {
    /// Look up the three vertices of `tri`; `None` if any index is out of range for any list.
    pub fn gather(
        tri: [usize; 3],
        source: &[Point],
        target: &[Point],
        dest: &[Point],
    ) -> Option<Self> {
        let pick = |pts: &[Point]| -> Option<[Point; 3]> {
            Some([*pts.get(tri[0])?, *pts.get(tri[1])?, *pts.get(tri[2])?])
        };
        Some(Self {
            source: pick(source)?,
            target: pick(target)?,
            dest: pick(dest)?,
        })
    }
}

/// Images and blend settings shared by every triangle of a frame.
#[derive(Clone, Copy, Debug)]
pub struct WarpSources<'a> {
    pub source: &'a RasterImage,
    pub target: &'a RasterImage,
    pub t: f64,
    pub edge_rule: EdgeRule,
}

#[derive(Clone, Copy, Debug)]
struct PreparedTriangle {
    solver: BarycentricSolver,
    source: [Point; 3],
    target: [Point; 3],
    // Inclusive pixel bounds, already clamped to the frame.
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

// `Ok(None)`: valid triangle whose bounding box misses the frame.
fn prepare(
    tri: &WarpTriangle,
    width: u32,
    height: u32,
) -> Result<Option<PreparedTriangle>, SkipReason> {
    let solver = BarycentricSolver::new(tri.dest).ok_or(SkipReason::Degenerate)?;
    if width == 0 || height == 0 {
        return Ok(None);
    }

    let xs = tri.dest.map(|p| p.x);
    let ys = tri.dest.map(|p| p.y);
    let min = |v: [f64; 3]| v[0].min(v[1]).min(v[2]);
    let max = |v: [f64; 3]| v[0].max(v[1]).max(v[2]);

    let x0 = min(xs).ceil().max(0.0);
    let x1 = max(xs).floor().min(f64::from(width - 1));
    let y0 = min(ys).ceil().max(0.0);
    let y1 = max(ys).floor().min(f64::from(height - 1));
    if x0 > x1 || y0 > y1 {
        return Ok(None);
    }

    Ok(Some(PreparedTriangle {
        solver,
        source: tri.source,
        target: tri.target,
        x0: x0 as u32,
        x1: x1 as u32,
        y0: y0 as u32,
        y1: y1 as u32,
    }))
}

/// Write one triangle into the rows `row_start..row_start + rows.len() / stride` of a frame
/// `width` pixels wide. Returns the number of pixels written.
fn fill_rows(
    rows: &mut [u8],
    row_start: u32,
    width: u32,
    tri: &PreparedTriangle,
    src: &WarpSources<'_>,
) -> u64 {
    let stride = width as usize * RasterImage::CHANNELS;
    if stride == 0 || rows.is_empty() {
        return 0;
    }
    let row_end = row_start + (rows.len() / stride) as u32;
    let y0 = tri.y0.max(row_start);
    let y1 = tri.y1.min(row_end - 1);
    if y0 > y1 {
        return 0;
    }

    let mut written = 0;
    for y in y0..=y1 {
        let row = &mut rows[(y - row_start) as usize * stride..][..stride];
        for x in tri.x0..=tri.x1 {
            let bc = tri
                .solver
                .coords(Point::new(f64::from(x), f64::from(y)));
            if !tri.solver.contains(&bc, src.edge_rule) {
                continue;
            }

            let s = bc.apply(&tri.source);
            let g = bc.apply(&tri.target);
            let cs = src.source.pixel(
                round_clamp_index(s.x, src.source.width),
                round_clamp_index(s.y, src.source.height),
            );
            let cg = src.target.pixel(
                round_clamp_index(g.x, src.target.width),
                round_clamp_index(g.y, src.target.height),
            );

            let i = x as usize * RasterImage::CHANNELS;
            row[i..i + RasterImage::CHANNELS]
                .copy_from_slice(&cross_dissolve(cs, cg, src.t).to_array());
            written += 1;
        }
    }
    written
}

// Sampling clamps into the source/target, which needs at least one pixel and a full buffer.
fn images_usable(frame: &RasterImage, src: &WarpSources<'_>) -> bool {
    let ok = frame.data.len() == frame.row_stride() * frame.height as usize
        && src.source.is_well_formed()
        && src.target.is_well_formed();
    if !ok {
        tracing::warn!(
            frame = format_args!("{}x{}", frame.width, frame.height),
            source = format_args!("{}x{}", src.source.width, src.source.height),
            target = format_args!("{}x{}", src.target.width, src.target.height),
            "skipping rasterization over empty or malformed images"
        );
    }
    ok
}

/// `round((1 - t) * a + t * b)` per channel, saturated to u8.
pub fn cross_dissolve(a: Rgb8, b: Rgb8, t: f64) -> Rgb8 {
    let mix = |x: u8, y: u8| round_clamp_u8(lerp(f64::from(x), f64::from(y), t));
    Rgb8::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

/// Warp a single triangle into `frame`. Returns the number of pixels written.
pub fn warp_triangle(
    frame: &mut RasterImage,
    tri: &WarpTriangle,
    src: &WarpSources<'_>,
) -> Result<u64, SkipReason> {
    if !images_usable(frame, src) {
        return Ok(0);
    }
    let Some(prepared) = prepare(tri, frame.width, frame.height)? else {
        return Ok(0);
    };
    let width = frame.width;
    Ok(fill_rows(&mut frame.data, 0, width, &prepared, src))
}

/// Warp every mesh triangle into `frame`, in mesh order.
///
/// `dest` holds the interpolated vertex positions for `src.t`. With `row_bands > 1` the frame
/// is split into that many horizontal bands rasterized in parallel on the current rayon pool;
/// each band still applies triangles in mesh order, so the result matches `row_bands == 1`.
pub fn rasterize_mesh(
    frame: &mut RasterImage,
    mesh: &TriangleMesh,
    source: &[Point],
    target: &[Point],
    dest: &[Point],
    src: &WarpSources<'_>,
    row_bands: usize,
) -> RasterStats {
    let mut stats = RasterStats::default();
    if !images_usable(frame, src) {
        return stats;
    }
    let mut prepared = Vec::with_capacity(mesh.len());
    for &tri in mesh.triangles() {
        let Some(warp) = WarpTriangle::gather(tri, source, target, dest) else {
            tracing::trace!(?tri, "skipping triangle with out-of-range index");
            stats.record_skip(SkipReason::OutOfRangeIndex);
            continue;
        };
        match prepare(&warp, frame.width, frame.height) {
            Ok(Some(p)) => {
                stats.triangles_drawn += 1;
                prepared.push(p);
            }
            Ok(None) => stats.triangles_drawn += 1,
            Err(reason) => {
                tracing::trace!(?tri, ?reason, "skipping triangle");
                stats.record_skip(reason);
            }
        }
    }

    let width = frame.width;
    let stride = frame.row_stride();
    let bands = row_bands.max(1).min(frame.height.max(1) as usize);
    if bands <= 1 || stride == 0 {
        stats.pixels_written = prepared
            .iter()
            .map(|p| fill_rows(&mut frame.data, 0, width, p, src))
            .sum();
        return stats;
    }

    let band_rows = (frame.height as usize).div_ceil(bands);
    stats.pixels_written = frame
        .data
        .par_chunks_mut(band_rows * stride)
        .enumerate()
        .map(|(i, rows)| {
            let row_start = (i * band_rows) as u32;
            prepared
                .iter()
                .map(|p| fill_rows(rows, row_start, width, p, src))
                .sum::<u64>()
        })
        .sum();
    stats
}

#[cfg(test)]
#[path = "../../tests/unit/morph/rasterize.rs"]
mod tests;
