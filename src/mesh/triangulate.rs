use serde::{Deserialize, Serialize};

use crate::foundation::core::Point;
use crate::foundation::error::{MorphError, MorphResult};

/// Planar triangulation collaborator.
///
/// Implementations return index triples into `points` that cover their convex hull. Inputs
/// always hold at least 3 points.
pub trait Triangulator {
    fn triangulate(&self, points: &[Point]) -> MorphResult<Vec<[usize; 3]>>;
}

/// Delaunay triangulation backed by the `delaunator` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct DelaunayTriangulator;

impl Triangulator for DelaunayTriangulator {
    fn triangulate(&self, points: &[Point]) -> MorphResult<Vec<[usize; 3]>> {
        let pts: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let tri = delaunator::triangulate(&pts);
        Ok(tri
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect())
    }
}

/// Index triples into a correspondence point list, shared by the source and target images.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriangleMesh {
    triangles: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Delaunay-triangulate the source points.
    pub fn triangulate(points: &[Point]) -> MorphResult<Self> {
        Self::triangulate_with(&DelaunayTriangulator, points)
    }

    /// Triangulate with a caller-provided collaborator.
    ///
    /// Triples referencing missing points are rejected; triples that are collinear for the
    /// given positions are dropped.
    pub fn triangulate_with(
        triangulator: &dyn Triangulator,
        points: &[Point],
    ) -> MorphResult<Self> {
        if points.len() < 3 {
            return Err(MorphError::InsufficientPoints {
                found: points.len(),
            });
        }

        let raw = triangulator.triangulate(points)?;
        let mut triangles = Vec::with_capacity(raw.len());
        for tri in raw {
            if tri.iter().any(|&i| i >= points.len()) {
                return Err(MorphError::validation(format!(
                    "triangulator returned {tri:?} for {} points",
                    points.len()
                )));
            }
            if signed_area2(points[tri[0]], points[tri[1]], points[tri[2]]) == 0.0 {
                tracing::debug!(?tri, "dropping collinear triangle from mesh");
                continue;
            }
            triangles.push(tri);
        }

        if triangles.is_empty() {
            return Err(MorphError::validation(
                "triangulation produced no triangles (are all points collinear?)",
            ));
        }
        Ok(Self { triangles })
    }

    /// Wrap triples as-is. Indices are not checked here; the rasterizer skips triangles that
    /// reference missing points.
    pub fn from_triangles(triangles: Vec<[usize; 3]>) -> Self {
        Self { triangles }
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of triangles referencing an index `>= point_count`.
    pub fn out_of_range_count(&self, point_count: usize) -> usize {
        self.triangles
            .iter()
            .filter(|t| t.iter().any(|&i| i >= point_count))
            .count()
    }
}

/// Twice the signed area of `abc`; zero for collinear vertices.
pub(crate) fn signed_area2(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/triangulate.rs"]
mod tests;
