use serde::{Deserialize, Serialize};

use crate::foundation::core::Point;

/// Inside test applied to pixels that fall exactly on a triangle edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRule {
    /// All three coordinates `>= 0`. Pixels on a shared edge are claimed by both neighbours
    /// and the later triangle in mesh order wins.
    #[default]
    Inclusive,
    /// A zero coordinate counts as inside only on a top edge (horizontal, interior below) or a
    /// left edge, so every shared-edge pixel belongs to exactly one triangle.
    TopLeft,
}

/// Weights of a point relative to a triangle `(a, b, c)`; `u + v + w == 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Barycentric {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Barycentric {
    pub fn is_inside_inclusive(&self) -> bool {
        self.u >= 0.0 && self.v >= 0.0 && self.w >= 0.0
    }

    /// Apply the weights to another triangle's vertices.
    pub fn apply(&self, tri: &[Point; 3]) -> Point {
        Point::new(
            self.u * tri[0].x + self.v * tri[1].x + self.w * tri[2].x,
            self.u * tri[0].y + self.v * tri[1].y + self.w * tri[2].y,
        )
    }
}

/// Per-triangle constants for repeated barycentric solves.
#[derive(Clone, Copy, Debug)]
pub struct BarycentricSolver {
    a: Point,
    b: Point,
    c: Point,
    det: f64,
    // Whether the edge opposite u (b->c), v (c->a), w (a->b) is a top or left edge.
    top_left: [bool; 3],
}

impl BarycentricSolver {
    /// `None` when the vertices are collinear (zero determinant) or not finite.
    pub fn new(tri: [Point; 3]) -> Option<Self> {
        let [a, b, c] = tri;
        if tri.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return None;
        }
        let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let winding = crate::mesh::triangulate::signed_area2(a, b, c).signum();
        Some(Self {
            a,
            b,
            c,
            det,
            top_left: [
                is_top_left(b, c, winding),
                is_top_left(c, a, winding),
                is_top_left(a, b, winding),
            ],
        })
    }

    pub fn coords(&self, p: Point) -> Barycentric {
        let (a, b, c) = (self.a, self.b, self.c);
        let u_num = (b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y);
        let v_num = (c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y);
        let w_num = self.det - u_num - v_num;
        Barycentric {
            u: u_num / self.det,
            v: v_num / self.det,
            w: w_num / self.det,
        }
    }

    pub fn contains(&self, bc: &Barycentric, rule: EdgeRule) -> bool {
        match rule {
            EdgeRule::Inclusive => bc.is_inside_inclusive(),
            EdgeRule::TopLeft => [bc.u, bc.v, bc.w]
                .iter()
                .zip(self.top_left)
                .all(|(&k, top_left)| k > 0.0 || (k == 0.0 && top_left)),
        }
    }

    pub fn vertices(&self) -> [Point; 3] {
        [self.a, self.b, self.c]
    }
}

/// Barycentric coordinates of `p` in `(a, b, c)`; `None` for a degenerate triangle.
pub fn barycentric(p: Point, a: Point, b: Point, c: Point) -> Option<Barycentric> {
    BarycentricSolver::new([a, b, c]).map(|s| s.coords(p))
}

// Image space is y-down. With the edge direction normalized to positive winding, a top edge
// runs in +x with dy == 0 and a left edge runs upwards (dy < 0).
fn is_top_left(p0: Point, p1: Point, winding: f64) -> bool {
    let dx = (p1.x - p0.x) * winding;
    let dy = (p1.y - p0.y) * winding;
    (dy == 0.0 && dx > 0.0) || dy < 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/morph/barycentric.rs"]
mod tests;
