use crate::foundation::core::Point;
use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::lerp;

/// Reject morph parameters outside `[0, 1]` (NaN included).
pub fn validate_t(t: f64) -> MorphResult<()> {
    if !(0.0..=1.0).contains(&t) {
        return Err(MorphError::invalid_parameter(format!(
            "morph parameter t must be within [0, 1], got {t}"
        )));
    }
    Ok(())
}

/// `(1 - t) * a + t * b` per axis.
pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Intermediate vertex positions for morph parameter `t`.
///
/// `t == 0` returns `source` exactly and `t == 1` returns `target` exactly.
pub fn interpolate_points(source: &[Point], target: &[Point], t: f64) -> MorphResult<Vec<Point>> {
    validate_t(t)?;
    if source.len() != target.len() {
        return Err(MorphError::MismatchedCorrespondence {
            source_count: source.len(),
            target_count: target.len(),
        });
    }
    Ok(source
        .iter()
        .zip(target)
        .map(|(&s, &g)| lerp_point(s, g, t))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/morph/interpolate.rs"]
mod tests;
