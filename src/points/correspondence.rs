//! Correspondence points: matched feature locations on the source and target images.
//!
//! The table is edited row by row (a source click opens a pending row, a target click
//! completes it), then frozen into [`MorphPoints`] before triangulation.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{MorphError, MorphResult};

/// One row of the correspondence table. Either side may still be missing while editing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrespondencePoint {
    #[serde(default)]
    pub source: Option<Point>,
    #[serde(default)]
    pub target: Option<Point>,
}

impl CorrespondencePoint {
    pub fn new(source: Point, target: Point) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
        }
    }

    pub fn pending(source: Point) -> Self {
        Self {
            source: Some(source),
            target: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        usable(self.source).is_some() && usable(self.target).is_some()
    }
}

fn usable(p: Option<Point>) -> Option<Point> {
    p.filter(|p| p.x.is_finite() && p.y.is_finite())
}

/// Append-only (plus whole-row removal) correspondence table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrespondenceSet {
    pairs: Vec<CorrespondencePoint>,
}

impl CorrespondenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<CorrespondencePoint>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[CorrespondencePoint] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn push_pair(&mut self, source: Point, target: Point) -> usize {
        self.pairs.push(CorrespondencePoint::new(source, target));
        self.pairs.len() - 1
    }

    /// Open a row with only its source point; complete it with [`Self::complete_target`].
    pub fn push_source(&mut self, source: Point) -> usize {
        self.pairs.push(CorrespondencePoint::pending(source));
        self.pairs.len() - 1
    }

    /// Fill the first row that still lacks a target point.
    pub fn complete_target(&mut self, target: Point) -> MorphResult<usize> {
        let idx = self
            .pairs
            .iter()
            .position(|p| p.target.is_none())
            .ok_or_else(|| {
                MorphError::validation(
                    "no pending correspondence: select the source point before its target",
                )
            })?;
        self.pairs[idx].target = Some(target);
        Ok(idx)
    }

    pub fn pending_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.target.is_none()).count()
    }

    pub fn remove(&mut self, index: usize) -> Option<CorrespondencePoint> {
        (index < self.pairs.len()).then(|| self.pairs.remove(index))
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Append the four canvas corners as fixed pairs unless a row with that exact source
    /// position exists. Returns how many rows were added.
    pub fn ensure_corners(&mut self, canvas: Canvas) -> usize {
        let mut added = 0;
        for corner in canvas.corners() {
            if !self.pairs.iter().any(|p| p.source == Some(corner)) {
                self.pairs.push(CorrespondencePoint::new(corner, corner));
                added += 1;
            }
        }
        added
    }

    /// Every usable source point, in row order.
    pub fn source_points(&self) -> Vec<Point> {
        self.pairs.iter().filter_map(|p| usable(p.source)).collect()
    }

    /// Every usable target point, in row order.
    pub fn target_points(&self) -> Vec<Point> {
        self.pairs.iter().filter_map(|p| usable(p.target)).collect()
    }

    /// Rows where exactly one member is usable.
    pub fn half_filled_count(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| usable(p.source).is_some() != usable(p.target).is_some())
            .count()
    }

    /// Validate and snapshot the table for rendering.
    ///
    /// A row with only one usable member is never paired with another row's point: any such
    /// row fails the freeze with [`MorphError::MismatchedCorrespondence`].
    pub fn freeze(&self) -> MorphResult<MorphPoints> {
        let source = self.source_points();
        let target = self.target_points();
        if source.len() >= 3 && self.half_filled_count() > 0 {
            return Err(MorphError::MismatchedCorrespondence {
                source_count: source.len(),
                target_count: target.len(),
            });
        }
        MorphPoints::new(source, target)
    }
}

/// Validated, immutable source/target point sequences of equal length (at least 3).
#[derive(Clone, Debug, PartialEq)]
pub struct MorphPoints {
    source: Vec<Point>,
    target: Vec<Point>,
}

impl MorphPoints {
    pub fn new(source: Vec<Point>, target: Vec<Point>) -> MorphResult<Self> {
        if source.len() < 3 {
            return Err(MorphError::InsufficientPoints {
                found: source.len(),
            });
        }
        if source.len() != target.len() {
            return Err(MorphError::MismatchedCorrespondence {
                source_count: source.len(),
                target_count: target.len(),
            });
        }
        if let Some(p) = source
            .iter()
            .chain(target.iter())
            .find(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(MorphError::validation(format!(
                "correspondence point ({}, {}) is not finite",
                p.x, p.y
            )));
        }
        Ok(Self { source, target })
    }

    pub fn source(&self) -> &[Point] {
        &self.source
    }

    pub fn target(&self) -> &[Point] {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/points/correspondence.rs"]
mod tests;
