//! Four-corner cylinder arrays: pillars, pegs, peg holes and standoffs.

use nalgebra::{Vector2, Vector3};

use crate::Part;

/// Four cylinders on the corners of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerLayout {
    /// Rectangle whose corners carry the cylinders.
    pub rectangle: Vector2<f64>,
    /// Displacement of the rectangle; `z` is the base height of every
    /// cylinder.
    pub offset: Vector3<f64>,
    /// Cylinder radius.
    pub radius: f64,
    /// Cylinder height.
    pub height: f64,
    /// Segments per full turn.
    pub segments: u32,
}

impl CornerLayout {
    /// Layout centered on the origin with bases on z = 0.
    pub fn centered(rectangle: Vector2<f64>, radius: f64, height: f64, segments: u32) -> Self {
        Self {
            rectangle,
            offset: Vector3::zeros(),
            radius,
            height,
            segments,
        }
    }

    /// Same layout moved by `offset`.
    pub fn offset_by(mut self, offset: Vector3<f64>) -> Self {
        self.offset += offset;
        self
    }

    /// Corner points in the order (−,−), (+,−), (−,+), (+,+).
    pub fn corners(&self) -> [Vector2<f64>; 4] {
        let half = self.rectangle / 2.0;
        let center = self.offset.xy();
        [
            center + Vector2::new(-half.x, -half.y),
            center + Vector2::new(half.x, -half.y),
            center + Vector2::new(-half.x, half.y),
            center + Vector2::new(half.x, half.y),
        ]
    }
}

/// Union of the four corner cylinders of `layout`.
pub fn corner_pillars(name: &str, layout: &CornerLayout) -> Part {
    let post = Part::cylinder(name, layout.radius, layout.height, layout.segments);
    Part::union_all(
        name,
        layout
            .corners()
            .iter()
            .map(|c| post.translate(c.x, c.y, layout.offset.z)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::placements;
    use approx::assert_relative_eq;

    #[test]
    fn four_congruent_cylinders_on_the_corners() {
        let layout = CornerLayout::centered(Vector2::new(88.0, 63.0), 3.0, 10.0, 64)
            .offset_by(Vector3::new(1.0, -2.0, 0.5));
        let part = corner_pillars("pillar", &layout);

        let list = placements(&part);
        assert_eq!(list.len(), 4);
        for placement in &list {
            assert!(!placement.subtractive);
            assert_eq!(placement.cylinder(), Some((3.0, 10.0, 64)));
            assert_relative_eq!(placement.offset.z, 0.5);
        }

        let mut xs: Vec<f64> = list.iter().map(|p| p.offset.x).collect();
        let mut ys: Vec<f64> = list.iter().map(|p| p.offset.y).collect();
        xs.sort_by(f64::total_cmp);
        ys.sort_by(f64::total_cmp);
        assert_relative_eq!(xs[0], -43.0);
        assert_relative_eq!(xs[3], 45.0);
        assert_relative_eq!(ys[0], -33.5);
        assert_relative_eq!(ys[3], 29.5);
    }

    #[test]
    fn corners_are_symmetric_without_offset() {
        let layout = CornerLayout::centered(Vector2::new(58.0, 49.0), 1.0, 1.0, 16);
        let corners = layout.corners();
        let sum = corners
            .iter()
            .fold(Vector2::<f64>::zeros(), |acc, c| acc + c);
        assert_relative_eq!(sum.norm(), 0.0);
        assert_relative_eq!(corners[3].x, 29.0);
        assert_relative_eq!(corners[3].y, 24.5);
    }
}
