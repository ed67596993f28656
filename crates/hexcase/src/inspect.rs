//! Analytic inspection of a built [`Part`].
//!
//! These queries read the CSG tree directly instead of a mesh: they list the
//! placed primitives, bound the material with an axis-aligned box, and
//! classify single points against the ideal (exact) primitives. Rounded edges
//! are treated as true arcs and polygonal cylinders as their polygons.

use std::f64::consts::PI;

use hexcase_ir::{CsgOp, NodeId};
use nalgebra::Vector3;

use crate::Part;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vector3<f64>,
    /// Maximum corner.
    pub max: Vector3<f64>,
}

impl Aabb {
    /// Box spanning two corners.
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self { min, max }
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Center point.
    pub fn center(&self) -> Vector3<f64> {
        (self.min + self.max) / 2.0
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Overlap of both boxes, if any.
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.sup(&other.min);
        let max = self.max.inf(&other.max);
        (min.x <= max.x && min.y <= max.y && min.z <= max.z).then_some(Aabb::new(min, max))
    }

    /// Whether `other` lies inside this box, allowing `tol` of overhang.
    pub fn contains_box(&self, other: &Aabb, tol: f64) -> bool {
        (0..3).all(|i| other.min[i] >= self.min[i] - tol && other.max[i] <= self.max[i] + tol)
    }

    fn translated(&self, offset: &Vector3<f64>) -> Aabb {
        Aabb::new(self.min + offset, self.max + offset)
    }
}

/// A primitive leaf together with where the tree puts it.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Name of the primitive node.
    pub name: Option<String>,
    /// The primitive operation.
    pub op: CsgOp,
    /// Accumulated translation.
    pub offset: Vector3<f64>,
    /// Whether the primitive ends up on the removing side of an odd number
    /// of differences.
    pub subtractive: bool,
}

impl Placement {
    /// Bounding box of the placed primitive.
    pub fn placed_bounds(&self) -> Aabb {
        primitive_bounds(&self.op)
            .map(|b| b.translated(&self.offset))
            .unwrap_or_else(|| Aabb::new(self.offset, self.offset))
    }

    /// Radius and height when the primitive is a cylinder.
    pub fn cylinder(&self) -> Option<(f64, f64, u32)> {
        match self.op {
            CsgOp::Cylinder {
                radius,
                height,
                segments,
            } => Some((radius, height, segments)),
            _ => None,
        }
    }
}

/// Per-kind primitive counts of a part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimitiveCounts {
    /// Plain boxes.
    pub cubes: usize,
    /// Boxes with rounded vertical edges.
    pub rounded_cubes: usize,
    /// Round cylinders (more than six segments).
    pub cylinders: usize,
    /// Hexagonal prisms (six-segment cylinders).
    pub hex_prisms: usize,
    /// Primitives placed on the removing side of a difference.
    pub subtractive: usize,
}

impl PrimitiveCounts {
    /// Count the primitives of `part`.
    pub fn of(part: &Part) -> Self {
        let mut counts = Self::default();
        for placement in placements(part) {
            match placement.op {
                CsgOp::Cube { .. } => counts.cubes += 1,
                CsgOp::RoundedCube { .. } => counts.rounded_cubes += 1,
                CsgOp::Cylinder { segments: 6, .. } => counts.hex_prisms += 1,
                CsgOp::Cylinder { .. } => counts.cylinders += 1,
                _ => continue,
            }
            if placement.subtractive {
                counts.subtractive += 1;
            }
        }
        counts
    }

    /// Total number of primitives.
    pub fn total(&self) -> usize {
        self.cubes + self.rounded_cubes + self.cylinders + self.hex_prisms
    }
}

/// Every non-empty primitive leaf of `part`, in tree order.
pub fn placements(part: &Part) -> Vec<Placement> {
    let mut out = Vec::new();
    collect_placements(part, part.node_id(), Vector3::zeros(), false, &mut out);
    out
}

fn collect_placements(
    part: &Part,
    id: NodeId,
    offset: Vector3<f64>,
    subtractive: bool,
    out: &mut Vec<Placement>,
) {
    let Some(node) = part.node(id) else {
        return;
    };
    match &node.op {
        CsgOp::Empty => {}
        CsgOp::Cube { .. } | CsgOp::RoundedCube { .. } | CsgOp::Cylinder { .. } => {
            out.push(Placement {
                name: node.name.clone(),
                op: node.op.clone(),
                offset,
                subtractive,
            });
        }
        CsgOp::Translate { child, offset: t } => {
            let t = Vector3::new(t.x, t.y, t.z);
            collect_placements(part, *child, offset + t, subtractive, out);
        }
        CsgOp::Union { left, right } | CsgOp::Intersection { left, right } => {
            collect_placements(part, *left, offset, subtractive, out);
            collect_placements(part, *right, offset, subtractive, out);
        }
        CsgOp::Difference { left, right } => {
            collect_placements(part, *left, offset, subtractive, out);
            collect_placements(part, *right, offset, !subtractive, out);
        }
    }
}

/// Conservative bounding box of the material of `part`.
///
/// A difference is bounded by its base, except that a cut by a frame
/// `a - b` whose outer box `a` covers the base leaves at most the base
/// within `b`. Other cuts can leave the box larger than the material.
/// `None` for empty geometry.
pub fn bounds(part: &Part) -> Option<Aabb> {
    node_bounds(part, part.node_id())
}

fn node_bounds(part: &Part, id: NodeId) -> Option<Aabb> {
    let node = part.node(id)?;
    match &node.op {
        CsgOp::Empty => None,
        CsgOp::Cube { .. } | CsgOp::RoundedCube { .. } | CsgOp::Cylinder { .. } => {
            primitive_bounds(&node.op)
        }
        CsgOp::Translate { child, offset } => {
            let offset = Vector3::new(offset.x, offset.y, offset.z);
            node_bounds(part, *child).map(|b| b.translated(&offset))
        }
        CsgOp::Union { left, right } => {
            let a = node_bounds(part, *left);
            let b = node_bounds(part, *right);
            match (a, b) {
                (Some(a), Some(b)) => Some(a.union(&b)),
                (a, b) => a.or(b),
            }
        }
        CsgOp::Difference { left, right } => {
            let base = node_bounds(part, *left)?;
            match frame_opening(part, *right, &base) {
                Some(opening) => base.intersection(&opening),
                None => Some(base),
            }
        }
        CsgOp::Intersection { left, right } => {
            let a = node_bounds(part, *left)?;
            let b = node_bounds(part, *right)?;
            a.intersection(&b)
        }
    }
}

/// Bounds of the opening of a frame cut `a - b` when `a` covers `base`.
fn frame_opening(part: &Part, id: NodeId, base: &Aabb) -> Option<Aabb> {
    let CsgOp::Difference { left, right } = &part.node(id)?.op else {
        return None;
    };
    let outer = node_bounds(part, *left)?;
    if !outer.contains_box(base, 1e-9) {
        return None;
    }
    node_bounds(part, *right)
}

fn primitive_bounds(op: &CsgOp) -> Option<Aabb> {
    match op {
        CsgOp::Cube { size } | CsgOp::RoundedCube { size, .. } => Some(Aabb::new(
            Vector3::zeros(),
            Vector3::new(size.x, size.y, size.z),
        )),
        CsgOp::Cylinder {
            radius,
            height,
            segments,
        } => {
            let mut lo = Vector3::new(f64::MAX, f64::MAX, 0.0);
            let mut hi = Vector3::new(f64::MIN, f64::MIN, *height);
            for (x, y) in polygon_vertices(*radius, *segments) {
                lo.x = lo.x.min(x);
                lo.y = lo.y.min(y);
                hi.x = hi.x.max(x);
                hi.y = hi.y.max(y);
            }
            Some(Aabb::new(lo, hi))
        }
        _ => None,
    }
}

/// Vertices of a regular polygon with its first vertex on +X.
fn polygon_vertices(radius: f64, segments: u32) -> impl Iterator<Item = (f64, f64)> {
    let n = segments.max(3);
    (0..n).map(move |k| {
        let angle = 2.0 * PI * f64::from(k) / f64::from(n);
        (radius * angle.cos(), radius * angle.sin())
    })
}

/// Whether `point` lies in the material of `part` (boundary included).
pub fn contains(part: &Part, point: Vector3<f64>) -> bool {
    node_contains(part, part.node_id(), point)
}

fn node_contains(part: &Part, id: NodeId, p: Vector3<f64>) -> bool {
    let Some(node) = part.node(id) else {
        return false;
    };
    match &node.op {
        CsgOp::Empty => false,
        CsgOp::Cube { size } => inside_box(&p, size.x, size.y, size.z),
        CsgOp::RoundedCube {
            size, radius: r, ..
        } => {
            if !inside_box(&p, size.x, size.y, size.z) {
                return false;
            }
            let r = r.min(size.x / 2.0).min(size.y / 2.0);
            let cx = p.x.clamp(r, size.x - r);
            let cy = p.y.clamp(r, size.y - r);
            (p.x - cx).hypot(p.y - cy) <= r
        }
        CsgOp::Cylinder {
            radius,
            height,
            segments,
        } => {
            if p.z < 0.0 || p.z > *height {
                return false;
            }
            let n = f64::from((*segments).max(3));
            let apothem = radius * (PI / n).cos();
            (0..(*segments).max(3)).all(|k| {
                let normal = PI * (2.0 * f64::from(k) + 1.0) / n;
                p.x * normal.cos() + p.y * normal.sin() <= apothem + 1e-12
            })
        }
        CsgOp::Translate { child, offset } => {
            node_contains(part, *child, p - Vector3::new(offset.x, offset.y, offset.z))
        }
        CsgOp::Union { left, right } => {
            node_contains(part, *left, p) || node_contains(part, *right, p)
        }
        CsgOp::Difference { left, right } => {
            node_contains(part, *left, p) && !node_contains(part, *right, p)
        }
        CsgOp::Intersection { left, right } => {
            node_contains(part, *left, p) && node_contains(part, *right, p)
        }
    }
}

fn inside_box(p: &Vector3<f64>, x: f64, y: f64, z: f64) -> bool {
    (0.0..=x).contains(&p.x) && (0.0..=y).contains(&p.y) && (0.0..=z).contains(&p.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{centered_cube, centered_cylinder};
    use approx::assert_relative_eq;

    #[test]
    fn hexagon_bounds_follow_orientation() {
        // Across flats of 6 along Y, across corners along X.
        let hex = Part::cylinder("hex", 6.0 / 3f64.sqrt(), 2.0, 6);
        let b = bounds(&hex).unwrap();
        assert_relative_eq!(b.size().y, 6.0, epsilon = 1e-9);
        assert_relative_eq!(b.size().x, 12.0 / 3f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn hexagon_membership() {
        let hex = Part::cylinder("hex", 2.0, 1.0, 6);
        assert!(contains(&hex, Vector3::new(1.9, 0.0, 0.5)));
        assert!(!contains(&hex, Vector3::new(0.0, 1.9, 0.5)));
        assert!(contains(&hex, Vector3::new(0.0, 1.7, 0.5)));
        assert!(!contains(&hex, Vector3::new(0.0, 0.0, 1.5)));
    }

    #[test]
    fn rounded_corner_membership() {
        let plate = Part::rounded_cube("plate", 10.0, 10.0, 1.0, 2.0, 32);
        assert!(contains(&plate, Vector3::new(5.0, 5.0, 0.5)));
        assert!(!contains(&plate, Vector3::new(0.1, 0.1, 0.5)));
        assert!(contains(&plate, Vector3::new(2.0, 0.1, 0.5)));
    }

    #[test]
    fn frame_cut_bounds_shrink_to_opening() {
        let slab = centered_cube("slab", 10.0, 10.0, 1.0);
        let inner = centered_cube("inner", 6.0, 8.0, 2.0);
        let frame = centered_cube("outer", 20.0, 20.0, 4.0) - inner.clone();
        let b = bounds(&(&slab - &frame)).unwrap();
        assert_relative_eq!(b.size().x, 6.0);
        assert_relative_eq!(b.size().y, 8.0);
        assert_relative_eq!(b.size().z, 1.0);

        // A frame that does not cover the base falls back to the base.
        let narrow = centered_cube("outer", 8.0, 20.0, 4.0) - inner;
        assert_relative_eq!(bounds(&(&slab - &narrow)).unwrap().size().x, 10.0);
    }

    #[test]
    fn difference_bounds_use_base() {
        let part = centered_cube("block", 4.0, 4.0, 4.0) - centered_cube("bite", 10.0, 1.0, 10.0);
        let b = bounds(&part).unwrap();
        assert_relative_eq!(b.size().x, 4.0);
        assert!(!contains(&part, Vector3::new(0.0, 0.0, 0.0)));
        assert!(contains(&part, Vector3::new(0.0, 1.5, 0.0)));
    }

    #[test]
    fn intersection_bounds_overlap() {
        let a = centered_cube("a", 4.0, 4.0, 4.0);
        let b = centered_cube("b", 4.0, 4.0, 4.0).translate(3.0, 0.0, 0.0);
        let overlap = bounds(&(&a & &b)).unwrap();
        assert_relative_eq!(overlap.min.x, 1.0);
        assert_relative_eq!(overlap.max.x, 2.0);

        let far = centered_cube("far", 1.0, 1.0, 1.0).translate(10.0, 0.0, 0.0);
        assert!(bounds(&(&a & &far)).is_none());
    }

    #[test]
    fn placements_track_transforms_and_cuts() {
        let part = centered_cube("block", 2.0, 2.0, 2.0)
            .difference(&centered_cylinder("bore", 0.5, 3.0, 16).translate(1.0, 0.0, 0.0))
            .translate(1.0, 0.0, 0.0);
        let list = placements(&part);
        assert_eq!(list.len(), 2);

        let bore = list.iter().find(|p| p.subtractive).unwrap();
        assert_eq!(bore.name.as_deref(), Some("bore"));
        let placed = bore.placed_bounds();
        assert_relative_eq!(placed.center().x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(placed.size().z, 3.0, epsilon = 1e-9);

        let counts = PrimitiveCounts::of(&part);
        assert_eq!(counts.cubes, 1);
        assert_eq!(counts.cylinders, 1);
        assert_eq!(counts.subtractive, 1);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn empty_has_no_bounds() {
        assert!(bounds(&Part::empty("void")).is_none());
        assert!(placements(&Part::empty("void")).is_empty());
    }
}
