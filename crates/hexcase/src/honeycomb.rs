//! Hexagonal cells and the staggered honeycomb lattice.
//!
//! Cells are 6-segment cylinders whose first vertex lies on +X, so every
//! hexagon has its flats facing ±Y and its width across flats measured along
//! Y. With that orientation the honeycomb is two rectangular lattices of
//! pitch `(√3·p, p)`, the second shifted by half a pitch on both axes, where
//! `p = inner_width + wall_thickness` is the center distance of two cells
//! sharing a wall.

use nalgebra::{Vector2, Vector3};
use tracing::debug;

use crate::error::{CaseError, Result};
use crate::{centered_cylinder, Part};

/// Ratio slack when counting how many copies fit along an axis, so that an
/// exact multiple of the spacing is not lost to rounding.
const COUNT_SLACK: f64 = 1e-9;

/// One hollow hexagonal prism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexCellSpec {
    /// Width across flats of the opening.
    pub inner_width: f64,
    /// Thickness of the wall around the opening.
    pub wall_thickness: f64,
    /// Prism height.
    pub height: f64,
}

impl HexCellSpec {
    /// Create a cell spec, rejecting non-positive sizes.
    pub fn new(inner_width: f64, wall_thickness: f64, height: f64) -> Result<Self> {
        let spec = Self {
            inner_width,
            wall_thickness,
            height,
        };
        for (field, value) in [
            ("hex_inner_width", inner_width),
            ("hex_wall_thickness", wall_thickness),
            ("case_size.z", height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CaseError::InvalidDimension {
                    field,
                    value,
                    reason: "must be a positive finite length".into(),
                });
            }
        }
        Ok(spec)
    }

    /// Width across flats of the prism.
    pub fn outer_width(&self) -> f64 {
        self.inner_width + 2.0 * self.wall_thickness
    }
}

/// A honeycomb over a rectangular area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Area to cover; `z` is the cell height.
    pub area: Vector3<f64>,
    /// The repeated cell.
    pub cell: HexCellSpec,
}

impl GridSpec {
    /// Create a grid whose cells are as tall as `area.z`.
    pub fn new(area: Vector3<f64>, inner_width: f64, wall_thickness: f64) -> Result<Self> {
        let cell = HexCellSpec::new(inner_width, wall_thickness, area.z)?;
        let grid = Self { area, cell };
        let (horizontal, vertical) = (grid.horizontal_pitch(), grid.vertical_pitch());
        if !(horizontal > 0.0 && vertical > 0.0) {
            return Err(CaseError::DegenerateTiling {
                horizontal,
                vertical,
            });
        }
        Ok(grid)
    }

    /// Center distance of two cells in the same row of one lattice.
    pub fn horizontal_pitch(&self) -> f64 {
        3f64.sqrt() * (self.cell.inner_width + self.cell.wall_thickness)
    }

    /// Center distance of two cells in the same column of one lattice.
    pub fn vertical_pitch(&self) -> f64 {
        self.cell.inner_width + self.cell.wall_thickness
    }

    /// Number of lattice columns and rows.
    pub fn counts(&self) -> (usize, usize) {
        (
            copies_along(self.area.x, self.horizontal_pitch()),
            copies_along(self.area.y, self.vertical_pitch()),
        )
    }
}

/// Cell centers of both lattices.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeCenters {
    /// Lattice centered on the origin.
    pub primary: Vec<Vector2<f64>>,
    /// Lattice shifted by half a pitch on both axes.
    pub secondary: Vec<Vector2<f64>>,
}

impl LatticeCenters {
    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    /// Whether there are no cells at all.
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }
}

/// Number of copies spread over `length` at `spacing`: as many gaps as fit,
/// plus one.
fn copies_along(length: f64, spacing: f64) -> usize {
    (length / spacing + COUNT_SLACK).floor() as usize + 1
}

/// Coordinates of `count` copies at `spacing`, centered on zero.
fn spread(count: usize, spacing: f64) -> impl Iterator<Item = f64> {
    let half_span = (count as f64 - 1.0) / 2.0;
    (0..count).map(move |i| (i as f64 - half_span) * spacing)
}

/// Build one hollow hexagonal prism centered on the origin.
///
/// The opening is `2·tol` taller than the prism so it cuts through both end
/// faces instead of stopping flush with them.
pub fn hex_cell(cell: &HexCellSpec, tol: f64) -> Part {
    let outer = centered_cylinder(
        "hex_outer",
        across_flats_to_radius(cell.outer_width()),
        cell.height,
        6,
    );
    let hole = centered_cylinder(
        "hex_hole",
        across_flats_to_radius(cell.inner_width),
        cell.height + 2.0 * tol,
        6,
    );
    outer.difference(&hole).with_name("hex_cell")
}

/// Circumscribed radius of a regular hexagon with the given width across flats.
pub fn across_flats_to_radius(width: f64) -> f64 {
    width / 3f64.sqrt()
}

/// Centers of every cell placed by [`tile_honeycomb`].
pub fn lattice_centers(grid: &GridSpec) -> LatticeCenters {
    let (columns, rows) = grid.counts();
    let (dx, dy) = (grid.horizontal_pitch(), grid.vertical_pitch());

    let primary: Vec<Vector2<f64>> = spread(columns, dx)
        .flat_map(|x| spread(rows, dy).map(move |y| Vector2::new(x, y)))
        .collect();
    let shift = Vector2::new(dx / 2.0, dy / 2.0);
    let secondary = primary.iter().map(|c| c + shift).collect();

    LatticeCenters { primary, secondary }
}

/// Tile hex cells over `grid.area`, centered on the origin.
///
/// Copies are spread over the full area and may overhang it by up to one
/// pitch; trimming is left to [`crate::clip_to_footprint`].
pub fn tile_honeycomb(grid: &GridSpec, tol: f64) -> Part {
    let cell = hex_cell(&grid.cell, tol);
    let centers = lattice_centers(grid);
    debug!(
        columns = grid.counts().0,
        rows = grid.counts().1,
        cells = centers.len(),
        horizontal_pitch = grid.horizontal_pitch(),
        vertical_pitch = grid.vertical_pitch(),
        "tiling honeycomb"
    );

    let place = |c: &Vector2<f64>| cell.translate(c.x, c.y, 0.0);
    let primary = Part::union_all("honeycomb_primary", centers.primary.iter().map(place));
    let secondary = Part::union_all("honeycomb_secondary", centers.secondary.iter().map(place));
    primary.union(&secondary).with_name("honeycomb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::{bounds, placements};
    use approx::assert_relative_eq;

    fn reference_grid() -> GridSpec {
        GridSpec::new(Vector3::new(100.0, 75.0, 3.0), 4.0, 1.0).unwrap()
    }

    #[test]
    fn reference_pitches() {
        let grid = reference_grid();
        assert_relative_eq!(grid.horizontal_pitch(), 3f64.sqrt() * 5.0);
        assert_relative_eq!(grid.horizontal_pitch(), 8.660254, epsilon = 1e-6);
        assert_relative_eq!(grid.vertical_pitch(), 5.0);
    }

    #[test]
    fn reference_counts_cover_area() {
        let grid = reference_grid();
        let (columns, rows) = grid.counts();
        assert_eq!((columns, rows), (12, 16));
        assert!(columns * rows >= 11 * 15);
    }

    #[test]
    fn copies_spread_symmetrically() {
        let xs: Vec<f64> = spread(4, 2.0).collect();
        assert_eq!(xs, vec![-3.0, -1.0, 1.0, 3.0]);
        assert_eq!(copies_along(10.0, 5.0), 3);
        assert_eq!(copies_along(9.9, 5.0), 2);
    }

    #[test]
    fn invalid_cell_rejected() {
        let err = HexCellSpec::new(0.0, 1.0, 3.0).unwrap_err();
        assert_eq!(err.field(), Some("hex_inner_width"));
        assert!(GridSpec::new(Vector3::new(10.0, 10.0, 1.0), 2.0, -0.5).is_err());
    }

    #[test]
    fn cell_widths_across_flats() {
        let cell = HexCellSpec::new(4.0, 1.0, 3.0).unwrap();
        let part = hex_cell(&cell, 0.01);

        let outer = bounds(&part).unwrap();
        assert_relative_eq!(outer.size().y, 6.0, epsilon = 1e-9);
        assert_relative_eq!(outer.size().x, 12.0 / 3f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(outer.size().z, 3.0, epsilon = 1e-9);
        assert_relative_eq!(outer.center().norm(), 0.0, epsilon = 1e-9);

        let hole = placements(&part)
            .into_iter()
            .find(|p| p.subtractive)
            .unwrap();
        let hole_box = hole.placed_bounds();
        assert_relative_eq!(hole_box.size().y, 4.0, epsilon = 1e-9);
        // Hole bites through both end faces.
        assert_relative_eq!(hole_box.min.z, -1.51, epsilon = 1e-9);
        assert_relative_eq!(hole_box.max.z, 1.51, epsilon = 1e-9);
    }

    #[test]
    fn lattices_interleave_by_half_pitch() {
        let grid = reference_grid();
        let centers = lattice_centers(&grid);
        let (dx, dy) = (grid.horizontal_pitch(), grid.vertical_pitch());
        assert_eq!(centers.primary.len(), centers.secondary.len());

        for (a, b) in centers.primary.iter().zip(&centers.secondary) {
            assert_relative_eq!(b.x - a.x, dx / 2.0, epsilon = 1e-9);
            assert_relative_eq!(b.y - a.y, dy / 2.0, epsilon = 1e-9);
        }

        // Column-major order: consecutive entries are vertical neighbours
        // until the column wraps.
        let rows = grid.counts().1;
        let first_column = &centers.primary[..rows];
        for pair in first_column.windows(2) {
            assert_relative_eq!(pair[1].y - pair[0].y, dy, epsilon = 1e-9);
            assert_relative_eq!(pair[1].x, pair[0].x, epsilon = 1e-9);
        }
        let next_column = centers.primary[rows];
        assert_relative_eq!(next_column.x - centers.primary[0].x, dx, epsilon = 1e-9);
    }

    #[test]
    fn primary_lattice_centered_on_origin() {
        let centers = lattice_centers(&reference_grid());
        let sum = centers
            .primary
            .iter()
            .fold(Vector2::<f64>::zeros(), |acc, c| acc + c);
        assert_relative_eq!(sum.norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn tiled_part_places_every_cell() {
        let grid = reference_grid();
        let part = tile_honeycomb(&grid, 0.01);
        let prisms = placements(&part);
        let outer = prisms.iter().filter(|p| !p.subtractive).count();
        let holes = prisms.iter().filter(|p| p.subtractive).count();
        assert_eq!(outer, 2 * 12 * 16);
        assert_eq!(holes, outer);
    }

    #[test]
    fn tiling_may_overhang_area() {
        let grid = reference_grid();
        let extent = bounds(&tile_honeycomb(&grid, 0.01)).unwrap();
        assert!(extent.max.x > grid.area.x / 2.0);
        assert!(extent.max.x < grid.area.x / 2.0 + grid.horizontal_pitch() + 6.0);
    }
}
