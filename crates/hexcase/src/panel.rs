//! The ventilated base panel: rounded shell with a honeycomb-filled window.

use nalgebra::Vector3;
use tracing::debug;

use crate::clip::clip_to_footprint;
use crate::error::Result;
use crate::honeycomb::{tile_honeycomb, GridSpec};
use crate::{centered_cube, Part};

/// Parameters of a vented panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    /// Outer size of the panel.
    pub size: Vector3<f64>,
    /// Width across flats of each opening.
    pub hex_inner_width: f64,
    /// Wall between neighbouring openings.
    pub hex_wall_thickness: f64,
    /// Total inset of the window from the outer edge (both sides summed).
    pub padding: f64,
    /// Radius of the rounded vertical edges.
    pub corner_rounding: f64,
    /// Segments per full turn for the rounded edges.
    pub segments: u32,
}

impl PanelSpec {
    /// Region the honeycomb is clipped to.
    ///
    /// Taller than the panel by `tol` on both faces so the openings cut
    /// fully through.
    pub fn mesh_area(&self, tol: f64) -> Vector3<f64> {
        Vector3::new(
            self.size.x - self.padding,
            self.size.y - self.padding,
            self.size.z + 2.0 * tol,
        )
    }
}

/// Build the vented panel, base on z = 0 and top on z = `size.z`.
pub fn vented_panel(spec: &PanelSpec, tol: f64) -> Result<Part> {
    let size = spec.size;
    let mesh_area = spec.mesh_area(tol);
    let grid = GridSpec::new(size, spec.hex_inner_width, spec.hex_wall_thickness)?;

    let outer = Part::rounded_cube(
        "shell",
        size.x,
        size.y,
        size.z,
        spec.corner_rounding,
        spec.segments,
    )
    .translate(-size.x / 2.0, -size.y / 2.0, -size.z / 2.0);
    let window = centered_cube("window", mesh_area.x, mesh_area.y, mesh_area.z);
    let shell = outer.difference(&window);

    let mesh = clip_to_footprint(&tile_honeycomb(&grid, tol), mesh_area);
    debug!(
        window_x = mesh_area.x,
        window_y = mesh_area.y,
        "built vented panel"
    );

    Ok(shell
        .union(&mesh)
        .translate(0.0, 0.0, size.z / 2.0)
        .with_name("vented_panel"))
}
