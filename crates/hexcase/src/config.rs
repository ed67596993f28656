//! Case configuration: one immutable parameter set per generation run.
//!
//! Field names match the TOML keys. Missing keys take their default value;
//! unknown keys are rejected so that a typo never silently falls back.

use std::path::Path;

use hexcase_ir::Vec3;
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::assembly::CaseVariant;
use crate::error::{CaseError, Result};

/// Planar extent or offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Extent2 {
    /// Create a new Extent2.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// As an nalgebra vector.
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// Parameters of one case half, all lengths in millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaseConfig {
    /// Outer size of the vented panel.
    pub case_size: Vec3,
    /// Width across flats of each honeycomb opening.
    pub hex_inner_width: f64,
    /// Wall thickness between neighbouring openings.
    pub hex_wall_thickness: f64,
    /// Radius of the corner pillars.
    pub pillar_radius: f64,
    /// Height of the corner pillars above the panel base.
    pub pillar_height: f64,
    /// Radius of the pegs on top of the pillars.
    pub peg_radius: f64,
    /// Height of the pegs.
    pub peg_height: f64,
    /// Extra depth of a peg hole over its peg.
    pub clearance_height: f64,
    /// Extra radius of a peg hole over its peg.
    pub clearance_radius: f64,
    /// Rectangle the standoff posts sit on the corners of.
    pub standoff_size: Extent2,
    /// Radius of a standoff base.
    pub standoff_base_radius: f64,
    /// Height of a standoff base above the panel top.
    pub standoff_base_height: f64,
    /// Radius of the peg on top of a standoff.
    pub standoff_peg_radius: f64,
    /// Height of the peg on top of a standoff.
    pub standoff_peg_height: f64,
    /// Displacement of the standoff rectangle from the case center.
    pub standoff_offset: Extent2,
    /// Generate the top half.
    pub is_top: bool,
    /// Generate the bottom half.
    pub is_bottom: bool,
    /// Segments per full turn of every curved surface.
    pub tessellation_resolution: u32,
    /// Bias applied to every flush boolean cut.
    pub epsilon_tolerance: f64,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            case_size: Vec3::new(100.0, 75.0, 3.0),
            hex_inner_width: 4.0,
            hex_wall_thickness: 1.0,
            pillar_radius: 3.0,
            pillar_height: 10.0,
            peg_radius: 1.5,
            peg_height: 3.0,
            clearance_height: 0.2,
            clearance_radius: 0.1,
            standoff_size: Extent2::new(58.0, 49.0),
            standoff_base_radius: 3.0,
            standoff_base_height: 2.0,
            standoff_peg_radius: 1.25,
            standoff_peg_height: 3.0,
            standoff_offset: Extent2::new(0.0, 0.0),
            is_top: false,
            is_bottom: true,
            tessellation_resolution: 64,
            epsilon_tolerance: 0.01,
        }
    }
}

impl CaseConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Case size as a vector.
    pub fn case_size(&self) -> Vector3<f64> {
        Vector3::new(self.case_size.x, self.case_size.y, self.case_size.z)
    }

    /// Inset of the mesh window from the outer edge, summed over both sides.
    ///
    /// Pillars sit inside this margin, two pillar diameters from the edge.
    pub fn edge_padding(&self) -> f64 {
        4.0 * self.pillar_radius
    }

    /// Rectangle whose corners carry the pillars.
    pub fn pillar_footprint(&self) -> Vector2<f64> {
        let padding = self.edge_padding();
        Vector2::new(self.case_size.x - padding, self.case_size.y - padding)
    }

    /// Radius of the void a peg drops into.
    pub fn peg_hole_radius(&self) -> f64 {
        self.peg_radius + self.clearance_radius
    }

    /// Depth of the void a peg drops into, including the flush-cut bias.
    pub fn peg_hole_depth(&self) -> f64 {
        self.peg_height + self.clearance_height + self.epsilon_tolerance
    }

    /// Height of a standoff base measured from the panel bottom.
    pub fn standoff_base_total_height(&self) -> f64 {
        self.standoff_base_height + self.case_size.z
    }

    /// Validate every dimension and resolve the case variant from the flags.
    pub fn validate(&self) -> Result<CaseVariant> {
        self.validate_dimensions()?;
        CaseVariant::from_flags(self.is_top, self.is_bottom)
    }

    /// Validate every dimension, ignoring the variant flags.
    pub fn validate_dimensions(&self) -> Result<()> {
        positive("case_size.x", self.case_size.x)?;
        positive("case_size.y", self.case_size.y)?;
        positive("case_size.z", self.case_size.z)?;
        positive("hex_inner_width", self.hex_inner_width)?;
        positive("hex_wall_thickness", self.hex_wall_thickness)?;
        positive("pillar_radius", self.pillar_radius)?;
        positive("pillar_height", self.pillar_height)?;
        positive("peg_radius", self.peg_radius)?;
        positive("peg_height", self.peg_height)?;
        positive("clearance_height", self.clearance_height)?;
        positive("clearance_radius", self.clearance_radius)?;
        positive("standoff_size.x", self.standoff_size.x)?;
        positive("standoff_size.y", self.standoff_size.y)?;
        positive("standoff_base_radius", self.standoff_base_radius)?;
        positive("standoff_base_height", self.standoff_base_height)?;
        positive("standoff_peg_radius", self.standoff_peg_radius)?;
        positive("standoff_peg_height", self.standoff_peg_height)?;
        positive("epsilon_tolerance", self.epsilon_tolerance)?;
        finite("standoff_offset.x", self.standoff_offset.x)?;
        finite("standoff_offset.y", self.standoff_offset.y)?;

        if self.tessellation_resolution < 3 {
            return Err(CaseError::InvalidResolution(self.tessellation_resolution));
        }

        let window = self.pillar_footprint();
        if window.x <= 0.0 || window.y <= 0.0 {
            return Err(CaseError::InvalidDimension {
                field: "pillar_radius",
                value: self.pillar_radius,
                reason: format!(
                    "pillars inset by {} leave no room inside a {} x {} case",
                    self.edge_padding(),
                    self.case_size.x,
                    self.case_size.y
                ),
            });
        }

        if self.peg_hole_radius() >= self.pillar_radius {
            return Err(CaseError::InvalidDimension {
                field: "peg_radius",
                value: self.peg_radius,
                reason: format!(
                    "peg hole radius {} must be smaller than pillar radius {}",
                    self.peg_hole_radius(),
                    self.pillar_radius
                ),
            });
        }

        let hex_outer = self.hex_inner_width + 2.0 * self.hex_wall_thickness;
        if hex_outer >= window.x.min(window.y) {
            return Err(CaseError::InvalidDimension {
                field: "hex_inner_width",
                value: self.hex_inner_width,
                reason: format!(
                    "hex cell outer width {hex_outer} does not fit the {} x {} mesh window",
                    window.x, window.y
                ),
            });
        }

        if self.standoff_peg_radius > self.standoff_base_radius {
            return Err(CaseError::InvalidDimension {
                field: "standoff_peg_radius",
                value: self.standoff_peg_radius,
                reason: format!(
                    "standoff peg overhangs its base of radius {}",
                    self.standoff_base_radius
                ),
            });
        }

        let reach_x =
            self.standoff_size.x / 2.0 + self.standoff_offset.x.abs() + self.standoff_base_radius;
        let reach_y =
            self.standoff_size.y / 2.0 + self.standoff_offset.y.abs() + self.standoff_base_radius;
        if reach_x > window.x / 2.0 {
            return Err(CaseError::InvalidDimension {
                field: "standoff_size.x",
                value: self.standoff_size.x,
                reason: format!(
                    "standoffs reach x = {reach_x}, beyond the mesh window half-width {}",
                    window.x / 2.0
                ),
            });
        }
        if reach_y > window.y / 2.0 {
            return Err(CaseError::InvalidDimension {
                field: "standoff_size.y",
                value: self.standoff_size.y,
                reason: format!(
                    "standoffs reach y = {reach_y}, beyond the mesh window half-height {}",
                    window.y / 2.0
                ),
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CaseError::InvalidDimension {
            field,
            value,
            reason: "must be a positive finite length".into(),
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CaseError::InvalidDimension {
            field,
            value,
            reason: "must be finite".into(),
        })
    }
}
