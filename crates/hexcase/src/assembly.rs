//! Assembly of a complete case half.
//!
//! The order of operations is fixed:
//!
//! 1. vented panel, plus corner pillars unless this is the top half;
//! 2. every void (peg holes, standoff through-holes) collected into one cut;
//! 3. body = step 1 minus step 2;
//! 4. pegs, standoff bases and standoff pegs collected into one addition;
//! 5. result = body plus step 4.
//!
//! A standoff through-hole is `tol` wider than its base, so each base is
//! put back into a clean cylindrical pocket of the honeycomb.

use nalgebra::{Vector2, Vector3};
use tracing::{debug, info};

use crate::config::CaseConfig;
use crate::error::{CaseError, Result};
use crate::panel::{vented_panel, PanelSpec};
use crate::pillars::{corner_pillars, CornerLayout};
use crate::Part;

/// Which half of the enclosure to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseVariant {
    /// Lid: panel with peg holes, no pillars or standoffs.
    Top,
    /// Base: panel with pillars, pegs and standoffs.
    Bottom,
    /// Every feature of both halves on one panel, for previewing fit.
    Combined,
}

impl CaseVariant {
    /// Resolve the variant from the two configuration flags.
    ///
    /// Exactly one flag must be set. `Combined` is never inferred; request
    /// it explicitly through [`assemble_variant`].
    pub fn from_flags(is_top: bool, is_bottom: bool) -> Result<Self> {
        match (is_top, is_bottom) {
            (true, false) => Ok(CaseVariant::Top),
            (false, true) => Ok(CaseVariant::Bottom),
            _ => Err(CaseError::AmbiguousVariant { is_top, is_bottom }),
        }
    }

    /// Corner pillars and the pegs on them.
    pub fn includes_pillars(self) -> bool {
        self != CaseVariant::Top
    }

    /// Voids the other half's pegs drop into.
    pub fn includes_peg_holes(self) -> bool {
        self != CaseVariant::Bottom
    }

    /// Standoff posts and the through-holes they stand in.
    pub fn includes_standoffs(self) -> bool {
        self != CaseVariant::Top
    }

    /// Name of the generated part.
    pub fn label(self) -> &'static str {
        match self {
            CaseVariant::Top => "case_top",
            CaseVariant::Bottom => "case_bottom",
            CaseVariant::Combined => "case_combined",
        }
    }
}

impl std::fmt::Display for CaseVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
            Self::Combined => write!(f, "combined"),
        }
    }
}

/// Validate `config` and assemble the half selected by its flags.
pub fn assemble(config: &CaseConfig) -> Result<Part> {
    let variant = config.validate()?;
    build(config, variant)
}

/// Validate the dimensions of `config` and assemble `variant`, ignoring the
/// configuration flags.
pub fn assemble_variant(config: &CaseConfig, variant: CaseVariant) -> Result<Part> {
    config.validate_dimensions()?;
    build(config, variant)
}

fn build(config: &CaseConfig, variant: CaseVariant) -> Result<Part> {
    let tol = config.epsilon_tolerance;
    let segments = config.tessellation_resolution;
    let case = config.case_size();
    let pillar_footprint = config.pillar_footprint();

    let panel = vented_panel(
        &PanelSpec {
            size: case,
            hex_inner_width: config.hex_inner_width,
            hex_wall_thickness: config.hex_wall_thickness,
            padding: config.edge_padding(),
            corner_rounding: config.pillar_radius,
            segments,
        },
        tol,
    )?;

    let base_union = if variant.includes_pillars() {
        let pillars = corner_pillars(
            "pillar",
            &CornerLayout::centered(
                pillar_footprint,
                config.pillar_radius,
                config.pillar_height,
                segments,
            ),
        );
        panel.union(&pillars)
    } else {
        panel
    };
    debug!(%variant, "panel and pillars joined");

    let standoff_rect = config.standoff_size.to_vector();
    let standoff_shift = Vector3::new(config.standoff_offset.x, config.standoff_offset.y, 0.0);
    let standoff_base_height = config.standoff_base_total_height();

    let mut cuts = Vec::new();
    if variant.includes_peg_holes() {
        cuts.push(corner_pillars(
            "peg_hole",
            &CornerLayout::centered(
                pillar_footprint,
                config.peg_hole_radius(),
                config.peg_hole_depth(),
                segments,
            )
            .offset_by(Vector3::new(0.0, 0.0, -tol)),
        ));
    }
    if variant.includes_standoffs() {
        cuts.push(corner_pillars(
            "standoff_hole",
            &CornerLayout::centered(
                standoff_rect,
                config.standoff_base_radius + tol,
                standoff_base_height,
                segments,
            )
            .offset_by(standoff_shift + Vector3::new(0.0, 0.0, -tol)),
        ));
    }
    debug!(cuts = cuts.len(), "collected voids");

    let body = if cuts.is_empty() {
        base_union
    } else {
        base_union.difference(&Part::union_all("voids", cuts))
    };

    let mut additions = Vec::new();
    if variant.includes_pillars() {
        additions.push(corner_pillars(
            "peg",
            &CornerLayout::centered(
                pillar_footprint,
                config.peg_radius,
                config.peg_height,
                segments,
            )
            .offset_by(Vector3::new(0.0, 0.0, config.pillar_height)),
        ));
    }
    if variant.includes_standoffs() {
        additions.push(standoffs(config, standoff_rect, standoff_shift, segments));
    }
    debug!(additions = additions.len(), "collected additions");

    let joined = if additions.is_empty() {
        body
    } else {
        body.union(&Part::union_all("additions", additions))
    };
    let result = joined.with_name(variant.label());

    info!(
        %variant,
        nodes = result.node_count(),
        "assembled case half"
    );
    Ok(result)
}

/// Standoff bases with their pegs stacked on top.
fn standoffs(
    config: &CaseConfig,
    rectangle: Vector2<f64>,
    shift: Vector3<f64>,
    segments: u32,
) -> Part {
    let base_height = config.standoff_base_total_height();
    let bases = corner_pillars(
        "standoff_base",
        &CornerLayout::centered(
            rectangle,
            config.standoff_base_radius,
            base_height,
            segments,
        )
        .offset_by(shift),
    );
    let pegs = corner_pillars(
        "standoff_peg",
        &CornerLayout::centered(
            rectangle,
            config.standoff_peg_radius,
            config.standoff_peg_height,
            segments,
        )
        .offset_by(shift + Vector3::new(0.0, 0.0, base_height)),
    );
    bases.union(&pegs).with_name("standoffs")
}
