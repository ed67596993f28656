//! Trimming material to a rectangular footprint.

use nalgebra::Vector3;

use crate::{centered_cube, Part};

/// Remove all material of `part` outside the box of size `footprint`
/// centered on the origin.
///
/// The outside is modelled as a frame, a box twice the footprint minus the
/// footprint itself, and subtracted. Tiling never overhangs by more than one
/// pitch, so the doubled box always covers the overhang. This keeps the
/// boolean kernel on difference operations only.
pub fn clip_to_footprint(part: &Part, footprint: Vector3<f64>) -> Part {
    let outer = centered_cube(
        "clip_outer",
        2.0 * footprint.x,
        2.0 * footprint.y,
        2.0 * footprint.z,
    );
    let inner = centered_cube("clip_inner", footprint.x, footprint.y, footprint.z);
    let outside = outer.difference(&inner).with_name("clip_frame");
    part.difference(&outside)
        .with_name(format!("{}-clipped", part.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::honeycomb::{tile_honeycomb, GridSpec};
    use crate::inspect::{bounds, contains};

    #[test]
    fn frame_covers_twice_the_footprint() {
        let slab = centered_cube("slab", 10.0, 10.0, 1.0);
        let clipped = clip_to_footprint(&slab, Vector3::new(4.0, 6.0, 2.0));
        assert!(contains(&clipped, Vector3::new(1.9, 2.9, 0.0)));
        assert!(!contains(&clipped, Vector3::new(2.1, 0.0, 0.0)));
        assert!(!contains(&clipped, Vector3::new(0.0, 3.1, 0.0)));
        assert!(!contains(&clipped, Vector3::new(-3.9, -4.9, 0.4)));
        // The doubled box does not cover the slab, so bounds stay conservative.
        assert!(bounds(&clipped).unwrap().size().x > 4.0);
    }

    #[test]
    fn clipped_honeycomb_stays_inside_footprint() {
        let grid = GridSpec::new(Vector3::new(40.0, 30.0, 2.0), 4.0, 1.0).unwrap();
        let footprint = Vector3::new(36.0, 26.0, 2.02);
        let tiled = tile_honeycomb(&grid, 0.01);
        let clipped = clip_to_footprint(&tiled, footprint);

        let half = footprint / 2.0;
        let mut inside_hits = 0;
        let mut overhang_hits = 0;
        for i in -60..=60 {
            for j in -60..=60 {
                let p = Vector3::new(i as f64 * 0.4, j as f64 * 0.4, 0.0);
                let beyond = p.x.abs() > half.x + 1e-9 || p.y.abs() > half.y + 1e-9;
                if beyond {
                    if contains(&tiled, p) {
                        overhang_hits += 1;
                    }
                    assert!(!contains(&clipped, p), "material left at {p:?}");
                } else if contains(&clipped, p) {
                    inside_hits += 1;
                }
            }
        }
        assert!(overhang_hits > 0, "tiling should overhang before clipping");
        assert!(inside_hits > 0, "clipping removed the whole mesh");

        let b = bounds(&clipped).unwrap();
        assert!(bounds(&tiled).unwrap().max.x > half.x);
        assert!(b.max.x <= half.x + 1e-9 && b.min.x >= -half.x - 1e-9);
        assert!(b.max.y <= half.y + 1e-9 && b.min.y >= -half.y - 1e-9);
    }
}
