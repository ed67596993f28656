#![warn(missing_docs)]

//! hexcase: honeycomb-vented enclosure halves as CSG trees.
//!
//! A case half is a rounded shell whose central window is filled with a
//! clipped honeycomb mesh, plus corner pillars with mating pegs and holes and
//! a rectangle of standoff posts for an internal board. Nothing is meshed
//! here: every builder returns a [`Part`], a retained CSG value that records
//! its construction as a [`hexcase_ir`] DAG.
//!
//! # Example
//!
//! ```rust,no_run
//! use hexcase::{assemble, CaseConfig};
//!
//! let config = CaseConfig::default();
//! let bottom = assemble(&config).unwrap();
//! let json = bottom.to_document("case_bottom").to_json().unwrap();
//! std::fs::write("case_bottom.json", json).unwrap();
//! ```

use hexcase_ir::{CsgOp, Document, Node, NodeId, SceneEntry, Vec3 as IrVec3};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod assembly;
pub mod clip;
pub mod config;
pub mod error;
pub mod honeycomb;
pub mod inspect;
pub mod panel;
pub mod pillars;

pub use assembly::{assemble, assemble_variant, CaseVariant};
pub use clip::clip_to_footprint;
pub use config::{CaseConfig, Extent2};
pub use error::{CaseError, Result};
pub use honeycomb::{hex_cell, lattice_centers, tile_honeycomb, GridSpec, HexCellSpec};
pub use inspect::{bounds, contains, placements, Aabb, Placement, PrimitiveCounts};
pub use panel::{vented_panel, PanelSpec};
pub use pillars::{corner_pillars, CornerLayout};

/// Global atomic counter for unique IR node IDs.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a globally unique [`NodeId`].
fn alloc_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A named part with geometry.
///
/// Parts are the building block of every case component. Create primitives
/// with [`Part::cube`], [`Part::rounded_cube`] and [`Part::cylinder`], then
/// combine them with [`Part::union`], [`Part::difference`] and
/// [`Part::intersection`] or the operator shorthands (`+`, `-`, `&`).
///
/// A Part is an immutable value: every operation returns a new Part that
/// owns the IR nodes of its whole subtree. Extract them with
/// [`Part::to_document`].
#[derive(Debug, Clone)]
pub struct Part {
    /// Human-readable name for this part.
    pub name: String,
    ir_node_id: NodeId,
    ir_nodes: HashMap<NodeId, Node>,
}

impl Part {
    // =========================================================================
    // Internal constructors
    // =========================================================================

    fn with_ir(name: String, ir_node_id: NodeId, ir_nodes: HashMap<NodeId, Node>) -> Self {
        Self {
            name,
            ir_node_id,
            ir_nodes,
        }
    }

    /// Create a leaf IR node (primitive or empty) and return `(id, nodes)`.
    fn make_leaf(name: &str, op: CsgOp) -> (NodeId, HashMap<NodeId, Node>) {
        let id = alloc_node_id();
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.to_string()),
                op,
            },
        );
        (id, nodes)
    }

    /// Build a binary CSG node, merging both children's IR maps.
    fn make_binary(
        name: &str,
        left: &Part,
        right: &Part,
        op_fn: impl FnOnce(NodeId, NodeId) -> CsgOp,
    ) -> (NodeId, HashMap<NodeId, Node>) {
        let id = alloc_node_id();
        let mut nodes = left.ir_nodes.clone();
        nodes.extend(right.ir_nodes.iter().map(|(&k, v)| (k, v.clone())));
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.to_string()),
                op: op_fn(left.ir_node_id, right.ir_node_id),
            },
        );
        (id, nodes)
    }

    /// Build a unary transform node, cloning the child's IR map.
    fn make_unary(
        name: &str,
        child: &Part,
        op_fn: impl FnOnce(NodeId) -> CsgOp,
    ) -> (NodeId, HashMap<NodeId, Node>) {
        let id = alloc_node_id();
        let mut nodes = child.ir_nodes.clone();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.to_string()),
                op: op_fn(child.ir_node_id),
            },
        );
        (id, nodes)
    }

    // =========================================================================
    // Public constructors
    // =========================================================================

    /// Create an empty part.
    pub fn empty(name: impl Into<String>) -> Self {
        let name = name.into();
        let (id, nodes) = Self::make_leaf(&name, CsgOp::Empty);
        Self::with_ir(name, id, nodes)
    }

    /// Create a box with one corner at the origin.
    pub fn cube(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        let name = name.into();
        let (id, nodes) = Self::make_leaf(
            &name,
            CsgOp::Cube {
                size: IrVec3::new(x, y, z),
            },
        );
        Self::with_ir(name, id, nodes)
    }

    /// Create a box with one corner at the origin and its four vertical
    /// edges rounded by `radius`.
    pub fn rounded_cube(
        name: impl Into<String>,
        x: f64,
        y: f64,
        z: f64,
        radius: f64,
        segments: u32,
    ) -> Self {
        let name = name.into();
        let (id, nodes) = Self::make_leaf(
            &name,
            CsgOp::RoundedCube {
                size: IrVec3::new(x, y, z),
                radius,
                segments,
            },
        );
        Self::with_ir(name, id, nodes)
    }

    /// Create a cylinder along +Z with its base centered on the origin.
    pub fn cylinder(name: impl Into<String>, radius: f64, height: f64, segments: u32) -> Self {
        let name = name.into();
        let (id, nodes) = Self::make_leaf(
            &name,
            CsgOp::Cylinder {
                radius,
                height,
                segments,
            },
        );
        Self::with_ir(name, id, nodes)
    }

    /// Union of many parts as a balanced tree.
    ///
    /// Returns an empty part when `parts` is empty.
    pub fn union_all(name: impl Into<String>, parts: impl IntoIterator<Item = Part>) -> Self {
        let name = name.into();
        let mut level: Vec<Part> = parts.into_iter().collect();
        if level.is_empty() {
            return Part::empty(name);
        }
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut iter = level.into_iter();
            while let Some(left) = iter.next() {
                match iter.next() {
                    Some(right) => next.push(left.union(&right)),
                    None => next.push(left),
                }
            }
            level = next;
        }
        level.remove(0).with_name(name)
    }

    // =========================================================================
    // CSG operations
    // =========================================================================

    /// Boolean difference (self - other).
    pub fn difference(&self, other: &Part) -> Self {
        let result_name = format!("{}-diff", self.name);
        let (id, nodes) = Self::make_binary(&result_name, self, other, |l, r| CsgOp::Difference {
            left: l,
            right: r,
        });
        Self::with_ir(result_name, id, nodes)
    }

    /// Boolean union (self + other).
    pub fn union(&self, other: &Part) -> Self {
        let result_name = format!("{}-union", self.name);
        let (id, nodes) = Self::make_binary(&result_name, self, other, |l, r| CsgOp::Union {
            left: l,
            right: r,
        });
        Self::with_ir(result_name, id, nodes)
    }

    /// Boolean intersection.
    pub fn intersection(&self, other: &Part) -> Self {
        let result_name = format!("{}-intersect", self.name);
        let (id, nodes) = Self::make_binary(&result_name, self, other, |l, r| {
            CsgOp::Intersection { left: l, right: r }
        });
        Self::with_ir(result_name, id, nodes)
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Translate the part.
    pub fn translate(&self, x: f64, y: f64, z: f64) -> Self {
        let (id, nodes) = Self::make_unary(&self.name, self, |child| CsgOp::Translate {
            child,
            offset: IrVec3::new(x, y, z),
        });
        Self::with_ir(self.name.clone(), id, nodes)
    }

    /// Rename the part and its root IR node.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        if let Some(root) = self.ir_nodes.get_mut(&self.ir_node_id) {
            root.name = Some(self.name.clone());
        }
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Id of the root IR node.
    pub fn node_id(&self) -> NodeId {
        self.ir_node_id
    }

    /// Every IR node of this part's construction DAG.
    pub fn nodes(&self) -> &HashMap<NodeId, Node> {
        &self.ir_nodes
    }

    /// Number of IR nodes in this part's construction DAG.
    pub fn node_count(&self) -> usize {
        self.ir_nodes.len()
    }

    /// Look up a node of this part's DAG.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.ir_nodes.get(&id)
    }

    /// Check if the geometry is trivially empty.
    ///
    /// Only structural emptiness is detected (an `Empty` leaf, possibly
    /// transformed, unioned with other empties or used as a difference
    /// base); a difference that happens to remove everything is not.
    pub fn is_empty(&self) -> bool {
        self.is_empty_node(self.ir_node_id)
    }

    fn is_empty_node(&self, id: NodeId) -> bool {
        let Some(node) = self.ir_nodes.get(&id) else {
            return true;
        };
        match &node.op {
            CsgOp::Empty => true,
            CsgOp::Translate { child, .. } => self.is_empty_node(*child),
            CsgOp::Union { left, right } => self.is_empty_node(*left) && self.is_empty_node(*right),
            CsgOp::Difference { left, .. } => self.is_empty_node(*left),
            CsgOp::Intersection { left, right } => {
                self.is_empty_node(*left) || self.is_empty_node(*right)
            }
            CsgOp::Cube { .. } | CsgOp::RoundedCube { .. } | CsgOp::Cylinder { .. } => false,
        }
    }

    /// Canonical rendering of the construction tree, independent of node ids.
    ///
    /// Two parts built by the same sequence of operations with the same
    /// arguments render identically.
    pub fn structure(&self) -> String {
        let mut out = String::new();
        self.write_structure(self.ir_node_id, &mut out);
        out
    }

    fn write_structure(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.ir_nodes.get(&id) else {
            out.push('?');
            return;
        };
        let name = node.name.as_deref().unwrap_or("");
        // Writing into a String cannot fail.
        let _ = match &node.op {
            CsgOp::Cube { size } => write!(out, "cube[{name}]({},{},{})", size.x, size.y, size.z),
            CsgOp::RoundedCube {
                size,
                radius,
                segments,
            } => write!(
                out,
                "rounded_cube[{name}]({},{},{};r={radius};n={segments})",
                size.x, size.y, size.z
            ),
            CsgOp::Cylinder {
                radius,
                height,
                segments,
            } => write!(out, "cylinder[{name}]({radius},{height};n={segments})"),
            CsgOp::Empty => write!(out, "empty[{name}]"),
            CsgOp::Translate { child, offset } => {
                let _ = write!(out, "translate({},{},{})(", offset.x, offset.y, offset.z);
                self.write_structure(*child, out);
                write!(out, ")")
            }
            CsgOp::Union { left, right }
            | CsgOp::Difference { left, right }
            | CsgOp::Intersection { left, right } => {
                let tag = match &node.op {
                    CsgOp::Union { .. } => "union",
                    CsgOp::Difference { .. } => "difference",
                    _ => "intersection",
                };
                let _ = write!(out, "{tag}(");
                self.write_structure(*left, out);
                out.push(',');
                self.write_structure(*right, out);
                write!(out, ")")
            }
        };
    }

    /// Rebuild a part from one scene entry of a document.
    ///
    /// Returns `None` when a node reachable from the entry is missing or
    /// carries id `u64::MAX`, which leaves no id to allocate after it. Node
    /// ids allocated afterwards never collide with the loaded ones.
    pub fn from_document(doc: &Document, entry: &SceneEntry) -> Option<Part> {
        let mut nodes = HashMap::new();
        let mut stack = vec![entry.root];
        while let Some(id) = stack.pop() {
            if nodes.contains_key(&id) {
                continue;
            }
            let node = doc.nodes.get(&id)?;
            stack.extend(node.op.children());
            nodes.insert(id, node.clone());
        }
        let max_id = nodes.keys().max().copied().unwrap_or(0);
        let next_id = max_id.checked_add(1)?;
        NEXT_NODE_ID.fetch_max(next_id, Ordering::Relaxed);
        Some(Self::with_ir(entry.label.clone(), entry.root, nodes))
    }

    /// Extract the IR document for this part.
    ///
    /// The document contains all nodes in this part's construction DAG
    /// with this part's root node as the single scene entry.
    pub fn to_document(&self, label: impl Into<String>) -> Document {
        let mut doc = Document::new();
        doc.nodes = self.ir_nodes.clone();
        doc.roots.push(SceneEntry {
            root: self.ir_node_id,
            label: label.into(),
        });
        doc
    }
}

/// Helper to create a centered cube (cubes are corner-aligned at origin by default)
pub fn centered_cube(name: impl Into<String>, x: f64, y: f64, z: f64) -> Part {
    Part::cube(name, x, y, z).translate(-x / 2.0, -y / 2.0, -z / 2.0)
}

/// Helper to create a cylinder centered on the origin in all three axes
pub fn centered_cylinder(name: impl Into<String>, radius: f64, height: f64, segments: u32) -> Part {
    Part::cylinder(name, radius, height, segments).translate(0.0, 0.0, -height / 2.0)
}

// =============================================================================
// Operator overloads for ergonomic CSG
// =============================================================================

/// Union: `&a + &b`
impl std::ops::Add for &Part {
    type Output = Part;
    fn add(self, rhs: &Part) -> Part {
        self.union(rhs)
    }
}

/// Union: `a + b`
impl std::ops::Add for Part {
    type Output = Part;
    fn add(self, rhs: Part) -> Part {
        self.union(&rhs)
    }
}

/// Difference: `&a - &b`
impl std::ops::Sub for &Part {
    type Output = Part;
    fn sub(self, rhs: &Part) -> Part {
        self.difference(rhs)
    }
}

/// Difference: `a - b`
impl std::ops::Sub for Part {
    type Output = Part;
    fn sub(self, rhs: Part) -> Part {
        self.difference(&rhs)
    }
}

/// Intersection: `&a & &b`
impl std::ops::BitAnd for &Part {
    type Output = Part;
    fn bitand(self, rhs: &Part) -> Part {
        self.intersection(rhs)
    }
}

/// Intersection: `a & b`
impl std::ops::BitAnd for Part {
    type Output = Part;
    fn bitand(self, rhs: Part) -> Part {
        self.intersection(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_creation() {
        let cube = Part::cube("test", 10.0, 10.0, 10.0);
        assert!(!cube.is_empty());
        assert_eq!(cube.node_count(), 1);
    }

    #[test]
    fn test_empty_stays_empty_through_transforms() {
        let empty = Part::empty("nothing").translate(1.0, 2.0, 3.0);
        assert!(empty.is_empty());
        let diff = empty.difference(&Part::cube("c", 1.0, 1.0, 1.0));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_difference_records_both_operands() {
        let cube = Part::cube("cube", 10.0, 10.0, 10.0);
        let hole = Part::cylinder("hole", 3.0, 15.0, 32).translate(5.0, 5.0, -1.0);
        let result = cube.difference(&hole);
        assert!(!result.is_empty());
        // cube, cylinder, translate, difference
        assert_eq!(result.node_count(), 4);
        match &result.node(result.node_id()).unwrap().op {
            CsgOp::Difference { left, right } => {
                assert_eq!(*left, cube.node_id());
                assert_eq!(*right, hole.node_id());
            }
            other => panic!("expected Difference, got {other:?}"),
        }
    }

    #[test]
    fn test_operator_overloads() {
        let a = Part::cube("a", 10.0, 10.0, 10.0);
        let b = Part::cube("b", 10.0, 10.0, 10.0).translate(5.0, 0.0, 0.0);

        let union = &a + &b;
        let diff = &a - &b;
        let inter = &a & &b;
        assert!(union.structure().starts_with("union("));
        assert!(diff.structure().starts_with("difference("));
        assert!(inter.structure().starts_with("intersection("));

        let owned = a + b;
        assert_eq!(owned.structure(), union.structure());
    }

    #[test]
    fn test_union_all_is_balanced() {
        let parts = (0..8).map(|i| Part::cube("c", 1.0, 1.0, 1.0).translate(i as f64, 0.0, 0.0));
        let all = Part::union_all("row", parts);
        assert_eq!(all.name, "row");

        let structure = all.structure();
        assert_eq!(structure.matches("cube[").count(), 8);
        // 8 leaves in a balanced tree nest at most three unions deep.
        assert!(structure.starts_with("union(union(union("));
        assert!(!structure.starts_with("union(union(union(union("));
    }

    #[test]
    fn test_union_all_of_nothing_is_empty() {
        let none = Part::union_all("none", Vec::new());
        assert!(none.is_empty());
    }

    #[test]
    fn test_structure_ignores_node_ids() {
        let build = || {
            centered_cube("block", 4.0, 5.0, 6.0)
                .difference(&centered_cylinder("bore", 1.0, 7.0, 16))
        };
        let first = build();
        let second = build();
        assert_ne!(first.node_id(), second.node_id());
        assert_eq!(first.structure(), second.structure());
    }

    #[test]
    fn test_with_name_renames_root_node() {
        let part = Part::cube("a", 1.0, 1.0, 1.0)
            .union(&Part::cube("b", 1.0, 1.0, 1.0))
            .with_name("pair");
        assert_eq!(part.name, "pair");
        assert_eq!(
            part.node(part.node_id()).unwrap().name.as_deref(),
            Some("pair")
        );
    }

    #[test]
    fn test_document_contains_whole_dag() {
        let part = centered_cube("block", 2.0, 2.0, 2.0) - centered_cylinder("bore", 0.5, 3.0, 12);
        let doc = part.to_document("block");
        assert_eq!(doc.nodes.len(), part.node_count());
        assert_eq!(doc.roots.len(), 1);
        assert_eq!(doc.roots[0].root, part.node_id());
        assert!(doc.dangling_references().is_empty());
    }

    #[test]
    fn test_from_document_restores_structure() {
        let part = centered_cube("block", 2.0, 2.0, 2.0) - centered_cylinder("bore", 0.5, 3.0, 12);
        let doc = Document::from_json(&part.to_document("block").to_json().unwrap()).unwrap();
        let restored = Part::from_document(&doc, &doc.roots[0]).unwrap();
        assert_eq!(restored.name, "block");
        assert_eq!(restored.structure(), part.structure());

        let fresh = Part::cube("fresh", 1.0, 1.0, 1.0);
        assert!(restored.node(fresh.node_id()).is_none());
    }

    #[test]
    fn test_from_document_rejects_dangling_root() {
        let doc = Document::new();
        let entry = SceneEntry {
            root: 42,
            label: "ghost".to_string(),
        };
        assert!(Part::from_document(&doc, &entry).is_none());
    }

    #[test]
    fn test_from_document_rejects_exhausted_ids() {
        let mut doc = Document::new();
        doc.nodes.insert(
            u64::MAX,
            Node {
                id: u64::MAX,
                name: Some("last".to_string()),
                op: CsgOp::Cube {
                    size: IrVec3::new(1.0, 1.0, 1.0),
                },
            },
        );
        let entry = SceneEntry {
            root: u64::MAX,
            label: "last".to_string(),
        };
        assert!(Part::from_document(&doc, &entry).is_none());
    }
}
