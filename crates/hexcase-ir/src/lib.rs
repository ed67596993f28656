//! Intermediate representation for hexcase enclosure models.
//!
//! This crate defines the DAG-based IR that a generated case half is
//! recorded in. The IR is purely declarative: no mesh data, just a graph of
//! CSG operations. Meshing is left to whichever kernel consumes the
//! document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the IR graph.
pub type NodeId = u64;

/// 3D vector with f64 components (conventionally millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// CSG operation, the core building block of the IR DAG.
///
/// Each variant is either a leaf primitive or a combining/transform operation
/// that references child nodes by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CsgOp {
    /// Axis-aligned box with one corner at the origin.
    Cube {
        /// Size along each axis.
        size: Vec3,
    },
    /// Axis-aligned box with one corner at the origin whose four edges
    /// parallel to Z are rounded.
    RoundedCube {
        /// Size along each axis.
        size: Vec3,
        /// Rounding radius of the vertical edges.
        radius: f64,
        /// Segments per full turn used to approximate the rounding.
        segments: u32,
    },
    /// Cylinder along +Z with its base centered on the origin.
    ///
    /// A polygonal cylinder places its first vertex on the +X axis, so a
    /// 6-segment cylinder is a hexagonal prism with flats facing ±Y.
    Cylinder {
        /// Circumscribed radius.
        radius: f64,
        /// Height of the cylinder.
        height: f64,
        /// Number of circular segments.
        segments: u32,
    },
    /// Empty geometry (identity for union).
    Empty,
    /// Boolean union of two geometries.
    Union {
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Boolean difference (left minus right).
    Difference {
        /// Left operand (base).
        left: NodeId,
        /// Right operand (subtracted).
        right: NodeId,
    },
    /// Boolean intersection of two geometries.
    Intersection {
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Translation by an offset vector.
    Translate {
        /// Child node to translate.
        child: NodeId,
        /// Translation offset.
        offset: Vec3,
    },
}

impl CsgOp {
    /// Child node ids referenced by this operation, left to right.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            CsgOp::Union { left, right }
            | CsgOp::Difference { left, right }
            | CsgOp::Intersection { left, right } => vec![*left, *right],
            CsgOp::Translate { child, .. } => vec![*child],
            CsgOp::Cube { .. }
            | CsgOp::RoundedCube { .. }
            | CsgOp::Cylinder { .. }
            | CsgOp::Empty => Vec::new(),
        }
    }

    /// Whether this operation is a leaf primitive (including `Empty`).
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// A node in the IR graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// The operation this node represents.
    pub op: CsgOp,
}

/// An entry in the scene: a root node with a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    /// Root node of this scene part.
    pub root: NodeId,
    /// Label of the part (e.g. "case_top").
    pub label: String,
}

/// A hexcase document, the JSON file format written by the generator.
///
/// Contains the full IR DAG and the scene roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// All nodes in the graph, keyed by [`NodeId`].
    pub nodes: HashMap<NodeId, Node>,
    /// Scene entries (one per generated part).
    pub roots: Vec<SceneEntry>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Ids of nodes referenced as a child but missing from [`Document::nodes`].
    ///
    /// An empty result means every edge of the DAG resolves.
    pub fn dangling_references(&self) -> Vec<NodeId> {
        let mut missing: Vec<NodeId> = self
            .nodes
            .values()
            .flat_map(|node| node.op.children())
            .chain(self.roots.iter().map(|entry| entry.root))
            .filter(|id| !self.nodes.contains_key(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}
