//! Diagram Data Model
//!
//! Canonical records for nodes, links and model-wide settings, plus the
//! snapshot that bundles them. The serialized layout is wire compatible with
//! the GraphLinksModel documents the host exchanges with its rendering
//! engine: `nodeDataArray` / `linkDataArray` / `modelData`, camelCase field
//! names, and node locations as `"x y"` strings under `loc`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DiagramError;

/// Node keys are positive integers; `0` means "not yet assigned".
pub type NodeKey = i64;

/// Link keys are negative integers; `0` means "not yet assigned".
///
/// Node and link keys share one flat identifier space, so the two ranges
/// must stay disjoint.
pub type LinkKey = i64;

/// Sentinel for records created without an explicit key.
pub const UNKEYED: i64 = 0;

/// A 2D location in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Parse the `"x y"` string form used by the persisted document.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { x, y })
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Serialize [`Point`] as the `"x y"` string the document format expects.
mod point_string {
    use super::Point;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(point: &Point, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&point.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Point, D::Error> {
        let s = String::deserialize(de)?;
        Point::parse(&s).ok_or_else(|| de::Error::custom(format!("invalid loc string: {s:?}")))
    }
}

fn default_node_color() -> String {
    // Matches the archetype used when the engine's click-creating tool
    // spawns a node.
    "lightblue".to_string()
}

fn default_true() -> bool {
    true
}

/// A node in the canonical graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique positive key; stable for the record's lifetime.
    #[serde(default)]
    pub key: NodeKey,

    /// Display label.
    pub text: String,

    /// Fill color; raw data, not the theme-derived presentation color.
    #[serde(default = "default_node_color")]
    pub color: String,

    /// Location, persisted as `"x y"`.
    #[serde(rename = "loc", with = "point_string", default)]
    pub loc: Point,
}

impl NodeRecord {
    /// A new unkeyed node record; the store assigns the key on insert.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            key: UNKEYED,
            text: text.into(),
            color: default_node_color(),
            loc: Point::ZERO,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_loc(mut self, loc: Point) -> Self {
        self.loc = loc;
        self
    }

    pub fn with_key(mut self, key: NodeKey) -> Self {
        self.key = key;
        self
    }
}

/// A link between two nodes in the canonical graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Unique negative key; stable for the record's lifetime.
    #[serde(default)]
    pub key: LinkKey,

    /// Key of the source node; must resolve to a live node.
    pub from: NodeKey,

    /// Key of the target node; must resolve to a live node.
    pub to: NodeKey,

    /// Whether the source end may be dragged to another node. Effective
    /// relinkability also requires [`ModelData::can_relink`].
    #[serde(rename = "relinkableFrom", default = "default_true")]
    pub relinkable_from: bool,

    /// Whether the target end may be dragged to another node.
    #[serde(rename = "relinkableTo", default = "default_true")]
    pub relinkable_to: bool,
}

impl LinkRecord {
    /// A new unkeyed link record; the store assigns the key on insert.
    pub fn new(from: NodeKey, to: NodeKey) -> Self {
        Self {
            key: UNKEYED,
            from,
            to,
            relinkable_from: true,
            relinkable_to: true,
        }
    }

    pub fn with_key(mut self, key: LinkKey) -> Self {
        self.key = key;
        self
    }
}

/// Model-wide settings shared by every record, mutated by the host only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelData {
    /// Whether link endpoints may be dragged to other nodes at all.
    #[serde(default = "default_true")]
    pub can_relink: bool,
}

impl Default for ModelData {
    fn default() -> Self {
        Self { can_relink: true }
    }
}

/// The full canonical diagram state.
///
/// `skip_sync` is runtime-only coordination state: when set, the snapshot
/// already reflects an engine-originated edit and the next push to the
/// engine must be suppressed. It is never serialized, and neither is any
/// theme-derived color.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    #[serde(rename = "nodeDataArray", default)]
    pub nodes: Vec<NodeRecord>,

    #[serde(rename = "linkDataArray", default)]
    pub links: Vec<LinkRecord>,

    #[serde(default)]
    pub model_data: ModelData,

    #[serde(skip)]
    pub skip_sync: bool,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<NodeRecord>, links: Vec<LinkRecord>, model_data: ModelData) -> Self {
        Self {
            nodes,
            links,
            model_data,
            skip_sync: false,
        }
    }

    pub fn node(&self, key: NodeKey) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn link(&self, key: LinkKey) -> Option<&LinkRecord> {
        self.links.iter().find(|l| l.key == key)
    }

    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.node(key).is_some()
    }

    /// Links whose either endpoint is `key`.
    pub fn links_touching(&self, key: NodeKey) -> impl Iterator<Item = &LinkRecord> {
        self.links.iter().filter(move |l| l.from == key || l.to == key)
    }

    /// Check the document-level invariants: keys unique within the flat
    /// space, node keys positive, link keys negative, every endpoint
    /// resolving to a live node.
    ///
    /// Runs wherever a snapshot enters the system from outside (a persisted
    /// document, a host-supplied initial state). Deltas applied afterwards
    /// preserve these invariants, so the store never re-checks.
    pub fn validate(&self) -> Result<(), DiagramError> {
        let mut keys = HashSet::new();
        for node in &self.nodes {
            if node.key <= 0 {
                return Err(DiagramError::KeyOutOfRange { key: node.key });
            }
            if !keys.insert(node.key) {
                return Err(DiagramError::DuplicateKey { key: node.key });
            }
        }
        for link in &self.links {
            if link.key >= 0 {
                return Err(DiagramError::KeyOutOfRange { key: link.key });
            }
            if !keys.insert(link.key) {
                return Err(DiagramError::DuplicateKey { key: link.key });
            }
        }
        for link in &self.links {
            for endpoint in [link.from, link.to] {
                if !self.contains_node(endpoint) {
                    return Err(DiagramError::MissingNode { key: endpoint });
                }
            }
        }
        Ok(())
    }
}
