//! Incremental Edits
//!
//! [`GraphDelta`] is the unit of change exchanged in both directions: the
//! host commits deltas into the store, and the rendering engine reports its
//! user edits as deltas. The shape mirrors the engine's incremental-data
//! notifications (inserted/modified record arrays plus removed-key lists).

use serde::{Deserialize, Serialize};

use super::model::{LinkKey, LinkRecord, ModelData, NodeKey, NodeRecord};

/// An incremental add/update/remove against the canonical graph.
///
/// `inserted_*` records are creation requests: their keys are optional, and
/// an explicit key that collides with a live record is treated as a scan
/// hint and reassigned. `modified_*` records are keyed upserts with
/// last-writer-wins semantics, so re-applying the same delta is a no-op.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDelta {
    #[serde(rename = "insertedNodeData", default, skip_serializing_if = "Vec::is_empty")]
    pub inserted_nodes: Vec<NodeRecord>,

    #[serde(rename = "modifiedNodeData", default, skip_serializing_if = "Vec::is_empty")]
    pub modified_nodes: Vec<NodeRecord>,

    #[serde(rename = "removedNodeKeys", default, skip_serializing_if = "Vec::is_empty")]
    pub removed_node_keys: Vec<NodeKey>,

    #[serde(rename = "insertedLinkData", default, skip_serializing_if = "Vec::is_empty")]
    pub inserted_links: Vec<LinkRecord>,

    #[serde(rename = "modifiedLinkData", default, skip_serializing_if = "Vec::is_empty")]
    pub modified_links: Vec<LinkRecord>,

    #[serde(rename = "removedLinkKeys", default, skip_serializing_if = "Vec::is_empty")]
    pub removed_link_keys: Vec<LinkKey>,

    /// Replacement model-wide settings, when the edit touched them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_data: Option<ModelData>,
}

impl GraphDelta {
    pub fn is_empty(&self) -> bool {
        self.inserted_nodes.is_empty()
            && self.modified_nodes.is_empty()
            && self.removed_node_keys.is_empty()
            && self.inserted_links.is_empty()
            && self.modified_links.is_empty()
            && self.removed_link_keys.is_empty()
            && self.model_data.is_none()
    }

    /// A delta that creates one node.
    pub fn insert_node(record: NodeRecord) -> Self {
        Self {
            inserted_nodes: vec![record],
            ..Default::default()
        }
    }

    /// A delta that creates one link.
    pub fn insert_link(record: LinkRecord) -> Self {
        Self {
            inserted_links: vec![record],
            ..Default::default()
        }
    }

    /// A delta that upserts one node record by key.
    pub fn update_node(record: NodeRecord) -> Self {
        Self {
            modified_nodes: vec![record],
            ..Default::default()
        }
    }

    /// A delta that upserts one link record by key.
    pub fn update_link(record: LinkRecord) -> Self {
        Self {
            modified_links: vec![record],
            ..Default::default()
        }
    }

    /// A delta that removes one node (and, under the cascade policy, its
    /// dependent links).
    pub fn remove_node(key: NodeKey) -> Self {
        Self {
            removed_node_keys: vec![key],
            ..Default::default()
        }
    }

    /// A delta that removes one link.
    pub fn remove_link(key: LinkKey) -> Self {
        Self {
            removed_link_keys: vec![key],
            ..Default::default()
        }
    }

    /// A delta that replaces the model-wide settings.
    pub fn set_model_data(model_data: ModelData) -> Self {
        Self {
            model_data: Some(model_data),
            ..Default::default()
        }
    }

    /// Keys of links present (inserted or upserted) in this delta.
    ///
    /// These are the links whose derived stroke color must be recomputed
    /// after the delta commits: additions and endpoint changes both surface
    /// here.
    pub fn touched_link_keys(&self) -> impl Iterator<Item = LinkKey> + '_ {
        self.inserted_links
            .iter()
            .chain(self.modified_links.iter())
            .map(|l| l.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(GraphDelta::default().is_empty());
        assert!(!GraphDelta::remove_node(1).is_empty());
        assert!(!GraphDelta::set_model_data(ModelData { can_relink: false }).is_empty());
    }

    #[test]
    fn test_wire_format_skips_empty_sections() {
        let delta = GraphDelta::insert_link(LinkRecord::new(1, 2));
        let json = serde_json::to_value(&delta).unwrap();
        assert!(json.get("insertedLinkData").is_some());
        assert!(json.get("insertedNodeData").is_none());
        assert!(json.get("removedNodeKeys").is_none());
        assert!(json.get("modelData").is_none());
    }

    #[test]
    fn test_touched_link_keys() {
        let delta = GraphDelta {
            inserted_links: vec![LinkRecord::new(1, 2).with_key(-1)],
            modified_links: vec![LinkRecord::new(2, 1).with_key(-2)],
            ..Default::default()
        };
        let keys: Vec<_> = delta.touched_link_keys().collect();
        assert_eq!(keys, vec![-1, -2]);
    }
}
