//! Canonical Graph Store
//!
//! Single owner of the diagram's data state. Every mutation - host-driven
//! or engine-originated - routes through [`GraphStore::apply_delta`], which
//! is the single-writer entry point that keeps node and link key spaces
//! disjoint, enforces referential integrity of link endpoints, and applies
//! the configured node-removal policy.

use std::collections::HashSet;

use crate::error::DiagramError;

use super::delta::GraphDelta;
use super::model::{GraphSnapshot, LinkKey, LinkRecord, NodeKey, NodeRecord, UNKEYED};

/// What happens to links whose endpoint node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// Dependent links are deleted together with the node.
    #[default]
    Cascade,
    /// Node removal is refused while any link references it.
    Reject,
}

/// Holds the current [`GraphSnapshot`] and arbitrates all writes to it.
pub struct GraphStore {
    snapshot: GraphSnapshot,
    /// Every key ever seen this session. Key assignment scans skip these,
    /// so automatically assigned keys are never reused even after the
    /// record they named is gone.
    used_keys: HashSet<i64>,
    policy: RemovalPolicy,
}

impl GraphStore {
    /// `initial` is expected to already satisfy [`GraphSnapshot::validate`];
    /// snapshots are checked where they enter the system, and every applied
    /// delta preserves the invariants from there on.
    pub fn new(initial: GraphSnapshot, policy: RemovalPolicy) -> Self {
        let mut used_keys = HashSet::new();
        used_keys.extend(initial.nodes.iter().map(|n| n.key));
        used_keys.extend(initial.links.iter().map(|l| l.key));
        used_keys.remove(&UNKEYED);
        Self {
            snapshot: initial,
            used_keys,
            policy,
        }
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn policy(&self) -> RemovalPolicy {
        self.policy
    }

    /// Mark the snapshot as already reflecting engine-originated state, so
    /// the next push to the engine is suppressed.
    pub fn set_skip_sync(&mut self, skip: bool) {
        self.snapshot.skip_sync = skip;
    }

    /// Read and clear the skip-sync flag.
    pub fn consume_skip_sync(&mut self) -> bool {
        std::mem::take(&mut self.snapshot.skip_sync)
    }

    /// Merge an incremental edit into the snapshot.
    ///
    /// Returns the canonicalized delta: creation requests carry their
    /// assigned keys and cascade-deleted links appear in the removed-link
    /// list, so the host callback sees exactly what changed. The snapshot
    /// is untouched when an error is returned.
    pub fn apply_delta(&mut self, delta: GraphDelta) -> Result<GraphDelta, DiagramError> {
        self.validate(&delta)?;

        let mut applied = GraphDelta {
            model_data: delta.model_data,
            ..Default::default()
        };

        if let Some(model_data) = delta.model_data {
            self.snapshot.model_data = model_data;
        }

        for record in delta.inserted_nodes {
            let record = self.insert_node(record);
            applied.inserted_nodes.push(record);
        }
        for record in delta.modified_nodes {
            if record.key == UNKEYED || record.key < 0 {
                // No usable key: treat as a creation request.
                let record = self.insert_node(record);
                applied.inserted_nodes.push(record);
            } else {
                self.upsert_node(record.clone());
                applied.modified_nodes.push(record);
            }
        }

        for record in delta.inserted_links {
            let record = self.insert_link(record);
            applied.inserted_links.push(record);
        }
        for record in delta.modified_links {
            if record.key == UNKEYED || record.key > 0 {
                let record = self.insert_link(record);
                applied.inserted_links.push(record);
            } else {
                self.upsert_link(record.clone());
                applied.modified_links.push(record);
            }
        }

        // Explicit link removals go first so that a node removed together
        // with its links (the only legal form under the reject policy) no
        // longer has dependents when its turn comes.
        for key in delta.removed_link_keys {
            let before = self.snapshot.links.len();
            self.snapshot.links.retain(|l| l.key != key);
            if self.snapshot.links.len() != before {
                applied.removed_link_keys.push(key);
            }
        }
        for key in delta.removed_node_keys {
            if !self.snapshot.contains_node(key) {
                continue;
            }
            let cascaded = self.remove_node_record(key);
            applied.removed_node_keys.push(key);
            for link_key in cascaded {
                if !applied.removed_link_keys.contains(&link_key) {
                    applied.removed_link_keys.push(link_key);
                }
            }
        }

        Ok(applied)
    }

    /// Check the whole delta before mutating anything, so a rejected edit
    /// leaves no partial state behind.
    fn validate(&self, delta: &GraphDelta) -> Result<(), DiagramError> {
        // Node keys that will be live once the node sections have applied.
        let mut node_keys: HashSet<NodeKey> =
            self.snapshot.nodes.iter().map(|n| n.key).collect();
        for record in &delta.inserted_nodes {
            // A creation request keeps its explicit key only when the
            // assignment scan will not rewrite it. A retired key is
            // reassigned, so a link naming it would end up dangling; a live
            // key is also reassigned, but then the link resolves to the
            // live record already collected above.
            if record.key > 0 && !self.used_keys.contains(&record.key) {
                node_keys.insert(record.key);
            }
        }
        for record in &delta.modified_nodes {
            // Keyed upserts always keep their key, retired or not.
            if record.key > 0 {
                node_keys.insert(record.key);
            }
        }
        for key in &delta.removed_node_keys {
            node_keys.remove(key);
        }

        for link in delta.inserted_links.iter().chain(&delta.modified_links) {
            for endpoint in [link.from, link.to] {
                if !node_keys.contains(&endpoint) {
                    return Err(DiagramError::MissingNode { key: endpoint });
                }
            }
        }

        if self.policy == RemovalPolicy::Reject {
            for &key in &delta.removed_node_keys {
                let dependents = self
                    .snapshot
                    .links_touching(key)
                    .filter(|l| !delta.removed_link_keys.contains(&l.key))
                    .count();
                if dependents > 0 {
                    return Err(DiagramError::NodeInUse {
                        key,
                        links: dependents,
                    });
                }
            }
        }

        Ok(())
    }

    /// First free node key at or above `max(hint, 1)`, skipping every key
    /// this session has ever used.
    fn assign_node_key(&self, hint: NodeKey) -> NodeKey {
        let mut key = hint.max(1);
        while self.used_keys.contains(&key) {
            key += 1;
        }
        key
    }

    /// First free link key at or below `min(hint, -1)`.
    fn assign_link_key(&self, hint: LinkKey) -> LinkKey {
        let mut key = hint.min(-1);
        while self.used_keys.contains(&key) {
            key -= 1;
        }
        key
    }

    fn insert_node(&mut self, mut record: NodeRecord) -> NodeRecord {
        record.key = self.assign_node_key(record.key);
        self.used_keys.insert(record.key);
        self.snapshot.nodes.push(record.clone());
        record
    }

    /// Keyed upsert: replace the record with this key, or revive it if the
    /// key is not live (an engine undo re-inserts removed records this way).
    fn upsert_node(&mut self, record: NodeRecord) {
        self.used_keys.insert(record.key);
        match self.snapshot.nodes.iter_mut().find(|n| n.key == record.key) {
            Some(existing) => *existing = record,
            None => self.snapshot.nodes.push(record),
        }
    }

    fn insert_link(&mut self, mut record: LinkRecord) -> LinkRecord {
        record.key = self.assign_link_key(record.key);
        self.used_keys.insert(record.key);
        self.snapshot.links.push(record.clone());
        record
    }

    fn upsert_link(&mut self, record: LinkRecord) {
        self.used_keys.insert(record.key);
        match self.snapshot.links.iter_mut().find(|l| l.key == record.key) {
            Some(existing) => *existing = record,
            None => self.snapshot.links.push(record),
        }
    }

    /// Remove a node that is known to exist, cascading dependent links.
    /// Returns the keys of the links that went with it.
    fn remove_node_record(&mut self, key: NodeKey) -> Vec<LinkKey> {
        debug_assert!(self.policy == RemovalPolicy::Cascade || self.snapshot.links_touching(key).count() == 0);
        let cascaded: Vec<LinkKey> = self.snapshot.links_touching(key).map(|l| l.key).collect();
        self.snapshot.links.retain(|l| l.from != key && l.to != key);
        self.snapshot.nodes.retain(|n| n.key != key);
        cascaded
    }
}
