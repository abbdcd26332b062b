//! Flattening of a conversation's node mapping into node and edge rows.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Mapping;

/// A stored message. `parent_id` is an opaque reference and may point at a
/// structural entry that was never materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub conversation_id: String,
    pub parent_id: Option<String>,
    pub role: Option<String>,
    pub content: String,
    pub create_time: Option<f64>,
}

impl NodeRecord {
    /// Whether this node gets a full-text search entry.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        !self.content.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub conversation_id: String,
    pub parent_id: String,
    pub child_id: String,
}

/// Row-level projection of one conversation's mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatTree {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl FlatTree {
    #[must_use]
    pub fn searchable_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_searchable()).count()
    }
}

/// Converts a mapping into rows.
///
/// Every entry with a message becomes a node, whatever its author role.
/// Entries without a message produce nothing. Edges are emitted for each
/// declared child that is itself a materialized node of this mapping, so an
/// edge never points outside the conversation's stored nodes.
#[must_use]
pub fn flatten(conversation_id: &str, mapping: &Mapping) -> FlatTree {
    let materialized: BTreeSet<&str> = mapping
        .iter()
        .filter(|(_, entry)| entry.message.is_some())
        .map(|(id, _)| id.as_str())
        .collect();

    let mut tree = FlatTree::default();
    for (node_id, entry) in mapping {
        let Some(message) = &entry.message else {
            continue;
        };
        tree.nodes.push(NodeRecord {
            id: node_id.clone(),
            conversation_id: conversation_id.to_owned(),
            parent_id: entry.parent.clone(),
            role: message.role().map(str::to_owned),
            content: message.text(),
            create_time: message.timestamp(),
        });

        let mut seen = BTreeSet::new();
        for child in &entry.children {
            if !materialized.contains(child.as_str()) {
                tracing::debug!(
                    conversation_id,
                    parent = %node_id,
                    child = %child,
                    "dropping edge to unmaterialized child"
                );
                continue;
            }
            if seen.insert(child.as_str()) {
                tree.edges.push(EdgeRecord {
                    conversation_id: conversation_id.to_owned(),
                    parent_id: node_id.clone(),
                    child_id: child.clone(),
                });
            }
        }
    }
    tree
}
