//! In-memory address space
//!
//! A fixed map from node to children, optionally loaded from a JSON file:
//!
//! ```json
//! {
//!   "root": "i=84",
//!   "nodes": {
//!     "i=84": [{ "id": "i=85", "name": "Objects" }, { "id": "i=86", "name": "Types" }],
//!     "i=85": [{ "id": "i=2253", "name": "Server" }]
//!   },
//!   "failures": { "i=86": "BadUserAccessDenied" }
//! }
//! ```
//!
//! Nodes missing from `nodes` are leaves. Nodes listed in `failures` fail
//! every browse call with the given cause.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::{AddressSpaceClient, BrowseError};
use crate::error::{Error, Result};
use crate::node::{NodeInfo, NodeRef};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotClient {
    /// Suggested starting node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<NodeRef>,
    #[serde(default)]
    nodes: BTreeMap<NodeRef, Vec<NodeInfo>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    failures: BTreeMap<NodeRef, String>,
}

impl SnapshotClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the suggested root
    pub fn with_root(mut self, root: NodeRef) -> Self {
        self.root = Some(root);
        self
    }

    /// Builder: set the children of `parent`, replacing any previous list
    pub fn with_children<I, S>(mut self, parent: NodeRef, children: I) -> Self
    where
        I: IntoIterator<Item = (NodeRef, S)>,
        S: Into<String>,
    {
        self.insert_children(
            parent,
            children
                .into_iter()
                .map(|(node, name)| NodeInfo::new(node, name))
                .collect(),
        );
        self
    }

    /// Builder: make every browse of `node` fail
    pub fn with_failure(mut self, node: NodeRef, cause: impl Into<String>) -> Self {
        self.failures.insert(node, cause.into());
        self
    }

    pub fn insert_children(&mut self, parent: NodeRef, children: Vec<NodeInfo>) {
        self.nodes.insert(parent, children);
    }

    pub fn root(&self) -> Option<&NodeRef> {
        self.root.as_ref()
    }

    /// Number of nodes that have a children list
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a snapshot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Snapshot(format!("failed to read {}: {}", path.display(), e))
        })?;
        let snapshot = Self::from_json_str(&contents).map_err(|e| {
            Error::Snapshot(format!("failed to parse {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), nodes = snapshot.len(), "loaded snapshot");
        Ok(snapshot)
    }

    /// Write the snapshot as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?).map_err(|e| {
            Error::Snapshot(format!("failed to write {}: {}", path.display(), e))
        })
    }
}

impl AddressSpaceClient for SnapshotClient {
    fn children(&self, node: &NodeRef) -> std::result::Result<Vec<NodeInfo>, BrowseError> {
        if let Some(cause) = self.failures.get(node) {
            return Err(BrowseError::new(node.clone(), cause.clone()));
        }
        Ok(self.nodes.get(node).cloned().unwrap_or_default())
    }
}
