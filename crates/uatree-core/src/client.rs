//! Address space capability consumed by the tree browser

use std::fmt;

use crate::node::{NodeInfo, NodeRef};

/// A single node's children could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseError {
    pub node: NodeRef,
    pub cause: String,
}

impl BrowseError {
    pub fn new(node: NodeRef, cause: impl Into<String>) -> Self {
        Self {
            node,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for BrowseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Browsing node {} failed: {}", self.node, self.cause)
    }
}

impl std::error::Error for BrowseError {}

/// Source of child nodes for the browser
///
/// Calls are blocking; the browser never has more than one in flight.
pub trait AddressSpaceClient {
    /// Immediate children of `node`, in the order the server returned them
    fn children(&self, node: &NodeRef) -> Result<Vec<NodeInfo>, BrowseError>;

    /// Whether `node` has any children at all
    ///
    /// Used at the depth cap to decide on the `...` marker. Implementations
    /// backed by a protocol with a cheaper existence query can override this.
    fn has_children(&self, node: &NodeRef) -> Result<bool, BrowseError> {
        self.children(node).map(|children| !children.is_empty())
    }
}

impl<C: AddressSpaceClient + ?Sized> AddressSpaceClient for &C {
    fn children(&self, node: &NodeRef) -> Result<Vec<NodeInfo>, BrowseError> {
        (**self).children(node)
    }

    fn has_children(&self, node: &NodeRef) -> Result<bool, BrowseError> {
        (**self).has_children(node)
    }
}

impl<C: AddressSpaceClient + ?Sized> AddressSpaceClient for Box<C> {
    fn children(&self, node: &NodeRef) -> Result<Vec<NodeInfo>, BrowseError> {
        (**self).children(node)
    }

    fn has_children(&self, node: &NodeRef) -> Result<bool, BrowseError> {
        (**self).has_children(node)
    }
}
