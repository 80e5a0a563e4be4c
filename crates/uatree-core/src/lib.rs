//! uatree Core Library
//!
//! This crate provides the core functionality for uatree, including:
//! - Node model (node ids, display names, labels)
//! - The address space capability the browser reads from
//! - Depth-bounded tree browser writing the nested text form
//! - In-memory snapshot address space
//! - OPC UA session adapter (feature `opcua`)
//! - Configuration and error types

pub mod browser;
pub mod client;
pub mod config;
pub mod error;
pub mod node;
pub mod report;
#[cfg(feature = "opcua")]
pub mod session;
pub mod snapshot;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::browser::{BrowseOptions, BrowseStats, TreeBrowser};
    pub use crate::client::{AddressSpaceClient, BrowseError};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::node::{Identifier, NodeInfo, NodeRef};
    pub use crate::snapshot::SnapshotClient;
}
