//! Address space node model
//!
//! - Identifier: the namespace-scoped part of a node id
//! - NodeRef: namespace index + identifier, with the standard OPC UA text form
//! - NodeInfo: a NodeRef plus the display name a browse call returned for it

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Namespace-scoped identifier of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    /// `i=<number>`
    Numeric(u32),
    /// `s=<text>`
    String(String),
    /// `g=<guid>`
    Guid(String),
    /// `b=<base64>`
    Opaque(String),
}

impl Identifier {
    /// The raw identifier value, without the type prefix
    pub fn value(&self) -> String {
        match self {
            Self::Numeric(n) => n.to_string(),
            Self::String(s) | Self::Guid(s) | Self::Opaque(s) => s.clone(),
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "i",
            Self::String(_) => "s",
            Self::Guid(_) => "g",
            Self::Opaque(_) => "b",
        }
    }

    fn parse_prefixed(s: &str) -> Option<Self> {
        let (kind, value) = s.split_once('=')?;
        match kind {
            "i" => value.parse().ok().map(Self::Numeric),
            "s" => Some(Self::String(value.to_string())),
            "g" if !value.is_empty() => Some(Self::Guid(value.to_string())),
            "b" if !value.is_empty() => Some(Self::Opaque(value.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.prefix(), self.value())
    }
}

/// Reference to a single node in the remote address space
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeRef {
    pub namespace_index: u16,
    pub identifier: Identifier,
}

impl NodeRef {
    pub fn new(namespace_index: u16, identifier: Identifier) -> Self {
        Self {
            namespace_index,
            identifier,
        }
    }

    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self::new(namespace_index, Identifier::Numeric(value))
    }

    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self::new(namespace_index, Identifier::String(value.into()))
    }

    /// The standard `Root` folder (`i=84`), default starting point for browsing
    pub fn root_folder() -> Self {
        Self::numeric(0, 84)
    }

    /// Parse the `namespaceIndex,identifier` form accepted on the command line
    ///
    /// An all-digit identifier is numeric, anything else is a string.
    fn parse_legacy(s: &str) -> Option<Self> {
        let (ns, id) = s.split_once(',')?;
        let namespace_index = ns.trim().parse().ok()?;
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        let identifier = if id.bytes().all(|b| b.is_ascii_digit()) {
            Identifier::Numeric(id.parse().ok()?)
        } else {
            Identifier::String(id.to_string())
        };
        Some(Self::new(namespace_index, identifier))
    }

    fn parse_standard(s: &str) -> Option<Self> {
        let (namespace_index, rest) = match s.strip_prefix("ns=") {
            Some(rest) => {
                let (ns, rest) = rest.split_once(';')?;
                (ns.parse().ok()?, rest)
            }
            None => (0, s),
        };
        Identifier::parse_prefixed(rest).map(|identifier| Self::new(namespace_index, identifier))
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index != 0 {
            write!(f, "ns={};", self.namespace_index)?;
        }
        write!(f, "{}", self.identifier)
    }
}

impl FromStr for NodeRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let looks_standard = s.starts_with("ns=")
            || matches!(s.as_bytes(), [b'i' | b's' | b'g' | b'b', b'=', ..]);

        let parsed = if looks_standard {
            Self::parse_standard(s)
        } else {
            Self::parse_legacy(s)
        };
        parsed.ok_or_else(|| Error::InvalidNodeId(s.to_string()))
    }
}

impl TryFrom<String> for NodeRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeRef> for String {
    fn from(node: NodeRef) -> Self {
        node.to_string()
    }
}

/// A child node as returned by a browse call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(rename = "id")]
    pub node: NodeRef,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl NodeInfo {
    pub fn new(node: NodeRef, display_name: impl Into<String>) -> Self {
        Self {
            node,
            display_name: display_name.into(),
        }
    }

    /// Label emitted for this node; verbose appends `[ns,identifier]`
    pub fn label(&self, verbose: bool) -> String {
        if verbose {
            format!(
                "{}[{},{}]",
                self.display_name,
                self.node.namespace_index,
                self.node.identifier.value()
            )
        } else {
            self.display_name.clone()
        }
    }
}
