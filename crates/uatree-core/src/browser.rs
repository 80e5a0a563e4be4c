//! Depth-bounded address space browser
//!
//! Walks the address space depth-first, one browse call at a time, and
//! writes the nested text form straight to a sink as it goes:
//!
//! ```text
//! Objects: {
//!   Server: {...},
//!   DeviceSet: {}
//! },
//! Types: {...}
//! ```
//!
//! Nodes at the depth cap are closed immediately, with `...` when they have
//! children of their own. A node whose children cannot be fetched gets the
//! failure printed inside its braces and the rest of the walk carries on.
//! Nodes reachable through several parents are rendered once per parent.

use std::io::{self, Write};

use tracing::{debug, info, warn};

use crate::client::AddressSpaceClient;
use crate::error::{Error, Result};
use crate::node::{NodeInfo, NodeRef};

/// Indentation added per level
pub const INDENT_UNIT: &str = "  ";

/// Marker written inside the braces of a node left unexpanded at the depth cap
pub const DEPTH_CAP_MARKER: &str = "...";

/// Options for a browse run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseOptions {
    /// Number of levels to list below the root; `usize::MAX` for unlimited
    pub max_depth: usize,
    /// Append `[ns,identifier]` to every label
    pub verbose: bool,
}

impl Default for BrowseOptions {
    fn default() -> Self {
        Self {
            max_depth: usize::MAX,
            verbose: false,
        }
    }
}

impl BrowseOptions {
    /// Builder: set max depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder: enable/disable verbose labels
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::InvalidDepth(self.max_depth));
        }
        Ok(())
    }
}

/// Counters collected during one browse run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrowseStats {
    /// Nodes written to the sink
    pub nodes: usize,
    /// Browse calls issued, depth-cap checks included
    pub browse_calls: usize,
    /// Branches cut short by a failed browse call
    pub failures: usize,
    /// Nodes closed with the depth cap marker
    pub capped: usize,
}

/// Renders the address space below a root node
pub struct TreeBrowser<C> {
    client: C,
    options: BrowseOptions,
}

impl<C: AddressSpaceClient> TreeBrowser<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            options: BrowseOptions::default(),
        }
    }

    pub fn with_options(client: C, options: BrowseOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &BrowseOptions {
        &self.options
    }

    /// Browse everything below `root` and write the tree to `sink`
    ///
    /// Fails only when the options are invalid, when the root itself cannot
    /// be browsed, or when writing to the sink fails. Anything already
    /// written before a sink error is left as is.
    pub fn browse<W: Write + ?Sized>(&self, root: &NodeRef, sink: &mut W) -> Result<BrowseStats> {
        self.options.validate()?;

        let mut stats = BrowseStats {
            browse_calls: 1,
            ..Default::default()
        };
        debug!(node = %root, "browsing root");
        let children = self.client.children(root).map_err(Error::RootBrowse)?;

        self.render_siblings(&children, 1, "", sink, &mut stats)?;
        sink.flush()?;

        info!(
            root = %root,
            nodes = stats.nodes,
            browse_calls = stats.browse_calls,
            failures = stats.failures,
            capped = stats.capped,
            "browse finished"
        );
        Ok(stats)
    }

    /// Browse into a string (useful for tests and small trees)
    pub fn render(&self, root: &NodeRef) -> Result<String> {
        let mut buf = Vec::new();
        self.browse(root, &mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Marker for a node that is not expanded because of the depth cap
    ///
    /// A failed check counts as "no children".
    pub fn depth_cap_marker(&self, node: &NodeRef) -> &'static str {
        match self.client.has_children(node) {
            Ok(true) => DEPTH_CAP_MARKER,
            Ok(false) => "",
            Err(err) => {
                warn!(node = %node, cause = %err.cause, "depth cap check failed");
                ""
            }
        }
    }

    /// Write one list of siblings, all living at `depth`
    fn render_siblings<W: Write + ?Sized>(
        &self,
        siblings: &[NodeInfo],
        depth: usize,
        indent: &str,
        sink: &mut W,
        stats: &mut BrowseStats,
    ) -> io::Result<()> {
        let last = siblings.len().saturating_sub(1);
        for (i, child) in siblings.iter().enumerate() {
            let is_last = i == last;
            stats.nodes += 1;
            write!(sink, "{}{}: {{", indent, child.label(self.options.verbose))?;

            if depth < self.options.max_depth {
                let child_indent = format!("{}{}", indent, INDENT_UNIT);
                self.expand(&child.node, depth + 1, &child_indent, is_last, sink, stats)?;
            } else {
                stats.browse_calls += 1;
                let marker = self.depth_cap_marker(&child.node);
                if !marker.is_empty() {
                    stats.capped += 1;
                }
                sink.write_all(marker.as_bytes())?;
                close(sink, "", is_last)?;
            }
        }
        Ok(())
    }

    /// Fill in the braces of an opened node
    ///
    /// `depth` and `indent` belong to the node's children; the closing brace
    /// goes one indentation unit to the left.
    fn expand<W: Write + ?Sized>(
        &self,
        node: &NodeRef,
        depth: usize,
        indent: &str,
        is_last: bool,
        sink: &mut W,
        stats: &mut BrowseStats,
    ) -> io::Result<()> {
        stats.browse_calls += 1;
        debug!(node = %node, depth, "browsing");
        let parent_indent = indent.strip_prefix(INDENT_UNIT).unwrap_or(indent);

        match self.client.children(node) {
            Ok(children) if children.is_empty() => close(sink, "", is_last),
            Ok(children) => {
                writeln!(sink)?;
                self.render_siblings(&children, depth, indent, sink, stats)?;
                close(sink, parent_indent, is_last)
            }
            Err(err) => {
                warn!(node = %node, cause = %err.cause, "browse failed, skipping branch");
                stats.failures += 1;
                writeln!(sink)?;
                writeln!(sink, "{}{}", indent, err)?;
                close(sink, parent_indent, is_last)
            }
        }
    }
}

fn close<W: Write + ?Sized>(sink: &mut W, indent: &str, is_last: bool) -> io::Result<()> {
    writeln!(sink, "{}{}", indent, if is_last { "}" } else { "}," })
}
