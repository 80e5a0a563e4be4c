//! OPC UA session adapter
//!
//! Connects with security policy None and an anonymous identity, then
//! answers browse calls over the session. All calls block until the server
//! replies or the stack gives up.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use opcua::client::prelude::*;
use opcua::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client::{AddressSpaceClient, BrowseError};
use crate::config::SessionConfig;
use crate::error::Error;
use crate::node::{NodeInfo, NodeRef};

/// Every node class
const ALL_NODE_CLASSES: u32 = 0;
/// Every field of a reference description
const ALL_RESULT_FIELDS: u32 = 0x3f;

/// A connected OPC UA session
pub struct OpcUaSession {
    url: String,
    session: Arc<RwLock<Session>>,
    // Owns the session's client side state, must outlive `session`
    _client: Client,
}

impl OpcUaSession {
    /// Create a client from `config` and open a session to its server
    pub fn connect(config: &SessionConfig, pki_dir: PathBuf) -> crate::Result<Self> {
        config
            .validate()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let mut client = ClientBuilder::new()
            .application_name(config.application_name.as_str())
            .application_uri(config.application_uri.as_str())
            .product_uri(config.application_uri.as_str())
            .pki_dir(pki_dir)
            .trust_server_certs(true)
            .create_sample_keypair(false)
            .session_retry_limit(i32::try_from(config.session_retry_limit).unwrap_or(i32::MAX))
            .client()
            .ok_or_else(|| Error::ClientCreation("invalid client configuration".to_string()))?;

        info!(url = %config.server_url, "connecting");
        let endpoint = (
            config.server_url.as_str(),
            SecurityPolicy::None.to_str(),
            MessageSecurityMode::None,
            UserTokenPolicy::anonymous(),
        );
        let session = client
            .connect_to_endpoint(endpoint, IdentityToken::Anonymous)
            .map_err(|status| Error::Connection {
                url: config.server_url.clone(),
                cause: status.to_string(),
            })?;

        Ok(Self {
            url: config.server_url.clone(),
            session,
            _client: client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AddressSpaceClient for OpcUaSession {
    fn children(&self, node: &NodeRef) -> std::result::Result<Vec<NodeInfo>, BrowseError> {
        let fail = |cause: String| BrowseError::new(node.clone(), cause);
        let node_id = to_node_id(node).ok_or_else(|| fail("node id rejected by the OPC UA stack".to_string()))?;

        let description = BrowseDescription {
            node_id,
            browse_direction: BrowseDirection::Forward,
            reference_type_id: ReferenceTypeId::HierarchicalReferences.into(),
            include_subtypes: true,
            node_class_mask: ALL_NODE_CLASSES,
            result_mask: ALL_RESULT_FIELDS,
        };

        let session = self.session.read();
        let mut response = session
            .browse(&[description])
            .map_err(|status| fail(status.to_string()))?;

        let mut children = Vec::new();
        loop {
            let result = response
                .and_then(|results| results.into_iter().next())
                .ok_or_else(|| fail("server returned no browse result".to_string()))?;
            if result.status_code.is_bad() {
                return Err(fail(result.status_code.to_string()));
            }

            for reference in result.references.unwrap_or_default() {
                match from_node_id(&reference.node_id.node_id) {
                    Some(child) => {
                        let name: &str = reference.browse_name.name.as_ref();
                        children.push(NodeInfo::new(child, name));
                    }
                    None => warn!(parent = %node, child = %reference.node_id.node_id, "skipping unreadable node id"),
                }
            }

            if result.continuation_point.is_null() {
                break;
            }
            debug!(node = %node, fetched = children.len(), "following continuation point");
            response = session
                .browse_next(false, &[result.continuation_point])
                .map_err(|status| fail(status.to_string()))?;
        }

        Ok(children)
    }
}

impl Drop for OpcUaSession {
    fn drop(&mut self) {
        debug!(url = %self.url, "disconnecting");
        self.session.write().disconnect();
    }
}

/// Both sides use the standard `ns=<n>;<type>=<value>` text form
fn to_node_id(node: &NodeRef) -> Option<NodeId> {
    NodeId::from_str(&node.to_string()).ok()
}

fn from_node_id(node_id: &NodeId) -> Option<NodeRef> {
    node_id.to_string().parse().ok()
}
