//! DOM operations for CDP page session.

use serde_json::json;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::RemoteObject;

use super::core::PageSession;

impl PageSession {
    /// Node id of the document root.
    pub async fn document_node_id(&self) -> Result<i64, CdpError> {
        let result = self
            .call("DOM.getDocument", Some(json!({"depth": 0})))
            .await?;

        result["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing document root".to_string()))
    }

    /// First match for `selector` under `within`, or under the document root.
    pub async fn query_selector(
        &self,
        selector: &str,
        within: Option<i64>,
    ) -> Result<Option<i64>, CdpError> {
        let root = match within {
            Some(node_id) => node_id,
            None => self.document_node_id().await?,
        };

        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({
                    "nodeId": root,
                    "selector": selector,
                })),
            )
            .await?;

        // nodeId 0 means no match.
        match result["nodeId"].as_i64().unwrap_or(0) {
            0 => Ok(None),
            node_id => Ok(Some(node_id)),
        }
    }

    /// Resolve a DOM node to a runtime object.
    pub async fn resolve_node(&self, node_id: i64) -> Result<RemoteObject, CdpError> {
        let result = self
            .call("DOM.resolveNode", Some(json!({"nodeId": node_id})))
            .await?;

        let object: RemoteObject = serde_json::from_value(result["object"].clone())?;
        Ok(object)
    }

    /// Runtime object id for a DOM node.
    pub async fn node_object_id(&self, node_id: i64) -> Result<String, CdpError> {
        self.resolve_node(node_id)
            .await?
            .object_id
            .ok_or_else(|| CdpError::InvalidResponse(format!("Node {} has no object id", node_id)))
    }
}
