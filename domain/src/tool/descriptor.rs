//! Tool descriptor entity

use serde::{Deserialize, Serialize};

/// Description of one tool exposed by a tool provider.
///
/// Created when a provider's catalog is fetched and never mutated afterwards.
/// Two providers may expose descriptors with the same `name`; the aggregated
/// catalog keeps both, but routing only ever reaches the first registered one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name as advertised by the provider (e.g., "get_current_time")
    pub name: String,
    /// Human-readable description shown to the model
    #[serde(default)]
    pub description: String,
    /// JSON Schema describing the tool's arguments
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Render this tool into the model gateway's tool-specification envelope.
    ///
    /// ```
    /// use toolrelay_domain::ToolDescriptor;
    ///
    /// let tool = ToolDescriptor::new(
    ///     "get_time",
    ///     "Current time in a timezone",
    ///     serde_json::json!({"type": "object"}),
    /// );
    /// let spec = tool.to_tool_spec();
    /// assert_eq!(spec["toolSpec"]["name"], "get_time");
    /// assert_eq!(spec["toolSpec"]["inputSchema"]["json"]["type"], "object");
    /// ```
    pub fn to_tool_spec(&self) -> serde_json::Value {
        serde_json::json!({
            "toolSpec": {
                "name": self.name,
                "description": self.description,
                "inputSchema": {
                    "json": self.input_schema,
                },
            }
        })
    }
}

/// Render a whole catalog, preserving its order.
pub fn render_tool_specs(tools: &[ToolDescriptor]) -> Vec<serde_json::Value> {
    tools.iter().map(ToolDescriptor::to_tool_spec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_spec_envelope() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "timezone": { "type": "string" } },
            "required": ["timezone"]
        });
        let tool = ToolDescriptor::new("get_current_time", "Get the time", schema.clone());

        let spec = tool.to_tool_spec();
        assert_eq!(spec["toolSpec"]["name"], "get_current_time");
        assert_eq!(spec["toolSpec"]["description"], "Get the time");
        assert_eq!(spec["toolSpec"]["inputSchema"]["json"], schema);
    }

    #[test]
    fn test_render_preserves_order() {
        let tools = vec![
            ToolDescriptor::new("b", "", serde_json::json!({})),
            ToolDescriptor::new("a", "", serde_json::json!({})),
        ];
        let specs = render_tool_specs(&tools);
        assert_eq!(specs[0]["toolSpec"]["name"], "b");
        assert_eq!(specs[1]["toolSpec"]["name"], "a");
    }

    #[test]
    fn test_deserialize_mcp_tool_shape() {
        let json = serde_json::json!({
            "name": "lookup",
            "inputSchema": { "type": "object" }
        });
        let tool: ToolDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(tool.name, "lookup");
        assert!(tool.description.is_empty());
    }
}
