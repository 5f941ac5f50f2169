//! Tool definitions for LLM function calling

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Definition of a tool that can be called by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (should be unique)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for parameters
    pub parameters: ToolParameters,
}

/// Parameters schema for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameters {
    /// Type (usually "object")
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Properties (parameter definitions)
    pub properties: Value,

    /// Required parameters
    #[serde(default)]
    pub required: Vec<String>,
}

impl ToolDef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ToolParameters {
                schema_type: "object".to_string(),
                properties: json!({}),
                required: vec![],
            },
        }
    }

    /// Add a string parameter
    pub fn with_string_param(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let schema = json!({
            "type": "string",
            "description": description.into()
        });
        self.with_param(name, schema, required)
    }

    /// Add a custom parameter with full schema
    pub fn with_param(mut self, name: impl Into<String>, schema: Value, required: bool) -> Self {
        let name = name.into();

        if let Value::Object(ref mut props) = self.parameters.properties {
            props.insert(name.clone(), schema);
        }

        if required {
            self.parameters.required.push(name);
        }

        self
    }

    /// Full JSON Schema object
    pub fn schema(&self) -> Value {
        json!({
            "type": self.parameters.schema_type,
            "properties": self.parameters.properties,
            "required": self.parameters.required
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema() {
        let def = ToolDef::new("list_directory", "Lists files")
            .with_string_param("directory", "Directory to list", false);

        assert_eq!(
            def.schema(),
            json!({
                "type": "object",
                "properties": {
                    "directory": { "type": "string", "description": "Directory to list" }
                },
                "required": []
            })
        );
    }
}
