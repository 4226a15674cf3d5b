//! Tool definitions
//!
//! Declarative descriptions of the externally exposed operations. The
//! facade validates incoming arguments against these before dispatching.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Definition of one externally exposed tool operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Type hint for the caller ("string", "number")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// Validate a JSON argument object against a definition: every required
/// parameter present, no unknown parameters.
pub fn validate_arguments(definition: &ToolDefinition, args: &Value) -> Result<(), String> {
    let object = match args {
        Value::Object(map) => map,
        Value::Null => {
            return if definition.parameters.iter().any(|p| p.required) {
                Err(format!("tool '{}' requires parameters", definition.name))
            } else {
                Ok(())
            };
        }
        _ => return Err(format!("arguments for tool '{}' must be an object", definition.name)),
    };

    for param in &definition.parameters {
        if param.required && !object.contains_key(&param.name) {
            return Err(format!(
                "missing required parameter '{}' for tool '{}'",
                param.name, definition.name
            ));
        }
    }

    for key in object.keys() {
        if !definition.parameters.iter().any(|p| &p.name == key) {
            return Err(format!(
                "unknown parameter '{}' for tool '{}'",
                key, definition.name
            ));
        }
    }

    Ok(())
}
