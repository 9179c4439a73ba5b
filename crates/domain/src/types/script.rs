//! Anonymous script execution result

use serde::{Deserialize, Serialize};

use crate::errors::{ForceError, Result};

/// Outcome of executing an anonymous script on the remote side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResult {
    #[serde(default)]
    pub line: i64,
    #[serde(default)]
    pub column: i64,
    #[serde(default)]
    pub compiled: bool,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub compile_problem: Option<String>,
    #[serde(default)]
    pub exception_message: Option<String>,
    #[serde(default)]
    pub exception_stack_trace: Option<String>,
}

impl ScriptResult {
    /// Successful execution, mostly useful for test doubles.
    pub fn succeeded() -> Self {
        Self { line: -1, column: -1, compiled: true, success: true, ..Self::default() }
    }

    /// Turn a remote failure into [`ForceError::Remote`], keeping the remote
    /// message and stack trace verbatim.
    pub fn ensure_success(self, operation: &str) -> Result<Self> {
        if !self.compiled {
            return Err(ForceError::Remote {
                operation: operation.to_string(),
                code: Some("COMPILE_ERROR".to_string()),
                message: self.compile_problem.unwrap_or_default(),
                details: Some(serde_json::json!({ "line": self.line, "column": self.column })),
            });
        }
        if !self.success {
            return Err(ForceError::Remote {
                operation: operation.to_string(),
                code: None,
                message: self.exception_message.unwrap_or_default(),
                details: self
                    .exception_stack_trace
                    .map(|trace| serde_json::json!({ "stackTrace": trace })),
            });
        }
        Ok(self)
    }
}
