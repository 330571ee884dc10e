use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,
    ConfigMissingKey,

    TaskDuplicate,
    TaskUnknown,
    TaskCyclicReference,

    TransformFailed,
    ValidationFailed,
    DispatchFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",
            ErrorCode::ConfigMissingKey => "config.missing_key",

            ErrorCode::TaskDuplicate => "task.duplicate",
            ErrorCode::TaskUnknown => "task.unknown",
            ErrorCode::TaskCyclicReference => "task.cyclic_reference",

            ErrorCode::TransformFailed => "transform.failed",
            ErrorCode::ValidationFailed => "validation.failed",
            ErrorCode::DispatchFailed => "dispatch.failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateTaskDetails {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownTaskDetails {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclicReferenceDetails {
    pub name: String,
    pub expansion_stack: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformFailedDetails {
    pub task: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailedDetails {
    pub task: String,
    pub violations: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchFailedDetails {
    pub attempts: u32,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn task_duplicate(name: impl Into<String>) -> Self {
        let name = name.into();
        let details = serde_json::to_value(DuplicateTaskDetails { name: name.clone() })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(
            ErrorCode::TaskDuplicate,
            format!("Task '{}' is already registered", name),
            details,
        )
    }

    pub fn task_unknown(name: impl Into<String>, referenced_by: Option<String>) -> Self {
        let name = name.into();
        let details = serde_json::to_value(UnknownTaskDetails {
            name: name.clone(),
            referenced_by,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(
            ErrorCode::TaskUnknown,
            format!("Unknown task '{}'", name),
            details,
        )
        .with_hint("Run 'brandkit --list' to see registered tasks")
    }

    pub fn task_cyclic(name: impl Into<String>, expansion_stack: Vec<String>) -> Self {
        let name = name.into();
        let details = serde_json::to_value(CyclicReferenceDetails {
            name: name.clone(),
            expansion_stack,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(
            ErrorCode::TaskCyclicReference,
            format!("Composite task '{}' references itself", name),
            details,
        )
    }

    pub fn transform_failed(details: TransformFailedDetails) -> Self {
        let message = format!("Task '{}' failed", details.task);
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(ErrorCode::TransformFailed, message, details)
    }

    pub fn validation_failed(task: impl Into<String>, violations: Vec<String>) -> Self {
        let task = task.into();
        let message = format!(
            "HTML validation reported {} violation(s)",
            violations.len()
        );
        let details = serde_json::to_value(ValidationFailedDetails { task, violations })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(ErrorCode::ValidationFailed, message, details)
    }

    pub fn dispatch_failed(attempts: u32, error: impl Into<String>) -> Self {
        let details = serde_json::to_value(DispatchFailedDetails {
            attempts,
            error: error.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        let mut err = Self::new(
            ErrorCode::DispatchFailed,
            "Cloud test dispatch failed",
            details,
        );
        // Retries are exhausted by the time this surfaces; the run fails.
        err.retryable = Some(false);
        err
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = serde_json::to_value(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = serde_json::to_value(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let key: String = key.into();
        let details = serde_json::json!({ "key": key, "path": path });
        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalIoErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let error: String = error.into();
        let details = serde_json::json!({ "error": error, "context": context });
        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        let error: String = error.into();
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error }),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::internal_unexpected(message)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Annotate an execution error with the failing task's name and its
    /// 1-based position in the resolved sequence.
    pub fn at_position(mut self, task: &str, position: usize, total: usize) -> Self {
        if let Value::Object(map) = &mut self.details {
            map.insert("task".to_string(), Value::String(task.to_string()));
            map.insert("position".to_string(), serde_json::json!(position));
            map.insert("sequenceLength".to_string(), serde_json::json!(total));
        }
        self.message = format!("{} (task '{}', step {}/{})", self.message, task, position, total);
        self
    }

    /// Exit code supplied by the external transformation, if any.
    pub fn tool_exit_code(&self) -> Option<i32> {
        self.details
            .get("exitCode")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
    }
}
