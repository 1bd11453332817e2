//! Task file loading.

use std::path::Path;

use crate::error::InputError;
use crate::types::TaskDescriptor;

pub const DEFAULT_TASKS_FILE: &str = "task.json";

/// Parse a JSON array of `{name, due_time?}` objects, preserving order.
pub fn parse_tasks(json: &str) -> Result<Vec<TaskDescriptor>, InputError> {
    let tasks: Vec<TaskDescriptor> = serde_json::from_str(json)?;
    if let Some(index) = tasks.iter().position(|t| t.name.trim().is_empty()) {
        return Err(InputError::EmptyName { index });
    }
    Ok(tasks)
}

pub fn load_tasks(path: &Path) -> Result<Vec<TaskDescriptor>, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tasks(&raw)
}
