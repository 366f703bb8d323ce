//! Task list response parser
//!
//! Only a body that is not JSON, or not an array at the top level, fails the
//! whole response. Individual elements that lack a usable `id` or `content`
//! are skipped with a warning, and unknown fields are ignored.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

use taskdeck_core::{Due, Task, TaskPriority};

use crate::error::{FetchError, Result};

/// Outcome of parsing one task list response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTasks {
    /// Tasks in the order the API returned them
    pub tasks: Vec<Task>,
    /// Elements dropped because they were unusable
    pub skipped: usize,
}

/// Parse a task list body. Relative due words are resolved against `today`.
pub fn parse_tasks(body: &str, today: NaiveDate) -> Result<ParsedTasks> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::parse(format!("invalid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(FetchError::parse("JSON is not an array"));
    };

    let mut tasks = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (index, item) in items.iter().enumerate() {
        match parse_task(item, today) {
            Ok(task) => tasks.push(task),
            Err(reason) => {
                warn!("Skipping task at index {}: {}", index, reason);
                skipped += 1;
            }
        }
    }

    Ok(ParsedTasks { tasks, skipped })
}

fn parse_task(item: &Value, today: NaiveDate) -> std::result::Result<Task, String> {
    let obj = item
        .as_object()
        .ok_or_else(|| "element is not an object".to_string())?;

    let id = id_field(obj, "id").ok_or_else(|| "missing id".to_string())?;
    let content = obj
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("task {} has no content", id))?;

    let mut task = Task::new(id, content);
    task.description = string_field(obj, "description");
    task.project_id = id_field(obj, "project_id");
    task.section_id = id_field(obj, "section_id");
    task.parent_id = id_field(obj, "parent_id");
    task.priority = obj
        .get("priority")
        .and_then(Value::as_i64)
        .map(TaskPriority::from_api)
        .unwrap_or_default();
    task.completed = ["completed", "is_completed", "checked"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_bool))
        .unwrap_or(false);

    if let Some(raw) = obj.get("due") {
        match parse_due(raw, today) {
            Ok(due) => task.due = due,
            Err(reason) => warn!("Ignoring due date of task {}: {}", task.id, reason),
        }
    }

    Ok(task)
}

/// `due` is either a plain string or a Todoist due object
fn parse_due(raw: &Value, today: NaiveDate) -> std::result::Result<Option<Due>, String> {
    match raw {
        Value::Null => Ok(None),
        Value::String(s) => Due::parse(s, today).map(Some).map_err(|e| e.to_string()),
        Value::Object(obj) => {
            let when = string_field(obj, "datetime")
                .or_else(|| string_field(obj, "date"))
                .ok_or_else(|| "due object has neither date nor datetime".to_string())?;
            let mut due = Due::parse(&when, today).map_err(|e| e.to_string())?;
            if let Some(label) = string_field(obj, "string") {
                due.label = Some(label);
            }
            due.recurring = obj
                .get("is_recurring")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Ok(Some(due))
        }
        other => Err(format!("unsupported due value {}", other)),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Identifiers arrive as strings or as integers depending on the API version
fn id_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
