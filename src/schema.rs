//! Typed learning-path model and the validator that gates the AI's JSON
//! output before anything renders it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A validation failure naming the offending field, e.g.
/// `steps[2].estimatedTime: expected a string`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct SchemaError(String);

/// One ordered unit of a learning path.
///
/// `order` stays a raw JSON number so integer orders from the provider
/// round-trip through the API unchanged. Uniqueness is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub order: serde_json::Number,
    pub title: String,
    pub description: String,
    pub resources: Vec<String>,
    pub estimated_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub steps: Vec<Step>,
}

/// Check an arbitrary parsed JSON value against the learning-path shape.
///
/// Type shape only: fields must exist with the right primitive types.
/// Extra keys are ignored, and nothing semantic (non-empty arrays,
/// plausible time strings) is checked.
pub fn validate_learning_path(value: &Value) -> Result<LearningPath, SchemaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SchemaError("top-level value is not an object".to_string()))?;
    let raw_steps = obj
        .get("steps")
        .ok_or_else(|| SchemaError("missing `steps` key".to_string()))?
        .as_array()
        .ok_or_else(|| SchemaError("`steps` is not an array".to_string()))?;

    let mut steps = Vec::with_capacity(raw_steps.len());
    for (index, raw) in raw_steps.iter().enumerate() {
        steps.push(validate_step(raw, index)?);
    }
    Ok(LearningPath { steps })
}

fn validate_step(value: &Value, index: usize) -> Result<Step, SchemaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SchemaError(format!("steps[{index}] is not an object")))?;

    let order = field(obj, index, "order")?
        .as_number()
        .cloned()
        .ok_or_else(|| type_error(index, "order", "a number"))?;

    let resources_value = field(obj, index, "resources")?
        .as_array()
        .ok_or_else(|| type_error(index, "resources", "an array"))?;
    let mut resources = Vec::with_capacity(resources_value.len());
    for (i, resource) in resources_value.iter().enumerate() {
        let resource = resource.as_str().ok_or_else(|| {
            SchemaError(format!("steps[{index}].resources[{i}]: expected a string"))
        })?;
        resources.push(resource.to_string());
    }

    Ok(Step {
        order,
        title: string_field(obj, index, "title")?,
        description: string_field(obj, index, "description")?,
        resources,
        estimated_time: string_field(obj, index, "estimatedTime")?,
    })
}

fn field<'a>(
    obj: &'a serde_json::Map<String, Value>,
    index: usize,
    name: &str,
) -> Result<&'a Value, SchemaError> {
    obj.get(name)
        .ok_or_else(|| SchemaError(format!("steps[{index}].{name}: missing field")))
}

fn string_field(
    obj: &serde_json::Map<String, Value>,
    index: usize,
    name: &str,
) -> Result<String, SchemaError> {
    field(obj, index, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| type_error(index, name, "a string"))
}

fn type_error(index: usize, name: &str, expected: &str) -> SchemaError {
    SchemaError(format!("steps[{index}].{name}: expected {expected}"))
}
