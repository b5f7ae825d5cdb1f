//! Shape checks on a decoded [`Answer`].

use serde_json::Value;
use thiserror::Error;

use crate::homework::{Answer, HomeworkRecord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("response has no \"homeworks\" key")]
    MissingKey,
    #[error("\"homeworks\" is not a list")]
    NotAList,
    #[error("\"homeworks\" is an empty list")]
    EmptyList,
    #[error("homework entry has no \"{0}\" field")]
    MissingField(&'static str),
}

/// Check the answer shape and extract the most recent homework record.
///
/// The service returns records newest-first; that ordering is trusted,
/// not checked.
pub fn validate(answer: &Answer) -> Result<HomeworkRecord, ValidationError> {
    let homeworks = answer
        .homeworks
        .as_ref()
        .ok_or(ValidationError::MissingKey)?;
    let list = homeworks.as_array().ok_or(ValidationError::NotAList)?;
    let first = list.first().ok_or(ValidationError::EmptyList)?;

    let name = string_field(first, "homework_name")?;
    let status = string_field(first, "status")?;
    Ok(HomeworkRecord::new(name, status))
}

fn string_field<'a>(entry: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField(field))
}
