//! Turn a homework record into the chat message text.

use thiserror::Error;

use crate::catalog::HomeworkStatus;
use crate::homework::HomeworkRecord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown review status \"{status}\" for work \"{name}\"")]
    UnknownStatus { status: String, name: String },
}

impl FormatError {
    /// The degraded message sent instead of a verdict.
    pub fn notice(&self) -> String {
        match self {
            Self::UnknownStatus { status, name } => {
                format!("Unknown review status \"{status}\" received for work \"{name}\"")
            }
        }
    }
}

/// Format the status-change message for a record.
pub fn format(record: &HomeworkRecord) -> Result<String, FormatError> {
    let status =
        HomeworkStatus::parse(&record.status).ok_or_else(|| FormatError::UnknownStatus {
            status: record.status.clone(),
            name: record.name.clone(),
        })?;
    Ok(format!(
        "Changed review status of work \"{}\": {}",
        record.name,
        status.verdict()
    ))
}
