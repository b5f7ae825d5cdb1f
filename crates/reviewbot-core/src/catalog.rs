//! Review status codes and their verdict text.
//!
//! The remote service reports one of a small closed set of codes per
//! homework. Anything outside that set is not an error at this level;
//! [`HomeworkStatus::parse`] simply returns `None` and the formatter
//! decides what to say.

/// A review status code known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    /// Review finished, no remarks.
    Approved,
    /// A reviewer has picked the work up.
    Reviewing,
    /// Review finished with remarks.
    Rejected,
}

impl HomeworkStatus {
    /// Every known status, in catalog order.
    pub const ALL: [HomeworkStatus; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Parse a wire status code. Codes are matched exactly.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// The wire code for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable verdict shown to the student.
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "The work has been reviewed: the reviewer liked everything. Hooray!",
            Self::Reviewing => "The work has been taken for review by a reviewer.",
            Self::Rejected => "The work has been reviewed: the reviewer has remarks.",
        }
    }
}
