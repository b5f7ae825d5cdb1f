//! Core types for the review bot: wire shapes, status catalog, validation, formatting.

pub mod catalog;
pub mod format;
pub mod homework;
pub mod validate;

pub use catalog::HomeworkStatus;
pub use format::{FormatError, format};
pub use homework::{Answer, HomeworkRecord};
pub use validate::{ValidationError, validate};
