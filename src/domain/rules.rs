//! Validation rules for the two upload slots.
//!
//! A rule set is an ordered list of named checks over the file metadata.
//! Evaluation stops at the first failing check, so a field carries at most
//! one message at a time.
use std::borrow::Cow;

use validator::ValidationError;

use crate::domain::SelectedFile;

/// Largest accepted upload, in bytes (5MB).
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

pub const REQUIRED_MESSAGE: &str = "File is required";
pub const FILE_SIZE_MESSAGE: &str = "File size should not exceed 5MB";

pub const DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/svg+xml",
    "image/gif",
];

/// Single named check. `passes` is a pure predicate over the file.
#[derive(Clone, Copy, Debug)]
pub struct FileRule {
    pub code: &'static str,
    pub message: &'static str,
    passes: fn(&RuleSet, &SelectedFile) -> bool,
}

fn type_allowed(set: &RuleSet, file: &SelectedFile) -> bool {
    set.allowed_types
        .iter()
        .any(|allowed| *allowed == file.content_type())
}

fn size_within_limit(set: &RuleSet, file: &SelectedFile) -> bool {
    file.size() <= set.max_size
}

/// Allowed types, size limit and the ordered checks applied to a field.
#[derive(Clone, Debug)]
pub struct RuleSet {
    allowed_types: &'static [&'static str],
    max_size: u64,
    rules: [FileRule; 2],
}

pub static DOCUMENT_RULES: RuleSet = RuleSet {
    allowed_types: DOCUMENT_TYPES,
    max_size: MAX_FILE_SIZE,
    rules: [
        FileRule {
            code: "file_type",
            message: "Invalid document file type",
            passes: type_allowed,
        },
        FileRule {
            code: "file_size",
            message: FILE_SIZE_MESSAGE,
            passes: size_within_limit,
        },
    ],
};

pub static IMAGE_RULES: RuleSet = RuleSet {
    allowed_types: IMAGE_TYPES,
    max_size: MAX_FILE_SIZE,
    rules: [
        FileRule {
            code: "file_type",
            message: "Invalid image file type",
            passes: type_allowed,
        },
        FileRule {
            code: "file_size",
            message: FILE_SIZE_MESSAGE,
            passes: size_within_limit,
        },
    ],
};

impl RuleSet {
    /// Checks `file` against the set, returning the first failing rule.
    pub fn check(&self, file: Option<&SelectedFile>) -> Result<(), ValidationError> {
        let Some(file) = file else {
            return Err(failure("required", REQUIRED_MESSAGE));
        };

        match self.rules.iter().find(|rule| !(rule.passes)(self, file)) {
            Some(rule) => Err(failure(rule.code, rule.message)),
            None => Ok(()),
        }
    }
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Human message carried by a rule failure.
pub fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}
