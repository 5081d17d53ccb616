//! Category input validation.

use crate::error::CoreError;

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 2_000;

/// Maximum canned answer length, in characters.
pub const MAX_ANSWER_LEN: usize = 5_000;

/// Validate a category title (non-blank, <= 200 chars).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            "Category title must not be empty".into(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::InvalidInput(format!(
            "Category title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(CoreError::InvalidInput(format!(
            "Category description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

/// The canned answer is returned to every submitter, so it may not be blank.
pub fn validate_answer(answer: &str) -> Result<(), CoreError> {
    if answer.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            "Category answer must not be empty".into(),
        ));
    }
    if answer.chars().count() > MAX_ANSWER_LEN {
        return Err(CoreError::InvalidInput(format!(
            "Category answer must be at most {MAX_ANSWER_LEN} characters"
        )));
    }
    Ok(())
}
