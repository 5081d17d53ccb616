//! Complaint status vocabulary and input validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Barcode;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// Lifecycle state of a complaint. New complaints start as [`Pending`].
///
/// Stored as lowercase text in `complaints.status`. Deserialization accepts
/// any case.
///
/// [`Pending`]: ComplaintStatus::Pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, sqlx::Type)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ComplaintStatus {
    /// The value stored in the `complaints.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Approved => STATUS_APPROVED,
            Self::Rejected => STATUS_REJECTED,
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_APPROVED => Ok(Self::Approved),
            STATUS_REJECTED => Ok(Self::Rejected),
            other => Err(CoreError::InvalidInput(format!(
                "Unknown complaint status '{other}'. Expected one of: pending, approved, rejected"
            ))),
        }
    }
}

impl TryFrom<String> for ComplaintStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Maximum length of a complaint message, in characters.
pub const MAX_MESSAGE_LEN: usize = 5_000;

/// Maximum length of an admin answer, in characters.
pub const MAX_ANSWER_LEN: usize = 5_000;

/// Validate a complaint message (non-blank, at most [`MAX_MESSAGE_LEN`] chars).
pub fn validate_message(message: &str) -> Result<(), CoreError> {
    if message.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            "Complaint message must not be empty".into(),
        ));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(CoreError::InvalidInput(format!(
            "Complaint message must be at most {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an admin answer attached to a complaint.
pub fn validate_answer(answer: &str) -> Result<(), CoreError> {
    if answer.chars().count() > MAX_ANSWER_LEN {
        return Err(CoreError::InvalidInput(format!(
            "Answer must be at most {MAX_ANSWER_LEN} characters"
        )));
    }
    Ok(())
}

/// Barcodes are positive integers.
pub fn validate_barcode(barcode: Barcode) -> Result<(), CoreError> {
    if barcode <= 0 {
        return Err(CoreError::InvalidInput(
            "Barcode must be a positive integer".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn status_round_trips_through_column_value() {
        for status in [
            ComplaintStatus::Pending,
            ComplaintStatus::Approved,
            ComplaintStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ComplaintStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(
            "Rejected".parse::<ComplaintStatus>().unwrap(),
            ComplaintStatus::Rejected
        );
    }

    #[test]
    fn unknown_status_is_invalid_input() {
        assert_matches!(
            "resolved".parse::<ComplaintStatus>(),
            Err(CoreError::InvalidInput(_))
        );
    }

    #[test]
    fn status_json_is_lowercase_and_parsing_ignores_case() {
        assert_eq!(
            serde_json::to_value(ComplaintStatus::Approved).unwrap(),
            "approved"
        );
        let parsed: ComplaintStatus = serde_json::from_str("\"APPROVED\"").unwrap();
        assert_eq!(parsed, ComplaintStatus::Approved);

        let err = serde_json::from_str::<ComplaintStatus>("\"closed\"").unwrap_err();
        assert!(err.to_string().contains("Unknown complaint status"), "{err}");
    }

    #[test]
    fn default_status_is_pending() {
        assert_eq!(ComplaintStatus::default(), ComplaintStatus::Pending);
        assert_eq!(ComplaintStatus::default().to_string(), "pending");
    }

    #[test]
    fn blank_message_rejected() {
        assert!(validate_message("   ").is_err());
        assert!(validate_message("").is_err());
    }

    #[test]
    fn message_length_boundary() {
        let at_limit = "a".repeat(MAX_MESSAGE_LEN);
        assert!(validate_message(&at_limit).is_ok());
        let over = "a".repeat(MAX_MESSAGE_LEN + 1);
        assert!(validate_message(&over).is_err());
    }

    #[test]
    fn non_positive_barcode_rejected() {
        assert!(validate_barcode(0).is_err());
        assert!(validate_barcode(-5).is_err());
        assert!(validate_barcode(1001).is_ok());
    }

    #[test]
    fn long_answer_rejected() {
        assert!(validate_answer("thanks").is_ok());
        assert!(validate_answer(&"x".repeat(MAX_ANSWER_LEN + 1)).is_err());
    }
}
