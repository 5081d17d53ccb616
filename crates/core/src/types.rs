/// Complaint and category primary keys are PostgreSQL UUIDs.
pub type DbId = uuid::Uuid;

/// Integer user handle identifying the submitting/owning user. Not a secret.
pub type Barcode = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
