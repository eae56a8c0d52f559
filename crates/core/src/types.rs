/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Accumulated form values keyed by field name.
///
/// Ordered so serialized payloads are stable across runs.
pub type FormValues = std::collections::BTreeMap<String, String>;
