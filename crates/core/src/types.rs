/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identity of a caller as issued by the external identity service (JWT `sub`).
pub type UserId = uuid::Uuid;
