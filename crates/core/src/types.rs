/// Row id of sites, templates, catalog entries and placed widgets
/// (PostgreSQL BIGSERIAL). The editor uses negative ids for placements the
/// server has not confirmed yet.
pub type DbId = i64;

/// Creation and update stamps of placed widgets, always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
