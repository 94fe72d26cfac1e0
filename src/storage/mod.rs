//! Storage is organized through [record_storage::RecordStorageImpl] and
//! [profile::ProfileStorage]. The basic idea is:
//!   - There is an application directory holding everything.
//!   - Weight records are JSON lines in `records/weights.jsonl`, one measurement per line.
//!   - The profile is a single JSON document, `profile.json`.

pub mod entities;
pub mod profile;
pub mod record_storage;
