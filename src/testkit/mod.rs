//! Shared test doubles and fixtures.
//!
//! Compiled for unit tests and, through the `testkit` feature, for the
//! integration tests under `tests/`.
//!
//! - [`chat`] - `RecordingChat`, a [`ChatApi`](crate::port::ChatApi) that records calls
//! - [`crontab`] - `MemoryCrontab`, an in-memory [`CrontabStore`](crate::port::CrontabStore)
//! - [`fixture`] - Settings for a scratch directory and artifacts with a chosen mtime

pub mod chat;
pub mod crontab;
pub mod fixture;
