//! Encoding sinks.
//!
//! Sinks consume rendered frames in generation order; [`job::EncodeJob`] drives a sink on a
//! worker thread and reports progress over a channel.

pub mod gif;
pub mod job;
pub mod sink;
