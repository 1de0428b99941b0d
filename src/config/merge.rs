//! Merge rules applied before any file source.

pub mod merge_policy;
